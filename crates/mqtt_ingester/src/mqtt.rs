mod broker_address;
mod rumqtt_transport;

pub use broker_address::BrokerAddress;
pub use rumqtt_transport::{MqttConnectionOptions, RumqttSession, RumqttTransport};
