use crate::domain::{BrokerSession, BrokerTransport, TransportEvent};
use crate::mqtt::BrokerAddress;
use async_trait::async_trait;
use common::domain::{DomainError, DomainResult};
use rumqttc::{
    AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
    SubscribeReasonCode,
};
use std::time::Duration;
use tracing::debug;

const MIN_KEEP_ALIVE: Duration = Duration::from_secs(5);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Connection settings for the MQTT broker
#[derive(Debug, Clone)]
pub struct MqttConnectionOptions {
    pub address: BrokerAddress,
    pub client_id: String,
    pub credentials: Option<(String, String)>,
    pub keep_alive: Duration,
    pub request_capacity: usize,
}

impl MqttConnectionOptions {
    pub fn new(address: BrokerAddress, client_id: impl Into<String>) -> Self {
        Self {
            address,
            client_id: client_id.into(),
            credentials: None,
            keep_alive: Duration::from_secs(60),
            request_capacity: 100,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: Duration) -> DomainResult<Self> {
        if keep_alive < MIN_KEEP_ALIVE {
            return Err(DomainError::InvalidBrokerConfig(format!(
                "keep alive must be at least {:?}, got {:?}",
                MIN_KEEP_ALIVE, keep_alive
            )));
        }
        self.keep_alive = keep_alive;
        Ok(self)
    }

    fn mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.address.host, self.address.port);
        options.set_keep_alive(self.keep_alive);
        // subscriptions are reissued by the pipeline on every connect
        options.set_clean_session(true);
        if let Some((username, password)) = &self.credentials {
            options.set_credentials(username, password);
        }
        options
    }
}

/// BrokerTransport backed by rumqttc
pub struct RumqttTransport {
    options: MqttConnectionOptions,
}

impl RumqttTransport {
    pub fn new(options: MqttConnectionOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl BrokerTransport for RumqttTransport {
    async fn open(&self) -> DomainResult<Box<dyn BrokerSession>> {
        debug!(
            host = %self.options.address.host,
            port = self.options.address.port,
            client_id = %self.options.client_id,
            "opening MQTT session"
        );

        let (client, eventloop) =
            AsyncClient::new(self.options.mqtt_options(), self.options.request_capacity);

        Ok(Box::new(RumqttSession { client, eventloop }))
    }
}

/// A single rumqttc client/event loop pair
///
/// The event loop connects lazily on the first poll.
pub struct RumqttSession {
    client: AsyncClient,
    eventloop: EventLoop,
}

fn disconnected(err: ConnectionError) -> DomainError {
    DomainError::TransportDisconnected(format!("MQTT event loop error: {}", err))
}

/// Translate a rumqttc event. A SUBACK carrying a failure code ends the session.
fn map_event(event: Event) -> DomainResult<TransportEvent> {
    let event = match event {
        Event::Incoming(Packet::ConnAck(_)) => TransportEvent::Connected,
        Event::Incoming(Packet::SubAck(suback)) => {
            if suback
                .return_codes
                .iter()
                .any(|code| matches!(code, SubscribeReasonCode::Failure))
            {
                return Err(DomainError::TransportDisconnected(
                    "broker rejected subscription".to_string(),
                ));
            }
            TransportEvent::Subscribed
        }
        Event::Incoming(Packet::Publish(publish)) => TransportEvent::Message {
            topic: publish.topic,
            payload: publish.payload,
        },
        _ => TransportEvent::Other,
    };

    Ok(event)
}

#[async_trait]
impl BrokerSession for RumqttSession {
    async fn subscribe(&mut self, topic_filter: &str) -> DomainResult<()> {
        self.client
            .subscribe(topic_filter, QoS::AtLeastOnce)
            .await
            .map_err(|e| DomainError::TransportDisconnected(format!("failed to subscribe: {}", e)))
    }

    async fn poll(&mut self) -> DomainResult<TransportEvent> {
        let event = self.eventloop.poll().await.map_err(disconnected)?;
        map_event(event)
    }

    async fn close(&mut self) {
        if self.client.disconnect().await.is_err() {
            return;
        }

        // drive the event loop until the DISCONNECT packet is actually sent
        let eventloop = &mut self.eventloop;
        let _ = tokio::time::timeout(CLOSE_TIMEOUT, async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        })
        .await;
    }
}
