use common::domain::{DomainError, DomainResult};

pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Broker host and port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
}

impl BrokerAddress {
    /// Parse `mqtt://host:port`, `tcp://host:port`, `host:port` or `host`
    pub fn parse(url: &str) -> DomainResult<Self> {
        let address = url
            .trim()
            .trim_start_matches("mqtt://")
            .trim_start_matches("tcp://");

        let (host, port) = match address.split_once(':') {
            None => (address, DEFAULT_MQTT_PORT),
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    DomainError::InvalidBrokerConfig(format!(
                        "invalid port in broker URL: {}",
                        port
                    ))
                })?;
                (host, port)
            }
        };

        if host.is_empty() {
            return Err(DomainError::InvalidBrokerConfig(format!(
                "missing host in broker URL: {}",
                url
            )));
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}
