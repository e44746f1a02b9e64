use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Topic the ESP8266 sensor firmware publishes to
pub const DEFAULT_TELEMETRY_TOPIC: &str = "/esp8266/dhtreadings";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Topic filter to subscribe to, MQTT wildcards allowed
    pub topic: String,

    /// First reconnect delay (default: 500 ms)
    pub reconnect_initial_delay_ms: u64,

    /// Upper bound for the reconnect delay (default: 30 seconds)
    pub reconnect_max_delay_ms: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TELEMETRY_TOPIC.to_string(),
            reconnect_initial_delay_ms: 500,
            reconnect_max_delay_ms: 30_000,
        }
    }
}

impl IngestionConfig {
    pub fn backoff(&self) -> ReconnectBackoff {
        ReconnectBackoff::new(
            Duration::from_millis(self.reconnect_initial_delay_ms),
            Duration::from_millis(self.reconnect_max_delay_ms),
        )
    }
}

/// Exponential reconnect delay, doubling from `initial` up to `max`
///
/// Never yields a zero delay.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    next: Duration,
}

impl ReconnectBackoff {
    const FLOOR: Duration = Duration::from_millis(1);

    pub fn new(initial: Duration, max: Duration) -> Self {
        let initial = initial.max(Self::FLOOR);
        let max = max.max(initial);
        Self {
            initial,
            max,
            next: initial,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = self.next.saturating_mul(2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.next = self.initial;
    }
}
