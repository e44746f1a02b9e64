use async_trait::async_trait;
use bytes::Bytes;
use common::domain::DomainResult;

/// Transport events the ingestion pipeline reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The broker accepted the connection
    Connected,
    /// The broker acknowledged the subscription
    Subscribed,
    /// A publish arrived
    Message { topic: String, payload: Bytes },
    /// Keep-alives, outgoing acknowledgements and other traffic
    Other,
}

/// Opens sessions against a publish/subscribe broker
///
/// Every call to `open` starts a fresh session with no subscriptions.
#[async_trait]
pub trait BrokerTransport: Send + Sync {
    async fn open(&self) -> DomainResult<Box<dyn BrokerSession>>;
}

/// A single broker session
///
/// Errors from `subscribe` and `poll` mean the session is gone and must be reopened;
/// implementations report them as `DomainError::TransportDisconnected`.
#[async_trait]
pub trait BrokerSession: Send {
    async fn subscribe(&mut self, topic_filter: &str) -> DomainResult<()>;

    /// Wait for the next transport event
    async fn poll(&mut self) -> DomainResult<TransportEvent>;

    /// Disconnect politely, ignoring errors
    async fn close(&mut self);
}
