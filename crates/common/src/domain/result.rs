use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] anyhow::Error),

    #[error("Transport disconnected: {0}")]
    TransportDisconnected(String),

    #[error("Query failed: {0}")]
    QueryFailed(#[source] anyhow::Error),

    #[error("Invalid query window: {0}")]
    InvalidQueryWindow(String),

    #[error("Invalid device registry: {0}")]
    InvalidDeviceRegistry(String),

    #[error("Invalid broker configuration: {0}")]
    InvalidBrokerConfig(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Errors caused by a single bad message. The pipeline drops the message and moves on.
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            DomainError::MalformedPayload(_) | DomainError::UnknownDevice(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_input_classification() {
        assert!(DomainError::MalformedPayload("x".to_string()).is_rejected_input());
        assert!(DomainError::UnknownDevice("DHT999".to_string()).is_rejected_input());
        assert!(
            !DomainError::StorageUnavailable(anyhow::anyhow!("disk full")).is_rejected_input()
        );
        assert!(!DomainError::TransportDisconnected("eof".to_string()).is_rejected_input());
    }

    #[test]
    fn test_storage_error_message_includes_source() {
        let err = DomainError::StorageUnavailable(anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "Storage unavailable: connection refused");
    }
}
