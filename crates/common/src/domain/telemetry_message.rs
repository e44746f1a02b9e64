use crate::domain::result::{DomainError, DomainResult};
use crate::garde::validate_struct;
use garde::Validate;
use serde::Deserialize;

/// Telemetry payload as published by a sensor device
///
/// Only lives for a single ingestion step. Unknown extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct RawTelemetryMessage {
    #[garde(length(min = 1))]
    pub device: String,
    #[garde(skip)]
    pub temperature: f64,
    #[garde(skip)]
    pub humidity: f64,
}

/// Decode and validate a broker payload
///
/// Any structural problem (invalid JSON, missing field, wrong type, empty device id)
/// is reported as `DomainError::MalformedPayload`.
pub fn decode_telemetry(payload: &[u8]) -> DomainResult<RawTelemetryMessage> {
    let message: RawTelemetryMessage = serde_json::from_slice(payload)
        .map_err(|e| DomainError::MalformedPayload(e.to_string()))?;

    validate_struct(&message).map_err(|e| match e {
        DomainError::ValidationError(msg) => DomainError::MalformedPayload(msg),
        other => other,
    })?;

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_payload() {
        let message =
            decode_telemetry(br#"{"device":"DHT002","temperature":22.1,"humidity":38.0}"#)
                .unwrap();
        assert_eq!(message.device, "DHT002");
        assert_eq!(message.temperature, 22.1);
        assert_eq!(message.humidity, 38.0);
    }

    #[test]
    fn test_decode_accepts_integer_numbers() {
        let message =
            decode_telemetry(br#"{"device":"DHT001","temperature":21,"humidity":40}"#).unwrap();
        assert_eq!(message.temperature, 21.0);
        assert_eq!(message.humidity, 40.0);
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let message = decode_telemetry(
            br#"{"device":"DHT001","temperature":21.5,"humidity":40.0,"rssi":-60}"#,
        )
        .unwrap();
        assert_eq!(message.device, "DHT001");
    }

    #[test]
    fn test_decode_missing_field() {
        let result = decode_telemetry(br#"{"device":"DHT001","temperature":21.5}"#);
        assert!(matches!(result, Err(DomainError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_wrong_type() {
        let result =
            decode_telemetry(br#"{"device":"DHT001","temperature":"warm","humidity":40.0}"#);
        assert!(matches!(result, Err(DomainError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_not_json() {
        let result = decode_telemetry(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(result, Err(DomainError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_not_an_object() {
        let result = decode_telemetry(b"[1, 2, 3]");
        assert!(matches!(result, Err(DomainError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_empty_device_rejected() {
        let result = decode_telemetry(br#"{"device":"","temperature":21.5,"humidity":40.0}"#);
        match result {
            Err(DomainError::MalformedPayload(msg)) => assert!(msg.contains("device")),
            other => panic!("expected MalformedPayload, got {:?}", other),
        }
    }
}
