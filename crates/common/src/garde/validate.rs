use crate::domain::DomainError;
use garde::{Report, Validate};

/// Convert a garde validation report to DomainError
pub fn validate_struct<T>(value: &T) -> Result<(), DomainError>
where
    T: Validate,
    T::Context: Default,
{
    value
        .validate()
        .map_err(|report| DomainError::ValidationError(format_validation_errors(&report)))
}

/// Format validation errors as `path: message`, comma separated
fn format_validation_errors(report: &Report) -> String {
    report
        .iter()
        .map(|(path, error)| {
            if path.to_string().is_empty() {
                error.message().to_string()
            } else {
                format!("{}: {}", path, error.message())
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use garde::Validate;

    #[derive(Validate)]
    struct SensorLabel {
        #[garde(length(min = 1))]
        device: String,
        #[garde(length(min = 1))]
        location: String,
    }

    #[test]
    fn test_validate_success() {
        let label = SensorLabel {
            device: "DHT001".to_string(),
            location: "Office".to_string(),
        };
        assert!(validate_struct(&label).is_ok());
    }

    #[test]
    fn test_validate_reports_every_failing_field() {
        let label = SensorLabel {
            device: "".to_string(),
            location: "".to_string(),
        };
        match validate_struct(&label) {
            Err(DomainError::ValidationError(msg)) => {
                assert!(msg.contains("device"));
                assert!(msg.contains("location"));
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }
}
