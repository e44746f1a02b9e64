use crate::domain::result::{DomainError, DomainResult};
use std::collections::HashMap;

/// Stock four-sensor device table, in `device=location` form
pub const DEFAULT_DEVICE_TABLE: &str =
    "DHT001=Office,DHT002=Kitchen,DHT003=Bedroom,DHT004=Undecided";

/// Static mapping from device identifier to the location it reports from
///
/// Built once at startup and read-only afterwards. Lookups for unknown devices fail
/// with `DomainError::UnknownDevice`; there is no fallback location.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    locations: HashMap<String, String>,
    // registration order, for stable listing
    device_ids: Vec<String>,
}

impl DeviceRegistry {
    /// Build a registry from `(device_id, location)` pairs
    ///
    /// Rejects empty identifiers, empty locations and duplicate device ids.
    pub fn new<I, D, L>(entries: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (D, L)>,
        D: Into<String>,
        L: Into<String>,
    {
        let mut registry = Self::default();

        for (device_id, location) in entries {
            let device_id = device_id.into().trim().to_string();
            let location = location.into().trim().to_string();

            if device_id.is_empty() {
                return Err(DomainError::InvalidDeviceRegistry(
                    "device id cannot be empty".to_string(),
                ));
            }
            if location.is_empty() {
                return Err(DomainError::InvalidDeviceRegistry(format!(
                    "location for device '{}' cannot be empty",
                    device_id
                )));
            }
            if registry.locations.contains_key(&device_id) {
                return Err(DomainError::InvalidDeviceRegistry(format!(
                    "duplicate device id '{}'",
                    device_id
                )));
            }

            registry.device_ids.push(device_id.clone());
            registry.locations.insert(device_id, location);
        }

        Ok(registry)
    }

    /// Parse a comma-separated `device=location` table
    ///
    /// # Examples
    /// ```
    /// use common::domain::DeviceRegistry;
    ///
    /// let registry = DeviceRegistry::parse("DHT001=Office, DHT002=Kitchen").unwrap();
    /// assert_eq!(registry.resolve("DHT002").unwrap(), "Kitchen");
    /// ```
    pub fn parse(table: &str) -> DomainResult<Self> {
        let entries = table
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry.split_once('=').ok_or_else(|| {
                    DomainError::InvalidDeviceRegistry(format!(
                        "invalid entry '{}': expected 'device=location'",
                        entry
                    ))
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Self::new(entries)
    }

    /// Resolve a device identifier to its canonical location
    pub fn resolve(&self, device_id: &str) -> DomainResult<&str> {
        self.locations
            .get(device_id)
            .map(String::as_str)
            .ok_or_else(|| DomainError::UnknownDevice(device_id.to_string()))
    }

    /// Registered `(device_id, location)` pairs in registration order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.device_ids
            .iter()
            .map(|id| (id.as_str(), self.locations[id].as_str()))
    }

    pub fn len(&self) -> usize {
        self.device_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.device_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_resolves_all_devices() {
        let registry = DeviceRegistry::parse(DEFAULT_DEVICE_TABLE).unwrap();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.resolve("DHT001").unwrap(), "Office");
        assert_eq!(registry.resolve("DHT002").unwrap(), "Kitchen");
        assert_eq!(registry.resolve("DHT003").unwrap(), "Bedroom");
        assert_eq!(registry.resolve("DHT004").unwrap(), "Undecided");
    }

    #[test]
    fn test_unknown_device_fails() {
        let registry = DeviceRegistry::parse(DEFAULT_DEVICE_TABLE).unwrap();
        let result = registry.resolve("DHT999");
        assert!(matches!(result, Err(DomainError::UnknownDevice(id)) if id == "DHT999"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = DeviceRegistry::parse("DHT001=Office").unwrap();
        assert!(registry.resolve("dht001").is_err());
    }

    #[test]
    fn test_duplicate_device_rejected() {
        let result = DeviceRegistry::parse("DHT001=Office,DHT001=Kitchen");
        assert!(matches!(result, Err(DomainError::InvalidDeviceRegistry(_))));
    }

    #[test]
    fn test_empty_device_id_rejected() {
        let result = DeviceRegistry::new([("", "Office")]);
        assert!(matches!(result, Err(DomainError::InvalidDeviceRegistry(_))));
    }

    #[test]
    fn test_empty_location_rejected() {
        let result = DeviceRegistry::parse("DHT001=");
        assert!(matches!(result, Err(DomainError::InvalidDeviceRegistry(_))));
    }

    #[test]
    fn test_entry_without_separator_rejected() {
        let result = DeviceRegistry::parse("DHT001:Office");
        assert!(matches!(result, Err(DomainError::InvalidDeviceRegistry(_))));
    }

    #[test]
    fn test_entries_keep_registration_order() {
        let registry = DeviceRegistry::parse("B=Bedroom, A=Attic,").unwrap();
        let entries: Vec<_> = registry.entries().collect();
        assert_eq!(entries, vec![("B", "Bedroom"), ("A", "Attic")]);
    }

    #[test]
    fn test_empty_table_gives_empty_registry() {
        let registry = DeviceRegistry::parse("").unwrap();
        assert!(registry.is_empty());
    }
}
