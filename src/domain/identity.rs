//! Device identity provisioning.
//!
//! A browser keeps its device id in local storage and sends it with every
//! fix. The first visit has nothing cached, so the server provisions one and
//! hands it back for the client to keep.

use uuid::Uuid;

/// Maximum accepted device id length.
pub const MAX_DEVICE_ID_LEN: usize = 128;

/// Returns true for ids of 1-128 ASCII letters, digits, `-` or `_`.
pub fn is_valid_device_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_DEVICE_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Provisions the device id used as the tracked location key.
pub trait DeviceIdentity: Send + Sync {
    /// Returns the id to use for a client that presented `cached`.
    fn provision(&self, cached: Option<&str>) -> String;
}

/// Keeps a valid cached id, otherwise issues a random UUID v4.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomDeviceIdentity;

impl DeviceIdentity for RandomDeviceIdentity {
    fn provision(&self, cached: Option<&str>) -> String {
        match cached {
            Some(id) if is_valid_device_id(id) => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        }
    }
}

/// Always yields the same id, regardless of what the client cached.
#[derive(Debug, Clone)]
pub struct FixedDeviceIdentity(String);

impl FixedDeviceIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl DeviceIdentity for FixedDeviceIdentity {
    fn provision(&self, _cached: Option<&str>) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_device_ids() {
        assert!(is_valid_device_id("abc-123"));
        assert!(is_valid_device_id("9f1c2d1e-7c3b-4c55-9d8e-1f2a3b4c5d6e"));
        assert!(is_valid_device_id("device_01"));
    }

    #[test]
    fn test_invalid_device_ids() {
        assert!(!is_valid_device_id(""));
        assert!(!is_valid_device_id("has space"));
        assert!(!is_valid_device_id("../etc/passwd"));
        assert!(!is_valid_device_id(&"a".repeat(MAX_DEVICE_ID_LEN + 1)));
    }

    #[test]
    fn test_random_identity_keeps_valid_cached_id() {
        let id = RandomDeviceIdentity.provision(Some("abc-123"));
        assert_eq!(id, "abc-123");
    }

    #[test]
    fn test_random_identity_replaces_missing_or_invalid_id() {
        let fresh = RandomDeviceIdentity.provision(None);
        assert!(Uuid::parse_str(&fresh).is_ok());

        let replaced = RandomDeviceIdentity.provision(Some("not valid!"));
        assert_ne!(replaced, "not valid!");
        assert!(Uuid::parse_str(&replaced).is_ok());
    }

    #[test]
    fn test_fixed_identity_ignores_cache() {
        let identity = FixedDeviceIdentity::new("abc-123");
        assert_eq!(identity.provision(None), "abc-123");
        assert_eq!(identity.provision(Some("other")), "abc-123");
    }
}
