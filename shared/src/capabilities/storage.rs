//! Typed keys over the `crux_kv` key-value store (platform preferences on
//! the shell side). Values are UTF-8 strings stored as bytes.

use crux_kv::error::KeyValueError;
use crux_kv::KeyValue;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::event::Event;

pub type KvCapability = KeyValue<Event>;

/// What `crux_kv` hands back for a read, or the previous value for a write.
pub type StoredValue = Result<Option<Vec<u8>>, KeyValueError>;

/// The keys the core persists. Raw names match what earlier app versions
/// wrote, so existing installs keep their login and settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKey {
    Email,
    Password,
    DistanceLock,
}

impl StorageKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StorageKey::Email => "email",
            StorageKey::Password => "password",
            StorageKey::DistanceLock => "settings/distanceLock",
        }
    }

    #[must_use]
    pub fn raw(self) -> String {
        self.as_str().to_string()
    }

    /// Decodes a read. Absent, empty, non-UTF-8 and failed reads all come
    /// back as `None`; the last two are logged.
    #[must_use]
    pub fn decode(self, stored: StoredValue) -> Option<String> {
        match stored {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(value) => Some(value).filter(|v| !v.is_empty()),
                Err(e) => {
                    warn!(key = self.as_str(), error = %e, "stored value is not utf-8");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = self.as_str(), error = %e, "storage read failed");
                None
            }
        }
    }
}

#[must_use]
pub fn encode(value: impl Into<String>) -> Vec<u8> {
    value.into().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_key_names() {
        assert_eq!(StorageKey::Email.raw(), "email");
        assert_eq!(StorageKey::Password.raw(), "password");
        assert_eq!(StorageKey::DistanceLock.raw(), "settings/distanceLock");
    }

    #[test]
    fn decodes_utf8_values() {
        assert_eq!(
            StorageKey::Email.decode(Ok(Some(encode("rider@example.com")))),
            Some("rider@example.com".to_string())
        );
    }

    #[test]
    fn absent_empty_and_garbled_values_are_none() {
        assert_eq!(StorageKey::Email.decode(Ok(None)), None);
        assert_eq!(StorageKey::Email.decode(Ok(Some(Vec::new()))), None);
        assert_eq!(
            StorageKey::Password.decode(Ok(Some(vec![0xff, 0xfe]))),
            None
        );
    }
}
