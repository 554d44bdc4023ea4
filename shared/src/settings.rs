use serde::{Deserialize, Serialize};
use tracing::warn;

/// User preferences that survive logout.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppSettings {
    pub distance_lock: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            distance_lock: true,
        }
    }
}

impl AppSettings {
    /// Rebuilds settings from the persisted string. Anything other than
    /// `"true"`/`"false"` falls back to `defaults`.
    #[must_use]
    pub fn from_stored(value: Option<&str>, defaults: Self) -> Self {
        match value.map(str::trim) {
            Some("true") => Self {
                distance_lock: true,
            },
            Some("false") => Self {
                distance_lock: false,
            },
            Some(other) => {
                warn!(value = other, "malformed persisted distance lock; using default");
                defaults
            }
            None => defaults,
        }
    }

    #[must_use]
    pub fn distance_lock_value(&self) -> String {
        self.distance_lock.to_string()
    }
}
