use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::EARTH_RADIUS_KM;

pub const DEFAULT_TOKEN_REFRESH_LEAD_MS: u64 = 30_000;
pub const DEFAULT_ERROR_DISPLAY_MS: u64 = 3_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("earth radius must be positive and finite, got {0}")]
    EarthRadius(f64),
    #[error("error display time must be non-zero")]
    ZeroErrorDisplay,
}

/// Tunables the shell may override at start-up. Missing fields fall back to
/// the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub earth_radius_km: f64,
    /// How long before token expiry the refresh fires.
    pub token_refresh_lead_ms: u64,
    /// Lifetime of an entry in the error queue.
    pub error_display_ms: u64,
    /// Used when no persisted value exists or it can't be parsed.
    pub default_distance_lock: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            earth_radius_km: EARTH_RADIUS_KM,
            token_refresh_lead_ms: DEFAULT_TOKEN_REFRESH_LEAD_MS,
            error_display_ms: DEFAULT_ERROR_DISPLAY_MS,
            default_distance_lock: true,
        }
    }
}

impl CoreConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.earth_radius_km.is_finite() || self.earth_radius_km <= 0.0 {
            return Err(ConfigError::EarthRadius(self.earth_radius_km));
        }
        if self.error_display_ms == 0 {
            return Err(ConfigError::ZeroErrorDisplay);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = CoreConfig::from_json("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.token_refresh_lead_ms, 30_000);
        assert_eq!(config.error_display_ms, 3_000);
        assert!(config.default_distance_lock);
    }

    #[test]
    fn partial_override() {
        let config = CoreConfig::from_json(r#"{"error_display_ms": 5000}"#).unwrap();
        assert_eq!(config.error_display_ms, 5_000);
        assert_eq!(config.earth_radius_km, EARTH_RADIUS_KM);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            CoreConfig::from_json(r#"{"earth_radius_km": -1.0}"#),
            Err(ConfigError::EarthRadius(_))
        ));
        assert!(matches!(
            CoreConfig::from_json(r#"{"error_display_ms": 0}"#),
            Err(ConfigError::ZeroErrorDisplay)
        ));
        assert!(matches!(
            CoreConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
