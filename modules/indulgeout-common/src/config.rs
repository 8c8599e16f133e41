use std::env;
use std::str::FromStr;

use tracing::info;

use crate::error::DiscoveryError;

pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const DEFAULT_RADIUS_KM: f64 = 25.0;

/// Discovery defaults loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Page size used when a filter does not carry one.
    pub default_page_size: usize,
    /// Radius used by the nearby filter when a filter does not carry one.
    pub default_radius_km: f64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            default_radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

impl DiscoveryConfig {
    /// Load configuration from environment variables (and `.env`, if present).
    /// Every variable is optional; a present but unparsable value is an error.
    pub fn from_env() -> Result<Self, DiscoveryError> {
        dotenvy::dotenv().ok();
        Self::from_env_prefixed("INDULGEOUT")
    }

    /// Read `{prefix}_DEFAULT_PAGE_SIZE` and `{prefix}_DEFAULT_RADIUS_KM`
    /// from the process environment only.
    pub fn from_env_prefixed(prefix: &str) -> Result<Self, DiscoveryError> {
        let page_size_key = format!("{prefix}_DEFAULT_PAGE_SIZE");
        let radius_key = format!("{prefix}_DEFAULT_RADIUS_KM");

        let config = Self {
            default_page_size: env_or(&page_size_key, DEFAULT_PAGE_SIZE)?,
            default_radius_km: env_or(&radius_key, DEFAULT_RADIUS_KM)?,
        };
        config.validate(&page_size_key, &radius_key)?;
        config.log_values();
        Ok(config)
    }

    fn validate(&self, page_size_key: &str, radius_key: &str) -> Result<(), DiscoveryError> {
        if self.default_page_size == 0 {
            return Err(DiscoveryError::Config(format!(
                "{page_size_key} must be at least 1"
            )));
        }
        if !self.default_radius_km.is_finite() || self.default_radius_km < 0.0 {
            return Err(DiscoveryError::Config(format!(
                "{radius_key} must be a non-negative number, got {}",
                self.default_radius_km
            )));
        }
        Ok(())
    }

    fn log_values(&self) {
        info!(
            default_page_size = self.default_page_size,
            default_radius_km = self.default_radius_km,
            "Discovery config loaded"
        );
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, DiscoveryError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| DiscoveryError::Config(format!("{key}={raw:?} is invalid: {e}"))),
        _ => Ok(default),
    }
}
