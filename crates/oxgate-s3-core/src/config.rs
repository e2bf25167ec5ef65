//! Gateway configuration.
//!
//! Provides [`GatewayConfig`] for configuring the oxgate request core.
//! Configuration values are loaded from environment variables.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Gateway configuration.
///
/// All fields have sensible defaults. Configuration can be loaded from
/// environment variables via [`GatewayConfig::from_env`].
///
/// # Examples
///
/// ```
/// use oxgate_s3_core::config::GatewayConfig;
///
/// let config = GatewayConfig::default();
/// assert_eq!(config.default_region, "us-east-1");
/// assert_eq!(config.body_chunk_hint, 4096);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Region assigned to buckets whose create request carries no
    /// location constraint.
    #[builder(default = String::from("us-east-1"))]
    pub default_region: String,

    /// Preferred body chunk size (in bytes) advertised to the transport.
    #[builder(default = 4096)]
    pub body_chunk_hint: usize,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_region: String::from("us-east-1"),
            body_chunk_hint: 4096,
            log_level: String::from("info"),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `DEFAULT_REGION` | `us-east-1` |
    /// | `BODY_CHUNK_HINT` | `4096` |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("DEFAULT_REGION") {
            config.default_region = v;
        }
        if let Ok(v) = std::env::var("BODY_CHUNK_HINT") {
            if let Ok(n) = v.parse::<usize>() {
                config.body_chunk_hint = n;
            }
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}
