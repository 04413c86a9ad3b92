//! Configuration schema definitions

use std::str::FromStr;

use alloy::signers::local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use types::{ConfigError, RelayEndpoint, TransportConfig};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Signing key used by relays that do not set their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_key: Option<String>,
    /// HTTP transport settings shared by all relays
    #[serde(default)]
    pub transport: TransportConfig,
    /// Relays bundles are sent to
    pub relays: Vec<RelayConfig>,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Relay name, unique within the config
    pub name: String,
    /// Endpoint for `eth_sendBundle` and stats requests
    pub url: String,
    /// Endpoint for `eth_callBundle`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_url: Option<String>,
    /// Per-relay signing key, overriding the top-level one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_key: Option<String>,
    /// Whether this relay is used
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl RelayConfig {
    /// Signing key for this relay, falling back to `default_key`
    pub fn resolve_signing_key<'a>(&'a self, default_key: Option<&'a str>) -> Option<&'a str> {
        self.signing_key
            .as_deref()
            .or(default_key)
            .filter(|key| !key.trim().is_empty())
    }
}

impl Config {
    /// Enabled relays
    pub fn enabled_relays(&self) -> impl Iterator<Item = &RelayConfig> {
        self.relays.iter().filter(|relay| relay.enabled)
    }

    /// Convert enabled relay configs into endpoints a relay client can be built from
    pub fn relay_endpoints(&self) -> Result<Vec<RelayEndpoint>, ConfigError> {
        self.enabled_relays()
            .map(|relay| -> Result<RelayEndpoint, ConfigError> {
                let field = format!("relays.{}.signing_key", relay.name);
                let key = relay
                    .resolve_signing_key(self.signing_key.as_deref())
                    .ok_or_else(|| ConfigError::MissingField {
                        field: field.clone(),
                    })?;
                let signing_key = parse_signing_key(key).map_err(|_| ConfigError::InvalidValue {
                    field,
                    value: "<redacted>".to_string(),
                })?;

                Ok(RelayEndpoint {
                    name: relay.name.clone(),
                    main_endpoint: relay.url.clone(),
                    simulation_endpoint: relay
                        .simulation_url
                        .clone()
                        .filter(|url| !url.is_empty()),
                    signing_key,
                })
            })
            .collect()
    }
}

/// Parse a hex private key, with or without `0x`
pub fn parse_signing_key(key: &str) -> Result<PrivateKeySigner, alloy::signers::local::LocalSignerError> {
    PrivateKeySigner::from_str(key.trim())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            signing_key: None,
            transport: TransportConfig::default(),
            relays: vec![RelayConfig {
                name: "flashbots".to_string(),
                url: "https://relay.flashbots.net".to_string(),
                simulation_url: Some("https://relay.flashbots.net".to_string()),
                signing_key: None,
                enabled: true,
            }],
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0x9c03d71f2cab3ac367e407e25ed213c56b50957a1f75d9f6b4f9be00066d6963";

    fn relay(name: &str, signing_key: Option<&str>, enabled: bool) -> RelayConfig {
        RelayConfig {
            name: name.to_string(),
            url: format!("https://{}.example", name),
            simulation_url: None,
            signing_key: signing_key.map(str::to_string),
            enabled,
        }
    }

    #[test]
    fn test_relay_endpoints_use_default_key() {
        let config = Config {
            signing_key: Some(TEST_KEY.to_string()),
            relays: vec![relay("alpha", None, true), relay("beta", None, false)],
            ..Config::default()
        };

        let endpoints = config.relay_endpoints().unwrap();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].name, "alpha");
        assert_eq!(endpoints[0].main_endpoint, "https://alpha.example");
        assert!(endpoints[0].simulation_endpoint.is_none());
        assert_eq!(
            endpoints[0].signing_key.address().to_checksum(None),
            "0xb73C1b61eECdD422A095E619d121C3162fd9fD51"
        );
    }

    #[test]
    fn test_relay_key_overrides_default() {
        let other = PrivateKeySigner::random();
        let other_hex = alloy::hex::encode(other.to_bytes());
        let config = Config {
            signing_key: Some(TEST_KEY.to_string()),
            relays: vec![relay("alpha", Some(&other_hex), true)],
            ..Config::default()
        };

        let endpoints = config.relay_endpoints().unwrap();
        assert_eq!(endpoints[0].signing_key.address(), other.address());
    }

    #[test]
    fn test_missing_signing_key() {
        let config = Config {
            relays: vec![relay("alpha", None, true)],
            ..Config::default()
        };

        let err = config.relay_endpoints().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field } if field == "relays.alpha.signing_key"));
    }

    #[test]
    fn test_invalid_signing_key_is_redacted() {
        let config = Config {
            relays: vec![relay("alpha", Some("0xnot-a-key-but-secret"), true)],
            ..Config::default()
        };

        let err = config.relay_endpoints().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(!err.to_string().contains("secret"));
    }
}
