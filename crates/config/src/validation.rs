//! Configuration validation utilities

use crate::schema::{parse_signing_key, Config, RelayConfig};
use std::collections::HashSet;

/// Longest timeout accepted for relay requests, in seconds
const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate complete configuration
    pub fn validate(config: &Config) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_signing_key(config, &mut report);
        Self::validate_relays(config, &mut report);
        Self::validate_transport(config, &mut report);
        Self::validate_logging(config, &mut report);

        report
    }

    fn validate_signing_key(config: &Config, report: &mut ValidationReport) {
        if let Some(ref key) = config.signing_key {
            if parse_signing_key(key).is_err() {
                report.add_error("signing_key", "Signing key is not a valid secp256k1 private key");
            }
        }
    }

    fn validate_relays(config: &Config, report: &mut ValidationReport) {
        if config.relays.is_empty() {
            report.add_error("relays", "At least one relay must be configured");
            return;
        }

        let enabled_count = config.enabled_relays().count();
        if enabled_count == 0 {
            report.add_error("relays", "At least one relay must be enabled");
        }

        if enabled_count == 1 {
            report.add_warning("relays", "Only one relay is enabled, consider enabling multiple relays for redundancy");
        }

        let mut names = HashSet::new();
        for relay in &config.relays {
            if !names.insert(relay.name.as_str()) {
                report.add_error("relays", &format!("Duplicate relay name: {}", relay.name));
            }

            Self::validate_relay(relay, config.signing_key.as_deref(), report);
        }
    }

    fn validate_relay(relay: &RelayConfig, default_key: Option<&str>, report: &mut ValidationReport) {
        if relay.name.is_empty() {
            report.add_error("relays.name", "Relay name cannot be empty");
        }

        Self::validate_url(&relay.name, "relays.url", &relay.url, report);

        if let Some(ref simulation_url) = relay.simulation_url {
            if !simulation_url.is_empty() {
                Self::validate_url(&relay.name, "relays.simulation_url", simulation_url, report);
            }
        }

        if let Some(ref key) = relay.signing_key {
            if parse_signing_key(key).is_err() {
                report.add_error(
                    "relays.signing_key",
                    &format!("Signing key for relay {} is not a valid secp256k1 private key", relay.name),
                );
            }
        }

        if relay.enabled && relay.resolve_signing_key(default_key).is_none() {
            report.add_error(
                "relays.signing_key",
                &format!("No signing key for relay {} and no default signing_key", relay.name),
            );
        }
    }

    fn validate_url(relay: &str, field: &str, url: &str, report: &mut ValidationReport) {
        if url.is_empty() {
            report.add_error(field, &format!("URL cannot be empty for relay {}", relay));
        } else if !url.starts_with("http://") && !url.starts_with("https://") {
            report.add_error(field, &format!("Invalid URL format for relay {}: {}", relay, url));
        } else if !url.starts_with("https://") {
            report.add_warning(field, &format!("URL for relay {} should use HTTPS", relay));
        }
    }

    fn validate_transport(config: &Config, report: &mut ValidationReport) {
        let transport = &config.transport;

        for (field, value) in [
            ("transport.timeout_seconds", transport.timeout_seconds),
            ("transport.connect_timeout_seconds", transport.connect_timeout_seconds),
        ] {
            if value == 0 {
                report.add_error(field, "Timeout cannot be 0");
            } else if value > MAX_TIMEOUT_SECONDS {
                report.add_error(
                    field,
                    &format!("Timeout too high ({}s, max {}s)", value, MAX_TIMEOUT_SECONDS),
                );
            }
        }

        if transport.connect_timeout_seconds > transport.timeout_seconds {
            report.add_warning(
                "transport.connect_timeout_seconds",
                "Connect timeout is longer than the request timeout",
            );
        }

        if transport.pool_max_idle_per_host == 0 {
            report.add_warning(
                "transport.pool_max_idle_per_host",
                "Connection pooling is disabled, every request opens a new connection",
            );
        }

        if transport.user_agent.is_empty() {
            report.add_warning("transport.user_agent", "User agent is empty");
        }
    }

    fn validate_logging(config: &Config, report: &mut ValidationReport) {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.logging.level.as_str()) {
            report.add_error("logging.level", &format!("Invalid log level: {}. Valid levels: {:?}", config.logging.level, valid_levels));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&config.logging.format.as_str()) {
            report.add_error("logging.format", &format!("Invalid log format: {}. Valid formats: {:?}", config.logging.format, valid_formats));
        }

        if config.logging.level == "trace" || config.logging.level == "debug" {
            report.add_warning("logging.level", "Debug/trace logging may impact performance in production");
        }
    }
}

/// Validation report containing errors and warnings
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation issue (error or warning)
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> String {
        format!("Validation: {} errors, {} warnings", self.errors.len(), self.warnings.len())
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0x9c03d71f2cab3ac367e407e25ed213c56b50957a1f75d9f6b4f9be00066d6963";

    fn valid_config() -> Config {
        let mut config = Config {
            signing_key: Some(TEST_KEY.to_string()),
            ..Config::default()
        };
        config.relays.push(RelayConfig {
            name: "backup".to_string(),
            url: "https://backup.example".to_string(),
            simulation_url: None,
            signing_key: None,
            enabled: true,
        });
        config
    }

    fn has_error(report: &ValidationReport, field: &str) -> bool {
        report.errors.iter().any(|issue| issue.field == field)
    }

    fn has_warning(report: &ValidationReport, field: &str) -> bool {
        report.warnings.iter().any(|issue| issue.field == field)
    }

    #[test]
    fn test_valid_config() {
        let report = ConfigValidator::validate(&valid_config());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(!report.has_warnings(), "{:?}", report.warnings);
    }

    #[test]
    fn test_duplicate_relay_names() {
        let mut config = valid_config();
        config.relays[1].name = "flashbots".to_string();

        let report = ConfigValidator::validate(&config);
        assert!(report
            .errors
            .iter()
            .any(|issue| issue.message == "Duplicate relay name: flashbots"));
    }

    #[test]
    fn test_relay_urls() {
        let mut config = valid_config();
        config.relays[0].url = "http://localhost:8545".to_string();
        config.relays[1].simulation_url = Some("ftp://backup.example".to_string());

        let report = ConfigValidator::validate(&config);
        assert!(has_warning(&report, "relays.url"));
        assert!(has_error(&report, "relays.simulation_url"));
    }

    #[test]
    fn test_signing_keys() {
        let mut config = valid_config();
        config.signing_key = None;
        config.relays[0].signing_key = Some("0xdeadbeef".to_string());

        let report = ConfigValidator::validate(&config);
        let key_errors: Vec<_> = report
            .errors
            .iter()
            .filter(|issue| issue.field == "relays.signing_key")
            .collect();
        // flashbots has a malformed key, backup has none at all
        assert_eq!(key_errors.len(), 2);
        assert!(key_errors.iter().all(|issue| !issue.message.contains("deadbeef")));
    }

    #[test]
    fn test_disabled_relay_needs_no_key() {
        let mut config = valid_config();
        config.signing_key = None;
        config.relays[0].signing_key = Some(TEST_KEY.to_string());
        config.relays[1].enabled = false;

        let report = ConfigValidator::validate(&config);
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(has_warning(&report, "relays"));
    }

    #[test]
    fn test_transport_limits() {
        let mut config = valid_config();
        config.transport.timeout_seconds = 0;
        config.transport.connect_timeout_seconds = 301;
        config.transport.pool_max_idle_per_host = 0;

        let report = ConfigValidator::validate(&config);
        assert!(has_error(&report, "transport.timeout_seconds"));
        assert!(has_error(&report, "transport.connect_timeout_seconds"));
        assert!(has_warning(&report, "transport.pool_max_idle_per_host"));
    }

    #[test]
    fn test_logging() {
        let mut config = valid_config();
        config.logging.level = "verbose".to_string();
        config.logging.format = "xml".to_string();

        let report = ConfigValidator::validate(&config);
        assert!(has_error(&report, "logging.level"));
        assert!(has_error(&report, "logging.format"));
        assert_eq!(report.summary(), "Validation: 2 errors, 0 warnings");
    }
}
