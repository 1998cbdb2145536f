//! Config validation with user-friendly error messages.

use crate::schema::PlateLogConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &PlateLogConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_vision(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_server(config: &PlateLogConfig, report: &mut ValidationReport) {
    if config.port() == 0 {
        report.error("server.port", "Port must be between 1 and 65535");
    }
    if config.max_upload_bytes() == 0 {
        report.error("server.maxUploadBytes", "Upload limit must be greater than zero");
    }
    if config.session_idle_timeout().is_zero() {
        report.error("server.sessionIdleSecs", "Session idle timeout must be greater than zero");
    }
    if config.bind().trim().is_empty() {
        report.error("server.bind", "Bind address must not be empty");
    }
}

fn validate_vision(config: &PlateLogConfig, report: &mut ValidationReport) {
    let provider = config.provider();
    if provider.is_remote() && config.api_key().is_none() {
        report.error(
            "vision.apiKey",
            format!("No API key configured for the {} provider", provider.as_str()),
        );
    }
    if config.timeout().is_zero() {
        report.error("vision.timeoutSecs", "Timeout must be greater than zero");
    }
    if let Some(url) = config.base_url() {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            report.error("vision.baseUrl", format!("Not an http(s) URL: {url}"));
        }
    }
    if !provider.is_remote() {
        report.warn("vision.provider", "Mock provider configured; detections are canned");
    }
}

fn validate_logging(config: &PlateLogConfig, report: &mut ValidationReport) {
    const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];
    let level = config.log_level();
    // Full filter directives such as `platelog=debug,tower_http=info` pass through.
    if !level.contains('=') && !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        report.warn("logging.level", format!("Unknown log level '{level}'"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ProviderKind, ServerConfig, VisionConfig};

    fn with_vision(vision: VisionConfig) -> PlateLogConfig {
        PlateLogConfig { vision: Some(vision), ..Default::default() }
    }

    #[test]
    fn test_missing_api_key_is_error() {
        let report = validate(&PlateLogConfig::default());
        assert!(!report.is_valid());
        assert!(report.errors.iter().any(|e| e.path == "vision.apiKey"));
    }

    #[test]
    fn test_keyed_gemini_is_valid() {
        let report = validate(&with_vision(VisionConfig {
            api_key: Some("k".into()),
            ..Default::default()
        }));
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn test_mock_needs_no_key_but_warns() {
        let report = validate(&with_vision(VisionConfig {
            provider: Some(ProviderKind::Mock),
            ..Default::default()
        }));
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_zero_port_and_timeout() {
        let config = PlateLogConfig {
            server: Some(ServerConfig { port: Some(0), ..Default::default() }),
            vision: Some(VisionConfig {
                provider: Some(ProviderKind::Mock),
                timeout_secs: Some(0),
                base_url: Some("ftp://nope".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let paths: Vec<_> = validate(&config).errors.into_iter().map(|e| e.path).collect();
        assert_eq!(paths, ["server.port", "vision.timeoutSecs", "vision.baseUrl"]);
    }
}
