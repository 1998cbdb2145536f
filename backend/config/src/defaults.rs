//! Config defaults: applies default values to parsed config.

use crate::schema::{LoggingConfig, PlateLogConfig, ProviderKind, ServerConfig, VisionConfig};

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
/// 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// One hour.
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 3600;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Model used when the config names none.
pub fn default_model_for(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Gemini => "gemini-2.0-flash",
        ProviderKind::OpenAi => "gpt-4o",
        ProviderKind::Mock => "mock",
    }
}

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: PlateLogConfig) -> PlateLogConfig {
    let config = apply_server_defaults(config);
    let config = apply_vision_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: PlateLogConfig) -> PlateLogConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    server.max_upload_bytes.get_or_insert(DEFAULT_MAX_UPLOAD_BYTES);
    server.session_idle_secs.get_or_insert(DEFAULT_SESSION_IDLE_SECS);
    config
}

fn apply_vision_defaults(mut config: PlateLogConfig) -> PlateLogConfig {
    let vision = config.vision.get_or_insert_with(VisionConfig::default);
    let kind = *vision.provider.get_or_insert(ProviderKind::default());
    vision.model.get_or_insert_with(|| default_model_for(kind).to_string());
    vision.timeout_secs.get_or_insert(DEFAULT_TIMEOUT_SECS);
    config
}

fn apply_logging_defaults(mut config: PlateLogConfig) -> PlateLogConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_every_section() {
        let config = apply_all_defaults(PlateLogConfig::default());
        let server = config.server.as_ref().unwrap();
        assert_eq!(server.port, Some(DEFAULT_PORT));
        assert_eq!(server.max_upload_bytes, Some(DEFAULT_MAX_UPLOAD_BYTES));
        let vision = config.vision.as_ref().unwrap();
        assert_eq!(vision.provider, Some(ProviderKind::Gemini));
        assert_eq!(vision.model.as_deref(), Some("gemini-2.0-flash"));
        assert_eq!(config.logging.unwrap().level.as_deref(), Some("info"));
    }

    #[test]
    fn test_model_default_follows_provider() {
        let config = PlateLogConfig {
            vision: Some(VisionConfig {
                provider: Some(ProviderKind::OpenAi),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = apply_all_defaults(config);
        assert_eq!(config.vision.unwrap().model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_explicit_values_survive() {
        let config = PlateLogConfig {
            server: Some(ServerConfig { port: Some(3000), ..Default::default() }),
            ..Default::default()
        };
        assert_eq!(apply_all_defaults(config).port(), 3000);
    }
}
