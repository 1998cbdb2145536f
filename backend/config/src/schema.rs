//! PlateLog runtime configuration schema.
//!
//! Every field is optional in YAML; [`crate::apply_all_defaults`] fills the
//! gaps and the accessors fall back to the same defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults::{
    default_model_for, DEFAULT_BIND, DEFAULT_LOG_LEVEL, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT,
    DEFAULT_SESSION_IDLE_SECS, DEFAULT_TIMEOUT_SECS,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlateLogConfig {
    /// HTTP gateway settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Hosted vision provider settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<VisionConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Largest accepted image upload, in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
    /// Sessions untouched for this long are dropped with their log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_idle_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
    Mock,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Mock => "mock",
        }
    }

    /// Whether calls leave the process and need credentials.
    pub fn is_remote(&self) -> bool {
        !matches!(self, ProviderKind::Mock)
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(format!("unknown vision provider: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Override of the provider's API root (proxies, local test servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for daily-rotated JSON logs; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl PlateLogConfig {
    pub fn bind(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.bind.as_deref())
            .unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.server.as_ref().and_then(|s| s.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.server
            .as_ref()
            .and_then(|s| s.max_upload_bytes)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(
            self.server
                .as_ref()
                .and_then(|s| s.session_idle_secs)
                .unwrap_or(DEFAULT_SESSION_IDLE_SECS),
        )
    }

    pub fn provider(&self) -> ProviderKind {
        self.vision.as_ref().and_then(|v| v.provider).unwrap_or_default()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.vision
            .as_ref()
            .and_then(|v| v.api_key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn model(&self) -> &str {
        self.vision
            .as_ref()
            .and_then(|v| v.model.as_deref())
            .unwrap_or_else(|| default_model_for(self.provider()))
    }

    pub fn base_url(&self) -> Option<&str> {
        self.vision.as_ref().and_then(|v| v.base_url.as_deref())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.vision
                .as_ref()
                .and_then(|v| v.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.logging
            .as_ref()
            .and_then(|l| l.dir.as_ref())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_camel_case() {
        let yaml = r#"
server:
  port: 9090
  maxUploadBytes: 2048
vision:
  provider: openai
  apiKey: sk-test
  timeoutSecs: 5
"#;
        let config: PlateLogConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.port(), 9090);
        assert_eq!(config.max_upload_bytes(), 2048);
        assert_eq!(config.provider(), ProviderKind::OpenAi);
        assert_eq!(config.api_key(), Some("sk-test"));
        assert_eq!(config.model(), "gpt-4o");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.bind(), DEFAULT_BIND);
    }

    #[test]
    fn test_empty_config_accessors_fall_back() {
        let config = PlateLogConfig::default();
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.provider(), ProviderKind::Gemini);
        assert_eq!(config.model(), "gemini-2.0-flash");
        assert_eq!(config.api_key(), None);
        assert!(config.log_dir().is_none());
    }

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert!("tesseract".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = PlateLogConfig {
            vision: Some(VisionConfig { api_key: Some("  ".into()), ..Default::default() }),
            ..Default::default()
        };
        assert_eq!(config.api_key(), None);
    }
}
