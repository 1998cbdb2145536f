//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` substitution inside YAML string values, resolved at load
//!   time. Only uppercase `[A-Z_][A-Z0-9_]*` names match; `$${VAR}` escapes
//!   to a literal `${VAR}`.
//! - Direct overrides (`PLATELOG_*`, provider API key variables) applied on
//!   top of the file.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{PlateLogConfig, ProviderKind, ServerConfig, VisionConfig};

/// Matches `${VAR}` and, with the optional leading `$`, its escaped form.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var regex"));

pub const ENV_BIND: &str = "PLATELOG_BIND";
pub const ENV_PORT: &str = "PLATELOG_PORT";
pub const ENV_PROVIDER: &str = "PLATELOG_PROVIDER";
pub const ENV_LOG_DIR: &str = "PLATELOG_LOG_DIR";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references in a config JSON value tree.
///
/// Only string leaves are processed. A referenced var that is unset or
/// empty is an error naming the config path.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[1];
        if caps[0].starts_with("$$") {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Apply `PLATELOG_*` overrides and fill a missing API key from the
/// provider's conventional variable.
pub fn apply_env_overrides(
    mut config: PlateLogConfig,
    env: &HashMap<String, String>,
) -> Result<PlateLogConfig> {
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(bind) = get(ENV_BIND) {
        config.server.get_or_insert_with(ServerConfig::default).bind = Some(bind.to_string());
    }
    if let Some(port) = get(ENV_PORT) {
        let port: u16 = port
            .parse()
            .with_context(|| format!("{ENV_PORT} is not a valid port: {port}"))?;
        config.server.get_or_insert_with(ServerConfig::default).port = Some(port);
    }
    if let Some(provider) = get(ENV_PROVIDER) {
        let kind: ProviderKind = provider.parse().map_err(anyhow::Error::msg)?;
        let vision = config.vision.get_or_insert_with(VisionConfig::default);
        if vision.provider != Some(kind) {
            // A model named for another provider would not resolve.
            vision.model = None;
        }
        vision.provider = Some(kind);
    }
    if let Some(dir) = get(ENV_LOG_DIR) {
        config.logging.get_or_insert_with(Default::default).dir = Some(dir.to_string());
    }

    if config.api_key().is_none() {
        let key_vars: &[&str] = match config.provider() {
            ProviderKind::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            ProviderKind::OpenAi => &["OPENAI_API_KEY"],
            ProviderKind::Mock => &[],
        };
        if let Some(key) = key_vars.iter().find_map(|name| get(*name)) {
            config.vision.get_or_insert_with(VisionConfig::default).api_key = Some(key.to_string());
        }
    }

    Ok(config)
}
