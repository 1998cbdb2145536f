//! `platelog-config`: PlateLog runtime configuration management.
//!
//! Provides:
//! - Typed config schema (server, vision provider, logging)
//! - YAML read/write
//! - `${ENV_VAR}` substitution and `PLATELOG_*` overrides
//! - Default value application
//! - Validation and redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_raw, write_config};
pub use redact::redact;
pub use schema::{LoggingConfig, PlateLogConfig, ProviderKind, ServerConfig, VisionConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load a config file, substitute env vars, apply overrides and defaults.
///
/// This is the main entry point for loading a config at runtime. The
/// validation report is returned alongside the config; callers decide whether
/// errors are fatal and emit the findings once logging is up.
pub async fn load_and_prepare(path: &Path) -> Result<(PlateLogConfig, ValidationReport)> {
    let raw = load_raw(path).await?;
    prepare(&raw, &env::process_env())
}

/// The pure part of [`load_and_prepare`], over an explicit environment.
pub fn prepare(
    raw: &Value,
    env: &HashMap<String, String>,
) -> Result<(PlateLogConfig, ValidationReport)> {
    let value = resolve_env_vars_with(raw, env).context("Failed to resolve env vars in config")?;

    let config: PlateLogConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides(config, env)?;
    let config = apply_all_defaults(config);
    let report = validate(&config);

    Ok((config, report))
}

/// Emit validation findings through `tracing`.
pub fn log_report(report: &ValidationReport) {
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
}

/// Config snapshot with secrets masked, for display.
pub fn redacted_view(config: &PlateLogConfig) -> Result<Value> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    Ok(redact(&value))
}
