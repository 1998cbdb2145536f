//! Hosted vision providers for plate reading.

pub mod mock;
pub mod vision;

pub use mock::MockVision;
pub use vision::{GeminiVision, OpenAiVision};

use std::sync::Arc;

use anyhow::{Context, Result};
use platelog_config::{PlateLogConfig, ProviderKind};
use platelog_core::VisionProvider;
use tracing::info;

/// Build the vision provider named by the config.
pub fn provider_from_config(config: &PlateLogConfig) -> Result<Arc<dyn VisionProvider>> {
    let kind = config.provider();
    let provider: Arc<dyn VisionProvider> = match kind {
        ProviderKind::Gemini => {
            let key = config.api_key().context("Gemini provider requires vision.apiKey")?;
            let mut gemini = GeminiVision::new(key, config.timeout())?.with_model(config.model());
            if let Some(url) = config.base_url() {
                gemini = gemini.with_base_url(url);
            }
            Arc::new(gemini)
        }
        ProviderKind::OpenAi => {
            let key = config.api_key().context("OpenAI provider requires vision.apiKey")?;
            let mut openai = OpenAiVision::new(key, config.timeout())?.with_model(config.model());
            if let Some(url) = config.base_url() {
                openai = openai.with_base_url(url);
            }
            Arc::new(openai)
        }
        ProviderKind::Mock => Arc::new(MockVision::new()),
    };
    info!(provider = kind.as_str(), model = config.model(), "Vision provider ready");
    Ok(provider)
}
