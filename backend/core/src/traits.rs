use anyhow::Result;
use async_trait::async_trait;

use crate::types::ImageUpload;

/// Trait for hosted image-understanding services.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name (e.g., "gemini", "openai").
    fn name(&self) -> &str;

    /// Send an instruction plus an image and return the raw response text.
    ///
    /// Transport, quota and parse failures, as well as a response without a
    /// text part, are all reported as `Err`.
    async fn describe(&self, request: &VisionRequest<'_>) -> Result<String>;
}

/// Request to a vision provider.
#[derive(Debug, Clone, Copy)]
pub struct VisionRequest<'a> {
    pub prompt: &'a str,
    pub image: &'a ImageUpload,
}
