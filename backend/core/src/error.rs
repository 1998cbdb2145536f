use thiserror::Error;

/// Top-level error type for PlateLog.
///
/// An empty detection is not an error; see [`crate::DetectionOutcome::NoPlate`].
#[derive(Debug, Error)]
pub enum PlateError {
    #[error("no image payload was provided")]
    EmptyImage,

    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("vision provider error ({provider}): {message}")]
    Inference { provider: String, message: String },

    #[error("session log is empty; nothing to export")]
    EmptyLog,

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rust_xlsxwriter::XlsxError> for PlateError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        PlateError::Export(err.to_string())
    }
}
