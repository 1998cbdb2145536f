//! Single-shot plate detection over a session log.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::PlateError;
use crate::normalize::normalize;
use crate::session::SessionLog;
use crate::traits::{VisionProvider, VisionRequest};
use crate::types::{DetectionRecord, ImageUpload};

/// Fixed instruction sent with every image.
pub const PLATE_PROMPT: &str = "Read ONLY the vehicle's license plate in the image. \
Return only the alphanumeric characters of the plate, with no extra text, \
no explanation, no extra spaces and no symbols other than letters or digits. \
Example output: ABC1234";

/// Non-error result of a detection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetectionOutcome {
    /// A plate was read and appended to the log.
    Detected { record: DetectionRecord },
    /// Nothing legible survived normalization; the log is unchanged.
    NoPlate,
}

impl DetectionOutcome {
    pub fn plate_text(&self) -> Option<&str> {
        match self {
            DetectionOutcome::Detected { record } => Some(record.plate_text()),
            DetectionOutcome::NoPlate => None,
        }
    }
}

/// Run one detection attempt and append the result to `log` on success.
///
/// The log is only touched when the provider answered and the normalized
/// text is non-empty. Provider failures are returned as
/// [`PlateError::Inference`] without retrying.
#[instrument(skip_all, fields(provider = provider.name(), bytes = image.len(), mime = image.mime_type()))]
pub async fn detect_plate(
    provider: &dyn VisionProvider,
    log: &mut SessionLog,
    image: &ImageUpload,
) -> Result<DetectionOutcome, PlateError> {
    let request = VisionRequest {
        prompt: PLATE_PROMPT,
        image,
    };

    let raw = provider.describe(&request).await.map_err(|e| {
        warn!(error = %e, "Vision provider call failed");
        PlateError::Inference {
            provider: provider.name().to_string(),
            message: format!("{e:#}"),
        }
    })?;

    let plate = normalize(raw.trim());
    match DetectionRecord::new(plate) {
        Some(record) => {
            info!(plate = record.plate_text(), id = record.id(), "Plate detected");
            log.append(record.clone());
            Ok(DetectionOutcome::Detected { record })
        }
        None => {
            info!(raw = %raw, "No legible plate in provider response");
            Ok(DetectionOutcome::NoPlate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with a fixed text, or fails, and remembers the prompts it saw.
    struct ScriptedProvider {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn replying(text: &str) -> Self {
            Self { reply: Some(text.into()), prompts: Mutex::new(Vec::new()) }
        }

        fn failing() -> Self {
            Self { reply: None, prompts: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl VisionProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn describe(&self, req: &VisionRequest<'_>) -> Result<String> {
            self.prompts.lock().unwrap().push(req.prompt.to_string());
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => bail!("quota exceeded"),
            }
        }
    }

    fn jpeg() -> ImageUpload {
        ImageUpload::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3], None).unwrap()
    }

    #[tokio::test]
    async fn test_detection_appends_normalized_plate() {
        let provider = ScriptedProvider::replying("  ABC-1234 \n");
        let mut log = SessionLog::new();

        let outcome = detect_plate(&provider, &mut log, &jpeg()).await.unwrap();

        assert_eq!(outcome.plate_text(), Some("ABC1234"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].plate_text(), "ABC1234");
        assert_eq!(provider.prompts.lock().unwrap().as_slice(), [PLATE_PROMPT]);
    }

    #[tokio::test]
    async fn test_empty_normalization_leaves_log_unchanged() {
        let provider = ScriptedProvider::replying(" ### ");
        let mut log = SessionLog::new();
        log.append(DetectionRecord::new("KEEP1").unwrap());

        let outcome = detect_plate(&provider, &mut log, &jpeg()).await.unwrap();

        assert_eq!(outcome, DetectionOutcome::NoPlate);
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_plate_gets_distinct_ids() {
        let provider = ScriptedProvider::replying("7788 XYZ");
        let mut log = SessionLog::new();

        detect_plate(&provider, &mut log, &jpeg()).await.unwrap();
        detect_plate(&provider, &mut log, &jpeg()).await.unwrap();

        let records = log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].plate_text(), records[1].plate_text());
        assert_ne!(records[0].id(), records[1].id());
    }

    #[tokio::test]
    async fn test_provider_failure_does_not_mutate_log() {
        let provider = ScriptedProvider::failing();
        let mut log = SessionLog::new();
        log.append(DetectionRecord::new("BEFORE1").unwrap());
        let before = log.clone();

        let err = detect_plate(&provider, &mut log, &jpeg()).await.unwrap_err();

        match err {
            PlateError::Inference { provider, message } => {
                assert_eq!(provider, "scripted");
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(log.records(), before.records());
    }

    #[tokio::test]
    async fn test_session_stays_usable_after_failure() {
        let mut log = SessionLog::new();
        let _ = detect_plate(&ScriptedProvider::failing(), &mut log, &jpeg()).await;
        let ok = detect_plate(&ScriptedProvider::replying("B 42"), &mut log, &jpeg()).await;

        assert!(ok.is_ok());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(DetectionOutcome::NoPlate).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "no_plate" }));

        let record = DetectionRecord::new("Q1").unwrap();
        let json = serde_json::to_value(DetectionOutcome::Detected { record }).unwrap();
        assert_eq!(json["status"], "detected");
        assert_eq!(json["record"]["plateText"], "Q1");
    }
}
