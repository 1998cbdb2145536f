//! Session Event Logger
//!
//! Structured session lifecycle events routed through `tracing` under the
//! `session_events` target, so the JSON file layer keeps an audit trail.

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Started,
    Detected { record_id: String, plate_text: String },
    NoPlate,
    Failed { error_msg: String },
    Exported { rows: usize },
    Ended { records: usize },
}

#[derive(Debug, Serialize)]
pub struct SessionEventEntry {
    pub session_id: String,
    pub timestamp: DateTime<Local>,
    pub event: SessionEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Build the log entry for an event, scrubbing secrets from error text.
    pub fn entry(session_id: &str, mut event: SessionEvent) -> SessionEventEntry {
        if let SessionEvent::Failed { error_msg } = &mut event {
            *error_msg = redact_sensitive_data(error_msg);
        }
        SessionEventEntry {
            session_id: session_id.into(),
            timestamp: Local::now(),
            event,
        }
    }

    /// Log a session event; failures go out at `warn`, everything else at `info`.
    pub fn log_event(session_id: &str, event: SessionEvent) {
        let entry = Self::entry(session_id, event);
        let payload = serde_json::to_string(&entry).unwrap_or_default();
        match entry.event {
            SessionEvent::Failed { .. } => {
                warn!(target: "session_events", session = %entry.session_id, event = %payload, "Session event")
            }
            _ => info!(target: "session_events", session = %entry.session_id, event = %payload, "Session event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_event_is_redacted() {
        let entry = EventLogger::entry(
            "s1",
            SessionEvent::Failed { error_msg: "401 for ?key=AIzaSecretValue".into() },
        );
        assert_eq!(
            entry.event,
            SessionEvent::Failed { error_msg: "401 for ?key=[REDACTED_TOKEN]".into() }
        );
    }

    #[test]
    fn test_event_json_shape() {
        let entry = EventLogger::entry(
            "s1",
            SessionEvent::Detected { record_id: "0A1B2C3D".into(), plate_text: "ABC1234".into() },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["session_id"], "s1");
        assert_eq!(json["event"]["type"], "detected");
        assert_eq!(json["event"]["plate_text"], "ABC1234");
    }
}
