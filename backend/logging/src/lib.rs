//! Structured logging for PlateLog.
//!
//! Console plus optional rolling JSON file output, secret redaction, and
//! session lifecycle events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogger, SessionEvent, SessionEventEntry};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
