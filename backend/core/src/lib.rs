//! `platelog-core`: plate normalization, session log, detection workflow and
//! spreadsheet export.

pub mod error;
pub mod export;
pub mod media;
pub mod normalize;
pub mod session;
pub mod traits;
pub mod types;
pub mod workflow;

pub use error::PlateError;
pub use export::{export_xlsx, EXPORT_COLUMNS, EXPORT_FILE_NAME, XLSX_MIME};
pub use normalize::normalize;
pub use session::SessionLog;
pub use traits::{VisionProvider, VisionRequest};
pub use types::{DetectionRecord, ImageUpload, TIMESTAMP_FORMAT};
pub use workflow::{detect_plate, DetectionOutcome, PLATE_PROMPT};
