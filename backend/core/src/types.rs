use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::error::PlateError;
use crate::media::{is_image, sniff_image_mime, DEFAULT_IMAGE_MIME};
use crate::normalize::is_plate_text;

/// Rendering used for `detected_at` everywhere it leaves the process.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Length of a record id.
pub const RECORD_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Detection record
// ---------------------------------------------------------------------------

/// One entry of a session log, produced by a successful detection.
///
/// Fields are private so a record can only exist with a non-empty,
/// alphanumeric plate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRecord {
    id: String,
    plate_text: String,
    #[serde(serialize_with = "serialize_timestamp")]
    detected_at: NaiveDateTime,
}

impl DetectionRecord {
    /// Build a record stamped with the current local time.
    ///
    /// Returns `None` unless `plate_text` is non-empty and alphanumeric.
    pub fn new(plate_text: impl Into<String>) -> Option<Self> {
        Self::at(plate_text, Local::now().naive_local())
    }

    /// Build a record with an explicit detection time, truncated to seconds.
    pub fn at(plate_text: impl Into<String>, detected_at: NaiveDateTime) -> Option<Self> {
        let plate_text = plate_text.into();
        if !is_plate_text(&plate_text) {
            return None;
        }
        Some(Self {
            id: generate_record_id(),
            plate_text,
            detected_at: detected_at.with_nanosecond(0).unwrap_or(detected_at),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn plate_text(&self) -> &str {
        &self.plate_text
    }

    pub fn detected_at(&self) -> NaiveDateTime {
        self.detected_at
    }

    /// `detected_at` as `YYYY-MM-DD HH:MM:SS`.
    pub fn detected_at_display(&self) -> String {
        self.detected_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Short uppercase id: the first 8 hex digits of a random UUID v4.
pub fn generate_record_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(RECORD_ID_LEN);
    id.make_ascii_uppercase();
    id
}

fn serialize_timestamp<S: Serializer>(at: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&at.format(TIMESTAMP_FORMAT))
}

// ---------------------------------------------------------------------------
// Image upload
// ---------------------------------------------------------------------------

/// Raw image bytes plus the MIME type sent to the vision provider.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    bytes: Vec<u8>,
    mime_type: String,
}

impl ImageUpload {
    /// Wrap an uploaded payload.
    ///
    /// A declared `image/*` type wins. Otherwise the type is sniffed from the
    /// magic bytes, falling back to JPEG. A declared non-image type other
    /// than `application/octet-stream` is rejected.
    pub fn new(bytes: Vec<u8>, declared_mime: Option<&str>) -> Result<Self, PlateError> {
        if bytes.is_empty() {
            return Err(PlateError::EmptyImage);
        }

        let declared = declared_mime
            .map(|m| m.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty());

        let mime_type = match declared {
            Some(mime) if is_image(&mime) => mime,
            Some(mime) if mime != "application/octet-stream" => {
                return Err(PlateError::UnsupportedMedia(mime));
            }
            _ => sniff_image_mime(&bytes)
                .unwrap_or(DEFAULT_IMAGE_MIME)
                .to_string(),
        };

        Ok(Self { bytes, mime_type })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
