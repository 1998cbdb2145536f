//! Plate text normalization.

/// Keep only ASCII letters and digits from `raw`, in their original order.
///
/// Case is preserved. Whitespace, punctuation, line breaks and non-ASCII
/// characters are dropped.
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Whether `text` is already a valid plate: non-empty and purely alphanumeric.
pub fn is_plate_text(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric())
}
