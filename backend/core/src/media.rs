//! MIME type detection for uploaded images.

use std::path::Path;

/// Type assumed when neither the upload nor its bytes say otherwise.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Detect an image MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png"          => Some("image/png"),
        "gif"          => Some("image/gif"),
        "webp"         => Some("image/webp"),
        "bmp"          => Some("image/bmp"),
        "tiff" | "tif" => Some("image/tiff"),
        _              => None,
    }
}

/// Detect an image MIME type from its leading magic bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Whether a MIME type is for an image.
pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lookup() {
        assert_eq!(detect_mime_type(Path::new("car.JPG")), Some("image/jpeg"));
        assert_eq!(detect_mime_type(Path::new("car.png")), Some("image/png"));
        assert_eq!(detect_mime_type(Path::new("notes.txt")), None);
        assert_eq!(detect_mime_type(Path::new("no_extension")), None);
    }

    #[test]
    fn test_magic_bytes() {
        assert_eq!(sniff_image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_image_mime(b"GIF89a...."), Some("image/gif"));
        assert_eq!(sniff_image_mime(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_image_mime(b"RIFF"), None);
        assert_eq!(sniff_image_mime(&[]), None);
    }
}
