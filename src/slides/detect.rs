//! Content sniffing for uploaded images and exported PDFs.

use std::sync::OnceLock;

use regex::bytes::Regex;

/// Image encodings accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Bmp,
}

impl ImageFormat {
    /// Get the MIME type for this image format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Bmp => "image/bmp",
        }
    }

    /// Get the file extension for this image format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::WebP => "webp",
            Self::Bmp => "bmp",
        }
    }
}

/// Number of leading bytes inspected by [`detect_image_format`].
pub const SNIFF_LEN: usize = 12;

/// Detect image format from magic bytes.
///
/// Only the first [`SNIFF_LEN`] bytes are looked at. Input shorter than a
/// format's signature is never that format.
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    let prefix = &bytes[..bytes.len().min(SNIFF_LEN)];

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if prefix.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some(ImageFormat::Png);
    }

    // JPEG: FF D8 FF
    if prefix.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ImageFormat::Jpeg);
    }

    // GIF87a / GIF89a
    if prefix.starts_with(b"GIF87a") || prefix.starts_with(b"GIF89a") {
        return Some(ImageFormat::Gif);
    }

    // WebP: RIFF <size> WEBP
    if prefix.len() >= 12 && prefix.starts_with(b"RIFF") && &prefix[8..12] == b"WEBP" {
        return Some(ImageFormat::WebP);
    }

    // BMP: 42 4D (BM), plus at least a file-size field
    if prefix.len() >= 6 && prefix.starts_with(b"BM") {
        return Some(ImageFormat::Bmp);
    }

    None
}

static PAGE_MARKER: OnceLock<Regex> = OnceLock::new();

/// Approximate page count of a PDF by counting `/Type /Page` markers.
///
/// This is a byte scan, not a parser. The page-tree node `/Type /Pages`
/// shares the prefix and is excluded by looking at the byte that follows
/// the match. Returns 0 when nothing matches.
pub fn count_pdf_pages(bytes: &[u8]) -> usize {
    let re = PAGE_MARKER.get_or_init(|| Regex::new(r"/Type\s*/Page").unwrap());

    re.find_iter(bytes)
        .filter(|m| match bytes.get(m.end()) {
            Some(next) => !next.is_ascii_alphanumeric(),
            None => true,
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_known_signatures() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
        assert_eq!(detect_image_format(&png), Some(ImageFormat::Png));

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        assert_eq!(detect_image_format(&jpeg), Some(ImageFormat::Jpeg));

        assert_eq!(detect_image_format(b"GIF89a\x01\x00"), Some(ImageFormat::Gif));
        assert_eq!(detect_image_format(b"GIF87a\x01\x00"), Some(ImageFormat::Gif));
        assert_eq!(
            detect_image_format(b"RIFF\x24\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::WebP)
        );
        assert_eq!(
            detect_image_format(b"BM\x36\x00\x0c\x00\x00\x00"),
            Some(ImageFormat::Bmp)
        );
    }

    #[test]
    fn test_truncated_or_unknown_is_none() {
        assert_eq!(detect_image_format(&[]), None);
        assert_eq!(detect_image_format(&[0x89, 0x50]), None);
        assert_eq!(detect_image_format(b"GIF8"), None);
        assert_eq!(detect_image_format(b"RIFF\x24\x00\x00\x00WAVE"), None);
        assert_eq!(detect_image_format(b"BM"), None);
        assert_eq!(detect_image_format(b"%PDF-1.7\n%"), None);
        assert_eq!(detect_image_format(b"hello world, not an image"), None);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let data = b"\xFF\xD8\xFF\xDB rest of jpeg";
        let first = detect_image_format(data);
        for _ in 0..3 {
            assert_eq!(detect_image_format(data), first);
        }
    }

    #[test]
    fn test_mime_and_extension() {
        assert_eq!(ImageFormat::WebP.mime_type(), "image/webp");
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
    }

    #[test]
    fn test_page_count_excludes_page_tree() {
        let pdf = b"%PDF-1.4\n\
            1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
            2 0 obj << /Type /Pages /Kids [3 0 R 4 0 R 5 0 R] /Count 3 >> endobj\n\
            3 0 obj << /Type /Page /Parent 2 0 R >> endobj\n\
            4 0 obj << /Type/Page /Parent 2 0 R >> endobj\n\
            5 0 obj << /Type /Page\n/Parent 2 0 R >> endobj\n\
            %%EOF";
        assert_eq!(count_pdf_pages(pdf), 3);
    }

    #[test]
    fn test_page_count_zero_without_markers() {
        assert_eq!(count_pdf_pages(b""), 0);
        assert_eq!(count_pdf_pages(b"not a pdf at all"), 0);
        assert_eq!(count_pdf_pages(b"<< /Type /Pages /Count 0 >>"), 0);
    }

    #[test]
    fn test_page_marker_at_end_of_input_counts() {
        assert_eq!(count_pdf_pages(b"<< /Type /Page"), 1);
    }
}
