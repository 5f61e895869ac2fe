const MARKER_JPEG: &[u8] = &[0xff, 0xd8];
const MARKER_PNG: &[u8] = &[0x89, 0x50];
const MARKER_RIFF: &[u8] = b"RIFF";
const MARKER_WEBP: &[u8] = b"WEBP";

/// Encoded formats kagamivips can load and save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageType {
    #[default]
    Unknown,
    Jpeg,
    Png,
    Webp,
}

impl ImageType {
    /// Sniffs the format from the leading magic bytes.
    pub fn detect(buf: &[u8]) -> ImageType {
        if buf.starts_with(MARKER_JPEG) {
            ImageType::Jpeg
        } else if buf.starts_with(MARKER_PNG) {
            ImageType::Png
        } else if buf.starts_with(MARKER_RIFF) && buf.get(8..12) == Some(MARKER_WEBP) {
            ImageType::Webp
        } else {
            ImageType::Unknown
        }
    }
}
