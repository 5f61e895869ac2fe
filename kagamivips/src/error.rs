use std::path::PathBuf;

/// Errors reported by kagamivips.
#[derive(thiserror::Error, Debug)]
pub enum VipsError {
    /// A libvips call returned a non-zero status. `code` is the status as
    /// returned by libvips, `message` the drained libvips error buffer.
    #[error("libvips failed with status {code}: {message}")]
    Vips { code: i32, message: String },

    /// `vips_init` refused to start.
    #[error("Unable to start libvips: {0}")]
    Init(String),

    /// The input is not a JPEG, PNG or WebP buffer.
    #[error("Unknown image format")]
    UnknownFormat,

    /// The input buffer has no bytes at all.
    #[error("Empty image buffer")]
    EmptyBuffer,

    /// The path cannot be handed to libvips as a C string.
    #[error("Invalid image path: {0}")]
    InvalidPath(PathBuf),
}

impl VipsError {
    /// The libvips status code, if this error came from a libvips call.
    pub fn code(&self) -> Option<i32> {
        match self {
            VipsError::Vips { code, .. } => Some(*code),
            _ => None,
        }
    }
}
