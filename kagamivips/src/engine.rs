use std::path::Path;

use crate::VipsError;

/// How a loader is allowed to read pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Random,
    Sequential,
}

/// Fixed rotation steps understood by `vips_rot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Angle {
    #[default]
    D0,
    D90,
    D180,
    D270,
}

impl Angle {
    /// Maps a rotation in degrees to a fixed step. Anything but 90, 180 or
    /// 270 is the identity.
    pub fn from_degrees(degrees: i32) -> Angle {
        match degrees {
            90 => Angle::D90,
            180 => Angle::D180,
            270 => Angle::D270,
            _ => Angle::D0,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Angle::D0 => 0,
            Angle::D90 => 90,
            Angle::D180 => 180,
            Angle::D270 => 270,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// How `embed` fills the new pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extend {
    #[default]
    Black,
    White,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpretation {
    Srgb,
    BW,
    Cmyk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JpegLoadOptions {
    pub access: Option<Access>,
    /** Shrink-on-load factor, one of 1, 2, 4 or 8 */
    pub shrink: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PngLoadOptions {
    pub access: Option<Access>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JpegSaveOptions {
    /** Drop all metadata */
    pub strip: Option<bool>,
    pub quality: Option<i32>,
    pub optimize_coding: Option<bool>,
    pub interlace: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PngSaveOptions {
    pub interlace: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WebpSaveOptions {
    pub quality: Option<i32>,
}

/// The libvips entry points kagamivips relies on.
///
/// Each method stands for exactly one libvips call. Optional arguments that
/// are `None` are left to libvips' own defaults. [`crate::Libvips`] is the
/// real implementation; the shim in [`crate::bridge`] and the pipelines are
/// written against this trait only.
pub trait Engine {
    /// An owned image handle.
    type Image;
    /// An owned interpolator handle.
    type Interpolate;

    fn jpegload_buffer(
        &self,
        buf: &[u8],
        options: &JpegLoadOptions,
    ) -> Result<Self::Image, VipsError>;
    fn pngload_buffer(
        &self,
        buf: &[u8],
        options: &PngLoadOptions,
    ) -> Result<Self::Image, VipsError>;
    fn webpload_buffer(&self, buf: &[u8]) -> Result<Self::Image, VipsError>;
    fn magickload_buffer(&self, buf: &[u8]) -> Result<Self::Image, VipsError>;
    fn new_from_file(&self, path: &Path) -> Result<Self::Image, VipsError>;

    fn interpolate_new(&self, nickname: &str) -> Result<Self::Interpolate, VipsError>;

    /// `matrix` is `[a, b, c, d]`.
    fn affine(
        &self,
        image: &Self::Image,
        matrix: [f64; 4],
        interpolate: Option<&Self::Interpolate>,
    ) -> Result<Self::Image, VipsError>;
    fn shrink(
        &self,
        image: &Self::Image,
        xshrink: f64,
        yshrink: f64,
    ) -> Result<Self::Image, VipsError>;
    fn copy(&self, image: &Self::Image) -> Result<Self::Image, VipsError>;
    fn embed(
        &self,
        image: &Self::Image,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        extend: Option<Extend>,
    ) -> Result<Self::Image, VipsError>;
    fn extract_area(
        &self,
        image: &Self::Image,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
    ) -> Result<Self::Image, VipsError>;
    fn colourspace(
        &self,
        image: &Self::Image,
        space: Interpretation,
    ) -> Result<Self::Image, VipsError>;
    fn rot(&self, image: &Self::Image, angle: Angle) -> Result<Self::Image, VipsError>;
    fn flip(&self, image: &Self::Image, direction: Direction) -> Result<Self::Image, VipsError>;
    fn autorot(&self, image: &Self::Image) -> Result<Self::Image, VipsError>;

    fn jpegsave_buffer(
        &self,
        image: &Self::Image,
        options: &JpegSaveOptions,
    ) -> Result<Vec<u8>, VipsError>;
    fn pngsave_buffer(
        &self,
        image: &Self::Image,
        options: &PngSaveOptions,
    ) -> Result<Vec<u8>, VipsError>;
    fn webpsave_buffer(
        &self,
        image: &Self::Image,
        options: &WebpSaveOptions,
    ) -> Result<Vec<u8>, VipsError>;

    fn width(&self, image: &Self::Image) -> i32;
    fn height(&self, image: &Self::Image) -> i32;

    /// Reads a string metadata field. `None` when the field is missing or is
    /// not a string.
    fn get_string(&self, image: &Self::Image, field: &str) -> Option<String>;
    /// Removes a metadata field, returning whether it existed.
    fn remove(&self, image: &mut Self::Image, field: &str) -> bool;

    /// Releases per-thread state once a pipeline is done.
    fn thread_cleanup(&self) {}
}

/// Runs [`Engine::thread_cleanup`] when a pipeline returns, on every path.
pub(crate) struct CleanupGuard<'a, E: Engine>(pub &'a E);

impl<E: Engine> Drop for CleanupGuard<'_, E> {
    fn drop(&mut self) {
        self.0.thread_cleanup();
    }
}
