use std::path::Path;

pub mod bridge;
mod config;
mod engine;
mod error;
mod format;
mod geometry;
mod native;
mod options;
mod rotation;
mod transform;

pub use config::Config;
pub use engine::{
    Access, Angle, Direction, Engine, Extend, Interpretation, JpegLoadOptions, JpegSaveOptions,
    PngLoadOptions, PngSaveOptions, WebpSaveOptions,
};
pub use error::VipsError;
pub use format::ImageType;
pub use geometry::{calc_crop, normalize_angle, orientation_transform, Gravity};
pub use native::{initialize, print_all, shutdown, Image, Interpolate, Libvips};
pub use options::{Interpolator, Options};
pub use rotation::{auto_rotate_with, rotate_and_flip};
pub use transform::resize_with;

pub fn resize(buf: &[u8], options: &Options) -> Result<Vec<u8>, VipsError> {
    let vips = Libvips::new()?;
    resize_with(&vips, buf, options)
}

pub fn auto_rotate(
    path: impl AsRef<Path>,
    options: &Options,
) -> Result<Option<Vec<u8>>, VipsError> {
    let vips = Libvips::new()?;
    auto_rotate_with(&vips, path.as_ref(), options)
}

pub fn detect_type(buf: &[u8]) -> ImageType {
    ImageType::detect(buf)
}
