//! Flattened libvips calls with fixed default arguments.
//!
//! Every function forwards to exactly one [`Engine`] method. Whatever the
//! engine reports, including the libvips status code, is returned unchanged.

use std::path::Path;

use crate::engine::*;
use crate::VipsError;

/// Metadata field holding the EXIF orientation tag of a loaded image.
pub const EXIF_ORIENTATION: &str = "exif-ifd0-Orientation";

pub fn affine_interpolator<E: Engine>(
    engine: &E,
    image: &E::Image,
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    interpolate: &E::Interpolate,
) -> Result<E::Image, VipsError> {
    engine.affine(image, [a, b, c, d], Some(interpolate))
}

pub fn jpegload_buffer_seq<E: Engine>(engine: &E, buf: &[u8]) -> Result<E::Image, VipsError> {
    let options = JpegLoadOptions {
        access: Some(Access::Sequential),
        ..Default::default()
    };
    engine.jpegload_buffer(buf, &options)
}

pub fn jpegload_buffer_shrink<E: Engine>(
    engine: &E,
    buf: &[u8],
    shrink: i32,
) -> Result<E::Image, VipsError> {
    let options = JpegLoadOptions {
        shrink: Some(shrink),
        ..Default::default()
    };
    engine.jpegload_buffer(buf, &options)
}

pub fn pngload_buffer_seq<E: Engine>(engine: &E, buf: &[u8]) -> Result<E::Image, VipsError> {
    let options = PngLoadOptions {
        access: Some(Access::Sequential),
    };
    engine.pngload_buffer(buf, &options)
}

pub fn webpload_buffer<E: Engine>(engine: &E, buf: &[u8]) -> Result<E::Image, VipsError> {
    engine.webpload_buffer(buf)
}

pub fn magickload_buffer<E: Engine>(engine: &E, buf: &[u8]) -> Result<E::Image, VipsError> {
    engine.magickload_buffer(buf)
}

pub fn shrink<E: Engine>(
    engine: &E,
    image: &E::Image,
    xshrink: f64,
    yshrink: f64,
) -> Result<E::Image, VipsError> {
    engine.shrink(image, xshrink, yshrink)
}

pub fn copy<E: Engine>(engine: &E, image: &E::Image) -> Result<E::Image, VipsError> {
    engine.copy(image)
}

pub fn embed_extend<E: Engine>(
    engine: &E,
    image: &E::Image,
    left: i32,
    top: i32,
    width: i32,
    height: i32,
    extend: Extend,
) -> Result<E::Image, VipsError> {
    engine.embed(image, left, top, width, height, Some(extend))
}

pub fn colourspace<E: Engine>(
    engine: &E,
    image: &E::Image,
    space: Interpretation,
) -> Result<E::Image, VipsError> {
    engine.colourspace(image, space)
}

pub fn extract_area<E: Engine>(
    engine: &E,
    image: &E::Image,
    left: i32,
    top: i32,
    width: i32,
    height: i32,
) -> Result<E::Image, VipsError> {
    engine.extract_area(image, left, top, width, height)
}

/// JPEG with Huffman table optimisation always on.
pub fn jpegsave<E: Engine>(
    engine: &E,
    image: &E::Image,
    strip: bool,
    quality: i32,
    interlace: bool,
) -> Result<Vec<u8>, VipsError> {
    let options = JpegSaveOptions {
        strip: Some(strip),
        quality: Some(quality),
        optimize_coding: Some(true),
        interlace: Some(interlace),
    };
    engine.jpegsave_buffer(image, &options)
}

pub fn webpsave<E: Engine>(
    engine: &E,
    image: &E::Image,
    quality: i32,
) -> Result<Vec<u8>, VipsError> {
    let options = WebpSaveOptions {
        quality: Some(quality),
    };
    engine.webpsave_buffer(image, &options)
}

pub fn pngsave<E: Engine>(
    engine: &E,
    image: &E::Image,
    interlace: bool,
) -> Result<Vec<u8>, VipsError> {
    let options = PngSaveOptions {
        interlace: Some(interlace),
    };
    engine.pngsave_buffer(image, &options)
}

/// The EXIF orientation of `image`, or 0 when it carries none.
pub fn exif_orientation<E: Engine>(engine: &E, image: &E::Image) -> i32 {
    engine
        .get_string(image, EXIF_ORIENTATION)
        .map_or(0, |tag| parse_orientation(&tag))
}

/// Reads the leading integer of an orientation tag such as
/// `"6 (Rotate 90 CW, Short, 1 components, 2 bytes)"`, the way C `atoi` does.
pub fn parse_orientation(tag: &str) -> i32 {
    let tag = tag.trim_start();
    let (negative, digits) = match tag.as_bytes().first() {
        Some(b'-') => (true, &tag[1..]),
        Some(b'+') => (false, &tag[1..]),
        _ => (false, tag),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |acc, digit| {
            acc.saturating_mul(10).saturating_add((digit - b'0') as i32)
        });

    if negative {
        -value
    } else {
        value
    }
}

pub fn rotate<E: Engine>(engine: &E, image: &E::Image, degrees: i32) -> Result<E::Image, VipsError> {
    engine.rot(image, Angle::from_degrees(degrees))
}

pub fn autorotate<E: Engine>(engine: &E, image: &E::Image) -> Result<E::Image, VipsError> {
    engine.autorot(image)
}

pub fn flip<E: Engine>(
    engine: &E,
    image: &E::Image,
    direction: Direction,
) -> Result<E::Image, VipsError> {
    engine.flip(image, direction)
}

pub fn remove_exif<E: Engine>(engine: &E, image: &mut E::Image, field: &str) -> bool {
    engine.remove(image, field)
}

pub fn load_from_file<E: Engine>(engine: &E, path: &Path) -> Result<E::Image, VipsError> {
    engine.new_from_file(path)
}
