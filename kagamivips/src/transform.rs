use log::debug;

use crate::bridge;
use crate::engine::{CleanupGuard, Engine, Interpretation};
use crate::geometry::calc_crop;
use crate::{ImageType, Options, VipsError};

/// Integral shrink factor libjpeg can apply while decoding, if any.
fn jpeg_shrink_on_load(shrink: i32) -> i32 {
    match shrink {
        s if s >= 8 => 8,
        s if s >= 4 => 4,
        s if s >= 2 => 2,
        _ => 1,
    }
}

/// Decodes `buf`, resizes it as `options` ask and encodes it again.
///
/// The bulk of the reduction is an integral shrink (on load for JPEG, then
/// with `vips_shrink`), the remaining fraction goes through an affine
/// transform with the requested interpolator. The result is cropped or
/// embedded to the exact box when `crop` or `embed` is set, converted to
/// sRGB and saved as `options.save_type`.
pub fn resize_with<E: Engine>(
    engine: &E,
    buf: &[u8],
    options: &Options,
) -> Result<Vec<u8>, VipsError> {
    debug!("{:?}", options);
    let _cleanup = CleanupGuard(engine);

    if buf.is_empty() {
        return Err(VipsError::EmptyBuffer);
    }

    let image_type = ImageType::detect(buf);
    let mut image = match image_type {
        ImageType::Jpeg => bridge::jpegload_buffer_seq(engine, buf)?,
        ImageType::Png => bridge::pngload_buffer_seq(engine, buf)?,
        ImageType::Webp => bridge::webpload_buffer(engine, buf)?,
        ImageType::Unknown => return Err(VipsError::UnknownFormat),
    };

    let in_width = engine.width(&image);
    let in_height = engine.height(&image);

    let mut width = options.width;
    let mut height = options.height;
    let mut factor = if width > 0 && height > 0 {
        let xf = in_width as f64 / width as f64;
        let yf = in_height as f64 / height as f64;
        if options.crop {
            xf.min(yf)
        } else {
            xf.max(yf)
        }
    } else if width > 0 {
        let factor = in_width as f64 / width as f64;
        height = (in_height as f64 / factor).floor() as i32;
        factor
    } else if height > 0 {
        let factor = in_height as f64 / height as f64;
        width = (in_width as f64 / factor).floor() as i32;
        factor
    } else {
        width = in_width;
        height = in_height;
        1.0
    };

    debug!(
        "transform from {}x{} to {}x{}",
        in_width, in_height, width, height
    );

    let mut shrink = (factor.floor() as i32).max(1);
    let mut residual = shrink as f64 / factor;

    // Never upscale an image that already fits unless asked to
    if !options.enlarge && in_width < width && in_height < height {
        factor = 1.0;
        shrink = 1;
        residual = 0.0;
        width = in_width;
        height = in_height;
    }

    debug!(
        "factor: {}, shrink: {}, residual: {}",
        factor, shrink, residual
    );

    let shrink_on_load = if image_type == ImageType::Jpeg {
        jpeg_shrink_on_load(shrink)
    } else {
        1
    };

    if shrink_on_load > 1 {
        debug!("shrink on load {}", shrink_on_load);
        factor = (factor / shrink_on_load as f64).max(1.0);
        shrink = factor.floor() as i32;
        residual = shrink as f64 / factor;
        image = bridge::jpegload_buffer_shrink(engine, buf, shrink_on_load)?;
    }

    if shrink > 1 {
        debug!("shrink {}", shrink);
        image = bridge::shrink(engine, &image, shrink as f64, shrink as f64)?;

        // The shrunk size is rounded, so measure what is left to do
        let residual_x = width as f64 / engine.width(&image) as f64;
        let residual_y = height as f64 / engine.height(&image) as f64;
        residual = if options.crop {
            residual_x.max(residual_y)
        } else {
            residual_x.min(residual_y)
        };
    }

    if residual != 0.0 {
        debug!("residual {:.2} with {}", residual, options.interpolator);
        let interpolate = engine.interpolate_new(options.interpolator.nickname())?;
        image = bridge::affine_interpolator(
            engine,
            &image,
            residual,
            0.0,
            0.0,
            residual,
            &interpolate,
        )?;
    }

    let affined_width = engine.width(&image);
    let affined_height = engine.height(&image);

    if affined_width != width || affined_height != height {
        if options.crop {
            let (left, top) = calc_crop(
                affined_width,
                affined_height,
                width,
                height,
                options.left_pos,
                options.top_pos,
                options.gravity,
            );
            width = width.min(affined_width);
            height = height.min(affined_height);
            debug!("cropping {}x{} at {},{}", width, height, left, top);
            image = bridge::extract_area(engine, &image, left.max(0), top.max(0), width, height)?;
        } else if options.embed {
            let left = (width - affined_width) / 2;
            let top = (height - affined_height) / 2;
            debug!("embedding with extend {:?}", options.extend);
            image = bridge::embed_extend(engine, &image, left, top, width, height, options.extend)?;
        }
    } else {
        debug!("canvas same as affined");
    }

    let image = bridge::colourspace(engine, &image, Interpretation::Srgb)?;
    save(engine, &image, options)
}

/// Encodes `image` as `options.save_type`, JPEG unless PNG or WebP is asked.
pub(crate) fn save<E: Engine>(
    engine: &E,
    image: &E::Image,
    options: &Options,
) -> Result<Vec<u8>, VipsError> {
    let quality = options.quality();
    match options.save_type {
        ImageType::Webp => bridge::webpsave(engine, image, quality),
        ImageType::Png => bridge::pngsave(engine, image, false),
        ImageType::Jpeg | ImageType::Unknown => bridge::jpegsave(engine, image, true, quality, false),
    }
}
