use std::path::Path;

use log::debug;

use crate::bridge;
use crate::engine::{Angle, CleanupGuard, Direction, Engine};
use crate::geometry::{normalize_angle, orientation_transform};
use crate::transform::save;
use crate::{Options, VipsError};

/// Applies the rotation and flips asked by `options` to `image`.
///
/// Unless `no_auto_rotate` is set, the EXIF orientation fills in what the
/// caller left out: its flip always applies, its rotation only when
/// `options.rotate` is 0.
pub fn rotate_and_flip<E: Engine>(
    engine: &E,
    image: E::Image,
    options: &Options,
) -> Result<E::Image, VipsError> {
    let mut rotate = options.rotate;
    let mut flip = options.flip;

    if !options.no_auto_rotate && options.rotate <= 0 {
        let (exif_angle, exif_flip) = orientation_transform(bridge::exif_orientation(engine, &image));
        flip |= exif_flip;
        if exif_angle != Angle::D0 && rotate == 0 {
            rotate = exif_angle.degrees();
        }
    }

    let mut image = image;
    if rotate > 0 {
        let degrees = normalize_angle(rotate);
        debug!("rotate {}", degrees);
        image = bridge::rotate(engine, &image, degrees)?;
    }

    let direction = if flip {
        Some(Direction::Horizontal)
    } else if options.flop {
        Some(Direction::Vertical)
    } else {
        None
    };

    if let Some(direction) = direction {
        debug!("flip {:?}", direction);
        image = bridge::flip(engine, &image, direction)?;
    }

    Ok(image)
}

/// Rotates the image at `path` upright according to its EXIF orientation
/// and encodes it as `options.save_type`.
///
/// Returns `Ok(None)` when the image is already upright.
pub fn auto_rotate_with<E: Engine>(
    engine: &E,
    path: &Path,
    options: &Options,
) -> Result<Option<Vec<u8>>, VipsError> {
    debug!("{:?}", options);
    let _cleanup = CleanupGuard(engine);

    let image = bridge::load_from_file(engine, path)?;

    let orientation = bridge::exif_orientation(engine, &image);
    let (angle, flip) = orientation_transform(orientation);
    if angle == Angle::D0 && !flip {
        debug!("{} needs no rotation", path.display());
        return Ok(None);
    }

    debug!("orientation {} of {}", orientation, path.display());
    let rotated = bridge::autorotate(engine, &image)?;
    save(engine, &rotated, options).map(Some)
}
