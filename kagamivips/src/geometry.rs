use crate::engine::Angle;

/// Which part of the image survives a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    #[default]
    Centre,
    North,
    East,
    South,
    West,
    /// Origin taken from `Options::left_pos` / `Options::top_pos`.
    Custom,
}

/// Top-left corner of an `out_width`x`out_height` crop of an
/// `in_width`x`in_height` image.
pub fn calc_crop(
    in_width: i32,
    in_height: i32,
    out_width: i32,
    out_height: i32,
    left_pos: f32,
    top_pos: f32,
    gravity: Gravity,
) -> (i32, i32) {
    let centre_left = (in_width - out_width + 1) / 2;
    let centre_top = (in_height - out_height + 1) / 2;

    match gravity {
        Gravity::Centre => (centre_left, centre_top),
        Gravity::North => (centre_left, 0),
        Gravity::East => (in_width - out_width, centre_top),
        Gravity::South => (centre_left, in_height - out_height),
        Gravity::West => (0, centre_top),
        Gravity::Custom => (
            custom_offset(in_width, out_width, left_pos),
            custom_offset(in_height, out_height, top_pos),
        ),
    }
}

fn custom_offset(in_size: i32, out_size: i32, position: f32) -> i32 {
    let offset = in_size as f32 * position;
    if offset + out_size as f32 > in_size as f32 {
        in_size - out_size
    } else {
        offset as i32
    }
}

/// Rounds a rotation down to a multiple of 90 degrees, at most 270.
pub fn normalize_angle(degrees: i32) -> i32 {
    (degrees - degrees % 90).min(270)
}

/// The rotation and horizontal flip that bring an image with the given EXIF
/// orientation upright.
pub fn orientation_transform(orientation: i32) -> (Angle, bool) {
    match orientation {
        6 => (Angle::D90, false),
        3 => (Angle::D180, false),
        8 => (Angle::D270, false),
        2 => (Angle::D0, true),
        7 => (Angle::D90, true),
        4 => (Angle::D180, true),
        5 => (Angle::D270, true),
        _ => (Angle::D0, false),
    }
}
