use crate::{engine::Extend, geometry::Gravity, ImageType};

/// Resampling kernel used for the residual (non-integral) part of a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolator {
    #[default]
    Bicubic,
    Bilinear,
    Nohalo,
}

impl Interpolator {
    /// The libvips nickname of the interpolator.
    pub fn nickname(self) -> &'static str {
        match self {
            Interpolator::Bicubic => "bicubic",
            Interpolator::Bilinear => "bilinear",
            Interpolator::Nohalo => "nohalo",
        }
    }
}

impl std::fmt::Display for Interpolator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.nickname())
    }
}

/// What to do with an image. Zero width and height keep the input size.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Options {
    pub width: i32,
    pub height: i32,
    /** Fill the box and cut what overflows instead of fitting inside it */
    pub crop: bool,
    /** Allow upscaling of images smaller than the box */
    pub enlarge: bool,
    pub extend: Extend,
    /** Pad the fitted image up to the box */
    pub embed: bool,
    pub interpolator: Interpolator,
    pub gravity: Gravity,
    /** Encoder quality, 100 when unset */
    pub quality: Option<i32>,
    /** Crop origin as a fraction of the width, for `Gravity::Custom` */
    pub left_pos: f32,
    /** Crop origin as a fraction of the height, for `Gravity::Custom` */
    pub top_pos: f32,
    /** Output format. `Unknown` saves as JPEG */
    pub save_type: ImageType,
    pub no_auto_rotate: bool,
    /** Clockwise rotation in degrees */
    pub rotate: i32,
    pub flip: bool,
    pub flop: bool,
}

impl Options {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn quality(&self) -> i32 {
        match self.quality {
            Some(quality) if quality != 0 => quality,
            _ => 100,
        }
    }
}
