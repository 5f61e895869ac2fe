#![allow(dead_code)]

use std::{cell::RefCell, collections::HashMap, path::Path, path::PathBuf};

use kagamivips::*;

/// What the mock engine pretends an image is.
#[derive(Debug, Clone, PartialEq)]
pub struct MockImage {
    pub width: i32,
    pub height: i32,
    pub fields: HashMap<String, String>,
}

impl MockImage {
    pub fn new(width: i32, height: i32) -> Self {
        MockImage {
            width,
            height,
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    fn sized(&self, width: i32, height: i32) -> Self {
        MockImage {
            width,
            height,
            fields: self.fields.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockInterpolate(pub String);

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    JpegLoad { len: usize, options: JpegLoadOptions },
    PngLoad { len: usize, options: PngLoadOptions },
    WebpLoad { len: usize },
    MagickLoad { len: usize },
    LoadFile(PathBuf),
    InterpolateNew(String),
    Affine { matrix: [f64; 4], interpolate: Option<String> },
    Shrink { xshrink: f64, yshrink: f64 },
    Copy,
    Embed { left: i32, top: i32, width: i32, height: i32, extend: Option<Extend> },
    ExtractArea { left: i32, top: i32, width: i32, height: i32 },
    Colourspace(Interpretation),
    Rot(Angle),
    Flip(Direction),
    Autorot,
    JpegSave(JpegSaveOptions),
    PngSave(PngSaveOptions),
    WebpSave(WebpSaveOptions),
    Remove(String),
}

/// Records every call and answers with plausible image sizes.
pub struct MockEngine {
    pub source: MockImage,
    pub calls: RefCell<Vec<Call>>,
    pub cleanups: RefCell<usize>,
    /// Operation name that fails, with the status it fails with
    pub fail: Option<(&'static str, i32)>,
    /// Pixels the affine output comes back short by on each axis
    pub affine_shortfall: i32,
}

impl MockEngine {
    pub fn new(source: MockImage) -> Self {
        MockEngine {
            source,
            calls: RefCell::new(Vec::new()),
            cleanups: RefCell::new(0),
            fail: None,
            affine_shortfall: 0,
        }
    }

    /// An engine whose affine rounds down and lands under the requested size.
    pub fn short_affine(source: MockImage, shortfall: i32) -> Self {
        MockEngine {
            affine_shortfall: shortfall,
            ..Self::new(source)
        }
    }

    pub fn failing(source: MockImage, operation: &'static str, code: i32) -> Self {
        MockEngine {
            fail: Some((operation, code)),
            ..Self::new(source)
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn cleanups(&self) -> usize {
        *self.cleanups.borrow()
    }

    fn record<T>(&self, operation: &str, call: Call, result: T) -> Result<T, VipsError> {
        self.calls.borrow_mut().push(call);
        match self.fail {
            Some((failing, code)) if failing == operation => Err(VipsError::Vips {
                code,
                message: format!("{} failed", operation),
            }),
            _ => Ok(result),
        }
    }
}

fn scale(size: i32, factor: f64) -> i32 {
    (size as f64 * factor).round() as i32
}

impl Engine for MockEngine {
    type Image = MockImage;
    type Interpolate = MockInterpolate;

    fn jpegload_buffer(&self, buf: &[u8], options: &JpegLoadOptions) -> Result<MockImage, VipsError> {
        // libjpeg rounds shrink-on-load up
        let shrink = options.shrink.unwrap_or(1);
        let width = (self.source.width + shrink - 1) / shrink;
        let height = (self.source.height + shrink - 1) / shrink;
        let call = Call::JpegLoad {
            len: buf.len(),
            options: *options,
        };
        self.record("jpegload", call, self.source.sized(width, height))
    }

    fn pngload_buffer(&self, buf: &[u8], options: &PngLoadOptions) -> Result<MockImage, VipsError> {
        let call = Call::PngLoad {
            len: buf.len(),
            options: *options,
        };
        self.record("pngload", call, self.source.clone())
    }

    fn webpload_buffer(&self, buf: &[u8]) -> Result<MockImage, VipsError> {
        self.record("webpload", Call::WebpLoad { len: buf.len() }, self.source.clone())
    }

    fn magickload_buffer(&self, buf: &[u8]) -> Result<MockImage, VipsError> {
        self.record("magickload", Call::MagickLoad { len: buf.len() }, self.source.clone())
    }

    fn new_from_file(&self, path: &Path) -> Result<MockImage, VipsError> {
        self.record("load_file", Call::LoadFile(path.to_path_buf()), self.source.clone())
    }

    fn interpolate_new(&self, nickname: &str) -> Result<MockInterpolate, VipsError> {
        let call = Call::InterpolateNew(nickname.to_string());
        self.record("interpolate_new", call, MockInterpolate(nickname.to_string()))
    }

    fn affine(
        &self,
        image: &MockImage,
        matrix: [f64; 4],
        interpolate: Option<&MockInterpolate>,
    ) -> Result<MockImage, VipsError> {
        let call = Call::Affine {
            matrix,
            interpolate: interpolate.map(|i| i.0.clone()),
        };
        let out = image.sized(
            scale(image.width, matrix[0]) - self.affine_shortfall,
            scale(image.height, matrix[3]) - self.affine_shortfall,
        );
        self.record("affine", call, out)
    }

    fn shrink(&self, image: &MockImage, xshrink: f64, yshrink: f64) -> Result<MockImage, VipsError> {
        let out = image.sized(
            (image.width as f64 / xshrink).floor() as i32,
            (image.height as f64 / yshrink).floor() as i32,
        );
        self.record("shrink", Call::Shrink { xshrink, yshrink }, out)
    }

    fn copy(&self, image: &MockImage) -> Result<MockImage, VipsError> {
        self.record("copy", Call::Copy, image.clone())
    }

    fn embed(
        &self,
        image: &MockImage,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        extend: Option<Extend>,
    ) -> Result<MockImage, VipsError> {
        let call = Call::Embed {
            left,
            top,
            width,
            height,
            extend,
        };
        self.record("embed", call, image.sized(width, height))
    }

    fn extract_area(
        &self,
        image: &MockImage,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
    ) -> Result<MockImage, VipsError> {
        let call = Call::ExtractArea {
            left,
            top,
            width,
            height,
        };
        self.record("extract_area", call, image.sized(width, height))
    }

    fn colourspace(&self, image: &MockImage, space: Interpretation) -> Result<MockImage, VipsError> {
        self.record("colourspace", Call::Colourspace(space), image.clone())
    }

    fn rot(&self, image: &MockImage, angle: Angle) -> Result<MockImage, VipsError> {
        let out = match angle {
            Angle::D90 | Angle::D270 => image.sized(image.height, image.width),
            _ => image.clone(),
        };
        self.record("rot", Call::Rot(angle), out)
    }

    fn flip(&self, image: &MockImage, direction: Direction) -> Result<MockImage, VipsError> {
        self.record("flip", Call::Flip(direction), image.clone())
    }

    fn autorot(&self, image: &MockImage) -> Result<MockImage, VipsError> {
        self.record("autorot", Call::Autorot, image.clone())
    }

    fn jpegsave_buffer(&self, _image: &MockImage, options: &JpegSaveOptions) -> Result<Vec<u8>, VipsError> {
        self.record("jpegsave", Call::JpegSave(*options), b"jpeg".to_vec())
    }

    fn pngsave_buffer(&self, _image: &MockImage, options: &PngSaveOptions) -> Result<Vec<u8>, VipsError> {
        self.record("pngsave", Call::PngSave(*options), b"png".to_vec())
    }

    fn webpsave_buffer(&self, _image: &MockImage, options: &WebpSaveOptions) -> Result<Vec<u8>, VipsError> {
        self.record("webpsave", Call::WebpSave(*options), b"webp".to_vec())
    }

    fn width(&self, image: &MockImage) -> i32 {
        image.width
    }

    fn height(&self, image: &MockImage) -> i32 {
        image.height
    }

    fn get_string(&self, image: &MockImage, field: &str) -> Option<String> {
        image.fields.get(field).cloned()
    }

    fn remove(&self, image: &mut MockImage, field: &str) -> bool {
        self.calls.borrow_mut().push(Call::Remove(field.to_string()));
        image.fields.remove(field).is_some()
    }

    fn thread_cleanup(&self) {
        *self.cleanups.borrow_mut() += 1;
    }
}

pub const JPEG: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
pub const WEBP: &[u8] = b"RIFF\x24\0\0\0WEBPVP8 ";
