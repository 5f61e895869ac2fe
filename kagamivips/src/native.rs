use std::{
    ffi::{c_void, CStr, CString},
    fmt::Debug,
    os::raw::{c_char, c_int},
    path::Path,
    ptr::{self, NonNull},
    rc::Rc,
    sync::{Mutex, PoisonError},
};

use libvips_sys::*;
use log::{debug, warn};

use crate::engine::*;
use crate::{Config, VipsError};

// Terminates every variadic option list.
const END: *const c_char = ptr::null();

enum State {
    Idle,
    Running(Config),
    // libvips cannot be started again once it was shut down
    Stopped,
}

static STATE: Mutex<State> = Mutex::new(State::Idle);

/// Starts libvips and applies `config`. Calling it again is a no-op, calling
/// it after [`shutdown`] fails.
pub fn initialize(config: &Config) -> Result<(), VipsError> {
    let mut state = STATE.lock().unwrap_or_else(PoisonError::into_inner);
    match &*state {
        State::Idle => {}
        State::Running(current) => {
            if current != config {
                warn!(
                    "libvips is already running with {:?}, ignoring {:?}",
                    current, config
                );
            }
            return Ok(());
        }
        State::Stopped => {
            return Err(VipsError::Init(
                "libvips was shut down and cannot be started again".to_string(),
            ));
        }
    }

    unsafe {
        if vips_init(c"kagamivips".as_ptr()) != 0 {
            let message = take_error_message();
            vips_shutdown();
            return Err(VipsError::Init(message));
        }

        vips_concurrency_set(config.concurrency);
        vips_cache_set_max_mem(config.cache_max_mem);
        vips_cache_set_max(config.cache_max);
    }

    debug!("libvips started with {:?}", config);
    *state = State::Running(config.clone());
    Ok(())
}

/// Stops libvips if it is running. Every later [`initialize`] in the same
/// process returns [`VipsError::Init`].
pub fn shutdown() {
    let mut state = STATE.lock().unwrap_or_else(PoisonError::into_inner);
    if let State::Running(_) = *state {
        unsafe { vips_shutdown() };
        *state = State::Stopped;
        debug!("libvips shut down");
    }
}

/// Dumps every live libvips object to stdout. Handy to spot leaked handles.
pub fn print_all() {
    unsafe { vips_object_print_all() };
}

fn take_error_message() -> String {
    unsafe {
        let buffer = vips_error_buffer();
        let message = if buffer.is_null() {
            String::new()
        } else {
            CStr::from_ptr(buffer).to_string_lossy().trim_end().to_string()
        };
        vips_error_clear();
        message
    }
}

fn vips_error(code: c_int) -> VipsError {
    VipsError::Vips {
        code,
        message: take_error_message(),
    }
}

/// An owned reference to a libvips image.
pub struct Image {
    raw: NonNull<VipsImage>,
    // Buffer loaders read lazily from the caller's memory, so every image
    // derived from one keeps that memory alive.
    source: Option<Rc<[u8]>>,
}

impl Image {
    /// Takes over one reference to `raw`.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a valid `VipsImage` whose reference the caller
    /// owns and does not release itself.
    pub unsafe fn from_raw(raw: *mut VipsImage) -> Option<Image> {
        NonNull::new(raw).map(|raw| Image { raw, source: None })
    }

    pub fn as_ptr(&self) -> *mut VipsImage {
        self.raw.as_ptr()
    }

    pub fn width(&self) -> i32 {
        unsafe { vips_image_get_width(self.as_ptr()) }
    }

    pub fn height(&self) -> i32 {
        unsafe { vips_image_get_height(self.as_ptr()) }
    }

    pub fn bands(&self) -> i32 {
        unsafe { vips_image_get_bands(self.as_ptr()) }
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        unsafe { g_object_unref(self.raw.as_ptr() as gpointer) };
    }
}

impl Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("bands", &self.bands())
            .finish()
    }
}

/// An owned reference to a libvips interpolator.
pub struct Interpolate {
    raw: NonNull<VipsInterpolate>,
}

impl Interpolate {
    pub fn as_ptr(&self) -> *mut VipsInterpolate {
        self.raw.as_ptr()
    }
}

impl Drop for Interpolate {
    fn drop(&mut self) {
        unsafe { g_object_unref(self.raw.as_ptr() as gpointer) };
    }
}

// Memory handed out by the savers, released with g_free.
struct VipsBuffer {
    data: *mut c_void,
    len: usize,
}

impl VipsBuffer {
    fn new() -> Self {
        VipsBuffer {
            data: ptr::null_mut(),
            len: 0,
        }
    }

    fn to_vec(&self) -> Vec<u8> {
        if self.data.is_null() {
            return Vec::new();
        }
        unsafe { std::slice::from_raw_parts(self.data as *const u8, self.len) }.to_vec()
    }
}

impl Drop for VipsBuffer {
    fn drop(&mut self) {
        if !self.data.is_null() {
            unsafe { g_free(self.data) };
        }
    }
}

fn vips_access(access: Access) -> VipsAccess {
    match access {
        Access::Random => VIPS_ACCESS_RANDOM,
        Access::Sequential => VIPS_ACCESS_SEQUENTIAL,
    }
}

fn vips_angle(angle: Angle) -> VipsAngle {
    match angle {
        Angle::D0 => VIPS_ANGLE_D0,
        Angle::D90 => VIPS_ANGLE_D90,
        Angle::D180 => VIPS_ANGLE_D180,
        Angle::D270 => VIPS_ANGLE_D270,
    }
}

fn vips_direction(direction: Direction) -> VipsDirection {
    match direction {
        Direction::Horizontal => VIPS_DIRECTION_HORIZONTAL,
        Direction::Vertical => VIPS_DIRECTION_VERTICAL,
    }
}

fn vips_extend(extend: Extend) -> VipsExtend {
    match extend {
        Extend::Black => VIPS_EXTEND_BLACK,
        Extend::White => VIPS_EXTEND_WHITE,
    }
}

fn vips_interpretation(space: Interpretation) -> VipsInterpretation {
    match space {
        Interpretation::Srgb => VIPS_INTERPRETATION_sRGB,
        Interpretation::BW => VIPS_INTERPRETATION_B_W,
        Interpretation::Cmyk => VIPS_INTERPRETATION_CMYK,
    }
}

/// Takes ownership of `out` before looking at `status`, so nothing leaks
/// whichever way the call went.
fn wrap_image(
    status: c_int,
    out: *mut VipsImage,
    source: Option<Rc<[u8]>>,
) -> Result<Image, VipsError> {
    let image = unsafe { Image::from_raw(out) };
    match (status, image) {
        (0, Some(mut image)) => {
            image.source = source;
            Ok(image)
        }
        (0, None) => Err(vips_error(-1)),
        (code, _) => Err(vips_error(code)),
    }
}

fn wrap_buffer(status: c_int, buffer: VipsBuffer) -> Result<Vec<u8>, VipsError> {
    match status {
        0 if buffer.data.is_null() => Err(vips_error(-1)),
        0 => Ok(buffer.to_vec()),
        code => Err(vips_error(code)),
    }
}

/// The [`Engine`] backed by the system libvips.
#[derive(Debug)]
pub struct Libvips {
    _private: (),
}

impl Libvips {
    /// Starts libvips with the default [`Config`] unless it already runs.
    pub fn new() -> Result<Self, VipsError> {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Result<Self, VipsError> {
        initialize(config)?;
        Ok(Libvips { _private: () })
    }

    // The loaders read lazily, so the bytes are copied into memory that
    // lives as long as the images built from them.
    fn load<F>(&self, buf: &[u8], load: F) -> Result<Image, VipsError>
    where
        F: FnOnce(*mut c_void, usize, &mut *mut VipsImage) -> c_int,
    {
        if buf.is_empty() {
            return Err(VipsError::EmptyBuffer);
        }
        let source: Rc<[u8]> = Rc::from(buf);
        let mut out: *mut VipsImage = ptr::null_mut();
        let status = load(source.as_ptr() as *mut c_void, source.len(), &mut out);
        wrap_image(status, out, Some(source))
    }

    fn transform<F>(&self, image: &Image, op: F) -> Result<Image, VipsError>
    where
        F: FnOnce(*mut VipsImage, &mut *mut VipsImage) -> c_int,
    {
        let mut out: *mut VipsImage = ptr::null_mut();
        let status = op(image.as_ptr(), &mut out);
        wrap_image(status, out, image.source.clone())
    }

    fn save<F>(&self, image: &Image, op: F) -> Result<Vec<u8>, VipsError>
    where
        F: FnOnce(*mut VipsImage, &mut *mut c_void, &mut usize) -> c_int,
    {
        let mut buffer = VipsBuffer::new();
        let status = op(image.as_ptr(), &mut buffer.data, &mut buffer.len);
        wrap_buffer(status, buffer)
    }
}

impl Engine for Libvips {
    type Image = Image;
    type Interpolate = Interpolate;

    fn jpegload_buffer(&self, buf: &[u8], options: &JpegLoadOptions) -> Result<Image, VipsError> {
        let access = vips_access(options.access.unwrap_or(Access::Random));
        let shrink = options.shrink.unwrap_or(1);
        self.load(buf, |data, len, out| unsafe {
            vips_jpegload_buffer(
                data,
                len,
                out,
                c"access".as_ptr(),
                access,
                c"shrink".as_ptr(),
                shrink,
                END,
            )
        })
    }

    fn pngload_buffer(&self, buf: &[u8], options: &PngLoadOptions) -> Result<Image, VipsError> {
        let access = vips_access(options.access.unwrap_or(Access::Random));
        self.load(buf, |data, len, out| unsafe {
            vips_pngload_buffer(data, len, out, c"access".as_ptr(), access, END)
        })
    }

    fn webpload_buffer(&self, buf: &[u8]) -> Result<Image, VipsError> {
        self.load(buf, |data, len, out| unsafe {
            vips_webpload_buffer(data, len, out, END)
        })
    }

    fn magickload_buffer(&self, buf: &[u8]) -> Result<Image, VipsError> {
        self.load(buf, |data, len, out| unsafe {
            vips_magickload_buffer(data, len, out, END)
        })
    }

    fn new_from_file(&self, path: &Path) -> Result<Image, VipsError> {
        let name = path
            .to_str()
            .and_then(|name| CString::new(name).ok())
            .ok_or_else(|| VipsError::InvalidPath(path.to_path_buf()))?;
        let out = unsafe { vips_image_new_from_file(name.as_ptr(), END) };
        wrap_image(0, out, None)
    }

    fn interpolate_new(&self, nickname: &str) -> Result<Interpolate, VipsError> {
        let nickname = CString::new(nickname).map_err(|_| VipsError::Vips {
            code: -1,
            message: format!("invalid interpolator name {:?}", nickname),
        })?;
        let raw = unsafe { vips_interpolate_new(nickname.as_ptr()) };
        NonNull::new(raw)
            .map(|raw| Interpolate { raw })
            .ok_or_else(|| vips_error(-1))
    }

    fn affine(
        &self,
        image: &Image,
        matrix: [f64; 4],
        interpolate: Option<&Interpolate>,
    ) -> Result<Image, VipsError> {
        let [a, b, c, d] = matrix;
        self.transform(image, |input, out| unsafe {
            match interpolate {
                Some(interpolate) => vips_affine(
                    input,
                    out,
                    a,
                    b,
                    c,
                    d,
                    c"interpolate".as_ptr(),
                    interpolate.as_ptr(),
                    END,
                ),
                None => vips_affine(input, out, a, b, c, d, END),
            }
        })
    }

    fn shrink(&self, image: &Image, xshrink: f64, yshrink: f64) -> Result<Image, VipsError> {
        self.transform(image, |input, out| unsafe {
            vips_shrink(input, out, xshrink, yshrink, END)
        })
    }

    fn copy(&self, image: &Image) -> Result<Image, VipsError> {
        self.transform(image, |input, out| unsafe { vips_copy(input, out, END) })
    }

    fn embed(
        &self,
        image: &Image,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        extend: Option<Extend>,
    ) -> Result<Image, VipsError> {
        let extend = vips_extend(extend.unwrap_or_default());
        self.transform(image, |input, out| unsafe {
            vips_embed(
                input,
                out,
                left,
                top,
                width,
                height,
                c"extend".as_ptr(),
                extend,
                END,
            )
        })
    }

    fn extract_area(
        &self,
        image: &Image,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
    ) -> Result<Image, VipsError> {
        self.transform(image, |input, out| unsafe {
            vips_extract_area(input, out, left, top, width, height, END)
        })
    }

    fn colourspace(&self, image: &Image, space: Interpretation) -> Result<Image, VipsError> {
        let space = vips_interpretation(space);
        self.transform(image, |input, out| unsafe {
            vips_colourspace(input, out, space, END)
        })
    }

    fn rot(&self, image: &Image, angle: Angle) -> Result<Image, VipsError> {
        let angle = vips_angle(angle);
        self.transform(image, |input, out| unsafe { vips_rot(input, out, angle, END) })
    }

    fn flip(&self, image: &Image, direction: Direction) -> Result<Image, VipsError> {
        let direction = vips_direction(direction);
        self.transform(image, |input, out| unsafe {
            vips_flip(input, out, direction, END)
        })
    }

    fn autorot(&self, image: &Image) -> Result<Image, VipsError> {
        self.transform(image, |input, out| unsafe { vips_autorot(input, out, END) })
    }

    fn jpegsave_buffer(&self, image: &Image, options: &JpegSaveOptions) -> Result<Vec<u8>, VipsError> {
        let strip = options.strip.unwrap_or(false) as c_int;
        let quality = options.quality.unwrap_or(75);
        let optimize_coding = options.optimize_coding.unwrap_or(false) as c_int;
        let interlace = options.interlace.unwrap_or(false) as c_int;
        self.save(image, |input, data, len| unsafe {
            vips_jpegsave_buffer(
                input,
                data,
                len,
                c"strip".as_ptr(),
                strip,
                c"Q".as_ptr(),
                quality,
                c"optimize_coding".as_ptr(),
                optimize_coding,
                c"interlace".as_ptr(),
                interlace,
                END,
            )
        })
    }

    fn pngsave_buffer(&self, image: &Image, options: &PngSaveOptions) -> Result<Vec<u8>, VipsError> {
        let interlace = options.interlace.unwrap_or(false) as c_int;
        self.save(image, |input, data, len| unsafe {
            vips_pngsave_buffer(input, data, len, c"interlace".as_ptr(), interlace, END)
        })
    }

    fn webpsave_buffer(&self, image: &Image, options: &WebpSaveOptions) -> Result<Vec<u8>, VipsError> {
        let quality = options.quality.unwrap_or(75);
        self.save(image, |input, data, len| unsafe {
            vips_webpsave_buffer(input, data, len, c"Q".as_ptr(), quality, END)
        })
    }

    fn width(&self, image: &Image) -> i32 {
        image.width()
    }

    fn height(&self, image: &Image) -> i32 {
        image.height()
    }

    fn get_string(&self, image: &Image, field: &str) -> Option<String> {
        let field = CString::new(field).ok()?;
        unsafe {
            if vips_image_get_typeof(image.as_ptr(), field.as_ptr()) == 0 {
                return None;
            }

            let mut value: *const c_char = ptr::null();
            if vips_image_get_string(image.as_ptr(), field.as_ptr(), &mut value) != 0
                || value.is_null()
            {
                // Present but not a string
                vips_error_clear();
                return None;
            }
            Some(CStr::from_ptr(value).to_string_lossy().into_owned())
        }
    }

    fn remove(&self, image: &mut Image, field: &str) -> bool {
        match CString::new(field) {
            Ok(field) => unsafe { vips_image_remove(image.as_ptr(), field.as_ptr()) != 0 },
            Err(_) => false,
        }
    }

    fn thread_cleanup(&self) {
        unsafe {
            vips_thread_shutdown();
            vips_error_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_buffer_without_data() {
        initialize(&Config::default()).expect("Failed to start libvips");

        let err = wrap_buffer(0, VipsBuffer::new()).unwrap_err();
        assert!(matches!(err, VipsError::Vips { code: -1, .. }));

        let err = wrap_buffer(3, VipsBuffer::new()).unwrap_err();
        assert_eq!(err.code(), Some(3));
    }
}
