use std::{
    ffi::c_void,
    os::raw::c_char,
    ptr::{null, null_mut},
};

use libvips_sys::*;

fn init() {
    let status = unsafe { vips_init(c"libvips-sys-test".as_ptr()) };
    assert_eq!(status, 0, "vips_init failed");
}

#[test]
fn test_version() {
    init();
    unsafe {
        assert!(vips_version(0) >= 8);
        assert!(vips_version(1) >= 0);
    }
}

unsafe fn black(width: i32, height: i32) -> Result<*mut VipsImage, &'static str> {
    let mut out: *mut VipsImage = null_mut();
    if vips_black(&mut out, width, height, null::<c_char>()) != 0 {
        return Err("vips_black failed");
    }
    Ok(out)
}

#[test]
fn test_black_dimensions() {
    init();
    unsafe {
        let image = black(64, 32).expect("Failed to create image");
        assert_eq!(vips_image_get_width(image), 64);
        assert_eq!(vips_image_get_height(image), 32);
        g_object_unref(image as gpointer);
    }
}

// Encodes a generated image and reads it back through the buffer loaders.
unsafe fn png_roundtrip(width: i32, height: i32) -> Result<(i32, i32), &'static str> {
    let image = black(width, height)?;

    let mut buf: *mut c_void = null_mut();
    let mut len = 0usize;
    let status = vips_pngsave_buffer(image, &mut buf, &mut len, null::<c_char>());
    g_object_unref(image as gpointer);
    if status != 0 {
        return Err("vips_pngsave_buffer failed");
    }

    let mut loaded: *mut VipsImage = null_mut();
    let status = vips_pngload_buffer(buf, len, &mut loaded, null::<c_char>());
    if status != 0 {
        g_free(buf);
        return Err("vips_pngload_buffer failed");
    }

    // Force the pixels through before the source buffer goes away
    let copy = vips_image_copy_memory(loaded);
    g_object_unref(loaded as gpointer);
    g_free(buf);
    if copy.is_null() {
        return Err("vips_image_copy_memory failed");
    }

    let size = (vips_image_get_width(copy), vips_image_get_height(copy));
    g_object_unref(copy as gpointer);
    Ok(size)
}

#[test]
fn test_png_roundtrip() {
    init();
    let size = unsafe { png_roundtrip(17, 9).expect("Failed to round-trip the image") };
    assert_eq!(size, (17, 9));
}

#[test]
fn test_error_buffer() {
    init();
    unsafe {
        let garbage = [0u8, 1, 2, 3];
        let mut out: *mut VipsImage = null_mut();
        let status = vips_pngload_buffer(
            garbage.as_ptr() as *mut c_void,
            garbage.len(),
            &mut out,
            null::<c_char>(),
        );
        assert_ne!(status, 0);
        assert!(!vips_error_buffer().is_null());
        vips_error_clear();
    }
}
