extern crate bindgen;

use std::env;
use std::path::PathBuf;

fn main() {
    // Emits the cargo:rustc-link-* lines for vips and its glib dependencies.
    let vips = pkg_config::Config::new()
        .atleast_version("8.6")
        .probe("vips")
        .expect("Unable to find libvips through pkg-config");

    println!("cargo:rerun-if-changed=wrapper.h");

    for path in &vips.include_paths {
        println!("cargo:include={}", path.display());
    }

    // The bindgen::Builder is the main entry point
    // to bindgen, and lets you build up options for
    // the resulting bindings.
    let mut builder = bindgen::Builder::default()
        // The input header we would like to generate
        // bindings for.
        .header("wrapper.h")
        // Reduce noise from glib and system libs.
        .allowlist_function("vips_.*")
        .allowlist_function("g_object_unref")
        .allowlist_function("g_free")
        .allowlist_type("Vips.*")
        .allowlist_var("VIPS_.*")
        // #[derive(Default)] for struct initialization.
        .derive_default(true)
        // libvips already adds appropriate prefixes
        .prepend_enum_name(false);

    // Tell where to find vips/ and the glib headers it pulls in.
    for path in &vips.include_paths {
        builder = builder.clang_arg(format!("-I{}", path.display()));
    }

    let bindings = builder
        // Finish the builder and generate the bindings.
        .generate()
        // Unwrap the Result and panic on failure.
        .expect("Unable to generate bindings");

    // Write the bindings to the $OUT_DIR/bindings.rs file.
    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("Couldn't write bindings!");
}
