use std::env;

fn main() -> Result<(), cc::Error> {
    println!("cargo:rerun-if-changed=csrc/zshim.c");
    if env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return Ok(());
    }

    let mut build = cc::Build::new();
    // Set by libz-sys when it builds zlib from source; a system zlib is found
    // through the default include path.
    if let Some(include) = env::var_os("DEP_Z_INCLUDE") {
        build.include(include);
    }
    build.file("csrc/zshim.c").try_compile("zshim")
}
