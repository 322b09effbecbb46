//! Build script for the low-power node firmware
//!
//! Handles:
//! - Memory layout configuration
//! - defmt linker script for target builds

fn main() {
    // Tell Cargo to re-run this if the build script changes
    println!("cargo:rerun-if-changed=build.rs");

    // Host test builds link against std and need no target scripts.
    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    // memory.x comes from embassy-stm32's memory-x feature
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
