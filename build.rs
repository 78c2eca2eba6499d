//! Build script for compile-time configuration injection.
//!
//! Set environment variables before building to configure the firmware:
//!
//!   OUTLET_LINK_BAUD=9600 \
//!   cargo build --release
//!
//! The managing-device link defaults to 9600 baud when unset.

fn main() {
    // Re-run build script if these environment variables change
    println!("cargo::rerun-if-env-changed=OUTLET_LINK_BAUD");
}
