//! Build script for rivet-kernel: puts `memory.x` on the linker search path
//! for `riscv-rt`'s `link.x`.

use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=RIVET_LOG_LEVEL");
    println!("cargo:rerun-if-env-changed=RIVET_TICK_INTERVAL");

    // Host builds run against the simulator and link normally.
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "none" {
        return;
    }

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    std::fs::copy("memory.x", out_dir.join("memory.x")).unwrap();
    println!("cargo:rustc-link-search={}", out_dir.display());
}
