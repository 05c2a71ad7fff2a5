//! # Voxel Sandbox Entry Point
//!
//! Native entry point. Without arguments it plays a short scripted session headlessly;
//! `--window` opens a window and takes live input instead.
//!
//! For web applications, see the `run_web()` function in the library.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! RUST_LOG=debug cargo run --release -- --window
//! ```

fn main() {
    #[cfg(not(target_family = "wasm"))]
    {
        if std::env::args().any(|argument| argument == "--window") {
            voxel_sandbox::run_windowed();
        } else {
            voxel_sandbox::run();
        }
    }
}
