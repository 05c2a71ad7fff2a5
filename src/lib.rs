#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Sandbox
//!
//! The gameplay core of a first-person voxel sandbox: procedural terrain, block placement
//! and removal, and player movement with walking, sprinting, sneaking and flying modes
//! against a world that changes under the player's feet.
//!
//! Rendering, audio and the camera tween are collaborators behind traits; the crate ships
//! headless implementations, so the whole core runs and tests without a GPU.
//!
//! ## Key Modules
//!
//! * `application_state` - Host loop, input translation and the `winit` lifecycle
//! * `config` - The `GameConfig` aggregate, loadable from JSON
//! * `core` - Shared-ownership primitives
//! * `engine_state` - World, physics, camera, interaction and timers
//!
//! ## Architecture
//!
//! Every frame the host dispatches queued input events and due timers to the engine, then
//! runs one tick:
//! * The collision probe gathers solid voxels around the player from the terrain query
//!   (noise field plus edits) and casts parallel rays from each face of the body
//! * The locomotion state machine integrates gravity and jumps from the contacts
//! * The collision resolver slides the intended motion along blocked faces
//! * The new eye position is committed to the view collaborator
//!
//! ## Usage
//!
//! ```ignore
//! // Native application initialization
//! fn main() {
//!     voxel_sandbox::run();
//! }
//! ```
//!
//! For web applications:
//!
//! ```ignore
//! // Called from JavaScript
//! #[wasm_bindgen]
//! pub fn start() {
//!     voxel_sandbox::run_web();
//! }
//! ```

use application_state::ApplicationState;
use config::GameConfig;
use engine_state::scene::Collaborators;
#[cfg(target_family = "wasm")]
use wasm_bindgen::prelude::wasm_bindgen;

pub mod application_state;
pub mod config;
pub mod core;
pub mod engine_state;

/// Environment variable naming a JSON configuration file for the native runs.
pub const CONFIG_PATH_VARIABLE: &str = "VOXEL_SANDBOX_CONFIG";

/// Installs the platform logger. Calling it again is harmless.
pub fn init_logging() {
    cfg_if::cfg_if! {
        if #[cfg(target_family = "wasm")] {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            if console_log::init_with_level(log::Level::Info).is_err() {
                log::debug!("Logger already initialized");
            }
        } else {
            let result = env_logger::Builder::new()
                .target(env_logger::Target::Stdout)
                .parse_env("RUST_LOG")
                .try_init();
            if result.is_ok() {
                log::info!("Logger initialized");
            }
        }
    }
}

/// Reads the configuration named by [`CONFIG_PATH_VARIABLE`], or the defaults.
///
/// A missing variable means defaults; an unreadable or invalid file is logged and also
/// falls back to the defaults.
#[cfg(not(target_family = "wasm"))]
pub fn load_config() -> GameConfig {
    let Ok(path) = std::env::var(CONFIG_PATH_VARIABLE) else {
        return GameConfig::default();
    };

    let loaded = std::fs::read_to_string(&path)
        .map_err(|error| error.to_string())
        .and_then(|json| GameConfig::from_json_str(&json).map_err(|error| error.to_string()));

    match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", path);
            config
        }
        Err(error) => {
            log::warn!("Ignoring configuration {}: {}", path, error);
            GameConfig::default()
        }
    }
}

/// Plays a short scripted session against headless collaborators and logs what happens.
#[cfg(not(target_family = "wasm"))]
pub fn run() {
    init_logging();

    let mut state = ApplicationState::new(load_config(), Collaborators::headless());
    let summary = application_state::demo::play_scripted_session(&mut state);
    log::info!(
        "Session over after {} frames: eye at ({:.2}, {:.2}, {:.2}), {:?}, {} edits",
        summary.frames,
        summary.position.x,
        summary.position.y,
        summary.position.z,
        summary.mode,
        summary.edits
    );
}

/// Opens a window and plays with live input; the world is presented through the
/// headless collaborators.
#[cfg(not(target_family = "wasm"))]
pub fn run_windowed() {
    init_logging();

    let event_loop = match winit::event_loop::EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(error) => {
            log::error!("Could not create the event loop: {}", error);
            return;
        }
    };

    let mut state = ApplicationState::new(load_config(), Collaborators::headless());
    if let Err(error) = event_loop.run_app(&mut state) {
        log::error!("Event loop stopped: {}", error);
    }
}

/// Browser entry point: attaches a canvas and drives the core from the page's events.
#[cfg(target_family = "wasm")]
#[wasm_bindgen]
pub fn run_web() {
    use winit::platform::web::EventLoopExtWebSys;

    init_logging();

    let event_loop = match winit::event_loop::EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(error) => {
            log::error!("Could not create the event loop: {}", error);
            return;
        }
    };

    let state = ApplicationState::new(GameConfig::default(), Collaborators::headless());
    event_loop.spawn_app(state);
}
