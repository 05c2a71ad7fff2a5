//! # Core Module
//!
//! Shared-ownership primitives used throughout the game.
//!
//! ## Key Components
//! - `StResource`: Single-threaded reference-counted resource with interior mutability

pub mod st_resource;

// Re-export types for easier access
pub use st_resource::StResource;
