//! # Block Module
//!
//! Block type definitions and the face vocabulary shared by terrain, collision and
//! block targeting.

pub mod block_side;
pub mod block_type;
