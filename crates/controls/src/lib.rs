//! Interactive rotation controls for globe projections.
//!
//! Handlers never own the projection: each call borrows it, so the host keeps
//! full control of the projection's lifetime and rendering.

pub mod drag;
pub mod keyboard;
pub mod projection;

pub use drag::*;
pub use keyboard::*;
pub use projection::*;
