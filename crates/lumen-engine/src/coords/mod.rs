//! Coordinate types shared by the image core and renderers.
//!
//! Canonical CPU space:
//! - Window pixels
//! - Origin top-left
//! - +X right, +Y down

mod color;
mod viewport;

pub use color::ClearColor;
pub use viewport::Viewport;
