//! Lumen engine crate.
//!
//! GPU-backed images that can be placed many times in a window and are
//! redrawn every frame, plus the device and window plumbing to show them.
//!
//! Entry point is [`graphics::Graphics`]: create images, write their pixels,
//! attach instances, and call `draw_all` once per frame.

pub mod coords;
pub mod core;
pub mod device;
pub mod error;
pub mod graphics;
pub mod image;
pub mod logging;
pub mod render;
pub mod window;

pub use error::GraphicsError;
pub use graphics::Graphics;
pub use image::{ImageId, InstanceId};
