//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Windows, and wires them to the GPU layer.
//! Input is not translated; apps see raw `WindowEvent`s through
//! [`App::on_window_event`](crate::core::App::on_window_event).

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
