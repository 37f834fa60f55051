use winit::window::{Window, WindowId};

use crate::coords::{ClearColor, Viewport};
use crate::device::{FrameStatus, Gpu};
use crate::render::RenderTarget;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-window handles.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub runtime: &'a mut RuntimeCtx,
    /// Frames rendered for this window before this one.
    pub frame_index: u64,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Current drawable size; image coordinates map 1:1 onto it.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.gpu.viewport()
    }

    /// Clears the frame to `clear`, calls `draw` with a [`RenderTarget`] for
    /// it, then presents it.
    ///
    /// Frames the surface cannot provide are skipped; an unrecoverable
    /// surface returns [`AppControl::Exit`].
    pub fn render<F>(&mut self, clear: ClearColor, draw: F) -> AppControl
    where
        F: FnOnce(&mut RenderTarget<'_>),
    {
        let mut frame = match self.gpu.acquire() {
            FrameStatus::Ready(frame) => frame,
            FrameStatus::Skipped => return AppControl::Continue,
            FrameStatus::Fatal => return AppControl::Exit,
        };

        frame.clear(clear);
        draw(&mut frame.target());

        self.window.window.pre_present_notify();
        self.gpu.present(frame);
        AppControl::Continue
    }
}
