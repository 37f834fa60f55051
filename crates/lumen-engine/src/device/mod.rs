//! Per-window GPU state: device, queue and the configured surface frames are
//! acquired from and presented to.

mod gpu;

pub use gpu::{FrameStatus, Gpu, GpuInit, SurfaceFrame};
