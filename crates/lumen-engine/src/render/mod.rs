//! Image rendering.
//!
//! The rasterizer turns render-queue entries into backend calls; backends turn
//! those calls into GPU work (`wgpu_backend`) or a call log (`headless`).
//!
//! Convention:
//! - CPU geometry is in window pixels (top-left origin, +Y down).
//! - Vertices are converted to clip space by the projection uniform.

mod backend;
mod ctx;
mod headless;
mod projection;
mod raster;
mod staging;
mod vertex;
mod wgpu_backend;


pub use backend::{Backend, TextureDesc, Uniform};
pub use ctx::RenderTarget;
pub use headless::{BackendCall, HeadlessBackend, HeadlessTexture};
pub use projection::{ortho_projection, transform_point, Mat4, DEPTH_FAR, DEPTH_NEAR};
pub use raster::{draw_instance, draw_queue, IMAGE_TEXTURE_UNIT, QUAD_VERTEX_COUNT};
pub use vertex::{quad_vertices, Vertex};
pub use wgpu_backend::{WgpuBackend, WgpuTexture};
