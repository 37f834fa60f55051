//! Host-side image storage.
//!
//! Responsibilities:
//! - own pixel buffers and their backend bindings (`binding`)
//! - keep per-image placement records (`instance`)
//! - track every live image in creation order (`registry`)
//! - record what to draw, in attach order (`queue`)
//!
//! Nothing here talks to a GPU directly. Backend resources are opaque `T`
//! handles created and destroyed by [`Graphics`](crate::graphics::Graphics).

mod binding;
mod image;
mod instance;
mod queue;
mod registry;

pub use binding::ImageBinding;
pub use image::{Image, PIXEL_BYTES};
pub use instance::{Instance, InstanceId};
pub use queue::{QueueEntry, RenderQueue};
pub use registry::ImageRegistry;

slotmap::new_key_type! {
    /// Stable handle to an image in an [`ImageRegistry`].
    ///
    /// Handles carry a generation, so a handle to a deleted image never
    /// resolves to a newer image that reused its slot.
    pub struct ImageId;
}
