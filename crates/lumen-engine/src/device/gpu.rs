use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::coords::{ClearColor, Viewport};
use crate::render::RenderTarget;

/// Device and surface options for a window.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB surface when one exists. Off by default so image bytes
    /// are shown unconverted.
    pub prefer_srgb: bool,
    pub present_mode: wgpu::PresentMode,
    /// Ignored when the surface does not support it.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

/// Device, queue and configured surface of one window.
///
/// Image backends are built from [`device`](Self::device),
/// [`queue`](Self::queue) and [`surface_format`](Self::surface_format).
pub struct Gpu<'w> {
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    viewport: Viewport,
}

/// Result of asking the surface for the next frame.
pub enum FrameStatus {
    Ready(SurfaceFrame),
    /// Nothing to draw into this time (minimized, outdated or timed out).
    Skipped,
    /// The surface cannot recover.
    Fatal,
}

/// Swapchain image being recorded for the current frame.
pub struct SurfaceFrame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

impl SurfaceFrame {
    /// Fills the whole frame with `color`.
    pub fn clear(&mut self, color: ClearColor) {
        let _pass = self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color.into()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    #[inline]
    pub fn target(&mut self) -> RenderTarget<'_> {
        RenderTarget::new(&mut self.encoder, &self.view)
    }
}

impl<'w> Gpu<'w> {
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let viewport = Viewport::from(window.inner_size());
        anyhow::ensure!(!viewport.is_empty(), "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lumen device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_format(&caps.formats, init.prefer_srgb)
            .context("surface reports no formats")?;
        let alpha_mode = pick_alpha_mode(&caps.alpha_modes, init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.width,
            height: viewport.height,
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);
        log::debug!("surface {format:?} {}x{}", config.width, config.height);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            viewport,
        })
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Drawable size; image coordinates map 1:1 onto it.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Tracks a new drawable size. An empty size is remembered but the
    /// surface keeps its last configuration until the window is restored.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.viewport = Viewport::from(size);
        if self.viewport.is_empty() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn acquire(&mut self) -> FrameStatus {
        if self.viewport.is_empty() {
            return FrameStatus::Skipped;
        }

        let texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => return self.recover(err),
        };
        let view = texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen frame encoder"),
            });

        FrameStatus::Ready(SurfaceFrame { texture, view, encoder })
    }

    /// Submits everything recorded into `frame` and shows it.
    pub fn present(&self, frame: SurfaceFrame) {
        let SurfaceFrame { texture, view, encoder } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        texture.present();
    }

    fn recover(&mut self, err: SurfaceError) -> FrameStatus {
        match recovery_for(&err) {
            Recovery::Reconfigure => {
                log::debug!("surface {err:?}, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                FrameStatus::Skipped
            }
            Recovery::Skip => {
                log::warn!("surface {err:?}, skipping frame");
                FrameStatus::Skipped
            }
            Recovery::Abort => {
                log::error!("surface {err:?}, giving up");
                FrameStatus::Fatal
            }
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Recovery {
    Reconfigure,
    Skip,
    Abort,
}

fn recovery_for(err: &SurfaceError) -> Recovery {
    match err {
        SurfaceError::Lost | SurfaceError::Outdated => Recovery::Reconfigure,
        SurfaceError::Timeout | SurfaceError::Other => Recovery::Skip,
        SurfaceError::OutOfMemory => Recovery::Abort,
    }
}

fn pick_format(formats: &[wgpu::TextureFormat], prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    let srgb = formats.iter().copied().find(|f| f.is_srgb());
    let linear = formats.iter().copied().find(|f| !f.is_srgb());
    if prefer_srgb {
        srgb.or(linear)
    } else {
        linear.or(srgb)
    }
}

fn pick_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    wanted: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    wanted
        .filter(|m| supported.contains(m))
        .or_else(|| supported.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}
