use anyhow::Result;
use winit::dpi::LogicalSize;

use lumen_engine::coords::ClearColor;
use lumen_engine::core::{App, AppControl, FrameCtx};
use lumen_engine::device::GpuInit;
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::render::WgpuBackend;
use lumen_engine::window::{Runtime, RuntimeConfig};
use lumen_engine::{Graphics, ImageId};

const CLEAR: ClearColor = ClearColor::new(0.08, 0.08, 0.1, 1.0);

/// Frames after which the banner image is deleted.
const BANNER_LIFETIME: u64 = 600;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "lumen studio".to_string(),
        initial_size: LogicalSize::new(800.0, 600.0),
        ..RuntimeConfig::default()
    };

    Runtime::run(config, GpuInit::default(), Studio::default())
}

#[derive(Default)]
struct Studio {
    gfx: Option<Graphics<WgpuBackend>>,
    pulse: Option<ImageId>,
    banner: Option<ImageId>,
}

impl Studio {
    fn setup(&mut self, ctx: &FrameCtx<'_, '_>) -> Result<Graphics<WgpuBackend>> {
        let backend = WgpuBackend::new(ctx.gpu.device(), ctx.gpu.queue(), ctx.gpu.surface_format());
        let mut gfx = Graphics::new(backend, ctx.viewport());

        let checker = gfx.create_image(64, 64)?;
        if let Some(img) = gfx.image_mut(checker) {
            for y in 0..64 {
                for x in 0..64 {
                    let on = ((x / 8) + (y / 8)) % 2 == 0;
                    img.put_pixel(x, y, if on { 0xE0E0E0FF } else { 0x303040FF });
                }
            }
        }
        for i in 0..5 {
            gfx.attach_image(checker, 40 + i * 72, 40)?;
        }

        let banner = gfx.create_image(360, 24)?;
        if let Some(img) = gfx.image_mut(banner) {
            for y in 0..24 {
                for x in 0..360 {
                    let r = x * 255 / 359;
                    let b = 255 - r;
                    img.put_pixel(x, y, (r << 24) | (0x60 << 16) | (b << 8) | 0xFF);
                }
            }
        }
        gfx.attach_image(banner, 40, 140)?;

        let pulse = gfx.create_image(32, 32)?;
        gfx.attach_image(pulse, 40, 200)?;
        gfx.attach_image(pulse, 88, 200)?;
        // Overlaps the first checker; drawn last, so it paints on top.
        gfx.attach_image(pulse, 60, 60)?;

        log::info!(
            "studio ready: {} images, {} queued instances",
            gfx.image_count(),
            gfx.render_queue().len()
        );

        self.pulse = Some(pulse);
        self.banner = Some(banner);
        Ok(gfx)
    }

    fn animate(&mut self, frame: u64) {
        let Some(gfx) = self.gfx.as_mut() else { return };

        if let Some(img) = self.pulse.and_then(|id| gfx.image_mut(id)) {
            let level = (frame % 120) as u32 * 2;
            let color = (level << 24) | (0x40 << 16) | ((255 - level) << 8) | 0xFF;
            for y in 0..u32::from(img.height()) {
                for x in 0..u32::from(img.width()) {
                    img.put_pixel(x, y, color);
                }
            }
        }

        if frame == BANNER_LIFETIME {
            if let Some(banner) = self.banner.take() {
                gfx.delete_image(banner);
            }
        }
    }
}

impl App for Studio {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.gfx.is_none() {
            match self.setup(ctx) {
                Ok(gfx) => self.gfx = Some(gfx),
                Err(e) => {
                    log::error!("studio setup failed: {e:#}");
                    return AppControl::Exit;
                }
            }
        }

        self.animate(ctx.frame_index);

        let Some(gfx) = self.gfx.as_mut() else {
            return AppControl::Exit;
        };
        gfx.set_window_size(ctx.viewport());

        ctx.render(CLEAR, |target| {
            gfx.render(target);
        })
    }
}
