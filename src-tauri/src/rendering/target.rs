//! Drawable targets for the triangle renderer.
//!
//! - `WindowTarget`: wgpu surface of the native overlay window, sized from
//!   the shared pixel buffer
//! - `OffscreenTarget`: owned texture, for headless runs and GPU tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use wgpu::{SurfaceConfiguration, TextureFormat};

use crate::error::{OverlayError, OverlayResult};
use crate::overlay::{PixelBuffer, PixelSize};

/// Format used when rendering without a surface.
pub const OFFSCREEN_FORMAT: TextureFormat = TextureFormat::Rgba8UnormSrgb;

/// View acquired for one frame.
pub struct AcquiredFrame {
    view: wgpu::TextureView,
    surface_texture: Option<wgpu::SurfaceTexture>,
}

impl AcquiredFrame {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Hand the frame to the presentation queue (no-op offscreen).
    pub fn present(self) {
        if let Some(texture) = self.surface_texture {
            texture.present();
        }
    }
}

/// Something the renderer can draw into once per frame.
pub trait FrameTarget {
    /// Surface the adapter must be able to present to, if any.
    fn compatible_surface(&self) -> Option<&wgpu::Surface<'static>>;

    /// Choose the pixel format the pipeline is bound to.
    fn select_format(&mut self, adapter: &wgpu::Adapter) -> OverlayResult<TextureFormat>;

    /// Acquire the current drawable. `Ok(None)` skips this frame.
    fn acquire(
        &mut self,
        device: &wgpu::Device,
        format: TextureFormat,
    ) -> OverlayResult<Option<AcquiredFrame>>;

    fn is_open(&self) -> bool;
}

/// Shared open flag; cleared when the overlay window is destroyed.
#[derive(Debug, Clone)]
pub struct OpenFlag(Arc<AtomicBool>);

impl OpenFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn close(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for OpenFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Largest swapchain size the device accepts for `requested`.
fn clamp_to_limit(requested: PixelSize, max: u32) -> PixelSize {
    PixelSize::new(requested.width.min(max), requested.height.min(max))
}

/// Whether a surface configured at `configured` must be reconfigured to
/// present `requested`. `configured` is always a clamped size.
fn needs_reconfigure(configured: Option<PixelSize>, requested: PixelSize, max: u32) -> bool {
    configured != Some(clamp_to_limit(requested, max))
}

/// Surface of a native overlay window.
pub struct WindowTarget {
    surface: wgpu::Surface<'static>,
    pixel_buffer: Arc<PixelBuffer>,
    open: OpenFlag,
    alpha_mode: wgpu::CompositeAlphaMode,
    config: Option<SurfaceConfiguration>,
}

impl WindowTarget {
    pub fn new(
        surface: wgpu::Surface<'static>,
        pixel_buffer: Arc<PixelBuffer>,
        open: OpenFlag,
    ) -> Self {
        Self {
            surface,
            pixel_buffer,
            open,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            config: None,
        }
    }

    fn configure(&mut self, device: &wgpu::Device, format: TextureFormat, size: PixelSize) {
        let size = clamp_to_limit(size, device.limits().max_texture_dimension_2d);
        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: self.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        self.surface.configure(device, &config);
        log::debug!(
            "[WindowTarget] Configured {}x{} {:?}",
            config.width,
            config.height,
            format
        );
        self.config = Some(config);
    }
}

impl FrameTarget for WindowTarget {
    fn compatible_surface(&self) -> Option<&wgpu::Surface<'static>> {
        Some(&self.surface)
    }

    fn select_format(&mut self, adapter: &wgpu::Adapter) -> OverlayResult<TextureFormat> {
        let capabilities = self.surface.get_capabilities(adapter);
        // Clear color is linear, so prefer an sRGB swapchain
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(TextureFormat::is_srgb)
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| {
                OverlayError::SurfaceError("surface is not supported by the adapter".to_string())
            })?;
        if let Some(alpha_mode) = capabilities.alpha_modes.first() {
            self.alpha_mode = *alpha_mode;
        }
        Ok(format)
    }

    fn acquire(
        &mut self,
        device: &wgpu::Device,
        format: TextureFormat,
    ) -> OverlayResult<Option<AcquiredFrame>> {
        let size = self.pixel_buffer.size();
        if size.is_empty() {
            return Ok(None);
        }

        let configured = self
            .config
            .as_ref()
            .map(|c| PixelSize::new(c.width, c.height));
        if needs_reconfigure(configured, size, device.limits().max_texture_dimension_2d) {
            self.configure(device, format, size);
        }

        match self.surface.get_current_texture() {
            Ok(texture) => {
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(Some(AcquiredFrame {
                    view,
                    surface_texture: Some(texture),
                }))
            },
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                log::debug!("[WindowTarget] Surface outdated, reconfiguring");
                self.configure(device, format, size);
                Ok(None)
            },
            Err(wgpu::SurfaceError::Timeout) => Ok(None),
            Err(e) => Err(OverlayError::AcquireError(e.to_string())),
        }
    }

    fn is_open(&self) -> bool {
        self.open.is_open()
    }
}

/// Owned texture target.
///
/// With a frame budget the target closes itself after that many frames,
/// which bounds the frame loop.
pub struct OffscreenTarget {
    size: PixelSize,
    frame_budget: Option<u64>,
    acquired: u64,
    texture: Option<wgpu::Texture>,
}

impl OffscreenTarget {
    pub fn new(size: PixelSize) -> Self {
        Self {
            size,
            frame_budget: None,
            acquired: 0,
            texture: None,
        }
    }

    pub fn with_frame_budget(mut self, frames: u64) -> Self {
        self.frame_budget = Some(frames);
        self
    }

    pub fn acquired_frames(&self) -> u64 {
        self.acquired
    }
}

impl FrameTarget for OffscreenTarget {
    fn compatible_surface(&self) -> Option<&wgpu::Surface<'static>> {
        None
    }

    fn select_format(&mut self, _adapter: &wgpu::Adapter) -> OverlayResult<TextureFormat> {
        Ok(OFFSCREEN_FORMAT)
    }

    fn acquire(
        &mut self,
        device: &wgpu::Device,
        format: TextureFormat,
    ) -> OverlayResult<Option<AcquiredFrame>> {
        if self.size.is_empty() {
            return Ok(None);
        }

        let size = self.size;
        let texture = self.texture.get_or_insert_with(|| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Offscreen Overlay Target"),
                size: wgpu::Extent3d {
                    width: size.width,
                    height: size.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            })
        });

        self.acquired += 1;
        Ok(Some(AcquiredFrame {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            surface_texture: None,
        }))
    }

    fn is_open(&self) -> bool {
        self.frame_budget
            .map_or(true, |budget| self.acquired < budget)
    }
}
