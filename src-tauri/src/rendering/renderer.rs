//! Triangle renderer for the overlay surface.
//!
//! Owns adapter, device and pipeline for one drawable target. Initialization
//! is one-shot: a failure leaves the renderer in `Failed`, logged and never
//! retried, and the frame loop does not start.

use std::sync::Arc;

use wgpu::{Device, Queue, RenderPipeline, TextureFormat};

use super::pacing::FramePacer;
use super::target::FrameTarget;
use crate::error::{OverlayError, OverlayResult};
use crate::overlay::SharedColor;

const TRIANGLE_SHADER: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> @builtin(position) vec4<f32> {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
    );
    return vec4<f32>(positions[vertex_index], 0.0, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(0.0, 1.0, 0.0, 1.0);
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// GPU objects created once per surface and immutable afterwards.
struct GpuResources {
    device: Device,
    queue: Queue,
    pipeline: RenderPipeline,
    format: TextureFormat,
}

pub struct TriangleRenderer<T> {
    target: T,
    background: Arc<SharedColor>,
    state: RendererState,
    gpu: Option<GpuResources>,
    frames_drawn: u64,
}

impl<T: FrameTarget> TriangleRenderer<T> {
    /// Each frame is cleared to whatever color was last written to `background`.
    pub fn new(target: T, background: Arc<SharedColor>) -> Self {
        Self {
            target,
            background,
            state: RendererState::Uninitialized,
            gpu: None,
            frames_drawn: 0,
        }
    }

    /// Linear clear color for the next frame.
    pub fn clear_color(&self) -> wgpu::Color {
        self.background.get().to_linear()
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Target format the pipeline is bound to, once ready.
    pub fn format(&self) -> Option<TextureFormat> {
        self.gpu.as_ref().map(|gpu| gpu.format)
    }

    /// Request adapter and device and build the pipeline.
    pub async fn initialize(
        &mut self,
        instance: &wgpu::Instance,
        power_preference: wgpu::PowerPreference,
    ) -> OverlayResult<()> {
        match self.state {
            RendererState::Uninitialized => {},
            RendererState::Ready => return Ok(()),
            RendererState::Initializing | RendererState::Failed => {
                return Err(OverlayError::DeviceError(format!(
                    "renderer initialization already attempted ({:?})",
                    self.state
                )));
            },
        }

        self.state = RendererState::Initializing;
        match self.create_gpu(instance, power_preference).await {
            Ok(gpu) => {
                log::info!("[TriangleRenderer] Ready ({:?})", gpu.format);
                self.gpu = Some(gpu);
                self.state = RendererState::Ready;
                Ok(())
            },
            Err(e) => {
                log::error!("[TriangleRenderer] Initialization failed: {}", e);
                self.state = RendererState::Failed;
                Err(e)
            },
        }
    }

    async fn create_gpu(
        &mut self,
        instance: &wgpu::Instance,
        power_preference: wgpu::PowerPreference,
    ) -> OverlayResult<GpuResources> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                force_fallback_adapter: false,
                compatible_surface: self.target.compatible_surface(),
            })
            .await?;

        log::info!("[TriangleRenderer] Using GPU adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Overlay Triangle Device"),
                required_features: wgpu::Features::empty(),
                // Keep the adapter's texture limits so the swapchain can match large overlays
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let format = self.target.select_format(&adapter)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = create_triangle_pipeline(&device, format);
        if let Some(error) = device.pop_error_scope().await {
            return Err(OverlayError::DeviceError(format!(
                "pipeline creation failed: {}",
                error
            )));
        }

        Ok(GpuResources {
            device,
            queue,
            pipeline,
            format,
        })
    }

    /// Clear and draw the triangle into the current drawable.
    ///
    /// Returns `Ok(false)` when the target had no drawable this frame.
    pub fn draw_frame(&mut self) -> OverlayResult<bool> {
        let clear_color = self.clear_color();
        let Self {
            target,
            gpu,
            frames_drawn,
            ..
        } = self;
        let gpu = gpu
            .as_ref()
            .ok_or_else(|| OverlayError::DeviceError("renderer is not ready".to_string()))?;

        let Some(frame) = target.acquire(&gpu.device, gpu.format)? else {
            return Ok(false);
        };

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Overlay Triangle Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Triangle Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: frame.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&gpu.pipeline);
            pass.draw(0..3, 0..1);
        }

        gpu.queue.submit(Some(encoder.finish()));
        frame.present();
        *frames_drawn += 1;
        Ok(true)
    }

    /// Frame loop: draw, then wait for the next slot, while the target is open.
    ///
    /// Does nothing unless initialization succeeded. Frame errors are logged
    /// and the loop continues. Returns the number of frames drawn.
    pub fn run(&mut self, pacer: &mut FramePacer) -> u64 {
        if self.state != RendererState::Ready {
            log::warn!(
                "[TriangleRenderer] Frame loop not started (state {:?})",
                self.state
            );
            return 0;
        }

        while self.target.is_open() {
            if let Err(e) = self.draw_frame() {
                log::warn!("[TriangleRenderer] Frame skipped: {}", e);
            }
            pacer.wait();
        }

        log::info!(
            "[TriangleRenderer] Target closed after {} frames",
            self.frames_drawn
        );
        self.frames_drawn
    }
}

fn create_triangle_pipeline(device: &Device, format: TextureFormat) -> RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Overlay Triangle Shader"),
        source: wgpu::ShaderSource::Wgsl(TRIANGLE_SHADER.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Overlay Triangle Pipeline Layout"),
        bind_group_layouts: &[],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Overlay Triangle Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(format.into())],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
