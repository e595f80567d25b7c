use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::error::{InitError, PresentError};
use crate::frame::FrameTarget;
use crate::types::{SurfaceGeometry, SurfaceOptions};
use crate::uniforms::FrameUniforms;

use super::context::{ColorRange, GpuContext};
use super::pipeline::RingPipeline;
use super::shader::STRIP_VERTEX_COUNT;

/// Owns the GPU objects for one overlay and keeps the swapchain sized to the
/// host window.
pub struct RenderSurfaceManager {
    context: GpuContext,
    pipeline: RingPipeline,
    geometry: SurfaceGeometry,
    uploaded: Option<FrameUniforms>,
    needs_reconfigure: bool,
}

impl RenderSurfaceManager {
    /// Creates the device, surface, and pipeline for `host`.
    ///
    /// This is the only hard failure in the renderer; callers should treat an
    /// error as "ring light unavailable" rather than retrying.
    pub fn attach<T>(
        host: T,
        geometry: SurfaceGeometry,
        options: SurfaceOptions,
    ) -> Result<Self, InitError>
    where
        T: HasDisplayHandle + HasWindowHandle + Send + Sync + 'static,
    {
        let context = GpuContext::new(host, geometry.pixel_size(), options)?;
        let pipeline = RingPipeline::new(&context.device, context.surface_format)?;
        Ok(Self {
            context,
            pipeline,
            geometry,
            uploaded: None,
            needs_reconfigure: false,
        })
    }

    pub fn color_range(&self) -> ColorRange {
        self.context.color_range
    }

    pub fn adapter_name(&self) -> &str {
        &self.context.adapter_name
    }

    fn upload(&mut self, uniforms: &FrameUniforms) {
        if self.uploaded.as_ref() == Some(uniforms) {
            return;
        }
        self.context
            .queue
            .write_buffer(&self.pipeline.uniform_buffer, 0, uniforms.as_bytes());
        self.uploaded = Some(*uniforms);
    }
}

impl FrameTarget for RenderSurfaceManager {
    fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    fn on_resize(&mut self, geometry: SurfaceGeometry) {
        self.geometry = geometry;
        let size = geometry.pixel_size();
        if self.context.resize(size) {
            tracing::debug!(
                width = size.0,
                height = size.1,
                scale = geometry.effective_scale(),
                "resized ring light surface"
            );
            self.needs_reconfigure = false;
        }
    }

    fn present_frame(&mut self, uniforms: &FrameUniforms) -> Result<(), PresentError> {
        if self.needs_reconfigure {
            self.context.reconfigure();
            self.needs_reconfigure = false;
        }

        let frame = match self.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                if matches!(err, wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) {
                    self.needs_reconfigure = true;
                }
                return Err(err.into());
            }
        };

        self.upload(uniforms);

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("ring light encoder"),
                });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ring light pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.pipeline.uniform_bind_group, &[]);
            render_pass.draw(0..STRIP_VERTEX_COUNT, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        if frame.suboptimal {
            self.needs_reconfigure = true;
        }
        frame.present();
        Ok(())
    }
}
