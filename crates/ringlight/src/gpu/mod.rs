//! GPU side of the ring light.
//!
//! - `context` owns the wgpu instance/device/surface and picks an
//!   extended-range format when the compositor offers one.
//! - `shader` holds the WGSL program and its entry points.
//! - `pipeline` builds the single render pipeline and its uniform buffer.
//! - `surface` ties them together as [`RenderSurfaceManager`], the
//!   [`crate::FrameTarget`] driven by the frame loop.

mod context;
mod pipeline;
mod shader;
mod surface;

pub use context::ColorRange;
pub use shader::RING_SHADER_WGSL;
pub use surface::RenderSurfaceManager;
