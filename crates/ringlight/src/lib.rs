//! Ring light overlay renderer.
//!
//! Draws a soft, color-temperature-tinted glow around the edges of a
//! transparent surface so the display itself lights the user's face. The
//! flow for each overlay is:
//!
//! ```text
//!   host / ringlightd
//!          │ LightControl::publish(LightConfiguration)
//!          ▼
//!   FrameLoopController::tick ──▶ UniformCache (rebuild if dirty)
//!          │                            │
//!          │                            └─▶ uniforms::build() ─▶ FrameUniforms
//!          ▼
//!   RenderSurfaceManager::present_frame ──▶ GPU UBO ──▶ ring.wgsl ──▶ vsync
//! ```
//!
//! [`OverlayHost`] wires this to winit: one borderless, always-on-top,
//! click-through window per display, ticked on every redraw and kept on its
//! display as monitors are rearranged or hot-plugged. Everything above
//! the GPU layer is plain data and can be driven without a window through the
//! [`FrameTarget`] trait.

mod color;
mod control;
mod error;
mod frame;
mod gpu;
mod types;
mod uniforms;
mod window;

pub use color::rgb_from_temperature;
pub use control::LightControl;
pub use error::{InitError, PresentError};
pub use frame::{FrameLoopController, FrameStats, FrameTarget, LoopState, TickOutcome};
pub use gpu::{ColorRange, RenderSurfaceManager, RING_SHADER_WGSL};
pub use types::{
    GpuPowerPreference, HdrMode, LightConfiguration, ScreenIdentifier, SurfaceGeometry,
    SurfaceOptions, MIN_RING_WIDTH,
};
pub use uniforms::{build as build_uniforms, FrameUniforms, UniformCache};
pub use window::{MonitorInfo, OverlayHost, OverlayTarget, DISPLAY_POLL_INTERVAL};
