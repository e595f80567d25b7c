//! Derivation of the per-frame uniform block from configuration + geometry.
//!
//! [`build`] is a pure function; [`UniformCache`] wraps it with a dirty flag
//! so the frame loop only rebuilds when an input changed.

use bytemuck::{Pod, Zeroable};

use crate::color::rgb_from_temperature;
use crate::types::{LightConfiguration, SurfaceGeometry, MIN_RING_WIDTH};

/// Extra brightness available at full intensity, on top of standard white.
const HDR_HEADROOM: f32 = 4.0;

/// GPU-facing parameter block read by the ring fragment shader.
///
/// The layout mirrors `RingUniforms` in the WGSL source under uniform
/// address-space rules: `color` is a `vec3<f32>` and therefore starts on a
/// 16 byte boundary, and the struct is rounded up to 64 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub resolution: [f32; 2],
    pub ring_width: f32,
    pub feather: f32,
    pub intensity: f32,
    pub peak_luminance: f32,
    _pad0: [f32; 2],
    pub color: [f32; 3],
    pub safe_top_inset: f32,
    pub corner_radius: f32,
    _pad1: [f32; 3],
}

impl FrameUniforms {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Derives the uniforms for `config` drawn into `geometry`.
///
/// Every scale-dependent field uses the geometry's current device scale, and
/// `resolution` is the same rounded pixel size the surface is configured
/// with. Out-of-range configuration values are clamped, never rejected.
pub fn build(config: &LightConfiguration, geometry: &SurfaceGeometry) -> FrameUniforms {
    let scale = geometry.effective_scale();
    let (pixel_width, pixel_height) = geometry.pixel_size();
    let resolution = [pixel_width as f32, pixel_height as f32];
    let longest = resolution[0].max(resolution[1]);

    let intensity = unit(config.intensity);
    let safe_top_inset = (geometry.top_inset * scale).max(0.0).min(resolution[1]);

    FrameUniforms {
        resolution,
        ring_width: pixel_length(config.width, MIN_RING_WIDTH, scale, longest),
        feather: unit(config.feather),
        intensity,
        peak_luminance: 1.0 + intensity * HDR_HEADROOM,
        _pad0: [0.0; 2],
        color: rgb_from_temperature(config.temperature),
        safe_top_inset,
        corner_radius: pixel_length(config.corner_radius, 0.0, scale, longest),
        _pad1: [0.0; 3],
    }
}

// `f32::clamp` propagates NaN; `f32::max` does not.
fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Scales a length in points to pixels. Non-finite input falls back to
/// `floor`, and the result never exceeds `limit` so it stays finite.
fn pixel_length(points: f32, floor: f32, scale: f32, limit: f32) -> f32 {
    let points = if points.is_finite() {
        points.max(floor)
    } else {
        floor
    };
    (points * scale).min(limit.max(floor * scale))
}

/// Memoises [`build`] behind a dirty flag.
///
/// The cache also remembers the geometry it last built for, so a resize that
/// bypasses [`UniformCache::invalidate`] still triggers a rebuild.
#[derive(Debug, Default)]
pub struct UniformCache {
    current: Option<FrameUniforms>,
    built_for: Option<SurfaceGeometry>,
    dirty: bool,
    rebuilds: u64,
}

impl UniformCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the next [`UniformCache::resolve`] to rebuild.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Whether resolving against `geometry` would rebuild.
    pub fn is_stale_for(&self, geometry: &SurfaceGeometry) -> bool {
        self.dirty || self.current.is_none() || self.built_for.as_ref() != Some(geometry)
    }

    /// Returns the cached uniforms, rebuilding first when stale. Clears the
    /// dirty flag.
    pub fn resolve(
        &mut self,
        config: &LightConfiguration,
        geometry: &SurfaceGeometry,
    ) -> &FrameUniforms {
        if self.is_stale_for(geometry) {
            self.dirty = false;
            self.built_for = Some(*geometry);
            self.rebuilds += 1;
            tracing::trace!(rebuilds = self.rebuilds, "rebuilding ring uniforms");
            self.current = Some(build(config, geometry));
        }
        self.current.get_or_insert_with(|| build(config, geometry))
    }

    /// Number of times the uniforms were rebuilt.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}
