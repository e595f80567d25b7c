/// Smallest ring thickness (in points) the renderer will draw.
pub const MIN_RING_WIDTH: f32 = 20.0;

/// User-tunable description of the glow.
///
/// The host owns this value and hands the renderer a fresh copy whenever the
/// user changes something; the renderer never mutates it. Fields may hold
/// out-of-range values: clamping happens when uniforms are derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightConfiguration {
    /// Ring thickness in points. Floors at [`MIN_RING_WIDTH`].
    pub width: f32,
    /// Softness of the inner edge, as a fraction of the ring width.
    pub feather: f32,
    /// Brightness/opacity in `[0, 1]`.
    pub intensity: f32,
    /// Color temperature in Kelvin, meaningful in `[1000, 40000]`.
    pub temperature: f32,
    /// Rounding of the inner rectangle in points.
    pub corner_radius: f32,
    /// Offset from the physical screen edge in points. Reserved; not used by
    /// the current shader.
    pub edge_inset: f32,
}

impl Default for LightConfiguration {
    fn default() -> Self {
        Self {
            width: 160.0,
            feather: 0.4,
            intensity: 0.85,
            temperature: 5200.0,
            corner_radius: 0.0,
            edge_inset: 0.0,
        }
    }
}

/// Logical size and pixel density of the surface the ring is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    /// Width in logical points.
    pub width: f32,
    /// Height in logical points.
    pub height: f32,
    /// Physical pixels per logical point.
    pub scale: f32,
    /// Height of the area at the top of the screen the glow must stay clear
    /// of (menu bar, notch), in points.
    pub top_inset: f32,
}

impl SurfaceGeometry {
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        Self {
            width,
            height,
            scale,
            top_inset: 0.0,
        }
    }

    pub fn with_top_inset(mut self, top_inset: f32) -> Self {
        self.top_inset = top_inset;
        self
    }

    /// Builds geometry from a physical pixel size, as reported by windowing
    /// systems on resize.
    pub fn from_physical(width: u32, height: u32, scale: f64, top_inset: f32) -> Self {
        let scale = effective_scale(scale as f32);
        Self {
            width: width as f32 / scale,
            height: height as f32 / scale,
            scale,
            top_inset,
        }
    }

    /// Device scale with the `>= 1` floor applied.
    pub fn effective_scale(&self) -> f32 {
        effective_scale(self.scale)
    }

    /// Backing surface size in pixels, never smaller than 1x1.
    pub fn pixel_size(&self) -> (u32, u32) {
        let scale = self.effective_scale();
        (
            pixel_extent(self.width, scale),
            pixel_extent(self.height, scale),
        )
    }
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

pub(crate) fn effective_scale(scale: f32) -> f32 {
    if scale.is_finite() {
        scale.max(1.0)
    } else {
        1.0
    }
}

fn pixel_extent(logical: f32, scale: f32) -> u32 {
    let pixels = logical * scale;
    if pixels.is_finite() {
        pixels.max(1.0).round() as u32
    } else {
        1
    }
}

/// Opaque key that ties a configuration to a physical display.
///
/// The renderer never inspects it; hosts use it to look up per-screen
/// settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenIdentifier(u32);

impl ScreenIdentifier {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ScreenIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "screen-{}", self.0)
    }
}

/// GPU adapter preference used when attaching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    /// Favour integrated GPUs; the glow is cheap to draw.
    #[default]
    Low,
    High,
}

/// Whether the surface may use an extended-range (floating point) format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HdrMode {
    /// Use `Rgba16Float` when the surface supports it.
    #[default]
    Auto,
    /// Always pick a standard-range sRGB format.
    Off,
}

/// Options fixed for the lifetime of an attached surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceOptions {
    pub power: GpuPowerPreference,
    pub hdr: HdrMode,
    /// Desired number of frames queued ahead of the display (1-3).
    pub frame_latency: u32,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            power: GpuPowerPreference::default(),
            hdr: HdrMode::default(),
            frame_latency: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_size_applies_scale_and_floor() {
        let geometry = SurfaceGeometry::new(1000.0, 600.0, 2.0);
        assert_eq!(geometry.pixel_size(), (2000, 1200));

        let degenerate = SurfaceGeometry::new(0.0, -4.0, 2.0);
        assert_eq!(degenerate.pixel_size(), (1, 1));
    }

    #[test]
    fn scale_below_one_is_floored() {
        let geometry = SurfaceGeometry::new(800.0, 600.0, 0.5);
        assert_eq!(geometry.effective_scale(), 1.0);
        assert_eq!(geometry.pixel_size(), (800, 600));
        assert_eq!(SurfaceGeometry::new(10.0, 10.0, f32::NAN).effective_scale(), 1.0);
    }

    #[test]
    fn from_physical_recovers_logical_size() {
        let geometry = SurfaceGeometry::from_physical(2880, 1800, 2.0, 24.0);
        assert_eq!(geometry.width, 1440.0);
        assert_eq!(geometry.height, 900.0);
        assert_eq!(geometry.top_inset, 24.0);
        assert_eq!(geometry.pixel_size(), (2880, 1800));
    }

    #[test]
    fn screen_identifier_is_a_plain_key() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(ScreenIdentifier::new(1), "left");
        map.insert(ScreenIdentifier::new(2), "right");
        assert_eq!(map[&ScreenIdentifier::new(2)], "right");
        assert_eq!(ScreenIdentifier::new(7).to_string(), "screen-7");
    }
}
