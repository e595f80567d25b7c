use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::error::InitError;
use crate::types::{GpuPowerPreference, HdrMode, SurfaceOptions};

/// Whether the surface can carry luminance above standard white.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorRange {
    /// Floating-point surface; values above 1.0 reach the compositor.
    Extended,
    /// 8-bit surface; bright values are clipped.
    Standard,
}

/// wgpu instance, device, and surface for one overlay window.
pub(crate) struct GpuContext {
    pub _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
    pub color_range: ColorRange,
    pub adapter_name: String,
    max_dimension: u32,
}

impl GpuContext {
    pub(crate) fn new<T>(
        target: T,
        initial_size: (u32, u32),
        options: SurfaceOptions,
    ) -> Result<Self, InitError>
    where
        T: HasDisplayHandle + HasWindowHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let surface = instance.create_surface(target)?;

        let power_preference = match options.power {
            GpuPowerPreference::Low => wgpu::PowerPreference::LowPower,
            GpuPowerPreference::High => wgpu::PowerPreference::HighPerformance,
        };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let adapter_info = adapter.get_info();
        let limits = adapter.limits();
        tracing::debug!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            device_type = ?adapter_info.device_type,
            "selected GPU adapter"
        );

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = select_format(&surface_caps.formats, options.hdr).ok_or_else(|| {
            InitError::UnsupportedSurface("adapter reports no surface formats".to_string())
        })?;
        let color_range = color_range_of(surface_format);
        if color_range == ColorRange::Standard && options.hdr == HdrMode::Auto {
            tracing::warn!(
                ?surface_format,
                "extended-range surface format unavailable; glow will be clipped to standard range"
            );
        }

        let alpha_mode = select_alpha_mode(&surface_caps.alpha_modes).ok_or_else(|| {
            InitError::UnsupportedSurface("adapter reports no alpha modes".to_string())
        })?;
        if !matches!(
            alpha_mode,
            wgpu::CompositeAlphaMode::PreMultiplied | wgpu::CompositeAlphaMode::Inherit
        ) {
            tracing::warn!(
                ?alpha_mode,
                "premultiplied alpha compositing unavailable; overlay may not be transparent"
            );
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("ringlight device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(limits.clone()),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))?;

        let desired_maximum_frame_latency = options.frame_latency.clamp(1, 3);
        if desired_maximum_frame_latency != options.frame_latency {
            tracing::warn!(
                requested = options.frame_latency,
                clamped = desired_maximum_frame_latency,
                "GPU frame latency clamped to valid range (1-3)"
            );
        }

        // Fifo is always available and paces presentation to vsync.
        let present_mode = wgpu::PresentMode::Fifo;
        let max_dimension = limits.max_texture_dimension_2d;
        let (width, height) = clamp_extent(initial_size, max_dimension);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);

        tracing::info!(
            adapter = %adapter_info.name,
            ?surface_format,
            ?color_range,
            width,
            height,
            "ring light surface configured"
        );

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            surface_format,
            color_range,
            adapter_name: adapter_info.name,
            max_dimension,
        })
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigures the swapchain for a new pixel size. Returns `false` when
    /// the size is unchanged.
    pub(crate) fn resize(&mut self, size: (u32, u32)) -> bool {
        let (width, height) = clamp_extent(size, self.max_dimension);
        if (width, height) == self.size() {
            return false;
        }
        if (width, height) != size {
            tracing::warn!(
                requested_width = size.0,
                requested_height = size.1,
                max = self.max_dimension,
                "surface size exceeds GPU texture limit; clamping"
            );
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
        true
    }

    pub(crate) fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

fn clamp_extent(size: (u32, u32), max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    (
        size.0.clamp(1, max_dimension),
        size.1.clamp(1, max_dimension),
    )
}

/// Prefers `Rgba16Float` (when HDR is allowed), then any sRGB format, then
/// whatever the surface lists first.
pub(crate) fn select_format(
    formats: &[wgpu::TextureFormat],
    hdr: HdrMode,
) -> Option<wgpu::TextureFormat> {
    let extended = formats
        .iter()
        .copied()
        .find(|format| *format == wgpu::TextureFormat::Rgba16Float);
    if hdr == HdrMode::Auto {
        if let Some(format) = extended {
            return Some(format);
        }
    }
    formats
        .iter()
        .copied()
        .find(|format| format.is_srgb())
        .or_else(|| {
            formats
                .iter()
                .copied()
                .find(|format| *format != wgpu::TextureFormat::Rgba16Float)
        })
        .or(extended)
}

pub(crate) fn color_range_of(format: wgpu::TextureFormat) -> ColorRange {
    match format {
        wgpu::TextureFormat::Rgba16Float | wgpu::TextureFormat::Rgba32Float => ColorRange::Extended,
        _ => ColorRange::Standard,
    }
}

pub(crate) fn select_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
) -> Option<wgpu::CompositeAlphaMode> {
    [
        wgpu::CompositeAlphaMode::PreMultiplied,
        wgpu::CompositeAlphaMode::Inherit,
        wgpu::CompositeAlphaMode::PostMultiplied,
    ]
    .into_iter()
    .find(|mode| modes.contains(mode))
    .or_else(|| modes.first().copied())
}
