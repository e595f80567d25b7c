use ringlight::{FrameUniforms, LightConfiguration, SurfaceGeometry};
use serde::Serialize;

use crate::settings::ScreenPlan;

/// JSON shape printed by `ringlightd uniforms`.
#[derive(Debug, Serialize)]
pub struct UniformsReport {
    pub screen: u32,
    pub configuration: LightReport,
    pub geometry: GeometryReport,
    pub uniforms: UniformsBlock,
}

#[derive(Debug, Serialize)]
pub struct LightReport {
    pub width: f32,
    pub feather: f32,
    pub intensity: f32,
    pub temperature: f32,
    pub corner_radius: f32,
    pub edge_inset: f32,
}

#[derive(Debug, Serialize)]
pub struct GeometryReport {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub top_inset: f32,
    pub pixel_size: (u32, u32),
}

#[derive(Debug, Serialize)]
pub struct UniformsBlock {
    pub resolution: [f32; 2],
    pub ring_width: f32,
    pub feather: f32,
    pub intensity: f32,
    pub peak_luminance: f32,
    pub color: [f32; 3],
    pub safe_top_inset: f32,
    pub corner_radius: f32,
}

impl UniformsReport {
    pub fn new(plan: &ScreenPlan, geometry: &SurfaceGeometry, uniforms: &FrameUniforms) -> Self {
        Self {
            screen: plan.screen.raw(),
            configuration: LightReport::from(&plan.light),
            geometry: GeometryReport {
                width: geometry.width,
                height: geometry.height,
                scale: geometry.effective_scale(),
                top_inset: geometry.top_inset,
                pixel_size: geometry.pixel_size(),
            },
            uniforms: UniformsBlock {
                resolution: uniforms.resolution,
                ring_width: uniforms.ring_width,
                feather: uniforms.feather,
                intensity: uniforms.intensity,
                peak_luminance: uniforms.peak_luminance,
                color: uniforms.color,
                safe_top_inset: uniforms.safe_top_inset,
                corner_radius: uniforms.corner_radius,
            },
        }
    }
}

impl From<&LightConfiguration> for LightReport {
    fn from(light: &LightConfiguration) -> Self {
        Self {
            width: light.width,
            feather: light.feather,
            intensity: light.intensity,
            temperature: light.temperature,
            corner_radius: light.corner_radius,
            edge_inset: light.edge_inset,
        }
    }
}
