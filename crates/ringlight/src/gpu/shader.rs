use std::borrow::Cow;

/// WGSL source for the ring light pipeline.
pub const RING_SHADER_WGSL: &str = include_str!("ring.wgsl");

pub(crate) const VERTEX_ENTRY: &str = "vs_main";
pub(crate) const FRAGMENT_ENTRY: &str = "fs_main";

/// Vertices in the full-surface triangle strip.
pub(crate) const STRIP_VERTEX_COUNT: u32 = 4;

/// Compiles the ring shader. Validation errors surface through the device's
/// error scope, which the pipeline builder inspects.
pub(crate) fn compile_ring_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("ring light shader"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(RING_SHADER_WGSL)),
    })
}

#[cfg(test)]
mod tests {
    use std::mem::{offset_of, size_of};

    use super::*;
    use crate::uniforms::FrameUniforms;

    fn parse() -> naga::Module {
        naga::front::wgsl::parse_str(RING_SHADER_WGSL).expect("ring shader parses")
    }

    #[test]
    fn shader_validates() {
        let module = parse();
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .expect("ring shader validates");
    }

    #[test]
    fn exposes_expected_entry_points() {
        let module = parse();
        let names: Vec<&str> = module
            .entry_points
            .iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert!(names.contains(&VERTEX_ENTRY));
        assert!(names.contains(&FRAGMENT_ENTRY));
    }

    #[test]
    fn uniform_block_matches_rust_layout() {
        let module = parse();
        let (members, span) = module
            .types
            .iter()
            .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
                (Some(name), naga::TypeInner::Struct { members, span }) if name == "RingUniforms" => {
                    Some((members.clone(), *span))
                }
                _ => None,
            })
            .expect("RingUniforms struct");

        assert_eq!(span as usize, size_of::<FrameUniforms>());

        let offset = |field: &str| {
            members
                .iter()
                .find(|member| member.name.as_deref() == Some(field))
                .map(|member| member.offset as usize)
                .unwrap_or_else(|| panic!("missing uniform field {field}"))
        };

        assert_eq!(offset("resolution"), offset_of!(FrameUniforms, resolution));
        assert_eq!(offset("ring_width"), offset_of!(FrameUniforms, ring_width));
        assert_eq!(offset("feather"), offset_of!(FrameUniforms, feather));
        assert_eq!(offset("intensity"), offset_of!(FrameUniforms, intensity));
        assert_eq!(
            offset("peak_luminance"),
            offset_of!(FrameUniforms, peak_luminance)
        );
        assert_eq!(offset("color"), offset_of!(FrameUniforms, color));
        assert_eq!(
            offset("safe_top_inset"),
            offset_of!(FrameUniforms, safe_top_inset)
        );
        assert_eq!(
            offset("corner_radius"),
            offset_of!(FrameUniforms, corner_radius)
        );

        let order: Vec<&str> = members
            .iter()
            .filter_map(|member| member.name.as_deref())
            .collect();
        assert_eq!(
            order,
            [
                "resolution",
                "ring_width",
                "feather",
                "intensity",
                "peak_luminance",
                "color",
                "safe_top_inset",
                "corner_radius",
            ]
        );
    }
}
