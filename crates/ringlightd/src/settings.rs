//! Turns layered profile settings into what the renderer consumes.

use std::fs;
use std::io;

use anyhow::{Context, Result};
use lightconfig::{ConfigError, HdrSetting, LightSettings, PowerSetting, Profile};
use ringlight::{
    GpuPowerPreference, HdrMode, LightConfiguration, ScreenIdentifier, SurfaceOptions,
};

use crate::paths::ProfileLocation;

/// Fully resolved settings for one display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPlan {
    pub screen: ScreenIdentifier,
    pub light: LightConfiguration,
    pub top_inset: f32,
    pub options: SurfaceOptions,
}

/// Built-in defaults ← `[defaults]` ← `[screens.N]` ← command line.
pub fn resolve(profile: &Profile, screen: u32, overrides: &LightSettings) -> ScreenPlan {
    let settings = profile.settings_for(screen).merged(overrides);
    let base = LightConfiguration::default();
    let light = LightConfiguration {
        width: settings.width.unwrap_or(base.width),
        feather: settings.feather.unwrap_or(base.feather),
        intensity: settings.intensity.unwrap_or(base.intensity),
        temperature: settings.temperature.unwrap_or(base.temperature),
        corner_radius: settings.corner_radius.unwrap_or(base.corner_radius),
        edge_inset: settings.edge_inset.unwrap_or(base.edge_inset),
    };

    let mut options = SurfaceOptions::default();
    if let Some(power) = settings.power {
        options.power = match power {
            PowerSetting::Low => GpuPowerPreference::Low,
            PowerSetting::High => GpuPowerPreference::High,
        };
    }
    if let Some(hdr) = settings.hdr {
        options.hdr = match hdr {
            HdrSetting::Auto => HdrMode::Auto,
            HdrSetting::Off => HdrMode::Off,
        };
    }

    ScreenPlan {
        screen: ScreenIdentifier::new(screen),
        light,
        top_inset: settings.top_inset.unwrap_or(0.0),
        options,
    }
}

/// Reads the profile at `location`. A missing file at the default location
/// yields an empty profile.
pub fn load_profile(location: &ProfileLocation) -> Result<Profile> {
    match Profile::load(&location.path) {
        Ok(profile) => {
            tracing::debug!(path = %location.path.display(), source = %location.source, "loaded light profile");
            Ok(profile)
        }
        Err(ConfigError::Io { source, .. })
            if source.kind() == io::ErrorKind::NotFound && !location.is_required() =>
        {
            tracing::debug!(path = %location.path.display(), "no light profile; using built-in defaults");
            Ok(Profile::default())
        }
        Err(err) => Err(err)
            .with_context(|| format!("failed to load light profile {}", location.path.display())),
    }
}

/// Command-line overrides, checked with the same rules as the profile.
pub fn validated_overrides(settings: LightSettings) -> Result<LightSettings> {
    settings
        .validate("command line")
        .context("invalid light override")?;
    Ok(settings)
}

/// Whether a profile file exists at `location`.
pub fn profile_exists(location: &ProfileLocation) -> bool {
    fs::metadata(&location.path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::ProfileSource;
    use std::path::PathBuf;

    const PROFILE: &str = r#"
version = 1

[defaults]
width = 120
temperature = 4000

[screens.1]
temperature = 2700
top_inset = 32
power = "high"
"#;

    #[test]
    fn layers_resolve_in_order() {
        let profile = Profile::from_toml_str(PROFILE).unwrap();
        let overrides = LightSettings {
            intensity: Some(0.3),
            ..LightSettings::default()
        };

        let plan = resolve(&profile, 1, &overrides);
        assert_eq!(plan.screen, ScreenIdentifier::new(1));
        assert_eq!(plan.light.width, 120.0);
        assert_eq!(plan.light.temperature, 2700.0);
        assert_eq!(plan.light.intensity, 0.3);
        assert_eq!(plan.light.feather, LightConfiguration::default().feather);
        assert_eq!(plan.top_inset, 32.0);
        assert_eq!(plan.options.power, GpuPowerPreference::High);
        assert_eq!(plan.options.hdr, HdrMode::Auto);

        let other = resolve(&profile, 0, &LightSettings::default());
        assert_eq!(other.light.temperature, 4000.0);
        assert_eq!(other.top_inset, 0.0);
        assert_eq!(other.options, SurfaceOptions::default());
    }

    #[test]
    fn command_line_wins_over_screen_table() {
        let profile = Profile::from_toml_str(PROFILE).unwrap();
        let overrides = LightSettings {
            temperature: Some(6500.0),
            hdr: Some(HdrSetting::Off),
            ..LightSettings::default()
        };
        let plan = resolve(&profile, 1, &overrides);
        assert_eq!(plan.light.temperature, 6500.0);
        assert_eq!(plan.options.hdr, HdrMode::Off);
    }

    #[test]
    fn empty_profile_resolves_to_defaults() {
        let plan = resolve(&Profile::default(), 0, &LightSettings::default());
        assert_eq!(plan.light, LightConfiguration::default());
    }

    #[test]
    fn missing_default_profile_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let location = ProfileLocation {
            path: dir.path().join("ringlight.toml"),
            source: ProfileSource::Default,
        };
        let profile = load_profile(&location).unwrap();
        assert!(profile.defaults.is_empty());
        assert!(!profile_exists(&location));
    }

    #[test]
    fn missing_explicit_profile_is_an_error() {
        let location = ProfileLocation {
            path: PathBuf::from("/definitely/not/here/ringlight.toml"),
            source: ProfileSource::Flag,
        };
        assert!(load_profile(&location).is_err());
    }

    #[test]
    fn overrides_are_range_checked() {
        let bad = LightSettings {
            intensity: Some(2.0),
            ..LightSettings::default()
        };
        assert!(validated_overrides(bad).is_err());
        assert!(validated_overrides(LightSettings::default()).is_ok());
    }
}
