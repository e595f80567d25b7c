use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Kelvin range the color converter is defined over.
pub const TEMPERATURE_RANGE: (f32, f32) = (1000.0, 40000.0);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSetting {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HdrSetting {
    Auto,
    Off,
}

/// A light profile: global defaults plus per-screen overrides.
///
/// ```toml
/// version = 1
///
/// [defaults]
/// width = 160
/// temperature = 5200
///
/// [screens.1]
/// intensity = 0.5
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub version: u32,
    #[serde(default)]
    pub defaults: LightSettings,
    #[serde(default)]
    pub screens: BTreeMap<String, LightSettings>,
}

/// Partial light settings. Unset fields fall through to the next layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LightSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feather: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_inset: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_inset: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerSetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hdr: Option<HdrSetting>,
}

impl LightSettings {
    /// Layers `over` on top of `self`; fields set in `over` win.
    pub fn merged(&self, over: &LightSettings) -> LightSettings {
        LightSettings {
            width: over.width.or(self.width),
            feather: over.feather.or(self.feather),
            intensity: over.intensity.or(self.intensity),
            temperature: over.temperature.or(self.temperature),
            corner_radius: over.corner_radius.or(self.corner_radius),
            edge_inset: over.edge_inset.or(self.edge_inset),
            top_inset: over.top_inset.or(self.top_inset),
            power: over.power.or(self.power),
            hdr: over.hdr.or(self.hdr),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == LightSettings::default()
    }

    /// Checks value ranges. `scope` names the table in error messages.
    pub fn validate(&self, scope: &str) -> Result<(), ConfigError> {
        let non_negative = [
            ("width", self.width),
            ("corner_radius", self.corner_radius),
            ("edge_inset", self.edge_inset),
            ("top_inset", self.top_inset),
        ];
        for (name, value) in non_negative {
            if let Some(value) = value {
                check_finite(scope, name, value)?;
                if value < 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "{scope}.{name} must be >= 0 (got {value})"
                    )));
                }
            }
        }

        for (name, value) in [("feather", self.feather), ("intensity", self.intensity)] {
            if let Some(value) = value {
                check_finite(scope, name, value)?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::Invalid(format!(
                        "{scope}.{name} must be between 0 and 1 (got {value})"
                    )));
                }
            }
        }

        if let Some(kelvin) = self.temperature {
            check_finite(scope, "temperature", kelvin)?;
            let (min, max) = TEMPERATURE_RANGE;
            if !(min..=max).contains(&kelvin) {
                return Err(ConfigError::Invalid(format!(
                    "{scope}.temperature must be between {min} and {max} Kelvin (got {kelvin})"
                )));
            }
        }

        Ok(())
    }
}

fn check_finite(scope: &str, name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{scope}.{name} must be a finite number"
        )))
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            version: 1,
            defaults: LightSettings::default(),
            screens: BTreeMap::new(),
        }
    }
}

impl Profile {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: Profile = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        self.defaults.validate("defaults")?;
        for (key, settings) in &self.screens {
            parse_screen_key(key)?;
            settings.validate(&format!("screens.{key}"))?;
        }
        Ok(())
    }

    /// Screen indices with their own table, in ascending order.
    pub fn screen_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .screens
            .keys()
            .filter_map(|key| parse_screen_key(key).ok())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// `[defaults]` with the screen's table layered on top.
    pub fn settings_for(&self, screen: u32) -> LightSettings {
        let over = self
            .screens
            .iter()
            .find(|(key, _)| parse_screen_key(key).ok() == Some(screen))
            .map(|(_, settings)| *settings)
            .unwrap_or_default();
        self.defaults.merged(&over)
    }
}

fn parse_screen_key(key: &str) -> Result<u32, ConfigError> {
    let trimmed = key.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ConfigError::Invalid(format!(
            "screen key '{key}' is invalid; expected a display index such as [screens.0]"
        )));
    }
    trimmed
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("screen index '{key}' is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[defaults]
width = 160
feather = 0.4
temperature = 5200
power = "low"

[screens.0]
top_inset = 38

[screens.1]
intensity = 0.5
temperature = 3200
hdr = "off"
"#;

    #[test]
    fn parses_sample_profile() {
        let profile = Profile::from_toml_str(SAMPLE).expect("parse profile");
        assert_eq!(profile.version, 1);
        assert_eq!(profile.defaults.width, Some(160.0));
        assert_eq!(profile.defaults.power, Some(PowerSetting::Low));
        assert_eq!(profile.screen_ids(), vec![0, 1]);
    }

    #[test]
    fn screen_settings_override_defaults() {
        let profile = Profile::from_toml_str(SAMPLE).unwrap();

        let second = profile.settings_for(1);
        assert_eq!(second.width, Some(160.0));
        assert_eq!(second.temperature, Some(3200.0));
        assert_eq!(second.intensity, Some(0.5));
        assert_eq!(second.hdr, Some(HdrSetting::Off));

        let first = profile.settings_for(0);
        assert_eq!(first.temperature, Some(5200.0));
        assert_eq!(first.top_inset, Some(38.0));
        assert_eq!(first.intensity, None);

        let unlisted = profile.settings_for(7);
        assert_eq!(unlisted, profile.defaults);
    }

    #[test]
    fn empty_profile_only_needs_version() {
        let profile = Profile::from_toml_str("version = 1").unwrap();
        assert!(profile.defaults.is_empty());
        assert!(profile.screen_ids().is_empty());
        assert!(Profile::default().validate().is_ok());
    }

    #[test]
    fn rejects_unknown_version() {
        let err = Profile::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Profile::from_toml_str(
            r#"
version = 1
[defaults]
brightness = 0.3
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_bad_screen_key() {
        let err = Profile::from_toml_str(
            r#"
version = 1
[screens.left]
width = 80
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        for body in [
            "[defaults]\nintensity = 1.5",
            "[defaults]\nfeather = -0.1",
            "[defaults]\ntemperature = 500",
            "[screens.2]\nwidth = -4",
            "[defaults]\ncorner_radius = nan",
        ] {
            let input = format!("version = 1\n{body}\n");
            let err = Profile::from_toml_str(&input).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{body}: {err}");
        }
    }

    #[test]
    fn merge_prefers_overlay() {
        let base = LightSettings {
            width: Some(100.0),
            intensity: Some(0.2),
            ..LightSettings::default()
        };
        let over = LightSettings {
            intensity: Some(0.9),
            power: Some(PowerSetting::High),
            ..LightSettings::default()
        };
        let merged = base.merged(&over);
        assert_eq!(merged.width, Some(100.0));
        assert_eq!(merged.intensity, Some(0.9));
        assert_eq!(merged.power, Some(PowerSetting::High));
    }
}
