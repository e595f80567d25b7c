use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lightconfig::{HdrSetting, LightSettings, PowerSetting};

#[derive(Parser, Debug)]
#[command(
    name = "ringlightd",
    author,
    version,
    about = "Ring light daemon: lights the edges of your displays",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Light profile (TOML). Defaults to `ringlight.toml` in the user config
    /// directory; `RINGLIGHT_CONFIG` also overrides it.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Display index to light (repeatable). Defaults to the screens listed in
    /// the profile, or the first display.
    #[arg(long = "screen", value_name = "INDEX")]
    pub screens: Vec<u32>,

    /// Light every connected display.
    #[arg(long, conflicts_with = "screens")]
    pub all_screens: bool,

    /// Reload the profile when it changes on disk.
    #[arg(long)]
    pub watch: bool,

    #[command(flatten)]
    pub light: LightArgs,
}

/// Per-run overrides layered over the profile.
#[derive(Args, Debug, Default, Clone)]
pub struct LightArgs {
    /// Ring thickness in points (minimum 20).
    #[arg(long, value_name = "POINTS")]
    pub width: Option<f32>,

    /// Inner edge softness as a fraction of the width (0-1).
    #[arg(long, value_name = "FRACTION")]
    pub feather: Option<f32>,

    /// Brightness (0-1).
    #[arg(long, value_name = "FRACTION")]
    pub intensity: Option<f32>,

    /// Color temperature in Kelvin (1000-40000).
    #[arg(long, value_name = "KELVIN")]
    pub temperature: Option<f32>,

    /// Rounding of the unlit centre in points.
    #[arg(long, value_name = "POINTS")]
    pub corner_radius: Option<f32>,

    /// Height of the menu bar or notch area to keep dark, in points.
    #[arg(long, value_name = "POINTS")]
    pub top_inset: Option<f32>,

    /// GPU preference: `low` (integrated) or `high` (discrete).
    #[arg(long, value_name = "PREFERENCE", env = "RINGLIGHT_POWER", value_parser = parse_power)]
    pub power: Option<PowerSetting>,

    /// Extended-range output: `auto` or `off`.
    #[arg(long, value_name = "MODE", value_parser = parse_hdr)]
    pub hdr: Option<HdrSetting>,
}

impl LightArgs {
    pub fn to_settings(&self) -> LightSettings {
        LightSettings {
            width: self.width,
            feather: self.feather,
            intensity: self.intensity,
            temperature: self.temperature,
            corner_radius: self.corner_radius,
            edge_inset: None,
            top_inset: self.top_inset,
            power: self.power,
            hdr: self.hdr,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the shader uniforms a configuration produces, as JSON.
    Uniforms(UniformsArgs),
    /// Inspect the light profile.
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
pub struct UniformsArgs {
    /// Logical surface size in points.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: (u32, u32),

    /// Pixels per point.
    #[arg(long, value_name = "FACTOR", default_value_t = 1.0)]
    pub scale: f32,

    /// Resolve the profile for this display index.
    #[arg(long, value_name = "INDEX", default_value_t = 0)]
    pub screen: u32,

    #[command(flatten)]
    pub light: LightArgs,
}

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print where the profile is read from.
    Where,
    /// Print the settings each display resolves to.
    Show,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_power(value: &str) -> Result<PowerSetting, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "low" | "low-power" | "integrated" => Ok(PowerSetting::Low),
        "high" | "high-performance" | "discrete" => Ok(PowerSetting::High),
        "" => Err("power preference must not be empty".to_string()),
        other => Err(format!(
            "unknown power preference '{other}'; expected 'low' or 'high'"
        )),
    }
}

pub fn parse_hdr(value: &str) -> Result<HdrSetting, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "auto" | "on" => Ok(HdrSetting::Auto),
        "off" | "sdr" => Ok(HdrSetting::Off),
        "" => Err("hdr mode must not be empty".to_string()),
        other => Err(format!("unknown hdr mode '{other}'; expected 'auto' or 'off'")),
    }
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32), String> {
    let (width, height) = spec
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WxH format, e.g. 1440x900".to_string())?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;
    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "ringlightd",
            "--screen",
            "0",
            "--screen",
            "2",
            "--temperature",
            "3200",
            "--power",
            "high",
            "--watch",
        ])
        .expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.run.screens, vec![0, 2]);
        assert!(cli.run.watch);
        let settings = cli.run.light.to_settings();
        assert_eq!(settings.temperature, Some(3200.0));
        assert_eq!(settings.power, Some(PowerSetting::High));
        assert_eq!(settings.width, None);
    }

    #[test]
    fn all_screens_conflicts_with_screen() {
        let err = Cli::try_parse_from(["ringlightd", "--all-screens", "--screen", "1"]);
        assert!(err.is_err());
    }

    #[test]
    fn parses_uniforms_subcommand() {
        let cli = Cli::try_parse_from([
            "ringlightd",
            "uniforms",
            "--size",
            "1000x600",
            "--scale",
            "2",
            "--config",
            "/tmp/light.toml",
        ])
        .expect("parse");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/light.toml")));
        match cli.command {
            Some(Command::Uniforms(args)) => {
                assert_eq!(args.size, (1000, 600));
                assert_eq!(args.scale, 2.0);
                assert_eq!(args.screen, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_value_helpers() {
        assert_eq!(parse_power("Discrete").unwrap(), PowerSetting::High);
        assert!(parse_power("turbo").is_err());
        assert_eq!(parse_hdr("off").unwrap(), HdrSetting::Off);
        assert_eq!(parse_surface_size("1512X982").unwrap(), (1512, 982));
        assert!(parse_surface_size("0x10").is_err());
        assert!(parse_surface_size("wide").is_err());
    }
}
