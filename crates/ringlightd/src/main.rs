mod cli;
mod paths;
mod report;
mod run;
mod settings;
mod watch;

use std::path::Path;

use anyhow::{Context, Result};
use cli::{Command, ConfigAction, UniformsArgs};
use paths::ProfileLocation;
use report::UniformsReport;
use ringlight::SurfaceGeometry;
use settings::{load_profile, profile_exists, validated_overrides};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let config = cli.config.as_deref();
    match cli.command {
        Some(Command::Uniforms(args)) => run_uniforms(config, args),
        Some(Command::Config(config_cmd)) => match config_cmd.action {
            ConfigAction::Where => run_config_where(config),
            ConfigAction::Show => run_config_show(config),
        },
        None => run::run(config, cli.run),
    }
}

fn run_uniforms(config: Option<&Path>, args: UniformsArgs) -> Result<()> {
    let location = ProfileLocation::resolve(config)?;
    let profile = load_profile(&location)?;
    let overrides = validated_overrides(args.light.to_settings())?;
    let plan = settings::resolve(&profile, args.screen, &overrides);

    let geometry = SurfaceGeometry::new(args.size.0 as f32, args.size.1 as f32, args.scale)
        .with_top_inset(plan.top_inset);
    let uniforms = ringlight::build_uniforms(&plan.light, &geometry);

    let report = UniformsReport::new(&plan, &geometry, &uniforms);
    let json = serde_json::to_string_pretty(&report).context("failed to encode uniforms")?;
    println!("{json}");
    Ok(())
}

fn run_config_where(config: Option<&Path>) -> Result<()> {
    let location = ProfileLocation::resolve(config)?;
    println!("Light profile:");
    println!("  path:   {}", location.path.display());
    println!("  source: {}", location.source);
    println!(
        "  status: {}",
        if profile_exists(&location) {
            "present"
        } else {
            "missing (built-in defaults apply)"
        }
    );
    Ok(())
}

fn run_config_show(config: Option<&Path>) -> Result<()> {
    let location = ProfileLocation::resolve(config)?;
    let profile = load_profile(&location)?;
    let overrides = lightconfig::LightSettings::default();

    let mut screens = profile.screen_ids();
    if !screens.contains(&0) {
        screens.insert(0, 0);
    }

    println!("Light profile {}:", location.path.display());
    for screen in screens {
        let plan = settings::resolve(&profile, screen, &overrides);
        println!(
            "  {:<10} width={} feather={} intensity={} temperature={}K corner_radius={} top_inset={} power={:?} hdr={:?}",
            plan.screen.to_string(),
            plan.light.width,
            plan.light.feather,
            plan.light.intensity,
            plan.light.temperature,
            plan.light.corner_radius,
            plan.top_inset,
            plan.options.power,
            plan.options.hdr,
        );
    }
    Ok(())
}
