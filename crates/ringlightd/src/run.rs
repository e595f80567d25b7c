use std::path::Path;

use anyhow::{Context, Result};
use lightconfig::Profile;
use ringlight::{LightControl, MonitorInfo, OverlayHost, OverlayTarget, ScreenIdentifier};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::paths::ProfileLocation;
use crate::settings::{self, load_profile, validated_overrides};
use crate::watch::{ProfileWatcher, WatchTargets, POLL_INTERVAL};

const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn,winit=warn";

pub fn initialise_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(config: Option<&Path>, args: RunArgs) -> Result<()> {
    let location = ProfileLocation::resolve(config)?;
    let profile = load_profile(&location)?;
    let overrides = validated_overrides(args.light.to_settings())?;

    let host = OverlayHost::new().context("failed to start the windowing event loop")?;
    let monitors = host.monitors();
    for monitor in &monitors {
        tracing::debug!(
            display = %monitor.label(),
            width = monitor.size.0,
            height = monitor.size.1,
            scale = monitor.scale,
            "found display"
        );
    }

    let screens = select_screens(&args, &profile, &monitors);
    if screens.is_empty() {
        anyhow::bail!("no displays to light");
    }

    let mut targets = Vec::with_capacity(screens.len());
    let mut controls = Vec::with_capacity(screens.len());
    for screen in screens {
        let plan = settings::resolve(&profile, screen.raw(), &overrides);
        tracing::info!(
            screen = %plan.screen,
            width = plan.light.width,
            intensity = plan.light.intensity,
            temperature = plan.light.temperature,
            "lighting display"
        );
        let control = LightControl::new(plan.light);
        controls.push((screen.raw(), control.clone()));
        targets.push(OverlayTarget {
            screen: plan.screen,
            control,
            top_inset: plan.top_inset,
            options: plan.options,
        });
    }

    let _watcher = if args.watch {
        Some(ProfileWatcher::spawn(
            location.path.clone(),
            WatchTargets {
                overrides,
                controls,
            },
            POLL_INTERVAL,
        )?)
    } else {
        None
    };

    host.run(targets)
}

/// `--all-screens`, then `--screen`, then the profile's screen tables, then
/// the first display. Indices with no connected display are dropped.
pub fn select_screens(
    args: &RunArgs,
    profile: &Profile,
    monitors: &[MonitorInfo],
) -> Vec<ScreenIdentifier> {
    if args.all_screens {
        return monitors.iter().map(|monitor| monitor.screen).collect();
    }

    let requested = if !args.screens.is_empty() {
        args.screens.clone()
    } else {
        let listed = profile.screen_ids();
        if listed.is_empty() {
            vec![0]
        } else {
            listed
        }
    };

    let mut screens = Vec::with_capacity(requested.len());
    for index in requested {
        let screen = ScreenIdentifier::new(index);
        if !monitors.iter().any(|monitor| monitor.screen == screen) {
            tracing::warn!(%screen, available = monitors.len(), "display not connected; skipping");
            continue;
        }
        if !screens.contains(&screen) {
            screens.push(screen);
        }
    }
    screens
}
