use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use lightconfig::{ConfigError, LightSettings, Profile};
use ringlight::LightControl;

use crate::settings;

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Republishes each overlay's configuration when the profile changes.
pub struct ProfileWatcher {
    stop: Sender<()>,
    join_handle: Option<JoinHandle<()>>,
}

/// The overlays a profile reload feeds.
pub struct WatchTargets {
    pub overrides: LightSettings,
    pub controls: Vec<(u32, LightControl)>,
}

impl ProfileWatcher {
    pub fn spawn(path: PathBuf, targets: WatchTargets, interval: Duration) -> Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("ringlight-watch".into())
            .spawn(move || {
                let mut last_seen = modified(&path);
                tracing::info!(path = %path.display(), "watching light profile");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    let seen = modified(&path);
                    if seen == last_seen {
                        continue;
                    }
                    last_seen = seen;
                    if seen.is_none() {
                        tracing::warn!(path = %path.display(), "light profile removed; keeping current settings");
                        continue;
                    }
                    match reload(&path, &targets) {
                        Ok(changed) => {
                            tracing::info!(changed, "reloaded light profile");
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "ignoring invalid light profile; keeping current settings");
                        }
                    }
                }
            })
            .map_err(|err| anyhow!("failed to spawn profile watcher: {err}"))?;

        Ok(Self {
            stop: stop_tx,
            join_handle: Some(handle),
        })
    }
}

impl Drop for ProfileWatcher {
    fn drop(&mut self) {
        if let Some(handle) = self.join_handle.take() {
            let _ = self.stop.try_send(());
            let _ = handle.join();
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Loads the profile and publishes every overlay's new configuration.
/// Returns how many overlays changed. Nothing is published on error.
pub fn reload(path: &Path, targets: &WatchTargets) -> Result<usize, ConfigError> {
    let profile = Profile::load(path)?;
    let mut changed = 0;
    for (screen, control) in &targets.controls {
        let plan = settings::resolve(&profile, *screen, &targets.overrides);
        if control.publish(plan.light) {
            changed += 1;
        }
    }
    Ok(changed)
}
