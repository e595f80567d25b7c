//! Hand-off of the latest [`LightConfiguration`] from control threads to the
//! render timeline.
//!
//! Writers replace the whole configuration with an atomic pointer swap, so the
//! renderer reads either the old value or the new one, never a mix. A separate
//! dirty flag tells the frame loop that a rebuild is due.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::types::LightConfiguration;

#[derive(Debug)]
struct Shared {
    latest: ArcSwap<LightConfiguration>,
    dirty: AtomicBool,
}

/// Cloneable, thread-safe handle to the configuration of one overlay.
#[derive(Debug, Clone)]
pub struct LightControl {
    shared: Arc<Shared>,
}

impl LightControl {
    /// Creates a handle holding `initial`. The dirty flag starts set so the
    /// first frame builds its uniforms.
    pub fn new(initial: LightConfiguration) -> Self {
        Self {
            shared: Arc::new(Shared {
                latest: ArcSwap::from_pointee(initial),
                dirty: AtomicBool::new(true),
            }),
        }
    }

    /// Publishes a new configuration. Returns `false` (and leaves the dirty
    /// flag alone) when it equals the current one.
    pub fn publish(&self, config: LightConfiguration) -> bool {
        let previous = self.shared.latest.swap(Arc::new(config));
        if *previous == config {
            return false;
        }
        self.shared.dirty.store(true, Ordering::Release);
        true
    }

    /// Read-modify-write of the current configuration.
    ///
    /// Concurrent updaters are retried, so `apply` may run more than once.
    pub fn update<F>(&self, mut apply: F) -> bool
    where
        F: FnMut(&mut LightConfiguration),
    {
        let mut changed = false;
        self.shared.latest.rcu(|current| {
            let mut next = **current;
            apply(&mut next);
            changed = next != **current;
            next
        });
        if changed {
            self.shared.dirty.store(true, Ordering::Release);
        }
        changed
    }

    /// Latest published configuration.
    pub fn snapshot(&self) -> Arc<LightConfiguration> {
        self.shared.latest.load_full()
    }

    /// Returns whether a change was published since the last call, clearing
    /// the flag.
    pub fn take_dirty(&self) -> bool {
        self.shared.dirty.swap(false, Ordering::AcqRel)
    }

    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::Acquire)
    }
}

impl Default for LightControl {
    fn default() -> Self {
        Self::new(LightConfiguration::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn starts_dirty_and_clears_on_take() {
        let control = LightControl::default();
        assert!(control.take_dirty());
        assert!(!control.take_dirty());
    }

    #[test]
    fn publishing_same_value_is_not_a_change() {
        let control = LightControl::default();
        control.take_dirty();
        assert!(!control.publish(LightConfiguration::default()));
        assert!(!control.is_dirty());

        let warmer = LightConfiguration {
            temperature: 3000.0,
            ..LightConfiguration::default()
        };
        assert!(control.publish(warmer));
        assert!(control.take_dirty());
        assert_eq!(control.snapshot().temperature, 3000.0);
    }

    #[test]
    fn update_applies_in_place() {
        let control = LightControl::default();
        control.take_dirty();
        assert!(control.update(|config| config.intensity = 0.2));
        assert!(control.take_dirty());
        assert_eq!(control.snapshot().intensity, 0.2);
        assert!(!control.update(|config| config.intensity = 0.2));
    }

    #[test]
    fn readers_never_observe_torn_configurations() {
        let control = LightControl::default();
        let writer = {
            let control = control.clone();
            thread::spawn(move || {
                for step in 0..2_000 {
                    let value = step as f32;
                    control.publish(LightConfiguration {
                        width: value,
                        feather: value,
                        intensity: value,
                        temperature: value,
                        corner_radius: value,
                        edge_inset: value,
                    });
                }
            })
        };

        for _ in 0..2_000 {
            let snapshot = control.snapshot();
            if snapshot.width != LightConfiguration::default().width {
                assert_eq!(snapshot.width, snapshot.feather);
                assert_eq!(snapshot.width, snapshot.temperature);
                assert_eq!(snapshot.width, snapshot.edge_inset);
            }
        }
        writer.join().expect("writer thread");
        assert_eq!(control.snapshot().width, 1999.0);
    }
}
