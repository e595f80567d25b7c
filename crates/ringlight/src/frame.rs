//! Per-vsync orchestration: rebuild uniforms if dirty, then present.

use crate::control::LightControl;
use crate::error::PresentError;
use crate::types::SurfaceGeometry;
use crate::uniforms::{FrameUniforms, UniformCache};

/// Something the frame loop can draw into.
///
/// [`crate::RenderSurfaceManager`] is the real implementation; tests drive the
/// loop with in-memory targets.
pub trait FrameTarget {
    /// Geometry the next frame should be built for.
    fn geometry(&self) -> SurfaceGeometry;
    /// Applies a resize or scale change.
    fn on_resize(&mut self, geometry: SurfaceGeometry);
    /// Encodes and presents one frame with `uniforms`.
    fn present_frame(&mut self, uniforms: &FrameUniforms) -> Result<(), PresentError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Result of a single [`FrameLoopController::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing attached.
    Idle,
    /// A frame was submitted. `rebuilt` reports whether the uniforms were
    /// recomputed for it.
    Presented { rebuilt: bool },
    /// The surface could not provide a frame this tick.
    Skipped,
    /// The target failed permanently and was dropped.
    Detached,
}

/// Counters for the frames a controller has driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub presented: u64,
    pub skipped: u64,
    pub rebuilds: u64,
}

/// Drives one overlay: `Idle` until a target is attached, then one
/// "rebuild-if-dirty, present" per tick.
pub struct FrameLoopController<T> {
    control: LightControl,
    target: Option<T>,
    cache: UniformCache,
    stats: FrameStats,
    skip_streak: u32,
}

impl<T: FrameTarget> FrameLoopController<T> {
    pub fn new(control: LightControl) -> Self {
        Self {
            control,
            target: None,
            cache: UniformCache::new(),
            stats: FrameStats::default(),
            skip_streak: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        if self.target.is_some() {
            LoopState::Running
        } else {
            LoopState::Idle
        }
    }

    pub fn control(&self) -> &LightControl {
        &self.control
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Starts driving `target`, returning any previously attached one.
    pub fn attach(&mut self, target: T) -> Option<T> {
        self.cache.invalidate();
        let previous = self.target.replace(target);
        tracing::debug!(replaced = previous.is_some(), "frame loop running");
        previous
    }

    /// Stops rendering and hands the target back so the caller can drop its
    /// GPU resources. Safe between any two ticks.
    pub fn detach(&mut self) -> Option<T> {
        let target = self.target.take();
        if target.is_some() {
            tracing::debug!("frame loop idle");
        }
        target
    }

    /// Forwards new geometry to the target and marks the uniforms dirty.
    /// Ignored while idle.
    pub fn on_resize(&mut self, geometry: SurfaceGeometry) {
        if let Some(target) = self.target.as_mut() {
            target.on_resize(geometry);
            self.cache.invalidate();
        }
    }

    /// Handles one vsync tick.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(target) = self.target.as_mut() else {
            return TickOutcome::Idle;
        };

        if self.control.take_dirty() {
            self.cache.invalidate();
        }
        let geometry = target.geometry();
        let rebuilt = self.cache.is_stale_for(&geometry);
        let config = self.control.snapshot();
        let uniforms = self.cache.resolve(&config, &geometry);
        if rebuilt {
            self.stats.rebuilds += 1;
        }

        match target.present_frame(uniforms) {
            Ok(()) => {
                self.stats.presented += 1;
                self.skip_streak = 0;
                TickOutcome::Presented { rebuilt }
            }
            Err(PresentError::Skipped(reason)) => {
                self.stats.skipped += 1;
                self.skip_streak += 1;
                if self.skip_streak == 1 {
                    tracing::warn!(%reason, "skipped ring light frame");
                } else {
                    tracing::debug!(%reason, streak = self.skip_streak, "skipped ring light frame");
                }
                TickOutcome::Skipped
            }
            Err(err @ PresentError::Fatal(_)) => {
                tracing::error!(error = %err, "ring light surface failed; detaching");
                self.target = None;
                TickOutcome::Detached
            }
        }
    }
}
