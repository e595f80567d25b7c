use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder, WindowId, WindowLevel};

use crate::control::LightControl;
use crate::frame::{FrameLoopController, LoopState, TickOutcome};
use crate::gpu::RenderSurfaceManager;
use crate::types::{ScreenIdentifier, SurfaceGeometry, SurfaceOptions};

/// How often a running host re-reads the display list.
pub const DISPLAY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// A display the host can put an overlay on.
///
/// `screen` is the monitor's position in the platform's enumeration order at
/// the time of the scan and is what per-screen settings are keyed on. Once an
/// overlay is open it follows its display by name, so a reordering after a
/// hotplug does not move it to another monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorInfo {
    pub screen: ScreenIdentifier,
    pub name: Option<String>,
    /// Top-left corner in the desktop's physical coordinate space.
    pub position: (i32, i32),
    pub size: (u32, u32),
    pub scale: f64,
}

impl MonitorInfo {
    /// Size in logical points.
    pub fn geometry(&self) -> SurfaceGeometry {
        SurfaceGeometry::from_physical(self.size.0, self.size.1, self.scale, 0.0)
    }

    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({name})", self.screen),
            None => self.screen.to_string(),
        }
    }

    /// Whether `other` is the same physical display. Named displays match by
    /// name; otherwise the enumeration index decides.
    pub fn same_display(&self, other: &MonitorInfo) -> bool {
        match (&self.name, &other.name) {
            (Some(ours), Some(theirs)) => ours == theirs,
            _ => self.screen == other.screen,
        }
    }

    fn same_placement(&self, other: &MonitorInfo) -> bool {
        self.position == other.position && self.size == other.size && self.scale == other.scale
    }
}

/// Everything the host needs to light one display.
#[derive(Clone)]
pub struct OverlayTarget {
    pub screen: ScreenIdentifier,
    pub control: LightControl,
    /// Points at the top of the screen the glow stays clear of.
    pub top_inset: f32,
    pub options: SurfaceOptions,
}

/// Owns the winit event loop and one transparent window per lit display.
pub struct OverlayHost {
    event_loop: EventLoop<()>,
}

impl OverlayHost {
    pub fn new() -> Result<Self> {
        let event_loop =
            EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
        Ok(Self { event_loop })
    }

    pub fn monitors(&self) -> Vec<MonitorInfo> {
        scan_monitors(&self.event_loop)
    }

    /// Opens the overlays and drives them until every window closes. Blocks
    /// the calling thread.
    ///
    /// While running, the display list is re-read every
    /// [`DISPLAY_POLL_INTERVAL`]: overlays follow their display when it moves
    /// or changes mode, close when it disappears, and reopen when it returns.
    pub fn run(self, targets: Vec<OverlayTarget>) -> Result<()> {
        let monitors = self.monitors();
        let mut overlays = Overlays::default();
        for target in targets {
            let Some(monitor) = monitors.iter().find(|monitor| monitor.screen == target.screen)
            else {
                tracing::warn!(screen = %target.screen, "no such display; skipping overlay");
                continue;
            };
            overlays
                .open
                .push(Overlay::open(&self.event_loop, monitor.clone(), target)?);
        }

        if !overlays
            .open
            .iter()
            .any(|overlay| overlay.frame_loop.state() == LoopState::Running)
        {
            tracing::warn!("no ring light overlay is rendering");
        }
        self.drive(overlays)
    }

    fn drive(self, mut overlays: Overlays) -> Result<()> {
        let mut poll = DisplayPoll::new(DISPLAY_POLL_INTERVAL, Instant::now());
        let run_result = self.event_loop.run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } => {
                let Some(index) = overlays.position(window_id) else {
                    return;
                };
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        let mut overlay = overlays.open.remove(index);
                        overlay.frame_loop.detach();
                        tracing::info!(screen = %overlay.target.screen, "overlay closed");
                        if overlays.open.is_empty() && overlays.parked.is_empty() {
                            elwt.exit();
                        }
                    }
                    WindowEvent::Resized(size) => overlays.open[index].resize(size),
                    WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                        let overlay = &mut overlays.open[index];
                        overlay.scale = scale_factor;
                        let size = overlay.window.inner_size();
                        overlay.resize(size);
                    }
                    WindowEvent::RedrawRequested => {
                        let overlay = &mut overlays.open[index];
                        if overlay.frame_loop.tick() == TickOutcome::Detached {
                            tracing::warn!(screen = %overlay.target.screen, "overlay stopped rendering");
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                if poll.due(Instant::now()) {
                    let monitors = scan_monitors(elwt);
                    overlays.refresh(elwt, &monitors);
                }
                for overlay in &overlays.open {
                    if overlay.frame_loop.state() == LoopState::Running {
                        overlay.window.request_redraw();
                    }
                }
                elwt.set_control_flow(ControlFlow::WaitUntil(poll.deadline()));
            }
            Event::LoopExiting => {
                for overlay in &mut overlays.open {
                    overlay.frame_loop.detach();
                }
            }
            _ => {}
        });

        run_result.map_err(|err| anyhow!("overlay event loop error: {err}"))
    }
}

fn scan_monitors(target: &EventLoopWindowTarget<()>) -> Vec<MonitorInfo> {
    target
        .available_monitors()
        .enumerate()
        .map(|(index, monitor)| {
            let position = monitor.position();
            let size = monitor.size();
            MonitorInfo {
                screen: ScreenIdentifier::new(index as u32),
                name: monitor.name(),
                position: (position.x, position.y),
                size: (size.width, size.height),
                scale: monitor.scale_factor(),
            }
        })
        .collect()
}

/// Open overlays plus the ones waiting for their display to come back.
#[derive(Default)]
struct Overlays {
    open: Vec<Overlay>,
    parked: Vec<Parked>,
}

struct Parked {
    target: OverlayTarget,
    monitor: MonitorInfo,
}

impl Overlays {
    fn position(&self, id: WindowId) -> Option<usize> {
        self.open.iter().position(|overlay| overlay.window.id() == id)
    }

    fn refresh(&mut self, elwt: &EventLoopWindowTarget<()>, monitors: &[MonitorInfo]) {
        let open: Vec<MonitorInfo> = self.open.iter().map(|o| o.monitor.clone()).collect();
        let parked: Vec<MonitorInfo> = self.parked.iter().map(|p| p.monitor.clone()).collect();
        let plan = reconcile(&open, &parked, monitors);
        if plan.is_empty() {
            return;
        }

        for (index, monitor) in plan.moved {
            self.open[index].follow(monitor);
        }

        let mut returning = Vec::with_capacity(plan.returned.len());
        for (index, monitor) in plan.returned.into_iter().rev() {
            returning.push((self.parked.remove(index), monitor));
        }

        for index in plan.lost.into_iter().rev() {
            let mut overlay = self.open.remove(index);
            overlay.frame_loop.detach();
            tracing::warn!(
                screen = %overlay.target.screen,
                display = %overlay.monitor.label(),
                "display disconnected; overlay parked"
            );
            self.parked.push(Parked {
                target: overlay.target.clone(),
                monitor: overlay.monitor.clone(),
            });
        }

        for (parked, monitor) in returning {
            tracing::info!(screen = %parked.target.screen, display = %monitor.label(), "display reconnected");
            match Overlay::open(elwt, monitor, parked.target.clone()) {
                Ok(overlay) => self.open.push(overlay),
                Err(err) => {
                    tracing::warn!(screen = %parked.target.screen, error = %err, "failed to reopen overlay");
                    self.parked.push(parked);
                }
            }
        }
    }
}

/// What a fresh display scan means for the overlays.
///
/// Indices refer to the `open` and `parked` slices given to [`reconcile`].
#[derive(Debug, Default, PartialEq)]
struct DisplayPlan {
    /// Open overlays whose display moved or changed mode.
    moved: Vec<(usize, MonitorInfo)>,
    /// Open overlays whose display is gone.
    lost: Vec<usize>,
    /// Parked overlays whose display is back.
    returned: Vec<(usize, MonitorInfo)>,
}

impl DisplayPlan {
    fn is_empty(&self) -> bool {
        self.moved.is_empty() && self.lost.is_empty() && self.returned.is_empty()
    }
}

fn reconcile(open: &[MonitorInfo], parked: &[MonitorInfo], monitors: &[MonitorInfo]) -> DisplayPlan {
    let mut plan = DisplayPlan::default();
    for (index, known) in open.iter().enumerate() {
        match monitors.iter().find(|monitor| known.same_display(monitor)) {
            Some(current) if !current.same_placement(known) => {
                plan.moved.push((index, current.clone()));
            }
            Some(_) => {}
            None => plan.lost.push(index),
        }
    }
    for (index, known) in parked.iter().enumerate() {
        if let Some(current) = monitors.iter().find(|monitor| known.same_display(monitor)) {
            plan.returned.push((index, current.clone()));
        }
    }
    plan
}

/// Deadline bookkeeping for the display rescan.
#[derive(Debug)]
struct DisplayPoll {
    interval: Duration,
    next: Instant,
}

impl DisplayPoll {
    fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now + interval,
        }
    }

    /// True once per interval; advances the deadline when it fires.
    fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next = now + self.interval;
        true
    }

    fn deadline(&self) -> Instant {
        self.next
    }
}

/// One display's window and frame loop. The frame loop is declared first so
/// its surface drops before the window.
struct Overlay {
    frame_loop: FrameLoopController<RenderSurfaceManager>,
    window: Arc<Window>,
    target: OverlayTarget,
    monitor: MonitorInfo,
    scale: f64,
}

impl Overlay {
    /// Creates the window covering `monitor` and attaches a render surface.
    /// A failed attach is logged and leaves the overlay idle.
    fn open(
        elwt: &EventLoopWindowTarget<()>,
        monitor: MonitorInfo,
        target: OverlayTarget,
    ) -> Result<Self> {
        let window = WindowBuilder::new()
            .with_title("ringlight")
            .with_decorations(false)
            .with_transparent(true)
            .with_resizable(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_position(PhysicalPosition::new(monitor.position.0, monitor.position.1))
            .with_inner_size(PhysicalSize::new(monitor.size.0, monitor.size.1))
            .build(elwt)
            .with_context(|| format!("failed to create overlay window for {}", target.screen))?;
        if let Err(err) = window.set_cursor_hittest(false) {
            tracing::warn!(screen = %target.screen, error = %err, "overlay will intercept clicks");
        }

        let window = Arc::new(window);
        let mut overlay = Self {
            frame_loop: FrameLoopController::new(target.control.clone()),
            scale: window.scale_factor(),
            window,
            target,
            monitor,
        };

        let geometry = overlay.geometry_for(overlay.window.inner_size());
        match RenderSurfaceManager::attach(overlay.window.clone(), geometry, overlay.target.options)
        {
            Ok(surface) => {
                tracing::info!(
                    screen = %overlay.target.screen,
                    adapter = surface.adapter_name(),
                    color_range = ?surface.color_range(),
                    "ring light attached"
                );
                overlay.frame_loop.attach(surface);
            }
            Err(err) => {
                tracing::error!(screen = %overlay.target.screen, error = %err, "ring light unavailable");
            }
        }
        Ok(overlay)
    }

    fn geometry_for(&self, size: PhysicalSize<u32>) -> SurfaceGeometry {
        SurfaceGeometry::from_physical(size.width, size.height, self.scale, self.target.top_inset)
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let geometry = self.geometry_for(size);
        self.frame_loop.on_resize(geometry);
    }

    /// Moves and resizes the window onto `monitor`'s new placement. The
    /// surface follows through the resulting `Resized` event, or directly
    /// when the platform applies the size synchronously.
    fn follow(&mut self, monitor: MonitorInfo) {
        tracing::info!(
            screen = %self.target.screen,
            display = %monitor.label(),
            width = monitor.size.0,
            height = monitor.size.1,
            "display changed; moving overlay"
        );
        self.window
            .set_outer_position(PhysicalPosition::new(monitor.position.0, monitor.position.1));
        let requested = PhysicalSize::new(monitor.size.0, monitor.size.1);
        if let Some(size) = self.window.request_inner_size(requested) {
            self.scale = self.window.scale_factor();
            self.resize(size);
        }
        self.monitor = monitor;
    }
}
