use std::sync::{Arc, Mutex};
use std::thread;

use ringlight::{
    build_uniforms, rgb_from_temperature, FrameLoopController, FrameTarget, FrameUniforms,
    LightConfiguration, LightControl, LoopState, PresentError, SurfaceGeometry, TickOutcome,
};

/// Shares presented frames with the test after the controller takes ownership.
#[derive(Clone, Default)]
struct FrameLog(Arc<Mutex<Vec<FrameUniforms>>>);

impl FrameLog {
    fn last(&self) -> FrameUniforms {
        *self.0.lock().unwrap().last().expect("at least one frame")
    }

    fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

struct HeadlessSurface {
    geometry: SurfaceGeometry,
    log: FrameLog,
}

impl FrameTarget for HeadlessSurface {
    fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    fn on_resize(&mut self, geometry: SurfaceGeometry) {
        self.geometry = geometry;
    }

    fn present_frame(&mut self, uniforms: &FrameUniforms) -> Result<(), PresentError> {
        self.log.0.lock().unwrap().push(*uniforms);
        Ok(())
    }
}

fn attached(
    control: LightControl,
    geometry: SurfaceGeometry,
) -> (FrameLoopController<HeadlessSurface>, FrameLog) {
    let log = FrameLog::default();
    let mut controller = FrameLoopController::new(control);
    controller.attach(HeadlessSurface {
        geometry,
        log: log.clone(),
    });
    (controller, log)
}

#[test]
fn first_frame_on_retina_display_uses_default_light() {
    let (mut controller, log) = attached(
        LightControl::default(),
        SurfaceGeometry::new(1000.0, 600.0, 2.0),
    );

    assert_eq!(controller.tick(), TickOutcome::Presented { rebuilt: true });

    let frame = log.last();
    assert_eq!(frame.resolution, [2000.0, 1200.0]);
    assert_eq!(frame.ring_width, 320.0);
    assert!((frame.peak_luminance - 4.4).abs() < 1e-4);
    assert_eq!(frame.color, rgb_from_temperature(5200.0));
}

#[test]
fn resize_changes_only_geometry_dependent_fields() {
    let (mut controller, log) = attached(
        LightControl::default(),
        SurfaceGeometry::new(1000.0, 600.0, 1.0),
    );
    controller.tick();
    let before = log.last();

    controller.on_resize(SurfaceGeometry::new(1440.0, 900.0, 2.0).with_top_inset(32.0));
    assert_eq!(controller.tick(), TickOutcome::Presented { rebuilt: true });
    let after = log.last();

    assert_eq!(after.resolution, [2880.0, 1800.0]);
    assert_eq!(after.ring_width, before.ring_width * 2.0);
    assert_eq!(after.safe_top_inset, 64.0);
    assert_eq!(after.color, before.color);
    assert_eq!(after.intensity, before.intensity);
    assert_eq!(after.feather, before.feather);
    assert_eq!(after.peak_luminance, before.peak_luminance);
}

#[test]
fn frames_match_the_pure_builder() {
    let config = LightConfiguration {
        width: 96.0,
        intensity: 0.3,
        temperature: 3200.0,
        corner_radius: 24.0,
        ..LightConfiguration::default()
    };
    let geometry = SurfaceGeometry::new(1512.0, 982.0, 2.0).with_top_inset(38.0);
    let (mut controller, log) = attached(LightControl::new(config), geometry);

    controller.tick();
    assert_eq!(log.last(), build_uniforms(&config, &geometry));
}

#[test]
fn repeated_identical_publishes_do_not_rebuild() {
    let control = LightControl::default();
    let (mut controller, _log) = attached(control.clone(), SurfaceGeometry::new(800.0, 600.0, 1.0));
    controller.tick();

    for _ in 0..5 {
        assert!(!control.publish(LightConfiguration::default()));
        assert_eq!(controller.tick(), TickOutcome::Presented { rebuilt: false });
    }
    assert_eq!(controller.stats().rebuilds, 1);
}

#[test]
fn updates_from_another_thread_are_observed_whole() {
    let control = LightControl::new(LightConfiguration {
        temperature: 1500.0,
        width: 150.0,
        ..LightConfiguration::default()
    });
    let (mut controller, log) =
        attached(control.clone(), SurfaceGeometry::new(1600.0, 1200.0, 1.0));

    let writer = {
        let control = control.clone();
        thread::spawn(move || {
            for step in 0..200u32 {
                let kelvin = 2000.0 + step as f32 * 50.0;
                control.publish(LightConfiguration {
                    temperature: kelvin,
                    width: kelvin / 10.0,
                    ..LightConfiguration::default()
                });
            }
        })
    };

    for _ in 0..200 {
        controller.tick();
        let frame = log.last();
        // Both fields come from the same published value.
        let kelvin = frame.ring_width * 10.0;
        assert_eq!(frame.color, rgb_from_temperature(kelvin));
    }
    writer.join().expect("writer thread");

    controller.tick();
    let settled = log.last();
    assert_eq!(settled.color, rgb_from_temperature(2000.0 + 199.0 * 50.0));
}

#[test]
fn detach_and_reattach() {
    let control = LightControl::default();
    let (mut controller, log) = attached(control.clone(), SurfaceGeometry::new(800.0, 600.0, 1.0));
    controller.tick();

    let surface = controller.detach().expect("attached surface");
    assert_eq!(controller.state(), LoopState::Idle);
    assert_eq!(controller.tick(), TickOutcome::Idle);
    assert_eq!(log.len(), 1);

    controller.attach(surface);
    assert_eq!(controller.tick(), TickOutcome::Presented { rebuilt: true });
    assert_eq!(log.len(), 2);
}
