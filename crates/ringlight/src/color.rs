//! Black-body color approximation used to tint the glow.

const MIN_KELVIN: f64 = 1000.0;
const MAX_KELVIN: f64 = 40000.0;
const NEUTRAL_KELVIN: f64 = 6500.0;

/// Approximates the RGB color of a black-body radiator at `kelvin`.
///
/// Uses the usual piecewise fit of the Planckian locus. The input is clamped
/// to `[1000, 40000]` K and every returned channel lies in `[0, 1]`. A NaN
/// temperature is treated as daylight white (6500 K).
pub fn rgb_from_temperature(kelvin: f32) -> [f32; 3] {
    let kelvin = f64::from(kelvin);
    let kelvin = if kelvin.is_nan() {
        NEUTRAL_KELVIN
    } else {
        kelvin.clamp(MIN_KELVIN, MAX_KELVIN)
    };
    let t = kelvin / 100.0;

    let red = if t <= 66.0 {
        255.0
    } else {
        329.698727446 * (t - 60.0).powf(-0.1332047592)
    };

    let green = if t <= 66.0 {
        99.4708025861 * t.ln() - 161.1195681661
    } else {
        288.1221695283 * (t - 60.0).powf(-0.0755148492)
    };

    let blue = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.5177312231 * (t - 10.0).ln() - 305.0447927307
    };

    [normalize(red), normalize(green), normalize(blue)]
}

fn normalize(channel: f64) -> f32 {
    (channel / 255.0).clamp(0.0, 1.0) as f32
}
