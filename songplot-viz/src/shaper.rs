use alloc::vec::Vec;

use libm::{logf, powf};

use crate::config::{AMPLITUDE_MAX, MAX_CURVE, MAX_FREQUENCY_HZ, MIN_CURVE, MIN_FREQUENCY_HZ};
use crate::math::linear_map;
use crate::types::{Band, Sample};

/// Boost factor for a band centred at `center_hz`.
///
/// The band's position on a log frequency axis between 20 Hz and 20 kHz is
/// raised to `intensity`, scaled by `multiplier` and clamped to `[0.2, 3.0]`.
/// Lower intensity flattens the curve towards `multiplier` for every band.
pub fn curve_factor(center_hz: f32, intensity: f32, multiplier: f32) -> f32 {
    let position = if center_hz > 0.0 {
        linear_map(
            logf(center_hz),
            logf(MIN_FREQUENCY_HZ),
            logf(MAX_FREQUENCY_HZ),
            0.0,
            1.0,
        )
        .clamp(0.0, 1.0)
    } else {
        0.0
    };

    (powf(position, intensity) * multiplier).clamp(MIN_CURVE, MAX_CURVE)
}

/// Applies the log curve to every band of `sample`, clamping to `[0, 255]`.
pub fn shape(sample: &Sample, bands: &[Band], intensity: f32, multiplier: f32) -> Sample {
    if sample.bands.is_empty() {
        return sample.clone();
    }

    let values: Vec<f32> = sample
        .bands
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let curve = bands
                .get(i)
                .map(|band| curve_factor(band.center_frequency(), intensity, multiplier))
                .unwrap_or(1.0);
            (value * curve).clamp(0.0, AMPLITUDE_MAX)
        })
        .collect();

    sample.with_bands(values)
}
