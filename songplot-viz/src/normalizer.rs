use alloc::vec::Vec;

use crate::config::AMPLITUDE_MAX;
use crate::math::linear_map;
use crate::types::{Band, Sample};

/// Perceptual weight for a band centred at `center_hz`.
///
/// Lows are damped and highs boosted so bands that naturally carry less
/// energy stay visible next to the bass.
pub fn frequency_weight(center_hz: f32) -> f32 {
    if center_hz < 500.0 {
        0.3
    } else if center_hz < 2_000.0 {
        0.7
    } else if center_hz < 8_000.0 {
        1.0
    } else {
        1.5
    }
}

/// Cross-band normalization of one sample.
///
/// A sample with no bands, or with every band at the same value, is returned
/// unchanged. Otherwise each band is weighted by [`frequency_weight`], mapped
/// from `[0, 255 * weight]` back onto `[0, 255]` and clamped.
pub fn normalize(sample: &Sample, bands: &[Band]) -> Sample {
    if sample.bands.is_empty() || sample.is_flat() {
        return sample.clone();
    }

    let values: Vec<f32> = sample
        .bands
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let weight = bands
                .get(i)
                .map(|band| frequency_weight(band.center_frequency()))
                .unwrap_or(1.0);
            let weighted = value * weight;
            linear_map(weighted, 0.0, AMPLITUDE_MAX * weight, 0.0, AMPLITUDE_MAX)
                .clamp(0.0, AMPLITUDE_MAX)
        })
        .collect();

    sample.with_bands(values)
}
