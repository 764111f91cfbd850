use alloc::vec::Vec;

use crate::config::NYQUIST_HZ;
use crate::types::Band;

/// Width in Hz of one bin of a spectrum with `num_bins` bins.
pub fn bin_size(num_bins: usize) -> f32 {
    if num_bins == 0 {
        return 0.0;
    }
    NYQUIST_HZ / num_bins as f32
}

/// Frequency of bin `index` in a spectrum with `num_bins` bins.
pub fn bin_frequency(index: usize, num_bins: usize) -> f32 {
    index as f32 * bin_size(num_bins)
}

/// Reduces one spectrum snapshot to one amplitude per band.
///
/// Each band is the mean of the bins whose frequency lies inside
/// `[band.min, band.max]`, times the band's gain. A band that matches no bin
/// yields 0.
pub fn aggregate(spectrum: &[f32], bands: &[Band]) -> Vec<f32> {
    bands
        .iter()
        .map(|band| band_average(spectrum, band) * band.gain)
        .collect()
}

fn band_average(spectrum: &[f32], band: &Band) -> f32 {
    let bin_size = bin_size(spectrum.len());
    let mut sum = 0.0f32;
    let mut count = 0usize;

    for (i, &amplitude) in spectrum.iter().enumerate() {
        if band.contains(i as f32 * bin_size) {
            sum += amplitude;
            count += 1;
        }
    }

    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band_config::derive_bands;
    use crate::palette::DEFAULT_PALETTE;
    use alloc::vec;
    use approx::assert_abs_diff_eq;
    use embedded_graphics::pixelcolor::Rgb888;

    fn band(min: f32, max: f32, gain: f32) -> Band {
        Band::new(min, max, gain, Rgb888::new(0, 0, 0))
    }

    #[test]
    fn test_bin_geometry() {
        assert_eq!(bin_size(1024), NYQUIST_HZ / 1024.0);
        assert_eq!(bin_frequency(2, 441), 100.0);
        assert_eq!(bin_size(0), 0.0);
    }

    #[test]
    fn test_average_of_matching_bins() {
        // 441 bins -> 50 Hz per bin, bins 2..=4 sit at 100, 150, 200 Hz.
        let mut spectrum = vec![0.0; 441];
        spectrum[2] = 30.0;
        spectrum[3] = 60.0;
        spectrum[4] = 90.0;
        let values = aggregate(&spectrum, &[band(100.0, 200.0, 1.0)]);
        assert_abs_diff_eq!(values[0], 60.0, epsilon = 1e-4);
    }

    #[test]
    fn test_inclusive_edges_and_gain() {
        let mut spectrum = vec![0.0; 441];
        spectrum[2] = 10.0;
        spectrum[4] = 10.0;
        let values = aggregate(&spectrum, &[band(100.0, 200.0, 2.5)]);
        assert_abs_diff_eq!(values[0], 2.5 * 20.0 / 3.0, epsilon = 1e-4);
    }

    #[test]
    fn test_band_narrower_than_a_bin_is_zero() {
        let spectrum = vec![200.0; 441];
        let values = aggregate(&spectrum, &[band(101.0, 120.0, 1.0)]);
        assert_eq!(values, vec![0.0]);
        assert!(!values[0].is_nan());
    }

    #[test]
    fn test_empty_spectrum_yields_zeros() {
        let bands = derive_bands(4, &DEFAULT_PALETTE);
        assert_eq!(aggregate(&[], &bands), vec![0.0; 4]);
    }

    #[test]
    fn test_output_matches_band_count_and_is_non_negative() {
        let spectrum: vec::Vec<f32> = (0..1024).map(|i| (i % 256) as f32).collect();
        for count in 1..=8 {
            let bands = derive_bands(count, &DEFAULT_PALETTE);
            let values = aggregate(&spectrum, &bands);
            assert_eq!(values.len(), count);
            assert!(values.iter().all(|&v| v >= 0.0));
            assert_eq!(values, aggregate(&spectrum, &bands), "deterministic");
        }
    }
}
