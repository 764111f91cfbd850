use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb888;
use libm::{log10f, powf, roundf};
use log::warn;

use crate::config::*;
use crate::palette::DEFAULT_PALETTE;
use crate::types::Band;

pub fn is_valid_band_count(value: usize) -> bool {
    (MIN_BANDS..=MAX_BANDS).contains(&value)
}

/// Partitions `[log10(20), log10(20000)]` into `count` equal segments.
///
/// Edges are rounded to whole Hz, gains start at 1.0 and colors are taken
/// from `palette` cyclically. `count` is clamped to `[1, 8]`; an empty
/// palette falls back to [`DEFAULT_PALETTE`].
pub fn derive_bands(count: usize, palette: &[Rgb888]) -> Vec<Band> {
    let count = count.clamp(MIN_BANDS, MAX_BANDS);
    let palette = if palette.is_empty() {
        &DEFAULT_PALETTE[..]
    } else {
        palette
    };

    let log_min = log10f(MIN_FREQUENCY_HZ);
    let log_max = log10f(MAX_FREQUENCY_HZ);
    let mut bands = Vec::with_capacity(count);

    for i in 0..count {
        let start_fraction = i as f32 / count as f32;
        let end_fraction = (i + 1) as f32 / count as f32;

        let log_start = log_min + start_fraction * (log_max - log_min);
        let log_end = log_min + end_fraction * (log_max - log_min);

        bands.push(Band::new(
            roundf(powf(10.0, log_start)),
            roundf(powf(10.0, log_end)),
            1.0,
            palette[i % palette.len()],
        ));
    }
    bands
}

/// Applies the edit clamps against the neighbouring bands.
///
/// Returns `None` when the neighbours leave no room for a valid range.
fn clamp_range(
    new_min: f32,
    new_max: f32,
    prev: Option<&Band>,
    next: Option<&Band>,
) -> Option<(f32, f32)> {
    let mut min = new_min.clamp(MIN_BAND_START_HZ, MAX_BAND_START_HZ);
    let mut max = new_max.clamp(MIN_BAND_END_HZ, MAX_BAND_END_HZ);

    if min >= max {
        min = max - BAND_GAP_HZ;
    }
    if let Some(prev) = prev {
        if min <= prev.max {
            min = prev.max + BAND_GAP_HZ;
        }
    }
    if let Some(next) = next {
        if max >= next.min {
            max = next.min - BAND_GAP_HZ;
        }
    }

    if min < max {
        Some((min, max))
    } else {
        None
    }
}

/// The ordered, non-overlapping band list plus the palette it draws colors from.
#[derive(Debug, Clone, PartialEq)]
pub struct BandConfig {
    bands: Vec<Band>,
    palette: Vec<Rgb888>,
}

impl BandConfig {
    pub fn with_count(count: usize) -> Self {
        Self::with_palette(count, &DEFAULT_PALETTE)
    }

    pub fn with_palette(count: usize, palette: &[Rgb888]) -> Self {
        let palette = if palette.is_empty() {
            DEFAULT_PALETTE.to_vec()
        } else {
            palette.to_vec()
        };
        Self {
            bands: derive_bands(count, &palette),
            palette,
        }
    }

    /// Builds bands from explicit `(min, max, gain)` ranges.
    ///
    /// Each range is clamped against the one before it. Ranges that cannot be
    /// made valid are dropped, anything past the eighth is ignored, and an
    /// empty result falls back to the derived default set.
    pub fn from_ranges(ranges: &[(f32, f32, f32)], palette: &[Rgb888]) -> Self {
        let mut config = Self::with_palette(DEFAULT_BANDS, palette);
        let mut bands: Vec<Band> = Vec::with_capacity(ranges.len().min(MAX_BANDS));

        for &(min, max, gain) in ranges.iter().take(MAX_BANDS) {
            match clamp_range(min, max, bands.last(), None) {
                Some((min, max)) => {
                    let color = config.palette[bands.len() % config.palette.len()];
                    bands.push(Band::new(min, max, gain.clamp(MIN_GAIN, MAX_GAIN), color));
                }
                None => warn!("Dropping band range {}-{}Hz: no room after clamping", min, max),
            }
        }

        if !bands.is_empty() {
            config.bands = bands;
        }
        config
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn palette(&self) -> &[Rgb888] {
        &self.palette
    }

    pub fn center_frequency(&self, index: usize) -> Option<f32> {
        self.bands.get(index).map(Band::center_frequency)
    }

    /// Regenerates the whole set; individual bands are never removed.
    pub fn set_count(&mut self, count: usize) {
        if !is_valid_band_count(count) {
            warn!("Band count {} clamped to [{}, {}]", count, MIN_BANDS, MAX_BANDS);
        }
        self.bands = derive_bands(count, &self.palette);
    }

    /// Edits one band, clamping instead of rejecting.
    ///
    /// `new_min` is pushed above the previous band's max and `new_max` below
    /// the next band's min. If that leaves no valid range the band keeps its
    /// old edges. The returned band carries the values actually stored, so a
    /// control surface can mirror them. `None` only for an unknown index.
    pub fn edit_band(
        &mut self,
        index: usize,
        new_min: f32,
        new_max: f32,
        new_gain: f32,
    ) -> Option<Band> {
        let current = *self.bands.get(index)?;
        let prev = index.checked_sub(1).and_then(|i| self.bands.get(i));
        let next = self.bands.get(index + 1);

        let (min, max) = match clamp_range(new_min, new_max, prev, next) {
            Some(range) => range,
            None => {
                warn!(
                    "Band {} edit {}-{}Hz leaves no room between neighbours; keeping {}-{}Hz",
                    index, new_min, new_max, current.min, current.max
                );
                (current.min, current.max)
            }
        };

        let updated = Band::new(min, max, new_gain.clamp(MIN_GAIN, MAX_GAIN), current.color);
        self.bands[index] = updated;
        Some(updated)
    }
}

impl Default for BandConfig {
    fn default() -> Self {
        Self::with_count(DEFAULT_BANDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_derive_three_bands() {
        let bands = derive_bands(3, &DEFAULT_PALETTE);
        assert_eq!(bands.len(), 3);
        assert_eq!((bands[0].min, bands[0].max), (20.0, 200.0));
        assert_eq!((bands[1].min, bands[1].max), (200.0, 2000.0));
        assert_eq!((bands[2].min, bands[2].max), (2000.0, 20000.0));
        assert!(bands.iter().all(|b| b.gain == 1.0));
        assert_eq!(bands[2].color, DEFAULT_PALETTE[2]);
    }

    #[test]
    fn test_derive_bands_cover_range_log_spaced() {
        for count in 1..=8 {
            let bands = derive_bands(count, &DEFAULT_PALETTE);
            assert_eq!(bands.len(), count);
            assert_eq!(bands[0].min, 20.0, "count {}", count);
            assert_eq!(bands[count - 1].max, 20000.0, "count {}", count);

            let expected_width = 3.0 / count as f32;
            for (i, band) in bands.iter().enumerate() {
                assert!(band.min < band.max, "band {} of {}", i, count);
                assert_abs_diff_eq!(
                    log10f(band.max) - log10f(band.min),
                    expected_width,
                    epsilon = 0.02
                );
                if let Some(next) = bands.get(i + 1) {
                    assert!(band.max <= next.min);
                    assert!(next.min > band.min);
                }
            }
        }
    }

    #[test]
    fn test_derive_bands_clamps_count() {
        assert_eq!(derive_bands(0, &DEFAULT_PALETTE).len(), 1);
        assert_eq!(derive_bands(12, &DEFAULT_PALETTE).len(), 8);
    }

    #[test]
    fn test_palette_is_cyclic() {
        let palette = [Rgb888::new(1, 1, 1), Rgb888::new(2, 2, 2)];
        let bands = derive_bands(5, &palette);
        assert_eq!(bands[0].color, palette[0]);
        assert_eq!(bands[1].color, palette[1]);
        assert_eq!(bands[4].color, palette[0]);
        assert_eq!(derive_bands(2, &[])[1].color, DEFAULT_PALETTE[1]);
    }

    #[test]
    fn test_edit_band_min_not_below_max() {
        let mut config = BandConfig::with_count(3);
        let band = config.edit_band(1, 900.0, 800.0, 1.0).unwrap();
        assert_eq!((band.min, band.max), (799.0, 800.0));
    }

    #[test]
    fn test_edit_band_respects_neighbours() {
        let mut config = BandConfig::with_count(3);
        let band = config.edit_band(1, 50.0, 5000.0, 2.0).unwrap();
        assert_eq!(band.min, 201.0, "pushed above previous max");
        assert_eq!(band.max, 1999.0, "pulled below next min");
        assert_eq!(band.gain, 2.0);
        assert_eq!(config.bands()[1], band);
        assert_eq!(config.bands()[0].max, 200.0, "neighbours untouched");
    }

    #[test]
    fn test_edit_band_clamps_gain_and_limits() {
        let mut config = BandConfig::with_count(1);
        let band = config.edit_band(0, 1.0, 90_000.0, 50.0).unwrap();
        assert_eq!((band.min, band.max, band.gain), (20.0, 20000.0, MAX_GAIN));
        let band = config.edit_band(0, 100.0, 200.0, 0.0).unwrap();
        assert_eq!(band.gain, MIN_GAIN);
    }

    #[test]
    fn test_edit_band_without_room_keeps_previous_range() {
        let mut config = BandConfig::from_ranges(
            &[(20.0, 100.0, 1.0), (101.0, 101.5, 1.0), (102.0, 500.0, 1.0)],
            &DEFAULT_PALETTE,
        );
        let before = config.bands()[1];
        let after = config.edit_band(1, 10.0, 10_000.0, 3.0).unwrap();
        assert_eq!((after.min, after.max), (before.min, before.max));
        assert_eq!(after.gain, 3.0);
    }

    #[test]
    fn test_edit_band_unknown_index() {
        let mut config = BandConfig::with_count(2);
        assert!(config.edit_band(2, 100.0, 200.0, 1.0).is_none());
    }

    #[test]
    fn test_from_ranges_clamps_overlap() {
        let config = BandConfig::from_ranges(
            &[(20.0, 250.0, 1.0), (250.0, 4000.0, 1.0), (4000.0, 10000.0, 1.0)],
            &DEFAULT_PALETTE,
        );
        let edges: vec::Vec<(f32, f32)> = config.bands().iter().map(|b| (b.min, b.max)).collect();
        assert_eq!(
            edges,
            vec![(20.0, 250.0), (251.0, 4000.0), (4001.0, 10000.0)]
        );
    }

    #[test]
    fn test_from_ranges_empty_falls_back_to_default() {
        let config = BandConfig::from_ranges(&[], &DEFAULT_PALETTE);
        assert_eq!(config, BandConfig::default());
    }

    #[test]
    fn test_set_count_regenerates() {
        let mut config = BandConfig::with_count(3);
        config.edit_band(0, 30.0, 150.0, 4.0);
        config.set_count(5);
        assert_eq!(config.len(), 5);
        assert!(config.bands().iter().all(|b| b.gain == 1.0));
        assert_eq!(config.bands()[0].min, 20.0);
    }
}
