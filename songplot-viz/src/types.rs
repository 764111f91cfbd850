use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb888;

/// A contiguous frequency range with its own gain and trace color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f32,     // Lower edge in Hz
    pub max: f32,     // Upper edge in Hz
    pub gain: f32,    // Multiplier applied to the aggregated amplitude
    pub color: Rgb888,
}

impl Band {
    pub const fn new(min: f32, max: f32, gain: f32, color: Rgb888) -> Self {
        Self {
            min,
            max,
            gain,
            color,
        }
    }

    pub fn center_frequency(&self) -> f32 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, frequency: f32) -> bool {
        frequency >= self.min && frequency <= self.max
    }
}

/// One timestamped vector of per-band amplitudes, nominally in `[0, 255]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: f32,
    pub bands: Vec<f32>,
}

impl Sample {
    pub fn new(time: f32, bands: Vec<f32>) -> Self {
        Self { time, bands }
    }

    /// Same timestamp, new band values.
    pub fn with_bands(&self, bands: Vec<f32>) -> Self {
        Self {
            time: self.time,
            bands,
        }
    }

    pub fn is_flat(&self) -> bool {
        let mut values = self.bands.iter().copied();
        match values.next() {
            Some(first) => values.all(|v| v == first),
            None => true,
        }
    }
}
