#![no_std]

//! Spectrum source for the plotter: PCM frames in, byte-scaled magnitude
//! spectra out.

use microdsp::common::{apply_window_function, real_fft, WindowFunctionType::Hann};
use microfft::Complex32;
use micromath::F32Ext;
use thiserror::Error;

/// Number of PCM samples consumed per analysis frame.
pub const FFT_SIZE: usize = 1024;
/// Number of magnitude bins produced per frame.
pub const NUM_BINS: usize = FFT_SIZE / 2;

pub const DEFAULT_SMOOTHING: f32 = 0.8;
pub const DEFAULT_MIN_DECIBELS: f32 = -100.0;
pub const DEFAULT_MAX_DECIBELS: f32 = -30.0;

const BYTE_MAX: f32 = 255.0;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DspError {
    #[error("input must contain exactly {expected} samples, got {actual}")]
    FrameLength { expected: usize, actual: usize },
    #[error("FFT output must contain exactly {expected} complex numbers, got {actual}")]
    SpectrumLength { expected: usize, actual: usize },
}

/// Normalize a single sample from i16 to f32.
pub fn normalize_sample(sample: i16) -> f32 {
    sample as f32 / i16::MAX as f32
}

/// Normalize a slice of i16 samples to a slice of f32 samples.
pub fn normalize_samples(samples: &[i16], normalized_samples: &mut [f32]) {
    for (out, &sample) in normalized_samples.iter_mut().zip(samples) {
        *out = normalize_sample(sample);
    }
}

/// Apply a Hann window to a slice of f32 samples.
pub fn apply_hann_window(samples: &mut [f32]) {
    apply_window_function(Hann, samples);
}

/// Compute the FFT of a slice of f32 samples.
pub fn compute_fft(samples: &mut [f32; FFT_SIZE]) -> &mut [Complex32] {
    real_fft(samples)
}

/// Compute the magnitude of the FFT output.
///
/// The real FFT packs the Nyquist coefficient into the imaginary part of bin 0,
/// so the DC magnitude is taken from the real part alone.
pub fn compute_magnitude(fft_output: &[Complex32]) -> Result<[f32; NUM_BINS], DspError> {
    if fft_output.len() != NUM_BINS {
        return Err(DspError::SpectrumLength {
            expected: NUM_BINS,
            actual: fft_output.len(),
        });
    }
    let mut magnitude = [0.0; NUM_BINS];
    magnitude[0] = fft_output[0].re.abs();
    for i in 1..NUM_BINS {
        let component = fft_output[i];
        magnitude[i] = (component.re * component.re + component.im * component.im).sqrt();
    }
    Ok(magnitude)
}

/// Process a frame of i16 samples and return the magnitude spectrum.
pub fn process_frame(samples: &[i16]) -> Result<[f32; NUM_BINS], DspError> {
    if samples.len() != FFT_SIZE {
        return Err(DspError::FrameLength {
            expected: FFT_SIZE,
            actual: samples.len(),
        });
    }

    let mut normalized_samples = [0.0; FFT_SIZE];
    normalize_samples(samples, &mut normalized_samples);
    process_frame_f32(&normalized_samples)
}

/// Process a frame of f32 samples in [-1, 1] and return the magnitude spectrum.
pub fn process_frame_f32(samples: &[f32]) -> Result<[f32; NUM_BINS], DspError> {
    if samples.len() != FFT_SIZE {
        return Err(DspError::FrameLength {
            expected: FFT_SIZE,
            actual: samples.len(),
        });
    }

    // Step 1: Copy into the fixed FFT buffer
    let mut buffer = [0.0; FFT_SIZE];
    buffer.copy_from_slice(samples);

    // Step 2: Apply Hann window
    apply_hann_window(&mut buffer);

    // Step 3: Compute FFT
    let fft_output = compute_fft(&mut buffer);

    // Step 4: Compute magnitude spectrum
    compute_magnitude(fft_output)
}

/// Turns PCM frames into byte-scaled spectra.
///
/// Magnitudes are scaled by `1 / FFT_SIZE`, smoothed against the previous
/// frame with an exponential time constant, converted to decibels and mapped
/// linearly from `[min_decibels, max_decibels]` onto `[0, 255]`. Every output
/// value is a whole number in that range.
pub struct ByteSpectrumAnalyzer {
    smoothing: f32,
    min_decibels: f32,
    max_decibels: f32,
    smoothed: [f32; NUM_BINS],
}

impl ByteSpectrumAnalyzer {
    pub const fn new() -> Self {
        Self {
            smoothing: DEFAULT_SMOOTHING,
            min_decibels: DEFAULT_MIN_DECIBELS,
            max_decibels: DEFAULT_MAX_DECIBELS,
            smoothed: [0.0; NUM_BINS],
        }
    }

    /// Time constant in `[0, 1)`. Zero disables smoothing.
    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing.clamp(0.0, 0.99);
        self
    }

    /// Decibel window mapped onto the byte range. Ignored unless `min < max`.
    pub fn with_decibel_range(mut self, min_decibels: f32, max_decibels: f32) -> Self {
        if min_decibels < max_decibels {
            self.min_decibels = min_decibels;
            self.max_decibels = max_decibels;
        }
        self
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Forget the smoothing history, e.g. when a new track is loaded.
    pub fn reset(&mut self) {
        self.smoothed = [0.0; NUM_BINS];
    }

    /// Analyze one frame of f32 samples.
    pub fn analyze(&mut self, frame: &[f32]) -> Result<[f32; NUM_BINS], DspError> {
        let magnitude = process_frame_f32(frame)?;
        Ok(self.to_bytes(&magnitude))
    }

    /// Analyze one frame of i16 samples.
    pub fn analyze_pcm16(&mut self, frame: &[i16]) -> Result<[f32; NUM_BINS], DspError> {
        let magnitude = process_frame(frame)?;
        Ok(self.to_bytes(&magnitude))
    }

    fn to_bytes(&mut self, magnitude: &[f32; NUM_BINS]) -> [f32; NUM_BINS] {
        let scale = 1.0 / FFT_SIZE as f32;
        let range = self.max_decibels - self.min_decibels;
        let mut bytes = [0.0; NUM_BINS];

        for i in 0..NUM_BINS {
            let current = magnitude[i] * scale;
            let smoothed = self.smoothing * self.smoothed[i] + (1.0 - self.smoothing) * current;
            self.smoothed[i] = smoothed;

            let decibels = if smoothed > 0.0 {
                20.0 * smoothed.log10()
            } else {
                self.min_decibels
            };
            bytes[i] = (BYTE_MAX * (decibels - self.min_decibels) / range)
                .clamp(0.0, BYTE_MAX)
                .floor();
        }
        bytes
    }
}

impl Default for ByteSpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
