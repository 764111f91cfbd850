use log::{debug, info};

use crate::band_aggregator::aggregate;
use crate::band_config::BandConfig;
use crate::config::*;
use crate::normalizer::normalize;
use crate::shaper::shape;
use crate::smoother::TemporalSmoother;
use crate::time_series::TimeSeries;
use crate::types::Sample;

/// Every tunable of the sampling pipeline, passed by reference into each tick.
///
/// Setters clamp into the supported ranges; nothing is ever rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub bands: BandConfig,
    pub sampling_rate_hz: u32,
    pub smoothing_frames: usize,
    pub normalization: bool,
    pub log_scaling: bool,
    pub log_intensity: f32,
    pub log_multiplier: f32,
}

impl PipelineConfig {
    pub fn new(bands: BandConfig) -> Self {
        Self {
            bands,
            ..Self::default()
        }
    }

    pub fn with_sampling_rate(mut self, sampling_rate_hz: u32) -> Self {
        self.sampling_rate_hz = sampling_rate_hz.clamp(MIN_SAMPLING_RATE_HZ, MAX_SAMPLING_RATE_HZ);
        self
    }

    pub fn with_smoothing_frames(mut self, frames: usize) -> Self {
        self.smoothing_frames = frames.clamp(MIN_SMOOTHING_FRAMES, MAX_SMOOTHING_FRAMES);
        self
    }

    pub fn with_normalization(mut self, enabled: bool) -> Self {
        self.normalization = enabled;
        self
    }

    pub fn with_log_scaling(mut self, enabled: bool) -> Self {
        self.log_scaling = enabled;
        self
    }

    pub fn with_log_intensity(mut self, intensity: f32) -> Self {
        self.log_intensity = intensity.clamp(MIN_LOG_INTENSITY, MAX_LOG_INTENSITY);
        self
    }

    pub fn with_log_multiplier(mut self, multiplier: f32) -> Self {
        self.log_multiplier = multiplier.clamp(MIN_LOG_MULTIPLIER, MAX_LOG_MULTIPLIER);
        self
    }

    /// Copy with every numeric field forced back into range.
    ///
    /// Fields are public so a UI can poke them directly; this is the value a
    /// tick should actually see.
    pub fn sanitized(&self) -> Self {
        self.clone()
            .with_sampling_rate(self.sampling_rate_hz)
            .with_smoothing_frames(self.smoothing_frames)
            .with_log_intensity(self.log_intensity)
            .with_log_multiplier(self.log_multiplier)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bands: BandConfig::default(),
            sampling_rate_hz: DEFAULT_SAMPLING_RATE_HZ,
            smoothing_frames: DEFAULT_SMOOTHING_FRAMES,
            normalization: true,
            log_scaling: true,
            log_intensity: DEFAULT_LOG_INTENSITY,
            log_multiplier: DEFAULT_LOG_MULTIPLIER,
        }
    }
}

/// Turns raw spectra into the recorded time series of one take.
///
/// Owns the store and the smoothing window; [`SamplingPipeline::process_tick`]
/// is the only way either of them changes during a take.
pub struct SamplingPipeline {
    series: TimeSeries,
    smoother: TemporalSmoother,
    sampling_rate_hz: u32,
}

impl SamplingPipeline {
    pub fn new() -> Self {
        Self {
            series: TimeSeries::new(),
            smoother: TemporalSmoother::new(),
            sampling_rate_hz: DEFAULT_SAMPLING_RATE_HZ,
        }
    }

    /// Starts a fresh take: clears the store, empties the smoothing window and
    /// fixes the rate used for timestamps until the next take.
    pub fn begin_take(&mut self, sampling_rate_hz: u32) {
        self.series.clear();
        self.smoother.reset();
        self.sampling_rate_hz = sampling_rate_hz.clamp(MIN_SAMPLING_RATE_HZ, MAX_SAMPLING_RATE_HZ);
        info!("New take at {} Hz", self.sampling_rate_hz);
    }

    /// Runs one accepted tick and appends the result.
    ///
    /// Stages run in order: aggregate, smooth (window > 1), normalize
    /// (if enabled), shape (if enabled). Returns the sample that was stored.
    pub fn process_tick(&mut self, config: &PipelineConfig, spectrum: &[f32]) -> Sample {
        let bands = config.bands.bands();
        let time = self.series.next_time(self.sampling_rate_hz);

        let mut sample = Sample::new(time, aggregate(spectrum, bands));

        if config.smoothing_frames > 1 {
            sample = self.smoother.push(sample, config.smoothing_frames);
        }
        if config.normalization {
            sample = normalize(&sample, bands);
        }
        if config.log_scaling {
            sample = shape(&sample, bands, config.log_intensity, config.log_multiplier);
        }

        debug!("t={:.2}s bands={:?}", sample.time, sample.bands);
        self.series.append(sample.clone());
        sample
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn snapshot(&self) -> &[Sample] {
        self.series.snapshot()
    }

    pub fn sampling_rate_hz(&self) -> u32 {
        self.sampling_rate_hz
    }
}

impl Default for SamplingPipeline {
    fn default() -> Self {
        Self::new()
    }
}
