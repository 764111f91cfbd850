use alloc::vec::Vec;

use log::{info, trace};

use crate::config::{DEFAULT_FRAME_RATE, END_OF_TRACK_TOLERANCE_S, MIN_SAMPLING_RATE_HZ};
use crate::pipeline::{PipelineConfig, SamplingPipeline};
use crate::types::Sample;

/// Produces one magnitude spectrum of whatever is currently playing.
pub trait SpectrumSource {
    /// `None` when nothing is loaded; the tick is then skipped.
    fn analyze(&mut self) -> Option<Vec<f32>>;
}

/// Playback position of the track being recorded.
pub trait Transport {
    fn is_playing(&self) -> bool;
    /// Seconds since the start of the track.
    fn current_time(&self) -> f32;
    /// Track length in seconds.
    fn duration(&self) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    /// The take ended, either stopped or run to the end of the track.
    Finished,
}

/// Drives a [`SamplingPipeline`] from a fixed-rate frame loop.
///
/// Every frame calls [`Recorder::tick`]. While recording and playing, a frame
/// counter advances; once it reaches `frame_rate / sampling_rate` the source
/// is analyzed, the pipeline runs and the counter starts over.
pub struct Recorder {
    pipeline: SamplingPipeline,
    state: RecorderState,
    frame_rate: u32,
    frame_counter: u32,
}

impl Recorder {
    pub fn new(frame_rate: u32) -> Self {
        Self {
            pipeline: SamplingPipeline::new(),
            state: RecorderState::Idle,
            frame_rate: frame_rate.max(1),
            frame_counter: 0,
        }
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Discards the previous take and starts recording a new one.
    pub fn start_take(&mut self, config: &PipelineConfig) {
        self.pipeline.begin_take(config.sampling_rate_hz);
        self.frame_counter = 0;
        self.state = RecorderState::Recording;
        info!(
            "Recording started: {} bands, {} Hz, smoothing {}",
            config.bands.len(),
            self.pipeline.sampling_rate_hz(),
            config.smoothing_frames
        );
    }

    /// Stops recording; everything recorded so far is kept.
    pub fn stop(&mut self) {
        if self.state == RecorderState::Recording {
            self.state = RecorderState::Finished;
            info!("Recording stopped after {} samples", self.pipeline.series().len());
        }
    }

    /// Advances one frame. Returns the sample recorded on this frame, if any.
    pub fn tick<T, S>(
        &mut self,
        config: &PipelineConfig,
        transport: &T,
        source: &mut S,
    ) -> Option<Sample>
    where
        T: Transport + ?Sized,
        S: SpectrumSource + ?Sized,
    {
        let mut recorded = None;

        if self.is_recording() && transport.is_playing() {
            self.frame_counter += 1;
            if self.frame_counter as f32 >= self.frames_per_sample(config) {
                match source.analyze() {
                    Some(spectrum) => {
                        recorded = Some(self.pipeline.process_tick(config, &spectrum));
                        self.frame_counter = 0;
                    }
                    None => trace!("No spectrum available, skipping tick"),
                }
            }
        }

        if self.is_recording()
            && !transport.is_playing()
            && transport.current_time() >= transport.duration() - END_OF_TRACK_TOLERANCE_S
        {
            self.state = RecorderState::Finished;
            info!(
                "Recording completed: {} samples over {:.1}s",
                self.pipeline.series().len(),
                transport.duration()
            );
        }

        recorded
    }

    pub fn snapshot(&self) -> &[Sample] {
        self.pipeline.snapshot()
    }

    pub fn pipeline(&self) -> &SamplingPipeline {
        &self.pipeline
    }

    fn frames_per_sample(&self, config: &PipelineConfig) -> f32 {
        self.frame_rate as f32 / config.sampling_rate_hz.max(MIN_SAMPLING_RATE_HZ) as f32
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_RATE)
    }
}
