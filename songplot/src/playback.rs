use log::warn;
use songplot_dsp::{ByteSpectrumAnalyzer, FFT_SIZE};
use songplot_viz::{SpectrumSource, Transport};

use crate::audio::MonoTrack;

/// Steps through a decoded track one display frame at a time, the way a
/// player would advance while the frame loop runs.
pub struct Playback {
    track: MonoTrack,
    samples_per_frame: f64,
    position: f64,
    analyzer: ByteSpectrumAnalyzer,
    frame: [f32; FFT_SIZE],
}

/// Transport state captured for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Playhead {
    playing: bool,
    time: f32,
    duration: f32,
}

impl Transport for Playhead {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn current_time(&self) -> f32 {
        self.time
    }

    fn duration(&self) -> f32 {
        self.duration
    }
}

impl Playback {
    pub fn new(track: MonoTrack, frame_rate: u32) -> Self {
        let samples_per_frame = track.sample_rate as f64 / frame_rate.max(1) as f64;
        Self {
            track,
            samples_per_frame,
            position: 0.0,
            analyzer: ByteSpectrumAnalyzer::new(),
            frame: [0.0; FFT_SIZE],
        }
    }

    pub fn total_frames(&self) -> u64 {
        (self.track.samples.len() as f64 / self.samples_per_frame).ceil() as u64
    }

    pub fn playhead(&self) -> Playhead {
        let position = self.position_index();
        Playhead {
            playing: position < self.track.samples.len(),
            time: position as f32 / self.track.sample_rate as f32,
            duration: self.track.duration(),
        }
    }

    /// Moves one display frame forward, stopping at the end of the track.
    pub fn advance(&mut self) {
        let end = self.track.samples.len() as f64;
        self.position = (self.position + self.samples_per_frame).min(end);
    }

    fn position_index(&self) -> usize {
        self.position as usize
    }
}

impl SpectrumSource for Playback {
    /// Analyzes the `FFT_SIZE` samples leading up to the playhead, zero
    /// padded at the start of the track.
    fn analyze(&mut self) -> Option<Vec<f32>> {
        let end = self.position_index().min(self.track.samples.len());
        let start = end.saturating_sub(FFT_SIZE);
        let available = &self.track.samples[start..end];

        self.frame.fill(0.0);
        self.frame[FFT_SIZE - available.len()..].copy_from_slice(available);

        match self.analyzer.analyze(&self.frame) {
            Ok(spectrum) => Some(spectrum.to_vec()),
            Err(e) => {
                warn!("Spectrum analysis failed: {}", e);
                None
            }
        }
    }
}
