use alloc::vec::Vec;

use crate::types::Sample;

/// Append-only record of one take.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Everything recorded so far, oldest first.
    pub fn snapshot(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last_time(&self) -> Option<f32> {
        self.samples.last().map(|sample| sample.time)
    }

    /// Logical timestamp of the next sample at `sampling_rate_hz`.
    pub fn next_time(&self, sampling_rate_hz: u32) -> f32 {
        self.samples.len() as f32 / sampling_rate_hz.max(1) as f32
    }
}
