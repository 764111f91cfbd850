use alloc::{collections::VecDeque, vec, vec::Vec};

use crate::types::Sample;

/// Whether the smoothing window has ramped up yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmootherState {
    /// Fewer than `k` samples buffered; input passes through unchanged.
    Filling,
    /// Exactly `k` samples buffered; output is the per-band moving average.
    Full,
}

/// Moving average over the most recent `k` raw samples.
///
/// The window size is passed on every push rather than stored, so the
/// configured value can change between ticks. Changing it only affects
/// future capacity and the Filling/Full threshold; samples already emitted
/// are never revisited.
pub struct TemporalSmoother {
    /// The most recent raw samples, oldest first.
    window: VecDeque<Sample>,
    /// Window size used by the most recent push.
    frames: usize,
}

impl TemporalSmoother {
    pub fn new() -> Self {
        Self {
            window: VecDeque::new(),
            frames: 1,
        }
    }

    /// Appends `sample` and returns the value to record for this tick.
    ///
    /// In [`SmootherState::Filling`] the sample itself is returned (no partial
    /// averages while ramping up). Once the window holds `frames` samples each
    /// band of the result is the arithmetic mean of that band across the
    /// window, stamped with the newest sample's time.
    ///
    /// A sample with a different band count than the buffered ones restarts
    /// the window, so averages never mix band layouts.
    pub fn push(&mut self, sample: Sample, frames: usize) -> Sample {
        self.frames = frames.max(1);

        if self
            .newest()
            .is_some_and(|newest| newest.bands.len() != sample.bands.len())
        {
            self.window.clear();
        }
        self.window.push_back(sample);
        while self.window.len() > self.frames {
            self.window.pop_front();
        }

        match self.state() {
            SmootherState::Filling => self
                .newest()
                .cloned()
                .unwrap_or_else(|| Sample::new(0.0, Vec::new())),
            SmootherState::Full => self.window_average(),
        }
    }

    /// Empties the window; called at the start of every take.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn state(&self) -> SmootherState {
        if self.window.len() < self.frames {
            SmootherState::Filling
        } else {
            SmootherState::Full
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    fn newest(&self) -> Option<&Sample> {
        self.window.back()
    }

    fn window_average(&self) -> Sample {
        let newest = match self.newest() {
            Some(sample) => sample,
            None => return Sample::new(0.0, Vec::new()),
        };
        let num_bands = newest.bands.len();
        let mut sums = vec![0.0f32; num_bands];

        for sample in self.window.iter() {
            for (sum, value) in sums.iter_mut().zip(sample.bands.iter()) {
                *sum += *value;
            }
        }

        let frames = self.window.len() as f32;
        newest.with_bands(sums.into_iter().map(|sum| sum / frames).collect())
    }
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample(time: f32, value: f32) -> Sample {
        Sample::new(time, vec![value, value * 2.0])
    }

    #[test]
    fn test_ramp_with_three_frames() {
        let mut smoother = TemporalSmoother::new();
        let outputs: Vec<f32> = [10.0, 20.0, 30.0, 40.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| smoother.push(sample(i as f32, v), 3).bands[0])
            .collect();

        assert_eq!(outputs[0], 10.0, "Filling: raw value");
        assert_eq!(outputs[1], 20.0, "Filling: raw value");
        assert_abs_diff_eq!(outputs[2], (10.0 + 20.0 + 30.0) / 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(outputs[3], (20.0 + 30.0 + 40.0) / 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_state_transitions() {
        let mut smoother = TemporalSmoother::new();
        smoother.push(sample(0.0, 1.0), 3);
        assert_eq!(smoother.state(), SmootherState::Filling, "After 1 push");
        smoother.push(sample(0.1, 1.0), 3);
        assert_eq!(smoother.state(), SmootherState::Filling, "After 2 pushes");
        smoother.push(sample(0.2, 1.0), 3);
        assert_eq!(smoother.state(), SmootherState::Full, "Full once the window reaches k");
        smoother.push(sample(0.3, 1.0), 3);
        assert_eq!(smoother.state(), SmootherState::Full, "Stays Full");
        assert_eq!(smoother.len(), 3, "Window never exceeds k");

        smoother.reset();
        assert!(smoother.is_empty());
        assert_eq!(smoother.state(), SmootherState::Filling, "Reset returns to Filling");
    }

    #[test]
    fn test_full_output_keeps_newest_time_and_every_band() {
        let mut smoother = TemporalSmoother::new();
        smoother.push(sample(0.0, 10.0), 2);
        let out = smoother.push(sample(0.5, 20.0), 2);
        assert_eq!(out.time, 0.5);
        assert_eq!(out.bands, vec![15.0, 30.0]);
    }

    #[test]
    fn test_growing_window_refills() {
        let mut smoother = TemporalSmoother::new();
        smoother.push(sample(0.0, 10.0), 2);
        smoother.push(sample(0.1, 20.0), 2);
        assert_eq!(smoother.state(), SmootherState::Full);

        // Raising k puts the smoother back into Filling until enough samples arrive.
        let out = smoother.push(sample(0.2, 30.0), 4);
        assert_eq!(smoother.state(), SmootherState::Filling);
        assert_eq!(out.bands[0], 30.0);

        let out = smoother.push(sample(0.3, 40.0), 4);
        assert_eq!(smoother.state(), SmootherState::Full);
        assert_abs_diff_eq!(out.bands[0], 25.0, epsilon = 1e-5);
    }

    #[test]
    fn test_shrinking_window_evicts_oldest() {
        let mut smoother = TemporalSmoother::new();
        for (i, v) in [10.0, 20.0, 30.0, 40.0].iter().enumerate() {
            smoother.push(sample(i as f32, *v), 4);
        }
        let out = smoother.push(sample(4.0, 50.0), 2);
        assert_eq!(smoother.len(), 2);
        assert_abs_diff_eq!(out.bands[0], 45.0, epsilon = 1e-5);
    }

    #[test]
    fn test_band_count_change_restarts_window() {
        let mut smoother = TemporalSmoother::new();
        smoother.push(Sample::new(0.0, vec![90.0; 3]), 3);
        smoother.push(Sample::new(0.1, vec![90.0; 3]), 3);

        let out = smoother.push(Sample::new(0.2, vec![90.0; 5]), 3);
        assert_eq!(smoother.len(), 1, "Old layout dropped");
        assert_eq!(smoother.state(), SmootherState::Filling);
        assert_eq!(out.bands, vec![90.0; 5]);

        smoother.push(Sample::new(0.3, vec![90.0; 5]), 3);
        let out = smoother.push(Sample::new(0.4, vec![60.0; 5]), 3);
        assert_eq!(smoother.state(), SmootherState::Full);
        for value in out.bands {
            assert_abs_diff_eq!(value, 80.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_single_frame_window_is_identity() {
        let mut smoother = TemporalSmoother::new();
        for (i, v) in [3.0, 9.0, 1.0].iter().enumerate() {
            let input = sample(i as f32, *v);
            assert_eq!(smoother.push(input.clone(), 1), input);
        }
        assert_eq!(smoother.push(sample(4.0, 7.0), 0).bands[0], 7.0, "k = 0 acts as 1");
    }
}
