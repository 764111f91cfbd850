use wavegen::{sine, wf};

pub const SAMPLE_RATE: f32 = 44_100.0;

/// Frequency that lands exactly on the centre of `bin` for a 1024-point FFT.
pub fn bin_center_frequency(bin: usize) -> f32 {
    bin as f32 * SAMPLE_RATE / songplot_dsp::FFT_SIZE as f32
}

pub fn sine_samples_f32(frequency: f32, len: usize) -> Vec<f32> {
    let waveform = wf!(f32, SAMPLE_RATE, sine!(frequency));
    waveform.iter().take(len).collect()
}

pub fn sine_samples_i16(frequency: f32, len: usize) -> Vec<i16> {
    sine_samples_f32(frequency, len)
        .into_iter()
        .map(|s| (s * i16::MAX as f32) as i16)
        .collect()
}

pub fn peak_bin(spectrum: &[f32]) -> usize {
    spectrum
        .iter()
        .enumerate()
        .skip(1)
        .fold((0, f32::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 {
                (i, v)
            } else {
                best
            }
        })
        .0
}
