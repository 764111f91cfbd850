// --- Spectrum Config ---
pub const NYQUIST_HZ: f32 = 22_050.0; // Half of the assumed 44.1 kHz source rate

// --- Band Config ---
pub const MIN_FREQUENCY_HZ: f32 = 20.0;
pub const MAX_FREQUENCY_HZ: f32 = 20_000.0;
pub const MIN_BANDS: usize = 1;
pub const MAX_BANDS: usize = 8;
pub const DEFAULT_BANDS: usize = 3;
pub const BAND_GAP_HZ: f32 = 1.0; // Step used when clamping edited band edges
pub const MIN_BAND_START_HZ: f32 = MIN_FREQUENCY_HZ;
pub const MAX_BAND_START_HZ: f32 = MAX_FREQUENCY_HZ - BAND_GAP_HZ;
pub const MIN_BAND_END_HZ: f32 = MIN_FREQUENCY_HZ + BAND_GAP_HZ;
pub const MAX_BAND_END_HZ: f32 = MAX_FREQUENCY_HZ;
pub const MIN_GAIN: f32 = 0.1;
pub const MAX_GAIN: f32 = 5.0;

// --- Sampling Config ---
pub const DEFAULT_FRAME_RATE: u32 = 60; // Scheduler ticks per second
pub const MIN_SAMPLING_RATE_HZ: u32 = 1;
pub const MAX_SAMPLING_RATE_HZ: u32 = 60;
pub const DEFAULT_SAMPLING_RATE_HZ: u32 = 10;
pub const MIN_SMOOTHING_FRAMES: usize = 1;
pub const MAX_SMOOTHING_FRAMES: usize = 60;
pub const DEFAULT_SMOOTHING_FRAMES: usize = 3;
pub const END_OF_TRACK_TOLERANCE_S: f32 = 0.1;

// --- Shaping Config ---
pub const AMPLITUDE_MAX: f32 = 255.0;
pub const MIN_LOG_INTENSITY: f32 = 0.1;
pub const MAX_LOG_INTENSITY: f32 = 1.0;
pub const DEFAULT_LOG_INTENSITY: f32 = 0.5;
pub const MIN_LOG_MULTIPLIER: f32 = 0.5;
pub const MAX_LOG_MULTIPLIER: f32 = 4.0;
pub const DEFAULT_LOG_MULTIPLIER: f32 = 2.0;
pub const MIN_CURVE: f32 = 0.2;
pub const MAX_CURVE: f32 = 3.0;
