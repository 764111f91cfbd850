mod audio;
mod playback;
mod progress;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use songplot_viz::band_config::is_valid_band_count;
use songplot_viz::config::*;
use songplot_viz::{
    export_file_name, sanitize_song_name, Arrangement, BandConfig, ChartMode, ExportMetadata,
    PaletteKind, PipelineConfig, Recorder, Sample, SvgExporter,
};

use crate::playback::Playback;
use crate::progress::TakeProgress;

/// Every layout, in the order a batch run writes them.
const ALL_LAYOUTS: [(ChartMode, Arrangement); 4] = [
    (ChartMode::Linear, Arrangement::Separated),
    (ChartMode::Linear, Arrangement::Overlay),
    (ChartMode::Radial, Arrangement::Separated),
    (ChartMode::Radial, Arrangement::Overlay),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Linear,
    Radial,
}

impl From<ModeArg> for ChartMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Linear => ChartMode::Linear,
            ModeArg::Radial => ChartMode::Radial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PaletteArg {
    /// Blue, green, red, orange, purple, pink, cyan, yellow
    Classic,
    /// Evenly spaced around the color wheel
    Spectrum,
}

impl From<PaletteArg> for PaletteKind {
    fn from(palette: PaletteArg) -> Self {
        match palette {
            PaletteArg::Classic => PaletteKind::Classic,
            PaletteArg::Spectrum => PaletteKind::Spectrum,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "songplot",
    version,
    about = "Record the frequency bands of audio tracks and export plotter-ready SVG charts"
)]
struct Cli {
    /// Audio files to record, one take each (MP3, AAC/M4A, WAV, ...)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Number of log-spaced bands between 20 Hz and 20 kHz (1-8)
    #[arg(short, long, default_value_t = DEFAULT_BANDS)]
    bands: usize,

    /// Manual band range, repeatable; overrides --bands
    #[arg(long = "band", value_name = "MIN:MAX[:GAIN]", value_parser = parse_band)]
    band_ranges: Vec<(f32, f32, f32)>,

    /// Band color palette
    #[arg(long, value_enum, default_value_t = PaletteArg::Classic)]
    palette: PaletteArg,

    /// Samples recorded per second of audio (1-60)
    #[arg(short = 'r', long, default_value_t = DEFAULT_SAMPLING_RATE_HZ)]
    sampling_rate: u32,

    /// Moving-average window in samples; 1 disables smoothing (1-60)
    #[arg(short, long, default_value_t = DEFAULT_SMOOTHING_FRAMES)]
    smoothing: usize,

    /// Skip cross-band normalization
    #[arg(long)]
    no_normalize: bool,

    /// Skip the logarithmic frequency curve
    #[arg(long)]
    no_log_scaling: bool,

    /// Shape of the logarithmic curve (0.1-1.0)
    #[arg(long, default_value_t = DEFAULT_LOG_INTENSITY)]
    log_intensity: f32,

    /// Strength of the logarithmic curve (0.5-4.0)
    #[arg(long, default_value_t = DEFAULT_LOG_MULTIPLIER)]
    log_multiplier: f32,

    /// Chart type for single-layout exports
    #[arg(short, long, value_enum, default_value_t = ModeArg::Linear)]
    mode: ModeArg,

    /// Give every band its own lane or ring instead of overlaying them
    #[arg(long)]
    separate: bool,

    /// Export all four layouts (implied when more than one file is given)
    #[arg(long)]
    all_layouts: bool,

    /// Simulated display frame rate driving the sampler
    #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
    frame_rate: u32,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Log every recorded sample
    #[arg(short, long)]
    verbose: bool,
}

fn parse_band(value: &str) -> Result<(f32, f32, f32), String> {
    let parts: Vec<&str> = value.split(':').collect();
    let number = |s: &str| {
        s.trim()
            .parse::<f32>()
            .map_err(|_| format!("'{}' is not a number", s))
    };

    match parts.as_slice() {
        [min, max] => Ok((number(min)?, number(max)?, 1.0)),
        [min, max, gain] => Ok((number(min)?, number(max)?, number(gain)?)),
        _ => Err(format!("expected MIN:MAX or MIN:MAX:GAIN, got '{}'", value)),
    }
}

fn warn_if_clamped<T: PartialOrd + std::fmt::Display>(name: &str, value: T, min: T, max: T) {
    if value < min || value > max {
        warn!("{} {} out of range, clamped to [{}, {}]", name, value, min, max);
    }
}

fn build_config(cli: &Cli) -> PipelineConfig {
    let palette = PaletteKind::from(cli.palette).colors(cli.bands.clamp(MIN_BANDS, MAX_BANDS));

    let bands = if cli.band_ranges.is_empty() {
        if !is_valid_band_count(cli.bands) {
            warn!("Band count {} clamped to [{}, {}]", cli.bands, MIN_BANDS, MAX_BANDS);
        }
        BandConfig::with_palette(cli.bands, &palette)
    } else {
        let palette = PaletteKind::from(cli.palette).colors(cli.band_ranges.len().min(MAX_BANDS));
        BandConfig::from_ranges(&cli.band_ranges, &palette)
    };

    warn_if_clamped("Sampling rate", cli.sampling_rate, MIN_SAMPLING_RATE_HZ, MAX_SAMPLING_RATE_HZ);
    warn_if_clamped("Smoothing", cli.smoothing, MIN_SMOOTHING_FRAMES, MAX_SMOOTHING_FRAMES);
    warn_if_clamped("Log intensity", cli.log_intensity, MIN_LOG_INTENSITY, MAX_LOG_INTENSITY);
    warn_if_clamped("Log multiplier", cli.log_multiplier, MIN_LOG_MULTIPLIER, MAX_LOG_MULTIPLIER);

    PipelineConfig::new(bands)
        .with_sampling_rate(cli.sampling_rate)
        .with_smoothing_frames(cli.smoothing)
        .with_normalization(!cli.no_normalize)
        .with_log_scaling(!cli.no_log_scaling)
        .with_log_intensity(cli.log_intensity)
        .with_log_multiplier(cli.log_multiplier)
}

fn layouts(cli: &Cli) -> Vec<(ChartMode, Arrangement)> {
    if cli.all_layouts || cli.files.len() > 1 {
        ALL_LAYOUTS.to_vec()
    } else {
        let arrangement = if cli.separate {
            Arrangement::Separated
        } else {
            Arrangement::Overlay
        };
        vec![(cli.mode.into(), arrangement)]
    }
}

/// Samples of one take and the rate they were timestamped at.
struct RecordedTake {
    samples: Vec<Sample>,
    sampling_rate_hz: u32,
}

/// Plays the whole track through the recorder and returns the take.
fn record_take(
    path: &Path,
    song: &str,
    config: &PipelineConfig,
    frame_rate: u32,
) -> Result<RecordedTake> {
    let track = audio::read_mono(path)?;
    if track.sample_rate != 44_100 {
        warn!(
            "{} is {} Hz; band edges assume 44100 Hz and will be shifted",
            path.display(),
            track.sample_rate
        );
    }
    info!(
        "Loaded {}: {:.1}s at {} Hz",
        path.display(),
        track.duration(),
        track.sample_rate
    );

    let mut playback = Playback::new(track, frame_rate);
    let mut recorder = Recorder::new(frame_rate);
    let progress = TakeProgress::new(playback.total_frames(), song);

    recorder.start_take(config);
    while recorder.is_recording() {
        let playhead = playback.playhead();
        recorder.tick(config, &playhead, &mut playback);
        playback.advance();
        progress.frame(recorder.snapshot().len());
    }
    progress.finish(recorder.snapshot().len());

    Ok(RecordedTake {
        samples: recorder.snapshot().to_vec(),
        sampling_rate_hz: recorder.pipeline().sampling_rate_hz(),
    })
}

fn export_take(
    output: &Path,
    song: &str,
    config: &PipelineConfig,
    take: &RecordedTake,
    layouts: &[(ChartMode, Arrangement)],
) -> Result<()> {
    if take.samples.is_empty() {
        warn!("No data recorded for {}, nothing exported", song);
        return Ok(());
    }

    let timestamp = chrono::Utc::now().to_rfc3339();
    let meta = ExportMetadata {
        song,
        timestamp: &timestamp,
        sampling_rate_hz: take.sampling_rate_hz,
    };

    for &(mode, arrangement) in layouts {
        let svg = SvgExporter::new(mode, arrangement)
            .render(&meta, config, &take.samples)
            .with_context(|| {
                format!("Failed to render {} {} chart", mode.as_str(), arrangement.as_str())
            })?;
        let path = output.join(export_file_name(song, mode, arrangement));
        std::fs::write(&path, svg)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}

fn process_file(
    cli: &Cli,
    path: &Path,
    config: &PipelineConfig,
    layouts: &[(ChartMode, Arrangement)],
) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    let song = sanitize_song_name(file_name);

    let take = record_take(path, &song, config, cli.frame_rate)?;
    export_take(&cli.output, &song, config, &take, layouts)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create output directory: {}", cli.output.display()))?;

    let config = build_config(&cli);
    let layouts = layouts(&cli);
    let batch = cli.files.len() > 1;
    let mut failures = 0usize;

    for (index, path) in cli.files.iter().enumerate() {
        if batch {
            info!("[{}/{}] {}", index + 1, cli.files.len(), path.display());
        }
        match process_file(&cli, path, &config, &layouts) {
            Ok(()) => {}
            Err(e) if batch => {
                error!("Skipping {}: {:#}", path.display(), e);
                failures += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if failures == cli.files.len() {
        bail!("No file could be processed");
    }
    if failures > 0 {
        warn!("{} of {} files failed", failures, cli.files.len());
    }
    Ok(())
}
