#![no_std]

//! Frequency-band sampling and chart rendering for SongPlot.
//!
//! A raw magnitude spectrum goes in once per accepted tick; a shaped,
//! per-band [`Sample`] comes out and is appended to the take's
//! [`TimeSeries`]. The recorded series can then be drawn on any
//! embedded-graphics target or exported as a layered SVG.

extern crate alloc;

pub mod band_aggregator;
pub mod band_config;
pub mod chart;
pub mod config;
pub mod math;
pub mod normalizer;
pub mod palette;
pub mod pipeline;
pub mod recorder;
pub mod renderer;
pub mod shaper;
pub mod smoother;
pub mod svg_export;
pub mod time_series;
pub mod types;

pub use band_config::BandConfig;
pub use chart::{Arrangement, ChartLayout, ChartMode};
pub use palette::PaletteKind;
pub use pipeline::{PipelineConfig, SamplingPipeline};
pub use recorder::{Recorder, RecorderState, SpectrumSource, Transport};
pub use renderer::{ChartRenderer, Renderer};
pub use svg_export::{
    export_file_name, sanitize_song_name, ExportError, ExportMetadata, SvgExporter,
};
pub use time_series::TimeSeries;
pub use types::{Band, Sample};
