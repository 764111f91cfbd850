use alloc::vec::Vec;
use core::f32::consts::{FRAC_PI_2, TAU};
use core::fmt;

use libm::{cosf, floorf, fmodf, sinf};

use crate::config::AMPLITUDE_MAX;
use crate::math::linear_map;
use crate::types::Sample;

const A3_WIDTH: f32 = 2382.0;
const A3_HEIGHT: f32 = 1684.0;
const A3_MARGIN: f32 = 80.0;
const A3_LANE_RESERVE: f32 = 80.0; // Room left under separated lanes for the time labels
const A3_RADIAL_INSET: f32 = 100.0;
const A3_BASE_RADIUS: f32 = 50.0;
const A3_MARKER_OFFSET: f32 = 20.0;

pub const TIME_DIVISIONS: usize = 10;
pub const AMPLITUDE_DIVISIONS: usize = 10;
pub const RADIAL_TIME_MARKERS: usize = 12;
pub const RADIAL_REFERENCE_RINGS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMode {
    #[default]
    Linear,
    Radial,
}

impl ChartMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartMode::Linear => "linear",
            ChartMode::Radial => "radial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arrangement {
    /// Every band shares one plot area.
    #[default]
    Overlay,
    /// Each band gets its own lane (linear) or ring (radial).
    Separated,
}

impl Arrangement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arrangement::Overlay => "overlay",
            Arrangement::Separated => "separate",
        }
    }

    pub fn is_overlay(&self) -> bool {
        *self == Arrangement::Overlay
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub x: f32,
    pub y: f32,
}

impl PlotPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One band's path through the chart, in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BandTrace {
    pub band_index: usize,
    pub points: Vec<PlotPoint>,
    /// Radial traces end where they started.
    pub closed: bool,
}

/// Canvas dimensions and the fixed offsets every chart is laid out with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub lane_reserve: f32,
    pub radial_inset: f32,
    pub base_radius: f32,
    pub marker_offset: f32,
}

impl ChartLayout {
    /// A3 landscape at 144 dpi, the plotter sheet size.
    pub fn a3_landscape() -> Self {
        Self::scaled_to(A3_WIDTH, A3_HEIGHT)
    }

    /// Layout for an arbitrary canvas, offsets scaled with the smaller axis.
    pub fn scaled_to(width: f32, height: f32) -> Self {
        let scale = (width / A3_WIDTH).min(height / A3_HEIGHT);
        Self {
            width,
            height,
            margin: A3_MARGIN * scale,
            lane_reserve: A3_LANE_RESERVE * scale,
            radial_inset: A3_RADIAL_INSET * scale,
            base_radius: A3_BASE_RADIUS * scale,
            marker_offset: A3_MARKER_OFFSET * scale,
        }
    }

    pub fn plot_left(&self) -> f32 {
        self.margin
    }

    pub fn plot_right(&self) -> f32 {
        self.width - self.margin
    }

    pub fn plot_top(&self) -> f32 {
        self.margin
    }

    pub fn plot_bottom(&self) -> f32 {
        self.height - self.margin
    }

    pub fn lane_height(&self, band_count: usize) -> f32 {
        (self.height - 2.0 * self.margin - self.lane_reserve) / band_count.max(1) as f32
    }

    /// Top and bottom edge of lane `index` when bands are separated.
    pub fn lane(&self, index: usize, band_count: usize) -> (f32, f32) {
        let height = self.lane_height(band_count);
        let top = self.margin + index as f32 * height;
        (top, top + height)
    }

    pub fn center(&self) -> PlotPoint {
        PlotPoint::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn max_radius(&self) -> f32 {
        self.width.min(self.height) / 2.0 - self.radial_inset
    }

    /// Inner and outer radius available to band `index`.
    pub fn ring(&self, index: usize, band_count: usize, arrangement: Arrangement) -> (f32, f32) {
        match arrangement {
            Arrangement::Overlay => (self.base_radius, self.max_radius()),
            Arrangement::Separated => {
                let step = (self.max_radius() - self.base_radius) / band_count.max(1) as f32;
                (
                    self.base_radius + index as f32 * step,
                    self.base_radius + (index + 1) as f32 * step,
                )
            }
        }
    }

    /// Radii of the reference circles behind a radial chart.
    pub fn reference_radii(&self, band_count: usize, arrangement: Arrangement) -> Vec<f32> {
        match arrangement {
            Arrangement::Overlay => (1..=RADIAL_REFERENCE_RINGS)
                .map(|i| {
                    self.base_radius
                        + (self.max_radius() - self.base_radius) * i as f32
                            / RADIAL_REFERENCE_RINGS as f32
                })
                .collect(),
            Arrangement::Separated => (0..band_count)
                .flat_map(|i| {
                    let (inner, outer) = self.ring(i, band_count, arrangement);
                    [inner, outer]
                })
                .collect(),
        }
    }

    /// Vertical time grid: `(x, seconds)` for each of the 11 divisions.
    pub fn time_ticks(&self, max_time: f32) -> Vec<(f32, f32)> {
        (0..=TIME_DIVISIONS)
            .map(|i| {
                let i = i as f32;
                let divisions = TIME_DIVISIONS as f32;
                (
                    linear_map(i, 0.0, divisions, self.plot_left(), self.plot_right()),
                    linear_map(i, 0.0, divisions, 0.0, max_time),
                )
            })
            .collect()
    }

    /// Horizontal amplitude grid of the overlay chart: `(y, amplitude)`.
    pub fn amplitude_ticks(&self) -> Vec<(f32, f32)> {
        (0..=AMPLITUDE_DIVISIONS)
            .map(|i| {
                let i = i as f32;
                let divisions = AMPLITUDE_DIVISIONS as f32;
                (
                    linear_map(i, 0.0, divisions, self.plot_bottom(), self.plot_top()),
                    linear_map(i, 0.0, divisions, 0.0, AMPLITUDE_MAX),
                )
            })
            .collect()
    }

    /// Clock-face time labels around a radial chart, starting at 12 o'clock.
    pub fn radial_time_markers(&self, max_time: f32) -> Vec<(PlotPoint, f32)> {
        let radius = self.max_radius() + self.marker_offset;
        (0..RADIAL_TIME_MARKERS)
            .map(|i| {
                let fraction = i as f32 / RADIAL_TIME_MARKERS as f32;
                (self.polar(fraction, radius), max_time * fraction)
            })
            .collect()
    }

    fn polar(&self, fraction: f32, radius: f32) -> PlotPoint {
        let angle = fraction * TAU - FRAC_PI_2;
        let center = self.center();
        PlotPoint::new(center.x + cosf(angle) * radius, center.y + sinf(angle) * radius)
    }
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self::a3_landscape()
    }
}

/// Time of the last sample, which is what every time axis is labelled against.
pub fn max_time(samples: &[Sample]) -> f32 {
    samples.last().map(|sample| sample.time).unwrap_or(0.0)
}

fn amplitude_at(sample: &Sample, band_index: usize) -> f32 {
    sample.bands.get(band_index).copied().unwrap_or(0.0)
}

/// Canvas paths for every band. Empty when there are fewer than 2 samples.
pub fn band_traces(
    layout: &ChartLayout,
    mode: ChartMode,
    arrangement: Arrangement,
    samples: &[Sample],
    band_count: usize,
) -> Vec<BandTrace> {
    if samples.len() < 2 {
        return Vec::new();
    }

    (0..band_count)
        .map(|band_index| match mode {
            ChartMode::Linear => linear_trace(layout, arrangement, samples, band_index, band_count),
            ChartMode::Radial => radial_trace(layout, arrangement, samples, band_index, band_count),
        })
        .collect()
}

fn linear_trace(
    layout: &ChartLayout,
    arrangement: Arrangement,
    samples: &[Sample],
    band_index: usize,
    band_count: usize,
) -> BandTrace {
    let (top, bottom) = match arrangement {
        Arrangement::Overlay => (layout.plot_top(), layout.plot_bottom()),
        Arrangement::Separated => layout.lane(band_index, band_count),
    };
    let last = (samples.len() - 1) as f32;

    let points = samples
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            PlotPoint::new(
                linear_map(i as f32, 0.0, last, layout.plot_left(), layout.plot_right()),
                linear_map(amplitude_at(sample, band_index), 0.0, AMPLITUDE_MAX, bottom, top),
            )
        })
        .collect();

    BandTrace {
        band_index,
        points,
        closed: false,
    }
}

fn radial_trace(
    layout: &ChartLayout,
    arrangement: Arrangement,
    samples: &[Sample],
    band_index: usize,
    band_count: usize,
) -> BandTrace {
    let (inner, outer) = layout.ring(band_index, band_count, arrangement);
    let count = samples.len() as f32;

    let mut points: Vec<PlotPoint> = samples
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let radius =
                linear_map(amplitude_at(sample, band_index), 0.0, AMPLITUDE_MAX, inner, outer);
            layout.polar(i as f32 / count, radius)
        })
        .collect();
    if let Some(&first) = points.first() {
        points.push(first);
    }

    BandTrace {
        band_index,
        points,
        closed: true,
    }
}

/// `m:ss` rendering of a duration; negative or NaN shows as `0:00`.
#[derive(Debug, Clone, Copy)]
pub struct TimeLabel(pub f32);

impl fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seconds = if self.0.is_nan() || self.0 < 0.0 { 0.0 } else { self.0 };
        let minutes = floorf(seconds / 60.0) as u32;
        let secs = floorf(fmodf(seconds, 60.0)) as u32;
        write!(f, "{}:{:02}", minutes, secs)
    }
}

pub fn format_time(seconds: f32) -> TimeLabel {
    TimeLabel(seconds)
}
