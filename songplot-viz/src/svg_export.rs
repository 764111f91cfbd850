//! Layered SVG documents for pen plotters.
//!
//! Every document carries the settings it was recorded with in `<metadata>`,
//! one CSS class per band, and five named layers (`background-layer`,
//! `grid-axes-layer`, `text-labels-layer`, `frequency-data-layer`,
//! `song-title-layer`) so plotter software can toggle or reorder pens.

use alloc::{format, string::String};
use core::fmt::{self, Write};

use libm::roundf;
use thiserror::Error;

use crate::chart::{band_traces, format_time, max_time, Arrangement, ChartLayout, ChartMode};
use crate::palette::{CssRgb, RgbTriple};
use crate::pipeline::PipelineConfig;
use crate::types::{Band, Sample};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const UNKNOWN_SONG: &str = "unknown_song";
const TITLE_OFFSET: f32 = 30.0;
const LEGEND_ROW: f32 = 25.0;
const LEGEND_SWATCH: f32 = 30.0;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExportError {
    #[error("failed to write SVG output")]
    Write(#[from] fmt::Error),
}

/// Identifies the take inside the exported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportMetadata<'a> {
    pub song: &'a str,
    /// RFC 3339 wall-clock time of the export.
    pub timestamp: &'a str,
    /// Rate the samples were timestamped at, latched when the take began.
    pub sampling_rate_hz: u32,
}

/// Text with the five XML special characters escaped.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&apos;")?,
                _ => f.write_char(c)?,
            }
        }
        Ok(())
    }
}

/// Line weights and label sizes for one chart variant.
struct Stroke {
    axis: &'static str,
    grid: &'static str,
    label: &'static str,
    band: u32,
}

impl Stroke {
    fn for_chart(mode: ChartMode, arrangement: Arrangement) -> Self {
        match (mode, arrangement) {
            (ChartMode::Linear, Arrangement::Separated) => Self {
                axis: "stroke: black; stroke-width: 2;",
                grid: "stroke: #cccccc; stroke-width: 0.5;",
                label: "font-family: Arial, sans-serif; font-size: 10px; fill: black;",
                band: 2,
            },
            (ChartMode::Linear, Arrangement::Overlay) => Self {
                axis: "stroke: black; stroke-width: 3;",
                grid: "stroke: #cccccc; stroke-width: 1;",
                label: "font-family: Arial, sans-serif; font-size: 16px; fill: black;",
                band: 3,
            },
            (ChartMode::Radial, arrangement) => Self {
                axis: "stroke: #cccccc; stroke-width: 1; fill: none;",
                grid: "stroke: #cccccc; stroke-width: 1;",
                label: "font-family: Arial, sans-serif; font-size: 14px; fill: black; text-anchor: middle;",
                band: if arrangement.is_overlay() { 3 } else { 2 },
            },
        }
    }
}

pub struct SvgExporter {
    layout: ChartLayout,
    mode: ChartMode,
    arrangement: Arrangement,
}

impl SvgExporter {
    pub fn new(mode: ChartMode, arrangement: Arrangement) -> Self {
        Self {
            layout: ChartLayout::a3_landscape(),
            mode,
            arrangement,
        }
    }

    pub fn with_layout(mut self, layout: ChartLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn mode(&self) -> ChartMode {
        self.mode
    }

    pub fn arrangement(&self) -> Arrangement {
        self.arrangement
    }

    /// Renders the whole document into a fresh string.
    pub fn render(
        &self,
        meta: &ExportMetadata<'_>,
        config: &PipelineConfig,
        samples: &[Sample],
    ) -> Result<String, ExportError> {
        let mut out = String::new();
        self.write(&mut out, meta, config, samples)?;
        Ok(out)
    }

    /// Writes the document to `out`.
    ///
    /// An empty or single-sample series still produces a complete document;
    /// only the data layer is left empty.
    pub fn write<W: Write>(
        &self,
        out: &mut W,
        meta: &ExportMetadata<'_>,
        config: &PipelineConfig,
        samples: &[Sample],
    ) -> Result<(), ExportError> {
        let bands = config.bands.bands();

        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            out,
            r#"<svg width="{}" height="{}" xmlns="{}">"#,
            self.layout.width, self.layout.height, SVG_NAMESPACE
        )?;
        self.write_metadata(out, meta, config, samples)?;
        self.write_style(out, bands)?;

        writeln!(out, r#"  <g id="background-layer">"#)?;
        writeln!(
            out,
            r#"    <rect width="{}" height="{}" fill="white"/>"#,
            self.layout.width, self.layout.height
        )?;
        writeln!(out, "  </g>")?;

        writeln!(out, r#"  <g id="grid-axes-layer">"#)?;
        match self.mode {
            ChartMode::Linear => self.write_linear_grid(out, bands.len())?,
            ChartMode::Radial => self.write_radial_grid(out, bands.len())?,
        }
        writeln!(out, "  </g>")?;

        writeln!(out, r#"  <g id="text-labels-layer">"#)?;
        match self.mode {
            ChartMode::Linear => self.write_linear_labels(out, bands, samples)?,
            ChartMode::Radial => self.write_radial_labels(out, bands, samples)?,
        }
        writeln!(out, "  </g>")?;

        writeln!(out, r#"  <g id="frequency-data-layer">"#)?;
        self.write_traces(out, bands, samples)?;
        writeln!(out, "  </g>")?;

        writeln!(out, r#"  <g id="song-title-layer">"#)?;
        writeln!(
            out,
            r#"    <text x="{}" y="{}" text-anchor="middle" class="label" font-weight="bold" font-size="20">{}</text>"#,
            self.layout.width / 2.0,
            self.layout.height - TITLE_OFFSET,
            Escaped(meta.song)
        )?;
        writeln!(out, "  </g>")?;
        writeln!(out, "</svg>")?;
        Ok(())
    }

    fn write_metadata<W: Write>(
        &self,
        out: &mut W,
        meta: &ExportMetadata<'_>,
        config: &PipelineConfig,
        samples: &[Sample],
    ) -> fmt::Result {
        writeln!(out, "  <metadata>")?;
        writeln!(out, "    <song>{}</song>", Escaped(meta.song))?;
        writeln!(out, "    <timestamp>{}</timestamp>", Escaped(meta.timestamp))?;
        writeln!(out, "    <mode>{}</mode>", self.mode.as_str())?;
        writeln!(out, "    <overlay>{}</overlay>", self.arrangement.is_overlay())?;
        writeln!(out, "    <bands>{}</bands>", config.bands.len())?;
        writeln!(out, "    <samplingRate>{}</samplingRate>", meta.sampling_rate_hz)?;
        writeln!(out, "    <smoothingFrames>{}</smoothingFrames>", config.smoothing_frames)?;
        writeln!(
            out,
            "    <amplitudeNormalization>{}</amplitudeNormalization>",
            config.normalization
        )?;
        writeln!(out, "    <logarithmicScaling>{}</logarithmicScaling>", config.log_scaling)?;
        writeln!(
            out,
            "    <logarithmicIntensity>{}</logarithmicIntensity>",
            config.log_intensity
        )?;
        writeln!(
            out,
            "    <logarithmicMultiplier>{}</logarithmicMultiplier>",
            config.log_multiplier
        )?;
        writeln!(out, "    <frequencyBands>")?;
        for (i, band) in config.bands.bands().iter().enumerate() {
            writeln!(
                out,
                r#"      <band{} min="{}" max="{}" scale="{}" color="{}"/>"#,
                i + 1,
                band.min,
                band.max,
                band.gain,
                RgbTriple(band.color)
            )?;
        }
        writeln!(out, "    </frequencyBands>")?;
        writeln!(out, "    <dataPoints>{}</dataPoints>", samples.len())?;
        writeln!(
            out,
            r#"    <canvasSize width="{}" height="{}"/>"#,
            self.layout.width, self.layout.height
        )?;
        writeln!(out, "  </metadata>")
    }

    fn write_style<W: Write>(&self, out: &mut W, bands: &[Band]) -> fmt::Result {
        let stroke = Stroke::for_chart(self.mode, self.arrangement);
        writeln!(out, "  <style>")?;
        writeln!(out, "    .axis {{ {} }}", stroke.axis)?;
        writeln!(out, "    .grid {{ {} }}", stroke.grid)?;
        writeln!(out, "    .label {{ {} }}", stroke.label)?;
        if self.mode == ChartMode::Radial {
            writeln!(out, "    .center {{ fill: black; }}")?;
        }
        for (i, band) in bands.iter().enumerate() {
            writeln!(
                out,
                "    .band-{} {{ stroke: {}; stroke-width: {}; fill: none; }}",
                i,
                CssRgb(band.color),
                stroke.band
            )?;
        }
        writeln!(out, "  </style>")
    }

    fn write_line<W: Write>(
        out: &mut W,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        class: &str,
    ) -> fmt::Result {
        writeln!(
            out,
            r#"    <line x1="{}" y1="{}" x2="{}" y2="{}" class="{}"/>"#,
            x1, y1, x2, y2, class
        )
    }

    fn write_linear_grid<W: Write>(&self, out: &mut W, band_count: usize) -> fmt::Result {
        let layout = &self.layout;
        let (left, right) = (layout.plot_left(), layout.plot_right());
        let (top, bottom) = (layout.plot_top(), layout.plot_bottom());

        Self::write_line(out, left, bottom, right, bottom, "axis")?;
        Self::write_line(out, left, top, left, bottom, "axis")?;

        for (x, _) in layout.time_ticks(0.0) {
            Self::write_line(out, x, top, x, bottom, "grid")?;
        }

        match self.arrangement {
            Arrangement::Overlay => {
                for (y, _) in layout.amplitude_ticks() {
                    Self::write_line(out, left, y, right, y, "grid")?;
                }
            }
            Arrangement::Separated => {
                for i in 0..band_count {
                    let (lane_top, lane_bottom) = layout.lane(i, band_count);
                    Self::write_line(out, left, lane_top, right, lane_top, "grid")?;
                    if i + 1 == band_count {
                        Self::write_line(out, left, lane_bottom, right, lane_bottom, "grid")?;
                    }
                }
            }
        }
        Ok(())
    }

    fn write_radial_grid<W: Write>(&self, out: &mut W, band_count: usize) -> fmt::Result {
        let center = self.layout.center();
        for radius in self.layout.reference_radii(band_count, self.arrangement) {
            writeln!(
                out,
                r#"    <circle cx="{}" cy="{}" r="{}" class="axis"/>"#,
                center.x, center.y, radius
            )?;
        }
        writeln!(
            out,
            r#"    <circle cx="{}" cy="{}" r="4" class="center"/>"#,
            center.x, center.y
        )
    }

    fn write_linear_labels<W: Write>(
        &self,
        out: &mut W,
        bands: &[Band],
        samples: &[Sample],
    ) -> fmt::Result {
        let layout = &self.layout;
        let time_offset = if self.arrangement.is_overlay() { 30.0 } else { 20.0 };

        for (x, time) in layout.time_ticks(max_time(samples)) {
            writeln!(
                out,
                r#"    <text x="{}" y="{}" text-anchor="middle" class="label">{}</text>"#,
                x,
                layout.plot_bottom() + time_offset,
                format_time(time)
            )?;
        }

        match self.arrangement {
            Arrangement::Overlay => {
                for (y, amplitude) in layout.amplitude_ticks() {
                    writeln!(
                        out,
                        r#"    <text x="{}" y="{}" text-anchor="end" class="label">{}</text>"#,
                        layout.plot_left() - 20.0,
                        y + 5.0,
                        roundf(amplitude) as i32
                    )?;
                }
                let legend_x = layout.plot_right() - 200.0;
                let legend_y = layout.plot_top() + 30.0;
                self.write_legend(out, bands, legend_x, legend_y, r#"class="label""#)?;
            }
            Arrangement::Separated => {
                for (i, band) in bands.iter().enumerate() {
                    let (lane_top, lane_bottom) = layout.lane(i, bands.len());
                    writeln!(
                        out,
                        r#"    <text x="{}" y="{}" text-anchor="end" class="label">{}-{}Hz</text>"#,
                        layout.plot_left() - 10.0,
                        (lane_top + lane_bottom) / 2.0,
                        band.min,
                        band.max
                    )?;
                }
            }
        }
        Ok(())
    }

    fn write_radial_labels<W: Write>(
        &self,
        out: &mut W,
        bands: &[Band],
        samples: &[Sample],
    ) -> fmt::Result {
        let layout = &self.layout;
        let center = layout.center();

        for (point, time) in layout.radial_time_markers(max_time(samples)) {
            writeln!(
                out,
                r#"    <text x="{}" y="{}" class="label">{}</text>"#,
                point.x,
                point.y + 5.0,
                format_time(time)
            )?;
        }

        match self.arrangement {
            Arrangement::Overlay => {
                let legend_x = center.x - layout.max_radius() - 180.0;
                let legend_y = center.y - bands.len() as f32 * LEGEND_ROW / 2.0;
                self.write_legend(
                    out,
                    bands,
                    legend_x,
                    legend_y,
                    r#"font-family="Arial" font-size="14" fill="black""#,
                )?;
            }
            Arrangement::Separated => {
                let count = bands.len() as f32;
                for (i, band) in bands.iter().enumerate() {
                    let (inner, outer) = layout.ring(i, bands.len(), self.arrangement);
                    writeln!(
                        out,
                        r#"    <text x="{}" y="{}" font-family="Arial" font-size="12" fill="{}">{}-{}Hz</text>"#,
                        center.x + (inner + outer) / 2.0 + 10.0,
                        center.y + i as f32 * 20.0 - count * 20.0 / 2.0,
                        CssRgb(band.color),
                        band.min,
                        band.max
                    )?;
                }
            }
        }
        Ok(())
    }

    fn write_legend<W: Write>(
        &self,
        out: &mut W,
        bands: &[Band],
        x: f32,
        y: f32,
        text_attributes: &str,
    ) -> fmt::Result {
        for (i, band) in bands.iter().enumerate() {
            let row_y = y + i as f32 * LEGEND_ROW;
            writeln!(
                out,
                r#"    <line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="4"/>"#,
                x,
                row_y,
                x + LEGEND_SWATCH,
                row_y,
                CssRgb(band.color)
            )?;
            writeln!(
                out,
                r#"    <text x="{}" y="{}" {}>{}-{}Hz</text>"#,
                x + LEGEND_SWATCH + 10.0,
                row_y + 5.0,
                text_attributes,
                band.min,
                band.max
            )?;
        }
        Ok(())
    }

    fn write_traces<W: Write>(
        &self,
        out: &mut W,
        bands: &[Band],
        samples: &[Sample],
    ) -> fmt::Result {
        let element = match self.mode {
            ChartMode::Linear => "polyline",
            ChartMode::Radial => "polygon",
        };

        for trace in band_traces(&self.layout, self.mode, self.arrangement, samples, bands.len()) {
            let band = match bands.get(trace.band_index) {
                Some(band) => band,
                None => continue,
            };
            write!(
                out,
                r#"    <{} id="{}" class="band-{}" points=""#,
                element,
                trace_id(trace.band_index, band),
                trace.band_index
            )?;
            for (i, point) in trace.points.iter().enumerate() {
                if i > 0 {
                    out.write_char(' ')?;
                }
                write!(out, "{},{}", point.x, point.y)?;
            }
            writeln!(out, r#""/>"#)?;
        }
        Ok(())
    }
}

/// Element id of a band's trace, e.g. `band-1-20hz-200hz`.
pub fn trace_id(index: usize, band: &Band) -> String {
    format!("band-{}-{}hz-{}hz", index + 1, band.min, band.max)
}

/// `{song}_{linear|radial}_{overlay|separate}.svg`
pub fn export_file_name(song: &str, mode: ChartMode, arrangement: Arrangement) -> String {
    format!("{}_{}_{}.svg", song, mode.as_str(), arrangement.as_str())
}

/// Turns a file name into something safe to embed in output file names.
///
/// The last extension is dropped, then every character outside
/// `[A-Za-z0-9_-]` becomes `_`.
pub fn sanitize_song_name(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() && !file_name[dot + 1..].contains('/') => {
            &file_name[..dot]
        }
        _ => file_name,
    };

    let name: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if name.is_empty() {
        String::from(UNKNOWN_SONG)
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band_config::BandConfig;
    use alloc::{vec, vec::Vec};

    const META: ExportMetadata<'static> = ExportMetadata {
        song: "test_song",
        timestamp: "2024-01-01T00:00:00+00:00",
        sampling_rate_hz: 10,
    };

    fn samples(len: usize) -> Vec<Sample> {
        (0..len)
            .map(|i| Sample::new(i as f32 / 10.0, vec![10.0 * i as f32, 100.0, 255.0]))
            .collect()
    }

    fn render(mode: ChartMode, arrangement: Arrangement, len: usize) -> String {
        SvgExporter::new(mode, arrangement)
            .render(&META, &PipelineConfig::default(), &samples(len))
            .unwrap()
    }

    #[test]
    fn test_document_structure() {
        let svg = render(ChartMode::Linear, Arrangement::Overlay, 10);
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(
            r#"<svg width="2382" height="1684" xmlns="http://www.w3.org/2000/svg">"#
        ));
        assert!(svg.trim_end().ends_with("</svg>"));

        let layers = [
            "background-layer",
            "grid-axes-layer",
            "text-labels-layer",
            "frequency-data-layer",
            "song-title-layer",
        ];
        let positions: Vec<usize> = layers
            .iter()
            .map(|id| svg.find(&format!(r#"<g id="{}">"#, id)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "layers in order");
    }

    #[test]
    fn test_metadata_records_settings() {
        let svg = render(ChartMode::Radial, Arrangement::Separated, 4);
        for expected in [
            "<song>test_song</song>",
            "<timestamp>2024-01-01T00:00:00+00:00</timestamp>",
            "<mode>radial</mode>",
            "<overlay>false</overlay>",
            "<bands>3</bands>",
            "<samplingRate>10</samplingRate>",
            "<smoothingFrames>3</smoothingFrames>",
            "<amplitudeNormalization>true</amplitudeNormalization>",
            "<logarithmicScaling>true</logarithmicScaling>",
            "<logarithmicIntensity>0.5</logarithmicIntensity>",
            "<logarithmicMultiplier>2</logarithmicMultiplier>",
            r#"<band1 min="20" max="200" scale="1" color="0,0,255"/>"#,
            r#"<band3 min="2000" max="20000" scale="1" color="255,0,0"/>"#,
            "<dataPoints>4</dataPoints>",
            r#"<canvasSize width="2382" height="1684"/>"#,
        ] {
            assert!(svg.contains(expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_sampling_rate_comes_from_the_take() {
        let meta = ExportMetadata {
            sampling_rate_hz: 20,
            ..META
        };
        let live = PipelineConfig::default().with_sampling_rate(5);
        let svg = SvgExporter::new(ChartMode::Linear, Arrangement::Overlay)
            .render(&meta, &live, &samples(3))
            .unwrap();
        assert!(svg.contains("<samplingRate>20</samplingRate>"));
        assert!(!svg.contains("<samplingRate>5</samplingRate>"));
    }

    #[test]
    fn test_band_styles_and_trace_ids() {
        let svg = render(ChartMode::Linear, Arrangement::Separated, 5);
        assert!(svg.contains(".band-0 { stroke: rgb(0, 0, 255); stroke-width: 2; fill: none; }"));
        assert!(svg.contains(".band-1 { stroke: rgb(0, 255, 0); stroke-width: 2; fill: none; }"));
        assert!(svg.contains(r#"<polyline id="band-1-20hz-200hz" class="band-0" points=""#));
        assert!(svg.contains(r#"id="band-3-2000hz-20000hz""#));
        assert_eq!(svg.matches("<polyline").count(), 3);
        assert!(!svg.contains("<polygon"));
    }

    #[test]
    fn test_radial_traces_are_polygons() {
        let svg = render(ChartMode::Radial, Arrangement::Overlay, 5);
        assert_eq!(svg.matches("<polygon").count(), 3);
        assert!(svg.contains(r#"class="center""#));
        assert_eq!(svg.matches(r#"class="axis""#).count(), 5, "reference rings");
    }

    #[test]
    fn test_single_sample_has_no_traces() {
        for len in [0, 1] {
            let svg = render(ChartMode::Linear, Arrangement::Overlay, len);
            assert!(!svg.contains("<polyline"), "len {}", len);
            assert!(svg.contains(&format!("<dataPoints>{}</dataPoints>", len)));
            assert!(svg.contains(r#"<g id="song-title-layer">"#));
        }
    }

    #[test]
    fn test_time_labels_use_last_sample() {
        let long: Vec<Sample> = (0..=1200)
            .map(|i| Sample::new(i as f32 / 10.0, vec![0.0; 3]))
            .collect();
        let svg = SvgExporter::new(ChartMode::Linear, Arrangement::Overlay)
            .render(&META, &PipelineConfig::default(), &long)
            .unwrap();
        assert!(svg.contains(">2:00</text>"));
        assert!(svg.contains(">1:00</text>"));
    }

    #[test]
    fn test_song_name_is_escaped() {
        let meta = ExportMetadata {
            song: "Tom & Jerry <live>",
            timestamp: "now",
            sampling_rate_hz: 10,
        };
        let svg = SvgExporter::new(ChartMode::Linear, Arrangement::Overlay)
            .render(&meta, &PipelineConfig::default(), &[])
            .unwrap();
        assert!(svg.contains("<song>Tom &amp; Jerry &lt;live&gt;</song>"));
        assert!(!svg.contains("<live>"));
    }

    #[test]
    fn test_custom_bands_in_labels() {
        let bands = BandConfig::from_ranges(&[(40.0, 90.0, 2.5)], &[]);
        let config = PipelineConfig::new(bands);
        let svg = SvgExporter::new(ChartMode::Linear, Arrangement::Overlay)
            .render(&META, &config, &samples(3))
            .unwrap();
        assert!(svg.contains(r#"<band1 min="40" max="90" scale="2.5" color="0,0,255"/>"#));
        assert!(svg.contains(">40-90Hz</text>"));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            export_file_name("song", ChartMode::Linear, Arrangement::Overlay),
            "song_linear_overlay.svg"
        );
        assert_eq!(
            export_file_name("song", ChartMode::Radial, Arrangement::Separated),
            "song_radial_separate.svg"
        );
    }

    #[test]
    fn test_sanitize_song_name() {
        assert_eq!(sanitize_song_name("My Song (live).mp3"), "My_Song__live_");
        assert_eq!(sanitize_song_name("track-01_final.v2.wav"), "track-01_final_v2");
        assert_eq!(sanitize_song_name("no_extension"), "no_extension");
        assert_eq!(sanitize_song_name("trailing."), "trailing_");
        assert_eq!(sanitize_song_name(".mp3"), "unknown_song");
    }

    #[test]
    fn test_write_error_propagates() {
        struct Full;
        impl Write for Full {
            fn write_str(&mut self, _: &str) -> fmt::Result {
                Err(fmt::Error)
            }
        }
        let result = SvgExporter::new(ChartMode::Linear, Arrangement::Overlay).write(
            &mut Full,
            &META,
            &PipelineConfig::default(),
            &samples(3),
        );
        assert_eq!(result, Err(ExportError::Write(fmt::Error)));
    }
}
