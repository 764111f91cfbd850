use alloc::vec::Vec;
use core::fmt;

use embedded_graphics::{pixelcolor::Rgb888, prelude::*};

/// Band colors used when bands are derived from a count, applied cyclically.
pub const DEFAULT_PALETTE: [Rgb888; 8] = [
    Rgb888::new(0, 0, 255),     // Blue
    Rgb888::new(0, 255, 0),     // Green
    Rgb888::new(255, 0, 0),     // Red
    Rgb888::new(255, 165, 0),   // Orange
    Rgb888::new(128, 0, 128),   // Purple
    Rgb888::new(255, 192, 203), // Pink
    Rgb888::new(0, 255, 255),   // Cyan
    Rgb888::new(255, 255, 0),   // Yellow
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaletteKind {
    #[default]
    Classic,
    /// Evenly spread around the RGB color wheel.
    Spectrum,
}

impl PaletteKind {
    pub fn colors(&self, count: usize) -> Vec<Rgb888> {
        match self {
            PaletteKind::Classic => DEFAULT_PALETTE.to_vec(),
            PaletteKind::Spectrum => spectrum_palette(count),
        }
    }
}

fn map_position_to_rgb_on_wheel(pos: u8) -> Rgb888 {
    let pos = pos % 255;
    if pos < 85 {
        Rgb888::new(
            pos.saturating_mul(3),
            255u8.saturating_sub(pos.saturating_mul(3)),
            0,
        )
    } else if pos < 170 {
        let pos = pos.saturating_sub(85);
        Rgb888::new(
            255u8.saturating_sub(pos.saturating_mul(3)),
            0,
            pos.saturating_mul(3),
        )
    } else {
        let pos = pos.saturating_sub(170);
        Rgb888::new(
            0,
            pos.saturating_mul(3),
            255u8.saturating_sub(pos.saturating_mul(3)),
        )
    }
}

pub fn spectrum_palette(count: usize) -> Vec<Rgb888> {
    let count = count.max(1);
    (0..count)
        .map(|i| {
            let color_position = ((i as u32 * 255 / count as u32) % 255) as u8;
            map_position_to_rgb_on_wheel(color_position)
        })
        .collect()
}

/// Formats a color the way SVG stroke attributes expect, e.g. `rgb(0, 0, 255)`.
pub struct CssRgb(pub Rgb888);

impl fmt::Display for CssRgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.0.r(), self.0.g(), self.0.b())
    }
}

/// Comma separated triple used in export metadata, e.g. `0,0,255`.
pub struct RgbTriple(pub Rgb888);

impl fmt::Display for RgbTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.0.r(), self.0.g(), self.0.b())
    }
}
