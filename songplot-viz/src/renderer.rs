use alloc::vec::Vec;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::Point,
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, Line, Polyline, PrimitiveStyle},
};
use libm::roundf;

use crate::chart::{band_traces, Arrangement, ChartLayout, ChartMode, PlotPoint};
use crate::types::{Band, Sample};

const GRID_GRAY: Rgb888 = Rgb888::new(204, 204, 204);
const CENTER_DOT_DIAMETER: u32 = 8;

pub trait Renderer {
    fn draw<D: DrawTarget<Color = Rgb888>>(
        &self,
        target: &mut D,
        samples: &[Sample],
        bands: &[Band],
    ) -> Result<(), D::Error>;
}

/// Draws a recorded take onto any embedded-graphics target.
///
/// The chart geometry is the same as the SVG export, scaled to the target's
/// bounding box, so a small display previews what the plotter will draw.
pub struct ChartRenderer {
    mode: ChartMode,
    arrangement: Arrangement,
    background: Rgb888,
    grid: Rgb888,
    axis: Rgb888,
    stroke_width: u32,
}

impl ChartRenderer {
    pub fn new(mode: ChartMode, arrangement: Arrangement) -> Self {
        Self {
            mode,
            arrangement,
            background: Rgb888::WHITE,
            grid: GRID_GRAY,
            axis: Rgb888::BLACK,
            stroke_width: 1,
        }
    }

    /// LED matrices want a dark background; paper wants a light one.
    pub fn with_colors(mut self, background: Rgb888, grid: Rgb888, axis: Rgb888) -> Self {
        self.background = background;
        self.grid = grid;
        self.axis = axis;
        self
    }

    pub fn with_stroke_width(mut self, stroke_width: u32) -> Self {
        self.stroke_width = stroke_width.max(1);
        self
    }

    fn draw_linear_grid<D>(
        &self,
        target: &mut D,
        layout: &ChartLayout,
        band_count: usize,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let grid_style = PrimitiveStyle::with_stroke(self.grid, 1);
        let (left, right) = (layout.plot_left(), layout.plot_right());
        let (top, bottom) = (layout.plot_top(), layout.plot_bottom());

        for (x, _) in layout.time_ticks(0.0) {
            Line::new(to_point(PlotPoint::new(x, top)), to_point(PlotPoint::new(x, bottom)))
                .into_styled(grid_style)
                .draw(target)?;
        }

        let rows: Vec<f32> = match self.arrangement {
            Arrangement::Overlay => layout.amplitude_ticks().into_iter().map(|(y, _)| y).collect(),
            Arrangement::Separated => (0..=band_count)
                .map(|i| layout.lane(i, band_count).0)
                .collect(),
        };
        for y in rows {
            Line::new(to_point(PlotPoint::new(left, y)), to_point(PlotPoint::new(right, y)))
                .into_styled(grid_style)
                .draw(target)?;
        }

        let axis_style = PrimitiveStyle::with_stroke(self.axis, self.stroke_width);
        Line::new(to_point(PlotPoint::new(left, bottom)), to_point(PlotPoint::new(right, bottom)))
            .into_styled(axis_style)
            .draw(target)?;
        Line::new(to_point(PlotPoint::new(left, top)), to_point(PlotPoint::new(left, bottom)))
            .into_styled(axis_style)
            .draw(target)?;
        Ok(())
    }

    fn draw_radial_grid<D>(
        &self,
        target: &mut D,
        layout: &ChartLayout,
        band_count: usize,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let center = to_point(layout.center());
        let grid_style = PrimitiveStyle::with_stroke(self.grid, 1);

        for radius in layout.reference_radii(band_count, self.arrangement) {
            let diameter = (roundf(radius * 2.0).max(1.0)) as u32;
            Circle::with_center(center, diameter)
                .into_styled(grid_style)
                .draw(target)?;
        }

        Circle::with_center(center, CENTER_DOT_DIAMETER)
            .into_styled(PrimitiveStyle::with_fill(self.axis))
            .draw(target)?;
        Ok(())
    }
}

impl Renderer for ChartRenderer {
    fn draw<D>(&self, target: &mut D, samples: &[Sample], bands: &[Band]) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let size = target.bounding_box().size;
        let layout = ChartLayout::scaled_to(size.width as f32, size.height as f32);

        target.clear(self.background)?;

        match self.mode {
            ChartMode::Linear => self.draw_linear_grid(target, &layout, bands.len())?,
            ChartMode::Radial => self.draw_radial_grid(target, &layout, bands.len())?,
        }

        for trace in band_traces(&layout, self.mode, self.arrangement, samples, bands.len()) {
            let color = match bands.get(trace.band_index) {
                Some(band) => band.color,
                None => continue,
            };
            let points: Vec<Point> = trace.points.iter().copied().map(to_point).collect();
            Polyline::new(&points)
                .into_styled(PrimitiveStyle::with_stroke(color, self.stroke_width))
                .draw(target)?;
        }
        Ok(())
    }
}

fn to_point(point: PlotPoint) -> Point {
    Point::new(roundf(point.x) as i32, roundf(point.y) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band_config::derive_bands;
    use crate::palette::DEFAULT_PALETTE;
    use alloc::vec;
    use core::convert::Infallible;
    use embedded_graphics::Pixel;

    struct FrameBuffer {
        size: Size,
        pixels: Vec<Rgb888>,
    }

    impl FrameBuffer {
        fn new(width: u32, height: u32) -> Self {
            Self {
                size: Size::new(width, height),
                pixels: vec![Rgb888::new(1, 2, 3); (width * height) as usize],
            }
        }

        fn get(&self, x: u32, y: u32) -> Rgb888 {
            self.pixels[(y * self.size.width + x) as usize]
        }

        fn count(&self, color: Rgb888) -> usize {
            self.pixels.iter().filter(|&&c| c == color).count()
        }
    }

    impl OriginDimensions for FrameBuffer {
        fn size(&self) -> Size {
            self.size
        }
    }

    impl DrawTarget for FrameBuffer {
        type Color = Rgb888;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if point.x >= 0
                    && point.y >= 0
                    && (point.x as u32) < self.size.width
                    && (point.y as u32) < self.size.height
                {
                    let index = point.y as u32 * self.size.width + point.x as u32;
                    self.pixels[index as usize] = color;
                }
            }
            Ok(())
        }
    }

    fn take() -> Vec<Sample> {
        (0..20)
            .map(|i| {
                let rising = (i * 12) as f32;
                Sample::new(i as f32 / 10.0, vec![rising, 128.0, 255.0 - rising])
            })
            .collect()
    }

    #[test]
    fn test_linear_overlay_draws_every_band() {
        let bands = derive_bands(3, &DEFAULT_PALETTE);
        let mut fb = FrameBuffer::new(238, 168);
        ChartRenderer::new(ChartMode::Linear, Arrangement::Overlay)
            .draw(&mut fb, &take(), &bands)
            .unwrap();

        assert_eq!(fb.count(Rgb888::new(1, 2, 3)), 0, "background cleared");
        for band in bands.iter() {
            assert!(fb.count(band.color) > 0, "missing trace for {:?}", band);
        }
        // Left axis, below where any trace starts.
        assert_eq!(fb.get(8, 120), Rgb888::BLACK);
    }

    #[test]
    fn test_no_traces_without_data() {
        let bands = derive_bands(2, &DEFAULT_PALETTE);
        let mut fb = FrameBuffer::new(238, 168);
        ChartRenderer::new(ChartMode::Linear, Arrangement::Separated)
            .draw(&mut fb, &take()[..1], &bands)
            .unwrap();

        assert!(bands.iter().all(|band| fb.count(band.color) == 0));
        assert!(fb.count(GRID_GRAY) > 0, "grid is still drawn");
    }

    #[test]
    fn test_radial_on_dark_background() {
        let bands = derive_bands(3, &DEFAULT_PALETTE);
        let mut fb = FrameBuffer::new(256, 256);
        ChartRenderer::new(ChartMode::Radial, Arrangement::Separated)
            .with_colors(Rgb888::BLACK, Rgb888::new(40, 40, 40), Rgb888::WHITE)
            .draw(&mut fb, &take(), &bands)
            .unwrap();

        assert_eq!(fb.get(128, 128), Rgb888::WHITE, "center dot");
        assert!(fb.count(bands[2].color) > 0);
        assert!(fb.count(Rgb888::BLACK) > fb.count(bands[0].color));
    }
}
