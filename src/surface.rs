//! Fixed-resolution raster the user draws on.

use egui::ColorImage;
use image::{Rgba, RgbaImage, imageops};

/// Opaque white, the default surface background.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Opaque black, the default ink color.
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A point in surface (or device) pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Pen appearance used for every segment; caps and joins are always round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Pen diameter in surface pixels.
    pub width: f32,
    pub ink: Rgba<u8>,
    pub background: Rgba<u8>,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 16.0,
            ink: BLACK,
            background: WHITE,
        }
    }
}

/// Full-resolution drawing raster.
///
/// Every pixel stays fully opaque: reset fills with the opaque background and
/// strokes blend opaque ink over opaque pixels.
#[derive(Clone, Debug)]
pub struct DrawingSurface {
    pixels: RgbaImage,
    style: StrokeStyle,
    revision: u64,
}

impl DrawingSurface {
    /// Create a surface filled with the style's background color.
    pub fn new(width: u32, height: u32, style: StrokeStyle) -> Self {
        let style = StrokeStyle {
            ink: opaque(style.ink),
            background: opaque(style.background),
            ..style
        };
        Self {
            pixels: RgbaImage::from_pixel(width, height, style.background),
            style,
            revision: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Counter bumped on every mutation; lets viewers skip re-uploading unchanged pixels.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Clear the whole surface to the background color.
    pub fn reset(&mut self) {
        let background = self.style.background;
        for pixel in self.pixels.pixels_mut() {
            *pixel = background;
        }
        self.revision += 1;
    }

    /// Draw a round-capped, anti-aliased segment. A zero-length segment leaves a dot.
    ///
    /// Returns `false` when nothing on the surface changed.
    pub fn draw_segment(&mut self, from: Point, to: Point) -> bool {
        if !from.is_finite() || !to.is_finite() || self.is_empty() {
            return false;
        }
        let radius = (self.style.width * 0.5).max(0.0);
        let reach = radius + 1.0;
        let min_x = (from.x.min(to.x) - reach).floor().max(0.0);
        let min_y = (from.y.min(to.y) - reach).floor().max(0.0);
        let max_x = (from.x.max(to.x) + reach).ceil().min(self.width() as f32 - 1.0);
        let max_y = (from.y.max(to.y) + reach).ceil().min(self.height() as f32 - 1.0);
        if min_x > max_x || min_y > max_y {
            return false;
        }

        let ink = self.style.ink;
        let mut changed = false;
        for y in min_y as u32..=max_y as u32 {
            for x in min_x as u32..=max_x as u32 {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (radius + 0.5 - distance_to_segment(center, from, to)).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let pixel = self.pixels.get_pixel_mut(x, y);
                let blended = blend(*pixel, ink, coverage);
                if blended != *pixel {
                    *pixel = blended;
                    changed = true;
                }
            }
        }
        if changed {
            self.revision += 1;
        }
        changed
    }

    /// Stretch an image over the whole surface, compositing it onto the background.
    pub fn paint_image(&mut self, source: &RgbaImage) {
        if self.is_empty() || source.width() == 0 || source.height() == 0 {
            return;
        }
        let scaled = imageops::resize(
            source,
            self.width(),
            self.height(),
            imageops::FilterType::Triangle,
        );
        let background = self.style.background;
        for (dest, src) in self.pixels.pixels_mut().zip(scaled.pixels()) {
            let coverage = src.0[3] as f32 / 255.0;
            *dest = blend(background, opaque(*src), coverage);
        }
        self.revision += 1;
    }

    /// Convert the raster into an egui image for display.
    pub fn color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(
            [self.width() as usize, self.height() as usize],
            self.pixels.as_raw(),
        )
    }
}

fn opaque(color: Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, _] = color.0;
    Rgba([r, g, b, 255])
}

fn blend(base: Rgba<u8>, ink: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let mix = |from: u8, to: u8| {
        let value = from as f32 + (to as f32 - from as f32) * coverage;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        mix(base.0[0], ink.0[0]),
        mix(base.0[1], ink.0[1]),
        mix(base.0[2], ink.0[2]),
        255,
    ])
}

fn distance_to_segment(point: Point, from: Point, to: Point) -> f32 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq <= f32::EPSILON {
        0.0
    } else {
        (((point.x - from.x) * dx + (point.y - from.y) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let nearest_x = from.x + t * dx;
    let nearest_y = from.y + t * dy;
    ((point.x - nearest_x).powi(2) + (point.y - nearest_y).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(width: u32, height: u32) -> DrawingSurface {
        DrawingSurface::new(width, height, StrokeStyle::default())
    }

    #[test]
    fn new_surface_is_opaque_background() {
        let surface = surface(8, 6);
        assert_eq!((surface.width(), surface.height()), (8, 6));
        assert!(surface.pixels().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn translucent_style_colors_are_forced_opaque() {
        let style = StrokeStyle {
            width: 4.0,
            ink: Rgba([10, 20, 30, 0]),
            background: Rgba([200, 200, 200, 12]),
        };
        let mut surface = DrawingSurface::new(10, 10, style);
        surface.draw_segment(Point::new(1.0, 5.0), Point::new(9.0, 5.0));
        assert!(surface.pixels().pixels().all(|p| p.0[3] == 255));
        assert_eq!(*surface.pixels().get_pixel(5, 5), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn segment_inks_its_path_and_leaves_far_pixels_alone() {
        let mut surface = surface(40, 40);
        assert!(surface.draw_segment(Point::new(5.0, 20.0), Point::new(35.0, 20.0)));
        assert_eq!(*surface.pixels().get_pixel(20, 20), BLACK);
        assert_eq!(*surface.pixels().get_pixel(20, 2), WHITE);
        assert_eq!(*surface.pixels().get_pixel(20, 38), WHITE);
    }

    #[test]
    fn caps_are_round() {
        let mut surface = surface(40, 40);
        surface.draw_segment(Point::new(20.0, 20.0), Point::new(30.0, 20.0));
        // Cap extends half the stroke width past the start point on the axis...
        assert_eq!(*surface.pixels().get_pixel(13, 19), BLACK);
        // ...but not into the square corner a butt/square cap would cover.
        assert_eq!(*surface.pixels().get_pixel(12, 12), WHITE);
    }

    #[test]
    fn zero_length_segment_leaves_a_dot() {
        let mut surface = surface(30, 30);
        assert!(surface.draw_segment(Point::new(15.0, 15.0), Point::new(15.0, 15.0)));
        assert_eq!(*surface.pixels().get_pixel(15, 15), BLACK);
    }

    #[test]
    fn segment_outside_bounds_is_ignored() {
        let mut surface = surface(20, 20);
        let before = surface.revision();
        assert!(!surface.draw_segment(Point::new(-100.0, -100.0), Point::new(-80.0, -90.0)));
        assert!(!surface.draw_segment(Point::new(f32::NAN, 1.0), Point::new(2.0, 2.0)));
        assert_eq!(surface.revision(), before);
        assert!(surface.pixels().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn reset_restores_background_and_bumps_revision() {
        let mut surface = surface(20, 20);
        surface.draw_segment(Point::new(2.0, 2.0), Point::new(18.0, 18.0));
        let drawn = surface.revision();
        surface.reset();
        assert!(surface.revision() > drawn);
        assert!(surface.pixels().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn paint_image_composites_transparency_over_background() {
        let mut surface = surface(4, 4);
        let source = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        surface.paint_image(&source);
        assert!(surface.pixels().pixels().all(|p| *p == WHITE));

        let source = RgbaImage::from_pixel(2, 2, BLACK);
        surface.paint_image(&source);
        assert!(surface.pixels().pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn color_image_matches_surface_size() {
        let surface = surface(12, 7);
        let image = surface.color_image();
        assert_eq!(image.size, [12, 7]);
        assert_eq!(image.pixels.len(), 84);
    }
}
