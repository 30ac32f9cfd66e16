//! Pointer/touch stroke capture as an explicit Idle/Drawing state machine.

use crate::surface::{DrawingSurface, Point};

/// Input event delivered by mouse or touch, in device coordinates.
///
/// Touch start/move/end map onto the same three events as mouse down/move/up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    /// Ends the stroke wherever it happens, including outside the surface.
    Up,
}

/// Whether the pen is currently on the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PenState {
    #[default]
    Idle,
    Drawing {
        /// Last recorded point, already in surface coordinates.
        last: Point,
    },
}

/// A segment emitted while drawing, in surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// Where the surface is displayed, used to map device points onto surface pixels.
///
/// The surface may be shown stretched or shrunk by layout; device points are
/// offset by the displayed origin then scaled by `surface size / displayed size`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceLayout {
    pub origin: Point,
    pub displayed_width: f32,
    pub displayed_height: f32,
}

impl SurfaceLayout {
    pub fn new(origin: Point, displayed_width: f32, displayed_height: f32) -> Self {
        Self {
            origin,
            displayed_width,
            displayed_height,
        }
    }

    /// Layout that shows the surface unscaled at the device origin.
    pub fn unscaled(surface: &DrawingSurface) -> Self {
        Self::new(
            Point::new(0.0, 0.0),
            surface.width() as f32,
            surface.height() as f32,
        )
    }

    /// Translate a device point into surface coordinates.
    pub fn to_surface(&self, device: Point, surface: &DrawingSurface) -> Point {
        let scale_x = axis_scale(surface.width(), self.displayed_width);
        let scale_y = axis_scale(surface.height(), self.displayed_height);
        Point::new(
            (device.x - self.origin.x) * scale_x,
            (device.y - self.origin.y) * scale_y,
        )
    }

    /// Whether a device point falls inside the displayed surface.
    pub fn contains(&self, device: Point) -> bool {
        device.x >= self.origin.x
            && device.y >= self.origin.y
            && device.x <= self.origin.x + self.displayed_width
            && device.y <= self.origin.y + self.displayed_height
    }
}

fn axis_scale(surface_extent: u32, displayed_extent: f32) -> f32 {
    if displayed_extent.is_finite() && displayed_extent > 0.0 {
        surface_extent as f32 / displayed_extent
    } else {
        1.0
    }
}

/// Turns pointer events into segments drawn onto a [`DrawingSurface`].
#[derive(Clone, Debug)]
pub struct StrokeCapture {
    state: PenState,
    layout: SurfaceLayout,
}

impl StrokeCapture {
    pub fn new(layout: SurfaceLayout) -> Self {
        Self {
            state: PenState::Idle,
            layout,
        }
    }

    pub fn state(&self) -> PenState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, PenState::Drawing { .. })
    }

    pub fn layout(&self) -> SurfaceLayout {
        self.layout
    }

    /// Update the displayed geometry; an in-progress stroke keeps its last point.
    pub fn set_layout(&mut self, layout: SurfaceLayout) {
        self.layout = layout;
    }

    /// Advance the state machine, drawing onto `surface` when a segment is emitted.
    pub fn handle(&mut self, event: PointerEvent, surface: &mut DrawingSurface) -> Option<Segment> {
        match (self.state, event) {
            (_, PointerEvent::Down(device)) => {
                let last = self.layout.to_surface(device, surface);
                self.state = PenState::Drawing { last };
                None
            }
            (PenState::Drawing { last }, PointerEvent::Move(device)) => {
                let next = self.layout.to_surface(device, surface);
                surface.draw_segment(last, next);
                self.state = PenState::Drawing { last: next };
                Some(Segment {
                    from: last,
                    to: next,
                })
            }
            (PenState::Idle, PointerEvent::Move(_)) => None,
            (_, PointerEvent::Up) => {
                self.state = PenState::Idle;
                None
            }
        }
    }

    /// Drop any in-progress stroke without drawing.
    pub fn cancel(&mut self) {
        self.state = PenState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{BLACK, StrokeStyle, WHITE};

    fn surface() -> DrawingSurface {
        DrawingSurface::new(100, 100, StrokeStyle::default())
    }

    #[test]
    fn starts_idle_and_ignores_moves() {
        let mut surface = surface();
        let mut capture = StrokeCapture::new(SurfaceLayout::unscaled(&surface));
        assert_eq!(capture.state(), PenState::Idle);
        assert_eq!(
            capture.handle(PointerEvent::Move(Point::new(50.0, 50.0)), &mut surface),
            None
        );
        assert!(surface.pixels().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn down_move_up_draws_one_segment_per_move() {
        let mut surface = surface();
        let mut capture = StrokeCapture::new(SurfaceLayout::unscaled(&surface));

        assert_eq!(
            capture.handle(PointerEvent::Down(Point::new(10.0, 10.0)), &mut surface),
            None
        );
        assert!(capture.is_drawing());
        assert!(surface.pixels().pixels().all(|p| *p == WHITE));

        let first = capture.handle(PointerEvent::Move(Point::new(50.0, 10.0)), &mut surface);
        assert_eq!(
            first,
            Some(Segment {
                from: Point::new(10.0, 10.0),
                to: Point::new(50.0, 10.0),
            })
        );
        let second = capture.handle(PointerEvent::Move(Point::new(50.0, 60.0)), &mut surface);
        assert_eq!(second.map(|s| s.from), Some(Point::new(50.0, 10.0)));
        assert_eq!(*surface.pixels().get_pixel(30, 10), BLACK);
        assert_eq!(*surface.pixels().get_pixel(50, 40), BLACK);

        capture.handle(PointerEvent::Up, &mut surface);
        assert_eq!(capture.state(), PenState::Idle);
        assert_eq!(
            capture.handle(PointerEvent::Move(Point::new(90.0, 90.0)), &mut surface),
            None
        );
        assert_eq!(*surface.pixels().get_pixel(90, 90), WHITE);
    }

    #[test]
    fn device_points_are_scaled_into_surface_space() {
        let mut surface = surface();
        // Surface is shown at half size, offset by (200, 100).
        let layout = SurfaceLayout::new(Point::new(200.0, 100.0), 50.0, 50.0);
        let mut capture = StrokeCapture::new(layout);

        capture.handle(PointerEvent::Down(Point::new(205.0, 125.0)), &mut surface);
        let segment = capture
            .handle(PointerEvent::Move(Point::new(245.0, 125.0)), &mut surface)
            .unwrap();

        assert_eq!(segment.from, Point::new(10.0, 50.0));
        assert_eq!(segment.to, Point::new(90.0, 50.0));
        assert_eq!(*surface.pixels().get_pixel(50, 50), BLACK);
    }

    #[test]
    fn degenerate_layout_falls_back_to_unit_scale() {
        let surface = surface();
        let layout = SurfaceLayout::new(Point::new(0.0, 0.0), 0.0, f32::NAN);
        assert_eq!(
            layout.to_surface(Point::new(12.0, 7.0), &surface),
            Point::new(12.0, 7.0)
        );
    }

    #[test]
    fn up_outside_surface_still_ends_stroke() {
        let mut surface = surface();
        let layout = SurfaceLayout::unscaled(&surface);
        let mut capture = StrokeCapture::new(layout);
        capture.handle(PointerEvent::Down(Point::new(10.0, 10.0)), &mut surface);
        assert!(!layout.contains(Point::new(500.0, 500.0)));
        capture.handle(PointerEvent::Up, &mut surface);
        assert!(!capture.is_drawing());
    }
}
