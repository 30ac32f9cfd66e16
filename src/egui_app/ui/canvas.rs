use super::EguiApp;
use super::style;
use crate::stroke::{PointerEvent, SurfaceLayout};
use crate::surface::Point;
use eframe::egui::{
    self, Color32, Event, PointerButton, Pos2, Rect, Sense, StrokeKind, TextureOptions, Ui, Vec2,
};

impl EguiApp {
    /// Draw the surface scaled to fit the panel and route pointer input into it.
    pub(super) fn render_canvas(&mut self, ui: &mut Ui) {
        let surface = self.controller.session().surface();
        let surface_size = Vec2::new(surface.width() as f32, surface.height() as f32);
        let rect = fit_rect(ui.available_rect_before_wrap(), surface_size);
        ui.allocate_rect(rect, Sense::click_and_drag());

        self.controller.set_surface_layout(SurfaceLayout::new(
            to_point(rect.min),
            rect.width(),
            rect.height(),
        ));
        let events = ui.input(|input| pointer_events(&input.events, rect));
        for event in events {
            self.controller.handle_pointer(event);
        }

        let texture = self.surface_texture(ui.ctx());
        let painter = ui.painter();
        painter.image(
            texture,
            rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );
        painter.rect_stroke(
            rect,
            0.0,
            style::canvas_border(self.controller.session().is_drawing()),
            StrokeKind::Outside,
        );
    }

    /// Upload the surface pixels when they changed since the last frame.
    fn surface_texture(&mut self, ctx: &egui::Context) -> egui::TextureId {
        let surface = self.controller.session().surface();
        let revision = surface.revision();
        let texture = match self.surface_tex.take() {
            Some(mut texture) => {
                if self.surface_tex_revision != revision {
                    texture.set(surface.color_image(), TextureOptions::LINEAR);
                }
                texture
            }
            None => ctx.load_texture(
                "drawing_surface",
                surface.color_image(),
                TextureOptions::LINEAR,
            ),
        };
        let id = texture.id();
        self.surface_tex = Some(texture);
        self.surface_tex_revision = revision;
        id
    }
}

/// Largest rect with the surface's aspect ratio centered inside `available`.
fn fit_rect(available: Rect, surface_size: Vec2) -> Rect {
    if surface_size.x <= 0.0 || surface_size.y <= 0.0 {
        return Rect::from_min_size(available.min, Vec2::ZERO);
    }
    let scale = (available.width() / surface_size.x)
        .min(available.height() / surface_size.y)
        .max(0.05);
    Rect::from_center_size(available.center(), surface_size * scale)
}

/// Translate raw egui input into stroke events.
///
/// A press only starts a stroke inside the surface; a release or the pointer
/// leaving the window ends it anywhere. Touch input arrives as the same events.
fn pointer_events(events: &[Event], rect: Rect) -> Vec<PointerEvent> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::PointerButton {
                pos,
                button: PointerButton::Primary,
                pressed: true,
                ..
            } if rect.contains(*pos) => Some(PointerEvent::Down(to_point(*pos))),
            Event::PointerButton {
                button: PointerButton::Primary,
                pressed: false,
                ..
            } => Some(PointerEvent::Up),
            Event::PointerMoved(pos) => Some(PointerEvent::Move(to_point(*pos))),
            Event::PointerGone => Some(PointerEvent::Up),
            _ => None,
        })
        .collect()
}

fn to_point(pos: Pos2) -> Point {
    Point::new(pos.x, pos.y)
}
