//! egui renderer for the sketchpad.

mod canvas;
pub mod style;

use std::time::Duration;

use crate::config::ConfigError;
use crate::egui_app::controller::EguiController;
use eframe::egui::{self, Frame, Key, RichText, TextureHandle, Ui, Vec2};

/// Smallest window that still fits the controls next to a usable canvas.
pub const MIN_VIEWPORT_SIZE: Vec2 = Vec2::new(420.0, 320.0);
const JOB_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Renders the egui UI using the shared controller state.
pub struct EguiApp {
    controller: EguiController,
    visuals_set: bool,
    surface_tex: Option<TextureHandle>,
    surface_tex_revision: u64,
}

impl EguiApp {
    /// Create the app from persisted configuration.
    pub fn new() -> Result<Self, String> {
        let controller = EguiController::load()
            .map_err(|err: ConfigError| format!("Failed to load config: {err}"))?;
        Ok(Self::with_controller(controller))
    }

    pub fn with_controller(controller: EguiController) -> Self {
        Self {
            controller,
            visuals_set: false,
            surface_tex: None,
            surface_tex_revision: 0,
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        style::apply_visuals(&mut visuals);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }

    /// Escape clears the canvas unless a text field has focus; that Escape only drops focus.
    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let text_focused = ctx.memory(|m| m.focused().is_some());
        if !text_focused && ctx.input(|i| i.key_pressed(Key::Escape)) {
            self.controller.reset_surface();
        }
    }

    fn render_status(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::TopBottomPanel::bottom("status_bar")
            .frame(Frame::NONE.fill(palette.bg_primary))
            .show(ctx, |ui| {
                let status = &self.controller.ui.status;
                ui.horizontal(|ui| {
                    ui.add_space(8.0);
                    ui.painter().circle_filled(
                        ui.cursor().min + egui::vec2(9.0, 11.0),
                        9.0,
                        status.badge_color,
                    );
                    ui.add_space(24.0);
                    ui.label(RichText::new(&status.badge_label).color(palette.text_primary));
                    ui.separator();
                    ui.label(RichText::new(&status.text).color(palette.text_primary));
                });
            });
    }

    fn render_controls(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("controls")
            .resizable(false)
            .default_width(150.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                self.render_label_field(ui);
                ui.add_space(8.0);
                self.render_actions(ui);
                ui.add_space(16.0);
                self.render_prediction(ui);
            });
    }

    fn render_label_field(&mut self, ui: &mut Ui) {
        ui.label("Digit label");
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.controller.ui.label_input)
                .hint_text("0–9")
                .desired_width(64.0),
        );
        if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
            self.controller.submit_train();
        }
    }

    fn render_actions(&mut self, ui: &mut Ui) {
        let idle = !self.controller.request_in_flight();
        if ui
            .add_enabled(idle, egui::Button::new("Train"))
            .on_hover_text("Send the drawing with its label")
            .clicked()
        {
            self.controller.submit_train();
        }
        if ui
            .add_enabled(idle, egui::Button::new("Predict"))
            .on_hover_text("Ask the classifier which digit this is")
            .clicked()
        {
            self.controller.submit_predict();
        }
        if ui.button("Reset").on_hover_text("Clear the canvas (Esc)").clicked() {
            self.controller.reset_surface();
        }
    }

    fn render_prediction(&mut self, ui: &mut Ui) {
        let palette = style::palette();
        ui.label(RichText::new("Prediction").color(palette.text_muted));
        let text = self
            .controller
            .ui
            .last_prediction
            .map(|digit| digit.to_string())
            .unwrap_or_else(|| "–".to_string());
        ui.label(RichText::new(text).size(56.0).color(palette.accent_mint));
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll_jobs();
        self.apply_visuals(ctx);
        self.handle_shortcuts(ctx);
        self.render_status(ctx);
        self.render_controls(ctx);
        egui::CentralPanel::default().show(ctx, |ui| self.render_canvas(ui));
        if self.controller.request_in_flight() {
            ctx.request_repaint_after(JOB_POLL_INTERVAL);
        }
    }
}
