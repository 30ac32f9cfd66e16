//! Shared state types for the egui UI.

use crate::classifier::DigitLabel;
use egui::Color32;

/// Top-level UI model consumed by the egui renderer.
#[derive(Clone, Debug)]
pub struct UiState {
    pub status: StatusBarState,
    /// Raw text of the training label field.
    pub label_input: String,
    /// Most recent digit returned by the classifier.
    pub last_prediction: Option<DigitLabel>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status: StatusBarState::idle(),
            label_input: String::new(),
            last_prediction: None,
        }
    }
}

/// Status badge + text shown in the footer.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBarState {
    pub text: String,
    pub badge_label: String,
    pub badge_color: Color32,
    pub tone: StatusTone,
}

impl StatusBarState {
    pub fn idle() -> Self {
        Self::new("Draw a digit, then train or predict", StatusTone::Idle)
    }

    pub fn new(text: impl Into<String>, tone: StatusTone) -> Self {
        let (badge_label, badge_color) = status_badge(tone);
        Self {
            text: text.into(),
            badge_label,
            badge_color,
            tone,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Idle,
    Busy,
    Info,
    Warning,
    Error,
}

fn status_badge(tone: StatusTone) -> (String, Color32) {
    match tone {
        StatusTone::Idle => ("Idle".into(), Color32::from_rgb(42, 42, 42)),
        StatusTone::Busy => ("Sending".into(), Color32::from_rgb(31, 139, 255)),
        StatusTone::Info => ("Info".into(), Color32::from_rgb(64, 140, 112)),
        StatusTone::Warning => ("Warning".into(), Color32::from_rgb(192, 138, 43)),
        StatusTone::Error => ("Error".into(), Color32::from_rgb(192, 57, 43)),
    }
}
