//! Owns the sketch session and bridges it to the egui UI and the classifier.

mod jobs;

use crate::classifier::{
    ClassifierClient, ClassifierError, ClassifierOutcome, ClassifierRequest, LABEL_HINT,
    RequestKind,
};
use crate::config::{self, AppConfig, ConfigError};
use crate::egui_app::state::*;
use crate::session::{SketchSession, SubmitError};
use crate::stroke::{PointerEvent, SurfaceLayout};
use jobs::{ClassifierJobResult, ClassifierJobs};

/// Maintains app state and bridges core logic to the egui UI.
pub struct EguiController {
    pub ui: UiState,
    config: AppConfig,
    session: SketchSession,
    client: ClassifierClient,
    jobs: ClassifierJobs,
}

impl EguiController {
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        let client = ClassifierClient::new(&config.classifier)?;
        let session = SketchSession::new(&config);
        tracing::info!(
            width = session.surface().width(),
            height = session.surface().height(),
            endpoint = %client.endpoint(),
            "Sketch session ready"
        );
        Ok(Self {
            ui: UiState::default(),
            config,
            session,
            client,
            jobs: ClassifierJobs::new(),
        })
    }

    /// Build a controller from the persisted configuration.
    pub fn load() -> Result<Self, ConfigError> {
        Self::new(config::load_or_default()?)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &SketchSession {
        &self.session
    }

    pub fn request_in_flight(&self) -> bool {
        self.jobs.in_progress().is_some()
    }

    pub fn set_surface_layout(&mut self, layout: SurfaceLayout) {
        self.session.set_layout(layout);
    }

    /// Forward a pointer/touch event to the stroke state machine.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        self.session.handle(event)
    }

    pub fn reset_surface(&mut self) {
        self.session.reset();
        self.ui.last_prediction = None;
        self.set_status("Canvas cleared", StatusTone::Idle);
    }

    /// Validate the label field and send the drawing as a training sample.
    pub fn submit_train(&mut self) {
        if self.refuse_while_busy() {
            return;
        }
        match self.session.train_request(&self.ui.label_input) {
            Ok(request) => {
                let label = request.samples()[0].label;
                if self.begin_request(ClassifierRequest::Train(request)) {
                    self.set_status(format!("Training on digit {label}…"), StatusTone::Busy);
                }
            }
            Err(SubmitError::Label(err)) => {
                tracing::info!("Train refused: {err}");
                self.set_status(LABEL_HINT, StatusTone::Warning);
            }
            Err(err @ SubmitError::Features(_)) => self.report_feature_error(err),
        }
    }

    /// Send the drawing to the classifier for a prediction.
    pub fn submit_predict(&mut self) {
        if self.refuse_while_busy() {
            return;
        }
        match self.session.predict_request() {
            Ok(request) => {
                if self.begin_request(ClassifierRequest::Predict(request)) {
                    self.set_status("Predicting…", StatusTone::Busy);
                }
            }
            Err(err) => self.report_feature_error(err),
        }
    }

    /// Apply any finished classifier results to the UI state.
    pub fn poll_jobs(&mut self) {
        while let Ok(message) = self.jobs.try_recv() {
            self.apply_job_result(message);
        }
    }

    fn apply_job_result(&mut self, message: ClassifierJobResult) {
        match message.result {
            Ok(outcome) => {
                tracing::info!("{} finished: {}", message.kind.as_str(), outcome.message());
                if let ClassifierOutcome::Predicted(digit) = outcome {
                    self.ui.last_prediction = Some(digit);
                }
                self.set_status(outcome.message(), StatusTone::Info);
            }
            Err(err) => {
                tracing::warn!("{} failed: {err}", message.kind.as_str());
                if message.kind == RequestKind::Predict {
                    self.ui.last_prediction = None;
                }
                self.set_status(failure_text(&err), StatusTone::Error);
            }
        }
    }

    /// Hand the request to a worker; refuses (with a status notice) while another runs.
    fn begin_request(&mut self, request: ClassifierRequest) -> bool {
        if self.jobs.begin(self.client.clone(), request) {
            return true;
        }
        self.refuse_while_busy();
        false
    }

    fn refuse_while_busy(&mut self) -> bool {
        let Some(kind) = self.jobs.in_progress() else {
            return false;
        };
        self.set_status(
            format!("Waiting for the {} request to finish", kind.as_str()),
            StatusTone::Warning,
        );
        true
    }

    fn report_feature_error(&mut self, err: SubmitError) {
        tracing::error!("Feature extraction failed: {err}");
        self.set_status(format!("Cannot read drawing: {err}"), StatusTone::Error);
    }

    fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        self.ui.status = StatusBarState::new(text, tone);
    }
}

fn failure_text(err: &ClassifierError) -> String {
    match err {
        ClassifierError::BadResponse(_) => "Bad response from server".to_string(),
        other => other.to_string(),
    }
}
