//! Sketch session: the drawing surface, pen state and extractor owned together.

use crate::classifier::{DigitLabel, InvalidLabel, PredictRequest, TrainRequest};
use crate::config::AppConfig;
use crate::features::{FeatureError, FeatureExtractor, FeatureVector, GridSize};
use crate::stroke::{PointerEvent, StrokeCapture, SurfaceLayout};
use crate::surface::{DrawingSurface, StrokeStyle};

/// Reasons a request could not be built from the current drawing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Label(#[from] InvalidLabel),
    #[error(transparent)]
    Features(#[from] FeatureError),
}

/// One user's drawing session.
#[derive(Clone, Debug)]
pub struct SketchSession {
    surface: DrawingSurface,
    capture: StrokeCapture,
    extractor: FeatureExtractor,
}

impl SketchSession {
    /// Build a session sized and styled from config.
    pub fn new(config: &AppConfig) -> Self {
        let style = StrokeStyle {
            width: config.surface.stroke_width,
            ..StrokeStyle::default()
        };
        let surface = DrawingSurface::new(config.surface.width, config.surface.height, style);
        let extractor = FeatureExtractor::new(
            GridSize::new(config.features.rows, config.features.columns),
            config.features.filter.filter_type(),
        );
        Self::from_parts(surface, extractor)
    }

    pub fn from_parts(surface: DrawingSurface, extractor: FeatureExtractor) -> Self {
        let capture = StrokeCapture::new(SurfaceLayout::unscaled(&surface));
        Self {
            surface,
            capture,
            extractor,
        }
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DrawingSurface {
        &mut self.surface
    }

    pub fn grid(&self) -> GridSize {
        self.extractor.grid()
    }

    pub fn is_drawing(&self) -> bool {
        self.capture.is_drawing()
    }

    pub fn set_layout(&mut self, layout: SurfaceLayout) {
        self.capture.set_layout(layout);
    }

    /// Feed one input event; returns whether a segment was drawn.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        self.capture.handle(event, &mut self.surface).is_some()
    }

    /// Clear the drawing and drop any stroke in progress.
    pub fn reset(&mut self) {
        self.capture.cancel();
        self.surface.reset();
        tracing::debug!("Surface reset");
    }

    pub fn features(&self) -> Result<FeatureVector, FeatureError> {
        self.extractor.extract(&self.surface)
    }

    /// Validate the label text and pair it with the current drawing.
    ///
    /// The label is checked before any pixels are read.
    pub fn train_request(&self, label_text: &str) -> Result<TrainRequest, SubmitError> {
        let label = DigitLabel::parse(label_text)?;
        Ok(TrainRequest::single(label, self.features()?))
    }

    pub fn predict_request(&self) -> Result<PredictRequest, SubmitError> {
        Ok(PredictRequest::new(self.features()?))
    }
}
