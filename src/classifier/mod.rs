//! Train/predict exchange with the remote digit classifier.

mod label;

pub mod api;

pub use api::{
    ClassifierClient, ClassifierError, ClassifierOutcome, ClassifierRequest, PredictRequest,
    RequestKind, TrainRequest,
};
pub use label::{DigitLabel, InvalidLabel, LABEL_HINT};
