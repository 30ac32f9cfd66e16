//! JSON client for the remote digit classifier.
//!
//! Both actions POST to the same endpoint:
//! - train: `{"train": true, "trainArray": [{"y0": [..], "label": 5}]}`
//! - predict: `{"predict": true, "image": [..]}`, answered by
//!   `{"type": "test", "result": 7}` or `{"error": "..."}`.

use serde::{Deserialize, Serialize};
use url::Url;

use super::label::DigitLabel;
use crate::config::{ClassifierSettings, ConfigError};
use crate::features::FeatureVector;
use crate::http_client;

const MAX_RESPONSE_BYTES: usize = 64 * 1024;
const MAX_LOGGED_BODY_CHARS: usize = 512;

/// One labelled drawing inside a train request.
#[derive(Clone, Debug, Serialize)]
pub struct TrainSample {
    #[serde(rename = "y0")]
    pub pixels: FeatureVector,
    pub label: DigitLabel,
}

#[derive(Clone, Debug, Serialize)]
pub struct TrainRequest {
    train: bool,
    #[serde(rename = "trainArray")]
    samples: Vec<TrainSample>,
}

impl TrainRequest {
    /// Request that trains on a single drawing.
    pub fn single(label: DigitLabel, pixels: FeatureVector) -> Self {
        Self {
            train: true,
            samples: vec![TrainSample { pixels, label }],
        }
    }

    pub fn samples(&self) -> &[TrainSample] {
        &self.samples
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PredictRequest {
    predict: bool,
    image: FeatureVector,
}

impl PredictRequest {
    pub fn new(image: FeatureVector) -> Self {
        Self {
            predict: true,
            image,
        }
    }

    pub fn image(&self) -> &FeatureVector {
        &self.image
    }
}

/// Which action a request performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    Train,
    Predict,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Predict => "predict",
        }
    }
}

#[derive(Clone, Debug)]
pub enum ClassifierRequest {
    Train(TrainRequest),
    Predict(PredictRequest),
}

impl ClassifierRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Train(_) => RequestKind::Train,
            Self::Predict(_) => RequestKind::Predict,
        }
    }
}

/// Successful result of a classifier call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassifierOutcome {
    Trained { samples: usize },
    Predicted(DigitLabel),
}

impl ClassifierOutcome {
    /// User-facing summary of the outcome.
    pub fn message(&self) -> String {
        match self {
            Self::Trained { samples: 1 } => "Trained 1 sample".to_string(),
            Self::Trained { samples } => format!("Trained {samples} samples"),
            Self::Predicted(digit) => format!("Prediction: {digit}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("HTTP error: {0}")]
    Transport(String),
    #[error("Server error: {message}")]
    Server { status: u16, message: String },
    #[error("Bad response from server: {0}")]
    BadResponse(String),
    #[error("Request worker failed: {0}")]
    Worker(String),
}

/// Status code and body text of a completed HTTP exchange.
#[derive(Debug)]
struct Reply {
    status: u16,
    body: String,
}

impl Reply {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Loose view of a reply body; the optional fields take whatever JSON the server sends.
#[derive(Debug, Default, Deserialize)]
struct ReplyWire {
    ok: Option<serde_json::Value>,
    result: Option<serde_json::Value>,
    error: Option<serde_json::Value>,
    message: Option<serde_json::Value>,
    trace: Option<serde_json::Value>,
}

impl ReplyWire {
    fn rejected(&self) -> bool {
        self.ok.as_ref().and_then(serde_json::Value::as_bool) == Some(false)
    }
}

/// Blocking client bound to one classifier endpoint.
#[derive(Clone, Debug)]
pub struct ClassifierClient {
    endpoint: Url,
    agent: ureq::Agent,
}

impl ClassifierClient {
    pub fn new(settings: &ClassifierSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: settings.endpoint_url()?,
            agent: http_client::agent(settings.timeout()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn send(&self, request: &ClassifierRequest) -> Result<ClassifierOutcome, ClassifierError> {
        match request {
            ClassifierRequest::Train(request) => self
                .train(request)
                .map(|samples| ClassifierOutcome::Trained { samples }),
            ClassifierRequest::Predict(request) => {
                self.predict(request).map(ClassifierOutcome::Predicted)
            }
        }
    }

    /// Submit labelled drawings; returns how many samples were accepted.
    pub fn train(&self, request: &TrainRequest) -> Result<usize, ClassifierError> {
        tracing::info!(
            samples = request.samples.len(),
            endpoint = %self.endpoint,
            "Sending train request"
        );
        let reply = self.post(request)?;
        parse_train_reply(&reply)?;
        Ok(request.samples.len())
    }

    /// Ask the classifier which digit the drawing shows.
    pub fn predict(&self, request: &PredictRequest) -> Result<DigitLabel, ClassifierError> {
        tracing::info!(
            pixels = request.image.len(),
            endpoint = %self.endpoint,
            "Sending predict request"
        );
        let reply = self.post(request)?;
        parse_predict_reply(&reply)
    }

    fn post<T: Serialize>(&self, body: &T) -> Result<Reply, ClassifierError> {
        let request = self
            .agent
            .post(self.endpoint.as_str())
            .set("Accept", "application/json");
        let response = match request.send_json(body) {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = read_body_limited(response).unwrap_or_else(|err| err);
                return Ok(Reply { status, body });
            }
            Err(ureq::Error::Transport(err)) => {
                tracing::warn!("Classifier request failed: {err}");
                return Err(ClassifierError::Transport(err.to_string()));
            }
        };
        let status = response.status();
        let body = read_body_limited(response).map_err(ClassifierError::BadResponse)?;
        Ok(Reply { status, body })
    }
}

fn read_body_limited(response: ureq::Response) -> Result<String, String> {
    http_client::read_response_text(response, MAX_RESPONSE_BYTES).map_err(|err| err.to_string())
}

fn parse_train_reply(reply: &Reply) -> Result<(), ClassifierError> {
    let trimmed = reply.body.trim();
    let parsed = serde_json::from_str::<ReplyWire>(trimmed).ok();
    let rejected = parsed.as_ref().is_some_and(ReplyWire::rejected);
    if reply.is_success() && !rejected {
        return Ok(());
    }
    let message = parsed
        .and_then(|wire| server_message(&wire))
        .or_else(|| (!trimmed.is_empty()).then(|| truncate_for_log(trimmed)))
        .unwrap_or_else(|| format!("HTTP {}", reply.status));
    tracing::warn!(status = reply.status, "Train request rejected: {message}");
    Err(ClassifierError::Server {
        status: reply.status,
        message,
    })
}

fn parse_predict_reply(reply: &Reply) -> Result<DigitLabel, ClassifierError> {
    let trimmed = reply.body.trim();
    let wire: ReplyWire = serde_json::from_str(trimmed).map_err(|err| {
        tracing::error!(
            status = reply.status,
            "Non-JSON response: {}",
            truncate_for_log(trimmed)
        );
        ClassifierError::BadResponse(err.to_string())
    })?;
    if !reply.is_success() || wire.rejected() {
        match wire.trace.as_ref() {
            Some(serde_json::Value::String(trace)) => {
                tracing::error!("Classifier trace:\n{trace}")
            }
            Some(trace) => tracing::error!("Classifier trace: {trace}"),
            None => {}
        }
        let message = server_message(&wire).unwrap_or_else(|| format!("HTTP {}", reply.status));
        return Err(ClassifierError::Server {
            status: reply.status,
            message,
        });
    }
    let Some(result) = wire.result.as_ref() else {
        if let Some(message) = server_message(&wire) {
            return Err(ClassifierError::Server {
                status: reply.status,
                message,
            });
        }
        return Err(ClassifierError::BadResponse(
            "Missing result in response".to_string(),
        ));
    };
    result_digit(result)
        .and_then(DigitLabel::from_value)
        .ok_or_else(|| ClassifierError::BadResponse(format!("Result is not a digit: {result}")))
}

/// Integral JSON number in `u8` range; `7` and `7.0` both qualify.
fn result_digit(result: &serde_json::Value) -> Option<u8> {
    if let Some(value) = result.as_u64() {
        return u8::try_from(value).ok();
    }
    let value = result.as_f64()?;
    if value.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&value) {
        return None;
    }
    Some(value as u8)
}

fn server_message(wire: &ReplyWire) -> Option<String> {
    [wire.error.as_ref(), wire.message.as_ref()]
        .into_iter()
        .flatten()
        .find_map(message_text)
}

fn message_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) if text.trim().is_empty() => None,
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn truncate_for_log(text: &str) -> String {
    if text.chars().count() <= MAX_LOGGED_BODY_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX_LOGGED_BODY_CHARS).collect();
    format!("{head}…")
}
