use std::path::PathBuf;
use std::time::Duration;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::defaults::{
    clamp_grid_side, clamp_stroke_width, clamp_surface_side, clamp_timeout_seconds,
    default_endpoint, default_grid_side, default_stroke_width, default_surface_side,
    default_timeout_seconds,
};

/// Aggregate sketchpad settings loaded from disk.
///
/// Config keys (TOML): `classifier`, `surface`, `features`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub surface: SurfaceSettings,
    #[serde(default)]
    pub features: FeatureSettings,
}

impl AppConfig {
    /// Clamp every numeric setting into its supported range.
    pub fn normalized(mut self) -> Self {
        self.classifier.timeout_seconds = clamp_timeout_seconds(self.classifier.timeout_seconds);
        self.surface.width = clamp_surface_side(self.surface.width);
        self.surface.height = clamp_surface_side(self.surface.height);
        self.surface.stroke_width = clamp_stroke_width(self.surface.stroke_width);
        self.features.rows = clamp_grid_side(self.features.rows);
        self.features.columns = clamp_grid_side(self.features.columns);
        self
    }
}

/// Remote classifier endpoint settings.
///
/// Config keys: `endpoint`, `timeout_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// URL that receives both train and predict requests.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Read timeout for a single request.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl ClassifierSettings {
    /// Parse the configured endpoint into a URL.
    pub fn endpoint_url(&self) -> Result<url::Url, ConfigError> {
        url::Url::parse(self.endpoint.trim()).map_err(|source| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            source,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Drawing surface resolution and pen width.
///
/// Config keys: `width`, `height`, `stroke_width`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSettings {
    #[serde(default = "default_surface_side")]
    pub width: u32,
    #[serde(default = "default_surface_side")]
    pub height: u32,
    /// Pen diameter in surface pixels.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            width: default_surface_side(),
            height: default_surface_side(),
            stroke_width: default_stroke_width(),
        }
    }
}

/// Downscaled grid shape and the interpolation used to reach it.
///
/// Config keys: `rows`, `columns`, `filter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSettings {
    #[serde(default = "default_grid_side")]
    pub rows: u32,
    #[serde(default = "default_grid_side")]
    pub columns: u32,
    #[serde(default)]
    pub filter: ResizeFilter,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            rows: default_grid_side(),
            columns: default_grid_side(),
            filter: ResizeFilter::default(),
        }
    }
}

/// Interpolation applied when shrinking the surface onto the feature grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResizeFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    #[error("Invalid classifier endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },
    #[error("No suitable config directory: {0}")]
    AppDir(#[from] crate::app_dirs::AppDirError),
}
