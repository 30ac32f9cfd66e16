//! Library exports for the sketchpad binaries, benchmarks and tests.
/// Application directory resolution.
pub mod app_dirs;
/// Remote classifier client and wire types.
pub mod classifier;
/// Persistent TOML settings.
pub mod config;
/// egui window, controller and UI state.
pub mod egui_app;
/// Surface downscaling into feature vectors.
pub mod features;
mod http_client;
/// Tracing subscriber setup.
pub mod logging;
/// Explicit drawing session object.
pub mod session;
/// Pointer/touch stroke state machine.
pub mod stroke;
/// Drawing raster and segment rasterization.
pub mod surface;
