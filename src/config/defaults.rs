pub(super) const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/ocr";

pub(super) const MIN_SURFACE_SIDE: u32 = 20;
pub(super) const MAX_SURFACE_SIDE: u32 = 2048;
pub(super) const MAX_GRID_SIDE: u32 = 256;
pub(super) const MIN_TIMEOUT_SECONDS: u64 = 1;
pub(super) const MAX_TIMEOUT_SECONDS: u64 = 300;
pub(super) const MIN_STROKE_WIDTH: f32 = 1.0;
pub(super) const MAX_STROKE_WIDTH: f32 = 128.0;

pub(super) fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

pub(super) fn default_timeout_seconds() -> u64 {
    30
}

pub(super) fn default_surface_side() -> u32 {
    200
}

pub(super) fn default_stroke_width() -> f32 {
    16.0
}

pub(super) fn default_grid_side() -> u32 {
    20
}

pub(super) fn clamp_surface_side(value: u32) -> u32 {
    value.clamp(MIN_SURFACE_SIDE, MAX_SURFACE_SIDE)
}

pub(super) fn clamp_grid_side(value: u32) -> u32 {
    value.clamp(1, MAX_GRID_SIDE)
}

pub(super) fn clamp_timeout_seconds(value: u64) -> u64 {
    value.clamp(MIN_TIMEOUT_SECONDS, MAX_TIMEOUT_SECONDS)
}

pub(super) fn clamp_stroke_width(value: f32) -> f32 {
    if !value.is_finite() {
        return default_stroke_width();
    }
    value.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
}
