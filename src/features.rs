//! Downscale a drawing surface into a normalized ink-intensity grid.

use image::{Rgba, imageops, imageops::FilterType};
use serde::{Serialize, Serializer};

use crate::surface::DrawingSurface;

/// Luminance weights applied to the red, green and blue channels.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Errors produced while extracting features.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FeatureError {
    #[error("Drawing surface is empty ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },
    #[error("Feature grid must have at least one row and one column ({rows}x{columns})")]
    EmptyGrid { rows: u32, columns: u32 },
}

/// Shape of the downscaled grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    pub rows: u32,
    pub columns: u32,
}

impl GridSize {
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Number of cells, which is also the feature vector length.
    pub fn cells(self) -> usize {
        self.rows as usize * self.columns as usize
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(20, 20)
    }
}

/// Row-major ink intensities in `[0, 1]`; ink ≈ 1, background ≈ 0.
///
/// Serializes as a plain array of numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector {
    grid: GridSize,
    values: Vec<f32>,
}

impl FeatureVector {
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, row: u32, column: u32) -> Option<f32> {
        if row >= self.grid.rows || column >= self.grid.columns {
            return None;
        }
        self.values
            .get(row as usize * self.grid.columns as usize + column as usize)
            .copied()
    }

    /// Total ink over the grid; zero for a blank drawing.
    pub fn ink_mass(&self) -> f32 {
        self.values.iter().sum()
    }

    /// Text preview of the grid, one line per row, darker glyphs for more ink.
    pub fn to_ascii(&self) -> String {
        const SHADES: [char; 5] = [' ', '.', ':', '*', '#'];
        let columns = self.grid.columns.max(1) as usize;
        self.values
            .chunks(columns)
            .map(|row| {
                row.iter()
                    .map(|value| {
                        let index = (value * (SHADES.len() - 1) as f32).round() as usize;
                        SHADES[index.min(SHADES.len() - 1)]
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.values)
    }
}

/// Converts surfaces into fixed-length feature vectors.
#[derive(Clone, Copy, Debug)]
pub struct FeatureExtractor {
    grid: GridSize,
    filter: FilterType,
}

impl FeatureExtractor {
    pub fn new(grid: GridSize, filter: FilterType) -> Self {
        Self { grid, filter }
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// Scale the surface down to the grid and read back inverted luminance.
    pub fn extract(&self, surface: &DrawingSurface) -> Result<FeatureVector, FeatureError> {
        if surface.is_empty() {
            return Err(FeatureError::EmptySurface {
                width: surface.width(),
                height: surface.height(),
            });
        }
        if self.grid.cells() == 0 {
            return Err(FeatureError::EmptyGrid {
                rows: self.grid.rows,
                columns: self.grid.columns,
            });
        }
        let scaled = imageops::resize(
            surface.pixels(),
            self.grid.columns,
            self.grid.rows,
            self.filter,
        );
        let background = surface.style().background;
        let values = scaled
            .pixels()
            .map(|pixel| 1.0 - luminance(flatten(*pixel, background)))
            .map(|value| value.clamp(0.0, 1.0))
            .collect::<Vec<_>>();
        debug_assert_eq!(values.len(), self.grid.cells());
        Ok(FeatureVector {
            grid: self.grid,
            values,
        })
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(GridSize::default(), FilterType::Triangle)
    }
}

/// Perceptual luminance of an RGB color, normalized to `[0, 1]`.
pub fn luminance(rgb: [u8; 3]) -> f32 {
    let weighted: f32 = rgb
        .iter()
        .zip(LUMA_WEIGHTS)
        .map(|(channel, weight)| *channel as f32 * weight)
        .sum();
    (weighted / 255.0).clamp(0.0, 1.0)
}

fn flatten(pixel: Rgba<u8>, background: Rgba<u8>) -> [u8; 3] {
    let alpha = pixel.0[3] as f32 / 255.0;
    let mix = |channel: usize| {
        let value = pixel.0[channel] as f32 * alpha + background.0[channel] as f32 * (1.0 - alpha);
        value.round().clamp(0.0, 255.0) as u8
    };
    [mix(0), mix(1), mix(2)]
}
