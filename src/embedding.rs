//! Frame embedding.
//!
//! [`FrameEmbedder`] is the seam between the segmentation core and whatever
//! image-embedding model the caller wants to use. The model is an explicit
//! object owned by the caller and passed by reference into the pipeline — no
//! process-global model state — so test doubles and alternative backends plug
//! in without touching the core.
//!
//! [`GridEmbedder`] is the built-in default: an average-luminance grid that
//! captures coarse composition and lighting. It is cheap, deterministic, and
//! good enough to separate hard cuts in screen-recorded or slide-driven
//! footage; callers with a pretrained CNN backend implement [`FrameEmbedder`]
//! over it for finer-grained similarity.

use image::RgbImage;

use crate::error::ChapterizeError;

/// An image-embedding model.
///
/// Implementations must be deterministic and side-effect-free: embedding the
/// same frame twice yields the same vector, and every vector has exactly
/// [`dimensions`](FrameEmbedder::dimensions) elements.
pub trait FrameEmbedder {
    /// Fixed length of every vector this model produces.
    fn dimensions(&self) -> usize;

    /// Map a decoded frame to its embedding vector.
    fn embed(&self, image: &RgbImage) -> Result<Vec<f32>, ChapterizeError>;
}

/// Average-luminance grid embedder.
///
/// Divides the frame into an N×N grid and emits one normalized mean-luminance
/// value per cell, row-major. The default 16×16 grid yields 256 dimensions.
#[derive(Debug, Clone)]
pub struct GridEmbedder {
    grid_size: u32,
}

impl Default for GridEmbedder {
    fn default() -> Self {
        Self { grid_size: 16 }
    }
}

impl GridEmbedder {
    /// Create a grid embedder with the default 16×16 grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid size (clamped to at least 1).
    pub fn grid_size(mut self, grid_size: u32) -> Self {
        self.grid_size = grid_size.max(1);
        self
    }
}

impl FrameEmbedder for GridEmbedder {
    fn dimensions(&self) -> usize {
        (self.grid_size * self.grid_size) as usize
    }

    fn embed(&self, image: &RgbImage) -> Result<Vec<f32>, ChapterizeError> {
        let (width, height) = image.dimensions();
        let grid = self.grid_size;
        let mut vector = Vec::with_capacity(self.dimensions());

        for cell_y in 0..grid {
            for cell_x in 0..grid {
                // Cell bounds in pixel space; narrow frames leave trailing
                // cells empty, which embed as 0.
                let x_start = cell_x * width / grid;
                let x_end = ((cell_x + 1) * width / grid).min(width);
                let y_start = cell_y * height / grid;
                let y_end = ((cell_y + 1) * height / grid).min(height);

                let mut sum = 0u64;
                let mut count = 0u64;
                for y in y_start..y_end {
                    for x in x_start..x_end {
                        let pixel = image.get_pixel(x, y);
                        // ITU-R BT.601 integer luma.
                        let luma = (pixel[0] as u64 * 299
                            + pixel[1] as u64 * 587
                            + pixel[2] as u64 * 114)
                            / 1000;
                        sum += luma;
                        count += 1;
                    }
                }

                let mean = if count > 0 { sum as f64 / count as f64 } else { 0.0 };
                vector.push((mean / 255.0) as f32);
            }
        }

        Ok(vector)
    }
}
