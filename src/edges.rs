//! Canny edge extraction for the two edge-based strategies.
//!
//! Edge detection itself is delegated to `imageproc`; this module wraps it
//! with the buffer conversions used across the crate and an optional
//! dilation pass that thickens the one-pixel Canny ridges so contour
//! tracing survives small breaks.
use crate::kernels::morphology::dilate;
use serde::Deserialize;

/// Thresholds and post-dilation for one Canny configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct CannyParams {
    pub low_threshold: f32,
    pub high_threshold: f32,
    /// Structuring element applied to the edge map after detection (odd);
    /// `0` or `1` disables dilation.
    pub dilation_kernel_size: usize,
    pub dilation_iterations: usize,
}

impl CannyParams {
    /// Conservative thresholds for clean, high-contrast shots.
    pub fn default_strategy() -> Self {
        Self {
            low_threshold: 75.0,
            high_threshold: 200.0,
            dilation_kernel_size: 3,
            dilation_iterations: 1,
        }
    }

    /// Permissive thresholds that keep weak edges in low-contrast scenes.
    pub fn fallback_strategy() -> Self {
        Self {
            low_threshold: 30.0,
            high_threshold: 90.0,
            dilation_kernel_size: 3,
            dilation_iterations: 1,
        }
    }
}

/// Run Canny over a contiguous grayscale buffer and return a binary edge
/// map (255 = edge) of the same dimensions.
pub fn detect_edges(gray: &[u8], width: usize, height: usize, params: &CannyParams) -> Vec<u8> {
    assert_eq!(gray.len(), width * height, "input length mismatch");

    let image = image::GrayImage::from_raw(width as u32, height as u32, gray.to_vec())
        .expect("buffer length matches dimensions");
    let edges = imageproc::edges::canny(&image, params.low_threshold, params.high_threshold);
    let mut binary = edges.into_raw();

    if params.dilation_kernel_size > 1 {
        for _ in 0..params.dilation_iterations {
            binary = dilate(&binary, width, height, params.dilation_kernel_size);
        }
    }
    binary
}
