//! Parameter types configuring the detector stages.
//!
//! The ~25 tunables cluster into per-stage groups; each group lives next
//! to its stage implementation and carries its own defaults, so call sites
//! never restate them. `ScanParams` aggregates the groups.
//!
//! Defaults aim for robust behaviour on photographs of documents at common
//! resolutions. For tuning low-contrast scenes, start with the CLAHE clip
//! limit and the adaptive threshold offset.

use crate::edges::CannyParams;
use crate::filter::ContourFilterParams;
use crate::kernels::{ClaheParams, MorphologyParams, SharpenParams, ThresholdParams};
use serde::Deserialize;

/// Detector-wide parameters controlling the multi-strategy scan.
#[derive(Clone, Debug, Deserialize)]
pub struct ScanParams {
    /// Contour area prefilter in source pixels; the processing-resolution
    /// threshold is `min_area / scale_factor²`.
    pub min_area: f32,
    /// Enables the two Canny strategies after the enhanced one.
    pub use_fallback: bool,
    /// Set when the caller already applied CLAHE upstream (for instance
    /// through the fused enhance+downscale kernel).
    pub skip_clahe: bool,
    /// Ratio from source to processing resolution; returned corners are
    /// multiplied by this to land in the source frame.
    pub scale_factor: f32,
    /// Contrast equalization ahead of the threshold stage.
    pub clahe: ClaheParams,
    /// Local-mean thresholding that binarizes the enhanced image.
    pub threshold: ThresholdParams,
    /// Gap closing on the binarized edge mask.
    pub morphology: MorphologyParams,
    /// Sharpening used by the fused preprocessing helpers.
    pub sharpen: SharpenParams,
    /// Quadrilateral admissibility bounds and score weights.
    pub contour_filter: ContourFilterParams,
    /// Permissive Canny configuration (strategy 2).
    pub fallback_canny: CannyParams,
    /// Conservative Canny configuration (strategy 3).
    pub canny: CannyParams,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            min_area: 1000.0,
            use_fallback: true,
            skip_clahe: false,
            scale_factor: 1.0,
            clahe: ClaheParams::default(),
            threshold: ThresholdParams::default(),
            morphology: MorphologyParams::default(),
            sharpen: SharpenParams::default(),
            contour_filter: ContourFilterParams::default(),
            fallback_canny: CannyParams::fallback_strategy(),
            canny: CannyParams::default_strategy(),
        }
    }
}

impl ScanParams {
    /// Contour area threshold at processing resolution.
    pub fn min_contour_area(&self) -> f32 {
        let scale = self.scale_factor.max(f32::EPSILON);
        self.min_area / (scale * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefilter_threshold_is_fixed_in_source_pixels() {
        let mut params = ScanParams::default();
        assert!((params.min_contour_area() - 1000.0).abs() < 1e-3);

        // Detecting at half resolution halves the linear scale, so the
        // processing-resolution threshold shrinks by 4x.
        params.scale_factor = 2.0;
        assert!((params.min_contour_area() - 250.0).abs() < 1e-3);
    }
}
