#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod detector;
pub mod diagnostics;
pub mod image;
pub mod types;

// “Expert” modules – still public, but considered unstable internals.
// (You can tighten or feature-gate these later.)
pub mod contours;
pub mod edges;
pub mod filter;
pub mod kernels;

// --- High-level re-exports -------------------------------------------------

// Main entry points: detector + results.
pub use crate::detector::{
    prepare_processing_image, CancelToken, Enhancement, PageDetector, ScanParams,
};
pub use crate::types::{ScanResult, StrategyKind};

// High-level diagnostics returned by the detector.
pub use crate::diagnostics::{DetectionReport, PipelineTrace};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use page_detector::prelude::*;
///
/// # fn main() {
/// let (w, h) = (640usize, 480usize);
/// let gray = vec![0u8; w * h];
/// let img = ImageU8 { w, h, stride: w, data: &gray };
///
/// let detector = PageDetector::new(ScanParams::default());
/// let result = detector.process(img);
/// println!("found={} latency_ms={:.3}", result.found, result.latency_ms);
/// # }
/// ```
pub mod prelude {
    pub use crate::image::ImageU8;
    pub use crate::{PageDetector, ScanParams, ScanResult, StrategyKind};
}
