//! Multi-strategy detector orchestrating the scan end-to-end.
//!
//! Overview
//! - The **enhanced** strategy equalizes contrast with CLAHE, estimates a
//!   local mean with a box blur, binarizes with an adaptive threshold and
//!   closes gaps morphologically before tracing contours. It is the branch
//!   that survives low-contrast scenes such as white paper on a light
//!   table.
//! - Two **Canny** strategies (permissive and conservative thresholds)
//!   cover scenes where plain edge detection outperforms enhancement.
//! - Every strategy feeds the same geometric contour filter; surviving
//!   candidates are pooled and the best composite score wins. When the
//!   pool is empty the largest raw Canny contour serves as a degenerate
//!   last resort.
//!
//! Strategies run sequentially on the calling thread and each one is
//! callable in isolation. A cooperative cancellation token is checked
//! between strategies; kernel loops are never preempted.
//!
//! Modules
//! - `params` – the nested configuration record.
//! - `pipeline` – the main [`PageDetector`] implementation.

pub mod params;
mod pipeline;

pub use params::ScanParams;
pub use pipeline::{
    prepare_processing_image, CancelToken, Enhancement, PageDetector, StrategyOutcome,
};
