//! Detector pipeline driving document detection end-to-end.
//!
//! The [`PageDetector`] exposes a simple API: feed a grayscale image and
//! get the best document quadrilateral with detailed diagnostics.
//! Internally it runs the enhanced low-contrast strategy and the two Canny
//! strategies in order, pools their filtered candidates and picks the best
//! composite score.
//!
//! Typical usage:
//! ```no_run
//! use page_detector::{PageDetector, ScanParams};
//! use page_detector::image::ImageU8;
//!
//! # fn example(gray: ImageU8) {
//! let detector = PageDetector::new(ScanParams::default());
//! let report = detector.process_with_diagnostics(gray);
//! if report.scan.found {
//!     println!("score: {:.3}", report.scan.score);
//! }
//! # }
//! ```
use super::params::ScanParams;
use crate::contours::{approximate_polygon, contour_area, trace_contours};
use crate::diagnostics::{
    CandidateDescriptor, DetectionReport, InputDescriptor, PipelineTrace, StrategyTrace,
    TimingBreakdown,
};
use crate::edges::detect_edges;
use crate::filter::{ContourFilter, QuadCandidate};
use crate::image::{GrayImageU8, ImageU8};
use crate::kernels::{KernelProvider, ReferenceKernels};
use crate::types::{Contour, Quad, ScanResult, StrategyKind};
use log::{debug, warn};
use nalgebra::Point2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Cooperative cancellation flag shared with the caller.
///
/// The detector checks it between strategies only; in-flight kernel loops
/// run to completion. A cancelled scan returns "no document" with the
/// `cancelled` indicator set.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Everything one strategy produced: its best candidate, the largest raw
/// contour seen (the driver's last-resort pool), and contour counts for
/// diagnostics.
#[derive(Clone, Debug)]
pub struct StrategyOutcome {
    pub kind: StrategyKind,
    pub candidate: Option<QuadCandidate>,
    pub largest_contour: Option<Contour>,
    pub contours_total: usize,
    pub contours_kept: usize,
    pub elapsed_ms: f64,
}

/// Multi-strategy document detector.
///
/// Generic over a [`KernelProvider`] so accelerated kernels can be
/// substituted; the default runs the in-crate reference kernels. All
/// working buffers live for one scan only, so a detector is freely
/// shareable across scans.
pub struct PageDetector<K: KernelProvider = ReferenceKernels> {
    params: ScanParams,
    kernels: K,
}

impl PageDetector<ReferenceKernels> {
    /// Create a detector running the reference kernels.
    pub fn new(params: ScanParams) -> Self {
        Self::with_kernels(params, ReferenceKernels)
    }
}

impl<K: KernelProvider> PageDetector<K> {
    /// Create a detector with a custom kernel provider.
    pub fn with_kernels(params: ScanParams, kernels: K) -> Self {
        Self { params, kernels }
    }

    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    /// Run the detector on a grayscale image, returning a compact result.
    pub fn process(&self, gray: ImageU8) -> ScanResult {
        self.process_with_diagnostics(gray).scan
    }

    /// Run the detector and return both the result and a detailed report.
    pub fn process_with_diagnostics(&self, gray: ImageU8) -> DetectionReport {
        self.process_cancellable(gray, &CancelToken::new())
    }

    /// Run the full multi-strategy scan, checking `cancel` between
    /// strategies.
    pub fn process_cancellable(&self, gray: ImageU8, cancel: &CancelToken) -> DetectionReport {
        let (width, height) = (gray.w, gray.h);
        debug!(
            "PageDetector::process start w={} h={} scale_factor={:.3}",
            width, height, self.params.scale_factor
        );
        let total_start = Instant::now();
        let input = InputDescriptor {
            width,
            height,
            scale_factor: self.params.scale_factor,
        };

        if width < 1 || height < 1 {
            debug!("PageDetector::process degenerate input rejected");
            return self.empty_report(input, Vec::new(), false, total_start);
        }

        let buffer = gray.to_vec();
        let image_area = (width * height) as f32;
        let mut traces: Vec<StrategyTrace> = Vec::new();
        let mut outcomes: Vec<StrategyOutcome> = Vec::new();
        let mut cancelled = false;

        if cancel.is_cancelled() {
            cancelled = true;
        } else {
            match self.run_enhanced(&buffer, width, height) {
                Ok(outcome) => {
                    traces.push(trace_from_outcome(&outcome, image_area));
                    outcomes.push(outcome);
                }
                Err(err) => {
                    warn!("PageDetector::process enhanced strategy failed: {err}");
                    traces.push(error_trace(StrategyKind::Enhanced, err));
                }
            }
        }

        if self.params.use_fallback {
            for kind in [StrategyKind::CannyFallback, StrategyKind::CannyDefault] {
                if cancelled || cancel.is_cancelled() {
                    cancelled = true;
                    break;
                }
                let outcome = match kind {
                    StrategyKind::CannyFallback => self.run_canny_fallback(&buffer, width, height),
                    _ => self.run_canny_default(&buffer, width, height),
                };
                traces.push(trace_from_outcome(&outcome, image_area));
                outcomes.push(outcome);
            }
        }

        if cancelled {
            debug!("PageDetector::process cancelled between strategies");
            return self.empty_report(input, traces, true, total_start);
        }

        // Pool the per-strategy winners; selection is by score alone and
        // stable on ties, so it does not depend on execution order.
        let mut pool: Vec<(StrategyKind, &QuadCandidate)> = outcomes
            .iter()
            .filter_map(|o| o.candidate.as_ref().map(|c| (o.kind, c)))
            .collect();
        pool.sort_by(|a, b| {
            b.1.score
                .partial_cmp(&a.1.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let scale = self.params.scale_factor;
        let (found, corners, score, strategy, fallback) = match pool.first() {
            Some(&(kind, candidate)) => (
                true,
                Some(scale_quad(&candidate.corners, scale)),
                candidate.score,
                Some(kind),
                false,
            ),
            None => match self.largest_raw_contour(&outcomes) {
                Some(contour) => {
                    debug!(
                        "PageDetector::process no candidate passed the filters -> largest raw contour"
                    );
                    let quad = fallback_quad(contour, self.params.contour_filter.epsilon);
                    (true, Some(scale_quad(&quad, scale)), 0.0, None, true)
                }
                None => (false, None, 0.0, None, false),
            },
        };

        let latency = total_start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "PageDetector::process done found={} score={:.3} strategy={:?} latency_ms={:.3}",
            found, score, strategy, latency
        );

        let mut timings = TimingBreakdown::with_total(latency);
        for trace in &traces {
            timings.push(trace.strategy.label(), trace.elapsed_ms);
        }

        DetectionReport {
            scan: ScanResult {
                found,
                corners,
                score,
                strategy,
                fallback,
                cancelled: false,
                latency_ms: latency,
            },
            trace: PipelineTrace {
                input,
                timings,
                strategies: traces,
            },
        }
    }

    /// Strategy 1: CLAHE → box blur → adaptive threshold → close → trace.
    ///
    /// Errors when a kernel provider returns a buffer of the wrong size;
    /// the driver logs the failure and continues with the Canny strategies.
    pub fn run_enhanced(
        &self,
        gray: &[u8],
        width: usize,
        height: usize,
    ) -> Result<StrategyOutcome, String> {
        let start = Instant::now();
        let len = width * height;
        let p = &self.params;

        let enhanced = if p.skip_clahe {
            gray.to_vec()
        } else {
            self.kernels
                .clahe(gray, width, height, p.clahe.tile_grid, p.clahe.clip_limit)
        };
        check_kernel_output("clahe", &enhanced, len)?;

        let blurred = self
            .kernels
            .box_blur(&enhanced, width, height, p.threshold.block_size);
        check_kernel_output("box_blur", &blurred, len)?;

        let binary = self.kernels.adaptive_threshold(
            &enhanced,
            &blurred,
            width,
            height,
            p.threshold.offset,
            true,
        );
        check_kernel_output("adaptive_threshold", &binary, len)?;

        let closed = self.kernels.morphological_close(
            &binary,
            width,
            height,
            p.morphology.kernel_size,
            p.morphology.iterations,
        );
        check_kernel_output("morphological_close", &closed, len)?;

        let contours = trace_contours(&closed, width, height);
        Ok(self.filter_contours(StrategyKind::Enhanced, contours, width, height, start))
    }

    /// Strategy 2: permissive Canny thresholds for weak edges.
    pub fn run_canny_fallback(&self, gray: &[u8], width: usize, height: usize) -> StrategyOutcome {
        let start = Instant::now();
        let binary = detect_edges(gray, width, height, &self.params.fallback_canny);
        let contours = trace_contours(&binary, width, height);
        self.filter_contours(StrategyKind::CannyFallback, contours, width, height, start)
    }

    /// Strategy 3: conservative Canny thresholds for clean shots.
    pub fn run_canny_default(&self, gray: &[u8], width: usize, height: usize) -> StrategyOutcome {
        let start = Instant::now();
        let binary = detect_edges(gray, width, height, &self.params.canny);
        let contours = trace_contours(&binary, width, height);
        self.filter_contours(StrategyKind::CannyDefault, contours, width, height, start)
    }

    /// Common tail of every strategy: drop contours below the
    /// source-pixel area prefilter, run the geometric filter and keep the
    /// largest raw contour for the last-resort fallback.
    fn filter_contours(
        &self,
        kind: StrategyKind,
        contours: Vec<Contour>,
        width: usize,
        height: usize,
        start: Instant,
    ) -> StrategyOutcome {
        let min_area = self.params.min_contour_area();
        let total = contours.len();

        let mut largest: Option<Contour> = None;
        let mut largest_area = 0.0f32;
        let kept: Vec<Contour> = contours
            .into_iter()
            .filter(|c| {
                let area = contour_area(c);
                if area > largest_area {
                    largest_area = area;
                    largest = Some(c.clone());
                }
                area >= min_area
            })
            .collect();

        let filter = ContourFilter::new(self.params.contour_filter.clone(), width, height);
        let candidate = filter.best_candidate(&kept);
        debug!(
            "PageDetector::{} contours={} kept={} candidate={}",
            kind,
            total,
            kept.len(),
            candidate.is_some()
        );

        StrategyOutcome {
            kind,
            candidate,
            largest_contour: largest,
            contours_total: total,
            contours_kept: kept.len(),
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }

    /// Largest raw contour from the Canny strategies, fallback first.
    fn largest_raw_contour<'a>(&self, outcomes: &'a [StrategyOutcome]) -> Option<&'a Contour> {
        outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o.kind,
                    StrategyKind::CannyFallback | StrategyKind::CannyDefault
                )
            })
            .find_map(|o| o.largest_contour.as_ref())
    }

    fn empty_report(
        &self,
        input: InputDescriptor,
        traces: Vec<StrategyTrace>,
        cancelled: bool,
        total_start: Instant,
    ) -> DetectionReport {
        let latency = total_start.elapsed().as_secs_f64() * 1000.0;
        let mut timings = TimingBreakdown::with_total(latency);
        for trace in &traces {
            timings.push(trace.strategy.label(), trace.elapsed_ms);
        }
        DetectionReport {
            scan: ScanResult {
                found: false,
                corners: None,
                score: 0.0,
                strategy: None,
                fallback: false,
                cancelled,
                latency_ms: latency,
            },
            trace: PipelineTrace {
                input,
                timings,
                strategies: traces,
            },
        }
    }
}

/// Which fused enhancement runs while downscaling to the processing
/// resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Enhancement {
    /// Fused CLAHE + downscale. Detection on the result should set
    /// `skip_clahe`, the equalization already happened at full resolution.
    Equalize,
    /// Fused unsharp mask + downscale; CLAHE still runs inside the
    /// enhanced strategy.
    Sharpen,
}

/// Downscale `view` so its longest side is at most `max_dim`, applying the
/// selected fused enhancement on the way down. Returns the processing
/// image and the source→processing scale factor; callers detecting on the
/// result should store that factor in `ScanParams::scale_factor`.
pub fn prepare_processing_image<K: KernelProvider>(
    view: ImageU8<'_>,
    max_dim: usize,
    enhance: Enhancement,
    params: &ScanParams,
    kernels: &K,
) -> (GrayImageU8, f32) {
    let (w, h) = (view.w, view.h);
    let longest = w.max(h);
    if max_dim == 0 || longest <= max_dim || w == 0 || h == 0 {
        return (GrayImageU8::new(w, h, view.to_vec()), 1.0);
    }
    let scale = longest as f32 / max_dim as f32;
    let target_w = ((w as f32 / scale).round() as usize).max(1);
    let target_h = ((h as f32 / scale).round() as usize).max(1);
    let data = match enhance {
        Enhancement::Equalize => kernels.clahe_and_downscale(
            &view.to_vec(),
            w,
            h,
            target_w,
            target_h,
            params.clahe.tile_grid,
            params.clahe.clip_limit,
        ),
        Enhancement::Sharpen => kernels.unsharp_mask_and_downscale(
            &view.to_vec(),
            w,
            h,
            target_w,
            target_h,
            params.sharpen.amount,
            params.sharpen.radius,
        ),
    };
    debug!(
        "prepare_processing_image {:?} {}x{} -> {}x{} scale={:.3}",
        enhance, w, h, target_w, target_h, scale
    );
    (GrayImageU8::new(target_w, target_h, data), scale)
}

fn scale_quad(quad: &Quad, scale: f32) -> Quad {
    if (scale - 1.0).abs() <= f32::EPSILON {
        return *quad;
    }
    quad.map(|p| Point2::new(p.x * scale, p.y * scale))
}

/// Recover four corners from the last-resort raw contour: polygon
/// approximation at the base epsilon when it yields a quadrilateral, the
/// axis-aligned bounding box otherwise.
fn fallback_quad(contour: &Contour, epsilon: f32) -> Quad {
    let approx = approximate_polygon(contour, epsilon);
    if approx.len() == 4 {
        return [approx[0], approx[1], approx[2], approx[3]];
    }
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for p in contour {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    [
        Point2::new(min_x, min_y),
        Point2::new(max_x, min_y),
        Point2::new(max_x, max_y),
        Point2::new(min_x, max_y),
    ]
}

fn trace_from_outcome(outcome: &StrategyOutcome, image_area: f32) -> StrategyTrace {
    StrategyTrace {
        strategy: outcome.kind,
        elapsed_ms: outcome.elapsed_ms,
        contours_total: outcome.contours_total,
        contours_after_prefilter: outcome.contours_kept,
        candidate: outcome
            .candidate
            .as_ref()
            .map(|c| CandidateDescriptor::from_candidate(c, image_area)),
        error: None,
    }
}

fn error_trace(kind: StrategyKind, error: String) -> StrategyTrace {
    StrategyTrace {
        strategy: kind,
        elapsed_ms: 0.0,
        contours_total: 0,
        contours_after_prefilter: 0,
        candidate: None,
        error: Some(error),
    }
}

fn check_kernel_output(label: &str, output: &[u8], expected: usize) -> Result<(), String> {
    if output.len() != expected {
        return Err(format!(
            "{label} kernel returned {} bytes, expected {expected}",
            output.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_quad_uses_bounding_box_for_irregular_contours() {
        // A jagged blob that refuses to approximate to four vertices.
        let contour: Contour = vec![
            Point2::new(10.0, 10.0),
            Point2::new(40.0, 5.0),
            Point2::new(70.0, 22.0),
            Point2::new(55.0, 48.0),
            Point2::new(30.0, 60.0),
            Point2::new(5.0, 35.0),
        ];
        let quad = fallback_quad(&contour, 0.0);
        assert_eq!(quad[0], Point2::new(5.0, 5.0));
        assert_eq!(quad[2], Point2::new(70.0, 60.0));
    }

    #[test]
    fn cancel_token_flips_once() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        assert!(token.clone().is_cancelled());
    }

    #[test]
    fn scale_quad_maps_back_to_source_frame() {
        let quad = [
            Point2::new(10.0, 20.0),
            Point2::new(30.0, 20.0),
            Point2::new(30.0, 40.0),
            Point2::new(10.0, 40.0),
        ];
        let scaled = scale_quad(&quad, 2.5);
        assert_eq!(scaled[0], Point2::new(25.0, 50.0));
        assert_eq!(scaled[2], Point2::new(75.0, 100.0));
    }
}
