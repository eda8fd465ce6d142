//! Structured per-scan report: input description, strategy traces and the
//! final result.
use super::timing::TimingBreakdown;
use crate::filter::QuadCandidate;
use crate::types::{Quad, ScanResult, StrategyKind};
use serde::Serialize;

/// Dimensions and scaling of the processed input.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    /// Ratio from source to processing resolution.
    pub scale_factor: f32,
}

/// Snapshot of an accepted candidate, in the processing-resolution frame.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDescriptor {
    pub corners: Quad,
    pub area: f32,
    pub area_ratio: f32,
    pub angle_score: f32,
    pub score: f32,
    pub epsilon: f32,
}

impl CandidateDescriptor {
    pub fn from_candidate(candidate: &QuadCandidate, image_area: f32) -> Self {
        Self {
            corners: candidate.corners,
            area: candidate.area,
            area_ratio: candidate.area / image_area,
            angle_score: candidate.angle_score,
            score: candidate.score,
            epsilon: candidate.epsilon,
        }
    }
}

/// What one strategy saw: contour counts, its accepted candidate (if any)
/// and an error when the strategy failed.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyTrace {
    pub strategy: StrategyKind,
    pub elapsed_ms: f64,
    pub contours_total: usize,
    pub contours_after_prefilter: usize,
    pub candidate: Option<CandidateDescriptor>,
    pub error: Option<String>,
}

/// Everything the scan executed, stage by stage.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
    pub strategies: Vec<StrategyTrace>,
}

/// Compact result plus the detailed trace.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub scan: ScanResult,
    pub trace: PipelineTrace,
}
