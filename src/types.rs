use nalgebra::Point2;
use serde::Serialize;
use std::fmt;

/// Traced contour in processing-resolution pixel coordinates.
pub type Contour = Vec<Point2<f32>>;

/// Four corners of a quadrilateral, in contour winding order.
pub type Quad = [Point2<f32>; 4];

/// Identifies which detection strategy produced a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// CLAHE → box blur → adaptive threshold → morphological close.
    Enhanced,
    /// Permissive Canny thresholds for weak edges.
    CannyFallback,
    /// Conservative Canny thresholds for clean shots.
    CannyDefault,
}

impl StrategyKind {
    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::Enhanced => "enhanced",
            StrategyKind::CannyFallback => "canny-fallback",
            StrategyKind::CannyDefault => "canny-default",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one scan call.
///
/// `corners` are reported in the source image frame: the detector
/// multiplies processing-resolution coordinates by the configured
/// `scale_factor` before returning.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub found: bool,
    pub corners: Option<Quad>,
    /// Composite score of the winning candidate in [0, 1]; 0.0 for the
    /// raw-contour fallback.
    pub score: f32,
    pub strategy: Option<StrategyKind>,
    /// True when no candidate passed the filters and the corners come from
    /// the largest raw Canny contour.
    pub fallback: bool,
    /// True when a cancellation token was observed between strategies.
    pub cancelled: bool,
    pub latency_ms: f64,
}
