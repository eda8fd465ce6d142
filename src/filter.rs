//! Geometric contour filter and composite scorer.
//!
//! Raw contours come in from any strategy; each one is approximated to a
//! polygon over a ladder of Douglas–Peucker tolerances and admitted only
//! when it is a convex quadrilateral of plausible size, squareness and
//! aspect ratio. Survivors carry a composite score blending covered area
//! with corner squareness, so candidates from different strategies compare
//! on a single scalar.
use crate::contours::{
    angle_score, approximate_polygon, aspect_ratio, contour_area, interior_angles, is_convex,
};
use crate::types::{Contour, Quad};
use log::debug;
use serde::Deserialize;

/// Admissibility bounds and score weights for candidate quadrilaterals.
#[derive(Clone, Debug, Deserialize)]
pub struct ContourFilterParams {
    /// Candidate area as a fraction of image area must be at least this.
    pub min_area_ratio: f32,
    /// ... and at most this.
    pub max_area_ratio: f32,
    /// Interior angle admissibility range, degrees.
    pub min_angle: f32,
    pub max_angle: f32,
    /// Mean opposite-edge aspect ratio bounds.
    pub min_aspect_ratio: f32,
    pub max_aspect_ratio: f32,
    /// Weight of the area fraction in the composite score.
    pub area_weight: f32,
    /// Weight of the angle score; the two weights should sum to 1.
    pub angle_weight: f32,
    /// Base polygon approximation tolerance (fraction of arc length).
    pub epsilon: f32,
    /// Explicit tolerance ladder; `None` derives one from `epsilon`.
    pub epsilon_values: Option<Vec<f32>>,
}

impl Default for ContourFilterParams {
    fn default() -> Self {
        Self {
            min_area_ratio: 0.15,
            max_area_ratio: 0.98,
            min_angle: 70.0,
            max_angle: 110.0,
            min_aspect_ratio: 0.3,
            max_aspect_ratio: 3.0,
            area_weight: 0.4,
            angle_weight: 0.6,
            epsilon: 0.02,
            epsilon_values: None,
        }
    }
}

impl ContourFilterParams {
    /// The tolerance ladder tried per contour: the explicit list when
    /// given, otherwise multiples of the base epsilon from tight to loose.
    pub fn epsilon_ladder(&self) -> Vec<f32> {
        match &self.epsilon_values {
            Some(values) => values.clone(),
            None => [0.5, 0.75, 1.0, 1.5, 2.0]
                .iter()
                .map(|m| m * self.epsilon)
                .collect(),
        }
    }
}

/// A quadrilateral that survived the filter, with its provenance and score.
#[derive(Clone, Debug)]
pub struct QuadCandidate {
    /// Corners in contour winding order, processing-resolution frame.
    pub corners: Quad,
    /// The raw contour the polygon was approximated from.
    pub contour: Contour,
    /// Shoelace area of the polygon, px².
    pub area: f32,
    /// The approximation tolerance that produced this polygon.
    pub epsilon: f32,
    /// Squareness in [0, 1].
    pub angle_score: f32,
    /// Composite score in [0, 1].
    pub score: f32,
}

/// Scoring threshold past which the epsilon ladder stops for a contour,
/// avoiding near-duplicate candidates from neighbouring tolerances.
const EARLY_EXIT_SCORE: f32 = 0.5;

/// Applies the admissibility checks and composite scoring to raw contours.
pub struct ContourFilter {
    params: ContourFilterParams,
    image_area: f32,
}

impl ContourFilter {
    pub fn new(params: ContourFilterParams, width: usize, height: usize) -> Self {
        Self {
            params,
            image_area: (width * height) as f32,
        }
    }

    /// Best-scoring candidate across `contours`, or `None` when nothing
    /// passes the checks.
    pub fn best_candidate(&self, contours: &[Contour]) -> Option<QuadCandidate> {
        let mut candidates: Vec<QuadCandidate> = contours
            .iter()
            .filter_map(|c| self.evaluate_contour(c))
            .collect();
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.into_iter().next()
    }

    /// Walk the epsilon ladder for one contour, keeping the best admitted
    /// polygon; the walk stops once a candidate clears
    /// [`EARLY_EXIT_SCORE`].
    pub fn evaluate_contour(&self, contour: &Contour) -> Option<QuadCandidate> {
        if contour.len() < 4 {
            return None;
        }
        let mut best: Option<QuadCandidate> = None;
        for epsilon in self.params.epsilon_ladder() {
            let polygon = approximate_polygon(contour, epsilon);
            if polygon.len() != 4 {
                continue;
            }
            let corners: Quad = [polygon[0], polygon[1], polygon[2], polygon[3]];
            let Some(candidate) = self.admit_quad(corners, contour, epsilon) else {
                continue;
            };
            let score = candidate.score;
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(candidate);
            }
            if score > EARLY_EXIT_SCORE {
                break;
            }
        }
        best
    }

    /// Checks one quadrilateral against the area, convexity, angle and
    /// aspect bounds, producing a scored candidate when all pass.
    fn admit_quad(&self, corners: Quad, contour: &Contour, epsilon: f32) -> Option<QuadCandidate> {
        let p = &self.params;

        let area = contour_area(&corners);
        let area_ratio = area / self.image_area;
        if area_ratio < p.min_area_ratio || area_ratio > p.max_area_ratio {
            return None;
        }

        if !is_convex(&corners) {
            return None;
        }

        let angles = interior_angles(&corners);
        if angles.iter().any(|a| *a < p.min_angle || *a > p.max_angle) {
            return None;
        }

        let ratio = aspect_ratio(&corners)?;
        if ratio < p.min_aspect_ratio || ratio > p.max_aspect_ratio {
            return None;
        }

        let angle_score = angle_score(&angles);
        let score = p.area_weight * area_ratio + p.angle_weight * angle_score;
        debug!(
            "ContourFilter::admit area_ratio={:.3} angle_score={:.3} score={:.3} eps={:.4}",
            area_ratio, angle_score, score, epsilon
        );
        Some(QuadCandidate {
            corners,
            contour: contour.clone(),
            area,
            epsilon,
            angle_score,
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    const W: usize = 200;
    const H: usize = 200;

    fn filter() -> ContourFilter {
        ContourFilter::new(ContourFilterParams::default(), W, H)
    }

    fn rect_contour(x0: f32, y0: f32, x1: f32, y1: f32) -> Contour {
        // Dense sampling so approximation has something to simplify.
        let mut points = Vec::new();
        let steps = 40;
        for i in 0..steps {
            let t = i as f32 / steps as f32;
            points.push(Point2::new(x0 + t * (x1 - x0), y0));
        }
        for i in 0..steps {
            let t = i as f32 / steps as f32;
            points.push(Point2::new(x1, y0 + t * (y1 - y0)));
        }
        for i in 0..steps {
            let t = i as f32 / steps as f32;
            points.push(Point2::new(x1 - t * (x1 - x0), y1));
        }
        for i in 0..steps {
            let t = i as f32 / steps as f32;
            points.push(Point2::new(x0, y1 - t * (y1 - y0)));
        }
        points
    }

    #[test]
    fn accepts_a_centred_document_rectangle() {
        let contour = rect_contour(30.0, 40.0, 170.0, 160.0);
        let candidate = filter().evaluate_contour(&contour).expect("accepted");
        assert_eq!(candidate.corners.len(), 4);
        assert!((candidate.angle_score - 1.0).abs() < 1e-3);
        let expected_ratio = (140.0 * 120.0) / (W * H) as f32;
        assert!((candidate.area / (W * H) as f32 - expected_ratio).abs() < 0.02);
        assert!(candidate.score > 0.5);
    }

    #[test]
    fn rejects_a_bowtie() {
        let bowtie: Contour = vec![
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(0.0, 100.0),
            Point2::new(100.0, 100.0),
        ];
        assert!(filter().evaluate_contour(&bowtie).is_none());
    }

    #[test]
    fn rejects_small_and_oversized_areas() {
        // 20×20 px on a 200×200 image: 1% area, below min_area_ratio.
        let small = rect_contour(90.0, 90.0, 110.0, 110.0);
        assert!(filter().evaluate_contour(&small).is_none());

        // Border-hugging quad above max_area_ratio.
        let huge = rect_contour(0.0, 0.0, 199.9, 199.9);
        assert!(filter().evaluate_contour(&huge).is_none());
    }

    #[test]
    fn rejects_elongated_aspect_ratios() {
        // 190×45 px: 21% of the image so the area check passes, but the
        // aspect ratio of ~4.2 falls outside [0.3, 3.0].
        let sliver = rect_contour(5.0, 78.0, 195.0, 123.0);
        assert!(filter().evaluate_contour(&sliver).is_none());
    }

    #[test]
    fn score_moves_linearly_with_area() {
        let p = ContourFilterParams::default();
        let f = filter();
        let a = f
            .evaluate_contour(&rect_contour(30.0, 30.0, 150.0, 150.0))
            .expect("accepted");
        let b = f
            .evaluate_contour(&rect_contour(30.0, 30.0, 170.0, 170.0))
            .expect("accepted");
        // Both are perfect rectangles, so the score difference is exactly
        // area_weight * Δarea / image_area.
        let expected = p.area_weight * (b.area - a.area) / (W * H) as f32;
        assert!((b.score - a.score - expected).abs() < 1e-4);
    }

    #[test]
    fn best_candidate_prefers_the_higher_score() {
        let f = filter();
        let contours = vec![
            rect_contour(60.0, 60.0, 140.0, 140.0),
            rect_contour(20.0, 20.0, 180.0, 180.0),
        ];
        let best = f.best_candidate(&contours).expect("one should pass");
        // The larger rectangle wins on the area term.
        assert!(best.area > 10_000.0);
    }
}
