//! Planar geometry for contours and quadrilaterals.
use crate::types::Quad;
use nalgebra::{Point2, Vector2};

/// Absolute polygon area via the shoelace formula.
pub fn contour_area(points: &[Point2<f32>]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0f64;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        acc += points[i].x as f64 * points[j].y as f64;
        acc -= points[j].x as f64 * points[i].y as f64;
    }
    (acc.abs() / 2.0) as f32
}

/// Whether a polygon is convex: every non-zero cross product of
/// consecutive edge pairs shares one sign. Collinear vertices (zero cross
/// products) are tolerated.
pub fn is_convex(points: &[Point2<f32>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f32;
    for i in 0..n {
        let a = points[(i + 1) % n] - points[i];
        let b = points[(i + 2) % n] - points[(i + 1) % n];
        let cross = a.x * b.y - a.y * b.x;
        if cross == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

/// Interior angle at each vertex of a quadrilateral, in degrees.
///
/// The angle is measured between the two edge vectors leaving the vertex;
/// degenerate (zero-length) edges yield 0°, which the range check rejects.
pub fn interior_angles(quad: &Quad) -> [f32; 4] {
    let mut angles = [0.0f32; 4];
    for i in 0..4 {
        let prev = quad[(i + 3) % 4];
        let here = quad[i];
        let next = quad[(i + 1) % 4];
        angles[i] = angle_between(prev - here, next - here);
    }
    angles
}

/// Unsigned angle between two 2D vectors, in degrees, in [0, 180].
fn angle_between(a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    let na = a.norm();
    let nb = b.norm();
    if na <= f32::EPSILON || nb <= f32::EPSILON {
        return 0.0;
    }
    (a.dot(&b) / (na * nb)).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Squareness score in [0, 1]: 1.0 when every interior angle is 90°,
/// dropping to 0 once the mean deviation reaches 30°.
pub fn angle_score(angles: &[f32; 4]) -> f32 {
    let avg_dev = angles.iter().map(|a| (a - 90.0).abs()).sum::<f32>() / 4.0;
    (1.0 - avg_dev / 30.0).max(0.0)
}

/// Mean opposite-edge aspect ratio of a quadrilateral: edges (0, 2) form
/// the width, (1, 3) the height. `None` when the height collapses.
pub fn aspect_ratio(quad: &Quad) -> Option<f32> {
    let mut edges = [0.0f32; 4];
    for i in 0..4 {
        edges[i] = (quad[(i + 1) % 4] - quad[i]).norm();
    }
    let width = (edges[0] + edges[2]) / 2.0;
    let height = (edges[1] + edges[3]) / 2.0;
    if height <= f32::EPSILON {
        return None;
    }
    Some(width / height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(pts: [(f32, f32); 4]) -> Quad {
        [
            Point2::new(pts[0].0, pts[0].1),
            Point2::new(pts[1].0, pts[1].1),
            Point2::new(pts[2].0, pts[2].1),
            Point2::new(pts[3].0, pts[3].1),
        ]
    }

    #[test]
    fn shoelace_matches_independent_computation() {
        let q = quad([(1.0, 1.0), (7.0, 2.0), (6.0, 8.0), (0.0, 6.0)]);
        // Cross-product sum computed by hand:
        // (1*2-7*1) + (7*8-6*2) + (6*6-0*8) + (0*1-1*6) = -5 + 44 + 36 - 6 = 69
        let expected = 69.0 / 2.0;
        assert!((contour_area(&q) - expected).abs() / expected < 1e-6);
    }

    #[test]
    fn convex_quad_is_accepted_bowtie_is_not() {
        let square = quad([(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        assert!(is_convex(&square));

        let bowtie = quad([(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)]);
        assert!(!is_convex(&bowtie));
    }

    #[test]
    fn axis_aligned_rectangle_scores_one() {
        let rect = quad([(0.0, 0.0), (80.0, 0.0), (80.0, 50.0), (0.0, 50.0)]);
        let angles = interior_angles(&rect);
        for a in angles {
            assert!((a - 90.0).abs() < 1e-3, "angle {a}");
        }
        assert!((angle_score(&angles) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn sixty_degree_parallelogram_scores_zero() {
        // Equilateral parallelogram with 60°/120° interior angles.
        let side = 10.0f32;
        let dx = side * 60.0f32.to_radians().cos();
        let dy = side * 60.0f32.to_radians().sin();
        let para = quad([(0.0, 0.0), (side, 0.0), (side + dx, dy), (dx, dy)]);
        let angles = interior_angles(&para);
        assert!(angle_score(&angles) < 1e-5);
    }

    #[test]
    fn aspect_ratio_uses_opposite_edge_means() {
        let rect = quad([(0.0, 0.0), (90.0, 0.0), (90.0, 30.0), (0.0, 30.0)]);
        let ratio = aspect_ratio(&rect).unwrap();
        assert!((ratio - 3.0).abs() < 1e-5);

        let degenerate = quad([(0.0, 0.0), (10.0, 0.0), (10.0, 0.0), (0.0, 0.0)]);
        assert!(aspect_ratio(&degenerate).is_none());
    }
}
