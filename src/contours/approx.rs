//! Douglas–Peucker polygon approximation.
use crate::types::Contour;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use nalgebra::Point2;

/// Simplify a closed contour with a tolerance expressed as a fraction of
/// its arc length, so the same `epsilon_fraction` behaves consistently
/// across contour sizes.
pub fn approximate_polygon(contour: &Contour, epsilon_fraction: f32) -> Vec<Point2<f32>> {
    if contour.len() < 3 {
        return contour.clone();
    }
    let curve: Vec<Point<f32>> = contour.iter().map(|p| Point::new(p.x, p.y)).collect();
    let perimeter = arc_length(&curve, true);
    let epsilon = perimeter * epsilon_fraction as f64;
    if epsilon <= 0.0 {
        // Degenerate perimeter or tolerance; nothing to simplify.
        return contour.clone();
    }
    approximate_polygon_dp(&curve, epsilon, true)
        .into_iter()
        .map(|p| Point2::new(p.x, p.y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_rectangle(w: f32, h: f32) -> Contour {
        // Sample every edge of an axis-aligned rectangle at 1px steps.
        let mut points = Vec::new();
        let (wi, hi) = (w as i32, h as i32);
        for x in 0..wi {
            points.push(Point2::new(x as f32, 0.0));
        }
        for y in 0..hi {
            points.push(Point2::new(w, y as f32));
        }
        for x in (1..=wi).rev() {
            points.push(Point2::new(x as f32, h));
        }
        for y in (1..=hi).rev() {
            points.push(Point2::new(0.0, y as f32));
        }
        points
    }

    #[test]
    fn rectangle_collapses_to_four_vertices() {
        let contour = dense_rectangle(60.0, 40.0);
        let approx = approximate_polygon(&contour, 0.02);
        assert_eq!(approx.len(), 4, "got {:?}", approx);
    }

    #[test]
    fn tiny_contours_pass_through() {
        let contour = vec![Point2::new(0.0, 0.0), Point2::new(4.0, 4.0)];
        assert_eq!(approximate_polygon(&contour, 0.02), contour);
    }
}
