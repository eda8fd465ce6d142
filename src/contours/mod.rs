//! Contour extraction and quadrilateral geometry.
//!
//! Components
//! - `trace`: Suzuki–Abe border following over a binary edge map.
//! - `approx`: Douglas–Peucker polygon approximation at a tolerance given
//!   as a fraction of the closed arc length.
//! - `geometry`: shoelace area, convexity, interior angles and the angle
//!   score used by the contour filter.
pub mod approx;
pub mod geometry;
pub mod trace;

pub use approx::approximate_polygon;
pub use geometry::{angle_score, aspect_ratio, contour_area, interior_angles, is_convex};
pub use trace::trace_contours;
