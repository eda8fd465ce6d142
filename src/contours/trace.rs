//! Contour tracing over a binary edge map.
use crate::types::Contour;
use image::GrayImage;
use imageproc::contours::BorderType;
use nalgebra::Point2;

/// Trace outer borders in a binary image (255 = foreground) via
/// Suzuki–Abe border following. Holes are dropped, as are contours too
/// short to bound a quadrilateral.
pub fn trace_contours(binary: &[u8], width: usize, height: usize) -> Vec<Contour> {
    assert_eq!(binary.len(), width * height, "input length mismatch");

    let image = GrayImage::from_raw(width as u32, height as u32, binary.to_vec())
        .expect("buffer length matches dimensions");
    let contours: Vec<imageproc::contours::Contour<u32>> =
        imageproc::contours::find_contours(&image);

    contours
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.points.len() >= 4)
        .map(|c| {
            c.points
                .into_iter()
                .map(|p| Point2::new(p.x as f32, p.y as f32))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_image_produces_no_contours() {
        let binary = vec![0u8; 20 * 20];
        assert!(trace_contours(&binary, 20, 20).is_empty());
    }

    #[test]
    fn filled_rectangle_produces_one_outer_contour() {
        let (w, h) = (30usize, 20usize);
        let mut binary = vec![0u8; w * h];
        for y in 5..15 {
            for x in 5..25 {
                binary[y * w + x] = 255;
            }
        }
        let contours = trace_contours(&binary, w, h);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].len() >= 4);
    }
}
