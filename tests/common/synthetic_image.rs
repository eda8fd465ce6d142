/// Generates a filled axis-aligned "document" rectangle on a plain
/// background.
pub fn document_u8(
    width: usize,
    height: usize,
    rect: (usize, usize, usize, usize),
    background: u8,
    paper: u8,
) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let (x0, y0, x1, y1) = rect;
    assert!(x0 < x1 && x1 <= width, "rect out of bounds");
    assert!(y0 < y1 && y1 <= height, "rect out of bounds");

    let mut img = vec![background; width * height];
    for y in y0..y1 {
        for x in x0..x1 {
            img[y * width + x] = paper;
        }
    }
    img
}

/// Generates a uniform image with no structure at all.
pub fn uniform_u8(width: usize, height: usize, value: u8) -> Vec<u8> {
    vec![value; width * height]
}
