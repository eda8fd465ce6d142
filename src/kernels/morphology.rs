//! Binary morphology: separable dilate/erode and the close operator.
use serde::Deserialize;

/// Kernel size and iteration count for the morphological close stage.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct MorphologyParams {
    /// Square structuring element size (odd).
    pub kernel_size: usize,
    /// Number of dilate→erode repetitions.
    pub iterations: usize,
}

impl Default for MorphologyParams {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            iterations: 2,
        }
    }
}

/// Separable max filter over a square window; borders clamp.
pub fn dilate(input: &[u8], width: usize, height: usize, kernel_size: usize) -> Vec<u8> {
    assert_eq!(input.len(), width * height, "input length mismatch");
    let half = kernel_size / 2;

    // Horizontal pass (max filter)
    let mut temp = vec![0u8; width * height];
    for y in 0..height {
        let row = y * width;
        for x in 0..width {
            let mut max_val = 0u8;
            for k in 0..kernel_size {
                let dx = k as isize - half as isize;
                let nx = (x as isize + dx).clamp(0, (width - 1) as isize) as usize;
                max_val = max_val.max(input[row + nx]);
            }
            temp[row + x] = max_val;
        }
    }

    // Vertical pass (max filter)
    let mut output = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut max_val = 0u8;
            for k in 0..kernel_size {
                let dy = k as isize - half as isize;
                let ny = (y as isize + dy).clamp(0, (height - 1) as isize) as usize;
                max_val = max_val.max(temp[ny * width + x]);
            }
            output[y * width + x] = max_val;
        }
    }
    output
}

/// Separable min filter over a square window; borders clamp.
pub fn erode(input: &[u8], width: usize, height: usize, kernel_size: usize) -> Vec<u8> {
    assert_eq!(input.len(), width * height, "input length mismatch");
    let half = kernel_size / 2;

    // Horizontal pass (min filter)
    let mut temp = vec![255u8; width * height];
    for y in 0..height {
        let row = y * width;
        for x in 0..width {
            let mut min_val = 255u8;
            for k in 0..kernel_size {
                let dx = k as isize - half as isize;
                let nx = (x as isize + dx).clamp(0, (width - 1) as isize) as usize;
                min_val = min_val.min(input[row + nx]);
            }
            temp[row + x] = min_val;
        }
    }

    // Vertical pass (min filter)
    let mut output = vec![255u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut min_val = 255u8;
            for k in 0..kernel_size {
                let dy = k as isize - half as isize;
                let ny = (y as isize + dy).clamp(0, (height - 1) as isize) as usize;
                min_val = min_val.min(temp[ny * width + x]);
            }
            output[y * width + x] = min_val;
        }
    }
    output
}

/// Morphological close: `iterations` repetitions of dilate then erode.
/// Closes gaps up to roughly `(kernel_size - 1) / 2 * iterations` pixels
/// in detected edges.
pub fn morphological_close(
    input: &[u8],
    width: usize,
    height: usize,
    kernel_size: usize,
    iterations: usize,
) -> Vec<u8> {
    let mut current = input.to_vec();
    for _ in 0..iterations {
        current = dilate(&current, width, height, kernel_size);
        current = erode(&current, width, height, kernel_size);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_frame(w: usize, h: usize, gap_at: usize) -> Vec<u8> {
        // A one-pixel-wide horizontal line with a gap in it.
        let mut img = vec![0u8; w * h];
        for x in 0..w {
            if x != gap_at {
                img[(h / 2) * w + x] = 255;
            }
        }
        img
    }

    #[test]
    fn erode_after_dilate_equals_single_close() {
        let img = binary_frame(24, 9, 11);
        let dilated = dilate(&img, 24, 9, 3);
        let composed = erode(&dilated, 24, 9, 3);
        assert_eq!(composed, morphological_close(&img, 24, 9, 3, 1));
    }

    #[test]
    fn close_fills_a_one_pixel_gap() {
        let img = binary_frame(24, 9, 11);
        let closed = morphological_close(&img, 24, 9, 3, 1);
        assert_eq!(closed[(9 / 2) * 24 + 11], 255, "gap should be bridged");
    }

    #[test]
    fn close_is_idempotent_once_gaps_are_gone() {
        let img = binary_frame(32, 11, 15);
        let once = morphological_close(&img, 32, 11, 5, 2);
        let twice = morphological_close(&once, 32, 11, 5, 2);
        assert_eq!(once, twice);
    }
}
