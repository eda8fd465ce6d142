//! Separable box blur, the Gaussian approximation shared by the adaptive
//! threshold and the unsharp mask.

/// Two-pass box filter with an odd kernel size; windows clamp at borders.
/// Each output sample is the rounded mean of its window.
pub fn box_blur(input: &[u8], width: usize, height: usize, kernel_size: usize) -> Vec<u8> {
    assert_eq!(input.len(), width * height, "input length mismatch");
    if kernel_size <= 1 || width == 0 || height == 0 {
        return input.to_vec();
    }
    let half = (kernel_size / 2) as isize;

    // Horizontal pass
    let mut temp = vec![0u8; width * height];
    for y in 0..height {
        let row = y * width;
        for x in 0..width {
            let mut sum = 0u32;
            let mut count = 0u32;
            for k in -half..=half {
                let nx = (x as isize + k).clamp(0, (width - 1) as isize) as usize;
                sum += input[row + nx] as u32;
                count += 1;
            }
            temp[row + x] = ((sum + count / 2) / count) as u8;
        }
    }

    // Vertical pass
    let mut output = vec![0u8; width * height];
    for x in 0..width {
        for y in 0..height {
            let mut sum = 0u32;
            let mut count = 0u32;
            for k in -half..=half {
                let ny = (y as isize + k).clamp(0, (height - 1) as isize) as usize;
                sum += temp[ny * width + x] as u32;
                count += 1;
            }
            output[y * width + x] = ((sum + count / 2) / count) as u8;
        }
    }
    output
}
