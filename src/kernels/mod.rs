//! Numeric preprocessing kernels and the provider capability set.
//!
//! Components
//! - `clahe`: tile-based contrast-limited histogram equalization, plus a
//!   fused equalize+downscale pass.
//! - `blur`: separable box blur (Gaussian approximation).
//! - `threshold`: adaptive thresholding against a local blurred mean.
//! - `morphology`: separable dilate/erode and the close operator.
//! - `sharpen`: unsharp masking, plus a fused sharpen+downscale pass.
//!
//! Every kernel is a pure function over `(&[u8], width, height, ...)`
//! returning a freshly allocated buffer; accumulation happens in `u32`, so
//! byte inputs cannot overflow. [`KernelProvider`] names each operation
//! with a default implementation delegating to the reference functions
//! here; an accelerated provider overrides the operations it supports and
//! inherits the rest, so a missing kernel silently falls back.

pub mod blur;
pub mod clahe;
pub mod morphology;
pub mod sharpen;
pub mod threshold;

pub use blur::box_blur;
pub use clahe::{clahe, clahe_and_downscale, ClaheParams};
pub use morphology::{dilate, erode, morphological_close, MorphologyParams};
pub use sharpen::{unsharp_mask, unsharp_mask_and_downscale, SharpenParams};
pub use threshold::{adaptive_threshold, ThresholdParams};

/// Capability set over the numeric kernels.
///
/// The detector is generic over a provider so deployments with an
/// accelerated backend (SIMD, GPU, foreign module) can substitute any
/// subset of operations; unimplemented methods fall back to the reference
/// kernels via the default bodies. Implementations must stay within ±1 of
/// the reference output per pixel.
pub trait KernelProvider {
    fn clahe(
        &self,
        input: &[u8],
        width: usize,
        height: usize,
        grid: (usize, usize),
        clip_limit: f32,
    ) -> Vec<u8> {
        clahe::clahe(input, width, height, grid.0, grid.1, clip_limit)
    }

    fn box_blur(&self, input: &[u8], width: usize, height: usize, kernel_size: usize) -> Vec<u8> {
        blur::box_blur(input, width, height, kernel_size)
    }

    fn adaptive_threshold(
        &self,
        input: &[u8],
        blurred: &[u8],
        width: usize,
        height: usize,
        offset: i32,
        invert: bool,
    ) -> Vec<u8> {
        threshold::adaptive_threshold(input, blurred, width, height, offset, invert)
    }

    fn dilate(&self, input: &[u8], width: usize, height: usize, kernel_size: usize) -> Vec<u8> {
        morphology::dilate(input, width, height, kernel_size)
    }

    fn erode(&self, input: &[u8], width: usize, height: usize, kernel_size: usize) -> Vec<u8> {
        morphology::erode(input, width, height, kernel_size)
    }

    fn morphological_close(
        &self,
        input: &[u8],
        width: usize,
        height: usize,
        kernel_size: usize,
        iterations: usize,
    ) -> Vec<u8> {
        morphology::morphological_close(input, width, height, kernel_size, iterations)
    }

    fn unsharp_mask(
        &self,
        input: &[u8],
        width: usize,
        height: usize,
        amount: f32,
        radius: usize,
    ) -> Vec<u8> {
        sharpen::unsharp_mask(input, width, height, amount, radius)
    }

    #[allow(clippy::too_many_arguments)]
    fn unsharp_mask_and_downscale(
        &self,
        input: &[u8],
        width: usize,
        height: usize,
        target_width: usize,
        target_height: usize,
        amount: f32,
        radius: usize,
    ) -> Vec<u8> {
        sharpen::unsharp_mask_and_downscale(
            input,
            width,
            height,
            target_width,
            target_height,
            amount,
            radius,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn clahe_and_downscale(
        &self,
        input: &[u8],
        width: usize,
        height: usize,
        target_width: usize,
        target_height: usize,
        grid: (usize, usize),
        clip_limit: f32,
    ) -> Vec<u8> {
        clahe::clahe_and_downscale(
            input,
            width,
            height,
            target_width,
            target_height,
            grid.0,
            grid.1,
            clip_limit,
        )
    }
}

/// The vanilla provider: every operation runs the in-crate reference kernel.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceKernels;

impl KernelProvider for ReferenceKernels {}
