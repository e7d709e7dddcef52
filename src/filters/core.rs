//! Core utilities shared by the filters and the diffusion drivers.
//!
//! This module provides:
//! - Gaussian kernel generation
//! - Boundary index helpers
//! - Intensity clipping and 8-bit quantization
//! - Per-grid statistics (mean, population variance)
//! - Splitting and stacking of (height, width, channels) images

use ndarray::{Array, Array2, Array3, ArrayView, ArrayView2, ArrayView3, Axis, Dimension, Zip};

use crate::error::{ensure_same_shape, DiffusionError, Result};

/// Lowest representable intensity.
pub const INTENSITY_MIN: f64 = 0.0;

/// Highest representable intensity.
pub const INTENSITY_MAX: f64 = 255.0;

/// Kernel radius in standard deviations.
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Generate a normalized 1D Gaussian kernel.
///
/// The radius is `floor(GAUSSIAN_TRUNCATE * sigma + 0.5)`, so the kernel has
/// `2 * radius + 1` taps. A non-positive sigma yields the identity kernel.
///
/// # Arguments
/// * `sigma` - Standard deviation of the Gaussian
///
/// # Returns
/// Normalized 1D kernel, odd length, symmetric around the center tap
pub fn gaussian_kernel_1d(sigma: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        return vec![1.0];
    }

    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as usize;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    // Normalize
    let sum: f64 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }

    kernel
}

/// Map an out-of-range index back into `0..len` by mirror reflection.
///
/// The border sample is repeated once: `d c b a | a b c d | d c b a`.
/// Works for offsets larger than `len`, which happens when a kernel is
/// wider than the image.
#[inline]
pub fn reflect_index(index: isize, len: usize) -> usize {
    let period = 2 * len as isize;
    let m = index.rem_euclid(period);
    if m < len as isize {
        m as usize
    } else {
        (period - 1 - m) as usize
    }
}

/// Convert any numeric grid to `f64`.
pub fn to_f64_grid<A>(input: ArrayView2<A>) -> Array2<f64>
where
    A: Copy + Into<f64>,
{
    input.mapv(|v| v.into())
}

/// Clip every sample into `[INTENSITY_MIN, INTENSITY_MAX]` in place.
pub fn clip_intensity(grid: &mut Array2<f64>) {
    Zip::from(grid).par_for_each(|v| *v = v.clamp(INTENSITY_MIN, INTENSITY_MAX));
}

/// Clip and quantize a float grid or image to 8 bits.
///
/// Fractional parts are truncated after clipping.
pub fn quantize_u8<D: Dimension>(grid: ArrayView<f64, D>) -> Array<u8, D> {
    grid.mapv(|v| v.clamp(INTENSITY_MIN, INTENSITY_MAX) as u8)
}

/// Arithmetic mean and population variance of a grid.
///
/// Both are accumulated sequentially in row-major order so the result does
/// not depend on the rayon thread count.
pub fn mean_and_variance(grid: ArrayView2<f64>) -> (f64, f64) {
    let n = grid.len() as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }

    let mean = grid.iter().sum::<f64>() / n;
    let variance = grid
        .iter()
        .map(|&v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    (mean, variance)
}

/// Sequential sum of all samples.
pub fn grid_sum(grid: ArrayView2<f64>) -> f64 {
    grid.iter().sum()
}

/// Split an image of shape (height, width, channels) into one `f64` grid per channel.
///
/// Channel order is preserved.
pub fn split_channels<A>(input: ArrayView3<A>) -> Vec<Array2<f64>>
where
    A: Copy + Into<f64>,
{
    input
        .axis_iter(Axis(2))
        .map(|channel| channel.mapv(|v| v.into()))
        .collect()
}

/// Stack same-shape grids into an image of shape (height, width, channels).
///
/// # Errors
/// * [`DiffusionError::EmptyImage`] when `channels` is empty
/// * [`DiffusionError::ShapeMismatch`] when any grid differs from the first
pub fn stack_channels(channels: &[Array2<f64>]) -> Result<Array3<f64>> {
    let first = channels.first().ok_or(DiffusionError::EmptyImage)?;
    let (height, width) = first.dim();

    let mut output = Array3::<f64>::zeros((height, width, channels.len()));
    for (c, channel) in channels.iter().enumerate() {
        ensure_same_shape((height, width), channel.dim())?;
        output.index_axis_mut(Axis(2), c).assign(channel);
    }

    Ok(output)
}
