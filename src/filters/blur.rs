//! Gaussian pre-smoothing.
//!
//! The diffusion drivers estimate edge strength on a smoothed copy of the
//! image. Smoothing is reached through the [`Smoother`] trait so a caller can
//! plug in another blur; [`GaussianSmoother`] is the default.

use ndarray::{Array2, ArrayView2, Zip};

use super::core::{gaussian_kernel_1d, reflect_index};

/// Smoothing primitive consumed by the diffusion drivers.
///
/// Implementations must return a grid with the same shape as `grid`. The
/// drivers check this and fail with a shape mismatch otherwise.
pub trait Smoother: Sync {
    fn smooth(&self, grid: ArrayView2<f64>, sigma: f64) -> Array2<f64>;
}

/// Separable Gaussian blur with mirror-reflect borders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GaussianSmoother;

impl Smoother for GaussianSmoother {
    fn smooth(&self, grid: ArrayView2<f64>, sigma: f64) -> Array2<f64> {
        gaussian_blur(grid, sigma)
    }
}

/// Apply a Gaussian blur to a single-channel float grid.
///
/// Uses separable 2-pass convolution. Samples outside the grid are mirrored
/// (`d c b a | a b c d`), so constant images stay constant and the total
/// intensity is preserved.
///
/// # Arguments
/// * `input` - Grid (height, width)
/// * `sigma` - Standard deviation of the Gaussian, `<= 0` returns a copy
///
/// # Returns
/// Blurred grid with same dimensions
pub fn gaussian_blur(input: ArrayView2<f64>, sigma: f64) -> Array2<f64> {
    if sigma <= 0.0 {
        return input.to_owned();
    }

    let (height, width) = input.dim();
    let kernel = gaussian_kernel_1d(sigma);
    let half = (kernel.len() / 2) as isize;

    // Horizontal pass
    let mut temp = Array2::<f64>::zeros((height, width));
    Zip::indexed(&mut temp).par_for_each(|(y, x), out| {
        let mut sum = 0.0;
        for (ki, &kv) in kernel.iter().enumerate() {
            let sx = reflect_index(x as isize + ki as isize - half, width);
            sum += input[[y, sx]] * kv;
        }
        *out = sum;
    });

    // Vertical pass
    let mut result = Array2::<f64>::zeros((height, width));
    Zip::indexed(&mut result).par_for_each(|(y, x), out| {
        let mut sum = 0.0;
        for (ki, &kv) in kernel.iter().enumerate() {
            let sy = reflect_index(y as isize + ki as isize - half, height);
            sum += temp[[sy, x]] * kv;
        }
        *out = sum;
    });

    result
}
