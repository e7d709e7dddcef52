//! One explicit Perona-Malik update of a single-channel grid.
//!
//! ```text
//! du/dt = div( g(|grad u_sigma|) * grad u )
//! ```
//!
//! `u_sigma` is the Gaussian-smoothed grid: edges are detected on it, while
//! the flux is built from the unsmoothed gradient. Divergence uses the same
//! central-difference operator as the gradient.

use ndarray::{Array2, ArrayView2, CowArray, Ix2, Zip};

use super::config::DiffusionConfig;
use crate::error::{ensure_same_shape, Result};
use crate::filters::blur::Smoother;
use crate::filters::core::clip_intensity;
use crate::filters::gradient::{central_gradients, gradient_x, gradient_y};

/// Smooth `grid` for edge estimation, or borrow it unchanged when `sigma` is 0.
///
/// # Errors
/// Shape mismatch if the smoother returns a grid of another shape.
pub(crate) fn presmooth<'a, S>(
    grid: ArrayView2<'a, f64>,
    sigma: f64,
    smoother: &S,
) -> Result<CowArray<'a, f64, Ix2>>
where
    S: Smoother + ?Sized,
{
    if sigma > 0.0 {
        let smoothed = smoother.smooth(grid, sigma);
        ensure_same_shape(grid.dim(), smoothed.dim())?;
        Ok(CowArray::from(smoothed))
    } else {
        Ok(CowArray::from(grid))
    }
}

/// Gradient magnitude of the (optionally smoothed) grid.
pub(crate) fn edge_magnitude<S>(
    grid: ArrayView2<f64>,
    sigma: f64,
    smoother: &S,
) -> Result<Array2<f64>>
where
    S: Smoother + ?Sized,
{
    let smoothed = presmooth(grid, sigma, smoother)?;
    Ok(central_gradients(smoothed.view()).magnitude())
}

/// Apply one explicit update with a precomputed diffusivity field.
///
/// `flux = diffusivity * grad(grid)`, `new = clip(grid + dt * div(flux))`.
///
/// # Errors
/// Shape mismatch if `diffusivity` and `grid` differ in shape.
pub fn diffuse(
    grid: ArrayView2<f64>,
    diffusivity: ArrayView2<f64>,
    dt: f64,
) -> Result<Array2<f64>> {
    ensure_same_shape(grid.dim(), diffusivity.dim())?;

    let grad = central_gradients(grid);
    let mut flux_x = grad.gx;
    let mut flux_y = grad.gy;
    Zip::from(&mut flux_x)
        .and(&mut flux_y)
        .and(diffusivity)
        .par_for_each(|fx, fy, &g| {
            *fx *= g;
            *fy *= g;
        });

    // Only the matching component of each flux contributes
    let div_x = gradient_x(flux_x.view());
    let div_y = gradient_y(flux_y.view());

    let mut updated = Array2::<f64>::zeros(grid.dim());
    Zip::from(&mut updated)
        .and(grid)
        .and(&div_x)
        .and(&div_y)
        .par_for_each(|out, &v, &dx, &dy| {
            *out = v + dt * (dx + dy);
        });
    clip_intensity(&mut updated);

    Ok(updated)
}

/// One full diffusion step of a single-channel grid.
///
/// The input is never modified; the updated, clipped grid is returned.
pub fn diffusion_step<S>(
    grid: ArrayView2<f64>,
    config: &DiffusionConfig,
    smoother: &S,
) -> Result<Array2<f64>>
where
    S: Smoother + ?Sized,
{
    let magnitude = edge_magnitude(grid, config.sigma(), smoother)?;
    let diffusivity = config.law().field(magnitude.view(), config.lambda());
    diffuse(grid, diffusivity.view(), config.dt())
}
