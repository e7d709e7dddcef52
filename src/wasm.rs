//! WebAssembly exports for nonlinear diffusion.
//!
//! These functions are exposed to JavaScript via wasm-bindgen and work on
//! flat, row-major byte buffers:
//! - **Gray**: length = width * height
//! - **RGB**: length = width * height * 3
//!
//! Invalid parameters or buffer sizes are reported as JavaScript errors.
//! Progress is not logged; only the final image is returned.

use ndarray::{Array2, Array3};
use wasm_bindgen::prelude::*;

use crate::diffusion::{configure, MultiChannelDiffusion, NoopObserver, ScalarDiffusion};
use crate::error::DiffusionError;

fn to_js_error(err: DiffusionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ============================================================================
// Grayscale Diffusion
// ============================================================================

/// Perona-Malik diffusion of a grayscale image.
///
/// # Arguments
/// * `data` - Flat array of gray bytes (length = width * height)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `lambda` - Edge threshold
/// * `sigma` - Gaussian pre-smoothing, 0 disables
/// * `dt` - Time step
/// * `iterations` - Number of steps
/// * `diffusivity` - "pm1", "pm2" or "charbonnier"
///
/// # Returns
/// Flat array of smoothed gray bytes
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn anisotropic_diffusion_gray_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    lambda: f64,
    sigma: f64,
    dt: f64,
    iterations: usize,
    diffusivity: &str,
) -> Result<Vec<u8>, JsValue> {
    let config = configure(lambda, sigma, dt, iterations, diffusivity).map_err(to_js_error)?;
    let input = Array2::from_shape_vec((height, width), data.to_vec())
        .map_err(|e| to_js_error(e.into()))?;

    let (result, _) = ScalarDiffusion::new(config)
        .apply_with_observer(input.view(), &mut NoopObserver)
        .map_err(to_js_error)?;
    Ok(result.into_raw_vec_and_offset().0)
}

// ============================================================================
// Color Diffusion
// ============================================================================

/// Coupled Perona-Malik diffusion of an RGB image.
///
/// # Arguments
/// * `data` - Flat array of RGB bytes (length = width * height * 3)
/// * Remaining arguments as for [`anisotropic_diffusion_gray_wasm`]
///
/// # Returns
/// Flat array of smoothed RGB bytes
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn anisotropic_diffusion_rgb_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    lambda: f64,
    sigma: f64,
    dt: f64,
    iterations: usize,
    diffusivity: &str,
) -> Result<Vec<u8>, JsValue> {
    let config = configure(lambda, sigma, dt, iterations, diffusivity).map_err(to_js_error)?;
    let input = Array3::from_shape_vec((height, width, 3), data.to_vec())
        .map_err(|e| to_js_error(e.into()))?;

    let (result, _) = MultiChannelDiffusion::new(config)
        .apply_with_observer(input.view(), &mut NoopObserver)
        .map_err(to_js_error)?;
    Ok(result.into_raw_vec_and_offset().0)
}
