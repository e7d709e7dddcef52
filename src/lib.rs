//! Nonlinear (Perona-Malik) image diffusion
//!
//! Edge-preserving smoothing of grayscale and multi-channel images with an
//! explicit finite-difference scheme, with Python bindings via PyO3 and
//! WASM bindings for JavaScript.
//!
//! ## Image Format
//! - **Grayscale**: (height, width), any numeric pixel type convertible to `f64`
//! - **Multi-channel**: (height, width, channels), channels coupled through
//!   one shared diffusivity field
//!
//! Processing runs in `f64` on the 0-255 intensity scale; results are
//! clipped and quantized to `u8`.
//!
//! ## Diffusivity Laws
//! - `pm1`: `exp(-(|grad|/lambda)^2)`
//! - `pm2`: `1 / (1 + (|grad|/lambda)^2)`
//! - `charbonnier`: `1 / sqrt(1 + (|grad|/lambda)^2)`
//!
//! ## Example
//! ```
//! use nonlinear_diffusion::{apply_scalar, configure, synthetic::synthetic_gray};
//!
//! let image = synthetic_gray(32, 32, 0);
//! let config = configure(10.0, 1.0, 0.25, 5, "pm2").unwrap();
//! let (smoothed, history) = apply_scalar(image.view(), &config).unwrap();
//! assert_eq!(smoothed.dim(), (32, 32));
//! assert_eq!(history.len(), 5);
//! ```

pub mod diffusion;
pub mod error;
pub mod filters;
pub mod io;
pub mod synthetic;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use diffusion::sweep;
pub use diffusion::{
    apply_multi_channel, apply_scalar, configure, ChannelStats, DiffusionConfig, DiffusionParams,
    GrayStats, IterationObserver, MultiChannelDiffusion, NoopObserver, ProgressLogger,
    ScalarDiffusion, StatisticsHistory,
};
pub use error::{DiffusionError, Result};
pub use filters::blur::{GaussianSmoother, Smoother};
pub use filters::diffusivity::DiffusivityLaw;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::exceptions::{PyFileNotFoundError, PyIOError, PyValueError};
    use pyo3::prelude::*;
    use pyo3::types::PyDict;

    use crate::diffusion::{apply_multi_channel, apply_scalar, configure_signed};
    use crate::error::DiffusionError;

    fn to_py_err(err: DiffusionError) -> PyErr {
        match err {
            DiffusionError::ImageNotFound(_) => PyFileNotFoundError::new_err(err.to_string()),
            DiffusionError::Io(_) | DiffusionError::Image(_) => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }

    fn channel_suffix(channel: usize, channels: usize) -> String {
        match (channels, channel) {
            (3, 0) => "r".to_string(),
            (3, 1) => "g".to_string(),
            (3, 2) => "b".to_string(),
            _ => channel.to_string(),
        }
    }

    // ========================================================================
    // Grayscale Diffusion
    // ========================================================================

    /// Perona-Malik diffusion of a grayscale u8 image.
    ///
    /// # Arguments
    /// * `image` - Input image (height, width)
    /// * `lambda_param` - Edge threshold (default: 10.0)
    /// * `sigma` - Gaussian pre-smoothing, 0 disables (default: 1.0)
    /// * `dt` - Time step (default: 0.25)
    /// * `num_iterations` - Number of steps (default: 50)
    /// * `diffusivity` - "pm1", "pm2" or "charbonnier" (default: "pm1")
    ///
    /// # Returns
    /// Tuple of the smoothed image and a dict with per-iteration lists
    /// `mean`, `variance` and `gradient_magnitude`
    #[pyfunction]
    #[pyo3(signature = (
        image,
        lambda_param=10.0,
        sigma=1.0,
        dt=0.25,
        num_iterations=50,
        diffusivity="pm1",
    ))]
    pub fn anisotropic_diffusion<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        lambda_param: f64,
        sigma: f64,
        dt: f64,
        num_iterations: i64,
        diffusivity: &str,
    ) -> PyResult<(Bound<'py, PyArray2<u8>>, Bound<'py, PyDict>)> {
        let config = configure_signed(lambda_param, sigma, dt, num_iterations, diffusivity)
            .map_err(to_py_err)?;
        let (result, history) = apply_scalar(image.as_array(), &config).map_err(to_py_err)?;

        let stats = PyDict::new(py);
        stats.set_item("mean", history.means())?;
        stats.set_item("variance", history.variances())?;
        stats.set_item("gradient_magnitude", history.gradient_magnitudes())?;

        Ok((result.into_pyarray(py), stats))
    }

    // ========================================================================
    // Color Diffusion
    // ========================================================================

    /// Coupled Perona-Malik diffusion of a multi-channel u8 image.
    ///
    /// Same parameters as `anisotropic_diffusion`. The statistics dict holds
    /// `mean_r`/`mean_g`/`mean_b` and `variance_r`/`variance_g`/`variance_b`
    /// for 3-channel input (`mean_0`, `mean_1`, ... otherwise) plus
    /// `gradient_magnitude`.
    #[pyfunction]
    #[pyo3(signature = (
        image,
        lambda_param=10.0,
        sigma=1.0,
        dt=0.25,
        num_iterations=50,
        diffusivity="pm1",
    ))]
    pub fn anisotropic_diffusion_color<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        lambda_param: f64,
        sigma: f64,
        dt: f64,
        num_iterations: i64,
        diffusivity: &str,
    ) -> PyResult<(Bound<'py, PyArray3<u8>>, Bound<'py, PyDict>)> {
        let config = configure_signed(lambda_param, sigma, dt, num_iterations, diffusivity)
            .map_err(to_py_err)?;
        let input = image.as_array();
        let channels = input.dim().2;
        let (result, history) = apply_multi_channel(input, &config).map_err(to_py_err)?;

        let stats = PyDict::new(py);
        for channel in 0..channels {
            let suffix = channel_suffix(channel, channels);
            stats.set_item(format!("mean_{}", suffix), history.channel_means(channel))?;
            stats.set_item(format!("variance_{}", suffix), history.channel_variances(channel))?;
        }
        stats.set_item("gradient_magnitude", history.gradient_magnitudes())?;

        Ok((result.into_pyarray(py), stats))
    }

    /// Names accepted by the `diffusivity` argument.
    #[pyfunction]
    pub fn diffusivity_laws() -> Vec<&'static str> {
        crate::filters::diffusivity::DiffusivityLaw::ALL
            .iter()
            .map(|law| law.name())
            .collect()
    }

    /// Python module definition
    #[pymodule]
    pub fn nonlinear_diffusion(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(anisotropic_diffusion, m)?)?;
        m.add_function(wrap_pyfunction!(anisotropic_diffusion_color, m)?)?;
        m.add_function(wrap_pyfunction!(diffusivity_laws, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::nonlinear_diffusion;
