//! Grayscale diffusion driver.

use ndarray::{Array2, ArrayView2};

use super::config::DiffusionConfig;
use super::observer::{IterationObserver, ProgressLogger};
use super::stats::{GrayStats, StatisticsHistory};
use super::step::diffusion_step;
use crate::error::{DiffusionError, Result};
use crate::filters::blur::{GaussianSmoother, Smoother};
use crate::filters::core::{mean_and_variance, quantize_u8, to_f64_grid};
use crate::filters::gradient::total_gradient_magnitude;

/// Runs Perona-Malik diffusion on single-channel images.
///
/// Holds an immutable [`DiffusionConfig`] and the smoother used for edge
/// estimation. Reusable across images and safe to share between threads.
#[derive(Clone, Debug)]
pub struct ScalarDiffusion<S = GaussianSmoother> {
    config: DiffusionConfig,
    smoother: S,
}

impl ScalarDiffusion {
    pub fn new(config: DiffusionConfig) -> Self {
        Self::with_smoother(config, GaussianSmoother)
    }
}

impl<S: Smoother> ScalarDiffusion<S> {
    pub fn with_smoother(config: DiffusionConfig, smoother: S) -> Self {
        Self { config, smoother }
    }

    pub fn config(&self) -> &DiffusionConfig {
        &self.config
    }

    /// One explicit step; see [`diffusion_step`].
    pub fn step(&self, grid: ArrayView2<f64>) -> Result<Array2<f64>> {
        diffusion_step(grid, &self.config, &self.smoother)
    }

    /// Diffuse an 8-bit (or any numeric) image, logging progress every 10 iterations.
    ///
    /// # Returns
    /// Quantized result and one [`GrayStats`] record per iteration
    pub fn apply<A>(
        &self,
        image: ArrayView2<A>,
    ) -> Result<(Array2<u8>, StatisticsHistory<GrayStats>)>
    where
        A: Copy + Into<f64>,
    {
        self.apply_with_observer(image, &mut ProgressLogger::default())
    }

    /// Like [`apply`](Self::apply) with a caller-supplied observer.
    pub fn apply_with_observer<A, O>(
        &self,
        image: ArrayView2<A>,
        observer: &mut O,
    ) -> Result<(Array2<u8>, StatisticsHistory<GrayStats>)>
    where
        A: Copy + Into<f64>,
        O: IterationObserver<GrayStats> + ?Sized,
    {
        let (grid, history) = self.evolve(to_f64_grid(image), observer)?;
        Ok((quantize_u8(grid.view()), history))
    }

    /// Run every iteration on a float grid and return it unquantized.
    pub fn evolve<O>(
        &self,
        mut grid: Array2<f64>,
        observer: &mut O,
    ) -> Result<(Array2<f64>, StatisticsHistory<GrayStats>)>
    where
        O: IterationObserver<GrayStats> + ?Sized,
    {
        let (height, width) = grid.dim();
        if height == 0 || width == 0 {
            return Err(DiffusionError::EmptyImage);
        }

        let total = self.config.iterations();
        log::debug!(
            "scalar diffusion: {}x{}, law={}, lambda={}, sigma={}, dt={}, iterations={}",
            width,
            height,
            self.config.law(),
            self.config.lambda(),
            self.config.sigma(),
            self.config.dt(),
            total
        );

        let mut history = StatisticsHistory::with_capacity(total);
        for iteration in 1..=total {
            grid = self.step(grid.view())?;

            let record = gray_stats(grid.view());
            observer.on_iteration(iteration, total, &record);
            history.push(record);
        }

        Ok((grid, history))
    }
}

fn gray_stats(grid: ArrayView2<f64>) -> GrayStats {
    let (mean, variance) = mean_and_variance(grid);
    GrayStats {
        mean,
        variance,
        gradient_magnitude: total_gradient_magnitude(grid),
    }
}

/// Diffuse a grayscale image with the default Gaussian smoother.
pub fn apply_scalar<A>(
    image: ArrayView2<A>,
    config: &DiffusionConfig,
) -> Result<(Array2<u8>, StatisticsHistory<GrayStats>)>
where
    A: Copy + Into<f64>,
{
    ScalarDiffusion::new(*config).apply(image)
}
