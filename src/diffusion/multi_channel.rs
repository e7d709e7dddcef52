//! Vector-valued (e.g. RGB) diffusion driver.
//!
//! All channels share one diffusivity field computed from the sum of their
//! smoothed gradient magnitudes. An edge in any channel therefore blocks
//! diffusion in every channel, which keeps colour edges aligned instead of
//! letting each channel develop its own.

use ndarray::{Array2, Array3, ArrayView3};
use rayon::prelude::*;

use super::config::DiffusionConfig;
use super::observer::{IterationObserver, ProgressLogger};
use super::stats::{ChannelStats, StatisticsHistory};
use super::step::{diffuse, edge_magnitude};
use crate::error::{ensure_same_shape, DiffusionError, Result};
use crate::filters::blur::{GaussianSmoother, Smoother};
use crate::filters::core::{
    grid_sum, mean_and_variance, quantize_u8, split_channels, stack_channels,
};

/// Result of one coupled step.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiChannelStep {
    /// Updated channels, in input order
    pub channels: Vec<Array2<f64>>,
    /// Sum over the grid of the channel-summed smoothed gradient magnitude
    /// that drove this step's diffusivity
    pub combined_gradient_magnitude: f64,
}

/// Runs coupled Perona-Malik diffusion on multi-channel images.
#[derive(Clone, Debug)]
pub struct MultiChannelDiffusion<S = GaussianSmoother> {
    config: DiffusionConfig,
    smoother: S,
}

impl MultiChannelDiffusion {
    pub fn new(config: DiffusionConfig) -> Self {
        Self::with_smoother(config, GaussianSmoother)
    }
}

impl<S: Smoother> MultiChannelDiffusion<S> {
    pub fn with_smoother(config: DiffusionConfig, smoother: S) -> Self {
        Self { config, smoother }
    }

    pub fn config(&self) -> &DiffusionConfig {
        &self.config
    }

    /// One coupled step over every channel.
    ///
    /// # Errors
    /// * [`DiffusionError::EmptyImage`] when `channels` is empty
    /// * [`DiffusionError::ShapeMismatch`] when channels differ in shape
    pub fn step(&self, channels: &[Array2<f64>]) -> Result<MultiChannelStep> {
        let first = channels.first().ok_or(DiffusionError::EmptyImage)?;
        let shape = first.dim();
        for channel in channels {
            ensure_same_shape(shape, channel.dim())?;
        }

        let sigma = self.config.sigma();
        let magnitudes = channels
            .par_iter()
            .map(|channel| edge_magnitude(channel.view(), sigma, &self.smoother))
            .collect::<Result<Vec<_>>>()?;

        // Summed in channel order so the result is independent of scheduling
        let mut combined = Array2::<f64>::zeros(shape);
        for magnitude in &magnitudes {
            combined += magnitude;
        }

        let diffusivity = self
            .config
            .law()
            .field(combined.view(), self.config.lambda());

        let dt = self.config.dt();
        let updated = channels
            .par_iter()
            .map(|channel| diffuse(channel.view(), diffusivity.view(), dt))
            .collect::<Result<Vec<_>>>()?;

        Ok(MultiChannelStep {
            channels: updated,
            combined_gradient_magnitude: grid_sum(combined.view()),
        })
    }

    /// Diffuse an image of shape (height, width, channels), logging progress every 10 iterations.
    ///
    /// # Returns
    /// Quantized image with the input shape and one [`ChannelStats`] record per iteration
    pub fn apply<A>(
        &self,
        image: ArrayView3<A>,
    ) -> Result<(Array3<u8>, StatisticsHistory<ChannelStats>)>
    where
        A: Copy + Into<f64>,
    {
        self.apply_with_observer(image, &mut ProgressLogger::default())
    }

    /// Like [`apply`](Self::apply) with a caller-supplied observer.
    pub fn apply_with_observer<A, O>(
        &self,
        image: ArrayView3<A>,
        observer: &mut O,
    ) -> Result<(Array3<u8>, StatisticsHistory<ChannelStats>)>
    where
        A: Copy + Into<f64>,
        O: IterationObserver<ChannelStats> + ?Sized,
    {
        let (height, width, channel_count) = image.dim();
        if height == 0 || width == 0 || channel_count == 0 {
            return Err(DiffusionError::EmptyImage);
        }

        let (channels, history) = self.evolve(split_channels(image), observer)?;
        let stacked = stack_channels(&channels)?;
        Ok((quantize_u8(stacked.view()), history))
    }

    /// Run every iteration on per-channel float grids and return them unquantized.
    pub fn evolve<O>(
        &self,
        mut channels: Vec<Array2<f64>>,
        observer: &mut O,
    ) -> Result<(Vec<Array2<f64>>, StatisticsHistory<ChannelStats>)>
    where
        O: IterationObserver<ChannelStats> + ?Sized,
    {
        let (height, width) = channels.first().ok_or(DiffusionError::EmptyImage)?.dim();
        if height == 0 || width == 0 {
            return Err(DiffusionError::EmptyImage);
        }

        let total = self.config.iterations();
        log::debug!(
            "multi-channel diffusion: {}x{}x{}, law={}, lambda={}, sigma={}, dt={}, iterations={}",
            width,
            height,
            channels.len(),
            self.config.law(),
            self.config.lambda(),
            self.config.sigma(),
            self.config.dt(),
            total
        );

        let mut history = StatisticsHistory::with_capacity(total);
        for iteration in 1..=total {
            let step = self.step(&channels)?;
            channels = step.channels;

            let (means, variances): (Vec<f64>, Vec<f64>) = channels
                .iter()
                .map(|channel| mean_and_variance(channel.view()))
                .unzip();
            let record = ChannelStats {
                means,
                variances,
                gradient_magnitude: step.combined_gradient_magnitude,
            };
            observer.on_iteration(iteration, total, &record);
            history.push(record);
        }

        Ok((channels, history))
    }
}

/// Diffuse a multi-channel image with the default Gaussian smoother.
pub fn apply_multi_channel<A>(
    image: ArrayView3<A>,
    config: &DiffusionConfig,
) -> Result<(Array3<u8>, StatisticsHistory<ChannelStats>)>
where
    A: Copy + Into<f64>,
{
    MultiChannelDiffusion::new(*config).apply(image)
}
