//! Perona-Malik diffusion drivers.
//!
//! ## Pipeline (one iteration)
//!
//! 1. Smooth each channel with a Gaussian of scale `sigma` (skipped at 0)
//! 2. Gradient magnitude of the smoothed grid
//! 3. Diffusivity `g(|grad|)` under the configured law
//! 4. Flux `g * grad(u)` on the unsmoothed grid, then its divergence
//! 5. `u + dt * div`, clipped to 0-255
//!
//! The scalar driver runs this on a single grid. The multi-channel driver
//! sums the channel magnitudes before step 3, so all channels share one
//! diffusivity field.

pub mod config;
pub mod multi_channel;
pub mod observer;
pub mod scalar;
pub mod stats;
pub mod step;
pub mod sweep;

pub use config::{configure, configure_signed, DiffusionConfig, DiffusionParams, STABILITY_LIMIT};
pub use multi_channel::{apply_multi_channel, MultiChannelDiffusion, MultiChannelStep};
pub use observer::{IterationObserver, NoopObserver, ProgressLogger};
pub use scalar::{apply_scalar, ScalarDiffusion};
pub use stats::{ChannelStats, GrayStats, IterationRecord, StatisticsHistory};
pub use step::{diffuse, diffusion_step};
pub use sweep::{
    compare_parameters, compare_parameters_with, ParameterSweep, SweepRun, SweptParameter,
};
