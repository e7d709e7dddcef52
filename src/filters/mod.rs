//! Grid filters used by the diffusion engine.
//!
//! ## Grid Format
//!
//! All filters work on single-channel `f64` grids of shape (height, width).
//! Multi-channel images use the (height, width, channels) layout and are
//! split into per-channel grids with [`core::split_channels`].
//!
//! | Module | Contents |
//! |--------|----------|
//! | `core` | Gaussian kernel, boundary indexing, clipping, statistics |
//! | `blur` | Separable Gaussian smoothing behind the `Smoother` trait |
//! | `gradient` | Central-difference gradient and magnitude |
//! | `diffusivity` | pm1, pm2 and charbonnier conductance laws |
//!
//! Per-pixel loops run in parallel through rayon; every output element only
//! reads a fixed neighbourhood of its input, so results do not depend on
//! the thread count.

pub mod blur;
pub mod core;
pub mod diffusivity;
pub mod gradient;
