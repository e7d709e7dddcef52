//! Error type shared by the diffusion engine and its I/O helpers.

use std::path::PathBuf;

/// Errors produced while configuring or running a diffusion.
#[derive(thiserror::Error, Debug)]
pub enum DiffusionError {
    /// A parameter or diffusivity law name was rejected before any iteration ran.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Two grids that must share a shape do not.
    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// The input has no pixels or no channels.
    #[error("Image is empty")]
    EmptyImage,

    /// The image source does not exist.
    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    /// Decoding or encoding failed.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Raw pixel data could not be arranged into the requested shape.
    #[error("Invalid shape")]
    InvalidShape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, DiffusionError>;

/// Fail with [`DiffusionError::ShapeMismatch`] unless both shapes agree.
pub(crate) fn ensure_same_shape(expected: (usize, usize), found: (usize, usize)) -> Result<()> {
    if expected != found {
        return Err(DiffusionError::ShapeMismatch { expected, found });
    }
    Ok(())
}
