//! Image file I/O.
//!
//! - `load_grayscale` / `load_rgb`: decode any format the `image` crate
//!   supports (PNG and JPEG enabled) into `(H, W)` or `(H, W, 3)` arrays.
//! - `save_grayscale` / `save_rgb`: encode by file extension, creating
//!   missing parent directories.

use std::fs;
use std::path::Path;

use image::{GrayImage, RgbImage};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, ErrorKind, ShapeError};

use crate::error::{DiffusionError, Result};

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(DiffusionError::ImageNotFound(path.to_path_buf()))
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn incompatible_shape() -> DiffusionError {
    DiffusionError::InvalidShape(ShapeError::from_kind(ErrorKind::IncompatibleShape))
}

/// Load an image from disk as 8-bit grayscale, shape (height, width).
///
/// # Errors
/// * [`DiffusionError::ImageNotFound`] if `path` does not exist
/// * [`DiffusionError::Image`] if decoding fails
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<Array2<u8>> {
    let path = path.as_ref();
    ensure_exists(path)?;

    let img = image::open(path)?.into_luma8();
    let (width, height) = (img.width() as usize, img.height() as usize);
    Ok(Array2::from_shape_vec((height, width), img.into_raw())?)
}

/// Load an image from disk as 8-bit RGB, shape (height, width, 3).
pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<Array3<u8>> {
    let path = path.as_ref();
    ensure_exists(path)?;

    let img = image::open(path)?.into_rgb8();
    let (width, height) = (img.width() as usize, img.height() as usize);
    Ok(Array3::from_shape_vec((height, width, 3), img.into_raw())?)
}

/// Save a (height, width) grid as a grayscale image.
pub fn save_grayscale<P: AsRef<Path>>(path: P, image: ArrayView2<u8>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;

    let (height, width) = image.dim();
    let raw: Vec<u8> = image.iter().copied().collect();
    let buffer = GrayImage::from_raw(width as u32, height as u32, raw)
        .ok_or_else(incompatible_shape)?;
    buffer.save(path)?;
    log::debug!("saved {}x{} grayscale image to {}", width, height, path.display());
    Ok(())
}

/// Save a (height, width, 3) stack as an RGB image.
///
/// # Errors
/// [`DiffusionError::InvalidShape`] unless the stack has exactly 3 channels.
pub fn save_rgb<P: AsRef<Path>>(path: P, image: ArrayView3<u8>) -> Result<()> {
    let path = path.as_ref();
    let (height, width, channels) = image.dim();
    if channels != 3 {
        return Err(incompatible_shape());
    }
    ensure_parent_dir(path)?;

    let raw: Vec<u8> = image.iter().copied().collect();
    let buffer = RgbImage::from_raw(width as u32, height as u32, raw)
        .ok_or_else(incompatible_shape)?;
    buffer.save(path)?;
    log::debug!("saved {}x{} RGB image to {}", width, height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{synthetic_gray, synthetic_rgb};

    #[test]
    fn test_grayscale_png_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gray.png");
        let image = synthetic_gray(12, 20, 1);

        save_grayscale(&path, image.view()).unwrap();
        let loaded = load_grayscale(&path).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_rgb_png_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        let image = synthetic_rgb(9, 7, 2);

        save_rgb(&path, image.view()).unwrap();
        assert_eq!(load_rgb(&path).unwrap(), image);

        // Loading a colour file as grayscale converts it
        assert_eq!(load_grayscale(&path).unwrap().dim(), (9, 7));
    }

    #[test]
    fn test_non_contiguous_view_saved_in_logical_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transposed.png");
        let image = synthetic_gray(6, 4, 3);

        save_grayscale(&path, image.t()).unwrap();
        assert_eq!(load_grayscale(&path).unwrap(), image.t());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does_not_exist.png");
        match load_grayscale(&path) {
            Err(DiffusionError::ImageNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected ImageNotFound, got {:?}", other),
        }
        assert!(matches!(load_rgb(&path), Err(DiffusionError::ImageNotFound(_))));
    }

    #[test]
    fn test_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        fs::write(&path, b"not an image").unwrap();
        assert!(matches!(load_grayscale(&path), Err(DiffusionError::Image(_))));
    }

    #[test]
    fn test_rgb_requires_three_channels() {
        let dir = tempfile::tempdir().unwrap();
        let image = Array3::<u8>::zeros((4, 4, 4));
        assert!(matches!(
            save_rgb(dir.path().join("rgba.png"), image.view()),
            Err(DiffusionError::InvalidShape(_))
        ));
    }
}
