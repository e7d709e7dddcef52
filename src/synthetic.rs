//! Seeded synthetic test images.
//!
//! Random background with constant bands, plus additive Gaussian noise,
//! clipped to 0-255. The band layout is defined on a 128x128 reference
//! grid and scales with the requested size:
//!
//! | Image | Rows 30..50           | Columns 40..60        | Noise σ |
//! |-------|-----------------------|-----------------------|---------|
//! | Gray  | 200                   | 50 (wins on overlap)  | 25      |
//! | RGB   | red channel = 200     | green channel = 100   | 20      |

use std::ops::Range;

use ndarray::{Array2, Array3};

use crate::filters::core::{INTENSITY_MAX, INTENSITY_MIN};

const REFERENCE_SIZE: usize = 128;
const ROW_BAND: (usize, usize) = (30, 50);
const COLUMN_BAND: (usize, usize) = (40, 60);

const GRAY_ROW_VALUE: u8 = 200;
const GRAY_COLUMN_VALUE: u8 = 50;
const GRAY_NOISE_SIGMA: f64 = 25.0;

const RGB_ROW_VALUE: u8 = 200;
const RGB_COLUMN_VALUE: u8 = 100;
const RGB_NOISE_SIGMA: f64 = 20.0;

// ============================================================================
// Random source
// ============================================================================

/// Linear congruential generator with the Park-Miller multiplier 48271,
/// increment 1 and modulus 2^31 - 1.
///
/// Identical sequences on every platform for a given seed.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        // Shifted by one so seed 0 still yields a non-degenerate sequence
        SimpleRng {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(48271).wrapping_add(1) % 2147483647;
        self.state as u32
    }

    /// Sample in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 2147483647.0
    }

    fn next_u8(&mut self) -> u8 {
        (self.next_u32() % 256) as u8
    }

    /// N(0, 1) sample from two uniforms. The first uniform is kept away
    /// from 0 so its logarithm stays finite.
    fn next_gaussian(&mut self) -> f64 {
        let u1 = self.next_f64().max(1e-10);
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }
}

fn scaled_band(len: usize, band: (usize, usize)) -> Range<usize> {
    (len * band.0 / REFERENCE_SIZE)..(len * band.1 / REFERENCE_SIZE)
}

fn add_noise(value: u8, sigma: f64, rng: &mut SimpleRng) -> u8 {
    let noisy = f64::from(value) + sigma * rng.next_gaussian();
    noisy.clamp(INTENSITY_MIN, INTENSITY_MAX) as u8
}

// ============================================================================
// Generators
// ============================================================================

/// Noisy grayscale test image with a bright row band and a dark column band.
///
/// # Arguments
/// * `height`, `width` - Output size
/// * `seed` - Same seed, same image
pub fn synthetic_gray(height: usize, width: usize, seed: u64) -> Array2<u8> {
    let mut rng = SimpleRng::new(seed);
    let rows = scaled_band(height, ROW_BAND);
    let columns = scaled_band(width, COLUMN_BAND);

    let mut image = Array2::<u8>::zeros((height, width));
    for ((y, x), pixel) in image.indexed_iter_mut() {
        *pixel = rng.next_u8();
        if rows.contains(&y) {
            *pixel = GRAY_ROW_VALUE;
        }
        if columns.contains(&x) {
            *pixel = GRAY_COLUMN_VALUE;
        }
    }

    image.mapv_inplace(|v| add_noise(v, GRAY_NOISE_SIGMA, &mut rng));
    image
}

/// Noisy RGB test image (height, width, 3) with a red row band and a green column band.
pub fn synthetic_rgb(height: usize, width: usize, seed: u64) -> Array3<u8> {
    let mut rng = SimpleRng::new(seed);
    let rows = scaled_band(height, ROW_BAND);
    let columns = scaled_band(width, COLUMN_BAND);

    let mut image = Array3::<u8>::zeros((height, width, 3));
    for ((y, x, c), pixel) in image.indexed_iter_mut() {
        *pixel = rng.next_u8();
        if c == 0 && rows.contains(&y) {
            *pixel = RGB_ROW_VALUE;
        }
        if c == 1 && columns.contains(&x) {
            *pixel = RGB_COLUMN_VALUE;
        }
    }

    image.mapv_inplace(|v| add_noise(v, RGB_NOISE_SIGMA, &mut rng));
    image
}
