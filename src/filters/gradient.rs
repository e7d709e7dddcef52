//! Central-difference gradient operator.
//!
//! `gx[y, x] = (I[y, x+1] - I[y, x-1]) / 2` and
//! `gy[y, x] = (I[y+1, x] - I[y-1, x]) / 2`, evaluated on the grid padded by
//! one sample of edge replication. Border pixels therefore get a centered
//! difference against a copy of themselves instead of a one-sided one.
//! Padding is implicit: neighbour indices are clamped into the grid.

use ndarray::{Array2, ArrayView2, Zip};

/// Horizontal and vertical derivatives of a grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientField {
    /// Derivative along x (columns)
    pub gx: Array2<f64>,
    /// Derivative along y (rows)
    pub gy: Array2<f64>,
}

impl GradientField {
    /// Euclidean magnitude per pixel: `sqrt(gx^2 + gy^2)`
    pub fn magnitude(&self) -> Array2<f64> {
        gradient_magnitude(self.gx.view(), self.gy.view())
    }

    pub fn dim(&self) -> (usize, usize) {
        self.gx.dim()
    }
}

/// Compute both central-difference derivatives of `input`.
pub fn central_gradients(input: ArrayView2<f64>) -> GradientField {
    GradientField {
        gx: gradient_x(input),
        gy: gradient_y(input),
    }
}

/// Derivative along x only.
pub fn gradient_x(input: ArrayView2<f64>) -> Array2<f64> {
    let (height, width) = input.dim();
    let mut output = Array2::<f64>::zeros((height, width));

    Zip::indexed(&mut output).par_for_each(|(y, x), out| {
        let left = x.saturating_sub(1);
        let right = (x + 1).min(width - 1);
        *out = (input[[y, right]] - input[[y, left]]) / 2.0;
    });

    output
}

/// Derivative along y only.
pub fn gradient_y(input: ArrayView2<f64>) -> Array2<f64> {
    let (height, width) = input.dim();
    let mut output = Array2::<f64>::zeros((height, width));

    Zip::indexed(&mut output).par_for_each(|(y, x), out| {
        let up = y.saturating_sub(1);
        let down = (y + 1).min(height - 1);
        *out = (input[[down, x]] - input[[up, x]]) / 2.0;
    });

    output
}

/// Elementwise `sqrt(gx^2 + gy^2)`.
pub fn gradient_magnitude(gx: ArrayView2<f64>, gy: ArrayView2<f64>) -> Array2<f64> {
    let mut output = Array2::<f64>::zeros(gx.dim());
    Zip::from(&mut output)
        .and(gx)
        .and(gy)
        .par_for_each(|m, &x, &y| *m = (x * x + y * y).sqrt());
    output
}

/// Sum of the gradient magnitude over the whole grid.
pub fn total_gradient_magnitude(input: ArrayView2<f64>) -> f64 {
    central_gradients(input).magnitude().iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_linear_ramp_has_unit_x_gradient() {
        // I[y, x] = x
        let ramp = Array2::from_shape_fn((5, 6), |(_, x)| x as f64);
        let grad = central_gradients(ramp.view());

        for y in 0..5 {
            for x in 1..5 {
                assert_abs_diff_eq!(grad.gx[[y, x]], 1.0, epsilon = 1e-12);
            }
            // Edge replication halves the border difference
            assert_abs_diff_eq!(grad.gx[[y, 0]], 0.5, epsilon = 1e-12);
            assert_abs_diff_eq!(grad.gx[[y, 5]], 0.5, epsilon = 1e-12);
        }
        assert!(grad.gy.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_vertical_ramp_has_unit_y_gradient() {
        let ramp = Array2::from_shape_fn((4, 3), |(y, _)| 2.0 * y as f64);
        let grad = central_gradients(ramp.view());

        assert_abs_diff_eq!(grad.gy[[1, 1]], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grad.gy[[2, 0]], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grad.gy[[0, 2]], 1.0, epsilon = 1e-12);
        assert!(grad.gx.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_constant_grid_has_zero_gradient() {
        let flat = Array2::<f64>::from_elem((3, 3), 100.0);
        let grad = central_gradients(flat.view());
        assert!(grad.magnitude().iter().all(|&v| v == 0.0));
        assert_eq!(total_gradient_magnitude(flat.view()), 0.0);
    }

    #[test]
    fn test_single_pixel_grid() {
        let one = array![[9.0]];
        let grad = central_gradients(one.view());
        assert_eq!(grad.dim(), (1, 1));
        assert_eq!(grad.gx[[0, 0]], 0.0);
        assert_eq!(grad.gy[[0, 0]], 0.0);
    }

    #[test]
    fn test_magnitude() {
        let gx = array![[3.0, 0.0]];
        let gy = array![[4.0, -2.0]];
        let mag = gradient_magnitude(gx.view(), gy.view());
        assert_abs_diff_eq!(mag[[0, 0]], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mag[[0, 1]], 2.0, epsilon = 1e-12);
    }
}
