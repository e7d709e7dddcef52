//! Diffusivity (conductance) laws for Perona-Malik diffusion.
//!
//! Each law maps a gradient magnitude `g` and an edge threshold `lambda` to
//! a coefficient in `(0, 1]`:
//!
//! | Law | Formula | Behaviour |
//! |-----|---------|-----------|
//! | `pm1` | `exp(-g^2 / lambda^2)` | fast decay, keeps high-contrast edges |
//! | `pm2` | `1 / (1 + g^2 / lambda^2)` | rational, wider edges pass |
//! | `charbonnier` | `1 / sqrt(1 + g^2 / lambda^2)` | between the two |
//!
//! All three are 1 at `g = 0` and non-increasing in `g`.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView2, Zip};

use crate::error::DiffusionError;

/// Smallest value any law returns.
///
/// `exp(-g^2/lambda^2)` underflows to zero around `g/lambda > 27`; flooring
/// at the smallest positive normal keeps the coefficient strictly positive.
pub const DIFFUSIVITY_FLOOR: f64 = f64::MIN_POSITIVE;

/// Selectable diffusivity law.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DiffusivityLaw {
    /// Perona-Malik exponential law
    #[default]
    Pm1,
    /// Perona-Malik rational law
    Pm2,
    /// Charbonnier law
    Charbonnier,
}

impl DiffusivityLaw {
    /// Every law, in declaration order.
    pub const ALL: [DiffusivityLaw; 3] = [
        DiffusivityLaw::Pm1,
        DiffusivityLaw::Pm2,
        DiffusivityLaw::Charbonnier,
    ];

    /// Canonical lower-case name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            DiffusivityLaw::Pm1 => "pm1",
            DiffusivityLaw::Pm2 => "pm2",
            DiffusivityLaw::Charbonnier => "charbonnier",
        }
    }

    /// Evaluate the law for one gradient magnitude.
    #[inline]
    pub fn evaluate(self, magnitude: f64, lambda: f64) -> f64 {
        match self {
            DiffusivityLaw::Pm1 => pm1(magnitude, lambda),
            DiffusivityLaw::Pm2 => pm2(magnitude, lambda),
            DiffusivityLaw::Charbonnier => charbonnier(magnitude, lambda),
        }
    }

    /// Evaluate the law over a whole magnitude grid.
    pub fn field(self, magnitude: ArrayView2<f64>, lambda: f64) -> Array2<f64> {
        let mut output = Array2::<f64>::zeros(magnitude.dim());
        Zip::from(&mut output)
            .and(magnitude)
            .par_for_each(|g, &m| *g = self.evaluate(m, lambda));
        output
    }
}

impl fmt::Display for DiffusivityLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiffusivityLaw {
    type Err = DiffusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pm1" => Ok(DiffusivityLaw::Pm1),
            "pm2" => Ok(DiffusivityLaw::Pm2),
            "charbonnier" => Ok(DiffusivityLaw::Charbonnier),
            other => Err(DiffusionError::InvalidConfiguration(format!(
                "unknown diffusivity law '{}', expected one of pm1, pm2, charbonnier",
                other
            ))),
        }
    }
}

#[inline]
fn ratio_sq(magnitude: f64, lambda: f64) -> f64 {
    (magnitude * magnitude) / (lambda * lambda)
}

/// `exp(-g^2 / lambda^2)`
#[inline]
pub fn pm1(magnitude: f64, lambda: f64) -> f64 {
    (-ratio_sq(magnitude, lambda)).exp().max(DIFFUSIVITY_FLOOR)
}

/// `1 / (1 + g^2 / lambda^2)`
#[inline]
pub fn pm2(magnitude: f64, lambda: f64) -> f64 {
    (1.0 / (1.0 + ratio_sq(magnitude, lambda))).max(DIFFUSIVITY_FLOOR)
}

/// `1 / sqrt(1 + g^2 / lambda^2)`
#[inline]
pub fn charbonnier(magnitude: f64, lambda: f64) -> f64 {
    (1.0 / (1.0 + ratio_sq(magnitude, lambda)).sqrt()).max(DIFFUSIVITY_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn sample_magnitudes() -> Vec<f64> {
        let mut samples: Vec<f64> = (0..=2000).map(|i| i as f64 * 0.25).collect();
        samples.extend([1e3, 1e4, 1e6, 1e154, 1e200, f64::MAX]);
        samples
    }

    #[test]
    fn test_all_laws_equal_one_at_zero() {
        for law in DiffusivityLaw::ALL {
            for lambda in [0.5, 5.0, 10.0, 15.0] {
                assert_eq!(law.evaluate(0.0, lambda), 1.0, "{} at lambda={}", law, lambda);
            }
        }
    }

    #[test]
    fn test_all_laws_bounded_in_unit_interval() {
        for law in DiffusivityLaw::ALL {
            for g in sample_magnitudes() {
                let c = law.evaluate(g, 10.0);
                assert!(c > 0.0 && c <= 1.0, "{}({}) = {}", law, g, c);
            }
        }
    }

    #[test]
    fn test_all_laws_monotonically_non_increasing() {
        for law in DiffusivityLaw::ALL {
            for lambda in [1.0, 10.0] {
                let values: Vec<f64> = sample_magnitudes()
                    .into_iter()
                    .map(|g| law.evaluate(g, lambda))
                    .collect();
                for pair in values.windows(2) {
                    assert!(pair[1] <= pair[0], "{} increased: {:?}", law, pair);
                }
            }
        }
    }

    #[test]
    fn test_closed_forms_at_lambda() {
        // g = lambda gives ratio 1
        assert_relative_eq!(pm1(10.0, 10.0), (-1.0f64).exp(), epsilon = 1e-12);
        assert_relative_eq!(pm2(10.0, 10.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(charbonnier(10.0, 10.0), 1.0 / 2.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_law_ordering() {
        // For g > 0: pm1 <= pm2 <= charbonnier
        for g in [1.0, 5.0, 20.0] {
            assert!(pm1(g, 10.0) <= pm2(g, 10.0));
            assert!(pm2(g, 10.0) <= charbonnier(g, 10.0));
        }
    }

    #[test]
    fn test_field_matches_pointwise() {
        let mag = array![[0.0, 5.0], [10.0, 50.0]];
        let field = DiffusivityLaw::Pm2.field(mag.view(), 5.0);
        assert_eq!(field.dim(), (2, 2));
        assert_eq!(field[[0, 0]], 1.0);
        assert_relative_eq!(field[[0, 1]], 0.5, epsilon = 1e-12);
        assert_relative_eq!(field[[1, 0]], 0.2, epsilon = 1e-12);
        assert_relative_eq!(field[[1, 1]], 1.0 / 101.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("pm1".parse::<DiffusivityLaw>().unwrap(), DiffusivityLaw::Pm1);
        assert_eq!("PM2".parse::<DiffusivityLaw>().unwrap(), DiffusivityLaw::Pm2);
        assert_eq!(
            " charbonnier ".parse::<DiffusivityLaw>().unwrap(),
            DiffusivityLaw::Charbonnier
        );
        for law in DiffusivityLaw::ALL {
            assert_eq!(law.to_string().parse::<DiffusivityLaw>().unwrap(), law);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "tukey".parse::<DiffusivityLaw>().unwrap_err();
        assert!(matches!(err, DiffusionError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("tukey"));
    }
}
