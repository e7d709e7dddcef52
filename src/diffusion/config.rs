//! Diffusion parameters and their validated form.

use crate::error::{DiffusionError, Result};
use crate::filters::diffusivity::DiffusivityLaw;

/// Largest time step for which the explicit scheme is stable on a unit grid
/// with diffusivity bounded by 1.
pub const STABILITY_LIMIT: f64 = 0.25;

/// Unvalidated diffusion parameters.
///
/// Plain fields with defaults; turn them into a [`DiffusionConfig`] with
/// [`DiffusionParams::validate`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DiffusionParams {
    /// Edge threshold, gradients well above it are preserved
    pub lambda: f64,
    /// Pre-smoothing bandwidth, 0 disables smoothing
    pub sigma: f64,
    /// Explicit time step
    pub dt: f64,
    /// Number of explicit steps
    pub iterations: usize,
    /// Diffusivity law
    pub law: DiffusivityLaw,
}

impl Default for DiffusionParams {
    fn default() -> Self {
        Self {
            lambda: 10.0,
            sigma: 1.0,
            dt: 0.25,
            iterations: 50,
            law: DiffusivityLaw::Pm1,
        }
    }
}

impl DiffusionParams {
    /// Check every parameter and produce an immutable config.
    ///
    /// # Errors
    /// [`DiffusionError::InvalidConfiguration`] if `lambda` or `dt` is not a
    /// positive finite number, `sigma` is negative or not finite, or
    /// `iterations` is zero.
    pub fn validate(self) -> Result<DiffusionConfig> {
        if !(self.lambda.is_finite() && self.lambda > 0.0) {
            return Err(invalid(format!("lambda must be positive, got {}", self.lambda)));
        }
        if !(self.sigma.is_finite() && self.sigma >= 0.0) {
            return Err(invalid(format!("sigma must be non-negative, got {}", self.sigma)));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(invalid(format!("dt must be positive, got {}", self.dt)));
        }
        if self.iterations == 0 {
            return Err(invalid("iterations must be at least 1".to_string()));
        }

        if self.dt > STABILITY_LIMIT {
            log::warn!(
                "dt={} exceeds the explicit stability limit {}; the scheme may oscillate",
                self.dt,
                STABILITY_LIMIT
            );
        }

        Ok(DiffusionConfig { params: self })
    }
}

fn invalid(message: String) -> DiffusionError {
    DiffusionError::InvalidConfiguration(message)
}

/// Validated, immutable diffusion configuration.
///
/// Only obtainable through [`DiffusionParams::validate`], [`DiffusionConfig::new`]
/// or [`configure`], so every holder can rely on the parameter ranges.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "DiffusionParams", into = "DiffusionParams"))]
pub struct DiffusionConfig {
    params: DiffusionParams,
}

impl DiffusionConfig {
    pub fn new(
        lambda: f64,
        sigma: f64,
        dt: f64,
        iterations: usize,
        law: DiffusivityLaw,
    ) -> Result<Self> {
        DiffusionParams {
            lambda,
            sigma,
            dt,
            iterations,
            law,
        }
        .validate()
    }

    pub fn lambda(&self) -> f64 {
        self.params.lambda
    }

    pub fn sigma(&self) -> f64 {
        self.params.sigma
    }

    pub fn dt(&self) -> f64 {
        self.params.dt
    }

    pub fn iterations(&self) -> usize {
        self.params.iterations
    }

    pub fn law(&self) -> DiffusivityLaw {
        self.params.law
    }

    /// Copy of this config with another law. Always valid.
    pub fn with_law(self, law: DiffusivityLaw) -> Self {
        Self {
            params: DiffusionParams { law, ..self.params },
        }
    }

    /// Whether `dt` is within [`STABILITY_LIMIT`].
    pub fn is_stable(&self) -> bool {
        self.params.dt <= STABILITY_LIMIT
    }

    pub fn params(&self) -> DiffusionParams {
        self.params
    }
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            params: DiffusionParams::default(),
        }
    }
}

impl TryFrom<DiffusionParams> for DiffusionConfig {
    type Error = DiffusionError;

    fn try_from(params: DiffusionParams) -> Result<Self> {
        params.validate()
    }
}

impl From<DiffusionConfig> for DiffusionParams {
    fn from(config: DiffusionConfig) -> Self {
        config.params
    }
}

/// Build a config from raw values and a law name.
///
/// # Arguments
/// * `lambda` - Edge threshold (> 0)
/// * `sigma` - Pre-smoothing bandwidth (>= 0)
/// * `dt` - Time step (> 0)
/// * `iterations` - Step count (> 0)
/// * `law` - "pm1", "pm2" or "charbonnier"
///
/// # Errors
/// [`DiffusionError::InvalidConfiguration`] for any rejected value.
pub fn configure(
    lambda: f64,
    sigma: f64,
    dt: f64,
    iterations: usize,
    law: &str,
) -> Result<DiffusionConfig> {
    let law: DiffusivityLaw = law.parse()?;
    DiffusionConfig::new(lambda, sigma, dt, iterations, law)
}

/// [`configure`] for callers that hold the iteration count as a signed integer.
///
/// A zero or negative count is rejected like any other invalid parameter,
/// with [`DiffusionError::InvalidConfiguration`].
pub fn configure_signed(
    lambda: f64,
    sigma: f64,
    dt: f64,
    iterations: i64,
    law: &str,
) -> Result<DiffusionConfig> {
    let iterations = usize::try_from(iterations)
        .map_err(|_| invalid(format!("iterations must be at least 1, got {}", iterations)))?;
    configure(lambda, sigma, dt, iterations, law)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_setup() {
        let config = DiffusionConfig::default();
        assert_eq!(config.lambda(), 10.0);
        assert_eq!(config.sigma(), 1.0);
        assert_eq!(config.dt(), 0.25);
        assert_eq!(config.iterations(), 50);
        assert_eq!(config.law(), DiffusivityLaw::Pm1);
        assert!(config.is_stable());
        assert_eq!(DiffusionParams::default().validate().unwrap(), config);
    }

    #[test]
    fn test_configure_parses_law() {
        let config = configure(5.0, 0.0, 0.1, 3, "charbonnier").unwrap();
        assert_eq!(config.law(), DiffusivityLaw::Charbonnier);
        assert_eq!(config.sigma(), 0.0);
        assert_eq!(config.iterations(), 3);
    }

    #[test]
    fn test_configure_rejects_unknown_law() {
        let err = configure(10.0, 1.0, 0.25, 10, "gaussian").unwrap_err();
        assert!(matches!(err, DiffusionError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_configure_signed_rejects_non_positive_iterations() {
        for iterations in [0, -1, i64::MIN] {
            let err = configure_signed(10.0, 1.0, 0.25, iterations, "pm1").unwrap_err();
            assert!(
                matches!(err, DiffusionError::InvalidConfiguration(_)),
                "iterations={}",
                iterations
            );
        }

        let config = configure_signed(10.0, 1.0, 0.25, 7, "pm2").unwrap();
        assert_eq!(config.iterations(), 7);
        assert_eq!(config.law(), DiffusivityLaw::Pm2);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let bad = [
            (0.0, 1.0, 0.25, 10),
            (-1.0, 1.0, 0.25, 10),
            (f64::NAN, 1.0, 0.25, 10),
            (f64::INFINITY, 1.0, 0.25, 10),
            (10.0, -0.5, 0.25, 10),
            (10.0, f64::NAN, 0.25, 10),
            (10.0, 1.0, 0.0, 10),
            (10.0, 1.0, -0.1, 10),
            (10.0, 1.0, 0.25, 0),
        ];
        for (lambda, sigma, dt, iterations) in bad {
            let result = DiffusionConfig::new(lambda, sigma, dt, iterations, DiffusivityLaw::Pm2);
            assert!(
                matches!(result, Err(DiffusionError::InvalidConfiguration(_))),
                "accepted lambda={} sigma={} dt={} iterations={}",
                lambda,
                sigma,
                dt,
                iterations
            );
        }
    }

    #[test]
    fn test_unstable_dt_is_accepted_but_flagged() {
        let config = DiffusionConfig::new(10.0, 1.0, 0.5, 1, DiffusivityLaw::Pm1).unwrap();
        assert!(!config.is_stable());
        assert_eq!(config.dt(), 0.5);
    }

    #[test]
    fn test_with_law_keeps_other_parameters() {
        let config = configure(7.0, 2.0, 0.2, 4, "pm1").unwrap();
        let other = config.with_law(DiffusivityLaw::Pm2);
        assert_eq!(other.law(), DiffusivityLaw::Pm2);
        assert_eq!(other.lambda(), 7.0);
        assert_eq!(other.sigma(), 2.0);
        assert_eq!(other.dt(), 0.2);
        assert_eq!(other.iterations(), 4);
        // Original untouched
        assert_eq!(config.law(), DiffusivityLaw::Pm1);
    }

    #[test]
    fn test_try_from_params() {
        let params = DiffusionParams {
            iterations: 0,
            ..Default::default()
        };
        assert!(DiffusionConfig::try_from(params).is_err());

        let params = DiffusionParams {
            lambda: 15.0,
            iterations: 30,
            ..Default::default()
        };
        let config = DiffusionConfig::try_from(params).unwrap();
        assert_eq!(DiffusionParams::from(config), params);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_validates_on_deserialize() {
        let config: DiffusionConfig =
            serde_json::from_str(r#"{"lambda": 15.0, "law": "charbonnier"}"#).unwrap();
        assert_eq!(config.lambda(), 15.0);
        assert_eq!(config.law(), DiffusivityLaw::Charbonnier);
        assert_eq!(config.iterations(), 50);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"charbonnier\""));

        let rejected: std::result::Result<DiffusionConfig, _> =
            serde_json::from_str(r#"{"dt": -1.0}"#);
        assert!(rejected.is_err());

        let unknown_law: std::result::Result<DiffusionConfig, _> =
            serde_json::from_str(r#"{"law": "tukey"}"#);
        assert!(unknown_law.is_err());
    }
}
