//! Parameter sweeps over the edge threshold λ and the smoothing scale σ.
//!
//! Runs the scalar driver once per value, holding the other parameters at
//! their defaults: λ runs keep σ = 1, σ runs keep λ = 10. Every run is
//! independent, so runs execute in parallel.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

use super::config::{DiffusionConfig, DiffusionParams};
use super::observer::NoopObserver;
use super::scalar::ScalarDiffusion;
use super::stats::{GrayStats, StatisticsHistory};
use crate::error::{DiffusionError, Result};
use crate::filters::core::{quantize_u8, to_f64_grid};
use crate::filters::diffusivity::DiffusivityLaw;

/// λ values compared when the caller has no preference.
pub const DEFAULT_LAMBDAS: [f64; 3] = [5.0, 10.0, 20.0];

/// σ values compared when the caller has no preference.
pub const DEFAULT_SIGMAS: [f64; 3] = [0.5, 1.0, 2.0];

/// Which parameter a run varies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweptParameter {
    Lambda,
    Sigma,
}

/// One finished run of a sweep.
#[derive(Clone, Debug)]
pub struct SweepRun {
    pub parameter: SweptParameter,
    pub value: f64,
    pub config: DiffusionConfig,
    pub image: Array2<u8>,
    pub history: StatisticsHistory<GrayStats>,
}

/// All runs of a sweep, in the order the values were given.
#[derive(Clone, Debug, Default)]
pub struct ParameterSweep {
    pub lambda_runs: Vec<SweepRun>,
    pub sigma_runs: Vec<SweepRun>,
}

impl ParameterSweep {
    pub fn len(&self) -> usize {
        self.lambda_runs.len() + self.sigma_runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn runs(&self) -> impl Iterator<Item = &SweepRun> {
        self.lambda_runs.iter().chain(self.sigma_runs.iter())
    }
}

/// Compare λ and σ values for one diffusivity law with default dt and iterations.
pub fn compare_parameters<A>(
    image: ArrayView2<A>,
    law: DiffusivityLaw,
    lambdas: &[f64],
    sigmas: &[f64],
) -> Result<ParameterSweep>
where
    A: Copy + Into<f64>,
{
    let base = DiffusionParams {
        law,
        ..DiffusionParams::default()
    };
    compare_parameters_with(image, &base, lambdas, sigmas)
}

/// Like [`compare_parameters`], varying λ and σ around `base`.
///
/// Every configuration is validated before any run starts, so an invalid
/// value fails the sweep without wasted work.
///
/// # Errors
/// * [`DiffusionError::InvalidConfiguration`] for any invalid λ or σ
/// * [`DiffusionError::EmptyImage`] for a zero-sized image
pub fn compare_parameters_with<A>(
    image: ArrayView2<A>,
    base: &DiffusionParams,
    lambdas: &[f64],
    sigmas: &[f64],
) -> Result<ParameterSweep>
where
    A: Copy + Into<f64>,
{
    let (height, width) = image.dim();
    if height == 0 || width == 0 {
        return Err(DiffusionError::EmptyImage);
    }

    let mut plan = Vec::with_capacity(lambdas.len() + sigmas.len());
    for &lambda in lambdas {
        let config = DiffusionParams { lambda, ..*base }.validate()?;
        plan.push((SweptParameter::Lambda, lambda, config));
    }
    for &sigma in sigmas {
        let config = DiffusionParams { sigma, ..*base }.validate()?;
        plan.push((SweptParameter::Sigma, sigma, config));
    }

    log::debug!(
        "parameter sweep: {} lambda runs, {} sigma runs, law={}",
        lambdas.len(),
        sigmas.len(),
        base.law
    );

    let grid = to_f64_grid(image);
    let runs = plan
        .into_par_iter()
        .map(|(parameter, value, config)| -> Result<SweepRun> {
            let (result, history) =
                ScalarDiffusion::new(config).evolve(grid.clone(), &mut NoopObserver)?;
            Ok(SweepRun {
                parameter,
                value,
                config,
                image: quantize_u8(result.view()),
                history,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let (lambda_runs, sigma_runs): (Vec<SweepRun>, Vec<SweepRun>) = runs
        .into_iter()
        .partition(|run| run.parameter == SweptParameter::Lambda);

    Ok(ParameterSweep {
        lambda_runs,
        sigma_runs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diffusion::scalar::apply_scalar;
    use crate::synthetic::synthetic_gray;

    fn quick_base() -> DiffusionParams {
        DiffusionParams {
            iterations: 3,
            ..DiffusionParams::default()
        }
    }

    #[test]
    fn test_run_counts_and_order() {
        let image = synthetic_gray(16, 16, 1);
        let sweep = compare_parameters_with(
            image.view(),
            &quick_base(),
            &DEFAULT_LAMBDAS,
            &DEFAULT_SIGMAS,
        )
        .unwrap();

        assert_eq!(sweep.len(), 6);
        let lambdas: Vec<f64> = sweep.lambda_runs.iter().map(|r| r.value).collect();
        let sigmas: Vec<f64> = sweep.sigma_runs.iter().map(|r| r.value).collect();
        assert_eq!(lambdas, DEFAULT_LAMBDAS.to_vec());
        assert_eq!(sigmas, DEFAULT_SIGMAS.to_vec());
        assert!(sweep.runs().all(|r| r.history.len() == 3));
    }

    #[test]
    fn test_fixed_parameters_held_at_base() {
        let image = synthetic_gray(16, 16, 2);
        let sweep = compare_parameters_with(image.view(), &quick_base(), &[7.0], &[1.5]).unwrap();

        let lambda_run = &sweep.lambda_runs[0];
        assert_eq!(lambda_run.config.lambda(), 7.0);
        assert_eq!(lambda_run.config.sigma(), 1.0);

        let sigma_run = &sweep.sigma_runs[0];
        assert_eq!(sigma_run.config.lambda(), 10.0);
        assert_eq!(sigma_run.config.sigma(), 1.5);
    }

    #[test]
    fn test_runs_match_direct_application() {
        let image = synthetic_gray(12, 12, 3);
        let sweep = compare_parameters_with(image.view(), &quick_base(), &[20.0], &[]).unwrap();
        let run = &sweep.lambda_runs[0];

        let (direct, history) = apply_scalar(image.view(), &run.config).unwrap();
        assert_eq!(run.image, direct);
        assert_eq!(run.history, history);
    }

    #[test]
    fn test_law_is_applied() {
        let image = synthetic_gray(8, 8, 4);
        let sweep =
            compare_parameters(image.view(), DiffusivityLaw::Charbonnier, &[10.0], &[]).unwrap();
        assert_eq!(sweep.lambda_runs[0].config.law(), DiffusivityLaw::Charbonnier);
        assert_eq!(sweep.lambda_runs[0].config.iterations(), 50);
    }

    #[test]
    fn test_invalid_value_fails_sweep() {
        let image = synthetic_gray(8, 8, 5);
        let result =
            compare_parameters_with(image.view(), &quick_base(), &[10.0, -1.0], &DEFAULT_SIGMAS);
        assert!(matches!(result, Err(DiffusionError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_empty_sweep() {
        let image = synthetic_gray(8, 8, 6);
        let sweep = compare_parameters_with(image.view(), &quick_base(), &[], &[]).unwrap();
        assert!(sweep.is_empty());
    }
}
