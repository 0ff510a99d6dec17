// src/analytics/convergence.rs
//! Convergence of the Monte Carlo estimate to a reference price.
//!
//! The study reruns the full pipeline for increasing path counts. Every run
//! gets its own seed, derived from the base seed through
//! [`RngFactory::stream_seed`], so the points are independent and can be
//! computed concurrently in any order.
//!
//! The reference price comes from an oracle closure; [`convergence_study`]
//! uses the Black-Scholes closed form.

use crate::error::{validation::*, SdeError, SdeResult};
use crate::math_utils::Timer;
use crate::mc::mc_engine::{mc_price_option_gbm, McConfig};
use crate::rng::RngFactory;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    pub paths: usize,
    pub mc_price: f64,
    pub std_error: f64,
    pub analytic_price: f64,
    pub abs_error: f64,
    pub elapsed_ms: f64,
}

impl ConvergencePoint {
    /// Error measured in standard errors
    pub fn z_score(&self) -> Option<f64> {
        (self.std_error > 0.0).then(|| (self.mc_price - self.analytic_price) / self.std_error)
    }
}

/// Convergence study against the Black-Scholes price.
pub fn convergence_study(base: &McConfig, sample_counts: &[usize]) -> SdeResult<Vec<ConvergencePoint>> {
    convergence_study_with_oracle(base, sample_counts, McConfig::analytic_price)
}

/// Convergence study against an arbitrary reference price.
///
/// Points are returned in the order of `sample_counts`.
pub fn convergence_study_with_oracle<F>(
    base: &McConfig,
    sample_counts: &[usize],
    oracle: F,
) -> SdeResult<Vec<ConvergencePoint>>
where
    F: Fn(&McConfig) -> f64 + Sync,
{
    if sample_counts.is_empty() {
        return Err(SdeError::InvalidConfiguration {
            field: "sample_counts".to_string(),
            reason: "at least one sample count is required".to_string(),
        });
    }
    base.validate()?;

    let reference = ensure_finite("analytic reference price", oracle(base))?;
    let factory = RngFactory::new(base.seed);
    info!(
        points = sample_counts.len(),
        reference, "starting convergence study"
    );

    sample_counts
        .par_iter()
        .enumerate()
        .map(|(index, &paths)| {
            let cfg = McConfig {
                paths,
                seed: factory.stream_seed(index as u64),
                ..base.clone()
            };

            let timer = Timer::new();
            let result = mc_price_option_gbm(&cfg)?;
            let point = ConvergencePoint {
                paths,
                mc_price: result.option_price,
                std_error: result.std_error,
                analytic_price: reference,
                abs_error: (result.option_price - reference).abs(),
                elapsed_ms: timer.elapsed_ms(),
            };
            debug!(paths, abs_error = point.abs_error, "convergence point");
            Ok(point)
        })
        .collect()
}

/// Mean absolute error against the Black-Scholes price over `trials`
/// independent runs of `paths` paths each.
pub fn mean_abs_error(base: &McConfig, paths: usize, trials: usize) -> SdeResult<f64> {
    validate_count("trials", trials)?;
    let reference = base.analytic_price();
    let factory = RngFactory::new(base.seed ^ paths as u64);

    let total = (0..trials)
        .into_par_iter()
        .map(|trial| {
            let cfg = McConfig {
                paths,
                seed: factory.stream_seed(trial as u64),
                ..base.clone()
            };
            mc_price_option_gbm(&cfg).map(|r| (r.option_price - reference).abs())
        })
        .collect::<SdeResult<Vec<f64>>>()?
        .into_iter()
        .sum::<f64>();

    Ok(total / trials as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> McConfig {
        McConfig {
            steps: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_points_follow_sample_counts() {
        let counts = [100, 1_000, 5_000];
        let points = convergence_study(&small_config(), &counts).unwrap();

        assert_eq!(points.len(), 3);
        for (point, &n) in points.iter().zip(counts.iter()) {
            assert_eq!(point.paths, n);
            assert!(point.abs_error >= 0.0);
            assert_eq!(point.analytic_price, points[0].analytic_price);
        }
    }

    #[test]
    fn test_study_is_reproducible() {
        let counts = [200, 400];
        let a = convergence_study(&small_config(), &counts).unwrap();
        let b = convergence_study(&small_config(), &counts).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.mc_price, y.mc_price);
        }
    }

    #[test]
    fn test_z_score() {
        let point = ConvergencePoint {
            paths: 100,
            mc_price: 5.0,
            std_error: 0.5,
            analytic_price: 4.0,
            abs_error: 1.0,
            elapsed_ms: 0.0,
        };
        assert_eq!(point.z_score(), Some(2.0));
        assert_eq!(ConvergencePoint { std_error: 0.0, ..point }.z_score(), None);
    }

    #[test]
    fn test_custom_oracle() {
        let points = convergence_study_with_oracle(&small_config(), &[100], |_| 0.0).unwrap();
        assert_eq!(points[0].analytic_price, 0.0);
        assert_eq!(points[0].abs_error, points[0].mc_price.abs());
    }

    #[test]
    fn test_empty_counts_rejected() {
        assert!(matches!(
            convergence_study(&small_config(), &[]),
            Err(SdeError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(matches!(
            convergence_study(&small_config(), &[100, 0]),
            Err(SdeError::InvalidParameter { .. })
        ));
    }
}
