// src/mc/mc_engine.rs
use crate::analytics::bs_analytic;
use crate::error::{validation::*, SdeResult};
use crate::mc::paths::{simulate_parallel, simulate_with_scheme, PricePathMatrix, SimulationScheme};
use crate::mc::payoffs::{ContractParams, OptionType, PayoffVector};
use crate::models::gbm::SimulationParams;
use crate::rng::{self, RngFactory};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Discounted Monte Carlo estimate for one contract
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Mean of the payoff vector
    pub expected_payoff: f64,
    /// `exp(-rT) * expected_payoff`
    pub option_price: f64,
    /// Discounted standard error of the mean, zero for a single path
    pub std_error: f64,
    pub paths: usize,
}

impl PricingResult {
    /// Symmetric interval `price ± z * std_error`
    pub fn confidence_interval(&self, z: f64) -> (f64, f64) {
        (
            self.option_price - z * self.std_error,
            self.option_price + z * self.std_error,
        )
    }
}

/// Price a contract from a simulated path matrix, using its final row.
pub fn price(paths: &PricePathMatrix, contract: &ContractParams) -> SdeResult<PricingResult> {
    price_terminal(paths.terminal_prices(), contract)
}

/// Price a contract from terminal prices alone.
///
/// # Errors
///
/// `InvalidParameter` for an empty input, non-positive prices or strike,
/// negative expiry; `NumericAnomaly` when a price or the result is not
/// finite.
pub fn price_terminal<'a, T>(terminal: T, contract: &ContractParams) -> SdeResult<PricingResult>
where
    T: Into<ArrayView1<'a, f64>>,
{
    let payoffs = PayoffVector::from_terminal(terminal.into(), contract)?;
    price_payoffs(&payoffs, contract)
}

/// Mean, then discount.
///
/// # Errors
///
/// `InvalidParameter` when the contract terms are invalid.
pub fn price_payoffs(payoffs: &PayoffVector, contract: &ContractParams) -> SdeResult<PricingResult> {
    contract.validate()?;
    let n = payoffs.len();
    let discount = contract.discount_factor();

    let expected_payoff = ensure_finite("expected payoff", payoffs.mean())?;
    let option_price = ensure_finite("option price", discount * expected_payoff)?;
    let std_error = ensure_finite(
        "standard error",
        discount * (payoffs.sample_variance() / n as f64).sqrt(),
    )?;

    Ok(PricingResult {
        expected_payoff,
        option_price,
        std_error,
        paths: n,
    })
}

/// Full pricing run: simulation parameters, contract, seed and scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McConfig {
    pub paths: usize,
    pub steps: usize,
    pub s0: f64,
    pub r: f64,
    /// Continuous dividend yield
    pub q: f64,
    pub sigma: f64,
    pub t: f64,
    pub strike: f64,
    pub option_type: OptionType,
    pub seed: u64,
    pub scheme: SimulationScheme,
    /// Generate paths with rayon, one substream per path. Ignores `scheme`.
    pub parallel: bool,
}

impl McConfig {
    /// Validate the Monte Carlo configuration
    pub fn validate(&self) -> SdeResult<()> {
        validate_finite("q", self.q)?;
        self.simulation_params()?;
        self.contract().validate()
    }

    /// Simulation parameters under the risk-neutral drift `r - q`
    pub fn simulation_params(&self) -> SdeResult<SimulationParams> {
        SimulationParams::new(
            self.t,
            self.steps,
            self.paths,
            self.sigma,
            self.r - self.q,
            self.s0,
        )
    }

    pub fn contract(&self) -> ContractParams {
        ContractParams::with_type(self.strike, self.option_type, self.r, self.t)
    }

    /// Black-Scholes reference value for the same inputs
    pub fn analytic_price(&self) -> f64 {
        bs_analytic::analytic_price(
            self.s0,
            self.strike,
            self.t,
            self.r,
            self.q,
            self.sigma,
            self.option_type,
        )
    }
}

impl Default for McConfig {
    fn default() -> Self {
        McConfig {
            paths: 10_000,
            steps: 100,
            s0: 100.0,
            r: 0.05,
            q: 0.02,
            sigma: 0.25,
            t: 0.5,
            strike: 110.0,
            option_type: OptionType::Call,
            seed: 12345,
            scheme: SimulationScheme::Vectorized,
            parallel: false,
        }
    }
}

/// Simulate and price, keeping the path matrix for reporting.
pub fn mc_simulate_and_price(cfg: &McConfig) -> SdeResult<(PricePathMatrix, PricingResult)> {
    cfg.validate()?;
    let params = cfg.simulation_params()?;

    let paths = if cfg.parallel {
        simulate_parallel(&params, &RngFactory::new(cfg.seed))?
    } else {
        let mut rng = rng::seed_rng_from_u64(cfg.seed);
        simulate_with_scheme(&params, &mut rng, cfg.scheme)?
    };
    let result = price(&paths, &cfg.contract())?;

    debug!(
        paths = result.paths,
        price = result.option_price,
        std_error = result.std_error,
        "Monte Carlo price"
    );
    Ok((paths, result))
}

/// Monte Carlo price of a European option under GBM
///
/// # Math Framework
///
/// Simulates the risk-neutral GBM
/// ```text
/// dS_t = (r - q) S_t dt + σ S_t dW_t
/// ```
/// in log-space, then estimates
/// ```text
/// V = e^(-rT) * (1/N) Σ payoff(S_T^(n))
/// ```
///
/// # Errors
///
/// Returns `SdeError` for invalid configuration or a non-finite result.
pub fn mc_price_option_gbm(cfg: &McConfig) -> SdeResult<PricingResult> {
    mc_simulate_and_price(cfg).map(|(_, result)| result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdeError;
    use approx::assert_relative_eq;

    #[test]
    fn test_price_terminal_discounts_mean() {
        let contract = ContractParams::new(100.0, true, 0.05, 2.0);
        let result = price_terminal(&[90.0, 110.0, 130.0][..], &contract).unwrap();

        assert_relative_eq!(result.expected_payoff, 40.0 / 3.0, max_relative = 1e-12);
        assert_relative_eq!(
            result.option_price,
            (-0.1_f64).exp() * 40.0 / 3.0,
            max_relative = 1e-12
        );
        assert_eq!(result.paths, 3);
    }

    #[test]
    fn test_price_terminal_put() {
        let contract = ContractParams::new(100.0, false, 0.0, 1.0);
        let terminal = vec![90.0, 110.0];
        let result = price_terminal(&terminal, &contract).unwrap();
        assert_relative_eq!(result.expected_payoff, 5.0);
        assert_relative_eq!(result.option_price, 5.0);
    }

    #[test]
    fn test_single_path_has_zero_std_error() {
        let contract = ContractParams::new(100.0, true, 0.05, 1.0);
        let result = price_terminal(&[105.0][..], &contract).unwrap();
        assert_eq!(result.std_error, 0.0);
        assert_eq!(result.confidence_interval(1.96), (result.option_price, result.option_price));
    }

    #[test]
    fn test_price_payoffs_revalidates_contract() {
        let built_under = ContractParams::new(100.0, true, 0.05, 1.0);
        let payoffs = PayoffVector::from_terminal((&[110.0, 120.0][..]).into(), &built_under).unwrap();
        assert!(price_payoffs(&payoffs, &built_under).is_ok());

        let negative_expiry = ContractParams::new(100.0, true, 0.05, -1.0);
        assert!(matches!(
            price_payoffs(&payoffs, &negative_expiry),
            Err(SdeError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_empty_terminal_rejected() {
        let contract = ContractParams::new(100.0, true, 0.05, 1.0);
        let empty: [f64; 0] = [];
        assert!(matches!(
            price_terminal(&empty[..], &contract),
            Err(SdeError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        assert!(McConfig::default().validate().is_ok());

        let bad = [
            McConfig { paths: 0, ..Default::default() },
            McConfig { steps: 0, ..Default::default() },
            McConfig { s0: 0.0, ..Default::default() },
            McConfig { t: 0.0, ..Default::default() },
            McConfig { sigma: -0.1, ..Default::default() },
            McConfig { strike: 0.0, ..Default::default() },
            McConfig { q: f64::NAN, ..Default::default() },
        ];
        for cfg in bad.iter() {
            assert!(
                matches!(cfg.validate(), Err(SdeError::InvalidParameter { .. })),
                "config should be rejected: {:?}",
                cfg
            );
        }
    }

    #[test]
    fn test_risk_neutral_drift() {
        let params = McConfig::default().simulation_params().unwrap();
        assert_relative_eq!(params.drift(), 0.03, max_relative = 1e-12);
    }

    #[test]
    fn test_pipeline_is_reproducible() {
        let cfg = McConfig { paths: 2_000, steps: 20, ..Default::default() };
        let a = mc_price_option_gbm(&cfg).unwrap();
        let b = mc_price_option_gbm(&cfg).unwrap();
        assert_eq!(a, b);

        let par = McConfig { parallel: true, ..cfg.clone() };
        assert_eq!(mc_price_option_gbm(&par).unwrap(), mc_price_option_gbm(&par).unwrap());
    }

    #[test]
    fn test_zero_volatility_prices_forward_intrinsic() {
        let cfg = McConfig {
            paths: 10,
            steps: 5,
            sigma: 0.0,
            strike: 90.0,
            ..Default::default()
        };
        let result = mc_price_option_gbm(&cfg).unwrap();
        let forward = cfg.s0 * ((cfg.r - cfg.q) * cfg.t).exp();
        assert_relative_eq!(result.expected_payoff, forward - 90.0, max_relative = 1e-10);
        assert_relative_eq!(result.option_price, cfg.analytic_price(), max_relative = 1e-10);
        assert!(result.std_error < 1e-10);
    }
}
