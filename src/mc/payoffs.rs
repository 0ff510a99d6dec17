//! Option Payoff Functions
//!
//! # Mathematical Definitions
//!
//! - **Call**: max(S_T - K, 0), the right to buy at strike K
//! - **Put**: max(K - S_T, 0), the right to sell at strike K
//!
//! Only the terminal price enters the payoff. Intermediate path values are
//! never used for pricing.

use crate::error::{validation::*, SdeError, SdeResult};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn from_call_flag(call: bool) -> Self {
        if call {
            OptionType::Call
        } else {
            OptionType::Put
        }
    }
}

/// European payoff on the terminal price
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payoff {
    /// European call option: max(S_T - K, 0)
    EuropeanCall { k: f64 },

    /// European put option: max(K - S_T, 0)
    EuropeanPut { k: f64 },
}

impl Payoff {
    pub fn new(option_type: OptionType, k: f64) -> Self {
        match option_type {
            OptionType::Call => Payoff::EuropeanCall { k },
            OptionType::Put => Payoff::EuropeanPut { k },
        }
    }

    /// Payoff for one terminal price. Never negative.
    pub fn calculate(&self, s_t: f64) -> f64 {
        match self {
            Payoff::EuropeanCall { k } => (s_t - k).max(0.0),
            Payoff::EuropeanPut { k } => (k - s_t).max(0.0),
        }
    }
}

/// Contract terms, combined with a simulation only at pricing time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractParams {
    pub strike: f64,
    pub option_type: OptionType,
    /// Risk-free rate used for discounting
    pub r: f64,
    /// Expiry, in years
    pub t: f64,
}

impl ContractParams {
    pub fn new(strike: f64, call: bool, r: f64, t: f64) -> Self {
        Self::with_type(strike, OptionType::from_call_flag(call), r, t)
    }

    pub fn with_type(strike: f64, option_type: OptionType, r: f64, t: f64) -> Self {
        Self {
            strike,
            option_type,
            r,
            t,
        }
    }

    pub fn validate(&self) -> SdeResult<()> {
        validate_positive("strike", self.strike)?;
        validate_finite("r", self.r)?;
        validate_non_negative("t", self.t)?;
        Ok(())
    }

    pub fn payoff(&self) -> Payoff {
        Payoff::new(self.option_type, self.strike)
    }

    /// Risk-neutral discount factor `exp(-rT)`
    pub fn discount_factor(&self) -> f64 {
        (-self.r * self.t).exp()
    }
}

/// One non-negative payoff per simulated path.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoffVector {
    values: Array1<f64>,
}

impl PayoffVector {
    /// # Errors
    ///
    /// - `InvalidParameter` for an empty input, a non-positive terminal price
    ///   or invalid contract terms
    /// - `NumericAnomaly` for a non-finite terminal price
    pub fn from_terminal(terminal: ArrayView1<'_, f64>, contract: &ContractParams) -> SdeResult<Self> {
        contract.validate()?;
        if terminal.is_empty() {
            return Err(SdeError::InvalidParameter {
                parameter: "terminal_prices".to_string(),
                value: 0.0,
                constraint: "must contain at least one path".to_string(),
            });
        }
        for (n, &s_t) in terminal.iter().enumerate() {
            if !s_t.is_finite() {
                return Err(SdeError::NumericAnomaly {
                    context: format!("terminal price of path {}", n),
                    value: s_t,
                });
            }
            validate_positive("terminal_price", s_t)?;
        }

        let payoff = contract.payoff();
        Ok(Self {
            values: terminal.mapv(|s_t| payoff.calculate(s_t)),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn mean(&self) -> f64 {
        self.values.sum() / self.len() as f64
    }

    /// Unbiased sample variance; zero for a single path.
    pub fn sample_variance(&self) -> f64 {
        let n = self.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.mean();
        self.values.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    }
}
