// src/analytics/bs_analytic.rs
//! Analytical Black-Scholes-Merton prices for European options
//!
//! # Mathematical Foundation
//!
//! Under the Black-Scholes model with continuous dividend yield `q`, the
//! underlying follows:
//! ```text
//! dS_t = (r - q) S_t dt + σ S_t dW_t
//! ```
//!
//! The risk-neutral pricing formula gives:
//! ```text
//! V(S,t) = e^(-r(T-t)) * E^Q[payoff(S_T) | S_t = S]
//! ```
//!
//! which has a closed form in terms of the cumulative normal Φ(x). These
//! prices serve as the reference for Monte Carlo estimates.

use crate::math_utils::norm_cdf;
use crate::mc::payoffs::OptionType;

/// `(d₁, d₂)`, or `None` when `σ√T` is zero
fn d1_d2(s: f64, k: f64, t: f64, r: f64, q: f64, sigma: f64) -> Option<(f64, f64)> {
    let vol_sqrt_t = sigma * t.sqrt();
    if vol_sqrt_t <= 0.0 {
        return None;
    }
    let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / vol_sqrt_t;
    Some((d1, d1 - vol_sqrt_t))
}

/// Black-Scholes-Merton European option price
///
/// # Formula
/// ```text
/// C = S e^(-qT) Φ(d₁) - K e^(-rT) Φ(d₂)
/// P = K e^(-rT) Φ(-d₂) - S e^(-qT) Φ(-d₁)
/// ```
///
/// Where:
/// ```text
/// d₁ = [ln(S/K) + (r - q + σ²/2)T] / (σ√T)
/// d₂ = d₁ - σ√T
/// ```
///
/// With `σ√T = 0` the price is the discounted intrinsic value of the forward.
///
/// # Parameters
/// - `s0`: Current stock price
/// - `k`: Strike price
/// - `t`: Time to expiration
/// - `r`: Risk-free rate
/// - `q`: Continuous dividend yield
/// - `sigma`: Volatility
pub fn analytic_price(
    s0: f64,
    k: f64,
    t: f64,
    r: f64,
    q: f64,
    sigma: f64,
    option_type: OptionType,
) -> f64 {
    let spot_df = (-q * t).exp();
    let strike_df = (-r * t).exp();

    match (d1_d2(s0, k, t, r, q, sigma), option_type) {
        (Some((d1, d2)), OptionType::Call) => {
            s0 * spot_df * norm_cdf(d1) - k * strike_df * norm_cdf(d2)
        }
        (Some((d1, d2)), OptionType::Put) => {
            k * strike_df * norm_cdf(-d2) - s0 * spot_df * norm_cdf(-d1)
        }
        (None, OptionType::Call) => (s0 * spot_df - k * strike_df).max(0.0),
        (None, OptionType::Put) => (k * strike_df - s0 * spot_df).max(0.0),
    }
}

pub fn bs_call_price(s: f64, k: f64, t: f64, r: f64, q: f64, sigma: f64) -> f64 {
    analytic_price(s, k, t, r, q, sigma, OptionType::Call)
}

pub fn bs_put_price(s: f64, k: f64, t: f64, r: f64, q: f64, sigma: f64) -> f64 {
    analytic_price(s, k, t, r, q, sigma, OptionType::Put)
}

/// Put-call parity right-hand side
///
/// # Formula
/// ```text
/// C - P = S e^(-qT) - K e^(-rT)
/// ```
pub fn put_call_parity_gap(s: f64, k: f64, t: f64, r: f64, q: f64) -> f64 {
    s * (-q * t).exp() - k * (-r * t).exp()
}
