//! # mc-pricer: Monte Carlo European Option Pricing under GBM
//!
//! Prices European calls and puts by simulating Geometric Brownian Motion in
//! log-space and discounting the mean terminal payoff, then checks the
//! estimate against the Black-Scholes closed form.
//!
//! ## Components
//!
//! - **Path Simulator** ([`mc::paths`]): `steps × N` matrix of GBM prices,
//!   vectorized or step-by-step, plus a rayon variant with per-path substreams
//! - **Option Pricer** ([`mc::mc_engine`]): payoff vector, mean, discount
//! - **Analytic Oracle** ([`analytics::bs_analytic`]): Black-Scholes-Merton
//!   with dividend yield, used only for validation
//! - **Convergence study** ([`analytics::convergence`]): repeated runs with
//!   growing path counts
//!
//! ## Quick Start
//!
//! ```rust
//! use mc_pricer::mc::mc_engine::{mc_price_option_gbm, McConfig};
//! use mc_pricer::mc::payoffs::OptionType;
//!
//! let config = McConfig {
//!     paths: 20_000,
//!     steps: 50,
//!     s0: 100.0,      // Spot price
//!     r: 0.05,        // Risk-free rate
//!     q: 0.02,        // Dividend yield
//!     sigma: 0.25,    // Volatility
//!     t: 0.5,         // Time to expiration
//!     strike: 110.0,
//!     option_type: OptionType::Call,
//!     ..Default::default()
//! };
//!
//! let result = mc_price_option_gbm(&config).expect("Valid configuration");
//! println!(
//!     "Option price: {:.4} ± {:.4} (Black-Scholes {:.4})",
//!     result.option_price,
//!     result.std_error,
//!     config.analytic_price()
//! );
//! ```
//!
//! ## Lower-level API
//!
//! ```rust
//! use mc_pricer::mc::mc_engine::price;
//! use mc_pricer::mc::paths::simulate;
//! use mc_pricer::mc::payoffs::ContractParams;
//! use mc_pricer::models::gbm::SimulationParams;
//! use mc_pricer::rng::seed_rng_from_u64;
//!
//! let params = SimulationParams::new(1.0, 252, 1_000, 0.2, 0.03, 100.0).unwrap();
//! let paths = simulate(&params, &mut seed_rng_from_u64(42)).unwrap();
//! assert_eq!(paths.shape(), (252, 1_000));
//!
//! let contract = ContractParams::new(105.0, true, 0.03, 1.0);
//! let result = price(&paths, &contract).unwrap();
//! assert!(result.option_price >= 0.0);
//! ```

pub mod analytics;
pub mod error;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod output;
pub mod rng;
pub mod solvers;

pub use error::{SdeError, SdeResult};
