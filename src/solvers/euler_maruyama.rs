// src/solvers/euler_maruyama.rs
//! Euler-Maruyama Scheme in Log-Space
//!
//! # Mathematical Framework
//!
//! For an SDE on the log-state `X = ln S`:
//! ```text
//! dX_t = a(X_t, t) dt + b(X_t, t) dW_t
//! ```
//!
//! The Euler-Maruyama scheme provides the discretization:
//! ```text
//! X_{n+1} = X_n + a(X_n, t_n) Δt + b(X_n, t_n) √Δt Z_n
//! ```
//!
//! with `Z_n ~ N(0,1)` independent. Prices are recovered as `S = exp(X)`,
//! so they stay strictly positive whatever the draw.
//!
//! # Convergence Properties
//!
//! - **Strong convergence**: Order 0.5 in step size
//! - **Weak convergence**: Order 1.0 in step size
//! - For GBM the log coefficients are constant and the scheme reproduces the
//!   exact transition law at every step size.

use crate::models::model::LogSdeModel;
use crate::rng::NormalSource;
use crate::error::SdeResult;

/// Euler-Maruyama numerical scheme for log-space SDE integration
pub struct EulerMaruyama;

impl EulerMaruyama {
    /// Single step driven by a given standard normal draw `z`.
    ///
    /// # Parameters
    /// - `model`: log-space SDE model providing drift and diffusion
    /// - `x`: current log-state (modified in-place)
    /// - `t`: current time
    /// - `dt`: time step size
    /// - `z`: standard normal draw
    pub fn step_with_draw<M: LogSdeModel + ?Sized>(model: &M, x: &mut f64, t: f64, dt: f64, z: f64) {
        let drift_term = model.log_drift(*x, t) * dt;
        let diffusion_term = model.log_diffusion(*x, t) * dt.sqrt() * z;
        *x += drift_term + diffusion_term;
    }

    /// Single step consuming one draw from `source`.
    pub fn step<M: LogSdeModel + ?Sized, S: NormalSource + ?Sized>(
        model: &M,
        x: &mut f64,
        t: f64,
        dt: f64,
        source: &mut S,
    ) -> SdeResult<()> {
        let z = source.next_normal()?;
        Self::step_with_draw(model, x, t, dt, z);
        Ok(())
    }
}
