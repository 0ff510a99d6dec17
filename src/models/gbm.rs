// src/models/gbm.rs
use super::model::LogSdeModel;
use crate::error::{validation::*, SdeError, SdeResult};
use serde::Serialize;

/// Parameters of one simulation run.
///
/// Built only through [`SimulationParams::new`], which rejects invalid
/// values, so a value of this type is always simulatable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationParams {
    t: f64,
    steps: usize,
    paths: usize,
    volatility: f64,
    drift: f64,
    s0: f64,
}

impl SimulationParams {
    /// # Errors
    ///
    /// `InvalidParameter` when `t`, `s0` are not positive, `steps` or `paths`
    /// is zero, `volatility` is negative, any value is not finite, or the
    /// number of draws does not fit in `usize`.
    pub fn new(
        t: f64,
        steps: usize,
        paths: usize,
        volatility: f64,
        drift: f64,
        s0: f64,
    ) -> SdeResult<Self> {
        validate_positive("t", t)?;
        validate_count("steps", steps)?;
        validate_count("paths", paths)?;
        validate_non_negative("volatility", volatility)?;
        validate_finite("drift", drift)?;
        validate_positive("s0", s0)?;
        if steps.checked_mul(paths).is_none() {
            return Err(SdeError::InvalidParameter {
                parameter: "paths".to_string(),
                value: paths as f64,
                constraint: format!("steps * paths overflows with steps = {}", steps),
            });
        }

        Ok(Self {
            t,
            steps,
            paths,
            volatility,
            drift,
            s0,
        })
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn paths(&self) -> usize {
        self.paths
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn drift(&self) -> f64 {
        self.drift
    }

    pub fn s0(&self) -> f64 {
        self.s0
    }

    pub fn dt(&self) -> f64 {
        self.t / self.steps as f64
    }

    /// Total number of normal draws a run consumes.
    pub fn draws_required(&self) -> usize {
        self.steps * self.paths
    }
}

/// Geometric Brownian Motion `dS = μ S dt + σ S dW`.
///
/// In log-space `X = ln S` this is arithmetic Brownian motion with constant
/// coefficients `a = μ - σ²/2` and `b = σ`.
#[derive(Debug, Clone, Copy)]
pub struct Gbm {
    pub s0: f64,
    pub mu: f64,
    pub sigma: f64,
}

impl Gbm {
    pub fn new(s0: f64, mu: f64, sigma: f64) -> Self {
        Gbm { s0, mu, sigma }
    }

    pub fn from_params(params: &SimulationParams) -> Self {
        Gbm::new(params.s0(), params.drift(), params.volatility())
    }

    /// Exact transition `S_{t+dt}` given `S_t` and a standard normal draw.
    pub fn exact_step(&self, s_t: f64, dt: f64, normal_draw: f64) -> f64 {
        s_t * ((self.mu - 0.5 * self.sigma * self.sigma) * dt
            + self.sigma * dt.sqrt() * normal_draw)
            .exp()
    }
}

impl LogSdeModel for Gbm {
    fn log_drift(&self, _x: f64, _t: f64) -> f64 {
        self.mu - 0.5 * self.sigma * self.sigma
    }

    fn log_diffusion(&self, _x: f64, _t: f64) -> f64 {
        self.sigma
    }

    fn initial_log_state(&self) -> f64 {
        self.s0.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_params_accept_valid() {
        let params = SimulationParams::new(0.5, 100, 10_000, 0.25, 0.03, 100.0).unwrap();
        assert_eq!(params.steps(), 100);
        assert_eq!(params.paths(), 10_000);
        assert_eq!(params.draws_required(), 1_000_000);
        assert_relative_eq!(params.dt(), 0.005);
    }

    #[test]
    fn test_params_allow_zero_volatility_and_negative_drift() {
        assert!(SimulationParams::new(1.0, 1, 1, 0.0, -0.1, 50.0).is_ok());
    }

    #[test]
    fn test_params_reject_invalid() {
        let cases = [
            ("t", SimulationParams::new(0.0, 10, 10, 0.2, 0.0, 100.0)),
            ("t", SimulationParams::new(-1.0, 10, 10, 0.2, 0.0, 100.0)),
            ("steps", SimulationParams::new(1.0, 0, 10, 0.2, 0.0, 100.0)),
            ("paths", SimulationParams::new(1.0, 10, 0, 0.2, 0.0, 100.0)),
            ("volatility", SimulationParams::new(1.0, 10, 10, -0.2, 0.0, 100.0)),
            ("drift", SimulationParams::new(1.0, 10, 10, 0.2, f64::NAN, 100.0)),
            ("s0", SimulationParams::new(1.0, 10, 10, 0.2, 0.0, 0.0)),
            ("s0", SimulationParams::new(1.0, 10, 10, 0.2, 0.0, -5.0)),
        ];

        for (name, result) in cases {
            match result {
                Err(SdeError::InvalidParameter { parameter, .. }) => assert_eq!(parameter, name),
                other => panic!("expected InvalidParameter for {}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_log_coefficients() {
        let gbm = Gbm::new(100.0, 0.05, 0.2);
        assert_relative_eq!(gbm.log_drift(0.0, 0.0), 0.03);
        assert_relative_eq!(gbm.log_diffusion(0.0, 0.0), 0.2);
        assert_relative_eq!(gbm.initial_log_state(), 100.0_f64.ln());
    }

    #[test]
    fn test_exact_step_zero_draw() {
        let gbm = Gbm::new(100.0, 0.05, 0.2);
        let next = gbm.exact_step(100.0, 0.1, 0.0);
        assert_relative_eq!(next, 100.0 * (0.03_f64 * 0.1).exp(), max_relative = 1e-14);
    }
}
