// src/mc/paths.rs
//! GBM path simulation.
//!
//! Paths follow `S_t = S0 * exp(X_t)` where the log-state is advanced by the
//! Euler-Maruyama scheme
//! ```text
//! X_t = X_{t-1} + (μ - σ²/2) Δt + σ √Δt Z_t,    X_0 = ln S0
//! ```
//!
//! # Memory Layout
//!
//! The result is a `steps × paths` matrix: row `t` holds every path at time
//! `(t + 1) Δt`, column `n` is one trajectory. `S0` itself is not stored.
//!
//! # Draw Ordering
//!
//! [`SimulationScheme::Vectorized`] and [`SimulationScheme::StepByStep`]
//! consume the random source **time-major, then path-major**: draw
//! `k = t * paths + n` drives step `t` of path `n`. Fed with the same seeded
//! source, both schemes return the same matrix.
//!
//! [`simulate_parallel`] instead gives path `n` its own substream
//! `RngFactory::path_rng(n)` and draws that path's steps in time order, so the
//! result does not depend on the number of rayon threads.

use crate::error::{SdeError, SdeResult};
use crate::models::gbm::{Gbm, SimulationParams};
use crate::models::model::LogSdeModel;
use crate::rng::{self, NormalSource, RngFactory};
use crate::solvers::euler_maruyama::EulerMaruyama;
use ndarray::parallel::prelude::*;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Strategy used to generate the paths. Both variants honour the same
/// contract and draw ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationScheme {
    /// Draw every normal up front, turn them into log-increments and take
    /// the cumulative sum along the time axis.
    #[default]
    Vectorized,
    /// Advance all paths one Euler-Maruyama step at a time.
    StepByStep,
}

/// Simulated asset prices, one column per trajectory, one row per step.
///
/// Every entry is finite and strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePathMatrix {
    prices: Array2<f64>,
    dt: f64,
}

impl PricePathMatrix {
    /// `(steps, paths)`
    pub fn shape(&self) -> (usize, usize) {
        self.prices.dim()
    }

    pub fn steps(&self) -> usize {
        self.prices.nrows()
    }

    pub fn paths(&self) -> usize {
        self.prices.ncols()
    }

    /// Time step between rows.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.prices.view()
    }

    /// Last row: `S_T` for every path.
    pub fn terminal_prices(&self) -> ArrayView1<'_, f64> {
        self.prices.row(self.steps() - 1)
    }

    /// Trajectory of path `n`, or `None` when out of range.
    pub fn path(&self, n: usize) -> Option<ArrayView1<'_, f64>> {
        (n < self.paths()).then(|| self.prices.column(n))
    }

    /// Average price across paths at each step.
    pub fn mean_path(&self) -> Array1<f64> {
        self.prices.sum_axis(Axis(1)) / self.paths() as f64
    }

    fn checked(prices: Array2<f64>, dt: f64) -> SdeResult<Self> {
        if let Some(((step, path), value)) = prices
            .indexed_iter()
            .find(|(_, p)| !(p.is_finite() && **p > 0.0))
        {
            return Err(SdeError::NumericAnomaly {
                context: format!("simulated price at step {} of path {}", step, path),
                value: *value,
            });
        }
        Ok(Self { prices, dt })
    }
}

/// Simulate GBM paths with the default [`SimulationScheme::Vectorized`].
pub fn simulate<S: NormalSource + ?Sized>(
    params: &SimulationParams,
    source: &mut S,
) -> SdeResult<PricePathMatrix> {
    simulate_with_scheme(params, source, SimulationScheme::default())
}

/// Simulate GBM paths with an explicit scheme.
///
/// # Errors
///
/// - `RandomSourceExhausted` when `source` cannot supply `steps * paths` draws
/// - `NumericAnomaly` when a price overflows or underflows
pub fn simulate_with_scheme<S: NormalSource + ?Sized>(
    params: &SimulationParams,
    source: &mut S,
    scheme: SimulationScheme,
) -> SdeResult<PricePathMatrix> {
    debug!(
        steps = params.steps(),
        paths = params.paths(),
        ?scheme,
        "simulating GBM paths"
    );

    let gbm = Gbm::from_params(params);
    let prices = match scheme {
        SimulationScheme::Vectorized => vectorized(&gbm, params, source)?,
        SimulationScheme::StepByStep => step_by_step(&gbm, params, source)?,
    };

    let matrix = PricePathMatrix::checked(prices, params.dt())?;
    trace!(terminal_mean = ?matrix.terminal_prices().mean(), "simulation complete");
    Ok(matrix)
}

/// Simulate GBM paths in parallel, one independent substream per path.
pub fn simulate_parallel(
    params: &SimulationParams,
    factory: &RngFactory,
) -> SdeResult<PricePathMatrix> {
    debug!(
        steps = params.steps(),
        paths = params.paths(),
        seed = factory.base_seed(),
        threads = rayon::current_num_threads(),
        "simulating GBM paths in parallel"
    );

    let gbm = Gbm::from_params(params);
    let dt = params.dt();
    let x0 = gbm.initial_log_state();
    let mut prices = Array2::<f64>::zeros((params.steps(), params.paths()));

    prices
        .axis_iter_mut(Axis(1))
        .into_par_iter()
        .enumerate()
        .for_each(|(path, mut column)| {
            let mut rng = factory.path_rng(path as u64);
            let mut x = x0;
            for (step, price) in column.iter_mut().enumerate() {
                let z = rng::get_normal_draw(&mut rng);
                EulerMaruyama::step_with_draw(&gbm, &mut x, step as f64 * dt, dt, z);
                *price = x.exp();
            }
        });

    PricePathMatrix::checked(prices, dt)
}

fn vectorized<S: NormalSource + ?Sized>(
    gbm: &Gbm,
    params: &SimulationParams,
    source: &mut S,
) -> SdeResult<Array2<f64>> {
    let dt = params.dt();
    let drift_dt = gbm.log_drift(0.0, 0.0) * dt;
    let vol_sqrt_dt = gbm.log_diffusion(0.0, 0.0) * dt.sqrt();

    let mut draws = vec![0.0; params.draws_required()];
    source.fill_normals(&mut draws)?;

    // row-major: row t = step t, so draw order is time-major
    let mut log_paths = Array2::from_shape_vec((params.steps(), params.paths()), draws)
        .map_err(|e| SdeError::InvalidConfiguration {
            field: "paths".to_string(),
            reason: e.to_string(),
        })?;

    log_paths.mapv_inplace(|z| drift_dt + vol_sqrt_dt * z);
    let x0 = gbm.initial_log_state();
    log_paths.row_mut(0).mapv_inplace(|inc| x0 + inc);
    log_paths.accumulate_axis_inplace(Axis(0), |&prev, curr| *curr = prev + *curr);
    log_paths.mapv_inplace(f64::exp);

    Ok(log_paths)
}

fn step_by_step<S: NormalSource + ?Sized>(
    gbm: &Gbm,
    params: &SimulationParams,
    source: &mut S,
) -> SdeResult<Array2<f64>> {
    let dt = params.dt();
    let mut log_state = vec![gbm.initial_log_state(); params.paths()];
    let mut prices = Array2::<f64>::zeros((params.steps(), params.paths()));

    for (step, mut row) in prices.axis_iter_mut(Axis(0)).enumerate() {
        let t = step as f64 * dt;
        for (x, price) in log_state.iter_mut().zip(row.iter_mut()) {
            EulerMaruyama::step(gbm, x, t, dt, source)?;
            *price = x.exp();
        }
    }

    Ok(prices)
}
