// src/models/model.rs
/// An SDE written for the log-state `X = ln S`:
/// ```text
/// dX_t = a(X_t, t) dt + b(X_t, t) dW_t
/// ```
pub trait LogSdeModel {
    fn log_drift(&self, x: f64, t: f64) -> f64;
    fn log_diffusion(&self, x: f64, t: f64) -> f64;
    fn initial_log_state(&self) -> f64;
}
