// src/error.rs
use thiserror::Error;

/// Error types for the mc-pricer library
#[derive(Debug, Error)]
pub enum SdeError {
    /// Invalid parameter values, rejected before any simulation work
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameter {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// A produced price, payoff or statistic is not a finite real number
    #[error("Numeric anomaly in {context}: produced {value}")]
    NumericAnomaly { context: String, value: f64 },

    /// A bounded random stream ran out of draws
    #[error("Random source exhausted: {requested} normal draws requested, {available} available")]
    RandomSourceExhausted { requested: usize, available: usize },

    /// Invalid configuration (config file or command line)
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// Failure while exporting results
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for mc-pricer operations
pub type SdeResult<T> = Result<T, SdeError>;

/// Validation utilities
pub mod validation {
    use super::{SdeError, SdeResult};

    fn invalid(name: &str, value: f64, constraint: &str) -> SdeError {
        SdeError::InvalidParameter {
            parameter: name.to_string(),
            value,
            constraint: constraint.to_string(),
        }
    }

    /// Validate that a parameter is finite and strictly positive
    pub fn validate_positive(name: &str, value: f64) -> SdeResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(invalid(name, value, "must be positive (> 0)"))
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is finite and non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> SdeResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(invalid(name, value, "must be non-negative (≥ 0)"))
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> SdeResult<()> {
        if !value.is_finite() {
            Err(invalid(name, value, "must be finite (not NaN or infinite)"))
        } else {
            Ok(())
        }
    }

    /// Validate a path or step count
    pub fn validate_count(name: &str, count: usize) -> SdeResult<()> {
        if count == 0 {
            Err(invalid(name, 0.0, "must be a positive integer"))
        } else {
            Ok(())
        }
    }

    /// Validate that a computed quantity is finite
    pub fn ensure_finite(context: &str, value: f64) -> SdeResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(SdeError::NumericAnomaly {
                context: context.to_string(),
                value,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("sigma", 0.2).is_ok());
        assert!(validate_positive("sigma", 0.0).is_err());
        assert!(validate_positive("sigma", -0.1).is_err());
        assert!(validate_positive("sigma", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("volatility", 0.0).is_ok());
        assert!(validate_non_negative("volatility", 0.3).is_ok());
        assert!(validate_non_negative("volatility", -1e-12).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("value", 1.0).is_ok());
        assert!(validate_finite("value", f64::NAN).is_err());
        assert!(validate_finite("value", f64::INFINITY).is_err());
        assert!(validate_finite("value", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_validate_count() {
        assert!(validate_count("paths", 1).is_ok());
        assert!(matches!(
            validate_count("steps", 0),
            Err(SdeError::InvalidParameter { ref parameter, .. }) if parameter == "steps"
        ));
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite("mean", 2.5).unwrap(), 2.5);
        assert!(matches!(
            ensure_finite("mean", f64::INFINITY),
            Err(SdeError::NumericAnomaly { .. })
        ));
    }

    #[test]
    fn test_error_display() {
        let error = SdeError::InvalidParameter {
            parameter: "sigma".to_string(),
            value: -0.1,
            constraint: "must be positive".to_string(),
        };

        let display = format!("{}", error);
        assert!(display.contains("sigma"));
        assert!(display.contains("-0.1"));
        assert!(display.contains("positive"));
    }

    #[test]
    fn test_exhausted_display() {
        let error = SdeError::RandomSourceExhausted {
            requested: 100,
            available: 40,
        };
        let display = error.to_string();
        assert!(display.contains("100"));
        assert!(display.contains("40"));
    }
}
