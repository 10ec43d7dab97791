use thiserror::Error;

/// Errors raised while loading or validating configuration records.
///
/// Stepping a validated simulation cannot fail.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Curve table without samples
    #[error("table '{table}' has no samples")]
    EmptyTable {
        /// Table name
        table: String,
    },

    /// Value column length differs from the parameter column
    #[error("table '{table}' column {column} has {got} values, expected {expected}")]
    LengthMismatch {
        /// Table name
        table: String,
        /// Index of the offending value column
        column: usize,
        /// Number of values found
        got: usize,
        /// Number of parameters
        expected: usize,
    },

    /// Parameter sequence is not strictly increasing
    #[error("table '{table}' parameters not strictly increasing at index {index} ({previous} >= {value})")]
    NonIncreasing {
        /// Table name
        table: String,
        /// Index of the first offending sample
        index: usize,
        /// Parameter before the offending sample
        previous: f64,
        /// Offending parameter
        value: f64,
    },

    /// NaN or infinite entry in a table
    #[error("table '{table}' contains a non-finite value at index {index}")]
    NonFinite {
        /// Table name
        table: String,
        /// Row index of the offending entry
        index: usize,
    },

    /// Foil references a lift/drag curve that is not in the catalog
    #[error("unknown lift/drag curve '{0}'")]
    UnknownCurve(String),

    /// Scalar parameter out of its valid range
    #[error("invalid parameter {parameter}: {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Reason
        reason: String,
    },

    /// Foil span and chord axes cannot form a frame
    #[error("foil '{foil}' span and chord axes are degenerate")]
    DegenerateAxes {
        /// Foil name
        foil: String,
    },

    /// Configuration file could not be read
    #[error("unable to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("unable to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Returns an [`ConfigError::InvalidParameter`] unless `value` is finite and strictly positive.
pub(crate) fn require_positive(parameter: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0. {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            parameter: parameter.to_string(),
            reason: format!("must be finite and > 0, got {value}"),
        })
    }
}

/// Returns an [`ConfigError::InvalidParameter`] unless `value` is finite and not negative.
pub(crate) fn require_non_negative(parameter: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0. {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            parameter: parameter.to_string(),
            reason: format!("must be finite and >= 0, got {value}"),
        })
    }
}
