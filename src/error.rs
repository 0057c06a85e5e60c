//! Unified error hierarchy for stridestats
//!
//! Every accessor and metric reports failures through [`StrideError`]. Errors are
//! raised synchronously at the call that detects them; nothing here is retryable
//! since all computations are pure.

use crate::models::Source;
use thiserror::Error;

/// Top-level error type for all stridestats operations
#[derive(Debug, Error)]
pub enum StrideError {
    /// A required column (records) or stat (laps/summary) is absent
    #[error("Missing field '{field}' in {data_source}")]
    MissingField { field: String, data_source: Source },

    /// Calculation errors
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// Records violate the ordering invariant
    #[error("Records out of order at index {index}: {reason}")]
    UnorderedRecords { index: usize, reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Calculation errors
#[derive(Debug, Error)]
pub enum CalculationError {
    /// Insufficient data for calculation
    #[error("Insufficient data for {calculation}: {reason}")]
    InsufficientData { calculation: String, reason: String },

    /// Invalid parameter
    #[error("Invalid parameter for {calculation}: {parameter}={value}")]
    InvalidParameter {
        calculation: String,
        parameter: String,
        value: String,
    },
}

/// Result type alias for stridestats operations
pub type Result<T> = std::result::Result<T, StrideError>;

impl StrideError {
    pub fn missing(field: impl Into<String>, data_source: Source) -> Self {
        StrideError::MissingField {
            field: field.into(),
            data_source,
        }
    }

    pub fn insufficient(calculation: impl Into<String>, reason: impl Into<String>) -> Self {
        StrideError::Calculation(CalculationError::InsufficientData {
            calculation: calculation.into(),
            reason: reason.into(),
        })
    }

    pub fn invalid(
        calculation: impl Into<String>,
        parameter: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        StrideError::Calculation(CalculationError::InvalidParameter {
            calculation: calculation.into(),
            parameter: parameter.into(),
            value: value.to_string(),
        })
    }

    pub fn is_missing_field(&self) -> bool {
        matches!(self, StrideError::MissingField { .. })
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StrideError::MissingField { .. } => ErrorSeverity::Warning,
            StrideError::Calculation(CalculationError::InsufficientData { .. }) => {
                ErrorSeverity::Warning
            }
            StrideError::Calculation(CalculationError::InvalidParameter { .. }) => {
                ErrorSeverity::Error
            }
            StrideError::UnorderedRecords { .. } => ErrorSeverity::Error,
            StrideError::Configuration(_) => ErrorSeverity::Error,
            StrideError::Io(_) => ErrorSeverity::Critical,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            StrideError::MissingField { field, data_source } => {
                format!("This activity has no {} data in its {}.", field, data_source)
            }
            StrideError::Calculation(CalculationError::InsufficientData {
                calculation,
                ..
            }) => {
                format!(
                    "Not enough data to calculate {}. Please ensure the activity has complete records.",
                    calculation
                )
            }
            StrideError::UnorderedRecords { index, .. } => {
                format!("Activity records are not in time order (record {}).", index)
            }
            _ => self.to_string(),
        }
    }
}

/// Treat an absent field as an absent value rather than a failure.
pub trait OptionalField<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalField<T> for Result<T> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(StrideError::MissingField { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Unexpected failure outside the computation itself
    Critical,
    /// Error that prevents the operation
    Error,
    /// Data is absent or too sparse; callers usually report and continue
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = StrideError::missing("elevation", Source::Records);
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = StrideError::invalid("intensity", "threshold", 0.0);
        assert_eq!(err.severity(), ErrorSeverity::Error);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_missing_field_message_names_field_and_source() {
        let err = StrideError::missing("elevation_gain", Source::Summary);
        assert_eq!(err.to_string(), "Missing field 'elevation_gain' in summary");
        assert!(err.user_message().contains("elevation_gain"));
    }

    #[test]
    fn test_optional_swallows_only_missing_fields() {
        let missing: Result<f64> = Err(StrideError::missing("power", Source::Records));
        assert!(missing.optional().unwrap().is_none());

        let present: Result<f64> = Ok(3.0);
        assert_eq!(present.optional().unwrap(), Some(3.0));

        let invalid: Result<f64> = Err(StrideError::invalid("intensity", "threshold", -1));
        assert!(invalid.optional().is_err());
    }

    #[test]
    fn test_user_messages() {
        let err = StrideError::insufficient("elapsed time", "fewer than 2 samples");
        assert!(err.user_message().contains("Not enough data"));
    }
}
