//! Crate-wide error type covering configuration, argument, and alignment failures.

use std::error::Error;
use std::fmt;

/// Simulation error.
///
/// Every variant aborts the current call immediately; nothing is retried
/// internally. The CLI prints these to stderr and exits non-zero; the API
/// layer maps them to 400 responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A battery or run parameter is outside its physically valid range.
    InvalidConfiguration {
        /// Dotted field path (e.g., `"battery.capacity_mwh"`).
        field: String,
        /// Human-readable constraint description.
        message: String,
    },
    /// An unrecognized action or scenario label.
    InvalidArgument(String),
    /// Price and forecast series differ in length or timestamp alignment.
    MisalignedSeries(String),
}

impl SimError {
    /// Shorthand for an `InvalidConfiguration` with owned field and message.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { field, message } => {
                write!(f, "invalid configuration: {field}: {message}")
            }
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::MisalignedSeries(message) => write!(f, "misaligned series: {message}"),
        }
    }
}

impl Error for SimError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_field_path() {
        let e = SimError::invalid_config("battery.capacity_mwh", "must be > 0");
        let s = e.to_string();
        assert!(s.contains("battery.capacity_mwh"));
        assert!(s.contains("must be > 0"));
    }

    #[test]
    fn variants_compare_equal() {
        let a = SimError::InvalidArgument("unknown action \"hold\"".into());
        let b = SimError::InvalidArgument("unknown action \"hold\"".into());
        assert_eq!(a, b);
    }
}
