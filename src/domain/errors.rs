//! Shop error taxonomy
//!
//! All three kinds are recoverable and local: command handlers turn them into
//! user-facing messages, the poller treats `FetchFailure` as a silent skip.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    /// Transport error, non-success status or malformed body
    #[error("Catalog fetch failed: {reason}")]
    FetchFailure { reason: String },

    #[error("Item '{name}' not found in the current shop")]
    NotFound { name: String },

    #[error("Invalid {parameter} '{value}', expected one of: {}", allowed.join(", "))]
    InvalidParameter {
        parameter: &'static str,
        value: String,
        allowed: Vec<&'static str>,
    },
}

impl ShopError {
    pub fn fetch_failure(reason: impl Into<String>) -> Self {
        Self::FetchFailure {
            reason: reason.into(),
        }
    }

    pub fn not_found(name: &str) -> Self {
        Self::NotFound {
            name: name.to_string(),
        }
    }

    pub fn invalid_parameter(parameter: &'static str, value: &str, allowed: &[&'static str]) -> Self {
        Self::InvalidParameter {
            parameter,
            value: value.to_string(),
            allowed: allowed.to_vec(),
        }
    }
}
