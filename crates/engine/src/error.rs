//! The module contains the errors the ledger engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when user input fails a field-level rule.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`Persistence`] and [`Serialize`] thrown when a local write fails.
//!
//!  [`Validation`]: LedgerError::Validation
//!  [`KeyNotFound`]: LedgerError::KeyNotFound
//!  [`Persistence`]: LedgerError::Persistence
//!  [`Serialize`]: LedgerError::Serialize
use thiserror::Error;

/// Field-level rejection of user input. Carries the first failing field;
/// nothing is applied when this is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Ledger custom errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error("persistence failure: {0}")]
    Persistence(#[from] std::io::Error),
    #[error("serialization failure: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Persistence(a), Self::Persistence(b)) => a.to_string() == b.to_string(),
            (Self::Serialize(a), Self::Serialize(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
