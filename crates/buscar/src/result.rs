//! Result and error types for Buscar.

use thiserror::Error;

/// Result type for Buscar operations
pub type BuscarResult<T> = Result<T, BuscarError>;

/// Errors that can occur in Buscar
#[derive(Debug, Error)]
pub enum BuscarError {
    /// No element matched an at-least-one query contract
    #[error("{message}")]
    ElementNotFound {
        /// Composed message (description plus root snapshot)
        message: String,
    },

    /// More than one element matched an at-most-one query contract
    #[error("{message}")]
    MultipleElementsFound {
        /// Composed message (description, hint, root snapshot)
        message: String,
    },

    /// A retrying lookup exhausted its timeout without a definitive outcome
    #[error("Lookup timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },
}

impl BuscarError {
    /// The composed message, regardless of variant
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check whether this is the missing-element case
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }

    /// Check whether this is the multiple-elements case
    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        matches!(self, Self::MultipleElementsFound { .. })
    }
}
