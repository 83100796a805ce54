//! Error taxonomy for the search engine.
//!
//! Validation failures are raised before any search state exists; session
//! failures come from driving a [`BatchController`](crate::BatchController)
//! out of sequence. "Not found" is never an error.

use thiserror::Error;

/// Why an input collection or its parameters were rejected.
///
/// Indices are original row positions, so messages can be shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("input contains no numbers")]
    EmptyInput,
    #[error("row {0}: value must be greater than zero")]
    NonPositiveValue(usize),
    #[error("row {0}: value must be a whole number")]
    NonIntegerValue(usize),
    #[error("row {0}: value exceeds the safe integer range (2^53)")]
    ValueOutOfRange(usize),
    #[error("count range {min}..={max} is invalid for {n} numbers")]
    InvalidCountRange { min: usize, max: usize, n: usize },
    #[error("target must not be negative")]
    NegativeTarget,
    #[error("target must be a whole number")]
    NonIntegerTarget,
    #[error("target exceeds the safe integer range (2^53)")]
    TargetOutOfRange,
    #[error("max_results must be at least 1")]
    InvalidMaxResults,
}

impl ValidationError {
    /// Original row the error refers to, if it is about a single value.
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::NonPositiveValue(row) | Self::NonIntegerValue(row) | Self::ValueOutOfRange(row) => {
                Some(*row)
            }
            _ => None,
        }
    }
}

/// A batch operation was invoked in a lifecycle state that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionStateError {
    #[error("no search initialized")]
    NotInitialized,
    #[error("search session was destroyed")]
    AlreadyDestroyed,
    #[error("search already finished")]
    AlreadyFinished,
}

/// Either kind of failure, for operations that can hit both.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Session(#[from] SessionStateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_row() {
        assert_eq!(
            ValidationError::NonPositiveValue(7).to_string(),
            "row 7: value must be greater than zero"
        );
        assert_eq!(
            ValidationError::InvalidCountRange { min: 3, max: 2, n: 5 }.to_string(),
            "count range 3..=2 is invalid for 5 numbers"
        );
    }

    #[test]
    fn test_row() {
        assert_eq!(ValidationError::ValueOutOfRange(12).row(), Some(12));
        assert_eq!(ValidationError::NegativeTarget.row(), None);
    }

    #[test]
    fn test_search_error_is_transparent() {
        let err: SearchError = SessionStateError::NotInitialized.into();
        assert_eq!(err.to_string(), "no search initialized");

        let err: SearchError = ValidationError::EmptyInput.into();
        assert!(matches!(err, SearchError::Validation(ValidationError::EmptyInput)));
    }
}
