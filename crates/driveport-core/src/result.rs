//! Result type aliases and the best-effort result shape.

use crate::error::AppError;

/// A specialized `Result` type for DrivePort operations.
///
/// Defined as a convenience so that every crate does not need to write
/// `Result<T, AppError>` explicitly.
pub type AppResult<T> = Result<T, AppError>;

/// Outcome of a side effect that must never fail its primary operation.
///
/// Ledger backfills, auto-share grants, and metadata inference are
/// deliberately swallowed at the point of use. Returning `BestEffort`
/// instead of `Result` makes the swallowing explicit: callers can log and
/// move on, and tests can assert that a failed side effect did not
/// propagate.
#[derive(Debug)]
pub enum BestEffort<T> {
    /// The side effect completed.
    Completed(T),
    /// The side effect failed and was ignored.
    Skipped(AppError),
}

impl<T> BestEffort<T> {
    /// Convert a fallible result, logging the error when it is dropped.
    pub fn from_result(result: AppResult<T>, context: &str) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(err) => {
                tracing::warn!(error = %err, context, "Best-effort operation failed");
                Self::Skipped(err)
            }
        }
    }

    /// Whether the side effect completed.
    pub fn completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The completed value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Skipped(_) => None,
        }
    }

    /// The swallowed error, if any.
    pub fn skipped_error(&self) -> Option<&AppError> {
        match self {
            Self::Completed(_) => None,
            Self::Skipped(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result_completed() {
        let effort = BestEffort::from_result(Ok(7), "test");
        assert!(effort.completed());
        assert_eq!(effort.value(), Some(&7));
    }

    #[test]
    fn test_from_result_skipped() {
        let effort: BestEffort<()> =
            BestEffort::from_result(Err(AppError::internal("boom")), "test");
        assert!(!effort.completed());
        assert!(effort.skipped_error().is_some());
    }
}
