use bundlesim_bundle::ValidationError;
use bundlesim_evm::ExecutorError;
use bundlesim_types::AccessorError;

/// Why a run was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller's cancellation token fired.
    Requested,
    /// The configured timeout elapsed.
    Deadline,
}

impl core::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Requested => f.write_str("cancellation requested"),
            Self::Deadline => f.write_str("deadline exceeded"),
        }
    }
}

/// Errors that prevent a simulation from producing a report.
///
/// A bundle that simulates but fails (a disallowed revert, a failed
/// precondition, a timestamp outside its window) is not an error. It
/// produces a report with `success = false`.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The bundle is malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Chain state could not be read.
    #[error(transparent)]
    Accessor(#[from] AccessorError),

    /// A transaction could not be executed.
    #[error("failed to execute transaction {index}: {source}")]
    Executor {
        /// Index of the transaction in the bundle.
        index: usize,
        /// The underlying error.
        #[source]
        source: ExecutorError,
    },

    /// The run was cancelled before completing.
    #[error("simulation cancelled: {0}")]
    Cancelled(CancelReason),
}

impl SimError {
    /// Attribute an executor error to transaction `index`. Accessor errors
    /// keep their category.
    pub fn executor(index: usize, err: ExecutorError) -> Self {
        match err {
            ExecutorError::Accessor(err) => Self::Accessor(err),
            source => Self::Executor { index, source },
        }
    }

    /// True for input errors, which are never worth retrying.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True for infrastructure errors.
    pub const fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor(_))
    }

    /// True if the run was cancelled.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}
