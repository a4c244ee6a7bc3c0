use bundlesim_types::{AccessorError, BoxError};

/// Errors that prevent a transaction from being executed at all.
///
/// A revert is not an error, nor is a failed precondition. Both are
/// reported as an [`ExecutionOutcome`].
///
/// [`ExecutionOutcome`]: crate::ExecutionOutcome
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// Reading state failed.
    #[error(transparent)]
    Accessor(#[from] AccessorError),

    /// The VM failed internally.
    #[error("vm error: {0}")]
    Vm(#[source] BoxError),

    /// The VM reported more gas than it was given.
    #[error("vm consumed {consumed} gas but only {available} was available")]
    GasOverrun {
        /// Gas the VM reported.
        consumed: u64,
        /// Gas the VM was given.
        available: u64,
    },
}

impl ExecutorError {
    /// Wrap a VM error.
    pub fn vm(err: impl Into<BoxError>) -> Self {
        Self::Vm(err.into())
    }

    /// True if this wraps an [`AccessorError`].
    pub const fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor(_))
    }
}
