/// Where a run is in its lifecycle. Used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SimPhase {
    Validating,
    Forking,
    Executing(usize),
    Aggregating,
    Done,
    Failed,
}

impl core::fmt::Display for SimPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Validating => f.write_str("validating"),
            Self::Forking => f.write_str("forking"),
            Self::Executing(index) => write!(f, "executing({index})"),
            Self::Aggregating => f.write_str("aggregating"),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
        }
    }
}
