use bundlesim_types::config::{load_millis_opt, ConfigError, TIMEOUT_MS_ENV};
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Which height state is read at, relative to the bundle's target block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StateAnchor {
    /// State after the parent block, i.e. the pre-state of the target block.
    #[default]
    Parent,
    /// State after the target block itself.
    Target,
}

impl StateAnchor {
    /// The height to read state at for a bundle targeting `block_number`.
    pub const fn state_block(self, block_number: u64) -> u64 {
        match self {
            Self::Parent => block_number.saturating_sub(1),
            Self::Target => block_number,
        }
    }
}

/// Configuration for a [`BundleSimulator`].
///
/// [`BundleSimulator`]: crate::BundleSimulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Wall-clock limit for a single simulation. `None` means no limit.
    pub timeout: Option<Duration>,
    /// Fork height policy.
    pub state_anchor: StateAnchor,
}

impl SimulatorConfig {
    /// Load from the environment. Reads `BUNDLESIM_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self { timeout: load_millis_opt(TIMEOUT_MS_ENV)?, ..Default::default() })
    }

    /// Set the timeout.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the fork height policy.
    pub const fn with_state_anchor(mut self, state_anchor: StateAnchor) -> Self {
        self.state_anchor = state_anchor;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn anchors() {
        assert_eq!(StateAnchor::Parent.state_block(10), 9);
        assert_eq!(StateAnchor::Target.state_block(10), 10);
        assert_eq!(StateAnchor::default(), StateAnchor::Parent);
    }
}
