use bundlesim_sim::{SimulatorConfig, StateAnchor};
use bundlesim_types::{
    config::{load_string_opt, load_url_opt, RPC_URL_ENV, STATE_FILE_ENV},
    ConfigError,
};
use clap::Parser;
use std::{path::PathBuf, time::Duration};

/// Simulate a transaction bundle against chain state and print the report.
#[derive(Debug, Parser)]
#[command(name = "bundlesim", version, about)]
pub(crate) struct Args {
    /// Path to the bundle JSON document.
    pub(crate) bundle: PathBuf,

    /// Node endpoint. Falls back to `BUNDLESIM_RPC_URL`.
    #[arg(long)]
    pub(crate) rpc_url: Option<String>,

    /// JSON state fixture to simulate against instead of a node. Only plain
    /// transfers can execute. Falls back to `BUNDLESIM_STATE_FILE`.
    #[arg(long, conflicts_with = "rpc_url")]
    pub(crate) state_file: Option<PathBuf>,

    /// Simulation deadline in milliseconds. Falls back to
    /// `BUNDLESIM_TIMEOUT_MS`.
    #[arg(long)]
    pub(crate) timeout_ms: Option<u64>,

    /// Read state at the target block instead of its parent.
    #[arg(long)]
    pub(crate) at_target: bool,

    /// Print the report on one line.
    #[arg(long)]
    pub(crate) compact: bool,
}

/// Where chain state comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StateSource {
    Rpc(String),
    File(PathBuf),
}

impl Args {
    /// Flags win over the environment. A state file wins over an endpoint
    /// when both come from the environment.
    pub(crate) fn state_source(&self) -> Option<StateSource> {
        if let Some(path) = &self.state_file {
            return Some(StateSource::File(path.clone()));
        }
        if let Some(url) = &self.rpc_url {
            return Some(StateSource::Rpc(url.clone()));
        }
        load_string_opt(STATE_FILE_ENV)
            .map(|path| StateSource::File(path.into()))
            .or_else(|| load_url_opt(RPC_URL_ENV).map(|url| StateSource::Rpc(url.into_owned())))
    }

    pub(crate) fn simulator_config(&self) -> Result<SimulatorConfig, ConfigError> {
        let mut config = SimulatorConfig::from_env()?;
        if let Some(ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        if self.at_target {
            config = config.with_state_anchor(StateAnchor::Target);
        }
        Ok(config)
    }
}
