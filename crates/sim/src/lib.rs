//! Bundle simulation engine.
//!
//! [`BundleSimulator`] validates a bundle, forks a [`StateSnapshot`] at the
//! target block, applies each transaction in order and aggregates the
//! outcomes into a [`SimulationReport`]. Runs are independent and may
//! execute concurrently against one shared accessor.
//!
//! [`StateSnapshot`]: bundlesim_evm::StateSnapshot

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod config;
pub use config::{SimulatorConfig, StateAnchor};

mod error;
pub use error::{CancelReason, SimError};

mod phase;
use phase::SimPhase;

mod profit;
pub use profit::ProfitAccountant;

mod report;
pub use report::{SimulationReport, TxReport};

mod serde_decimal;

mod simulator;
pub use simulator::BundleSimulator;

pub use tokio_util::sync::CancellationToken;
