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

//! Bundlesim execution.
//!
//! A [`StateSnapshot`] is a lazily populated, copy-on-write view of chain
//! state at a fork height. The [`Executor`] applies one decoded transaction
//! to it: it checks preconditions, charges gas, moves value, and delegates
//! contract code to a pluggable [`Vm`].

mod env;
pub use env::BlockEnv;

mod error;
pub use error::ExecutorError;

mod executor;
pub use executor::Executor;

mod gas;
pub use gas::{
    intrinsic_gas, ACCESS_LIST_ADDRESS_GAS, ACCESS_LIST_STORAGE_KEY_GAS, CALL_BASE_GAS,
    CREATE_BASE_GAS, INITCODE_WORD_GAS, NON_ZERO_BYTE_GAS, ZERO_BYTE_GAS,
};

mod outcome;
pub use outcome::{ExecutionOutcome, ExecutionStatus, PreconditionFailure};

mod snapshot;
pub use snapshot::{AccountDiff, Checkpoint, StateSnapshot};

mod vm;
pub use vm::{TransferOnlyVm, Vm, VmCall, VmOutcome};
