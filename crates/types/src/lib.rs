//! Shared types for bundlesim.
//!
//! Contains the [`ChainStateAccessor`] interface that the simulation engine
//! reads chain state through, the plain data types it returns, an
//! [`InMemoryAccessor`] for offline use and tests, and environment-based
//! configuration helpers.

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

mod accessor;
pub use accessor::{AccessorError, BoxError, ChainStateAccessor, InMemoryAccessor, StateFixture};

mod account;
pub use account::{AccountInfo, BlockHeader};

pub mod config;
pub use config::ConfigError;
