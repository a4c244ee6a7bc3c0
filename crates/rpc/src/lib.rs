//! Node-backed collaborators for bundlesim.
//!
//! [`RpcAccessor`] reads headers, accounts and storage from an Ethereum node
//! over JSON-RPC at pinned heights. [`RpcCallVm`] delegates contract
//! execution to the node's `eth_simulateV1`, passing the snapshot's pending
//! writes as state overrides.

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
pub use accessor::RpcAccessor;

mod vm;
pub use vm::RpcCallVm;
