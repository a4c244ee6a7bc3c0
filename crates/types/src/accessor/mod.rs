mod memory;
pub use memory::{InMemoryAccessor, StateFixture};

use crate::{AccountInfo, BlockHeader};
use alloy::primitives::{Address, U256};
use core::future::Future;
use std::sync::Arc;

/// A boxed, thread-safe error, used to carry collaborator errors without
/// naming their types.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Errors produced while reading chain state.
///
/// These are infrastructure failures. The engine never retries them, and
/// surfaces them separately from invalid input so callers can tell "bad
/// bundle" apart from "node unavailable".
#[derive(Debug, thiserror::Error)]
pub enum AccessorError {
    /// The requested block does not exist (yet).
    #[error("block {0} not found")]
    BlockNotFound(u64),

    /// Could not establish a connection to the endpoint.
    #[error("failed to connect to {endpoint}: {source}")]
    Connection {
        /// The endpoint we tried to reach.
        endpoint: String,
        /// The underlying error.
        #[source]
        source: BoxError,
    },

    /// A request failed in transit or returned an error.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
}

impl AccessorError {
    /// Wrap a transport error.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// Wrap a connection error.
    pub fn connection(endpoint: impl Into<String>, err: impl Into<BoxError>) -> Self {
        Self::Connection { endpoint: endpoint.into(), source: err.into() }
    }

    /// True if the error indicates a missing block.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::BlockNotFound(_))
    }
}

/// Read-only access to chain state at fixed heights.
///
/// Implementors must be safe to share between concurrent simulations. No
/// caching is expected of them: isolation and caching are the snapshot's
/// job. Every method is a suspension point; callers cancel by dropping the
/// future.
pub trait ChainStateAccessor: Send + Sync {
    /// Fetch the header of a block. Returns [`AccessorError::BlockNotFound`]
    /// if the block does not exist.
    fn block_header(
        &self,
        number: u64,
    ) -> impl Future<Output = Result<BlockHeader, AccessorError>> + Send;

    /// Fetch an account at a given height. Addresses that have never been
    /// used yield [`AccountInfo::default`], not an error.
    fn account(
        &self,
        address: Address,
        at_block: u64,
    ) -> impl Future<Output = Result<AccountInfo, AccessorError>> + Send;

    /// Fetch a single storage slot at a given height. Unset slots are zero.
    fn storage(
        &self,
        address: Address,
        slot: U256,
        at_block: u64,
    ) -> impl Future<Output = Result<U256, AccessorError>> + Send;
}

impl<T: ChainStateAccessor> ChainStateAccessor for Arc<T> {
    fn block_header(
        &self,
        number: u64,
    ) -> impl Future<Output = Result<BlockHeader, AccessorError>> + Send {
        (**self).block_header(number)
    }

    fn account(
        &self,
        address: Address,
        at_block: u64,
    ) -> impl Future<Output = Result<AccountInfo, AccessorError>> + Send {
        (**self).account(address, at_block)
    }

    fn storage(
        &self,
        address: Address,
        slot: U256,
        at_block: u64,
    ) -> impl Future<Output = Result<U256, AccessorError>> + Send {
        (**self).storage(address, slot, at_block)
    }
}

impl<T: ChainStateAccessor> ChainStateAccessor for &T {
    fn block_header(
        &self,
        number: u64,
    ) -> impl Future<Output = Result<BlockHeader, AccessorError>> + Send {
        (**self).block_header(number)
    }

    fn account(
        &self,
        address: Address,
        at_block: u64,
    ) -> impl Future<Output = Result<AccountInfo, AccessorError>> + Send {
        (**self).account(address, at_block)
    }

    fn storage(
        &self,
        address: Address,
        slot: U256,
        at_block: u64,
    ) -> impl Future<Output = Result<U256, AccessorError>> + Send {
        (**self).storage(address, slot, at_block)
    }
}
