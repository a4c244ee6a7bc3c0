use crate::RpcCallVm;
use alloy::{
    eips::BlockId,
    primitives::{Address, U256},
    providers::{Provider, RootProvider},
    transports::TransportError,
};
use bundlesim_types::{AccessorError, AccountInfo, BlockHeader, ChainStateAccessor};
use core::future::IntoFuture;
use tracing::{debug, instrument, warn};

/// A [`ChainStateAccessor`] backed by a JSON-RPC node.
///
/// Every read is pinned to an explicit block number, so results do not move
/// as the chain advances. Nothing is cached here.
#[derive(Debug, Clone)]
pub struct RpcAccessor<P = RootProvider> {
    provider: P,
    endpoint: String,
}

impl RpcAccessor {
    /// Connect to `endpoint`. HTTP, WebSocket and IPC endpoints are
    /// supported.
    #[instrument]
    pub async fn connect(endpoint: &str) -> Result<Self, AccessorError> {
        let provider = RootProvider::connect(endpoint)
            .await
            .map_err(|err| AccessorError::connection(endpoint, err))?;
        debug!("connected");
        Ok(Self::new(provider, endpoint))
    }
}

fn transport(err: TransportError) -> AccessorError {
    warn!(%err, "rpc request failed");
    AccessorError::transport(err)
}

impl<P: Provider + Clone> RpcAccessor<P> {
    /// Wrap an existing provider.
    pub fn new(provider: P, endpoint: impl Into<String>) -> Self {
        Self { provider, endpoint: endpoint.into() }
    }

    /// The endpoint this accessor talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The underlying provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// A [`RpcCallVm`] sharing this accessor's connection.
    pub fn call_vm(&self) -> RpcCallVm<P> {
        RpcCallVm::new(self.provider.clone())
    }

    /// Release the connection. Pubsub backends shut down once the last
    /// handle is dropped.
    pub fn close(self) {
        debug!(endpoint = %self.endpoint, "closing connection");
        drop(self.provider);
    }
}

impl<P: Provider + Clone> ChainStateAccessor for RpcAccessor<P> {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn block_header(&self, number: u64) -> Result<BlockHeader, AccessorError> {
        let block = self
            .provider
            .get_block_by_number(number.into())
            .await
            .map_err(transport)?
            .ok_or(AccessorError::BlockNotFound(number))?;

        let header = &block.header;
        Ok(BlockHeader {
            number: header.number,
            hash: header.hash,
            parent_hash: header.parent_hash,
            timestamp: header.timestamp,
            gas_limit: header.gas_limit,
            base_fee_per_gas: header.base_fee_per_gas,
            beneficiary: header.beneficiary,
        })
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn account(&self, address: Address, at_block: u64) -> Result<AccountInfo, AccessorError> {
        let block = BlockId::number(at_block);
        let (balance, nonce, code) = tokio::try_join!(
            self.provider.get_balance(address).block_id(block).into_future(),
            self.provider.get_transaction_count(address).block_id(block).into_future(),
            self.provider.get_code_at(address).block_id(block).into_future(),
        )
        .map_err(transport)?;

        Ok(AccountInfo { balance, nonce, code })
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn storage(
        &self,
        address: Address,
        slot: U256,
        at_block: u64,
    ) -> Result<U256, AccessorError> {
        self.provider
            .get_storage_at(address, slot)
            .block_id(BlockId::number(at_block))
            .await
            .map_err(transport)
    }
}
