use crate::{CancelReason, SimError, SimPhase, SimulationReport, SimulatorConfig};
use bundlesim_bundle::{parse_and_validate, Bundle};
use bundlesim_evm::{BlockEnv, Executor, StateSnapshot, Vm};
use bundlesim_types::ChainStateAccessor;
use futures_util::future::join_all;
use tokio::{select, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace};

/// Simulates bundles against chain state read through an accessor.
///
/// Each call forks its own snapshot, so one simulator can serve many
/// concurrent calls. Nothing is shared between runs except the accessor and
/// the VM.
#[derive(Debug, Clone)]
pub struct BundleSimulator<A, V> {
    accessor: A,
    vm: V,
    config: SimulatorConfig,
}

impl<A, V> BundleSimulator<A, V>
where
    A: ChainStateAccessor,
    V: Vm,
{
    /// Create a simulator with the default configuration.
    pub fn new(accessor: A, vm: V) -> Self {
        Self { accessor, vm, config: SimulatorConfig::default() }
    }

    /// Replace the configuration.
    pub const fn with_config(mut self, config: SimulatorConfig) -> Self {
        self.config = config;
        self
    }

    /// The accessor.
    pub const fn accessor(&self) -> &A {
        &self.accessor
    }

    /// The configuration.
    pub const fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Validate a raw bundle document and simulate it.
    pub async fn simulate_raw(
        &self,
        raw: &[u8],
        cancel: &CancellationToken,
    ) -> Result<SimulationReport, SimError> {
        trace!(phase = %SimPhase::Validating);
        let bundle = parse_and_validate(raw).inspect_err(|err| {
            debug!(phase = %SimPhase::Failed, %err, "bundle rejected");
        })?;
        self.simulate(&bundle, cancel).await
    }

    /// Simulate a validated bundle.
    ///
    /// Returns [`SimError::Cancelled`] if `cancel` fires or the configured
    /// timeout elapses first. The in-flight run and its snapshot are dropped
    /// and no partial report is produced.
    pub async fn simulate(
        &self,
        bundle: &Bundle,
        cancel: &CancellationToken,
    ) -> Result<SimulationReport, SimError> {
        let deadline = self.config.timeout.map(|timeout| Instant::now() + timeout);
        let expired = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(phase = %SimPhase::Failed, "simulation cancelled");
                Err(SimError::Cancelled(CancelReason::Requested))
            }
            _ = expired => {
                debug!(phase = %SimPhase::Failed, "simulation deadline exceeded");
                Err(SimError::Cancelled(CancelReason::Deadline))
            }
            result = self.run(bundle) => result,
        }
    }

    /// Simulate several bundles concurrently. Results are in input order.
    pub async fn simulate_many(
        &self,
        bundles: &[Bundle],
        cancel: &CancellationToken,
    ) -> Vec<Result<SimulationReport, SimError>> {
        join_all(bundles.iter().map(|bundle| self.simulate(bundle, cancel))).await
    }

    #[instrument(skip_all, fields(
        bundle_hash = %bundle.bundle_hash(),
        block_number = bundle.block_number(),
        txs = bundle.len(),
    ))]
    async fn run(&self, bundle: &Bundle) -> Result<SimulationReport, SimError> {
        trace!(phase = %SimPhase::Forking);
        let header = self.accessor.block_header(bundle.block_number()).await.inspect_err(
            |err| debug!(phase = %SimPhase::Failed, %err, "failed to fetch target header"),
        )?;
        let state_block = self.config.state_anchor.state_block(bundle.block_number());

        if !bundle.is_valid_at_timestamp(header.timestamp) {
            let range = bundle.valid_timestamp_range();
            let error = format!(
                "block timestamp {} outside bundle window [{}, {}]",
                header.timestamp,
                range.start(),
                range.end()
            );
            info!(%error, "bundle not includable");
            return Ok(SimulationReport::rejected(bundle, state_block, error));
        }

        let mut state = StateSnapshot::fork_from(&self.accessor, state_block);
        let executor = Executor::new(&self.vm, BlockEnv::from(&header));

        let mut outcomes = Vec::with_capacity(bundle.len());
        let mut error = None;
        for (index, tx) in bundle.txs().iter().enumerate() {
            trace!(phase = %SimPhase::Executing(index));
            let outcome = executor
                .apply(&mut state, tx)
                .await
                .map_err(|err| SimError::executor(index, err))
                .inspect_err(|err| debug!(phase = %SimPhase::Failed, %err, "execution failed"))?;

            let disallowed = !outcome.is_success() && !bundle.may_revert(&outcome.tx_hash);
            if disallowed {
                let hash = outcome.tx_hash;
                error = Some(format!("transaction {index} ({hash}) {}", outcome.status));
            }
            outcomes.push(outcome);
            if disallowed {
                break;
            }
        }

        trace!(phase = %SimPhase::Aggregating);
        let report = SimulationReport::new(bundle, state_block, &outcomes, error);

        debug!(
            phase = %SimPhase::Done,
            success = report.success,
            gas_used = report.total_gas_used,
            profit = %report.profit,
            "simulated bundle"
        );
        Ok(report)
    }
}
