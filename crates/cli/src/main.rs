//! `bundlesim`: simulate a bundle and print the report as JSON.
//!
//! Exits non-zero if the bundle could not be simulated. A bundle that
//! simulates but fails still exits zero, with `success: false` in the report.

#![deny(unused_must_use, rust_2018_idioms)]

mod args;
use args::{Args, StateSource};

use alloy::primitives::utils::format_ether;
use bundlesim_evm::{TransferOnlyVm, Vm};
use bundlesim_rpc::RpcAccessor;
use bundlesim_sim::{BundleSimulator, CancellationToken, SimulationReport, SimulatorConfig};
use bundlesim_types::{config::read_file, ChainStateAccessor, InMemoryAccessor};
use clap::Parser;
use eyre::{eyre, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn simulate<A: ChainStateAccessor, V: Vm>(
    accessor: A,
    vm: V,
    config: SimulatorConfig,
    raw: &[u8],
    cancel: &CancellationToken,
) -> eyre::Result<SimulationReport> {
    let simulator = BundleSimulator::new(accessor, vm).with_config(config);
    simulator.simulate_raw(raw, cancel).await.wrap_err("simulation failed")
}

async fn run(args: &Args, cancel: &CancellationToken) -> eyre::Result<SimulationReport> {
    let raw = read_file(&args.bundle)?;
    let config = args.simulator_config()?;
    let source = args
        .state_source()
        .ok_or_else(|| eyre!("no state source: pass --rpc-url or --state-file"))?;

    match source {
        StateSource::File(path) => {
            let fixture = read_file(&path)?;
            let accessor = InMemoryAccessor::from_json_slice(&fixture)
                .wrap_err_with(|| format!("invalid state file {}", path.display()))?;
            info!(path = %path.display(), "simulating against state file");
            simulate(accessor, TransferOnlyVm, config, &raw, cancel).await
        }
        StateSource::Rpc(url) => {
            let accessor = RpcAccessor::connect(&url).await?;
            info!(endpoint = accessor.endpoint(), "simulating against node");
            let vm = accessor.call_vm();
            let result = simulate(&accessor, vm, config, &raw, cancel).await;
            accessor.close();
            result
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();
    init_tracing();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling simulation");
            on_interrupt.cancel();
        }
    });

    let report = run(&args, &cancel).await?;

    info!(
        success = report.success,
        gas_used = report.total_gas_used,
        profit_eth = %format_ether(report.profit.unsigned_abs()),
        "simulation complete"
    );
    if let Some(error) = &report.error {
        warn!(%error, "bundle failed");
    }

    let json = if args.compact { report.to_json()? } else { report.to_json_pretty()? };
    println!("{json}");
    Ok(())
}
