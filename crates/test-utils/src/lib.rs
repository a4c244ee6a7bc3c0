//! Shared fixtures for bundlesim tests: deterministic wallets, signed
//! transaction builders, a funded in-memory chain and a scriptable VM.

pub mod chain;
pub mod txs;
pub mod users;
pub mod vm;

/// Install a `tracing` subscriber honoring `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
