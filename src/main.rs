use std::str::FromStr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::runtime;
use tracing_subscriber::filter::LevelFilter;

use relay_world::config::ServerConfig;
use relay_world::instance::Instance;

fn main() -> anyhow::Result<()> {
    init_logging().context("unable to initialize logging")?;

    start_server()
}

fn start_server() -> anyhow::Result<()> {
    let runtime = runtime::Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .thread_name_fn(|| {
            static THREAD_COUNTER: AtomicU16 = AtomicU16::new(1);
            format!("relay-{}", THREAD_COUNTER.fetch_add(1, Ordering::Relaxed))
        })
        .build()
        .context("failed to build runtime")?;

    runtime.block_on(async move {
        let config = ServerConfig::from_env().context("failed to load configuration")?;
        let instance = Arc::new(Instance::new(config));
        instance.run().await
    })
}

fn init_logging() -> anyhow::Result<()> {
    let raw = std::env::var("LOGGING_LEVEL").unwrap_or_else(|_| String::from("WARNING"));
    // Python's logging module spells the warning level "WARNING"; tracing
    // spells it "WARN". Every other level name the two share already.
    let normalized = if raw.eq_ignore_ascii_case("WARNING") { "WARN" } else { &raw };
    let max_level = LevelFilter::from_str(normalized).unwrap_or(LevelFilter::WARN);

    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_target(false)
        .init();

    Ok(())
}
