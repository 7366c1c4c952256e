pub mod backtest;
pub mod bulk;
pub mod confed;
pub mod config;
pub mod dataset;
pub mod elo;
pub mod error;
pub mod export;
pub mod format;
pub mod match_sim;
pub mod names;
pub mod profile;
pub mod snapshot;
pub mod standings;
pub mod tournament;

/// Installs the stderr log subscriber. `RUST_LOG` overrides the given default.
pub fn init_logging(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
