use tracing_subscriber::EnvFilter;

/// JSON logs for CloudWatch, filtered by `RUST_LOG` (default `info`).
///
/// Timestamps and targets are left out; CloudWatch records ingestion time.
pub fn init() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();
}
