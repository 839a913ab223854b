use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber writing through the test harness's capture.
/// `RUST_LOG` overrides the `info` default. Only the first call does
/// anything, so every test can call it.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_test_writer()
        .try_init();
}
