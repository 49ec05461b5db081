use tracing_subscriber::fmt::time::uptime;
use tracing_subscriber::EnvFilter;

/// Initializes the global subscriber once for the whole application.
///
/// `RUST_LOG` controls the filter; the default keeps this crate at debug and
/// everything else at info.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,clinic_client=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(uptime())
        .with_target(false)
        .compact()
        .init();
}
