use plane_tracker::config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("plane_tracker=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load configuration
    let config = Config::load();
    config.log_redacted();

    // One pass per process; the scheduler decides when to run again
    if let Some(outcome) = plane_tracker::run(&config) {
        info!(?outcome, "Check finished");
    }
}
