pub mod config;
pub mod db;
pub mod engine;
pub mod models;
pub mod tick;

use tracing_subscriber::EnvFilter;

/// Initialise tracing for the process. Called once by the composition
/// root before any engine entry point.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} engine v{}", config::APP_NAME, config::APP_VERSION);
}
