//! tablemate engine process.
//!
//! Loads configuration, installs logging, builds the stores and services,
//! optionally seeds the demo catalog and runs until a shutdown signal.

mod seed;

use tablemate_common::{Config, LoggingConfig, get_metrics};
use tablemate_core::Engine;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    init_tracing(&config.logging);

    info!("Starting tablemate...");

    let stores = tablemate_db::init_in_memory();

    if config.seed.enabled {
        let seeded = seed::seed_catalog(stores.catalog.as_ref()).await?;
        info!(restaurants = seeded, "Seeded demo catalog");
    }

    let _engine = Engine::new(&stores, config.recommendation.clone());
    info!(
        default_radius_km = config.recommendation.default_radius_km,
        default_max_results = config.recommendation.default_max_results,
        "Engine ready"
    );

    shutdown_signal().await;

    let snapshot = serde_json::to_string(&get_metrics().snapshot())?;
    info!(metrics = %snapshot, "Shutdown complete");
    Ok(())
}
