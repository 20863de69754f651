// Standard library imports
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// External crate imports
use anyhow::Result;
use dotenv::dotenv;
use log::{error, info, warn};
use tokio::select;
use tokio::sync::broadcast;
use tokio::time::sleep;

// Internal crate imports
use dispatch_bot::config_loader::AppConfig;
use dispatch_bot::domain::traits::{AuditSink, BrokerGateway, DurableOrderStore};
use dispatch_bot::engine::{warm_up, DispatchScheduler, OrderCache};
use dispatch_bot::infrastructure::paper::{EmptyOrderStore, LogAuditSink, PaperBrokerGateway};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Logger initialized");

    // Load configuration from TOML file (first try relative path, then
    // built-in defaults as backup)
    let config_path = Path::new("./config.toml");
    let config = match AppConfig::from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config from {}: {}", config_path.display(), e);
            info!("Falling back to built-in defaults");
            AppConfig::default()
        }
    };

    let config = Arc::new(config);
    info!(
        "Configuration loaded, running in docker: {}",
        config.app.running_in_docker
    );

    run_engine(config).await
}

/// Wire the dispatch engine against the in-process paper collaborators and
/// run it until SIGINT. Live deployments swap the gateway, audit sink, and
/// durable store for real adapters.
async fn run_engine(config: Arc<AppConfig>) -> Result<()> {
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    let cache = Arc::new(OrderCache::new());
    let gateway: Arc<dyn BrokerGateway> = Arc::new(PaperBrokerGateway::new(Duration::from_millis(50)));
    let audit: Arc<dyn AuditSink> = Arc::new(LogAuditSink);
    let store: Arc<dyn DurableOrderStore> = Arc::new(EmptyOrderStore);

    // Rebuild the pending set once; the store is never read again.
    let warmed = warm_up(&cache, &store).await?;
    info!("Order cache warmed with {} pending orders", warmed);

    let scheduler = Arc::new(DispatchScheduler::new(
        cache.clone(),
        gateway,
        audit,
        config.scheduler.clone(),
    )?);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let mut scheduler_handle = tokio::spawn({
        let scheduler = scheduler.clone();
        let shutdown_rx = shutdown_tx.subscribe();
        async move {
            if let Err(e) = scheduler.run(shutdown_rx).await {
                error!("Scheduler task failed: {:?}", e);
                return Err(e);
            }
            Ok(())
        }
    });

    select! {
        res = &mut scheduler_handle => {
            match res {
                Ok(Ok(_)) => info!("Scheduler task completed"),
                Ok(Err(e)) => error!("Scheduler task returned error: {:?}", e),
                Err(e) => error!("Scheduler task panicked: {:?}", e),
            }
        }
        _ = sigint.recv() => {
            warn!("SIGINT (Ctrl+C) received. Attempting graceful shutdown...");
        }
    }

    // Signal shutdown and give the scheduler its drain window.
    if shutdown_tx.send(()).is_err() {
        warn!("No tasks were listening for the shutdown signal");
    }
    if !scheduler_handle.is_finished() {
        let grace = Duration::from_secs(config.scheduler.shutdown_grace_secs + 1);
        if tokio::time::timeout(grace, &mut scheduler_handle).await.is_err() {
            warn!("Scheduler did not stop within grace period, aborting");
            scheduler_handle.abort();
        }
    }

    // Let any final audit lines flush through the logger.
    sleep(Duration::from_millis(100)).await;
    info!("Exiting program");
    Ok(())
}
