//! itam-notify - ITAM alert relay
//!
//! Sends a single alert, or relays every line read from stdin as an alert,
//! through the configured notification channels.

use anyhow::Result;
use clap::Parser;
use itam_notify::{
    cli::Cli,
    config::{redact_url, Config},
    config_watcher::ConfigWatcher,
    events::relay_lines,
    internal_metrics::LoggingRecorder,
    notification::NotificationService,
    task_manager::TaskManager,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            tracing_subscriber::fmt().init();
            error!("Failed to load configuration: {}", err);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("itam-notify starting up...");

    let notification = &config.notification;
    info!("-------------------- Configuration --------------------");
    info!("Config File: {}", Config::config_path(&cli).display());
    info!("Log Level: {}", config.log_level);
    info!("Notification: {}", if notification.enabled { "Enabled" } else { "Disabled" });
    info!("IM Provider: {}", notification.im.provider);
    info!("IM Webhook: {}", display_or_unset(&redact_url(&notification.im.webhook)));
    info!("SMS Provider: {}", notification.sms.provider);
    info!(
        "SMS Access Key: {}",
        if notification.sms.access_key_id.is_empty() { "Not configured" } else { "Configured" }
    );
    info!("Config Hot Reload: {}", if cli.watch { "Enabled" } else { "Disabled" });
    info!("Metrics Logging: {}", if config.metrics.log_metrics { "Enabled" } else { "Disabled" });
    info!("-------------------------------------------------------");

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let mut metrics_task: Option<JoinHandle<()>> = None;
    if config.metrics.log_metrics {
        let recorder = LoggingRecorder::new();
        let handle = recorder.spawn_logger(
            Duration::from_secs(config.metrics.log_interval_seconds.max(1)),
            shutdown_rx,
        );
        match metrics::set_global_recorder(recorder) {
            Ok(()) => metrics_task = Some(handle),
            Err(e) => {
                warn!("Failed to install metrics recorder: {}", e);
                handle.abort();
            }
        }
    }

    let watcher = ConfigWatcher::new(cli.clone(), config.notification.clone());
    if cli.watch {
        watcher.watch(None);
    }

    let service = Arc::new(
        NotificationService::builder(config.notification.clone())
            .shared_config(watcher.shared())
            .build(),
    );

    let mut exit_code = 0;
    if let Some(content) = &cli.content {
        match service.send_alert(&cli.title, content).await {
            Ok(()) => info!("Alert sent."),
            Err(e) => {
                error!("{}", e);
                exit_code = 1;
            }
        }
    } else {
        info!("Reading alerts from stdin, one per line...");
        let tasks = TaskManager::new();
        let stdin = BufReader::new(tokio::io::stdin());

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Shutdown signal received."),
            relayed = relay_lines(stdin, &tasks, service.clone(), &cli.title) => {
                info!("Relayed {} alerts.", relayed);
            }
        }

        tasks.shutdown().await;
        info!("All alerts processed.");
    }

    // Flushes a final counter snapshot.
    let _ = shutdown_tx.send(());
    if let Some(handle) = metrics_task {
        let _ = handle.await;
    }

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    info!("Exiting.");
    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "Not configured"
    } else {
        value
    }
}
