//! Hot reload for the notification settings.
//!
//! The current `NotificationConfig` lives behind an `ArcSwap`. A reload
//! builds a complete new `Config` from every source and publishes its
//! notification section with a single store, so a reader sees either the old
//! snapshot or the new one and never a mix of the two.

use crate::cli::Cli;
use crate::config::{Config, NotificationConfig};
use anyhow::Result;
use arc_swap::ArcSwap;
use notify::{event::EventKind, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Owns the reloadable notification config cell.
#[derive(Clone)]
pub struct ConfigWatcher {
    cli: Cli,
    current: Arc<ArcSwap<NotificationConfig>>,
}

impl ConfigWatcher {
    /// Creates a watcher whose cell starts at `initial`.
    pub fn new(cli: Cli, initial: NotificationConfig) -> Self {
        Self {
            cli,
            current: Arc::new(ArcSwap::from_pointee(initial)),
        }
    }

    /// The shared cell, suitable for `ServiceBuilder::shared_config`.
    pub fn shared(&self) -> Arc<ArcSwap<NotificationConfig>> {
        self.current.clone()
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<NotificationConfig> {
        self.current.load_full()
    }

    /// Reloads the config from all sources and publishes it.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self) -> Result<()> {
        let config = Config::load(&self.cli)?;
        let changed = *self.current.load_full() != config.notification;
        self.current.store(Arc::new(config.notification));
        info!(changed, "Notification config reloaded.");
        Ok(())
    }

    /// Starts watching the config file in a background task.
    ///
    /// # Arguments
    /// * `reload_notifier` - Receives a message after every successful reload.
    pub fn watch(&self, reload_notifier: Option<mpsc::Sender<()>>) {
        let watcher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = watcher.run_file_watcher(reload_notifier).await {
                error!("Config file watcher error: {}", e);
            }
        });
    }

    async fn run_file_watcher(self, reload_notifier: Option<mpsc::Sender<()>>) -> Result<()> {
        let config_path = absolute(&Config::config_path(&self.cli))?;
        let (tx, mut rx) = mpsc::channel(100);

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    if let Err(e) = tx.blocking_send(event) {
                        error!("Failed to send file event: {}", e);
                    }
                }
            },
            notify::Config::default(),
        )?;

        // Editors often replace the file, so watch its directory.
        let parent = config_path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Config path has no parent: {:?}", config_path))?;
        watcher.watch(parent, RecursiveMode::NonRecursive)?;
        info!("Watching for changes to config file: {:?}", config_path);

        while let Some(event) = rx.recv().await {
            if !Self::should_reload(&event, &config_path) {
                continue;
            }
            info!("Config file change detected, reloading...");

            match self.reload() {
                Ok(()) => {
                    if let Some(ref notifier) = reload_notifier {
                        if notifier.send(()).await.is_err() {
                            warn!("Reload notifier channel closed");
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to reload config, keeping previous settings: {}", e);
                }
            }
        }

        Ok(())
    }

    /// Determines if a file event should trigger a reload.
    fn should_reload(event: &Event, config_path: &Path) -> bool {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) => {
                event.paths.iter().any(|path| path == config_path)
            }
            _ => false,
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
