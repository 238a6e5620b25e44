//! Alerts raised by asset mutations, and detached delivery.
//!
//! Request handlers build an `AssetEvent` after a successful write and hand
//! it to [`notify_detached`]. The handler's response never waits on, or
//! depends on, the notification result.

use crate::core::AlertEvent;
use crate::notification::NotificationService;
use crate::task_manager::TaskManager;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info, warn};

/// A state change of an asset that operators should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetEvent {
    Created {
        name: String,
        ip: String,
        owner: String,
    },
    Deleted {
        name: String,
        ip: String,
    },
}

impl AssetEvent {
    pub fn title(&self) -> &'static str {
        match self {
            AssetEvent::Created { .. } => "New Asset Created",
            AssetEvent::Deleted { .. } => "Asset Deleted",
        }
    }

    pub fn content(&self) -> String {
        match self {
            AssetEvent::Created { name, ip, owner } => {
                format!("Asset {} ({}) has been added by {}.", name, ip, owner)
            }
            AssetEvent::Deleted { name, ip } => format!("Asset {} ({}) has been removed.", name, ip),
        }
    }

    pub fn to_alert(&self) -> AlertEvent {
        AlertEvent::new(self.title(), self.content())
    }
}

impl From<AssetEvent> for AlertEvent {
    fn from(event: AssetEvent) -> Self {
        event.to_alert()
    }
}

/// Sends `event` in the background. The outcome is logged and dropped.
pub fn notify_detached(
    tasks: &TaskManager,
    service: Arc<NotificationService>,
    event: impl Into<AlertEvent>,
) {
    let event = event.into();
    tasks.spawn("alert-delivery", async move {
        match service.send_alert(&event.title, &event.content).await {
            Ok(()) => debug!(title = %event.title, "Alert delivered."),
            Err(e) => warn!(title = %event.title, error = %e, "Alert delivery incomplete."),
        }
    });
}

/// Relays each non-empty line of `reader` as a detached alert titled `title`.
///
/// Stops at end of input or at the first read error, so the caller always
/// gets to await `tasks` afterwards. Returns the number of alerts relayed.
pub async fn relay_lines<R>(
    reader: R,
    tasks: &TaskManager,
    service: Arc<NotificationService>,
    title: &str,
) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut relayed = 0;

    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => {
                notify_detached(tasks, service.clone(), AlertEvent::new(title, line));
                relayed += 1;
            }
            Ok(None) => {
                info!("Input closed.");
                break;
            }
            Err(e) => {
                error!(error = %e, "Failed to read alert input, stopping.");
                break;
            }
        }
    }

    relayed
}
