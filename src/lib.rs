/// itam-notify - Alert notification dispatcher for an IT asset management backend
///
/// This library fans alerts out to chat webhooks and SMS gateways, loads
/// and hot-reloads the notification settings, and offers helpers for
/// request handlers that raise alerts without waiting on delivery.
pub mod notification;

pub mod cli;
pub mod config;
pub mod config_watcher;
pub mod core;
pub mod events;
pub mod internal_metrics;
pub mod task_manager;

// Re-export core types for convenience
pub use crate::core::*;
pub use notification::error::{ChannelError, DispatchError, FailureKind};
pub use notification::NotificationService;
