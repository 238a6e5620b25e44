//! Core domain types and provider traits for itam-notify
//!
//! This module defines the data that flows through one dispatch and the
//! trait contracts every provider adapter implements.

use crate::config::SmsConfig;
use crate::notification::error::ChannelError;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;

/// Prefix prepended to every instant-messaging alert.
pub const IM_ALERT_PREFIX: &str = "【ITAM Alert】";

/// A single alert to be fanned out to the configured channels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlertEvent {
    /// Short human label, e.g. "New Asset Created"
    pub title: String,
    /// Sentence describing what happened
    pub content: String,
}

impl AlertEvent {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// The text body sent to chat webhooks.
    pub fn im_text(&self) -> String {
        format!("{}{}\n{}", IM_ALERT_PREFIX, self.title, self.content)
    }
}

/// A notification delivery family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelKind {
    Im,
    Sms,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Im => "im",
            ChannelKind::Sms => "sms",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a channel router did with an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The provider accepted the message.
    Sent,
    /// The channel has no endpoint or credential configured.
    Skipped,
}

/// A failure attributed to one channel.
#[derive(Debug)]
pub struct ChannelFailure {
    pub channel: ChannelKind,
    pub error: ChannelError,
}

/// The result of one dispatch across all channels.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Channels that were actually attempted (not skipped).
    pub attempted: BTreeSet<ChannelKind>,
    /// Failures in channel order, IM first.
    pub failures: Vec<ChannelFailure>,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Returns the failure recorded for `channel`, if any.
    pub fn failure_for(&self, channel: ChannelKind) -> Option<&ChannelError> {
        self.failures
            .iter()
            .find(|f| f.channel == channel)
            .map(|f| &f.error)
    }

    pub(crate) fn record(&mut self, channel: ChannelKind, result: Result<Delivery, ChannelError>) {
        match result {
            Ok(Delivery::Sent) => {
                self.attempted.insert(channel);
            }
            Ok(Delivery::Skipped) => {}
            Err(error) => {
                self.attempted.insert(channel);
                self.failures.push(ChannelFailure { channel, error });
            }
        }
    }
}

// =============================================================================
// Provider Traits
// =============================================================================

/// Sends one alert to a chat webhook.
#[async_trait]
pub trait ImProvider: Send + Sync {
    /// The registry name of this provider (e.g., "feishu").
    fn name(&self) -> &str;

    /// Formats and transmits `event` to `webhook`.
    ///
    /// # Returns
    /// * `Ok(())` if the endpoint accepted the message
    /// * `Err` on a transport failure or a rejected request
    async fn send(&self, webhook: &str, event: &AlertEvent) -> Result<(), ChannelError>;
}

/// Sends one alert text through an SMS gateway.
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// The registry name of this provider (e.g., "aliyun").
    fn name(&self) -> &str;

    /// Transmits `content` using the gateway credentials in `credentials`.
    async fn send(&self, credentials: &SmsConfig, content: &str) -> Result<(), ChannelError>;
}
