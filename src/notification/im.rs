//! Chat webhook channel routing.

use crate::config::ImConfig;
use crate::core::{AlertEvent, ChannelKind, Delivery, ImProvider};
use crate::notification::error::ChannelError;
use crate::notification::registry::ProviderRegistry;
use tracing::debug;

/// Routes chat alerts to the provider named in the config.
#[derive(Clone)]
pub struct ImRouter {
    providers: ProviderRegistry<dyn ImProvider>,
}

impl ImRouter {
    pub fn new(providers: ProviderRegistry<dyn ImProvider>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &ProviderRegistry<dyn ImProvider> {
        &self.providers
    }

    /// Sends `event` to the configured webhook.
    ///
    /// # Returns
    /// * `Ok(Delivery::Skipped)` when no webhook is configured
    /// * `Ok(Delivery::Sent)` when the provider accepted the message
    /// * `Err` for lookup misses, reserved providers and transport failures
    pub async fn send(&self, config: &ImConfig, event: &AlertEvent) -> Result<Delivery, ChannelError> {
        if config.webhook.is_empty() {
            debug!(channel = %ChannelKind::Im, "No IM webhook configured, skipping.");
            return Ok(Delivery::Skipped);
        }

        let provider = self.providers.resolve(&config.provider)?;
        provider.send(&config.webhook, event).await?;
        Ok(Delivery::Sent)
    }
}
