//! SMS channel routing and the placeholder gateway adapters.

use crate::config::SmsConfig;
use crate::core::{ChannelKind, Delivery, SmsProvider};
use crate::notification::error::ChannelError;
use crate::notification::registry::ProviderRegistry;
use async_trait::async_trait;
use tracing::{debug, info};

/// Routes SMS alerts to the provider named in the config.
#[derive(Clone)]
pub struct SmsRouter {
    providers: ProviderRegistry<dyn SmsProvider>,
}

impl SmsRouter {
    pub fn new(providers: ProviderRegistry<dyn SmsProvider>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &ProviderRegistry<dyn SmsProvider> {
        &self.providers
    }

    /// Sends `content` through the configured SMS provider.
    ///
    /// An empty access key means the channel is not set up, which is a skip
    /// rather than a failure.
    pub async fn send(&self, config: &SmsConfig, content: &str) -> Result<Delivery, ChannelError> {
        if config.access_key_id.is_empty() {
            debug!(channel = %ChannelKind::Sms, "No SMS access key configured, skipping.");
            return Ok(Delivery::Skipped);
        }

        let provider = self.providers.resolve(&config.provider)?;
        provider.send(config, content).await?;
        Ok(Delivery::Sent)
    }
}

impl Default for SmsRouter {
    fn default() -> Self {
        Self::new(ProviderRegistry::default_sms())
    }
}

/// A gateway adapter that only logs what it would have sent.
///
/// Registered for vendors whose SDK integration does not exist yet. A real
/// adapter registered under the same name replaces it.
pub struct StubSmsProvider {
    name: String,
}

impl StubSmsProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl SmsProvider for StubSmsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, credentials: &SmsConfig, content: &str) -> Result<(), ChannelError> {
        info!(
            provider = %self.name,
            sign_name = %credentials.sign_name,
            template_code = %credentials.template_code,
            "[MOCK SMS] Sending to admin: {}",
            content
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::error::FailureKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // Counts calls so tests can tell a skip from a send.
    struct CountingSms {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SmsProvider for CountingSms {
        fn name(&self) -> &str {
            "counting"
        }

        async fn send(&self, _credentials: &SmsConfig, _content: &str) -> Result<(), ChannelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn sms_config(provider: &str, access_key_id: &str) -> SmsConfig {
        SmsConfig {
            provider: provider.to_string(),
            access_key_id: access_key_id.to_string(),
            access_key_secret: "secret".to_string(),
            sign_name: "ITAM".to_string(),
            template_code: "SMS_0001".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_access_key_skips() {
        let counting = Arc::new(CountingSms { calls: AtomicUsize::new(0) });
        let mut registry = ProviderRegistry::<dyn SmsProvider>::new(ChannelKind::Sms);
        registry.register("counting", counting.clone());
        let router = SmsRouter::new(registry);

        let result = router.send(&sms_config("counting", ""), "hello").await;

        assert_eq!(result.unwrap(), Delivery::Skipped);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_access_key_skips_even_for_unknown_provider() {
        let router = SmsRouter::default();
        let result = router.send(&sms_config("nobody", ""), "hello").await;
        assert_eq!(result.unwrap(), Delivery::Skipped);
    }

    #[tokio::test]
    async fn test_stub_providers_always_succeed() {
        let router = SmsRouter::default();

        for provider in ["aliyun", "tencent"] {
            let result = router.send(&sms_config(provider, "LTAI"), "disk full").await;
            assert_eq!(result.unwrap(), Delivery::Sent, "provider {}", provider);
        }
    }

    #[tokio::test]
    async fn test_unknown_sms_provider_fails() {
        let router = SmsRouter::default();
        let err = router
            .send(&sms_config("twilio", "LTAI"), "disk full")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::UnknownProvider);
        assert_eq!(err.to_string(), "unknown sms provider: twilio");
    }

    #[tokio::test]
    async fn test_registered_adapter_replaces_stub() {
        let counting = Arc::new(CountingSms { calls: AtomicUsize::new(0) });
        let mut registry = ProviderRegistry::default_sms();
        registry.register("aliyun", counting.clone());
        let router = SmsRouter::new(registry);

        router.send(&sms_config("aliyun", "LTAI"), "disk full").await.unwrap();

        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }
}
