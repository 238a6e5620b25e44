//! Fans ITAM alerts out to the configured notification channels.
//!
//! The `NotificationService` owns one router per channel family. Each
//! router picks an adapter from its `ProviderRegistry` by the provider name
//! found in the current config snapshot. Channels run independently and a
//! failure in one never changes the outcome of another.
pub mod error;
pub mod feishu;
pub mod im;
pub mod registry;
pub mod sms;

use crate::config::NotificationConfig;
use crate::core::{AlertEvent, ChannelKind, Delivery, DispatchOutcome, ImProvider, SmsProvider};
use arc_swap::ArcSwap;
use error::DispatchError;
use im::ImRouter;
use registry::ProviderRegistry;
use sms::SmsRouter;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// The alert dispatcher.
pub struct NotificationService {
    config: Arc<ArcSwap<NotificationConfig>>,
    im: ImRouter,
    sms: SmsRouter,
}

impl NotificationService {
    /// Creates a service with the built-in providers. Performs no I/O.
    pub fn new(config: NotificationConfig) -> Self {
        Self::builder(config).build()
    }

    /// Creates a `ServiceBuilder` for overriding providers or sharing a
    /// reloadable config cell.
    pub fn builder(config: NotificationConfig) -> ServiceBuilder {
        ServiceBuilder::new(config)
    }

    /// The config snapshot the next dispatch will use.
    pub fn config(&self) -> Arc<NotificationConfig> {
        self.config.load_full()
    }

    /// Sends an alert to every configured channel.
    ///
    /// # Returns
    /// * `Ok(())` if no channel failed, including when notifications are
    ///   disabled or every channel was skipped
    /// * `Err(DispatchError)` reporting how many channels failed
    pub async fn send_alert(&self, title: &str, content: &str) -> Result<(), DispatchError> {
        let event = AlertEvent::new(title, content);
        let outcome = self.dispatch(&event).await;

        if outcome.is_success() {
            Ok(())
        } else {
            Err(DispatchError {
                failures: outcome.failures,
            })
        }
    }

    /// Runs one dispatch and returns the per-channel outcome.
    #[instrument(skip_all, fields(title = %event.title))]
    pub async fn dispatch(&self, event: &AlertEvent) -> DispatchOutcome {
        // One snapshot for the whole dispatch, even if a reload lands meanwhile.
        let config = self.config.load_full();
        metrics::counter!("notification_alerts_total").increment(1);

        if !config.enabled {
            info!("Notification disabled, skipping alert: {}", event.title);
            metrics::counter!("notification_alerts_skipped_total").increment(1);
            return DispatchOutcome::default();
        }

        let (im_result, sms_result) = tokio::join!(
            self.im.send(&config.im, event),
            self.sms.send(&config.sms, &event.content),
        );

        let mut outcome = DispatchOutcome::default();
        for (channel, provider, result) in [
            (ChannelKind::Im, config.im.provider.as_str(), im_result),
            (ChannelKind::Sms, config.sms.provider.as_str(), sms_result),
        ] {
            match &result {
                Ok(delivery) => {
                    debug!(%channel, provider, ?delivery, "Channel finished.");
                    if *delivery == Delivery::Sent {
                        metrics::counter!("notification_channel_sent_total", "channel" => channel.as_str())
                            .increment(1);
                    }
                }
                Err(e) => {
                    error!(%channel, provider, error = %e, "Failed to send {} notification", channel);
                    metrics::counter!("notification_channel_failures_total", "channel" => channel.as_str())
                        .increment(1);
                }
            }
            outcome.record(channel, result);
        }

        if !outcome.is_success() {
            error!(
                failed = outcome.failed_count(),
                "encountered {} errors while sending notification",
                outcome.failed_count()
            );
        }
        outcome
    }
}

/// Builder for `NotificationService`.
///
/// The defaults register the built-in adapters. Tests and embedders can
/// swap in their own adapters or hand in a config cell owned by a
/// [`crate::config_watcher::ConfigWatcher`].
pub struct ServiceBuilder {
    config: NotificationConfig,
    shared_config: Option<Arc<ArcSwap<NotificationConfig>>>,
    http_client: Option<reqwest::Client>,
    im_overrides: Vec<(String, Option<Arc<dyn ImProvider>>)>,
    sms_overrides: Vec<(String, Arc<dyn SmsProvider>)>,
}

impl ServiceBuilder {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            config,
            shared_config: None,
            http_client: None,
            im_overrides: Vec::new(),
            sms_overrides: Vec::new(),
        }
    }

    /// Reads config from `cell` instead of the value given to `new`.
    pub fn shared_config(mut self, cell: Arc<ArcSwap<NotificationConfig>>) -> Self {
        self.shared_config = Some(cell);
        self
    }

    /// Uses `client` for the built-in webhook adapters.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Registers an IM adapter, replacing any built-in one with that name.
    pub fn im_provider(mut self, name: impl Into<String>, provider: Arc<dyn ImProvider>) -> Self {
        self.im_overrides.push((name.into(), Some(provider)));
        self
    }

    /// Reserves an IM provider name whose adapter is still pending.
    pub fn reserve_im_provider(mut self, name: impl Into<String>) -> Self {
        self.im_overrides.push((name.into(), None));
        self
    }

    /// Registers an SMS adapter, replacing any built-in one with that name.
    pub fn sms_provider(mut self, name: impl Into<String>, provider: Arc<dyn SmsProvider>) -> Self {
        self.sms_overrides.push((name.into(), provider));
        self
    }

    pub fn build(self) -> NotificationService {
        let client = self.http_client.unwrap_or_default();

        let mut im_registry = ProviderRegistry::default_im(client);
        for (name, provider) in self.im_overrides {
            match provider {
                Some(provider) => im_registry.register(name, provider),
                None => im_registry.reserve(name),
            };
        }

        let mut sms_registry = ProviderRegistry::default_sms();
        for (name, provider) in self.sms_overrides {
            sms_registry.register(name, provider);
        }

        let config = self
            .shared_config
            .unwrap_or_else(|| Arc::new(ArcSwap::from_pointee(self.config)));

        NotificationService {
            config,
            im: ImRouter::new(im_registry),
            sms: SmsRouter::new(sms_registry),
        }
    }
}
