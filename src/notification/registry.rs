//! Maps provider names to adapters within one channel family.
//!
//! Adding a provider means registering a new entry here. Names can also be
//! reserved ahead of their adapter so that configuring them reports
//! "not implemented" rather than "unknown".

use crate::core::{ChannelKind, ImProvider, SmsProvider};
use crate::notification::error::ChannelError;
use crate::notification::feishu::FeishuProvider;
use crate::notification::sms::StubSmsProvider;
use std::collections::HashMap;
use std::sync::Arc;

enum Registration<P: ?Sized> {
    Ready(Arc<P>),
    Reserved,
}

impl<P: ?Sized> Clone for Registration<P> {
    fn clone(&self) -> Self {
        match self {
            Registration::Ready(provider) => Registration::Ready(provider.clone()),
            Registration::Reserved => Registration::Reserved,
        }
    }
}

/// Provider lookup table for a single channel.
pub struct ProviderRegistry<P: ?Sized> {
    channel: ChannelKind,
    entries: HashMap<String, Registration<P>>,
}

impl<P: ?Sized> Clone for ProviderRegistry<P> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel,
            entries: self.entries.clone(),
        }
    }
}

impl<P: ?Sized> ProviderRegistry<P> {
    /// Creates an empty registry for `channel`.
    pub fn new(channel: ChannelKind) -> Self {
        Self {
            channel,
            entries: HashMap::new(),
        }
    }

    pub fn channel(&self) -> ChannelKind {
        self.channel
    }

    /// Registers `provider` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<P>) -> &mut Self {
        self.entries.insert(name.into(), Registration::Ready(provider));
        self
    }

    /// Reserves `name` for an adapter that does not exist yet.
    pub fn reserve(&mut self, name: impl Into<String>) -> &mut Self {
        self.entries.insert(name.into(), Registration::Reserved);
        self
    }

    /// Looks up the adapter registered under `name`.
    ///
    /// # Returns
    /// * `Ok(provider)` for a ready adapter
    /// * `Err(ChannelError::NotImplemented)` for a reserved name
    /// * `Err(ChannelError::UnknownProvider)` on a lookup miss
    pub fn resolve(&self, name: &str) -> Result<Arc<P>, ChannelError> {
        match self.entries.get(name) {
            Some(Registration::Ready(provider)) => Ok(provider.clone()),
            Some(Registration::Reserved) => Err(ChannelError::NotImplemented {
                channel: self.channel,
                provider: name.to_string(),
            }),
            None => Err(ChannelError::UnknownProvider {
                channel: self.channel,
                provider: name.to_string(),
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All registered and reserved names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ProviderRegistry<dyn ImProvider> {
    /// The built-in chat webhook providers.
    pub fn default_im(client: reqwest::Client) -> Self {
        let mut registry = Self::new(ChannelKind::Im);
        registry
            .register("feishu", Arc::new(FeishuProvider::new(client)))
            .reserve("dingtalk")
            .reserve("wechat_work");
        registry
    }
}

impl ProviderRegistry<dyn SmsProvider> {
    /// The built-in SMS providers. Both are stubs that only log.
    pub fn default_sms() -> Self {
        let mut registry = Self::new(ChannelKind::Sms);
        registry
            .register("aliyun", Arc::new(StubSmsProvider::new("aliyun")))
            .register("tencent", Arc::new(StubSmsProvider::new("tencent")));
        registry
    }
}
