#![allow(dead_code)]
//! Fake providers and config builders shared by the integration tests.

pub mod test_metrics;

use async_trait::async_trait;
use itam_notify::config::{ImConfig, NotificationConfig, SmsConfig};
use itam_notify::core::{AlertEvent, ImProvider, SmsProvider};
use itam_notify::ChannelError;
use std::sync::{Arc, Mutex};

/// An IM provider that records every alert it is asked to send.
#[derive(Clone, Debug, Default)]
pub struct RecordingImProvider {
    pub sent: Arc<Mutex<Vec<(String, AlertEvent)>>>,
}

impl RecordingImProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, AlertEvent)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImProvider for RecordingImProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, webhook: &str, event: &AlertEvent) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .unwrap()
            .push((webhook.to_string(), event.clone()));
        Ok(())
    }
}

/// An SMS provider that records contents and can be told to fail.
#[derive(Clone, Debug, Default)]
pub struct RecordingSmsProvider {
    pub sent: Arc<Mutex<Vec<String>>>,
    pub fail_with_status: Option<u16>,
}

impl RecordingSmsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsProvider for RecordingSmsProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, _credentials: &SmsConfig, content: &str) -> Result<(), ChannelError> {
        self.sent.lock().unwrap().push(content.to_string());
        match self.fail_with_status {
            Some(status) => Err(ChannelError::Status {
                provider: "recording".to_string(),
                status,
                body: String::new(),
            }),
            None => Ok(()),
        }
    }
}

/// An enabled config with the given IM endpoint and SMS provider/key.
pub fn notification_config(
    im_provider: &str,
    webhook: &str,
    sms_provider: &str,
    access_key_id: &str,
) -> NotificationConfig {
    NotificationConfig {
        enabled: true,
        im: ImConfig {
            provider: im_provider.to_string(),
            webhook: webhook.to_string(),
            secret: None,
        },
        sms: SmsConfig {
            provider: sms_provider.to_string(),
            access_key_id: access_key_id.to_string(),
            access_key_secret: "test-secret".to_string(),
            sign_name: "ITAM".to_string(),
            template_code: "SMS_123456".to_string(),
        },
    }
}
