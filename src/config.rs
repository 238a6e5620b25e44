//! Configuration management for itam-notify
//!
//! This module defines the main `Config` struct and the notification
//! settings it carries. It uses the `figment` crate to layer defaults, an
//! `itam-notify.toml` file, `ITAM_`-prefixed environment variables and
//! command-line overrides.
//!
//! A loaded `NotificationConfig` is treated as an immutable snapshot. Hot
//! reload replaces the whole value, see [`crate::config_watcher`].

use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Config file used when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "itam-notify.toml";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Alert notification settings.
    pub notification: NotificationConfig,
    /// Internal counter logging.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Settings for logging the dispatch counters.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the logging recorder at startup.
    pub log_metrics: bool,
    /// Seconds between counter snapshots.
    pub log_interval_seconds: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            log_metrics: false,
            log_interval_seconds: 60,
        }
    }
}

/// Settings for the alert notification dispatcher.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct NotificationConfig {
    /// Global switch. When false no channel is attempted.
    #[serde(default)]
    pub enabled: bool,
    /// Chat webhook channel.
    #[serde(default)]
    pub im: ImConfig,
    /// SMS gateway channel.
    #[serde(default)]
    pub sms: SmsConfig,
}

/// Settings for the chat webhook channel.
#[derive(Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ImConfig {
    /// Provider name, e.g. "feishu", "dingtalk", "wechat_work".
    pub provider: String,
    /// Webhook URL. Empty disables the channel.
    pub webhook: String,
    /// Optional signing secret.
    pub secret: Option<String>,
}

impl Default for ImConfig {
    fn default() -> Self {
        Self {
            provider: "feishu".to_string(),
            webhook: String::new(),
            secret: None,
        }
    }
}

impl fmt::Debug for ImConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImConfig")
            .field("provider", &self.provider)
            .field("webhook", &redact_url(&self.webhook))
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Settings for the SMS gateway channel.
#[derive(Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SmsConfig {
    /// Provider name, e.g. "aliyun", "tencent".
    pub provider: String,
    /// Gateway access key. Empty disables the channel.
    pub access_key_id: String,
    pub access_key_secret: String,
    pub sign_name: String,
    pub template_code: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: "aliyun".to_string(),
            access_key_id: String::new(),
            access_key_secret: String::new(),
            sign_name: String::new(),
            template_code: String::new(),
        }
    }
}

impl fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.access_key_secret.is_empty() { "" } else { "***" };
        f.debug_struct("SmsConfig")
            .field("provider", &self.provider)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &secret)
            .field("sign_name", &self.sign_name)
            .field("template_code", &self.template_code)
            .finish()
    }
}

/// Keeps scheme and host of a webhook URL, hiding the token-bearing path,
/// query and fragment.
pub fn redact_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    match url.split_once("://") {
        Some((scheme, rest)) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            if host.len() == rest.len() {
                url.to_string()
            } else {
                format!("{}://{}/***", scheme, host)
            }
        }
        None => "***".to_string(),
    }
}

impl Config {
    /// Loads the application configuration, layering defaults, the config
    /// file, environment variables and CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config: Config = Self::figment(cli).extract()?;
        Ok(config)
    }

    /// Builds the figment used by [`Config::load`].
    pub fn figment(cli: &Cli) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(Self::config_path(cli)))
            // e.g. ITAM_NOTIFICATION__IM__WEBHOOK=https://...
            .merge(Env::prefixed("ITAM_").split("__"))
            .merge(cli.clone())
    }

    /// The config file path for `cli`, falling back to the default name.
    pub fn config_path(cli: &Cli) -> PathBuf {
        cli.config
            .clone()
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE).to_path_buf())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            notification: NotificationConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}
