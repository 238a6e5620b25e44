//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using
//! the `clap` crate. Override flags are merged on top of the config file and
//! environment variables through the `figment::Provider` impl below.

use clap::Parser;
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Title used for alerts when `--title` is not given.
pub const DEFAULT_TITLE: &str = "ITAM Alert";

/// Relays ITAM alerts to the configured chat webhook and SMS gateway.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level (e.g. "debug", "info").
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Turn the notification switch on or off.
    #[arg(long, value_name = "BOOL")]
    pub enabled: Option<bool>,

    /// Chat webhook provider name.
    #[arg(long, value_name = "NAME")]
    pub im_provider: Option<String>,

    /// Chat webhook URL.
    #[arg(long, value_name = "URL")]
    pub im_webhook: Option<String>,

    /// SMS provider name.
    #[arg(long, value_name = "NAME")]
    pub sms_provider: Option<String>,

    /// Alert title.
    #[arg(short, long, default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Alert content. When omitted, each stdin line is sent as an alert.
    #[arg(long)]
    pub content: Option<String>,

    /// Reload the config file when it changes.
    #[arg(long)]
    pub watch: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            log_level: None,
            enabled: None,
            im_provider: None,
            im_webhook: None,
            sms_provider: None,
            title: DEFAULT_TITLE.to_string(),
            content: None,
            watch: false,
        }
    }
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        let mut notification = Dict::new();
        if let Some(enabled) = self.enabled {
            notification.insert("enabled".into(), Value::from(enabled));
        }

        let mut im = Dict::new();
        if let Some(provider) = &self.im_provider {
            im.insert("provider".into(), Value::from(provider.clone()));
        }
        if let Some(webhook) = &self.im_webhook {
            im.insert("webhook".into(), Value::from(webhook.clone()));
        }
        if !im.is_empty() {
            notification.insert("im".into(), Value::Dict(Tag::Default, im));
        }

        if let Some(provider) = &self.sms_provider {
            let mut sms = Dict::new();
            sms.insert("provider".into(), Value::from(provider.clone()));
            notification.insert("sms".into(), Value::Dict(Tag::Default, sms));
        }

        if !notification.is_empty() {
            dict.insert("notification".into(), Value::Dict(Tag::Default, notification));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
