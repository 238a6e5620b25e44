//! Error types for channel delivery and dispatch aggregation.

use crate::core::{ChannelFailure, ChannelKind};
use thiserror::Error;

/// Coarse classification of a channel failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No adapter is registered under the configured provider name.
    UnknownProvider,
    /// The provider name is reserved but its adapter has not been written.
    NotImplemented,
    /// The external endpoint could not be reached or rejected the request.
    Transport,
}

/// A failure delivering an alert through a single channel.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("unknown {channel} provider: {provider}")]
    UnknownProvider {
        channel: ChannelKind,
        provider: String,
    },

    #[error("{provider} {channel} provider not implemented yet")]
    NotImplemented {
        channel: ChannelKind,
        provider: String,
    },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} webhook returned status: {status}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },
}

impl ChannelError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ChannelError::UnknownProvider { .. } => FailureKind::UnknownProvider,
            ChannelError::NotImplemented { .. } => FailureKind::NotImplemented,
            ChannelError::Transport { .. } | ChannelError::Status { .. } => FailureKind::Transport,
        }
    }

    /// The provider name this error is attributed to.
    pub fn provider(&self) -> &str {
        match self {
            ChannelError::UnknownProvider { provider, .. }
            | ChannelError::NotImplemented { provider, .. }
            | ChannelError::Transport { provider, .. }
            | ChannelError::Status { provider, .. } => provider,
        }
    }
}

/// The combined failure of one `send_alert` call.
///
/// The message only reports how many channels failed. The individual
/// failures are kept for callers that want to inspect them.
#[derive(Error, Debug)]
#[error("encountered {} errors while sending notification", .failures.len())]
pub struct DispatchError {
    pub failures: Vec<ChannelFailure>,
}

impl DispatchError {
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn failed_channels(&self) -> Vec<ChannelKind> {
        self.failures.iter().map(|f| f.channel).collect()
    }
}
