//! A client for sending alerts to a Feishu custom bot webhook.

use crate::core::{AlertEvent, ImProvider};
use crate::notification::error::ChannelError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{error, info, instrument};

const PROVIDER: &str = "feishu";

/// Posts plain-text messages to a Feishu webhook.
pub struct FeishuProvider {
    client: reqwest::Client,
}

impl FeishuProvider {
    /// Creates a new `FeishuProvider` sharing `client`'s connection pool.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Builds the Feishu text message body.
    pub fn payload(event: &AlertEvent) -> Value {
        json!({
            "msg_type": "text",
            "content": {
                "text": event.im_text(),
            },
        })
    }
}

#[async_trait]
impl ImProvider for FeishuProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    #[instrument(skip_all, fields(provider = PROVIDER))]
    async fn send(&self, webhook: &str, event: &AlertEvent) -> Result<(), ChannelError> {
        let payload = Self::payload(event);

        let response = self
            .client
            .post(webhook)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the bot token.
                let e = e.without_url();
                error!(error = %e, "HTTP request to Feishu failed");
                ChannelError::Transport {
                    provider: PROVIDER.to_string(),
                    source: e,
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Feishu webhook rejected the alert");
            return Err(ChannelError::Status {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        info!("Successfully sent alert to Feishu.");
        Ok(())
    }
}

#[cfg(test)]
mod feishu_provider_tests {
    use super::*;
    use crate::notification::error::FailureKind;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_event() -> AlertEvent {
        AlertEvent::new("New Asset Created", "Asset web-01 (10.0.0.1) has been added by alice.")
    }

    #[tokio::test]
    async fn test_feishu_send_success() {
        // Arrange
        let server = MockServer::start().await;
        let event = create_test_event();
        let expected_body = json!({
            "msg_type": "text",
            "content": {
                "text": "【ITAM Alert】New Asset Created\nAsset web-01 (10.0.0.1) has been added by alice."
            }
        });

        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("content-type", "application/json"))
            .and(body_json(&expected_body))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let provider = FeishuProvider::new(reqwest::Client::new());

        // Act
        let result = provider.send(&format!("{}/hook", server.uri()), &event).await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_feishu_handles_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let provider = FeishuProvider::new(reqwest::Client::new());
        let result = provider
            .send(&format!("{}/hook", server.uri()), &create_test_event())
            .await;

        match result {
            Err(ChannelError::Status { status, body, .. }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected a status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_feishu_requires_exactly_200() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let provider = FeishuProvider::new(reqwest::Client::new());
        let err = provider
            .send(&server.uri(), &create_test_event())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(err.to_string(), "feishu webhook returned status: 204");
    }

    #[tokio::test]
    async fn test_feishu_handles_connection_failure() {
        // Nothing listens on port 1 on the loopback interface.
        let provider = FeishuProvider::new(reqwest::Client::new());
        let err = provider
            .send("http://127.0.0.1:1/hook", &create_test_event())
            .await
            .unwrap_err();

        assert!(matches!(err, ChannelError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_feishu_transport_error_hides_webhook_token() {
        let provider = FeishuProvider::new(reqwest::Client::new());
        let err = provider
            .send(
                "http://127.0.0.1:1/open-apis/bot/v2/hook/SECRET-TOKEN",
                &create_test_event(),
            )
            .await
            .unwrap_err();

        let mut rendered = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        assert!(!rendered.contains("SECRET-TOKEN"), "leaked token: {}", rendered);
        assert!(!rendered.contains("/open-apis/bot/v2/hook"));
        assert_eq!(err.kind(), FailureKind::Transport);
    }
}
