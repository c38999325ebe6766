//! Twilio Messages API client used to relay WhatsApp notifications.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{Config, Error, Result};

/// A single outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "Body")]
    pub body: String,
}

/// Something that can deliver an outbound message exactly once.
///
/// Returns the provider's message identifier on success.
pub trait MessageRelay: Send + Sync {
    fn send(
        &self,
        config: &Config,
        message: &OutboundMessage,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Message resource returned by Twilio on creation.
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Error body returned by Twilio on failure.
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<u32>,
    message: String,
}

/// Client for the Twilio REST API.
#[derive(Debug, Clone, Default)]
pub struct TwilioClient {
    http: reqwest::Client,
}

impl TwilioClient {
    /// Create a new client over an existing HTTP client.
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn messages_url(config: &Config) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            config.api_base, config.account_sid
        )
    }
}

impl MessageRelay for TwilioClient {
    async fn send(&self, config: &Config, message: &OutboundMessage) -> Result<String> {
        let response = self
            .http
            .post(Self::messages_url(config))
            .basic_auth(&config.account_sid, Some(&config.auth_token))
            .form(message)
            .send()
            .await
            .map_err(|e| Error::Relay(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::Relay(e.to_string()))?;

        if status.is_success() {
            let resource: MessageResource = serde_json::from_str(&body)
                .map_err(|e| Error::Relay(format!("Unexpected Twilio response: {}", e)))?;
            info!(sid = %resource.sid, "Message accepted by Twilio");
            Ok(resource.sid)
        } else {
            let description = describe_failure(status.as_u16(), &body);
            error!(status = status.as_u16(), error = %description, "Twilio rejected message");
            Err(Error::Relay(description))
        }
    }
}

/// Extract the provider's error message, falling back to the status line.
fn describe_failure(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => {
            if let Some(code) = api_error.code {
                tracing::debug!(code, "Twilio error code");
            }
            api_error.message
        }
        Err(_) => format!("Twilio request failed with status {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            sender: "whatsapp:+14155238886".to_string(),
            recipient: "whatsapp:+51987654321".to_string(),
            api_base: "https://api.twilio.com".to_string(),
            business_name: "Joel's Services".to_string(),
        }
    }

    #[test]
    fn test_messages_url() {
        assert_eq!(
            TwilioClient::messages_url(&config()),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_describe_failure_uses_provider_message() {
        let body = r#"{"code": 21211, "message": "Invalid 'To' Phone Number", "status": 400}"#;
        assert_eq!(describe_failure(400, body), "Invalid 'To' Phone Number");
    }

    #[test]
    fn test_describe_failure_without_json_body() {
        assert_eq!(
            describe_failure(503, "<html>unavailable</html>"),
            "Twilio request failed with status 503"
        );
    }

    #[test]
    fn test_form_field_names() {
        let message = OutboundMessage {
            from: "whatsapp:+1".to_string(),
            to: "whatsapp:+2".to_string(),
            body: "hola".to_string(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["From"], "whatsapp:+1");
        assert_eq!(json["To"], "whatsapp:+2");
        assert_eq!(json["Body"], "hola");
    }

    #[tokio::test]
    async fn test_unreachable_api_is_relay_error() {
        let mut config = config();
        config.api_base = "http://127.0.0.1:9".to_string();

        let message = OutboundMessage {
            from: config.sender.clone(),
            to: config.recipient.clone(),
            body: "hola".to_string(),
        };

        let err = TwilioClient::default().send(&config, &message).await.unwrap_err();
        assert!(matches!(err, Error::Relay(_)));
    }
}
