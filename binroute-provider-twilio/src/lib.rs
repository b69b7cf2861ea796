//! Notification provider for binroute sending SMS through the Twilio Messages API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use binroute_core::{
    model::PhoneNumber,
    ports::{NotifierPort, PortError},
};

const BASE_URL: &str = "https://api.twilio.com";
const API_VERSION: &str = "2010-04-01";

/// Account credentials and sender number.
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    /// Account SID, also the basic-auth user name.
    pub account_sid: String,
    /// Auth token, the basic-auth password.
    pub auth_token: String,
    /// Number messages are sent from.
    pub from: PhoneNumber,
}

/// Successful reply from /Messages.json
#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

/// Error body Twilio returns alongside 4xx/5xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<u32>,
    message: String,
}

/// SMS sender backed by Twilio.
pub struct TwilioNotifierPort {
    client: Client,
    credentials: TwilioCredentials,
    base_url: String,
}

impl TwilioNotifierPort {
    /// Create a new notifier bound to the given HTTP client and account.
    #[must_use]
    pub fn new(client: Client, credentials: TwilioCredentials) -> Self {
        Self {
            client,
            credentials,
            base_url: BASE_URL.to_owned(),
        }
    }

    /// Point the notifier at a different host, e.g. a local proxy.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{API_VERSION}/Accounts/{}/Messages.json",
            self.base_url, self.credentials.account_sid
        )
    }
}

#[async_trait]
impl NotifierPort for TwilioNotifierPort {
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<(), PortError> {
        let form = [
            ("To", to.0.as_str()),
            ("From", self.credentials.from.0.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&form)
            .send()
            .await
            .map_err(PortError::from)?;

        let message = read_message(response).await?;
        debug!(
            sid = %message.sid,
            status = message.status.as_deref().unwrap_or("unknown"),
            "message queued"
        );
        Ok(())
    }
}

/// Build the notifier wrapped for the dispatch service.
#[must_use]
pub fn port(client: Client, credentials: TwilioCredentials) -> Arc<dyn NotifierPort> {
    Arc::new(TwilioNotifierPort::new(client, credentials))
}

// Decode the message on success and surface Twilio's own message on failure.
async fn read_message(response: Response) -> Result<MessageResponse, PortError> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(PortError::from);
    }

    let body = response.text().await.map_err(PortError::from)?;
    Err(PortError::Provider(describe_failure(status.as_u16(), &body)))
}

fn describe_failure(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            code: Some(code),
            message,
        }) => format!("HTTP {status} (code {code}): {message}"),
        Ok(ErrorResponse {
            code: None,
            message,
        }) => format!("HTTP {status}: {message}"),
        Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
        Err(_) => format!("HTTP {status}: {}", body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> TwilioNotifierPort {
        TwilioNotifierPort::new(
            Client::new(),
            TwilioCredentials {
                account_sid: "AC123".to_owned(),
                auth_token: "secret".to_owned(),
                from: PhoneNumber("+15005550006".to_owned()),
            },
        )
    }

    #[test]
    fn messages_url_embeds_account() {
        assert_eq!(
            notifier().messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
        assert_eq!(
            notifier().with_base_url("http://127.0.0.1:9000").messages_url(),
            "http://127.0.0.1:9000/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn failure_uses_twilio_error_body() {
        let body = r#"{"code": 21211, "message": "The 'To' number is not a valid phone number.", "status": 400}"#;

        assert_eq!(
            describe_failure(400, body),
            "HTTP 400 (code 21211): The 'To' number is not a valid phone number."
        );
    }

    #[test]
    fn failure_without_json_keeps_raw_text() {
        assert_eq!(describe_failure(503, "  upstream down \n"), "HTTP 503: upstream down");
        assert_eq!(describe_failure(502, ""), "HTTP 502");
    }

    #[test]
    fn message_reply_parses() {
        let reply: MessageResponse =
            serde_json::from_str(r#"{"sid": "SM1", "status": "queued", "to": "+15005550006"}"#)
                .expect("valid reply");

        assert_eq!(reply.sid, "SM1");
        assert_eq!(reply.status.as_deref(), Some("queued"));
    }
}
