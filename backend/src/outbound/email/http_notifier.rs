//! Reqwest-backed notifier for a Resend-compatible email API.
//!
//! The adapter owns transport details only: request serialisation, bearer
//! authentication, timeout and status mapping. Rendering happens in the
//! domain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::{ProviderErrorDto, SendEmailRequestDto, SendEmailResponseDto};
use crate::domain::EmailMessage;
use crate::domain::ports::{Notifier, NotifierError};

/// Production API endpoint root.
pub const DEFAULT_EMAIL_API_BASE: &str = "https://api.resend.com";
/// Sender used when none is configured.
pub const DEFAULT_SENDER: &str = "Transport Vozila <onboarding@resend.dev>";

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Connection settings for [`HttpEmailNotifier`].
#[derive(Debug, Clone)]
pub struct EmailApiSettings {
    pub api_base: Url,
    pub api_key: String,
    pub sender: String,
    pub timeout: Duration,
}

/// Sends rendered messages through `POST {api_base}/emails`.
pub struct HttpEmailNotifier {
    client: Client,
    endpoint: Url,
    api_key: String,
    sender: String,
}

impl HttpEmailNotifier {
    /// Build the adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint cannot be derived from
    /// `api_base` or the reqwest client cannot be constructed.
    pub fn new(settings: EmailApiSettings) -> Result<Self, NotifierError> {
        let endpoint = emails_endpoint(&settings.api_base)?;
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|err| NotifierError::transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key,
            sender: settings.sender,
        })
    }
}

fn emails_endpoint(api_base: &Url) -> Result<Url, NotifierError> {
    let mut base = api_base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("emails")
        .map_err(|err| NotifierError::transport(format!("invalid email API base: {err}")))
}

#[async_trait]
impl Notifier for HttpEmailNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifierError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&SendEmailRequestDto::new(&self.sender, message))
            .send()
            .await
            .map_err(|err| NotifierError::transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| NotifierError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let id = serde_json::from_slice::<SendEmailResponseDto>(body.as_ref())
            .ok()
            .and_then(|dto| dto.id);
        debug!(provider_id = ?id, "email accepted by provider");
        Ok(())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> NotifierError {
    let message = serde_json::from_slice::<ProviderErrorDto>(body)
        .ok()
        .and_then(|dto| dto.message)
        .unwrap_or_else(|| body_preview(body));
    NotifierError::rejected(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://api.resend.com", "https://api.resend.com/emails")]
    #[case("https://mail.example/v1/", "https://mail.example/v1/emails")]
    #[case("http://127.0.0.1:9000/api", "http://127.0.0.1:9000/api/emails")]
    fn endpoint_appends_emails_path(#[case] base: &str, #[case] expected: &str) {
        let base = Url::parse(base).expect("valid url");
        let endpoint = emails_endpoint(&base).expect("endpoint");
        assert_eq!(endpoint.as_str(), expected);
    }

    #[rstest]
    fn request_body_wraps_single_recipient() {
        let message = EmailMessage {
            to: "kupac@example.com".to_owned(),
            subject: "Transport completed - TR-1-ABCD".to_owned(),
            html: "<p>done</p>".to_owned(),
        };
        let body = serde_json::to_value(SendEmailRequestDto::new(DEFAULT_SENDER, &message))
            .expect("serialise");

        assert_eq!(body["from"], DEFAULT_SENDER);
        assert_eq!(body["to"], serde_json::json!(["kupac@example.com"]));
        assert_eq!(body["subject"], "Transport completed - TR-1-ABCD");
    }

    #[rstest]
    fn rejection_prefers_provider_message() {
        let error = map_status_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            br#"{"statusCode":422,"message":"Invalid `to` field"}"#,
        );
        assert_eq!(
            error,
            NotifierError::rejected(422_u16, "Invalid `to` field")
        );
    }

    #[rstest]
    fn rejection_falls_back_to_body_preview() {
        let error = map_status_error(StatusCode::BAD_GATEWAY, b"upstream\n   unavailable");
        assert_eq!(error, NotifierError::rejected(502_u16, "upstream unavailable"));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_error() {
        let notifier = HttpEmailNotifier::new(EmailApiSettings {
            api_base: Url::parse("http://127.0.0.1:9").expect("valid url"),
            api_key: "re_test".to_owned(),
            sender: DEFAULT_SENDER.to_owned(),
            timeout: Duration::from_millis(500),
        })
        .expect("client builds");
        let message = EmailMessage {
            to: "kupac@example.com".to_owned(),
            subject: "s".to_owned(),
            html: "h".to_owned(),
        };

        let error = notifier.send(&message).await.expect_err("nothing listens");
        assert!(matches!(error, NotifierError::Transport { .. }));
    }
}
