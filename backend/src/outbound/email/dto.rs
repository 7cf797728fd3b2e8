//! Wire types for the transactional email HTTP API.

use serde::{Deserialize, Serialize};

use crate::domain::EmailMessage;

/// Body of `POST {api_base}/emails`.
#[derive(Debug, Serialize)]
pub(super) struct SendEmailRequestDto<'a> {
    pub from: &'a str,
    pub to: [&'a str; 1],
    pub subject: &'a str,
    pub html: &'a str,
}

impl<'a> SendEmailRequestDto<'a> {
    pub(super) fn new(from: &'a str, message: &'a EmailMessage) -> Self {
        Self {
            from,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
        }
    }
}

/// Successful response; only the provider message id is kept.
#[derive(Debug, Deserialize)]
pub(super) struct SendEmailResponseDto {
    #[serde(default)]
    pub id: Option<String>,
}

/// Error payload returned by the provider on rejection.
#[derive(Debug, Deserialize)]
pub(super) struct ProviderErrorDto {
    #[serde(default)]
    pub message: Option<String>,
}
