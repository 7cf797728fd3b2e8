//! Driven port for outbound customer messages.

use async_trait::async_trait;
use tracing::info;

use crate::domain::EmailMessage;

use super::define_port_error;

define_port_error! {
    /// Errors raised by notifier adapters.
    pub enum NotifierError {
        /// The delivery channel could not be reached.
        Transport { message: String } => "notification transport failed: {message}",
        /// The provider refused the message.
        Rejected { status: u16, message: String } =>
            "notification rejected with status {status}: {message}",
    }
}

/// Port delivering a rendered message to one recipient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message`. Callers treat failures as non-fatal.
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifierError>;
}

/// Notifier that only records messages in the log.
///
/// Used when no email provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyNotifier;

#[async_trait]
impl Notifier for LogOnlyNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifierError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "email delivery disabled; message logged only"
        );
        Ok(())
    }
}
