//! Email delivery adapters implementing the [`Notifier`] port.
//!
//! [`Notifier`]: crate::domain::ports::Notifier

mod dto;
mod http_notifier;

pub use http_notifier::{DEFAULT_EMAIL_API_BASE, DEFAULT_SENDER, EmailApiSettings, HttpEmailNotifier};
