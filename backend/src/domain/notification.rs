//! Customer notifications for transport lifecycle events.
//!
//! Messages are rendered from fixed templates and handed to a [`Notifier`].
//! Delivery is best effort: failures are logged and never reach the caller,
//! so a lifecycle mutation that already committed is never undone by a
//! failed email.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ports::Notifier;
use super::{DayCount, Transport};

/// Old-phase label used for the notification sent when a transport is created.
pub const CREATION_PHASE_LABEL: &str = "Created";

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Lifecycle event a customer is told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportNotice {
    /// A transport was created in `phase`. Rendered with
    /// [`CREATION_PHASE_LABEL`] as the previous phase.
    Started {
        phase: String,
        days_to_complete: DayCount,
    },
    /// The transport moved from one catalogue phase to another.
    PhaseChange {
        previous_phase: String,
        new_phase: String,
        days_to_complete: DayCount,
    },
    /// The transport was marked completed.
    Completion,
}

impl TransportNotice {
    /// Notice for a newly created transport entering `phase`.
    #[must_use]
    pub fn started(phase: impl Into<String>, days_to_complete: DayCount) -> Self {
        Self::Started {
            phase: phase.into(),
            days_to_complete,
        }
    }
}

fn phase_change_event(
    transport: &Transport,
    previous_phase: &str,
    new_phase: &str,
    days_to_complete: DayCount,
) -> String {
    let details = &transport.details;
    format!(
        concat!(
            "<p>Your vehicle transport has moved to a new phase.</p>",
            "<p><strong>Previous phase:</strong> {previous}</p>",
            "<p><strong>Current phase:</strong> {current}</p>",
            "<p><strong>Route:</strong> {origin} &rarr; {destination}</p>",
            "<p><strong>Estimated time to complete this phase:</strong> {days}</p>"
        ),
        previous = escape_html(previous_phase),
        current = escape_html(new_phase),
        origin = escape_html(&details.origin_location),
        destination = escape_html(&details.destination_location),
        days = day_label(days_to_complete),
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn day_label(days: DayCount) -> String {
    match days.get() {
        1 => "1 day".to_owned(),
        n => format!("{n} days"),
    }
}

fn tracking_link(base_url: &str, tracking_number: &str) -> String {
    format!("{}/?track={tracking_number}", base_url.trim_end_matches('/'))
}

fn layout(title: &str, body: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>",
            "<body style=\"font-family: sans-serif; background-color: #f4f4f5; padding: 20px;\">",
            "<div style=\"max-width: 600px; margin: 0 auto; background: #ffffff; ",
            "border-radius: 12px; padding: 30px;\">",
            "<h1 style=\"color: #10b981;\">{title}</h1>{body}",
            "<p style=\"font-size: 12px; color: #9ca3af;\">",
            "This is an automated message, please do not reply.</p>",
            "</div></body></html>"
        ),
        title = title,
        body = body,
    )
}

/// Render the message for `notice` about `transport`.
///
/// # Examples
/// ```no_run
/// # use tracker_backend::domain::{render_notice, Transport, TransportNotice};
/// # fn demo(transport: &Transport) {
/// let message = render_notice(transport, &TransportNotice::Completion, "https://track.example");
/// assert!(message.subject.starts_with("Transport completed - "));
/// # }
/// ```
#[must_use]
pub fn render_notice(transport: &Transport, notice: &TransportNotice, base_url: &str) -> EmailMessage {
    let tracking_number = transport.tracking_number.as_str();
    let details = &transport.details;
    let customer = escape_html(&details.customer_name);
    let vehicle = escape_html(&details.vehicle_label());
    let tracking = escape_html(tracking_number);
    let link = escape_html(&tracking_link(base_url, tracking_number));

    let (title, subject, event) = match notice {
        TransportNotice::Started {
            phase,
            days_to_complete,
        } => (
            "Transport status update",
            format!("Transport started - {tracking_number}"),
            phase_change_event(transport, CREATION_PHASE_LABEL, phase, *days_to_complete),
        ),
        TransportNotice::PhaseChange {
            previous_phase,
            new_phase,
            days_to_complete,
        } => (
            "Transport status update",
            format!("Transport status updated - {tracking_number}"),
            phase_change_event(transport, previous_phase, new_phase, *days_to_complete),
        ),
        TransportNotice::Completion => {
            let event = format!(
                "<p>Your vehicle transport has been completed successfully.</p>\
                 <p><strong>Delivered to:</strong> {}</p>",
                escape_html(&details.destination_location),
            );
            (
                "Transport completed",
                format!("Transport completed - {tracking_number}"),
                event,
            )
        }
    };

    let body = format!(
        concat!(
            "<p>Dear <strong>{customer}</strong>,</p>",
            "<p><strong>Tracking number:</strong> {tracking}</p>",
            "<p><strong>Vehicle:</strong> {vehicle}</p>",
            "{event}",
            "<p><a href=\"{link}\">Track your transport</a></p>"
        ),
        customer = customer,
        tracking = tracking,
        vehicle = vehicle,
        event = event,
        link = link,
    );

    EmailMessage {
        to: details.customer_email.clone(),
        subject,
        html: layout(title, &body),
    }
}

/// Renders lifecycle notices and hands them to a [`Notifier`].
pub struct NotificationDispatcher<N> {
    notifier: Arc<N>,
    public_base_url: String,
}

impl<N> Clone for NotificationDispatcher<N> {
    fn clone(&self) -> Self {
        Self {
            notifier: Arc::clone(&self.notifier),
            public_base_url: self.public_base_url.clone(),
        }
    }
}

impl<N: Notifier> NotificationDispatcher<N> {
    /// Create a dispatcher linking customers to `public_base_url`.
    pub fn new(notifier: Arc<N>, public_base_url: impl Into<String>) -> Self {
        Self {
            notifier,
            public_base_url: public_base_url.into(),
        }
    }

    /// Render and deliver `notice`. Never fails.
    pub async fn notify(&self, transport: &Transport, notice: &TransportNotice) {
        let message = render_notice(transport, notice, &self.public_base_url);
        match self.notifier.send(&message).await {
            Ok(()) => info!(
                tracking_number = %transport.tracking_number,
                subject = %message.subject,
                "customer notification sent"
            ),
            Err(error) => warn!(
                %error,
                tracking_number = %transport.tracking_number,
                "customer notification failed"
            ),
        }
    }
}
