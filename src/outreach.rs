//! Outreach workflows: the append-only event log and the email-send flow
//! with its status side effect.

use crate::db::{self, Pool};
use crate::error::{CrmError, Result};
use crate::mailer::{MailError, MailTransport};
use crate::model::{FunnelStatus, OutreachEvent};
use serde::Serialize;
use tracing::{info, instrument};

/// Returned by [`send_outreach_email`] on success.
#[derive(Debug, Clone, Serialize)]
pub struct SendReport {
    pub status: &'static str,
    pub to: String,
    pub business_id: i64,
    pub business_status: FunnelStatus,
}

/// Append an event to a business's log. The event type is required; the
/// owning business's `updated_at` is touched in the same transaction.
#[instrument(skip_all)]
pub async fn log_event(
    pool: &Pool,
    business_id: i64,
    event_type: &str,
    details: &str,
) -> Result<OutreachEvent> {
    if event_type.trim().is_empty() {
        return Err(CrmError::Validation("event_type must be non-empty"));
    }
    let event = db::insert_event(pool, business_id, event_type, details).await?;
    info!(business_id, event_type, "logged outreach event");
    Ok(event)
}

/// Send an outreach email through the transport, then record it: one
/// `email_sent` event naming the recipient, and a prospect business is
/// advanced to contacted. The status is never moved otherwise.
#[instrument(skip_all)]
pub async fn send_outreach_email(
    pool: &Pool,
    transport: &dyn MailTransport,
    business_id: i64,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<SendReport> {
    if to.trim().is_empty() || subject.trim().is_empty() || body.trim().is_empty() {
        return Err(CrmError::Validation(
            "to_email, subject and body are required",
        ));
    }
    // A missing business must surface as NotFound, never as a delivery error.
    let business = db::fetch_business(pool, business_id).await?;

    transport.send(to, subject, body).await.map_err(|e| match e {
        MailError::NotConfigured => CrmError::MailNotConfigured,
        MailError::Send(msg) => CrmError::Delivery(msg),
    })?;

    let details = format!("Sent \"{subject}\" to {to}");
    let (_event, status) = db::record_email_sent(pool, business.id, &details).await?;
    info!(business_id, to, ?status, "outreach email recorded");
    Ok(SendReport {
        status: "sent",
        to: to.to_string(),
        business_id: business.id,
        business_status: status,
    })
}
