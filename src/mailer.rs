//! Outgoing-mail transport.
//!
//! The core only depends on the [`MailTransport`] trait; the production
//! implementation posts to an HTTP mail relay. Tests substitute a recording
//! mock.

use crate::config::Mailer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::json;
use std::fmt;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailError {
    /// Relay credentials are missing from the configuration. Reported with
    /// its own message, distinct from a transport failure.
    #[error("mail transport is not configured")]
    NotConfigured,
    #[error("{0}")]
    Send(String),
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Relay-backed transport: POSTs a JSON message to the configured endpoint,
/// authenticated with the app password.
#[derive(Clone)]
pub struct HttpMailer {
    http: Client,
    relay_url: Url,
    from_email: String,
    app_password: String,
}

impl fmt::Debug for HttpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMailer")
            .field("relay_url", &self.relay_url)
            .field("from_email", &self.from_email)
            .finish_non_exhaustive()
    }
}

impl HttpMailer {
    pub fn from_config(cfg: &Mailer) -> Result<Self> {
        let relay_url = Url::parse(&cfg.relay_url).context("invalid mailer.relay_url")?;
        let http = Client::builder()
            .user_agent("outreach-crm/0.1")
            .build()
            .expect("reqwest client");
        Ok(HttpMailer {
            http,
            relay_url,
            from_email: cfg.from_email.clone(),
            app_password: cfg.app_password.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.from_email.is_empty() && !self.app_password.is_empty()
    }
}

#[async_trait]
impl MailTransport for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        if !self.is_configured() {
            return Err(MailError::NotConfigured);
        }
        let payload = json!({
            "from": self.from_email,
            "to": to,
            "subject": subject,
            "body": body,
        });
        let resp = self
            .http
            .post(self.relay_url.clone())
            .bearer_auth(&self.app_password)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Send(format!("mail relay request failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(MailError::Send(format!(
                "mail relay returned {}: {}",
                status,
                detail.trim()
            )));
        }
        info!(to, subject, "sent outreach email via relay");
        Ok(())
    }
}
