use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::mail::{MailAddress, MailPayload, MailRender, Notifiable};
use crate::config::MailConfig;

/// Outcome of one delivery attempt, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Provider accepted the message (2xx).
    Delivered {
        status: u16,
        message_id: Option<String>,
    },
    /// Provider refused it (non-2xx); `error` carries the response body.
    Rejected { status: u16, error: String },
}

#[derive(Debug, Deserialize)]
struct BrevoResponse {
    #[serde(rename = "messageId")]
    message_id: Option<String>,
}

/// Transactional-email adapter for the Brevo HTTP API.
///
/// Delivery is best-effort and single-attempt: one POST, no retry, no
/// backoff. An empty API key disables sending entirely.
#[derive(Clone)]
pub struct BrevoMailer {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    sender: MailAddress,
}

impl BrevoMailer {
    pub fn new(cfg: &MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: cfg.api_key.clone(),
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            sender: MailAddress::new(&cfg.from_email, &cfg.from_name),
        }
    }

    /// Send `notification` to `recipient`.
    ///
    /// Returns `Ok(None)` when sending is disabled (empty API key); no
    /// network call is made. Provider refusals come back as
    /// [`SendOutcome::Rejected`], never as an error; only transport
    /// failures (connect, TLS, timeout) propagate to the caller.
    pub async fn send(
        &self,
        notification: &dyn MailRender,
        recipient: &dyn Notifiable,
    ) -> anyhow::Result<Option<SendOutcome>> {
        if self.api_key.is_empty() {
            warn!("mail API key not configured, dropping notification");
            return Ok(None);
        }

        let payload = self.assemble(notification, recipient);

        // Preview for operators; never the API key, never the full body.
        let recipients: Vec<&str> = payload.to.iter().map(|a| a.email.as_str()).collect();
        info!(
            recipients = ?recipients,
            subject = %payload.subject,
            body_preview = %html_preview(&payload.html_content, PREVIEW_LEN),
            "sending transactional mail"
        );

        let resp = self
            .client
            .post(format!("{}/smtp/email", self.api_url))
            .header("api-key", &self.api_key)
            .header("accept", "application/json")
            .json(&payload)
            .send()
            .await
            .context("mail provider request failed")?;

        let status = resp.status().as_u16();
        if resp.status().is_success() {
            let message_id = resp
                .json::<BrevoResponse>()
                .await
                .ok()
                .and_then(|b| b.message_id);
            info!(status, message_id = ?message_id, "mail accepted by provider");
            Ok(Some(SendOutcome::Delivered { status, message_id }))
        } else {
            let body = resp.text().await.unwrap_or_default();
            error!(
                status,
                subject = %payload.subject,
                body = %body,
                "mail refused by provider"
            );
            Ok(Some(SendOutcome::Rejected {
                status,
                error: body,
            }))
        }
    }

    /// Fill in the configured sender identity and the recipient's routing
    /// address.
    fn assemble(&self, notification: &dyn MailRender, recipient: &dyn Notifiable) -> MailPayload {
        let mut payload = notification.to_mail();
        if payload.sender.is_none() {
            payload.sender = Some(self.sender.clone());
        }
        if let Some(email) = recipient.route_email() {
            payload
                .to
                .push(MailAddress::new(email, recipient.display_name()));
        }
        payload
    }
}

const PREVIEW_LEN: usize = 160;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Tag-stripped, length-capped view of an HTML body, safe for logs.
fn html_preview(html: &str, max: usize) -> String {
    let text = TAG.replace_all(html, " ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() > max {
        let truncated: String = text.chars().take(max).collect();
        format!("{truncated}…")
    } else {
        text
    }
}
