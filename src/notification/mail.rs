use serde::{Deserialize, Serialize};

use crate::models::principal::Principal;

/// One mail address with a display name (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailAddress {
    pub email: String,
    pub name: String,
}

impl MailAddress {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Provider-agnostic rendering of one notification, already shaped for the
/// transactional-email wire format (camelCase keys, `htmlContent`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<MailAddress>,
    #[serde(default)]
    pub to: Vec<MailAddress>,
    pub subject: String,
    pub html_content: String,
}

impl MailPayload {
    /// Payload with no sender and no recipients; the adapter fills both in
    /// at send time.
    pub fn new(subject: impl Into<String>, html_content: impl Into<String>) -> Self {
        Self {
            sender: None,
            to: Vec::new(),
            subject: subject.into(),
            html_content: html_content.into(),
        }
    }
}

/// A notification that can render itself as mail. Notifications without a
/// mail rendering simply do not implement this; the compiler, not a
/// runtime probe, decides what the mailer accepts.
pub trait MailRender: Sync {
    fn to_mail(&self) -> MailPayload;
}

/// A delivery target: anything with a routable mail address.
pub trait Notifiable: Sync {
    /// Address mail is routed to, when the target has one.
    fn route_email(&self) -> Option<String>;

    /// Name shown alongside the address; empty when unknown.
    fn display_name(&self) -> String {
        String::new()
    }
}

impl Notifiable for Principal {
    fn route_email(&self) -> Option<String> {
        Some(self.email.clone())
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}
