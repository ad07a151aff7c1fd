//! Outbound notifications: provider-agnostic mail payloads and the Brevo
//! transactional-email adapter.

pub mod brevo;
pub mod mail;
pub mod templates;
