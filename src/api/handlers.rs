use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::AppError;
use crate::middleware::auth::AuthSession;
use crate::notification::brevo::SendOutcome;
use crate::notification::templates::{Recipient, TestMessage};
use crate::tenancy::TenantContext;
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize)]
pub struct TestMailRequest {
    pub to: String,
    pub name: Option<String>,
}

#[derive(Serialize)]
pub struct TestMailResponse {
    pub delivered: bool,
    pub status: Option<u16>,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────

/// GET /api/v1/me — identity of the authenticated principal.
pub async fn me(Extension(session): Extension<AuthSession>) -> Json<serde_json::Value> {
    let p = session.principal;
    Json(json!({
        "id": p.id,
        "name": p.name,
        "email": p.email,
        "tenant_id": p.tenant_id,
    }))
}

/// GET /api/v1/tenant — tenant resolved for this request's domain.
pub async fn current_tenant(
    tenant: Option<Extension<TenantContext>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Extension(tenant) = tenant.ok_or(AppError::NotFound("tenant"))?;
    Ok(Json(json!({ "id": tenant.id, "slug": tenant.slug })))
}

/// POST /api/v1/mail/test — send a test message through the provider.
pub async fn send_test_mail(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TestMailRequest>,
) -> Result<Json<TestMailResponse>, AppError> {
    let recipient = Recipient {
        email: req.to,
        name: req.name.unwrap_or_default(),
    };

    let outcome = state.mailer.send(&TestMessage, &recipient).await?;

    Ok(Json(match outcome {
        None => TestMailResponse {
            delivered: false,
            status: None,
            message_id: None,
            error: Some("mail delivery disabled (no API key configured)".into()),
        },
        Some(SendOutcome::Delivered { status, message_id }) => TestMailResponse {
            delivered: true,
            status: Some(status),
            message_id,
            error: None,
        },
        Some(SendOutcome::Rejected { status, error }) => TestMailResponse {
            delivered: false,
            status: Some(status),
            message_id: None,
            error: Some(error),
        },
    }))
}
