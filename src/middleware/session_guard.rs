use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use super::auth::AuthSession;
use crate::errors::AppError;

/// `status` value marking an active account, kept verbatim from the
/// identity store, historical spelling included.
const ACTIVE_STATUS: &str = "actived";

/// Legacy single-character flag; "s" marks an active account.
const ACTIVE_FLAG: &str = "s";

/// Effective activity of a principal: either field can mark it active,
/// absent fields never do. Comparison ignores case.
pub fn is_active(status: Option<&str>, ativo: Option<&str>) -> bool {
    status.is_some_and(|s| s.eq_ignore_ascii_case(ACTIVE_STATUS))
        || ativo.is_some_and(|a| a.eq_ignore_ascii_case(ACTIVE_FLAG))
}

/// Deletes access credentials when a principal turns out to be inactive.
#[async_trait]
pub trait CredentialRevoker {
    /// Delete one token. Returns whether a token was deleted.
    async fn revoke_token(&self, token_id: Uuid) -> anyhow::Result<bool>;

    /// Delete every token owned by the principal. Returns the count.
    async fn revoke_all(&self, principal_id: Uuid) -> anyhow::Result<u64>;
}

/// Middleware: let only active principals through.
///
/// An inactive principal has its presented credential revoked first (all
/// of its credentials when the current one is unknown); a failed
/// revocation is logged without changing the outcome. Requests with no
/// authenticated principal are rejected with the same response, without
/// touching any credentials.
pub async fn require_active_session<R>(
    State(revoker): State<R>,
    req: Request,
    next: Next,
) -> Response
where
    R: CredentialRevoker + Clone + Send + Sync + 'static,
{
    let Some(session) = req.extensions().get::<AuthSession>().cloned() else {
        return AppError::InactiveUser.into_response();
    };

    let principal = &session.principal;
    if is_active(principal.status.as_deref(), principal.ativo.as_deref()) {
        return next.run(req).await;
    }

    revoke_credentials(&revoker, principal.id, session.token_id).await;
    AppError::InactiveUser.into_response()
}

/// Best-effort revocation: the current token when known, everything
/// otherwise.
async fn revoke_credentials<R: CredentialRevoker>(
    revoker: &R,
    principal_id: Uuid,
    token_id: Option<Uuid>,
) {
    let outcome = match token_id {
        Some(id) => revoker.revoke_token(id).await.map(u64::from),
        None => revoker.revoke_all(principal_id).await,
    };

    match outcome {
        Ok(revoked) => {
            tracing::info!(%principal_id, revoked, "revoked credentials of inactive principal");
        }
        Err(e) => {
            tracing::error!(%principal_id, error = %e, "credential revocation failed for inactive principal");
        }
    }
}
