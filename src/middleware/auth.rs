use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::principal::{AccessToken, Principal};

/// Authenticated session attached to the request once the bearer token
/// resolves. `token_id` is the credential this request presented; sessions
/// established by other means may carry none.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub principal: Principal,
    pub token_id: Option<Uuid>,
}

/// Extract the bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Look up the principal owning `token`, together with the token's id.
pub async fn principal_for_token(
    pool: &PgPool,
    token: &str,
) -> Result<Option<(Principal, Uuid)>, sqlx::Error> {
    let token_row = sqlx::query_as::<_, AccessToken>(
        "SELECT id, user_id, name, created_at FROM access_tokens WHERE token = $1",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    let Some(token_row) = token_row else {
        return Ok(None);
    };

    let principal = sqlx::query_as::<_, Principal>(
        "SELECT id, tenant_id, name, email, status, ativo, created_at FROM users WHERE id = $1",
    )
    .bind(token_row.user_id)
    .fetch_optional(pool)
    .await?;

    Ok(principal.map(|p| (p, token_row.id)))
}

/// Middleware: attach an [`AuthSession`] when the request carries a valid
/// bearer token.
///
/// Never rejects on its own: the active-session gate downstream owns the
/// rejection contract, so a failed lookup just leaves the request
/// unauthenticated.
pub async fn authenticate(State(pool): State<PgPool>, mut req: Request, next: Next) -> Response {
    if let Some(token) = bearer_token(req.headers()).map(str::to_owned) {
        match principal_for_token(&pool, &token).await {
            Ok(Some((principal, token_id))) => {
                req.extensions_mut().insert(AuthSession {
                    principal,
                    token_id: Some(token_id),
                });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "token lookup failed, treating request as unauthenticated");
            }
        }
    }
    next.run(req).await
}
