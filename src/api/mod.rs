use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};

use crate::middleware::{auth, session_guard};
use crate::store::postgres::PgStore;
use crate::AppState;

pub mod handlers;

/// Build the management API router. All routes are relative — the caller
/// mounts this under `/api/v1`.
pub fn api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Routes for authenticated principals: bearer auth resolves the
    // session, the active-session gate decides whether it may continue.
    let session_routes: Router<Arc<AppState>> = Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(
            state.db.clone(),
            session_guard::require_active_session::<PgStore>,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.db.pool().clone(),
            auth::authenticate,
        ));

    // Operator routes behind the admin key.
    let admin_routes: Router<Arc<AppState>> = Router::new()
        .route("/mail/test", post(handlers::send_test_mail))
        .route_layer(middleware::from_fn_with_state(state, admin_auth));

    Router::new()
        .route("/tenant", get(handlers::current_tenant))
        .merge(session_routes)
        .merge(admin_routes)
        .fallback(fallback_404)
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Middleware: validates `X-Admin-Key` (or a bearer token) against the
/// configured admin key. Returns 401 if missing/invalid.
async fn admin_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided_key = req
        .headers()
        .get("x-admin-key")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim())
        });

    match provided_key {
        Some(k) if k == state.config.admin_key => Ok(next.run(req).await),
        Some(k) => {
            // Never log the expected key or the full provided key.
            let masked = if k.len() > 8 {
                format!("{}…{}", &k[..4], &k[k.len() - 4..])
            } else {
                "****".to_string()
            };
            tracing::warn!("management API: invalid admin key (provided: '{}')", masked);
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("management API: missing X-Admin-Key header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
