//! Active-session gate behavior over a minimal router.
//!
//! The rejection contract is frozen for existing clients: status 405 with
//! the exact body `{"error":"Usuário inativo"}` — for missing principals
//! (no revocation) and inactive principals (after best-effort revocation)
//! alike.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::get,
    Extension, Router,
};
use tower::ServiceExt;
use uuid::Uuid;

use gestor_edge::middleware::auth::AuthSession;
use gestor_edge::middleware::session_guard::{require_active_session, CredentialRevoker};
use gestor_edge::models::principal::Principal;

#[derive(Clone, Default)]
struct RecordingRevoker {
    single: Arc<AtomicUsize>,
    bulk: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait::async_trait]
impl CredentialRevoker for RecordingRevoker {
    async fn revoke_token(&self, _token_id: Uuid) -> anyhow::Result<bool> {
        self.single.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("revocation store unavailable");
        }
        Ok(true)
    }

    async fn revoke_all(&self, _principal_id: Uuid) -> anyhow::Result<u64> {
        self.bulk.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("revocation store unavailable");
        }
        Ok(2)
    }
}

fn principal(status: Option<&str>, ativo: Option<&str>) -> Principal {
    Principal {
        id: Uuid::new_v4(),
        tenant_id: Uuid::new_v4(),
        name: "Maria".into(),
        email: "maria@example.com".into(),
        status: status.map(String::from),
        ativo: ativo.map(String::from),
        created_at: chrono::Utc::now(),
    }
}

fn guarded_app(revoker: RecordingRevoker, session: Option<AuthSession>) -> Router {
    let mut router = Router::new()
        .route("/ok", get(|| async { "through" }))
        .route_layer(middleware::from_fn_with_state(
            revoker,
            require_active_session::<RecordingRevoker>,
        ));
    if let Some(session) = session {
        // Inserted outside the guard, the way the authenticator does it.
        router = router.layer(Extension(session));
    }
    router
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_absent_principal_rejected_without_revocation() {
    let revoker = RecordingRevoker::default();
    let app = guarded_app(revoker.clone(), None);

    let response = app
        .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "error": "Usuário inativo" })
    );
    assert_eq!(revoker.single.load(Ordering::SeqCst), 0);
    assert_eq!(revoker.bulk.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_inactive_principal_rejected_and_current_token_revoked() {
    let revoker = RecordingRevoker::default();
    let session = AuthSession {
        principal: principal(Some("blocked"), Some("n")),
        token_id: Some(Uuid::new_v4()),
    };
    let app = guarded_app(revoker.clone(), Some(session));

    let response = app
        .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "error": "Usuário inativo" })
    );
    assert_eq!(revoker.single.load(Ordering::SeqCst), 1);
    assert_eq!(revoker.bulk.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_inactive_principal_without_token_revokes_everything() {
    let revoker = RecordingRevoker::default();
    let session = AuthSession {
        principal: principal(None, None),
        token_id: None,
    };
    let app = guarded_app(revoker.clone(), Some(session));

    let response = app
        .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(revoker.single.load(Ordering::SeqCst), 0);
    assert_eq!(revoker.bulk.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_revocation_does_not_change_rejection() {
    let revoker = RecordingRevoker {
        fail: true,
        ..Default::default()
    };
    let session = AuthSession {
        principal: principal(Some("blocked"), None),
        token_id: Some(Uuid::new_v4()),
    };
    let app = guarded_app(revoker.clone(), Some(session));

    let response = app
        .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "error": "Usuário inativo" })
    );
    assert_eq!(revoker.single.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_active_status_passes_through() {
    let revoker = RecordingRevoker::default();
    let session = AuthSession {
        principal: principal(Some("Actived"), None),
        token_id: Some(Uuid::new_v4()),
    };
    let app = guarded_app(revoker.clone(), Some(session));

    let response = app
        .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"through");
    assert_eq!(revoker.single.load(Ordering::SeqCst), 0);
    assert_eq!(revoker.bulk.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_legacy_flag_passes_through() {
    let revoker = RecordingRevoker::default();
    let session = AuthSession {
        principal: principal(Some("blocked"), Some("S")),
        token_id: None,
    };
    let app = guarded_app(revoker, Some(session));

    let response = app
        .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
