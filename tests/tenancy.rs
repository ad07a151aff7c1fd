//! Tenant identity propagation and the CORS origin registry.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::get,
    Extension, Router,
};
use tower::ServiceExt;

use gestor_edge::tenancy::headers::{
    tenant_identity_headers, TENANT_ID_HEADER, TENANT_SLUG_HEADER,
};
use gestor_edge::tenancy::origins::{add_if_missing, OriginRegistry};
use gestor_edge::tenancy::TenantContext;

// ── Origin registry ───────────────────────────────────────────

#[test]
fn test_registry_appends_tenant_origin_once() {
    let registry = OriginRegistry::new(vec!["https://b.example.com".to_string()]);

    assert!(registry.insert("https://a.example.com"));
    assert_eq!(
        registry.snapshot(),
        vec!["https://b.example.com", "https://a.example.com"]
    );

    // Same tenant initializing again: no duplicate.
    assert!(!registry.insert("https://a.example.com"));
    assert_eq!(
        registry.snapshot(),
        vec!["https://b.example.com", "https://a.example.com"]
    );
}

#[test]
fn test_registry_is_append_only() {
    let registry = OriginRegistry::new(Vec::new());
    registry.insert("https://a.example.com");
    registry.insert("https://b.example.com");

    assert!(registry.contains("https://a.example.com"));
    assert!(registry.contains("https://b.example.com"));
    assert_eq!(registry.snapshot().len(), 2);
}

#[test]
fn test_add_if_missing_pure_function() {
    let mut origins = vec!["https://b.example.com".to_string()];
    assert!(add_if_missing(&mut origins, "https://a.example.com"));
    assert!(!add_if_missing(&mut origins, "https://a.example.com"));
    assert!(!add_if_missing(&mut origins, ""));
    assert_eq!(origins, vec!["https://b.example.com", "https://a.example.com"]);
}

// ── Response annotation ───────────────────────────────────────

fn annotated_app(tenant: Option<TenantContext>) -> Router {
    let mut router = Router::new()
        .route("/contracts", get(|| async { "contract list" }))
        .layer(middleware::from_fn(tenant_identity_headers));
    if let Some(tenant) = tenant {
        router = router.layer(Extension(tenant));
    }
    router
}

#[tokio::test]
async fn test_response_carries_tenant_identity() {
    let app = annotated_app(Some(TenantContext {
        id: "42".into(),
        slug: "acme".into(),
    }));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/contracts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(TENANT_ID_HEADER).unwrap(), "42");
    assert_eq!(response.headers().get(TENANT_SLUG_HEADER).unwrap(), "acme");

    // Body untouched by the annotation.
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"contract list");
}

#[tokio::test]
async fn test_unresolved_tenant_leaves_response_untouched() {
    let app = annotated_app(None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/contracts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(TENANT_ID_HEADER).is_none());
    assert!(response.headers().get(TENANT_SLUG_HEADER).is_none());

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"contract list");
}
