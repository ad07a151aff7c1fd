use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

use super::TenantContext;

pub const TENANT_ID_HEADER: &str = "x-tenant-id";
pub const TENANT_SLUG_HEADER: &str = "x-tenant-slug";

/// Middleware: annotate every outgoing response with the resolved tenant
/// identity, for operators correlating responses with tenants.
///
/// Requests without a tenant context pass through untouched; a value that
/// does not encode as a header is skipped. Status, body, and all other
/// headers are left as the handler produced them; annotation never fails
/// a request.
pub async fn tenant_identity_headers(req: Request, next: Next) -> Response {
    let tenant = req.extensions().get::<TenantContext>().cloned();
    let mut resp = next.run(req).await;

    if let Some(tenant) = tenant {
        if !tenant.id.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&tenant.id) {
                resp.headers_mut().insert(TENANT_ID_HEADER, value);
            }
        }
        if !tenant.slug.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&tenant.slug) {
                resp.headers_mut().insert(TENANT_SLUG_HEADER, value);
            }
        }
    }

    resp
}
