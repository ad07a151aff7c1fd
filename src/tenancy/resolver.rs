use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::HOST;
use axum::middleware::Next;
use axum::response::Response;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::tenant::Tenant;
use crate::tenancy::origins::OriginRegistry;

/// Tenant identity for the current request, inserted as a request
/// extension by [`tenant_context`]. Requests from unknown domains simply
/// carry no context.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub id: String,
    pub slug: String,
}

/// State shared by the tenant middleware.
#[derive(Clone)]
pub struct TenancyState {
    pub pool: PgPool,
    pub origins: Arc<OriginRegistry>,
}

/// Lowercase a Host header value and strip any port suffix.
pub fn normalize_host(raw: &str) -> String {
    let host = raw.trim();
    // IPv6 literals keep their brackets; the port comes after the closing one.
    let end = if host.starts_with('[') {
        host.find(']').map(|i| i + 1).unwrap_or(host.len())
    } else {
        host.find(':').unwrap_or(host.len())
    };
    host[..end].to_ascii_lowercase()
}

/// Look up the tenant owning `domain`.
pub async fn find_by_domain(pool: &PgPool, domain: &str) -> Result<Option<Tenant>, sqlx::Error> {
    sqlx::query_as::<_, Tenant>(
        "SELECT t.id, t.slug, t.name, t.created_at FROM tenants t \
         JOIN tenant_domains d ON d.tenant_id = t.id WHERE d.domain = $1",
    )
    .bind(domain)
    .fetch_optional(pool)
    .await
}

/// Middleware: resolve the tenant from the request's Host header.
///
/// A failed or empty lookup means the request continues without a tenant;
/// resolution never rejects a request on its own. On a hit, the tenant's
/// configured frontend origin is registered with the CORS allow-list and a
/// [`TenantContext`] is attached for downstream consumers. Only origin
/// registration can fail the request, and only for database errors other
/// than the not-yet-provisioned options table.
pub async fn tenant_context(
    State(state): State<TenancyState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let host = req
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(normalize_host)
        .filter(|h| !h.is_empty());

    if let Some(host) = host {
        match find_by_domain(&state.pool, &host).await {
            Ok(Some(tenant)) => {
                state
                    .origins
                    .ensure_tenant_origin(&state.pool, tenant.id)
                    .await?;
                tracing::debug!(tenant = %tenant.slug, %host, "tenant resolved");
                req.extensions_mut().insert(TenantContext {
                    id: tenant.id.to_string(),
                    slug: tenant.slug,
                });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(%host, error = %e, "tenant resolution failed, continuing without tenant");
            }
        }
    }

    Ok(next.run(req).await)
}
