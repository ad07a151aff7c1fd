use std::sync::RwLock;

use sqlx::PgPool;
use uuid::Uuid;

/// Tenant option key holding the tenant's configured frontend origin.
pub const FRONTEND_URL_OPTION: &str = "default_frontend_url";

/// Append `candidate` to `origins` unless it is already present or empty.
/// Returns true when the list changed.
pub fn add_if_missing(origins: &mut Vec<String>, candidate: &str) -> bool {
    if candidate.is_empty() || origins.iter().any(|o| o == candidate) {
        return false;
    }
    origins.push(candidate.to_string());
    true
}

/// Process-wide CORS allow-list.
///
/// Seeded from static configuration; each tenant adds its configured
/// frontend origin when its first request arrives. The list is append-only
/// for the lifetime of the process: entries are never removed. The lock
/// covers the whole read-modify-write so two tenants initializing
/// concurrently cannot lose each other's entry.
pub struct OriginRegistry {
    inner: RwLock<Vec<String>>,
}

impl OriginRegistry {
    pub fn new(seed: Vec<String>) -> Self {
        let mut origins = Vec::new();
        for origin in &seed {
            add_if_missing(&mut origins, origin.trim());
        }
        Self {
            inner: RwLock::new(origins),
        }
    }

    /// Is `origin` allowed? Consulted by the CORS layer per request.
    pub fn contains(&self, origin: &str) -> bool {
        self.inner
            .read()
            .map(|origins| origins.iter().any(|o| o == origin))
            .unwrap_or(false)
    }

    /// Current allow-list, in insertion order.
    pub fn snapshot(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|origins| origins.clone())
            .unwrap_or_default()
    }

    /// Add one origin. Returns true when it was not already present.
    pub fn insert(&self, origin: &str) -> bool {
        match self.inner.write() {
            Ok(mut origins) => add_if_missing(&mut origins, origin),
            Err(_) => false,
        }
    }

    /// Make sure the tenant's configured frontend origin is allowed.
    ///
    /// Reads the `default_frontend_url` tenant option; absent or empty
    /// values are a no-op, and re-running for the same tenant never
    /// duplicates an entry. A missing options table (first-boot
    /// provisioning, migrations not applied yet) is ignored; every other
    /// database error propagates.
    pub async fn ensure_tenant_origin(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        let url = match tenant_option(pool, tenant_id, FRONTEND_URL_OPTION).await {
            Ok(value) => value,
            Err(e) if is_missing_table(&e) => {
                tracing::debug!(
                    %tenant_id,
                    "tenant options table not provisioned yet, skipping origin registration"
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if let Some(url) = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            if self.insert(&url) {
                tracing::info!(%tenant_id, origin = %url, "registered tenant frontend origin");
            }
        }
        Ok(())
    }
}

async fn tenant_option(
    pool: &PgPool,
    tenant_id: Uuid,
    key: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT value FROM tenant_options WHERE tenant_id = $1 AND key = $2",
    )
    .bind(tenant_id)
    .bind(key)
    .fetch_optional(pool)
    .await
}

/// True for the error a fresh database raises before the options table
/// exists: Postgres undefined_table (42P01) or an equivalent message.
fn is_missing_table(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if db.code().as_deref() == Some("42P01") {
            return true;
        }
    }
    is_missing_table_message(&err.to_string())
}

fn is_missing_table_message(msg: &str) -> bool {
    let msg = msg.to_ascii_lowercase();
    msg.contains("no such table") || (msg.contains("relation") && msg.contains("does not exist"))
}
