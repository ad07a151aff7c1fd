use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::middleware::session_guard::CredentialRevoker;
use crate::models::tenant::Tenant;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // -- Tenant Operations --

    pub async fn list_tenants(&self) -> anyhow::Result<Vec<Tenant>> {
        let rows = sqlx::query_as::<_, Tenant>(
            "SELECT id, slug, name, created_at FROM tenants ORDER BY slug ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // -- Credential Operations --

    pub async fn delete_access_token(&self, token_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE id = $1")
            .bind(token_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_principal_tokens(&self, principal_id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE user_id = $1")
            .bind(principal_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CredentialRevoker for PgStore {
    async fn revoke_token(&self, token_id: Uuid) -> anyhow::Result<bool> {
        self.delete_access_token(token_id).await
    }

    async fn revoke_all(&self, principal_id: Uuid) -> anyhow::Result<u64> {
        self.delete_principal_tokens(principal_id).await
    }
}
