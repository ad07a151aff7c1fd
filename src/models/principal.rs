use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated actor behind a request.
///
/// `status` and the legacy `ativo` flag come verbatim from the identity
/// store; either one can mark the account active. The effective state is
/// derived by `middleware::session_guard::is_active`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Principal {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub status: Option<String>,
    pub ativo: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A bearer credential owned by a principal, revocable independently of
/// the principal record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccessToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
