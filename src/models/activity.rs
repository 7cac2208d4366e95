use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Category assigned to a logged request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    Auth,
    Search,
    Transaction,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Auth => "AUTH",
            ActivityType::Search => "SEARCH",
            ActivityType::Transaction => "TRANSACTION",
        }
    }
}

/// A not-yet-persisted activity record.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Uuid,
    pub kind: ActivityType,
    pub endpoint: String,
    /// Serialized JSON of the sanitized query/body.
    pub params: String,
    pub description: String,
}

/// Persisted activity record. Immutable once written.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub endpoint: String,
    pub params: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Response shape for `GET /transactions`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub endpoint: String,
    pub params: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityRow> for ActivityResponse {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            kind: row.kind,
            endpoint: row.endpoint,
            params: row.params,
            description: row.description,
            created_at: row.created_at,
        }
    }
}
