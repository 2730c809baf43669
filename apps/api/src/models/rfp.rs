use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RfpRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub deadline: DateTime<Utc>,
    pub categories: Vec<String>,
    pub scope_of_work: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    /// draft | active | closed | awarded
    pub status: String,
    /// procurement_officer | manager | cfo | ceo
    pub approval_level: String,
}
