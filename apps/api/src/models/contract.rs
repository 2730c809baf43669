use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    /// pending | in_progress | completed
    pub status: String,
    /// Target date as entered, e.g. `2025-03-01`.
    pub date: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContractRow {
    pub id: Uuid,
    pub rfp_id: Uuid,
    pub rfp_title: String,
    pub vendor_id: Uuid,
    pub vendor_company: String,
    pub contract_value: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// active | completed | pending
    pub status: String,
    pub progress: f64,
    pub milestones: Json<Vec<Milestone>>,
    pub next_milestone: Option<String>,
    /// unpaid | partial_paid | fully_paid
    pub payment_status: String,
    pub paid_amount: f64,
    pub pending_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Document metadata, as listed on a contract.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContractDocumentMeta {
    pub id: Uuid,
    #[serde(skip)]
    pub contract_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub size: String,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Uuid,
}

/// A full document row including its base64 content.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContractDocumentRow {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub size: String,
    pub content: String,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Uuid,
}

/// A contract with its document list attached.
#[derive(Debug, Clone, Serialize)]
pub struct ContractView {
    #[serde(flatten)]
    pub contract: ContractRow,
    pub documents: Vec<ContractDocumentMeta>,
}
