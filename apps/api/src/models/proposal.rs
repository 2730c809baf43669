use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProposalRow {
    pub id: Uuid,
    pub rfp_id: Uuid,
    pub vendor_id: Uuid,
    pub vendor_company: String,
    /// base64-encoded upload
    pub technical_document: Option<String>,
    /// base64-encoded upload
    pub commercial_document: Option<String>,
    pub submitted_at: DateTime<Utc>,
    /// submitted | under_review | evaluated | awarded | rejected
    pub status: String,
    pub ai_score: Option<f64>,
    pub ai_evaluation: Option<Value>,
}

/// Proposal without document bodies, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalSummary {
    pub id: Uuid,
    pub rfp_id: Uuid,
    pub vendor_id: Uuid,
    pub vendor_company: String,
    pub has_technical_document: bool,
    pub has_commercial_document: bool,
    pub submitted_at: DateTime<Utc>,
    pub status: String,
    pub ai_score: Option<f64>,
    pub ai_evaluation: Option<Value>,
}

impl From<ProposalRow> for ProposalSummary {
    fn from(row: ProposalRow) -> Self {
        Self {
            has_technical_document: row.technical_document.is_some(),
            has_commercial_document: row.commercial_document.is_some(),
            id: row.id,
            rfp_id: row.rfp_id,
            vendor_id: row.vendor_id,
            vendor_company: row.vendor_company,
            submitted_at: row.submitted_at,
            status: row.status,
            ai_score: row.ai_score,
            ai_evaluation: row.ai_evaluation,
        }
    }
}
