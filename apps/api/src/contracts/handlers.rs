//! Axum route handlers for contracts, contract documents and invoices.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::contracts::{
    ensure_access, invoice_for, Invoice, CONTRACT_STATUSES, MILESTONE_STATUSES, PAYMENT_STATUSES,
};
use crate::errors::AppError;
use crate::models::contract::{
    ContractDocumentMeta, ContractDocumentRow, ContractRow, ContractView, Milestone,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(deserialize_with = "size_label")]
    pub size: String,
    /// base64-encoded body; metadata-only documents leave it empty
    #[serde(default)]
    pub content: String,
}

impl NewDocument {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("document name cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateContractRequest {
    pub rfp_id: Uuid,
    pub vendor_id: Uuid,
    /// Defaults to the RFP's title.
    pub rfp_title: Option<String>,
    /// Defaults to the vendor's company name.
    pub vendor_company: Option<String>,
    pub contract_value: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub documents: Vec<NewDocument>,
}

impl CreateContractRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_amount("contract_value", self.contract_value)?;
        check_period(self.start_date, self.end_date)?;
        check_milestones(&self.milestones)?;
        self.documents.iter().try_for_each(NewDocument::validate)
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateContractRequest {
    pub status: Option<String>,
    pub progress: Option<f64>,
    pub milestones: Option<Vec<Milestone>>,
    pub next_milestone: Option<String>,
    pub payment_status: Option<String>,
    pub paid_amount: Option<f64>,
    pub pending_amount: Option<f64>,
    pub contract_value: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl UpdateContractRequest {
    /// Field-level checks that need no stored state.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(status) = &self.status {
            check_one_of("status", status, &CONTRACT_STATUSES)?;
        }
        if let Some(payment_status) = &self.payment_status {
            check_one_of("payment_status", payment_status, &PAYMENT_STATUSES)?;
        }
        if let Some(progress) = self.progress {
            if !progress.is_finite() || !(0.0..=100.0).contains(&progress) {
                return Err(AppError::Validation(
                    "progress must be between 0 and 100".to_string(),
                ));
            }
        }
        for (name, amount) in [
            ("paid_amount", self.paid_amount),
            ("pending_amount", self.pending_amount),
            ("contract_value", self.contract_value),
        ] {
            if let Some(amount) = amount {
                check_amount(name, amount)?;
            }
        }
        if let Some(milestones) = &self.milestones {
            check_milestones(milestones)?;
        }
        Ok(())
    }

    /// Merges the update into `contract` and checks the combined result.
    ///
    /// When the paid amount changes without an explicit pending amount, the
    /// pending amount becomes whatever remains of the contract value.
    pub fn apply_to(self, contract: &mut ContractRow) -> Result<(), AppError> {
        self.validate()?;

        if let Some(status) = self.status {
            contract.status = status;
        }
        if let Some(progress) = self.progress {
            contract.progress = progress;
        }
        if let Some(milestones) = self.milestones {
            contract.milestones.0 = milestones;
        }
        if let Some(next_milestone) = self.next_milestone {
            contract.next_milestone = Some(next_milestone);
        }
        if let Some(payment_status) = self.payment_status {
            contract.payment_status = payment_status;
        }
        if let Some(value) = self.contract_value {
            contract.contract_value = value;
        }
        if let Some(start) = self.start_date {
            contract.start_date = start;
        }
        if let Some(end) = self.end_date {
            contract.end_date = end;
        }
        match (self.paid_amount, self.pending_amount) {
            (Some(paid), None) => {
                contract.paid_amount = paid;
                contract.pending_amount = (contract.contract_value - paid).max(0.0);
            }
            (paid, pending) => {
                if let Some(paid) = paid {
                    contract.paid_amount = paid;
                }
                if let Some(pending) = pending {
                    contract.pending_amount = pending;
                }
            }
        }

        check_period(contract.start_date, contract.end_date)?;
        if contract.paid_amount > contract.contract_value {
            return Err(AppError::Validation(
                "paid_amount cannot exceed contract_value".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), AppError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Invalid {field}. Must be one of: {}",
            allowed.join(", ")
        )))
    }
}

fn check_amount(field: &str, amount: f64) -> Result<(), AppError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{field} must be a non-negative number"
        )))
    }
}

fn check_period(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::Validation(
            "end_date cannot be before start_date".to_string(),
        ));
    }
    Ok(())
}

fn check_milestones(milestones: &[Milestone]) -> Result<(), AppError> {
    for milestone in milestones {
        if milestone.name.trim().is_empty() {
            return Err(AppError::Validation("milestone name cannot be empty".to_string()));
        }
        check_one_of("milestone status", &milestone.status, &MILESTONE_STATUSES)?;
    }
    Ok(())
}

/// Accepts `"2.4 MB"` or a raw byte count.
fn size_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "document size must be a string or number, got {other}"
        ))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lookups
// ────────────────────────────────────────────────────────────────────────────

const DOCUMENT_META_COLUMNS: &str =
    "id, contract_id, name, doc_type, size, uploaded_at, uploaded_by";

async fn fetch_contract(state: &AppState, contract_id: Uuid) -> Result<ContractRow, AppError> {
    sqlx::query_as::<_, ContractRow>("SELECT * FROM contracts WHERE id = $1")
        .bind(contract_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract not found".to_string()))
}

/// Attaches document metadata to each contract, preserving contract order.
async fn with_documents(
    state: &AppState,
    contracts: Vec<ContractRow>,
) -> Result<Vec<ContractView>, AppError> {
    let ids: Vec<Uuid> = contracts.iter().map(|c| c.id).collect();
    let documents: Vec<ContractDocumentMeta> = sqlx::query_as(&format!(
        "SELECT {DOCUMENT_META_COLUMNS} FROM contract_documents \
         WHERE contract_id = ANY($1) ORDER BY uploaded_at"
    ))
    .bind(&ids)
    .fetch_all(&state.db)
    .await?;

    let mut by_contract: HashMap<Uuid, Vec<ContractDocumentMeta>> = HashMap::new();
    for document in documents {
        by_contract.entry(document.contract_id).or_default().push(document);
    }

    Ok(contracts
        .into_iter()
        .map(|contract| ContractView {
            documents: by_contract.remove(&contract.id).unwrap_or_default(),
            contract,
        })
        .collect())
}

async fn insert_document<'e, E>(
    executor: E,
    contract_id: Uuid,
    uploaded_by: Uuid,
    document: &NewDocument,
) -> Result<Uuid, AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    let document_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO contract_documents
            (id, contract_id, name, doc_type, size, content, uploaded_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(document_id)
    .bind(contract_id)
    .bind(&document.name)
    .bind(&document.doc_type)
    .bind(&document.size)
    .bind(&document.content)
    .bind(uploaded_by)
    .execute(executor)
    .await?;
    Ok(document_id)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/contracts
///
/// Vendors see their own contracts; admins see all.
pub async fn handle_list_contracts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let contracts: Vec<ContractRow> = if auth.is_admin() {
        sqlx::query_as("SELECT * FROM contracts ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?
    } else {
        sqlx::query_as("SELECT * FROM contracts WHERE vendor_id = $1 ORDER BY created_at DESC")
            .bind(auth.user_id)
            .fetch_all(&state.db)
            .await?
    };

    let contracts = with_documents(&state, contracts).await?;
    Ok(Json(json!({ "contracts": contracts })))
}

/// GET /api/contracts/:id
pub async fn handle_get_contract(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(contract_id): Path<Uuid>,
) -> Result<Json<ContractView>, AppError> {
    let contract = fetch_contract(&state, contract_id).await?;
    ensure_access(&auth, &contract)?;

    let mut views = with_documents(&state, vec![contract]).await?;
    views
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Contract not found".to_string()))
}

/// POST /api/contracts
///
/// Starts a contract as `active` and `unpaid`, with the whole value pending.
pub async fn handle_create_contract(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateContractRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_admin("create contracts")?;
    req.validate()?;

    let rfp_title: String = sqlx::query_scalar("SELECT title FROM rfps WHERE id = $1")
        .bind(req.rfp_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("RFP not found".to_string()))?;
    let company: Option<Option<String>> = sqlx::query_scalar(
        "SELECT company_name FROM users WHERE id = $1 AND user_type = 'vendor'",
    )
    .bind(req.vendor_id)
    .fetch_optional(&state.db)
    .await?;
    let company = company.ok_or_else(|| AppError::NotFound("Vendor not found".to_string()))?;

    let rfp_title = req.rfp_title.filter(|t| !t.trim().is_empty()).unwrap_or(rfp_title);
    let vendor_company = req
        .vendor_company
        .or(company)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| crate::proposals::UNKNOWN_COMPANY.to_string());

    let contract_id = Uuid::new_v4();
    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO contracts
            (id, rfp_id, rfp_title, vendor_id, vendor_company, contract_value,
             start_date, end_date, milestones, pending_amount)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $6)
        "#,
    )
    .bind(contract_id)
    .bind(req.rfp_id)
    .bind(&rfp_title)
    .bind(req.vendor_id)
    .bind(&vendor_company)
    .bind(req.contract_value)
    .bind(req.start_date)
    .bind(req.end_date)
    .bind(sqlx::types::Json(&req.milestones))
    .execute(&mut *tx)
    .await?;

    for document in &req.documents {
        insert_document(&mut *tx, contract_id, auth.user_id, document).await?;
    }

    tx.commit().await?;

    info!(
        "Created contract {contract_id} for vendor {} on RFP {} (value {}, {} documents)",
        req.vendor_id,
        req.rfp_id,
        req.contract_value,
        req.documents.len()
    );

    Ok(Json(json!({
        "message": "Contract created successfully",
        "contract_id": contract_id,
    })))
}

/// PUT /api/contracts/:id
pub async fn handle_update_contract(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(contract_id): Path<Uuid>,
    Json(req): Json<UpdateContractRequest>,
) -> Result<Json<Value>, AppError> {
    auth.require_admin("update contracts")?;
    req.validate()?;

    let mut contract = fetch_contract(&state, contract_id).await?;
    req.apply_to(&mut contract)?;

    sqlx::query(
        r#"
        UPDATE contracts SET
            status = $2, progress = $3, milestones = $4, next_milestone = $5,
            payment_status = $6, paid_amount = $7, pending_amount = $8,
            contract_value = $9, start_date = $10, end_date = $11, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(contract_id)
    .bind(&contract.status)
    .bind(contract.progress)
    .bind(&contract.milestones)
    .bind(&contract.next_milestone)
    .bind(&contract.payment_status)
    .bind(contract.paid_amount)
    .bind(contract.pending_amount)
    .bind(contract.contract_value)
    .bind(contract.start_date)
    .bind(contract.end_date)
    .execute(&state.db)
    .await?;

    info!(
        "Updated contract {contract_id}: {} / {} ({}% complete)",
        contract.status, contract.payment_status, contract.progress
    );
    Ok(Json(json!({ "message": "Contract updated successfully" })))
}

/// POST /api/contracts/:id/documents
pub async fn handle_upload_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(contract_id): Path<Uuid>,
    Json(document): Json<NewDocument>,
) -> Result<Json<Value>, AppError> {
    document.validate()?;
    let contract = fetch_contract(&state, contract_id).await?;
    ensure_access(&auth, &contract)?;

    let document_id = insert_document(&state.db, contract_id, auth.user_id, &document).await?;
    info!(
        "User {} uploaded document {document_id} to contract {contract_id}",
        auth.user_id
    );

    Ok(Json(json!({
        "message": "Document uploaded successfully",
        "document_id": document_id,
    })))
}

/// GET /api/contracts/:id/documents/:document_id
pub async fn handle_download_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((contract_id, document_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ContractDocumentRow>, AppError> {
    let contract = fetch_contract(&state, contract_id).await?;
    ensure_access(&auth, &contract)?;

    sqlx::query_as::<_, ContractDocumentRow>(
        "SELECT * FROM contract_documents WHERE id = $1 AND contract_id = $2",
    )
    .bind(document_id)
    .bind(contract_id)
    .fetch_optional(&state.db)
    .await?
    .map(Json)
    .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
}

/// GET /api/admin/invoices
pub async fn handle_list_invoices(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Invoice>>, AppError> {
    auth.require_admin("view all invoices")?;

    let contracts: Vec<ContractRow> = sqlx::query_as(
        "SELECT * FROM contracts WHERE payment_status IN ('partial_paid', 'fully_paid') \
         ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(contracts.iter().filter_map(invoice_for).collect()))
}
