//! Axum route handlers for the Proposals API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::evaluation::evaluator::Evaluator;
use crate::evaluation::models::{EvaluationResult, ProposalForScoring, RequestForScoring};
use crate::llm_client::ConfigurationError;
use crate::models::proposal::{ProposalRow, ProposalSummary};
use crate::models::rfp::RfpRow;
use crate::models::user::{UserRow, UserType};
use crate::proposals::{STATUS_EVALUATED, UNKNOWN_COMPANY};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SubmitProposalResponse {
    pub message: String,
    pub proposal_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct EvaluateProposalResponse {
    pub message: String,
    pub evaluation: EvaluationResult,
}

/// Fields collected from the multipart submission form.
#[derive(Debug, Default)]
struct SubmissionForm {
    rfp_id: Option<String>,
    technical_document: Option<String>,
    commercial_document: Option<String>,
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {e}"))
}

/// Reads the submission form. Empty file parts count as absent.
async fn read_submission(mut multipart: Multipart) -> Result<SubmissionForm, AppError> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "rfp_id" => form.rfp_id = Some(field.text().await.map_err(multipart_error)?),
            "technical_file" | "commercial_file" => {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.is_empty() {
                    continue;
                }
                let encoded = STANDARD.encode(&bytes);
                if name == "technical_file" {
                    form.technical_document = Some(encoded);
                } else {
                    form.commercial_document = Some(encoded);
                }
            }
            other => tracing::debug!("Ignoring unexpected multipart field '{other}'"),
        }
    }

    Ok(form)
}

/// The evaluator, or a configuration error when no LLM credential was supplied.
fn configured_evaluator(state: &AppState) -> Result<&Evaluator, AppError> {
    state
        .evaluator
        .as_ref()
        .ok_or_else(|| ConfigurationError::MissingCredential.into())
}

async fn fetch_proposal(state: &AppState, proposal_id: Uuid) -> Result<ProposalRow, AppError> {
    sqlx::query_as::<_, ProposalRow>("SELECT * FROM proposals WHERE id = $1")
        .bind(proposal_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Proposal not found".to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/proposals (multipart: rfp_id, technical_file?, commercial_file?)
///
/// Only approved vendors may submit. Documents are stored base64-encoded.
pub async fn handle_submit_proposal(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<Json<SubmitProposalResponse>, AppError> {
    if auth.user_type != UserType::Vendor {
        return Err(AppError::Forbidden(
            "Only vendors can submit proposals".to_string(),
        ));
    }

    let vendor: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(auth.user_id)
        .fetch_optional(&state.db)
        .await?;
    let vendor = match vendor {
        Some(v) if v.is_approved => v,
        _ => return Err(AppError::Forbidden("Vendor not approved".to_string())),
    };

    let form = read_submission(multipart).await?;
    let rfp_id = form
        .rfp_id
        .as_deref()
        .ok_or_else(|| AppError::Validation("rfp_id is required".to_string()))?;
    let rfp_id = Uuid::parse_str(rfp_id.trim())
        .map_err(|_| AppError::Validation("rfp_id must be a UUID".to_string()))?;

    let rfp_exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM rfps WHERE id = $1")
        .bind(rfp_id)
        .fetch_optional(&state.db)
        .await?;
    if rfp_exists.is_none() {
        return Err(AppError::NotFound("RFP not found".to_string()));
    }

    let vendor_company = vendor
        .company_name
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string());

    let proposal_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO proposals
            (id, rfp_id, vendor_id, vendor_company, technical_document, commercial_document, status)
        VALUES ($1, $2, $3, $4, $5, $6, 'submitted')
        "#,
    )
    .bind(proposal_id)
    .bind(rfp_id)
    .bind(auth.user_id)
    .bind(&vendor_company)
    .bind(&form.technical_document)
    .bind(&form.commercial_document)
    .execute(&state.db)
    .await?;

    info!(
        "Vendor {} submitted proposal {proposal_id} for RFP {rfp_id} (technical: {}, commercial: {})",
        auth.user_id,
        form.technical_document.is_some(),
        form.commercial_document.is_some()
    );

    Ok(Json(SubmitProposalResponse {
        message: "Proposal submitted successfully".to_string(),
        proposal_id,
    }))
}

/// GET /api/proposals
///
/// Vendors see their own proposals; admins see all. Document bodies are omitted.
pub async fn handle_list_proposals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ProposalSummary>>, AppError> {
    let rows: Vec<ProposalRow> = if auth.is_admin() {
        sqlx::query_as("SELECT * FROM proposals ORDER BY submitted_at DESC")
            .fetch_all(&state.db)
            .await?
    } else {
        sqlx::query_as("SELECT * FROM proposals WHERE vendor_id = $1 ORDER BY submitted_at DESC")
            .bind(auth.user_id)
            .fetch_all(&state.db)
            .await?
    };

    Ok(Json(rows.into_iter().map(ProposalSummary::from).collect()))
}

/// GET /api/proposals/:id
pub async fn handle_get_proposal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(proposal_id): Path<Uuid>,
) -> Result<Json<ProposalRow>, AppError> {
    let proposal = fetch_proposal(&state, proposal_id).await?;

    if !auth.is_admin() && proposal.vendor_id != auth.user_id {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    Ok(Json(proposal))
}

/// POST /api/proposals/:id/evaluate
///
/// Looks up the proposal and its RFP, runs the evaluator, and stores the
/// result on the proposal with status `evaluated`. Unknown ids are 404s even
/// without an LLM credential; past the lookups only a missing credential
/// aborts the request.
pub async fn handle_evaluate_proposal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(proposal_id): Path<Uuid>,
) -> Result<Json<EvaluateProposalResponse>, AppError> {
    auth.require_admin("evaluate proposals")?;

    let proposal = fetch_proposal(&state, proposal_id).await?;
    let rfp = sqlx::query_as::<_, RfpRow>("SELECT * FROM rfps WHERE id = $1")
        .bind(proposal.rfp_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Associated RFP not found".to_string()))?;

    let evaluator = configured_evaluator(&state)?;

    let evaluation = evaluator
        .evaluate(
            &ProposalForScoring::from(&proposal),
            &RequestForScoring::from(&rfp),
        )
        .await;

    let evaluation_json = serde_json::to_value(&evaluation)
        .map_err(|e| anyhow::anyhow!("Failed to serialize evaluation: {e}"))?;

    sqlx::query(
        "UPDATE proposals SET status = $1, ai_score = $2, ai_evaluation = $3 WHERE id = $4",
    )
    .bind(STATUS_EVALUATED)
    .bind(evaluation.overall_score)
    .bind(&evaluation_json)
    .bind(proposal_id)
    .execute(&state.db)
    .await?;

    info!(
        "Stored evaluation for proposal {proposal_id}: overall {} ({})",
        evaluation.overall_score,
        evaluation.recommendation.as_str()
    );

    Ok(Json(EvaluateProposalResponse {
        message: "Proposal evaluated successfully".to_string(),
        evaluation,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tests::test_state;
    use std::time::Duration;

    #[tokio::test]
    async fn test_missing_credential_is_configuration_error() {
        let state = test_state();
        match configured_evaluator(&state) {
            Err(AppError::Configuration(ConfigurationError::MissingCredential)) => {}
            Err(other) => panic!("expected configuration error, got {other:?}"),
            Ok(_) => panic!("expected configuration error, got an evaluator"),
        }
    }

    #[tokio::test]
    async fn test_configured_evaluator_is_returned() {
        let mut state = test_state();
        state.evaluator = Some(
            Evaluator::from_credential(
                Some("test-key".to_string()),
                "http://127.0.0.1:1",
                Duration::from_secs(1),
            )
            .unwrap(),
        );
        assert!(configured_evaluator(&state).is_ok());
    }
}
