use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::rfp::RfpRow;
use crate::rfps::{approval_level, RFP_STATUSES};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRfpRequest {
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub scope_of_work: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

/// POST /api/rfps
pub async fn handle_create_rfp(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateRfpRequest>,
) -> Result<Json<RfpRow>, AppError> {
    auth.require_admin("create RFPs")?;

    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if !req.budget.is_finite() || req.budget < 0.0 {
        return Err(AppError::Validation(
            "budget must be a non-negative number".to_string(),
        ));
    }

    let rfp: RfpRow = sqlx::query_as(
        r#"
        INSERT INTO rfps
            (id, title, description, budget, deadline, categories, scope_of_work,
             created_by, status, approval_level)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active', $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.budget)
    .bind(req.deadline)
    .bind(&req.categories)
    .bind(&req.scope_of_work)
    .bind(auth.user_id)
    .bind(approval_level(req.budget))
    .fetch_one(&state.db)
    .await?;

    info!(
        "Created RFP {} (budget {}, approval level {})",
        rfp.id, rfp.budget, rfp.approval_level
    );
    Ok(Json(rfp))
}

/// GET /api/rfps
///
/// Vendors see only active RFPs; admins see everything.
pub async fn handle_list_rfps(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<RfpRow>>, AppError> {
    let rfps: Vec<RfpRow> = if auth.is_admin() {
        sqlx::query_as("SELECT * FROM rfps ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?
    } else {
        sqlx::query_as("SELECT * FROM rfps WHERE status = 'active' ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?
    };
    Ok(Json(rfps))
}

/// GET /api/rfps/:id
pub async fn handle_get_rfp(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(rfp_id): Path<Uuid>,
) -> Result<Json<RfpRow>, AppError> {
    let rfp = sqlx::query_as::<_, RfpRow>("SELECT * FROM rfps WHERE id = $1")
        .bind(rfp_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("RFP not found".to_string()))?;
    Ok(Json(rfp))
}

/// PUT /api/rfps/:id/status?status=...
pub async fn handle_update_rfp_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(rfp_id): Path<Uuid>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Value>, AppError> {
    auth.require_admin("update RFP status")?;

    if !RFP_STATUSES.contains(&query.status.as_str()) {
        return Err(AppError::Validation(format!(
            "Invalid status. Must be one of: {}",
            RFP_STATUSES.join(", ")
        )));
    }

    let result = sqlx::query("UPDATE rfps SET status = $1 WHERE id = $2")
        .bind(&query.status)
        .bind(rfp_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("RFP not found".to_string()));
    }

    info!("RFP {rfp_id} status set to {}", query.status);
    Ok(Json(json!({
        "message": format!("RFP status updated to {}", query.status)
    })))
}
