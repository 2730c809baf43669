//! Vendor management for admins: listing and approval toggles.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct VendorView {
    pub id: Uuid,
    pub email: String,
    pub company_name: String,
    pub username: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub cr_number: String,
    pub country: String,
}

impl From<UserRow> for VendorView {
    fn from(user: UserRow) -> Self {
        Self {
            cr_number: user.profile_field("cr_number"),
            country: user.profile_field("country"),
            id: user.id,
            email: user.email,
            company_name: user.company_name.unwrap_or_default(),
            username: user.username.unwrap_or_default(),
            is_approved: user.is_approved,
            created_at: user.created_at,
        }
    }
}

/// GET /api/admin/vendors
pub async fn handle_list_vendors(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<VendorView>>, AppError> {
    auth.require_admin("access vendor management")?;

    let vendors: Vec<UserRow> =
        sqlx::query_as("SELECT * FROM users WHERE user_type = 'vendor' ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(vendors.into_iter().map(VendorView::from).collect()))
}

/// PUT /api/admin/vendors/:id/approve
pub async fn handle_approve_vendor(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(vendor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    auth.require_admin("approve vendors")?;
    set_vendor_approval(&state, vendor_id, true).await?;
    Ok(Json(json!({ "message": "Vendor approved successfully" })))
}

/// PUT /api/admin/vendors/:id/reject
pub async fn handle_reject_vendor(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(vendor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    auth.require_admin("reject vendors")?;
    set_vendor_approval(&state, vendor_id, false).await?;
    Ok(Json(json!({ "message": "Vendor rejected successfully" })))
}

async fn set_vendor_approval(state: &AppState, vendor_id: Uuid, approved: bool) -> Result<(), AppError> {
    let result =
        sqlx::query("UPDATE users SET is_approved = $1 WHERE id = $2 AND user_type = 'vendor'")
            .bind(approved)
            .bind(vendor_id)
            .execute(&state.db)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Vendor not found".to_string()));
    }

    info!("Vendor {vendor_id} approval set to {approved}");
    Ok(())
}
