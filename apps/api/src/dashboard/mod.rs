use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

/// Dashboard counters. The shape depends on the caller's role.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DashboardStats {
    Vendor {
        total_proposals: i64,
        awarded_contracts: i64,
        active_rfps: i64,
    },
    Admin {
        total_rfps: i64,
        total_proposals: i64,
        pending_vendors: i64,
    },
}

/// GET /api/dashboard/stats
pub async fn handle_dashboard_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = if auth.is_admin() {
        let total_rfps: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rfps")
            .fetch_one(&state.db)
            .await?;
        let total_proposals: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM proposals")
            .fetch_one(&state.db)
            .await?;
        let pending_vendors: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE user_type = 'vendor' AND NOT is_approved",
        )
        .fetch_one(&state.db)
        .await?;

        DashboardStats::Admin {
            total_rfps,
            total_proposals,
            pending_vendors,
        }
    } else {
        let total_proposals: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM proposals WHERE vendor_id = $1")
                .bind(auth.user_id)
                .fetch_one(&state.db)
                .await?;
        let awarded_contracts: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM contracts WHERE vendor_id = $1")
                .bind(auth.user_id)
                .fetch_one(&state.db)
                .await?;
        let active_rfps: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rfps WHERE status = 'active'")
            .fetch_one(&state.db)
            .await?;

        DashboardStats::Vendor {
            total_proposals,
            awarded_contracts,
            active_rfps,
        }
    };

    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_serialize_without_role_tag() {
        let stats = DashboardStats::Admin {
            total_rfps: 3,
            total_proposals: 7,
            pending_vendors: 1,
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"total_rfps": 3, "total_proposals": 7, "pending_vendors": 1})
        );
    }
}
