//! Awarded contracts: progress, milestones, payments and attached documents,
//! plus the admin invoice view derived from payment status.

pub mod handlers;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::contract::ContractRow;

pub const CONTRACT_STATUSES: [&str; 3] = ["active", "completed", "pending"];
pub const PAYMENT_STATUSES: [&str; 3] = ["unpaid", "partial_paid", "fully_paid"];
pub const MILESTONE_STATUSES: [&str; 3] = ["pending", "in_progress", "completed"];

/// Vendors may only touch their own contracts; admins see all of them.
pub fn ensure_access(auth: &AuthUser, contract: &ContractRow) -> Result<(), AppError> {
    if auth.is_admin() || contract.vendor_id == auth.user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden("Access denied".to_string()))
    }
}

/// Invoice line for the admin payment tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    pub id: String,
    pub contract_id: Uuid,
    pub contract_title: String,
    pub vendor_company: String,
    pub amount: f64,
    /// paid | partial
    pub status: &'static str,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Contracts with any payment made produce an invoice; unpaid ones do not.
pub fn invoice_for(contract: &ContractRow) -> Option<Invoice> {
    let status = match contract.payment_status.as_str() {
        "fully_paid" => "paid",
        "partial_paid" => "partial",
        _ => return None,
    };

    Some(Invoice {
        id: format!("INV-{}", contract.id),
        contract_id: contract.id,
        contract_title: contract.rfp_title.clone(),
        vendor_company: contract.vendor_company.clone(),
        amount: contract.paid_amount,
        status,
        due_date: contract.end_date,
        created_at: contract.created_at,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::contract::Milestone;
    use crate::models::user::UserType;
    use chrono::TimeZone;
    use sqlx::types::Json;

    pub(crate) fn sample_contract(vendor_id: Uuid, payment_status: &str) -> ContractRow {
        let start = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 4, 15, 0, 0, 0).unwrap();
        ContractRow {
            id: Uuid::new_v4(),
            rfp_id: Uuid::new_v4(),
            rfp_title: "Cloud Infrastructure Modernization".to_string(),
            vendor_id,
            vendor_company: "TechCorp Solutions".to_string(),
            contract_value: 750_000.0,
            start_date: start,
            end_date: end,
            status: "active".to_string(),
            progress: 65.0,
            milestones: Json(vec![Milestone {
                name: "Infrastructure Assessment".to_string(),
                status: "completed".to_string(),
                date: "2025-01-30".to_string(),
            }]),
            next_milestone: Some("Cloud Setup & Testing".to_string()),
            payment_status: payment_status.to_string(),
            paid_amount: 487_500.0,
            pending_amount: 262_500.0,
            created_at: start,
            updated_at: start,
        }
    }

    fn user(user_type: UserType) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            user_type,
        }
    }

    #[test]
    fn test_vendor_sees_only_own_contract() {
        let vendor = user(UserType::Vendor);
        let own = sample_contract(vendor.user_id, "unpaid");
        let other = sample_contract(Uuid::new_v4(), "unpaid");

        assert!(ensure_access(&vendor, &own).is_ok());
        match ensure_access(&vendor, &other) {
            Err(AppError::Forbidden(msg)) => assert_eq!(msg, "Access denied"),
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[test]
    fn test_admin_sees_every_contract() {
        let admin = user(UserType::Admin);
        let contract = sample_contract(Uuid::new_v4(), "unpaid");
        assert!(ensure_access(&admin, &contract).is_ok());
    }

    #[test]
    fn test_partial_payment_yields_partial_invoice() {
        let contract = sample_contract(Uuid::new_v4(), "partial_paid");
        let invoice = invoice_for(&contract).unwrap();

        assert_eq!(invoice.id, format!("INV-{}", contract.id));
        assert_eq!(invoice.status, "partial");
        assert_eq!(invoice.amount, 487_500.0);
        assert_eq!(invoice.contract_title, contract.rfp_title);
        assert_eq!(invoice.due_date, contract.end_date);
    }

    #[test]
    fn test_full_payment_yields_paid_invoice() {
        let contract = sample_contract(Uuid::new_v4(), "fully_paid");
        assert_eq!(invoice_for(&contract).unwrap().status, "paid");
    }

    #[test]
    fn test_unpaid_contract_has_no_invoice() {
        let contract = sample_contract(Uuid::new_v4(), "unpaid");
        assert!(invoice_for(&contract).is_none());
    }

    #[test]
    fn test_contract_view_flattens_row_and_lists_documents() {
        use crate::models::contract::ContractView;

        let contract = sample_contract(Uuid::new_v4(), "unpaid");
        let value = serde_json::to_value(ContractView {
            contract: contract.clone(),
            documents: vec![],
        })
        .unwrap();

        assert_eq!(value["id"], contract.id.to_string());
        assert_eq!(value["milestones"][0]["name"], "Infrastructure Assessment");
        assert_eq!(value["documents"], serde_json::json!([]));
    }
}
