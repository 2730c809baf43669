use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Role carried in the JWT and stored as `users.user_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Vendor,
    Admin,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Vendor => "vendor",
            UserType::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "vendor" => Some(UserType::Vendor),
            "admin" => Some(UserType::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub user_type: String,
    pub company_name: Option<String>,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_approved: bool,
    pub profile_data: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Reads a string field out of `profile_data` (`cr_number`, `country`).
    pub fn profile_field(&self, key: &str) -> String {
        self.profile_data
            .as_ref()
            .and_then(|p| p.get(key))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}
