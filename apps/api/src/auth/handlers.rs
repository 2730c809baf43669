//! Axum route handlers for signup, login and the current-user lookup.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::auth::{create_token, hash_password, verify_password, AuthError, AuthUser};
use crate::errors::AppError;
use crate::models::user::{UserRow, UserType};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub user_type: String,
    pub company_name: Option<String>,
    pub username: Option<String>,
    pub cr_number: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The user fields exposed to clients.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub user_type: String,
    pub is_approved: bool,
    pub company_name: Option<String>,
}

impl From<UserRow> for UserSummary {
    fn from(user: UserRow) -> Self {
        Self {
            id: user.id,
            email: user.email,
            user_type: user.user_type,
            is_approved: user.is_approved,
            company_name: user.company_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub token: String,
    pub user: UserSummary,
}

const EMAIL_TAKEN: &str = "Email already registered";

/// Maps a `users.email` unique violation from a concurrent signup to the
/// duplicate-email error.
fn email_taken_on_conflict(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Validation(EMAIL_TAKEN.to_string())
        }
        other => AppError::Database(other),
    }
}

/// POST /api/auth/signup
///
/// Admins are approved on signup; vendors wait for an admin.
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "email and password are required".to_string(),
        ));
    }
    let user_type = UserType::parse(&req.user_type).ok_or_else(|| {
        AppError::Validation("user_type must be 'vendor' or 'admin'".to_string())
    })?;

    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    if exists.is_some() {
        return Err(AppError::Validation(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(req.password).await?;
    let profile_data = json!({
        "cr_number": req.cr_number,
        "country": req.country,
    });

    let user: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users
            (id, email, user_type, company_name, username, password_hash, is_approved, profile_data)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(user_type.as_str())
    .bind(&req.company_name)
    .bind(&req.username)
    .bind(&password_hash)
    .bind(user_type == UserType::Admin)
    .bind(&profile_data)
    .fetch_one(&state.db)
    .await
    .map_err(email_taken_on_conflict)?;

    info!("Registered {} user {}", user.user_type, user.id);

    let token = create_token(user.id, user_type, &state.config.jwt_secret)?;
    Ok(Json(AuthResponse {
        message: Some("User created successfully".to_string()),
        token,
        user: user.into(),
    }))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(req.password, user.password_hash.clone()).await? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let user_type = UserType::parse(&user.user_type).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "User {} has unknown user_type '{}'",
            user.id,
            user.user_type
        ))
    })?;

    let token = create_token(user.id, user_type, &state.config.jwt_secret)?;
    Ok(Json(AuthResponse {
        message: None,
        token,
        user: user.into(),
    }))
}

/// GET /api/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserSummary>, AppError> {
    let user: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(auth.user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
