use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use basera_core::user::User;
use basera_shared::UserRole;
use chrono::{Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::issue_token;
use crate::password::{hash_password, verify_password};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub email: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub name: String,
    pub is_approved_lister: bool,
    pub profile_image: Option<String>,
    pub phone_number: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            name: user.display_name(),
            is_approved_lister: user.is_approved_lister,
            profile_image: user.profile_image.clone(),
            phone_number: user.phone_number.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserSummary,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmResetRequest {
    pub email: String,
    pub otp: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/signup", post(signup))
        .route("/v1/auth/verify-email", post(verify_email))
        .route("/v1/auth/signin", post(signin))
        .route("/v1/auth/reset-password", post(reset_password))
        .route("/v1/auth/reset-password/confirm", post(confirm_reset))
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/auth/signup
/// Creates an inactive account and emails a verification code.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let email = req.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::Validation("Malformed email address".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let role = req.role.unwrap_or(UserRole::Student);
    if role.is_admin() {
        return Err(AppError::Validation(
            "Cannot sign up with the admin role".to_string(),
        ));
    }

    if state.users.get_by_email(&email).await.map_err(AppError::from_repo)?.is_some() {
        return Err(AppError::Conflict(
            "This email has already been taken.".to_string(),
        ));
    }

    let user = User::new(email.clone(), hash_password(&req.password)?, role);
    state.users.create(&user).await.map_err(AppError::from_repo)?;

    // Issue the email-verification code
    let otp = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
    let expires_at = Utc::now() + Duration::minutes(state.auth.otp_ttl_minutes);
    state.users.set_otp(user.id, &otp, expires_at).await.map_err(AppError::from_repo)?;

    state
        .mailer
        .send_verification_code(&user.email, &otp)
        .await
        .map_err(|e| AppError::Upstream(format!("Verification email failed: {}", e)))?;

    info!("New signup: {} ({})", user.email, user.role);

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            email: user.email,
            message: "Please check your email for an OTP code to confirm your email address."
                .to_string(),
        }),
    ))
}

/// POST /v1/auth/verify-email
/// Confirms the OTP, activates the account and signs the caller in.
async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    let user = state
        .users
        .get_by_email(&email)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    if user.is_verified_email {
        return Err(AppError::Conflict(
            "This email is already verified.".to_string(),
        ));
    }

    if !user.otp_matches(&req.otp, Utc::now()) {
        return Err(AppError::Validation(
            "Invalid OTP code. Please double-check and try again.".to_string(),
        ));
    }

    let user = state
        .users
        .mark_verified(user.id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
    state.users.update_last_login(user.id).await.map_err(AppError::from_repo)?;

    let token = issue_token(&user, &state.auth)
        .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: UserSummary::from(&user),
    }))
}

/// POST /v1/auth/signin
async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    let user = state.users.get_by_email(&email).await.map_err(AppError::from_repo)?;

    let Some(user) = user.filter(|u| verify_password(&req.password, &u.password_hash)) else {
        return Err(AppError::Authentication(
            "Incorrect email or password.".to_string(),
        ));
    };

    if !user.is_active {
        return Err(AppError::Authorization("Inactive account.".to_string()));
    }
    if !user.is_verified_email {
        return Err(AppError::Authorization(
            "Unverified email address.".to_string(),
        ));
    }

    state.users.update_last_login(user.id).await.map_err(AppError::from_repo)?;

    let token = issue_token(&user, &state.auth)
        .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: UserSummary::from(&user),
    }))
}

/// POST /v1/auth/reset-password
/// Emails a one-time code that authorizes setting a new password.
async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    let user = state
        .users
        .get_by_email(&email)
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(|| {
            AppError::NotFound("No account found with this email address.".to_string())
        })?;

    if !user.is_verified_email {
        return Err(AppError::Validation(
            "Email not verified. Please verify your email first.".to_string(),
        ));
    }

    let otp = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
    let expires_at = Utc::now() + Duration::minutes(state.auth.otp_ttl_minutes);
    state
        .users
        .set_otp(user.id, &otp, expires_at)
        .await
        .map_err(AppError::from_repo)?;

    state
        .mailer
        .send_verification_code(&user.email, &otp)
        .await
        .map_err(|e| AppError::Upstream(format!("Reset email failed: {}", e)))?;

    Ok(Json(MessageResponse {
        message: "Password reset OTP has been sent to your email address.".to_string(),
    }))
}

/// POST /v1/auth/reset-password/confirm
async fn confirm_reset(
    State(state): State<AppState>,
    Json(req): Json<ConfirmResetRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    let user = state
        .users
        .get_by_email(&email)
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    if !user.otp_matches(&req.otp, Utc::now()) {
        return Err(AppError::Validation(
            "Invalid OTP code. Please double-check and try again.".to_string(),
        ));
    }
    if req.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    state
        .users
        .update_password(user.id, &hash_password(&req.password)?)
        .await
        .map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    info!("Password reset completed for {}", user.email);

    Ok(Json(MessageResponse {
        message: "Your password has been reset successfully. Please login with your new password."
            .to_string(),
    }))
}
