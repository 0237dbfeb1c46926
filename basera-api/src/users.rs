use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Extension, Json, Router,
};
use basera_core::user::{ProfileUpdate, User};
use basera_shared::UserRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub is_verified_email: bool,
    pub is_approved_lister: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub profile_image: Option<String>,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        UserOut {
            id: user.id,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            is_verified_email: user.is_verified_email,
            is_approved_lister: user.is_approved_lister,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            address: user.address,
            city: user.city,
            state: user.state,
            pincode: user.pincode,
            profile_image: user.profile_image,
            date_joined: user.date_joined,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserListOut {
    pub users: Vec<UserOut>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub is_approved_lister: bool,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: UserRole,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/users/me", get(me).put(update_me))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}/approval", patch(set_approval))
        .route("/users/{id}/role", patch(set_role))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/users/me
async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserOut> {
    Json(UserOut::from(user))
}

/// PUT /v1/users/me
async fn update_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserOut>, AppError> {
    let update = ProfileUpdate {
        first_name: req.first_name,
        last_name: req.last_name,
        phone_number: req.phone_number,
        address: req.address,
        city: req.city,
        state: req.state,
        pincode: req.pincode,
        profile_image: req.profile_image,
    };

    let updated = state
        .users
        .update_profile(user.id, &update)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserOut::from(updated)))
}

/// GET /v1/admin/users
async fn list_users(State(state): State<AppState>) -> Result<Json<UserListOut>, AppError> {
    let users: Vec<UserOut> = state
        .users
        .list()
        .await.map_err(AppError::from_repo)?
        .into_iter()
        .map(UserOut::from)
        .collect();
    let total = users.len();
    Ok(Json(UserListOut { users, total }))
}

/// PATCH /v1/admin/users/{id}/approval
/// Grants or revokes the lister approval flag.
async fn set_approval(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ApprovalRequest>,
) -> Result<Json<UserOut>, AppError> {
    let target = state
        .users
        .get(user_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if req.is_approved_lister && !target.role.is_lister() {
        return Err(AppError::Validation(
            "Only lister accounts can be approved".to_string(),
        ));
    }

    let updated = state
        .users
        .set_lister_approval(user_id, req.is_approved_lister)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    info!(
        "Admin {} set lister approval of {} to {}",
        admin.email, updated.email, req.is_approved_lister
    );

    Ok(Json(UserOut::from(updated)))
}

/// PATCH /v1/admin/users/{id}/role
async fn set_role(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<RoleRequest>,
) -> Result<Json<UserOut>, AppError> {
    let updated = state
        .users
        .set_role(user_id, req.role)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    info!(
        "Admin {} changed role of {} to {}",
        admin.email, updated.email, req.role
    );

    Ok(Json(UserOut::from(updated)))
}
