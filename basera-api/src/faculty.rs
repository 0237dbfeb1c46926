use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use basera_core::listing::{Faculty, FacultyUpdate};
use basera_core::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateFacultyRequest {
    pub listing_id: Uuid,
    pub name: String,
    pub subject: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateFacultyRequest {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FacultyQuery {
    pub listing_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct FacultyListOut {
    pub faculty: Vec<Faculty>,
    pub total: usize,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/faculty", get(list_faculty))
        .route("/v1/faculty/{id}", get(get_faculty))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/faculty", post(create_faculty))
        .route("/v1/faculty/bulk", post(create_bulk_faculty))
        .route(
            "/v1/faculty/{id}",
            put(update_faculty).delete(delete_faculty),
        )
}

/// Faculty mutations require owning the parent listing; admins bypass.
async fn check_listing_ownership(
    state: &AppState,
    listing_id: Uuid,
    user: &User,
) -> Result<(), AppError> {
    let listing = state
        .listings
        .get(listing_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    if listing.owner_id != user.id && !user.role.is_admin() {
        return Err(AppError::Authorization(
            "Not authorized to manage faculty for this listing".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/faculty
async fn list_faculty(
    State(state): State<AppState>,
    Query(query): Query<FacultyQuery>,
) -> Result<Json<FacultyListOut>, AppError> {
    let faculty = state.faculty.list(query.listing_id).await.map_err(AppError::from_repo)?;
    let total = faculty.len();
    Ok(Json(FacultyListOut { faculty, total }))
}

/// GET /v1/faculty/{id}
async fn get_faculty(
    State(state): State<AppState>,
    Path(faculty_id): Path<Uuid>,
) -> Result<Json<Faculty>, AppError> {
    let faculty = state
        .faculty
        .get(faculty_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Faculty not found".to_string()))?;
    Ok(Json(faculty))
}

/// POST /v1/faculty
async fn create_faculty(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateFacultyRequest>,
) -> Result<(StatusCode, Json<Faculty>), AppError> {
    check_listing_ownership(&state, req.listing_id, &user).await?;

    let mut faculty = Faculty::new(req.listing_id, req.name, req.subject);
    faculty.image_url = req.image_url;
    state.faculty.create(&faculty).await.map_err(AppError::from_repo)?;

    Ok((StatusCode::CREATED, Json(faculty)))
}

/// POST /v1/faculty/bulk
async fn create_bulk_faculty(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<Vec<CreateFacultyRequest>>,
) -> Result<(StatusCode, Json<Vec<Faculty>>), AppError> {
    if req.is_empty() {
        return Err(AppError::Validation(
            "Faculty list must not be empty".to_string(),
        ));
    }

    // Every referenced listing must belong to the caller.
    let mut checked = Vec::new();
    for entry in &req {
        if !checked.contains(&entry.listing_id) {
            check_listing_ownership(&state, entry.listing_id, &user).await?;
            checked.push(entry.listing_id);
        }
    }

    let faculty: Vec<Faculty> = req
        .into_iter()
        .map(|entry| {
            let mut member = Faculty::new(entry.listing_id, entry.name, entry.subject);
            member.image_url = entry.image_url;
            member
        })
        .collect();

    state.faculty.create_many(&faculty).await.map_err(AppError::from_repo)?;

    Ok((StatusCode::CREATED, Json(faculty)))
}

/// PUT /v1/faculty/{id}
async fn update_faculty(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(faculty_id): Path<Uuid>,
    Json(req): Json<UpdateFacultyRequest>,
) -> Result<Json<Faculty>, AppError> {
    let faculty = state
        .faculty
        .get(faculty_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Faculty not found".to_string()))?;

    check_listing_ownership(&state, faculty.listing_id, &user).await?;

    let update = FacultyUpdate {
        name: req.name,
        subject: req.subject,
        image_url: req.image_url,
    };
    let updated = state
        .faculty
        .update(faculty_id, &update)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Faculty not found".to_string()))?;
    Ok(Json(updated))
}

/// DELETE /v1/faculty/{id}
async fn delete_faculty(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(faculty_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let faculty = state
        .faculty
        .get(faculty_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Faculty not found".to_string()))?;

    check_listing_ownership(&state, faculty.listing_id, &user).await?;

    state.faculty.delete(faculty_id).await.map_err(AppError::from_repo)?;
    Ok(StatusCode::NO_CONTENT)
}
