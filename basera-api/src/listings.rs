use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use basera_core::listing::{Listing, ListingDetail, ListingOverview, ListingUpdate};
use basera_shared::ListingType;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub name: String,
    pub description: Option<String>,
    pub price_minor: i64,
    pub location: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateListingRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_minor: Option<i64>,
    pub location: Option<String>,
    pub features: Option<Vec<String>>,
    pub image_url: Option<String>,
}

impl From<UpdateListingRequest> for ListingUpdate {
    fn from(req: UpdateListingRequest) -> Self {
        ListingUpdate {
            name: req.name,
            description: req.description,
            price_minor: req.price_minor,
            location: req.location,
            features: req.features,
            image_url: req.image_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub listing_type: Option<ListingType>,
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ListingListOut {
    pub listings: Vec<Listing>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct AdminListingsOut {
    pub listings: Vec<ListingOverview>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct MediaUploadOut {
    pub image_url: String,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/listings", get(list_listings))
        .route("/v1/listings/{id}", get(get_listing))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/listings", post(create_listing))
        .route(
            "/v1/listings/{id}",
            put(update_listing).delete(delete_listing),
        )
        .route("/v1/listings/{id}/media", post(upload_listing_media))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/listings", get(admin_list_listings))
        .route("/listings/{id}/details", get(admin_listing_details))
        .route(
            "/listings/{id}",
            put(admin_update_listing).delete(admin_delete_listing),
        )
}

// ============================================================================
// Public Handlers
// ============================================================================

/// GET /v1/listings
async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListingListOut>, AppError> {
    let listings = state
        .listings
        .list(query.listing_type, query.owner_id)
        .await.map_err(AppError::from_repo)?;
    let total = listings.len();
    Ok(Json(ListingListOut { listings, total }))
}

/// GET /v1/listings/{id}
async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<Listing>, AppError> {
    let listing = state
        .listings
        .get(listing_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
    Ok(Json(listing))
}

// ============================================================================
// Lister Handlers
// ============================================================================

/// POST /v1/listings
/// Approved listers only: the role must be a lister role AND the admin must
/// have approved the account.
async fn create_listing(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<Listing>), AppError> {
    if !user.role.is_lister() {
        return Err(AppError::Authorization(
            "Only users with listing roles can create listings".to_string(),
        ));
    }
    if !user.is_approved_lister {
        return Err(AppError::Authorization(
            "Your account must be approved by admin before creating listings".to_string(),
        ));
    }
    if req.price_minor <= 0 {
        return Err(AppError::Validation(
            "Price must be greater than zero".to_string(),
        ));
    }

    let listing = Listing::new(
        user.id,
        req.listing_type,
        req.name,
        req.description,
        req.price_minor,
        req.location,
        req.features,
    );
    state.listings.create(&listing).await.map_err(AppError::from_repo)?;

    info!("Lister {} created listing {}", user.email, listing.id);

    Ok((StatusCode::CREATED, Json(listing)))
}

/// PUT /v1/listings/{id}
async fn update_listing(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(listing_id): Path<Uuid>,
    Json(req): Json<UpdateListingRequest>,
) -> Result<Json<Listing>, AppError> {
    let listing = state
        .listings
        .get(listing_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    if listing.owner_id != user.id {
        return Err(AppError::Authorization(
            "Not authorized to update this listing".to_string(),
        ));
    }

    let updated = state
        .listings
        .update(listing_id, &ListingUpdate::from(req))
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
    Ok(Json(updated))
}

/// DELETE /v1/listings/{id}
/// Faculty and bookings cascade with the listing.
async fn delete_listing(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(listing_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let listing = state
        .listings
        .get(listing_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    if listing.owner_id != user.id {
        return Err(AppError::Authorization(
            "Not authorized to delete this listing".to_string(),
        ));
    }

    state.listings.delete(listing_id).await.map_err(AppError::from_repo)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/listings/{id}/media
/// Forwards the multipart image to the media provider and stores the URL.
/// The upload is awaited inline; provider failure fails the request.
async fn upload_listing_media(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(listing_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MediaUploadOut>), AppError> {
    let listing = state
        .listings
        .get(listing_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    if listing.owner_id != user.id {
        return Err(AppError::Authorization(
            "Not authorized to upload media for this listing".to_string(),
        ));
    }

    let mut image_url = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
            .to_vec();

        let folder = format!("{}/listings/{}", state.media_folder, listing_id);
        let url = state
            .media
            .upload_image(data, &filename, &folder)
            .await
            .map_err(|e| AppError::Upstream(format!("Image upload failed: {}", e)))?;

        state.listings.set_image(listing_id, &url).await.map_err(AppError::from_repo)?;
        image_url = Some(url);
    }

    let image_url = image_url
        .ok_or_else(|| AppError::Validation("Missing 'file' field in upload".to_string()))?;

    Ok((StatusCode::CREATED, Json(MediaUploadOut { image_url })))
}

// ============================================================================
// Admin Handlers
// ============================================================================

/// GET /v1/admin/listings
async fn admin_list_listings(
    State(state): State<AppState>,
) -> Result<Json<AdminListingsOut>, AppError> {
    let listings = state.listings.admin_overview().await.map_err(AppError::from_repo)?;
    let total = listings.len();
    Ok(Json(AdminListingsOut { listings, total }))
}

/// GET /v1/admin/listings/{id}/details
async fn admin_listing_details(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<ListingDetail>, AppError> {
    let detail = state
        .listings
        .admin_detail(listing_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
    Ok(Json(detail))
}

/// PUT /v1/admin/listings/{id}
async fn admin_update_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
    Json(req): Json<UpdateListingRequest>,
) -> Result<Json<Listing>, AppError> {
    let updated = state
        .listings
        .update(listing_id, &ListingUpdate::from(req))
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
    Ok(Json(updated))
}

/// DELETE /v1/admin/listings/{id}
async fn admin_delete_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state.listings.delete(listing_id).await.map_err(AppError::from_repo)?;
    if !deleted {
        return Err(AppError::NotFound("Listing not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
