use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use basera_core::booking::{
    review_payment, validate_lister_status, Booking, BookingWithContext,
};
use basera_core::repository::BookingFilter;
use basera_core::settings::{AdminSettings, SettingsUpdate, SETTINGS_ROW_ID};
use basera_shared::{BookingStatus, PaymentStatus};
use chrono::Utc;
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
pub struct CreateBookingRequest {
    pub listing_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub payment_reference: Option<String>,
    pub payment_screenshot: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct PaymentProofRequest {
    pub payment_reference: String,
    pub payment_screenshot: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: BookingStatus,
}

/// The booking user may cancel and/or refresh proof fields; amount and
/// quantity are immutable after creation.
#[derive(Debug, Deserialize, Default)]
pub struct BookingUpdateRequest {
    pub status: Option<BookingStatus>,
    pub payment_reference: Option<String>,
    pub payment_screenshot: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentVerificationRequest {
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub listing_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BookingListOut {
    pub bookings: Vec<BookingWithContext>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct PaymentInfoOut {
    pub payment_qr_code: Option<String>,
    pub payment_upi_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SettingsUpdateRequest {
    pub payment_qr_code: Option<String>,
    pub payment_upi_id: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/payment-info", get(payment_info))
        .route("/v1/bookings", post(create_booking).get(list_bookings))
        .route(
            "/v1/bookings/{id}",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route("/v1/bookings/{id}/payment", post(upload_payment_proof))
        .route("/v1/bookings/{id}/status", patch(update_booking_status))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(admin_list_bookings))
        .route("/bookings/{id}/verify-payment", patch(verify_payment))
        .route("/settings", get(admin_get_settings).put(admin_update_settings))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/bookings/payment-info
/// The admin's QR/UPI identifiers a customer pays against.
async fn payment_info(State(state): State<AppState>) -> Result<Json<PaymentInfoOut>, AppError> {
    let settings = state.settings.get().await.map_err(AppError::from_repo)?;
    match settings {
        Some(s) if s.payment_qr_code.is_some() || s.payment_upi_id.is_some() => {
            Ok(Json(PaymentInfoOut {
                payment_qr_code: s.payment_qr_code,
                payment_upi_id: s.payment_upi_id,
            }))
        }
        _ => Err(AppError::NotFound(
            "Payment information not configured by admin".to_string(),
        )),
    }
}

/// POST /v1/bookings
/// Amount is computed server-side from the listing price and the quantity.
async fn create_booking(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let listing = state
        .listings
        .get(req.listing_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    let booking = Booking::new(
        listing.id,
        user.id,
        req.quantity,
        listing.price_minor,
        req.payment_reference,
        req.payment_screenshot,
    )
    .map_err(AppError::from_core)?;

    state.bookings.create(&booking).await.map_err(AppError::from_repo)?;

    info!(
        "Booking {} created for listing {} ({} x {})",
        booking.id, listing.id, booking.quantity, listing.price_minor
    );

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /v1/bookings
/// Listers see bookings on their listings; everyone else sees their own.
async fn list_bookings(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<BookingListOut>, AppError> {
    let filter = if user.role.is_lister() {
        BookingFilter {
            listing_owner_id: Some(user.id),
            listing_id: query.listing_id,
            ..BookingFilter::default()
        }
    } else {
        BookingFilter {
            user_id: Some(user.id),
            listing_id: query.listing_id,
            ..BookingFilter::default()
        }
    };

    let bookings = state.bookings.list(filter).await.map_err(AppError::from_repo)?;
    let total = bookings.len();
    Ok(Json(BookingListOut { bookings, total }))
}

/// GET /v1/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .get(booking_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if booking.user_id != user.id && !user.role.is_admin() {
        return Err(AppError::Authorization(
            "Not authorized to view this booking".to_string(),
        ));
    }

    Ok(Json(booking))
}

/// PUT /v1/bookings/{id}
async fn update_booking(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<BookingUpdateRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .get(booking_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if booking.user_id != user.id {
        return Err(AppError::Authorization(
            "Not authorized to update this booking".to_string(),
        ));
    }

    if let Some(status) = req.status {
        if status != BookingStatus::Cancelled {
            return Err(AppError::Validation(
                "Only cancellation is allowed; other statuses are set by the lister".to_string(),
            ));
        }
        state.bookings.update_status(booking_id, status).await.map_err(AppError::from_repo)?;
    }

    if let (Some(reference), Some(screenshot)) = (&req.payment_reference, &req.payment_screenshot)
    {
        state
            .bookings
            .update_proof(booking_id, reference, screenshot)
            .await.map_err(AppError::from_repo)?;
    }

    let booking = state
        .bookings
        .get(booking_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
    Ok(Json(booking))
}

/// DELETE /v1/bookings/{id}
async fn delete_booking(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let booking = state
        .bookings
        .get(booking_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if booking.user_id != user.id {
        return Err(AppError::Authorization(
            "Not authorized to delete this booking".to_string(),
        ));
    }

    state.bookings.delete(booking_id).await.map_err(AppError::from_repo)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/bookings/{id}/payment
/// Overwrites the payment proof fields on the caller's own booking.
async fn upload_payment_proof(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<PaymentProofRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .get(booking_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if booking.user_id != user.id {
        return Err(AppError::Authorization("Not authorized".to_string()));
    }

    let updated = state
        .bookings
        .update_proof(booking_id, &req.payment_reference, &req.payment_screenshot)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
    Ok(Json(updated))
}

/// PATCH /v1/bookings/{id}/status
/// Lister accepts, rejects or waitlists a booking on their listing. Any
/// transition among those three is allowed.
async fn update_booking_status(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .get(booking_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let listing = state
        .listings
        .get(booking.listing_id)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

    if listing.owner_id != user.id {
        return Err(AppError::Authorization("Not authorized".to_string()));
    }

    validate_lister_status(req.status).map_err(AppError::from_core)?;

    let updated = state
        .bookings
        .update_status(booking_id, req.status)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    info!(
        "Lister {} set booking {} to {}",
        user.email, booking_id, req.status
    );

    Ok(Json(updated))
}

// ============================================================================
// Admin Handlers
// ============================================================================

/// GET /v1/admin/bookings
async fn admin_list_bookings(
    State(state): State<AppState>,
) -> Result<Json<BookingListOut>, AppError> {
    let bookings = state.bookings.list(BookingFilter::default()).await.map_err(AppError::from_repo)?;
    let total = bookings.len();
    Ok(Json(BookingListOut { bookings, total }))
}

/// PATCH /v1/admin/bookings/{id}/verify-payment
/// Payment review overrides booking status: verified accepts, fake cancels,
/// pending resets.
async fn verify_payment(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<PaymentVerificationRequest>,
) -> Result<Json<Booking>, AppError> {
    let effect = review_payment(req.payment_status, Utc::now());

    let updated = state
        .bookings
        .apply_payment_review(booking_id, &effect)
        .await.map_err(AppError::from_repo)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    info!(
        "Admin {} reviewed payment for booking {}: {} (notes: {})",
        admin.email,
        booking_id,
        req.payment_status,
        req.notes.as_deref().unwrap_or("-")
    );

    Ok(Json(updated))
}

/// GET /v1/admin/settings
async fn admin_get_settings(
    State(state): State<AppState>,
) -> Result<Json<AdminSettings>, AppError> {
    let settings = state.settings.get().await.map_err(AppError::from_repo)?.unwrap_or(AdminSettings {
        id: SETTINGS_ROW_ID,
        payment_qr_code: None,
        payment_upi_id: None,
        updated_by: None,
        updated_at: None,
    });
    Ok(Json(settings))
}

/// PUT /v1/admin/settings
/// Get-or-create on the fixed row; only provided fields are patched.
async fn admin_update_settings(
    State(state): State<AppState>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Json(req): Json<SettingsUpdateRequest>,
) -> Result<Json<AdminSettings>, AppError> {
    let update = SettingsUpdate {
        payment_qr_code: req.payment_qr_code,
        payment_upi_id: req.payment_upi_id,
    };
    let settings = state
        .settings
        .upsert(&update, admin.id, Utc::now())
        .await.map_err(AppError::from_repo)?;
    Ok(Json(settings))
}
