use basera_shared::{ListingType, UserRole};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A service offering published by a lister. Faculty rows belong to the
/// listing and are only meaningful for coaching centers.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub listing_type: ListingType,
    pub name: String,
    pub description: Option<String>,
    pub price_minor: i64,
    pub location: Option<String>,
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub faculty: Vec<Faculty>,
}

impl Listing {
    pub fn new(
        owner_id: Uuid,
        listing_type: ListingType,
        name: String,
        description: Option<String>,
        price_minor: i64,
        location: Option<String>,
        features: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            listing_type,
            name,
            description,
            price_minor,
            location,
            features,
            image_url: None,
            created_at: Utc::now(),
            updated_at: None,
            faculty: Vec::new(),
        }
    }
}

/// Only provided fields are written.
#[derive(Debug, Clone, Default)]
pub struct ListingUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_minor: Option<i64>,
    pub location: Option<String>,
    pub features: Option<Vec<String>>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Faculty {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub name: String,
    pub subject: Option<String>,
    pub image_url: Option<String>,
}

impl Faculty {
    pub fn new(listing_id: Uuid, name: String, subject: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            listing_id,
            name,
            subject,
            image_url: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FacultyUpdate {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub image_url: Option<String>,
}

/// One row of the admin listings table: the listing plus booking counts and
/// accepted revenue.
#[derive(Debug, Clone, Serialize)]
pub struct ListingOverview {
    pub id: Uuid,
    pub name: String,
    pub listing_type: ListingType,
    pub price_minor: i64,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub owner_email: String,
    pub owner_name: String,
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub accepted_revenue_minor: i64,
}

/// Booking statistics derived for the admin listing detail view.
#[derive(Debug, Clone, Serialize, Default)]
pub struct BookingStats {
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub accepted_bookings: i64,
    pub rejected_bookings: i64,
    pub total_revenue_minor: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerInfo {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub is_approved_lister: bool,
}

/// A user enrolled on a listing via a booking.
#[derive(Debug, Clone, Serialize)]
pub struct EnrolledUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub booking_id: Uuid,
    pub booking_status: basera_shared::BookingStatus,
    pub booking_amount_minor: i64,
    pub enrolled_at: DateTime<Utc>,
    pub payment_reference: Option<String>,
}

/// Full admin detail view: listing, owner, faculty, stats and roster.
#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub owner: OwnerInfo,
    pub stats: BookingStats,
    pub enrolled_users: Vec<EnrolledUser>,
}
