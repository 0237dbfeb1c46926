use async_trait::async_trait;
use basera_shared::{BookingStatus, ListingType, UserRole};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::analytics::{DashboardAnalytics, OwnerAnalytics, TrendPeriod};
use crate::booking::{Booking, BookingWithContext, PaymentReviewEffect};
use crate::listing::{
    Faculty, FacultyUpdate, Listing, ListingDetail, ListingOverview, ListingUpdate,
};
use crate::settings::{AdminSettings, SettingsUpdate};
use crate::user::{ProfileUpdate, User};

type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Repository trait for account storage. Missing rows are `None`, not
/// errors.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), RepoError>;

    async fn get(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn list(&self) -> Result<Vec<User>, RepoError>;

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepoError>;

    /// Store a fresh email-verification code.
    async fn set_otp(
        &self,
        id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError>;

    /// Activate the account after a successful OTP check and clear the code.
    async fn mark_verified(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn update_last_login(&self, id: Uuid) -> Result<(), RepoError>;

    /// Replace the stored password hash and clear any pending OTP.
    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<User>, RepoError>;

    async fn set_lister_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> Result<Option<User>, RepoError>;

    async fn set_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>, RepoError>;
}

/// Repository trait for listings and their admin views.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn create(&self, listing: &Listing) -> Result<(), RepoError>;

    async fn get(&self, id: Uuid) -> Result<Option<Listing>, RepoError>;

    async fn list(
        &self,
        listing_type: Option<ListingType>,
        owner_id: Option<Uuid>,
    ) -> Result<Vec<Listing>, RepoError>;

    async fn update(&self, id: Uuid, update: &ListingUpdate) -> Result<Option<Listing>, RepoError>;

    /// Deletes the listing; faculty and bookings cascade with it.
    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;

    async fn set_image(&self, id: Uuid, image_url: &str) -> Result<Option<Listing>, RepoError>;

    async fn admin_overview(&self) -> Result<Vec<ListingOverview>, RepoError>;

    async fn admin_detail(&self, id: Uuid) -> Result<Option<ListingDetail>, RepoError>;
}

/// Repository trait for faculty rows.
#[async_trait]
pub trait FacultyRepository: Send + Sync {
    async fn create(&self, faculty: &Faculty) -> Result<(), RepoError>;

    async fn create_many(&self, faculty: &[Faculty]) -> Result<(), RepoError>;

    async fn get(&self, id: Uuid) -> Result<Option<Faculty>, RepoError>;

    async fn list(&self, listing_id: Option<Uuid>) -> Result<Vec<Faculty>, RepoError>;

    async fn update(&self, id: Uuid, update: &FacultyUpdate) -> Result<Option<Faculty>, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// Filter for booking listings; all conditions are ANDed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingFilter {
    pub user_id: Option<Uuid>,
    pub listing_id: Option<Uuid>,
    /// Restrict to bookings on listings owned by this user.
    pub listing_owner_id: Option<Uuid>,
}

/// Repository trait for bookings.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<(), RepoError>;

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, RepoError>;

    async fn list(&self, filter: BookingFilter) -> Result<Vec<BookingWithContext>, RepoError>;

    async fn update_proof(
        &self,
        id: Uuid,
        payment_reference: &str,
        payment_screenshot: &str,
    ) -> Result<Option<Booking>, RepoError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<Booking>, RepoError>;

    async fn apply_payment_review(
        &self,
        id: Uuid,
        effect: &PaymentReviewEffect,
    ) -> Result<Option<Booking>, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// Repository trait for the admin settings singleton.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self) -> Result<Option<AdminSettings>, RepoError>;

    /// Get-or-create on the fixed row; patches only provided fields.
    async fn upsert(
        &self,
        update: &SettingsUpdate,
        admin_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AdminSettings, RepoError>;
}

/// Repository trait for the read-only dashboard rollups.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn admin_dashboard(
        &self,
        period: TrendPeriod,
        now: DateTime<Utc>,
    ) -> Result<DashboardAnalytics, RepoError>;

    async fn owner_dashboard(
        &self,
        owner_id: Uuid,
        period: TrendPeriod,
        now: DateTime<Utc>,
    ) -> Result<OwnerAnalytics, RepoError>;
}
