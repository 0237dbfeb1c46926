use std::sync::Arc;

use basera_core::mail::Mailer;
use basera_core::media::MediaStorage;
use basera_core::repository::{
    AnalyticsRepository, BookingRepository, FacultyRepository, ListingRepository,
    SettingsRepository, UserRepository,
};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub otp_ttl_minutes: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub listings: Arc<dyn ListingRepository>,
    pub faculty: Arc<dyn FacultyRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub analytics: Arc<dyn AnalyticsRepository>,
    pub media: Arc<dyn MediaStorage>,
    pub mailer: Arc<dyn Mailer>,
    pub auth: AuthConfig,
    /// Root folder on the media provider under which uploads are placed.
    pub media_folder: String,
}
