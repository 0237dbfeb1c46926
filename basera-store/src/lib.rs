pub mod analytics_repo;
pub mod app_config;
pub mod booking_repo;
pub mod cloudinary;
pub mod database;
pub mod faculty_repo;
pub mod listing_repo;
pub mod mailer;
pub mod settings_repo;
pub mod user_repo;

pub use cloudinary::CloudinaryClient;
pub use database::DbClient;
pub use mailer::{ConsoleMailer, SmtpMailer};
