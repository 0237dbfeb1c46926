use std::net::SocketAddr;
use std::sync::Arc;

use basera_api::{
    app,
    state::{AppState, AuthConfig},
};
use basera_core::mail::Mailer;
use basera_store::analytics_repo::PostgresAnalyticsRepository;
use basera_store::booking_repo::PostgresBookingRepository;
use basera_store::faculty_repo::PostgresFacultyRepository;
use basera_store::listing_repo::PostgresListingRepository;
use basera_store::settings_repo::PostgresSettingsRepository;
use basera_store::user_repo::PostgresUserRepository;
use basera_store::{CloudinaryClient, ConsoleMailer, DbClient, SmtpMailer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "basera_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = basera_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Basera API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");
    let pool = db.pool.clone();

    let mailer: Arc<dyn Mailer> = match config.mail.mode.as_str() {
        "smtp" => Arc::new(SmtpMailer::new(&config.mail)),
        _ => Arc::new(ConsoleMailer),
    };

    let app_state = AppState {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        listings: Arc::new(PostgresListingRepository::new(pool.clone())),
        faculty: Arc::new(PostgresFacultyRepository::new(pool.clone())),
        bookings: Arc::new(PostgresBookingRepository::new(pool.clone())),
        settings: Arc::new(PostgresSettingsRepository::new(pool.clone())),
        analytics: Arc::new(PostgresAnalyticsRepository::new(pool)),
        media: Arc::new(CloudinaryClient::new(&config.media)),
        mailer,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
            otp_ttl_minutes: config.auth.otp_ttl_minutes,
        },
        media_folder: config.media.folder.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
