use async_trait::async_trait;
use basera_core::booking::{Booking, BookingWithContext, PaymentReviewEffect};
use basera_core::repository::{BookingFilter, BookingRepository};
use basera_shared::{BookingStatus, ListingType, PaymentStatus};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "id, listing_id, user_id, status, quantity, amount_minor, \
     payment_reference, payment_screenshot, payment_verified, payment_status, \
     payment_verified_at, created_at, updated_at";

pub struct PostgresBookingRepository {
    pub pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    listing_id: Uuid,
    user_id: Uuid,
    status: String,
    quantity: i32,
    amount_minor: i64,
    payment_reference: Option<String>,
    payment_screenshot: Option<String>,
    payment_verified: bool,
    payment_status: String,
    payment_verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            listing_id: row.listing_id,
            user_id: row.user_id,
            status: row.status.parse().unwrap_or(BookingStatus::Pending),
            quantity: row.quantity,
            amount_minor: row.amount_minor,
            payment_reference: row.payment_reference,
            payment_screenshot: row.payment_screenshot,
            payment_verified: row.payment_verified,
            payment_status: row.payment_status.parse().unwrap_or(PaymentStatus::Pending),
            payment_verified_at: row.payment_verified_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookingContextRow {
    id: Uuid,
    listing_id: Uuid,
    user_id: Uuid,
    status: String,
    quantity: i32,
    amount_minor: i64,
    payment_reference: Option<String>,
    payment_screenshot: Option<String>,
    payment_verified: bool,
    payment_status: String,
    payment_verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    user_email: String,
    user_first_name: Option<String>,
    user_last_name: Option<String>,
    user_phone: Option<String>,
    listing_name: String,
    listing_type: String,
}

impl From<BookingContextRow> for BookingWithContext {
    fn from(row: BookingContextRow) -> Self {
        let user_name = format!(
            "{} {}",
            row.user_first_name.as_deref().unwrap_or(""),
            row.user_last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string();
        let user_name = if user_name.is_empty() {
            row.user_email.clone()
        } else {
            user_name
        };
        BookingWithContext {
            booking: Booking {
                id: row.id,
                listing_id: row.listing_id,
                user_id: row.user_id,
                status: row.status.parse().unwrap_or(BookingStatus::Pending),
                quantity: row.quantity,
                amount_minor: row.amount_minor,
                payment_reference: row.payment_reference,
                payment_screenshot: row.payment_screenshot,
                payment_verified: row.payment_verified,
                payment_status: row.payment_status.parse().unwrap_or(PaymentStatus::Pending),
                payment_verified_at: row.payment_verified_at,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            user_email: row.user_email,
            user_name,
            user_phone: row.user_phone,
            listing_name: row.listing_name,
            listing_type: row.listing_type.parse().unwrap_or(ListingType::Hostel),
        }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn create(
        &self,
        booking: &Booking,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, listing_id, user_id, status, quantity, amount_minor,
                payment_reference, payment_screenshot, payment_verified, payment_status,
                payment_verified_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(booking.id)
        .bind(booking.listing_id)
        .bind(booking.user_id)
        .bind(booking.status.to_string())
        .bind(booking.quantity)
        .bind(booking.amount_minor)
        .bind(&booking.payment_reference)
        .bind(&booking.payment_screenshot)
        .bind(booking.payment_verified)
        .bind(booking.payment_status.to_string())
        .bind(booking.payment_verified_at)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Booking::from))
    }

    async fn list(
        &self,
        filter: BookingFilter,
    ) -> Result<Vec<BookingWithContext>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, BookingContextRow>(
            r#"
            SELECT b.id, b.listing_id, b.user_id, b.status, b.quantity, b.amount_minor,
                b.payment_reference, b.payment_screenshot, b.payment_verified,
                b.payment_status, b.payment_verified_at, b.created_at, b.updated_at,
                u.email AS user_email,
                u.first_name AS user_first_name,
                u.last_name AS user_last_name,
                u.phone_number AS user_phone,
                l.name AS listing_name,
                l.listing_type
            FROM bookings b
            JOIN users u ON b.user_id = u.id
            JOIN listings l ON b.listing_id = l.id
            WHERE ($1::UUID IS NULL OR b.user_id = $1)
              AND ($2::UUID IS NULL OR b.listing_id = $2)
              AND ($3::UUID IS NULL OR l.owner_id = $3)
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.listing_id)
        .bind(filter.listing_owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BookingWithContext::from).collect())
    }

    async fn update_proof(
        &self,
        id: Uuid,
        payment_reference: &str,
        payment_screenshot: &str,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings SET
                payment_reference = $2,
                payment_screenshot = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(payment_reference)
        .bind(payment_screenshot)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Booking::from))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(status.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Booking::from))
    }

    async fn apply_payment_review(
        &self,
        id: Uuid,
        effect: &PaymentReviewEffect,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings SET
                payment_status = $2,
                payment_verified = $3,
                status = $4,
                payment_verified_at = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(effect.payment_status.to_string())
        .bind(effect.payment_verified)
        .bind(effect.booking_status.to_string())
        .bind(effect.payment_verified_at)
        .bind(effect.reviewed_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Booking::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
