use async_trait::async_trait;
use basera_core::listing::{
    BookingStats, EnrolledUser, Faculty, Listing, ListingDetail, ListingOverview, ListingUpdate,
    OwnerInfo,
};
use basera_core::repository::ListingRepository;
use basera_shared::{BookingStatus, ListingType, UserRole};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const LISTING_COLUMNS: &str = "id, owner_id, listing_type, name, description, price_minor, \
     location, features, image_url, created_at, updated_at";

pub struct PostgresListingRepository {
    pub pool: PgPool,
}

impl PostgresListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn faculty_for(
        &self,
        listing_id: Uuid,
    ) -> Result<Vec<Faculty>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, FacultyRow>(
            "SELECT id, listing_id, name, subject, image_url FROM faculty WHERE listing_id = $1 ORDER BY name",
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Faculty::from).collect())
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct ListingRow {
    id: Uuid,
    owner_id: Uuid,
    listing_type: String,
    name: String,
    description: Option<String>,
    price_minor: i64,
    location: Option<String>,
    features: Vec<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl ListingRow {
    fn into_listing(self, faculty: Vec<Faculty>) -> Listing {
        Listing {
            id: self.id,
            owner_id: self.owner_id,
            listing_type: self.listing_type.parse().unwrap_or(ListingType::Hostel),
            name: self.name,
            description: self.description,
            price_minor: self.price_minor,
            location: self.location,
            features: self.features,
            image_url: self.image_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
            faculty,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FacultyRow {
    id: Uuid,
    listing_id: Uuid,
    name: String,
    subject: Option<String>,
    image_url: Option<String>,
}

impl From<FacultyRow> for Faculty {
    fn from(row: FacultyRow) -> Self {
        Faculty {
            id: row.id,
            listing_id: row.listing_id,
            name: row.name,
            subject: row.subject,
            image_url: row.image_url,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OverviewRow {
    id: Uuid,
    name: String,
    listing_type: String,
    price_minor: i64,
    location: Option<String>,
    created_at: DateTime<Utc>,
    owner_email: String,
    owner_first_name: Option<String>,
    owner_last_name: Option<String>,
    total_bookings: i64,
    pending_bookings: i64,
    accepted_revenue_minor: i64,
}

#[derive(sqlx::FromRow)]
struct OwnerRow {
    id: Uuid,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
    role: String,
    is_approved_lister: bool,
}

#[derive(sqlx::FromRow)]
struct EnrolledRow {
    booking_id: Uuid,
    booking_status: String,
    amount_minor: i64,
    enrolled_at: DateTime<Utc>,
    payment_reference: Option<String>,
    user_id: Uuid,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
}

#[async_trait]
impl ListingRepository for PostgresListingRepository {
    async fn create(
        &self,
        listing: &Listing,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO listings (id, owner_id, listing_type, name, description, price_minor,
                location, features, image_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(listing.id)
        .bind(listing.owner_id)
        .bind(listing.listing_type.to_string())
        .bind(&listing.name)
        .bind(&listing.description)
        .bind(listing.price_minor)
        .bind(&listing.location)
        .bind(&listing.features)
        .bind(&listing.image_url)
        .bind(listing.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Listing>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {} FROM listings WHERE id = $1",
            LISTING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let faculty = self.faculty_for(row.id).await?;
        Ok(Some(row.into_listing(faculty)))
    }

    async fn list(
        &self,
        listing_type: Option<ListingType>,
        owner_id: Option<Uuid>,
    ) -> Result<Vec<Listing>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            SELECT {} FROM listings
            WHERE ($1::TEXT IS NULL OR listing_type = $1)
              AND ($2::UUID IS NULL OR owner_id = $2)
            ORDER BY created_at DESC
            "#,
            LISTING_COLUMNS
        ))
        .bind(listing_type.map(|t| t.to_string()))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            let faculty = self.faculty_for(row.id).await?;
            listings.push(row.into_listing(faculty));
        }
        Ok(listings)
    }

    async fn update(
        &self,
        id: Uuid,
        update: &ListingUpdate,
    ) -> Result<Option<Listing>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            UPDATE listings SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price_minor = COALESCE($4, price_minor),
                location = COALESCE($5, location),
                features = COALESCE($6, features),
                image_url = COALESCE($7, image_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LISTING_COLUMNS
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.price_minor)
        .bind(&update.location)
        .bind(&update.features)
        .bind(&update.image_url)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let faculty = self.faculty_for(row.id).await?;
        Ok(Some(row.into_listing(faculty)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_image(
        &self,
        id: Uuid,
        image_url: &str,
    ) -> Result<Option<Listing>, Box<dyn std::error::Error + Send + Sync>> {
        self.update(
            id,
            &ListingUpdate {
                image_url: Some(image_url.to_string()),
                ..ListingUpdate::default()
            },
        )
        .await
    }

    async fn admin_overview(
        &self,
    ) -> Result<Vec<ListingOverview>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, OverviewRow>(
            r#"
            SELECT l.id, l.name, l.listing_type, l.price_minor, l.location, l.created_at,
                u.email AS owner_email,
                u.first_name AS owner_first_name,
                u.last_name AS owner_last_name,
                COUNT(b.id) AS total_bookings,
                COALESCE(SUM(CASE WHEN b.status = 'pending' THEN 1 ELSE 0 END), 0)::BIGINT
                    AS pending_bookings,
                COALESCE(SUM(b.amount_minor) FILTER (WHERE b.status = 'accepted'), 0)::BIGINT
                    AS accepted_revenue_minor
            FROM listings l
            JOIN users u ON l.owner_id = u.id
            LEFT JOIN bookings b ON b.listing_id = l.id
            GROUP BY l.id, l.name, l.listing_type, l.price_minor, l.location, l.created_at,
                u.email, u.first_name, u.last_name
            ORDER BY l.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let owner_name = format!(
                    "{} {}",
                    row.owner_first_name.as_deref().unwrap_or(""),
                    row.owner_last_name.as_deref().unwrap_or("")
                )
                .trim()
                .to_string();
                ListingOverview {
                    id: row.id,
                    name: row.name,
                    listing_type: row.listing_type.parse().unwrap_or(ListingType::Hostel),
                    price_minor: row.price_minor,
                    location: row.location,
                    created_at: row.created_at,
                    owner_email: row.owner_email,
                    owner_name,
                    total_bookings: row.total_bookings,
                    pending_bookings: row.pending_bookings,
                    accepted_revenue_minor: row.accepted_revenue_minor,
                }
            })
            .collect())
    }

    async fn admin_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<ListingDetail>, Box<dyn std::error::Error + Send + Sync>> {
        let Some(listing) = self.get(id).await? else {
            return Ok(None);
        };

        let owner = sqlx::query_as::<_, OwnerRow>(
            "SELECT id, email, first_name, last_name, phone_number, role, is_approved_lister \
             FROM users WHERE id = $1",
        )
        .bind(listing.owner_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(owner) = owner else {
            return Ok(None);
        };

        let enrolled_rows = sqlx::query_as::<_, EnrolledRow>(
            r#"
            SELECT b.id AS booking_id, b.status AS booking_status, b.amount_minor,
                b.created_at AS enrolled_at, b.payment_reference,
                u.id AS user_id, u.email, u.first_name, u.last_name, u.phone_number
            FROM bookings b
            JOIN users u ON b.user_id = u.id
            WHERE b.listing_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        // Derive stats from the roster rather than issuing four more counts.
        let mut stats = BookingStats::default();
        let enrolled_users: Vec<EnrolledUser> = enrolled_rows
            .into_iter()
            .map(|row| {
                let status = row
                    .booking_status
                    .parse()
                    .unwrap_or(BookingStatus::Pending);
                stats.total_bookings += 1;
                match status {
                    BookingStatus::Pending => stats.pending_bookings += 1,
                    BookingStatus::Accepted => {
                        stats.accepted_bookings += 1;
                        stats.total_revenue_minor += row.amount_minor;
                    }
                    BookingStatus::Rejected => stats.rejected_bookings += 1,
                    _ => {}
                }
                EnrolledUser {
                    id: row.user_id,
                    email: row.email,
                    first_name: row.first_name,
                    last_name: row.last_name,
                    phone_number: row.phone_number,
                    booking_id: row.booking_id,
                    booking_status: status,
                    booking_amount_minor: row.amount_minor,
                    enrolled_at: row.enrolled_at,
                    payment_reference: row.payment_reference,
                }
            })
            .collect();

        Ok(Some(ListingDetail {
            listing,
            owner: OwnerInfo {
                id: owner.id,
                email: owner.email,
                first_name: owner.first_name,
                last_name: owner.last_name,
                phone_number: owner.phone_number,
                role: owner.role.parse().unwrap_or(UserRole::Student),
                is_approved_lister: owner.is_approved_lister,
            },
            stats,
            enrolled_users,
        }))
    }
}
