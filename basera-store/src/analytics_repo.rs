use async_trait::async_trait;
use basera_core::analytics::{
    trend_buckets, period_start, DashboardAnalytics, DashboardOverview, DashboardTrends,
    OwnerAnalytics, OwnerOverview, OwnerTrends, TrendPeriod, TrendPoint,
};
use basera_core::repository::AnalyticsRepository;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

pub struct PostgresAnalyticsRepository {
    pub pool: PgPool,
}

impl PostgresAnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn bookings_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings WHERE created_at >= $1 AND created_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
    }

    async fn signups_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE date_joined >= $1 AND date_joined < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
    }

    async fn revenue_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount_minor), 0)::BIGINT FROM bookings \
             WHERE status = 'accepted' AND created_at >= $1 AND created_at < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
    }

    async fn owner_bookings_between(
        &self,
        owner_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings b JOIN listings l ON b.listing_id = l.id \
             WHERE l.owner_id = $1 AND b.created_at >= $2 AND b.created_at < $3",
        )
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
    }

    async fn owner_revenue_between(
        &self,
        owner_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(b.amount_minor), 0)::BIGINT FROM bookings b \
             JOIN listings l ON b.listing_id = l.id \
             WHERE l.owner_id = $1 AND b.status = 'accepted' \
               AND b.created_at >= $2 AND b.created_at < $3",
        )
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(sqlx::FromRow)]
struct BreakdownRow {
    key: String,
    count: i64,
}

#[async_trait]
impl AnalyticsRepository for PostgresAnalyticsRepository {
    async fn admin_dashboard(
        &self,
        period: TrendPeriod,
        now: DateTime<Utc>,
    ) -> Result<DashboardAnalytics, Box<dyn std::error::Error + Send + Sync>> {
        let since = period_start(period, now);

        let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total_listings = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await?;
        let total_bookings = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        let active_users =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT user_id) FROM bookings")
                .fetch_one(&self.pool)
                .await?;
        let period_bookings =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE created_at >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;
        let total_revenue_minor = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount_minor), 0)::BIGINT FROM bookings WHERE status = 'accepted'",
        )
        .fetch_one(&self.pool)
        .await?;
        let period_revenue_minor = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount_minor), 0)::BIGINT FROM bookings \
             WHERE status = 'accepted' AND created_at >= $1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        let pending_listers = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users \
             WHERE role IN ('hostel', 'coaching', 'library', 'tiffin') \
               AND is_approved_lister = FALSE",
        )
        .fetch_one(&self.pool)
        .await?;
        let pending_bookings =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;

        let status_rows = sqlx::query_as::<_, BreakdownRow>(
            "SELECT status AS key, COUNT(*) AS count FROM bookings GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        let bookings_by_status: BTreeMap<String, i64> =
            status_rows.into_iter().map(|r| (r.key, r.count)).collect();

        let type_rows = sqlx::query_as::<_, BreakdownRow>(
            "SELECT listing_type AS key, COUNT(*) AS count FROM listings GROUP BY listing_type",
        )
        .fetch_all(&self.pool)
        .await?;
        let listings_by_type: BTreeMap<String, i64> =
            type_rows.into_iter().map(|r| (r.key, r.count)).collect();

        // One count/sum per bucket, matching the shape of the chart.
        let buckets = trend_buckets(period, now);
        let mut bookings_trend = Vec::with_capacity(buckets.len());
        let mut users_trend = Vec::with_capacity(buckets.len());
        let mut revenue_trend = Vec::with_capacity(buckets.len());
        for bucket in &buckets {
            bookings_trend.push(TrendPoint {
                label: bucket.label.clone(),
                value: self.bookings_between(bucket.start, bucket.end).await?,
            });
            users_trend.push(TrendPoint {
                label: bucket.label.clone(),
                value: self.signups_between(bucket.start, bucket.end).await?,
            });
            revenue_trend.push(TrendPoint {
                label: bucket.label.clone(),
                value: self.revenue_between(bucket.start, bucket.end).await?,
            });
        }

        Ok(DashboardAnalytics {
            overview: DashboardOverview {
                total_users,
                total_listings,
                total_bookings,
                active_users,
                period_bookings,
                total_revenue_minor,
                period_revenue_minor,
                pending_listers,
                pending_bookings,
            },
            bookings_by_status,
            listings_by_type,
            trends: DashboardTrends {
                bookings: bookings_trend,
                users: users_trend,
                revenue: revenue_trend,
            },
            period,
        })
    }

    async fn owner_dashboard(
        &self,
        owner_id: Uuid,
        period: TrendPeriod,
        now: DateTime<Utc>,
    ) -> Result<OwnerAnalytics, Box<dyn std::error::Error + Send + Sync>> {
        let since = period_start(period, now);

        let total_listings =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM listings WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;
        let total_bookings = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings b JOIN listings l ON b.listing_id = l.id \
             WHERE l.owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        let period_bookings = self.owner_bookings_between(owner_id, since, now).await?;
        let unique_customers = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT b.user_id) FROM bookings b \
             JOIN listings l ON b.listing_id = l.id WHERE l.owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        let total_revenue_minor = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(b.amount_minor), 0)::BIGINT FROM bookings b \
             JOIN listings l ON b.listing_id = l.id \
             WHERE l.owner_id = $1 AND b.status = 'accepted'",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        let period_revenue_minor = self.owner_revenue_between(owner_id, since, now).await?;
        let pending_bookings = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings b JOIN listings l ON b.listing_id = l.id \
             WHERE l.owner_id = $1 AND b.status = 'pending'",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        let status_rows = sqlx::query_as::<_, BreakdownRow>(
            "SELECT b.status AS key, COUNT(*) AS count FROM bookings b \
             JOIN listings l ON b.listing_id = l.id WHERE l.owner_id = $1 GROUP BY b.status",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        let bookings_by_status: BTreeMap<String, i64> =
            status_rows.into_iter().map(|r| (r.key, r.count)).collect();

        let buckets = trend_buckets(period, now);
        let mut bookings_trend = Vec::with_capacity(buckets.len());
        let mut revenue_trend = Vec::with_capacity(buckets.len());
        for bucket in &buckets {
            bookings_trend.push(TrendPoint {
                label: bucket.label.clone(),
                value: self
                    .owner_bookings_between(owner_id, bucket.start, bucket.end)
                    .await?,
            });
            revenue_trend.push(TrendPoint {
                label: bucket.label.clone(),
                value: self
                    .owner_revenue_between(owner_id, bucket.start, bucket.end)
                    .await?,
            });
        }

        let avg_booking_value_minor = if total_bookings > 0 {
            total_revenue_minor / total_bookings
        } else {
            0
        };

        Ok(OwnerAnalytics {
            overview: OwnerOverview {
                total_listings,
                total_bookings,
                period_bookings,
                unique_customers,
                total_revenue_minor,
                period_revenue_minor,
                pending_bookings,
                avg_booking_value_minor,
            },
            bookings_by_status,
            trends: OwnerTrends {
                bookings: bookings_trend,
                revenue: revenue_trend,
            },
            period,
        })
    }
}
