use async_trait::async_trait;
use basera_core::repository::SettingsRepository;
use basera_core::settings::{AdminSettings, SettingsUpdate, SETTINGS_ROW_ID};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresSettingsRepository {
    pub pool: PgPool,
}

impl PostgresSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SettingsRow {
    id: i32,
    payment_qr_code: Option<String>,
    payment_upi_id: Option<String>,
    updated_by: Option<Uuid>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<SettingsRow> for AdminSettings {
    fn from(row: SettingsRow) -> Self {
        AdminSettings {
            id: row.id,
            payment_qr_code: row.payment_qr_code,
            payment_upi_id: row.payment_upi_id,
            updated_by: row.updated_by,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl SettingsRepository for PostgresSettingsRepository {
    async fn get(&self) -> Result<Option<AdminSettings>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT id, payment_qr_code, payment_upi_id, updated_by, updated_at \
             FROM admin_settings WHERE id = $1",
        )
        .bind(SETTINGS_ROW_ID)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AdminSettings::from))
    }

    async fn upsert(
        &self,
        update: &SettingsUpdate,
        admin_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<AdminSettings, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            INSERT INTO admin_settings (id, payment_qr_code, payment_upi_id, updated_by, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                payment_qr_code = COALESCE($2, admin_settings.payment_qr_code),
                payment_upi_id = COALESCE($3, admin_settings.payment_upi_id),
                updated_by = $4,
                updated_at = $5
            RETURNING id, payment_qr_code, payment_upi_id, updated_by, updated_at
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(&update.payment_qr_code)
        .bind(&update.payment_upi_id)
        .bind(admin_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(AdminSettings::from(row))
    }
}
