use async_trait::async_trait;
use basera_core::listing::{Faculty, FacultyUpdate};
use basera_core::repository::FacultyRepository;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresFacultyRepository {
    pub pool: PgPool,
}

impl PostgresFacultyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
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

#[async_trait]
impl FacultyRepository for PostgresFacultyRepository {
    async fn create(
        &self,
        faculty: &Faculty,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "INSERT INTO faculty (id, listing_id, name, subject, image_url) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(faculty.id)
        .bind(faculty.listing_id)
        .bind(&faculty.name)
        .bind(&faculty.subject)
        .bind(&faculty.image_url)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create_many(
        &self,
        faculty: &[Faculty],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        for member in faculty {
            sqlx::query(
                "INSERT INTO faculty (id, listing_id, name, subject, image_url) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(member.id)
            .bind(member.listing_id)
            .bind(&member.name)
            .bind(&member.subject)
            .bind(&member.image_url)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Faculty>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, FacultyRow>(
            "SELECT id, listing_id, name, subject, image_url FROM faculty WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Faculty::from))
    }

    async fn list(
        &self,
        listing_id: Option<Uuid>,
    ) -> Result<Vec<Faculty>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, FacultyRow>(
            "SELECT id, listing_id, name, subject, image_url FROM faculty \
             WHERE ($1::UUID IS NULL OR listing_id = $1) ORDER BY name",
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Faculty::from).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        update: &FacultyUpdate,
    ) -> Result<Option<Faculty>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, FacultyRow>(
            r#"
            UPDATE faculty SET
                name = COALESCE($2, name),
                subject = COALESCE($3, subject),
                image_url = COALESCE($4, image_url)
            WHERE id = $1
            RETURNING id, listing_id, name, subject, image_url
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.subject)
        .bind(&update.image_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Faculty::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query("DELETE FROM faculty WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
