use async_trait::async_trait;
use basera_core::repository::UserRepository;
use basera_core::user::{ProfileUpdate, User};
use basera_shared::UserRole;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, role, is_active, is_verified_email, \
     is_approved_lister, first_name, last_name, phone_number, address, city, state, pincode, \
     profile_image, otp_code, otp_expires_at, date_joined, last_login, updated_at";

pub struct PostgresUserRepository {
    pub pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    is_active: bool,
    is_verified_email: bool,
    is_approved_lister: bool,
    first_name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    pincode: Option<String>,
    profile_image: Option<String>,
    otp_code: Option<String>,
    otp_expires_at: Option<DateTime<Utc>>,
    date_joined: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().unwrap_or(UserRole::Student),
            is_active: row.is_active,
            is_verified_email: row.is_verified_email,
            is_approved_lister: row.is_approved_lister,
            first_name: row.first_name,
            last_name: row.last_name,
            phone_number: row.phone_number,
            address: row.address,
            city: row.city,
            state: row.state,
            pincode: row.pincode,
            profile_image: row.profile_image,
            otp_code: row.otp_code,
            otp_expires_at: row.otp_expires_at,
            date_joined: row.date_joined,
            last_login: row.last_login,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, is_active, is_verified_email,
                is_approved_lister, first_name, last_name, phone_number, address, city, state,
                pincode, profile_image, otp_code, otp_expires_at, date_joined)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(user.is_active)
        .bind(user.is_verified_email)
        .bind(user.is_approved_lister)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone_number)
        .bind(&user.address)
        .bind(&user.city)
        .bind(&user.state)
        .bind(&user.pincode)
        .bind(&user.profile_image)
        .bind(&user.otp_code)
        .bind(user.otp_expires_at)
        .bind(user.date_joined)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn get_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn list(&self) -> Result<Vec<User>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY date_joined DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone_number = COALESCE($4, phone_number),
                address = COALESCE($5, address),
                city = COALESCE($6, city),
                state = COALESCE($7, state),
                pincode = COALESCE($8, pincode),
                profile_image = COALESCE($9, profile_image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.phone_number)
        .bind(&update.address)
        .bind(&update.city)
        .bind(&update.state)
        .bind(&update.pincode)
        .bind(&update.profile_image)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn set_otp(
        &self,
        id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE users SET otp_code = $2, otp_expires_at = $3 WHERE id = $1")
            .bind(id)
            .bind(code)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_verified(
        &self,
        id: Uuid,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                is_active = TRUE,
                is_verified_email = TRUE,
                otp_code = NULL,
                otp_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                password_hash = $2,
                otp_code = NULL,
                otp_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn update_last_login(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_lister_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET is_approved_lister = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(approved)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn set_role(
        &self,
        id: Uuid,
        role: UserRole,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(role.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}
