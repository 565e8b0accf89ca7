//! User repository for database operations.

use domain::models::{User, UserForm};
use shared::pagination::{Page, PageRequest};
use sqlx::PgPool;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;
use crate::query::{list_page, Column, ColumnType, EntityDescriptor, FilterDecl, FilterValues};

pub static USER_DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    table: "users",
    id_column: "id",
    columns: &[
        Column::new("id", ColumnType::BigInt),
        Column::text("username"),
        Column::text("name"),
        Column::text("email"),
        Column::new("licensed_devices", ColumnType::Integer),
        Column::text("note"),
        Column::text("login_verify"),
        Column::text("tfa_secret"),
        Column::new("status", ColumnType::SmallInt),
        Column::new("is_admin", ColumnType::Boolean),
        Column::new("created_at", ColumnType::Timestamp),
    ],
};

pub const USER_FILTERS: &[FilterDecl] = &[
    FilterDecl::exact("username", "username"),
    FilterDecl::contains("name", "name"),
    FilterDecl::exact("email", "email"),
    FilterDecl::exact("admin_status", "is_admin"),
    FilterDecl::exact("status", "status"),
    FilterDecl::range("created_at", "created_at"),
];

/// Repository for admin-managed accounts.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists users, newest first.
    pub async fn list(
        &self,
        filters: &FilterValues,
        request: PageRequest,
    ) -> Result<Page<User>, sqlx::Error> {
        let page = list_page::<UserEntity, _>(
            &self.pool,
            &USER_DESCRIPTOR,
            USER_FILTERS,
            filters,
            request,
        )
        .await?;
        Ok(page.map(entity_to_domain))
    }

    pub async fn exists_by_username(&self, username: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("users.exists_by_username");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether no account exists yet.
    pub async fn is_empty(&self) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("users.is_empty");
        let result = sqlx::query_scalar::<_, bool>("SELECT NOT EXISTS(SELECT 1 FROM users)")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let timer = QueryTimer::new("users.find_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, name, email, licensed_devices, note, login_verify,
                   tfa_secret, status, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.map(entity_to_domain))
    }

    /// Inserts a normalized form. Returns the new id.
    pub async fn insert(&self, form: &UserForm, password_hash: &str) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("users.insert");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (
                username, password, name, email, licensed_devices, note,
                login_verify, tfa_secret, status, is_admin
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&form.username)
        .bind(password_hash)
        .bind(&form.name)
        .bind(&form.email)
        .bind(form.licensed_devices)
        .bind(&form.note)
        .bind(&form.login_verify)
        .bind(&form.tfa_secret)
        .bind(form.status)
        .bind(form.is_admin)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Updates an existing user from a normalized form.
    ///
    /// Empty string fields keep their stored value and the username never
    /// changes. `licensed_devices`, `status` and `is_admin` are always
    /// written. Password and TOTP secret change only when given. Returns the
    /// number of updated rows.
    pub async fn update(
        &self,
        form: &UserForm,
        password_hash: Option<&str>,
        tfa_secret: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("users.update");
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE(NULLIF($2, ''), name),
                email = COALESCE(NULLIF($3, ''), email),
                note = COALESCE(NULLIF($4, ''), note),
                login_verify = COALESCE(NULLIF($5, ''), login_verify),
                password = COALESCE($6, password),
                tfa_secret = COALESCE($7, tfa_secret),
                licensed_devices = $8,
                status = $9,
                is_admin = $10,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(form.id)
        .bind(&form.name)
        .bind(&form.email)
        .bind(&form.note)
        .bind(&form.login_verify)
        .bind(password_hash)
        .bind(tfa_secret)
        .bind(form.licensed_devices)
        .bind(form.status)
        .bind(form.is_admin)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Deletes the given ids. Returns the number of deleted rows.
    pub async fn delete_many(&self, ids: &[i64]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }

        let timer = QueryTimer::new("users.delete_many");
        let result = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}

fn entity_to_domain(entity: UserEntity) -> User {
    User {
        id: entity.id,
        username: entity.username,
        name: entity.name,
        email: entity.email,
        licensed_devices: entity.licensed_devices,
        note: entity.note,
        login_verify: entity.login_verify,
        tfa_secret: entity.tfa_secret,
        status: entity.status,
        is_admin: entity.is_admin,
        created_at: entity.created_at,
    }
}
