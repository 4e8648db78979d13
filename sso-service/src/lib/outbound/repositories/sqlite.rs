use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::migrate::MigrateError;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::FromRow;
use sqlx::SqlitePool;

use crate::domain::auth::errors::StoreError;
use crate::domain::auth::models::App;
use crate::domain::auth::models::AppId;
use crate::domain::auth::models::AppSecret;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::NewUser;
use crate::domain::auth::models::PasswordHash;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::CredentialStore;

/// Durable credential store on SQLite.
///
/// Email uniqueness is enforced by a `UNIQUE COLLATE NOCASE` column, so duplicate
/// detection does not depend on the caller having normalized the address.
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(&row.email)
            .map_err(|e| StoreError::Corrupted(format!("user {}: {}", row.id, e)))?;

        Ok(User {
            id: UserId(row.id),
            email,
            password_hash: PasswordHash::new(row.password_hash),
            is_admin: row.is_admin,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct AppRow {
    id: i32,
    name: String,
    secret: Vec<u8>,
}

impl From<AppRow> for App {
    fn from(row: AppRow) -> Self {
        App {
            id: AppId(row.id),
            name: row.name,
            secret: AppSecret::new(row.secret),
        }
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database described by `options`.
    pub async fn connect(
        options: SqliteConnectOptions,
        max_connections: u32,
    ) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options.create_if_missing(true))
            .await?;
        Ok(Self::new(pool))
    }

    /// Private in-memory database. Pinned to one connection that is never recycled,
    /// since every SQLite connection to `:memory:` opens a separate database.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Insert an app, or replace name and secret of an existing one.
    pub async fn upsert_app(&self, app: &App) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO apps (id, name, secret)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (id) DO UPDATE SET name = excluded.name, secret = excluded.secret
            "#,
        )
        .bind(app.id.0)
        .bind(&app.name)
        .bind(app.secret.as_bytes())
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                StoreError::AlreadyExists(format!("app name {}", app.name))
            }
            _ => unavailable(e),
        })?;

        Ok(())
    }

    /// Grant or revoke the admin flag.
    pub async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET is_admin = ?1 WHERE id = ?2")
            .bind(is_admin)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {id}")));
        }

        Ok(())
    }

    pub async fn user_count(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn create_user(&self, user: NewUser) -> Result<UserId, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, is_admin, created_at)
            VALUES (?1, ?2, FALSE, ?3)
            "#,
        )
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                StoreError::AlreadyExists(format!("user {}", user.email))
            }
            _ => unavailable(e),
        })?;

        Ok(UserId(result.last_insert_rowid()))
    }

    async fn get_user_by_email(&self, email: &EmailAddress) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, is_admin, created_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        row.ok_or_else(|| StoreError::NotFound(format!("user {email}")))?
            .try_into()
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, is_admin, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        row.ok_or_else(|| StoreError::NotFound(format!("user {id}")))?
            .try_into()
    }

    async fn get_app_by_id(&self, id: AppId) -> Result<App, StoreError> {
        let row = sqlx::query_as::<_, AppRow>(
            r#"
            SELECT id, name, secret
            FROM apps
            WHERE id = ?1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        row.map(App::from)
            .ok_or_else(|| StoreError::NotFound(format!("app {id}")))
    }
}
