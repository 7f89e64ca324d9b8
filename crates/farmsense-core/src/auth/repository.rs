//! Database access for users and sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use super::{
    credentials::{NewUser, Session, User, UserRole},
    AuthError,
};

/// Repository trait for identity operations.
///
/// Abstracts the backing store so the session service can be exercised with
/// mock implementations in tests.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Inserts a new user, assigning id and creation timestamp.
    ///
    /// Fails with [`AuthError::EmailTaken`] if the normalized email is
    /// already registered.
    async fn create_user(&self, new: NewUser) -> Result<User, AuthError>;

    /// Looks a user up by normalized email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, AuthError>;

    /// Persists a freshly issued session.
    async fn create_session(&self, session: Session) -> Result<(), AuthError>;

    /// Resolves a token digest to its session and owning user in one
    /// round trip.
    async fn find_session_user(
        &self,
        token_hash: &str,
    ) -> Result<Option<(Session, User)>, AuthError>;

    /// Removes one session. Returns `false` if no such session existed.
    async fn delete_session(&self, token_hash: &str) -> Result<bool, AuthError>;

    /// Removes every session past its expiry. Returns how many rows went.
    async fn delete_expired_sessions(&self) -> Result<u64, AuthError>;
}

/// `SQLite`-backed identity repository, sharing the pool with the record
/// store.
pub struct SqliteIdentityRepository {
    pool: Pool<Sqlite>,
}

impl SqliteIdentityRepository {
    #[must_use]
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn get_required<'r, T>(row: &'r sqlx::sqlite::SqliteRow, column: &str) -> Result<T, AuthError>
    where
        T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
    {
        row.try_get::<T, _>(column)
            .map_err(|e| AuthError::DatabaseError(format!("column '{column}': {e}")))
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, AuthError> {
        let id: String = Self::get_required(row, "id")?;
        let role_raw: String = Self::get_required(row, "role")?;
        let role = UserRole::from_str(&role_raw).ok_or_else(|| {
            AuthError::DatabaseError(format!("user '{id}': unknown role '{role_raw}'"))
        })?;

        Ok(User {
            id,
            email: Self::get_required(row, "email")?,
            password_hash: Self::get_required(row, "password_hash")?,
            full_name: Self::get_required(row, "full_name")?,
            role,
            farm_name: row.get("farm_name"),
            location: row.get("location"),
            phone: row.get("phone"),
            is_active: Self::get_required(row, "is_active")?,
            created_at: Self::get_required::<DateTime<Utc>>(row, "created_at")?,
        })
    }
}

#[async_trait]
impl IdentityRepository for SqliteIdentityRepository {
    async fn create_user(&self, new: NewUser) -> Result<User, AuthError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: new.email,
            password_hash: new.password_hash,
            full_name: new.full_name,
            role: new.role,
            farm_name: new.farm_name,
            location: new.location,
            phone: new.phone,
            is_active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO users (id, email, password_hash, full_name, role,
                               farm_name, location, phone, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(&user.farm_name)
        .bind(&user.location)
        .bind(&user.phone)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::EmailTaken,
            _ => AuthError::from(e),
        })?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let row = sqlx::query(
            r"
            SELECT id, email, password_hash, full_name, role,
                   farm_name, location, phone, is_active, created_at
            FROM users
            WHERE email = ?
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, AuthError> {
        let row = sqlx::query(
            r"
            SELECT id, email, password_hash, full_name, role,
                   farm_name, location, phone, is_active, created_at
            FROM users
            WHERE id = ?
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    async fn create_session(&self, session: Session) -> Result<(), AuthError> {
        sqlx::query(
            r"
            INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(&session.token_hash)
        .bind(&session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session_user(
        &self,
        token_hash: &str,
    ) -> Result<Option<(Session, User)>, AuthError> {
        let row = sqlx::query(
            r"
            SELECT s.token_hash, s.user_id, s.created_at AS session_created_at, s.expires_at,
                   u.id, u.email, u.password_hash, u.full_name, u.role,
                   u.farm_name, u.location, u.phone, u.is_active, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = ?
            ",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            let session = Session {
                token_hash: Self::get_required(&r, "token_hash")?,
                user_id: Self::get_required(&r, "user_id")?,
                created_at: Self::get_required::<DateTime<Utc>>(&r, "session_created_at")?,
                expires_at: Self::get_required::<DateTime<Utc>>(&r, "expires_at")?,
            };
            let user = Self::row_to_user(&r)?;
            Ok((session, user))
        })
        .transpose()
    }

    async fn delete_session(&self, token_hash: &str) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r"
            DELETE FROM sessions
            WHERE token_hash = ?
            ",
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_sessions(&self) -> Result<u64, AuthError> {
        let result = sqlx::query(
            r"
            DELETE FROM sessions
            WHERE expires_at < ?
            ",
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
