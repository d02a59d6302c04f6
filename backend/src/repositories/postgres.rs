//! PostgreSQL-backed user store

use super::user::{StoreError, TokenFields, UserField, UserRecord, UserStore};
use async_trait::async_trait;
use sqlx::PgPool;

const USER_COLUMNS: &str = "user_id, first_name, last_name, email, phone, password_hash, \
                            user_type, token, refresh_token, created_at, updated_at";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// User store over the `users` table
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Which unique field a constraint violation refers to
fn duplicate_field(constraint: Option<&str>) -> UserField {
    match constraint {
        Some(name) if name.contains("phone") => UserField::Phone,
        Some(name) if name.contains("pkey") || name.contains("user_id") => UserField::UserId,
        _ => UserField::Email,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn count_by_field(&self, field: UserField, value: &str) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM users WHERE {} = $1", field.column());
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn find_by_field(&self, field: UserField, value: &str) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, field.column());
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn insert_user(&self, record: &UserRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (user_id, first_name, last_name, email, phone, password_hash,
                               user_type, token, refresh_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&record.user_id)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.password_hash)
        .bind(&record.user_type)
        .bind(&record.token)
        .bind(&record.refresh_token)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Duplicate(duplicate_field(db_err.constraint())))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn upsert_token_fields(&self, user_id: &str, fields: &TokenFields) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET token = $2, refresh_token = $3, updated_at = $4
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(&fields.access_token)
        .bind(&fields.refresh_token)
        .bind(fields.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self, offset: u64, limit: u64) -> Result<(Vec<UserRecord>, u64), StoreError> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at, user_id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok((users, total.max(0) as u64))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
