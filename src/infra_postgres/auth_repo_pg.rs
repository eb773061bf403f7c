use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgAuthRepo {
    pool: PgPool,
}

impl PgAuthRepo {
    pub fn new(pool: PgPool) -> Self {
        PgAuthRepo { pool }
    }

    fn row_to_record(row: PgRow) -> Result<AuthCredentialsRecord, AuthError> {
        let user_id: UserId = row
            .try_get("id")
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        let username: String = row
            .try_get("username")
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;

        Ok(AuthCredentialsRecord {
            user_id,
            username,
            password_hash,
            created_at,
        })
    }
}

#[async_trait::async_trait]
impl AuthRepo for PgAuthRepo {
    async fn create_credentials(
        &self,
        user_id: UserId,
        username: &str,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        sqlx::query(
            r#"
INSERT INTO users (id, username, password_hash)
VALUES ($1, $2, $3)
"#,
        )
        .bind(user_id)
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;

        Ok(())
    }

    async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AuthCredentialsRecord>, AuthError> {
        let row_opt: Option<PgRow> = sqlx::query(
            r#"
SELECT id, username, password_hash, created_at
FROM users
WHERE username = $1
"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn count_users(&self) -> Result<i64, AuthError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM users"#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;

        Ok(count)
    }
}
