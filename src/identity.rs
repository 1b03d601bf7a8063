use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{OnboardingError, OnboardingResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: String,
}

/// Credential storage and session issuance.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> OnboardingResult<IdentityUser>;
    async fn sign_in_with_password(&self, email: &str, password: &str) -> OnboardingResult<Session>;
    async fn sign_out(&self, token: &str) -> OnboardingResult<()>;
    /// Removes the account and any sessions it holds.
    async fn delete_account(&self, user_id: &str) -> OnboardingResult<()>;
    /// `None` for unknown or expired tokens.
    async fn get_session(&self, token: &str) -> OnboardingResult<Option<Session>>;
}

/// bcrypt hashes and opaque uuid session tokens in SQLite.
#[derive(Clone)]
pub struct SqliteIdentity {
    pool: SqlitePool,
    session_ttl: Duration,
    bcrypt_cost: u32,
}

impl SqliteIdentity {
    pub fn new(pool: SqlitePool, session_ttl: Duration, bcrypt_cost: u32) -> Self {
        Self { pool, session_ttl, bcrypt_cost }
    }

    async fn issue_session(&self, user_id: &str) -> OnboardingResult<Session> {
        let token = Uuid::new_v4().to_string();
        let now = Utc::now();
        let expires_at = (now + self.session_ttl).to_rfc3339();

        let pruned = sqlx::query("DELETE FROM sessions WHERE user_id = ? AND expires_at <= ?")
            .bind(user_id)
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await?
            .rows_affected();
        if pruned > 0 {
            tracing::debug!(user_id, pruned, "expired sessions removed");
        }

        sqlx::query(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)"
        )
        .bind(&token)
        .bind(user_id)
        .bind(now.to_rfc3339())
        .bind(&expires_at)
        .execute(&self.pool)
        .await?;

        Ok(Session { token, user_id: user_id.to_string(), expires_at })
    }
}

#[async_trait]
impl IdentityGateway for SqliteIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> OnboardingResult<IdentityUser> {
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(1) FROM identities WHERE email = ?"
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        if existing > 0 {
            return Err(OnboardingError::Conflict("User already registered".to_string()));
        }

        let hashed_password = bcrypt::hash(password, self.bcrypt_cost)?;
        let user = IdentityUser {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
        };

        sqlx::query(
            "INSERT INTO identities (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)"
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&hashed_password)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id = %user.id, "identity created");
        Ok(user)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> OnboardingResult<Session> {
        let row = sqlx::query(
            "SELECT id, password_hash FROM identities WHERE email = ? LIMIT 1"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(OnboardingError::InvalidCredentials);
        };
        let id: String = row.get("id");
        let password_hash: String = row.get("password_hash");

        let is_valid = bcrypt::verify(password, &password_hash).unwrap_or(false);
        if !is_valid {
            return Err(OnboardingError::InvalidCredentials);
        }

        self.issue_session(&id).await
    }

    async fn sign_out(&self, token: &str) -> OnboardingResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_account(&self, user_id: &str) -> OnboardingResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut tx)
            .await?;
        sqlx::query("DELETE FROM identities WHERE id = ?")
            .bind(user_id)
            .execute(&mut tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> OnboardingResult<Option<Session>> {
        let row = sqlx::query(
            "SELECT token, user_id, expires_at FROM sessions WHERE token = ?"
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let expires_at: Option<String> = row.get("expires_at");
        let expires_at = expires_at.unwrap_or_default();

        let expired = DateTime::parse_from_rfc3339(&expires_at)
            .map(|at| at.with_timezone(&Utc) <= Utc::now())
            .unwrap_or(true);
        if expired {
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(token)
                .execute(&self.pool)
                .await?;
            return Ok(None);
        }

        Ok(Some(Session {
            token: row.get("token"),
            user_id: row.get("user_id"),
            expires_at,
        }))
    }
}
