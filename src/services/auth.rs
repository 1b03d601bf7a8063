use rand::distr::Alphanumeric;
use rand::Rng;
use std::sync::Arc;

use crate::error::{OnboardingError, OnboardingResult};
use crate::identity::{IdentityGateway, Session};
use crate::models::{LoginInput, RegisterInput, User, UserProfile};
use crate::store::RecordStore;
use crate::validation;

pub const REGISTER_FAILED: &str = "An error occurred during registration";
pub const LOGIN_FAILED: &str = "An error occurred during login";
pub const LOGOUT_FAILED: &str = "An error occurred during logout";

#[derive(Clone)]
pub struct AuthService {
    identity: Arc<dyn IdentityGateway>,
    store: RecordStore,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityGateway>, store: RecordStore, bcrypt_cost: u32) -> Self {
        Self { identity, store, bcrypt_cost }
    }

    /// Creates the identity account and the profile row. Returns the new user id.
    /// No verification mail is sent; the token is only stored.
    pub async fn register(&self, input: &RegisterInput) -> OnboardingResult<String> {
        let data = validation::validate_registration(input).map_err(OnboardingError::Validation)?;

        if self.store.email_exists(&data.email).await? {
            return Err(OnboardingError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let account = self.identity.sign_up(&data.email, &data.password).await?;
        if let Err(e) = self.create_profile(&account.id, data).await {
            // Without its profile the account could never register again.
            tracing::warn!(user_id = %account.id, error = %e, "profile insert failed, removing identity");
            if let Err(cleanup) = self.identity.delete_account(&account.id).await {
                tracing::error!(user_id = %account.id, error = %cleanup, "failed to remove identity");
            }
            return Err(e);
        }

        tracing::info!(user_id = %account.id, "user registered");
        Ok(account.id)
    }

    async fn create_profile(&self, id: &str, data: RegisterInput) -> OnboardingResult<()> {
        let password_hash = bcrypt::hash(&data.password, self.bcrypt_cost)?;
        let user = User {
            id: id.to_string(),
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email,
            password_hash,
            is_email_verified: false,
            verification_token: Some(verification_token()),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.store.insert_user(&user).await
    }

    pub async fn login(&self, input: &LoginInput) -> OnboardingResult<Session> {
        let data = validation::validate_login(input).map_err(OnboardingError::Validation)?;

        match self.identity.sign_in_with_password(&data.email, &data.password).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user_id, "signed in");
                Ok(session)
            }
            Err(OnboardingError::Unexpected(e)) => Err(OnboardingError::Unexpected(e)),
            Err(e) => {
                tracing::warn!(error = %e, "sign in rejected");
                Err(OnboardingError::InvalidCredentials)
            }
        }
    }

    pub async fn logout(&self, token: &str) -> OnboardingResult<()> {
        self.identity.sign_out(token).await
    }

    /// `None` when the token is missing, unknown or expired.
    pub async fn current_user(&self, token: Option<&str>) -> OnboardingResult<Option<UserProfile>> {
        match super::resolve_user(self.identity.as_ref(), &self.store, token).await {
            Ok(user) => Ok(Some(user)),
            Err(OnboardingError::Unauthenticated) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn verification_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(13)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::identity::SqliteIdentity;

    async fn service() -> AuthService {
        let pool = memory_pool().await.unwrap();
        let identity = Arc::new(SqliteIdentity::new(pool.clone(), chrono::Duration::days(30), 4));
        AuthService::new(identity, RecordStore::new(pool), 4)
    }

    fn juan() -> RegisterInput {
        RegisterInput {
            first_name: "Juan".into(),
            last_name: "Dela Cruz".into(),
            email: "juan@example.com".into(),
            password: "abcd1234".into(),
        }
    }

    #[tokio::test]
    async fn register_login_and_resolve() {
        let auth = service().await;
        let user_id = auth.register(&juan()).await.unwrap();

        let session = auth
            .login(&LoginInput { email: "juan@example.com".into(), password: "abcd1234".into() })
            .await
            .unwrap();
        assert_eq!(session.user_id, user_id);

        let me = auth.current_user(Some(&session.token)).await.unwrap().unwrap();
        assert_eq!(me.first_name, "Juan");
        assert!(!me.is_email_verified);

        auth.logout(&session.token).await.unwrap();
        assert!(auth.current_user(Some(&session.token)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stores_verification_token_and_hash() {
        let auth = service().await;
        let user_id = auth.register(&juan()).await.unwrap();
        let user = auth.store.find_user(&user_id).await.unwrap().unwrap();
        assert_eq!(user.verification_token.as_deref().map(str::len), Some(13));
        assert!(bcrypt::verify("abcd1234", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_registration_is_conflict() {
        let auth = service().await;
        auth.register(&juan()).await.unwrap();
        let err = auth.register(&juan()).await.unwrap_err();
        assert_eq!(err.to_string(), "User with this email already exists");
    }

    #[tokio::test]
    async fn invalid_registration_never_creates_identity() {
        let auth = service().await;
        let mut input = juan();
        input.password = "short".into();
        assert!(matches!(
            auth.register(&input).await.unwrap_err(),
            OnboardingError::Validation(_)
        ));
        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM identities")
            .fetch_one(auth.store.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn failed_profile_insert_leaves_email_registrable() {
        let auth = service().await;
        sqlx::query(
            "CREATE TRIGGER reject_profiles BEFORE INSERT ON users \
             BEGIN SELECT RAISE(ABORT, 'profile insert rejected'); END",
        )
        .execute(auth.store.pool())
        .await
        .unwrap();

        let err = auth.register(&juan()).await.unwrap_err();
        assert!(matches!(err, OnboardingError::Store(_)));
        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM identities")
            .fetch_one(auth.store.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);

        sqlx::query("DROP TRIGGER reject_profiles")
            .execute(auth.store.pool())
            .await
            .unwrap();
        assert!(auth.register(&juan()).await.is_ok());
    }

    #[tokio::test]
    async fn bad_password_reads_as_invalid_credentials() {
        let auth = service().await;
        auth.register(&juan()).await.unwrap();
        let err = auth
            .login(&LoginInput { email: "juan@example.com".into(), password: "nope12345".into() })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn missing_token_is_no_user() {
        let auth = service().await;
        assert!(auth.current_user(None).await.unwrap().is_none());
        assert!(auth.current_user(Some("not-a-token")).await.unwrap().is_none());
    }
}
