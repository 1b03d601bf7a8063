use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::Config;
use crate::identity::{IdentityGateway, SqliteIdentity};
use crate::services::{AuthService, OnboardingService};
use crate::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub auth: AuthService,
    pub onboarding: OnboardingService,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self::with_settings(
            pool,
            chrono::Duration::days(config.session_ttl_days),
            config.bcrypt_cost,
        )
    }

    pub fn with_settings(pool: SqlitePool, session_ttl: chrono::Duration, bcrypt_cost: u32) -> Self {
        let identity: Arc<dyn IdentityGateway> =
            Arc::new(SqliteIdentity::new(pool.clone(), session_ttl, bcrypt_cost));
        let store = RecordStore::new(pool.clone());
        Self {
            auth: AuthService::new(identity.clone(), store.clone(), bcrypt_cost),
            onboarding: OnboardingService::new(identity, store),
            pool,
        }
    }
}
