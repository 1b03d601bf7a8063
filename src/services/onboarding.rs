use serde::Serialize;
use std::sync::Arc;

use crate::error::{OnboardingError, OnboardingResult};
use crate::identity::IdentityGateway;
use crate::models::{BusinessInput, PreferencesInput, TaxInput, UserProfile};
use crate::store::{OnboardingStatus, RecordStore};
use crate::validation;

pub const SAVE_BUSINESS_FAILED: &str = "An error occurred while saving business information";
pub const SAVE_TAX_FAILED: &str = "An error occurred while saving tax information";
pub const SAVE_PREFERENCES_FAILED: &str = "An error occurred while saving preferences";
pub const COMPLETE_FAILED: &str = "An error occurred while completing onboarding";
pub const DASHBOARD_FAILED: &str = "An error occurred while loading the dashboard";

const BUSINESS_PROFILE: &str = "Business profile";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardSummary {
    pub first_name: String,
    pub business_name: String,
    pub business_type: String,
    pub tin_number: Option<String>,
    pub vat_registered: Option<bool>,
}

/// Persists the three onboarding steps for the signed-in user.
///
/// Every operation resolves the caller from the session token first, then
/// validates, then writes. Validation failures never reach the store.
#[derive(Clone)]
pub struct OnboardingService {
    identity: Arc<dyn IdentityGateway>,
    store: RecordStore,
}

impl OnboardingService {
    pub fn new(identity: Arc<dyn IdentityGateway>, store: RecordStore) -> Self {
        Self { identity, store }
    }

    async fn authenticate(&self, token: Option<&str>) -> OnboardingResult<UserProfile> {
        super::resolve_user(self.identity.as_ref(), &self.store, token).await
    }

    async fn business_id(&self, owner_id: &str) -> OnboardingResult<String> {
        self.store
            .find_business_id(owner_id)
            .await?
            .ok_or(OnboardingError::PrerequisiteMissing(BUSINESS_PROFILE))
    }

    pub async fn save_business(&self, token: Option<&str>, input: &BusinessInput) -> OnboardingResult<()> {
        let user = self.authenticate(token).await?;
        let info = validation::validate_business(input).map_err(OnboardingError::Validation)?;

        let business_id = self.store.upsert_business(&user.id, &info).await?;
        tracing::info!(user_id = %user.id, business_id = %business_id, "business profile saved");
        Ok(())
    }

    pub async fn save_tax_info(&self, token: Option<&str>, input: &TaxInput) -> OnboardingResult<()> {
        let user = self.authenticate(token).await?;
        let info = validation::validate_tax(input).map_err(OnboardingError::Validation)?;
        let business_id = self.business_id(&user.id).await?;

        self.store.upsert_tax_profile(&business_id, &info).await?;
        tracing::info!(user_id = %user.id, business_id = %business_id, "tax profile saved");
        Ok(())
    }

    pub async fn save_preferences(&self, token: Option<&str>, input: &PreferencesInput) -> OnboardingResult<()> {
        let user = self.authenticate(token).await?;
        let prefs = validation::validate_preferences(input).map_err(OnboardingError::Validation)?;
        let business_id = self.business_id(&user.id).await?;

        self.store.upsert_preferences(&business_id, &prefs).await?;
        tracing::info!(user_id = %user.id, business_id = %business_id, "bookkeeping preferences saved");
        Ok(())
    }

    pub async fn status(&self, token: Option<&str>) -> OnboardingResult<OnboardingStatus> {
        let user = self.authenticate(token).await?;
        self.store.onboarding_status(&user.id).await
    }

    /// Reads the store again rather than trusting any client-side progress.
    pub async fn complete_onboarding(&self, token: Option<&str>) -> OnboardingResult<()> {
        let user = self.authenticate(token).await?;
        let status = self.store.onboarding_status(&user.id).await?;
        if !status.is_complete() {
            tracing::debug!(user_id = %user.id, ?status, "onboarding incomplete");
            return Err(OnboardingError::OnboardingIncomplete);
        }
        tracing::info!(user_id = %user.id, "onboarding complete");
        Ok(())
    }

    pub async fn dashboard(&self, token: Option<&str>) -> OnboardingResult<DashboardSummary> {
        let user = self.authenticate(token).await?;
        if !self.store.onboarding_status(&user.id).await?.is_complete() {
            return Err(OnboardingError::OnboardingIncomplete);
        }

        let business = self
            .store
            .find_business(&user.id)
            .await?
            .ok_or(OnboardingError::OnboardingIncomplete)?;
        let tax = self.store.find_tax_profile(&business.id).await?;

        Ok(DashboardSummary {
            first_name: user.first_name,
            business_name: business.name,
            business_type: business.business_type,
            tin_number: tax.as_ref().map(|t| t.tin_number.clone()),
            vat_registered: tax.map(|t| t.vat_registered),
        })
    }
}
