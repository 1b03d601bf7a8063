pub mod auth;
pub mod onboarding;

use crate::error::{OnboardingError, OnboardingResult};
use crate::identity::IdentityGateway;
use crate::models::UserProfile;
use crate::store::RecordStore;

pub use auth::AuthService;
pub use onboarding::{DashboardSummary, OnboardingService};

/// Resolves a bearer token to the signed-in user's profile.
///
/// A session whose profile row is missing counts as signed out.
pub(crate) async fn resolve_user(
    identity: &dyn IdentityGateway,
    store: &RecordStore,
    token: Option<&str>,
) -> OnboardingResult<UserProfile> {
    let token = token.ok_or(OnboardingError::Unauthenticated)?;
    let session = identity
        .get_session(token)
        .await?
        .ok_or(OnboardingError::Unauthenticated)?;
    let user = store
        .find_user(&session.user_id)
        .await?
        .ok_or(OnboardingError::Unauthenticated)?;
    Ok(user.into())
}
