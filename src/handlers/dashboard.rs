use actix_web::{web, HttpRequest, HttpResponse};

use crate::services::onboarding::DASHBOARD_FAILED;
use crate::state::AppState;

use super::bearer_token;

/// Only reachable once onboarding is complete.
pub async fn summary(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    match state.onboarding.dashboard(bearer_token(&req)).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => e.into_response(DASHBOARD_FAILED),
    }
}
