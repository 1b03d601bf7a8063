use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::models::{BusinessInput, PreferencesInput, StepFields, TaxInput};
use crate::services::onboarding::{
    COMPLETE_FAILED, SAVE_BUSINESS_FAILED, SAVE_PREFERENCES_FAILED, SAVE_TAX_FAILED,
};
use crate::error::OnboardingResult;
use crate::state::AppState;

use super::bearer_token;

/// Step endpoints answer `null` on success, like the form surface expects.
fn step_reply(result: OnboardingResult<()>, fallback: &str) -> HttpResponse {
    match result {
        Ok(()) => HttpResponse::Ok().json(serde_json::Value::Null),
        Err(e) => e.into_response(fallback),
    }
}

pub async fn save_business(
    req: HttpRequest,
    data: web::Json<StepFields>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let input = BusinessInput::from_fields(&data);
    let result = state.onboarding.save_business(bearer_token(&req), &input).await;
    step_reply(result, SAVE_BUSINESS_FAILED)
}

pub async fn save_tax_info(
    req: HttpRequest,
    data: web::Json<StepFields>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let input = TaxInput::from_fields(&data);
    let result = state.onboarding.save_tax_info(bearer_token(&req), &input).await;
    step_reply(result, SAVE_TAX_FAILED)
}

pub async fn save_preferences(
    req: HttpRequest,
    data: web::Json<StepFields>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let input = PreferencesInput::from_fields(&data);
    let result = state.onboarding.save_preferences(bearer_token(&req), &input).await;
    step_reply(result, SAVE_PREFERENCES_FAILED)
}

pub async fn status(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    match state.onboarding.status(bearer_token(&req)).await {
        Ok(s) => HttpResponse::Ok().json(json!({
            "business": s.business,
            "tax_profile": s.tax_profile,
            "preferences": s.preferences,
            "complete": s.is_complete()
        })),
        Err(e) => e.into_response("An error occurred while loading onboarding status"),
    }
}

pub async fn complete(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let result = state.onboarding.complete_onboarding(bearer_token(&req)).await;
    step_reply(result, COMPLETE_FAILED)
}
