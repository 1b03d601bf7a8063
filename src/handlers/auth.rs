use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::error::{OnboardingError, StepFailure};
use crate::models::{LoginInput, RegisterInput, StepFields};
use crate::services::auth::{LOGIN_FAILED, LOGOUT_FAILED, REGISTER_FAILED};
use crate::state::AppState;

use super::bearer_token;

pub async fn register(
    data: web::Json<StepFields>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let input = RegisterInput::from_fields(&data.into_inner());

    match state.auth.register(&input).await {
        Ok(user_id) => HttpResponse::Created().json(json!({
            "message": "User registered successfully",
            "user": { "id": user_id, "email": input.email.trim().to_lowercase() }
        })),
        Err(e) => e.into_response(REGISTER_FAILED),
    }
}

pub async fn login(
    data: web::Json<LoginInput>,
    state: web::Data<AppState>,
) -> HttpResponse {
    match state.auth.login(&data.into_inner()).await {
        Ok(session) => HttpResponse::Ok().json(json!({
            "message": "Login successful",
            "user": { "id": session.user_id },
            "token": session.token,
            "expires_at": session.expires_at
        })),
        Err(e) => e.into_response(LOGIN_FAILED),
    }
}

pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let Some(token) = bearer_token(&req) else {
        return OnboardingError::Unauthenticated.into_response(LOGOUT_FAILED);
    };
    match state.auth.logout(token).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::Value::Null),
        Err(e) => e.into_response(LOGOUT_FAILED),
    }
}

pub async fn me(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    match state.auth.current_user(bearer_token(&req)).await {
        Ok(Some(user)) => HttpResponse::Ok().json(user),
        Ok(None) => HttpResponse::Unauthorized().json(StepFailure::message("You must be logged in")),
        Err(e) => e.into_response("An error occurred while loading your profile"),
    }
}
