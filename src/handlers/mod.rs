pub mod auth;
pub mod onboarding;
pub mod dashboard;

use actix_web::error::InternalError;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::error::StepFailure;
use crate::state::AppState;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health_check))

        .route("/api/auth/register", web::post().to(auth::register))
        .route("/api/auth/login", web::post().to(auth::login))
        .route("/api/auth/logout", web::post().to(auth::logout))
        .route("/api/auth/me", web::get().to(auth::me))

        .route("/api/onboarding/business", web::post().to(onboarding::save_business))
        .route("/api/onboarding/tax", web::post().to(onboarding::save_tax_info))
        .route("/api/onboarding/preferences", web::post().to(onboarding::save_preferences))
        .route("/api/onboarding/status", web::get().to(onboarding::status))
        .route("/api/onboarding/complete", web::post().to(onboarding::complete))

        .route("/api/dashboard", web::get().to(dashboard::summary));
}

/// Malformed JSON gets the same `{message}` body as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = StepFailure::message(format!("Invalid request body: {}", err));
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// Token from `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .is_ok();

    HttpResponse::Ok().json(json!({
        "status": if database { "OK" } else { "DEGRADED" },
        "database": database,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc-123"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc-123"));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic xyz"))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&req), None);
    }
}
