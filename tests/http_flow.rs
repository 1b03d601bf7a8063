use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use saribooks_backend::state::AppState;
use saribooks_backend::{db, handlers};

async fn state() -> web::Data<AppState> {
    let pool = db::memory_pool().await.unwrap();
    web::Data::new(AppState::with_settings(pool, chrono::Duration::days(30), 4))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state.clone()).configure(handlers::routes)).await
    };
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

#[actix_web::test]
async fn register_login_onboard_and_reach_dashboard() {
    let state = state().await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "firstName": "Juan",
            "lastName": "Dela Cruz",
            "email": "juan@example.com",
            "password": "abcd1234"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "juan@example.com", "password": "abcd1234" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/dashboard")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let steps = [
        (
            "/api/onboarding/business",
            json!({
                "businessName": "Sari-Sari Store",
                "businessType": "Sole Proprietorship",
                "industry": "Retail"
            }),
        ),
        (
            "/api/onboarding/tax",
            json!({
                "tinNumber": "123456789",
                "vatRegistered": "false",
                "fiscalYearEnd": "December 31"
            }),
        ),
        (
            "/api/onboarding/preferences",
            json!({
                "accountingMethod": "cash",
                "chartOfAccounts": "simplified",
                "currencyPreference": "PHP",
                "digitalReceipts": "true"
            }),
        ),
    ];
    for (uri, fields) in steps {
        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header(bearer(&token))
            .set_json(fields)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, Value::Null);
    }

    let req = test::TestRequest::post()
        .uri("/api/onboarding/complete")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/dashboard")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["first_name"], "Juan");
    assert_eq!(body["business_name"], "Sari-Sari Store");
    assert_eq!(body["tin_number"], "123456789");
    assert_eq!(body["vat_registered"], false);
}

#[actix_web::test]
async fn step_without_session_is_unauthorized() {
    let state = state().await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/onboarding/business")
        .set_json(json!({ "businessName": "Sari-Sari Store" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "message": "You must be logged in" }));
}

#[actix_web::test]
async fn validation_errors_are_reported_per_field() {
    let state = state().await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "firstName": "J", "lastName": "Dela Cruz", "email": "nope", "password": "abcdefgh" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"]["firstName"][0], "First name must be at least 2 characters");
    assert_eq!(body["errors"]["email"][0], "Invalid email address");
    assert_eq!(body["errors"]["password"][0], "Password must contain at least one number");
    assert!(body["errors"].get("lastName").is_none());
}

#[actix_web::test]
async fn malformed_json_uses_failure_shape() {
    let state = state().await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));
}

#[actix_web::test]
async fn health_reports_database() {
    let state = state().await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["database"], true);
}
