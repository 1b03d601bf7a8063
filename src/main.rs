use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};

use saribooks_backend::config::Config;
use saribooks_backend::state::AppState;
use saribooks_backend::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "saribooks_backend=info,actix_web=info".into()),
        )
        .init();

    let config = Config::from_env();

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("Failed to initialize SQLite pool");
    tracing::info!(database_url = %config.database_url, "database ready");

    let app_state = web::Data::new(AppState::new(pool, &config));

    tracing::info!(addr = %config.bind_addr, port = config.port, "starting SariBooks onboarding server");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .wrap(Cors::permissive())
            .app_data(app_state.clone())
            .configure(handlers::routes)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
