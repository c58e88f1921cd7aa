use std::sync::Arc;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod domain;
mod error;
mod model;
mod models;
mod repository;
mod routes;
mod service;
mod utils;

use crate::config::Config;
use crate::db::init_db;
use crate::docs::ApiDoc;
use crate::repository::{Repository, mysql::MySqlRepository};
use crate::routes::RateLimits;
use crate::utils::email_registry::EmailRegistry;

#[get("/")]
async fn index() -> impl Responder {
    "Hello World!"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url)
        .await
        .context("failed to initialise database")?;
    let limits = RateLimits::from_config(&config)?;

    let repo: Arc<dyn Repository> = Arc::new(MySqlRepository::new(pool.clone()));
    let repo = Data::from(repo);
    let registry = Data::new(EmailRegistry::new());

    let filter_registry = registry.clone();
    let filter_pool = pool.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = filter_registry.warmup_filter(&filter_pool, 100).await {
            error!(error = %e, "Failed to warm up email filter");
        }
    });

    let cache_registry = registry.clone();
    let cache_pool = pool.clone();
    actix_web::rt::spawn(async move {
        // last 30 days of registrations, in batches of 250
        if let Err(e) = cache_registry.warmup_cache(&cache_pool, 30, 250).await {
            error!(error = %e, "Failed to warm up email cache");
        }
    });

    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard so JS/CSS assets resolve
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(repo.clone())
            .app_data(registry.clone())
            .app_data(config_data.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config, &limits))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
