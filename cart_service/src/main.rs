// cart_service/src/main.rs

use cart_service::config::{AppConfig, LogFormat, StorageBackend};
use cart_service::store::{CartRepository, MemoryStore, PgStore, ProductCatalog};
use cart_service::{build_app_state, web as cart_web};

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(env_filter) // RUST_LOG overrides the default level
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = AppConfig::from_env().context("Failed to load application configuration")?;
  init_tracing(app_config.log_format);
  tracing::info!(backend = ?app_config.storage_backend, "Starting cart service...");

  let (products, carts): (Arc<dyn ProductCatalog>, Arc<dyn CartRepository>) = match app_config.storage_backend {
    StorageBackend::Postgres => {
      let database_url = app_config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres backend")?;
      let pool = PgPoolOptions::new()
        .max_connections(app_config.database_max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to the database")?;
      tracing::info!("Successfully connected to the database.");

      if app_config.run_migrations {
        sqlx::migrate!("./migrations")
          .run(&pool)
          .await
          .context("Failed to run database migrations")?;
        tracing::info!("Database migrations applied.");
      }

      let store = Arc::new(PgStore::new(pool));
      (store.clone() as Arc<dyn ProductCatalog>, store as Arc<dyn CartRepository>)
    }
    StorageBackend::Memory => {
      tracing::warn!("Using the in-memory store; carts are lost on restart.");
      let store = Arc::new(MemoryStore::new());
      (store.clone() as Arc<dyn ProductCatalog>, store as Arc<dyn CartRepository>)
    }
  };

  let app_state = build_app_state(products, carts)?;

  let server_address = app_config.server_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(cart_web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
