// storefront/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use storefront::config::AppConfig;
use storefront::errors::AppError;
use storefront::state::AppState;
use storefront::{db, pipelines, uploads, web};
use storefront_flow::FlowRegistry;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

async fn bootstrap() -> Result<AppState, AppError> {
  let app_config = Arc::new(AppConfig::from_env()?);

  let db_pool = db::connect(&app_config.database_url, app_config.db_max_connections).await?;
  tracing::info!("Successfully connected to the database.");

  if app_config.run_migrations {
    db::run_migrations(&db_pool).await?;
    tracing::info!("Database migrations applied.");
  }

  if let Some((email, password)) = &app_config.seed_admin {
    if db::users::seed_admin(&db_pool, email, password).await? {
      tracing::info!(%email, "Bootstrap admin account created.");
    }
  }

  tokio::fs::create_dir_all(&app_config.uploads_dir).await?;

  let flows = Arc::new(FlowRegistry::<AppError>::new());
  let app_state = AppState {
    db_pool,
    flows: flows.clone(),
    config: app_config,
  };
  pipelines::register_all_pipelines(&flows, &app_state)?;
  Ok(app_state)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let app_state = match bootstrap().await {
    Ok(state) => state,
    Err(e) => {
      tracing::error!(error = %e, "Startup failed.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  let server_address = format!("{}:{}", app_state.config.server_host, app_state.config.server_port);
  let uploads_dir = app_state.config.uploads_dir.clone();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
      .service(actix_files::Files::new(uploads::PUBLIC_PREFIX, uploads_dir.clone()))
  })
  .bind(&server_address)?
  .run()
  .await
}
