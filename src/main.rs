use anyhow::Context;
use newsroom_api::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    notifier::{LogNotifier, NotifierState},
    repository::{InMemoryRepository, PostgresRepository, RepositoryState},
    storage::{LocalStorage, S3StorageClient, StorageState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, installs the log subscriber, connects the store and the image
/// storage, then serves the router until the process is stopped.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = AppConfig::load().context("invalid configuration")?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "newsroom_api=debug,tower_http=info".into());

    // Pretty output for humans locally, JSON lines for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    let repo: RepositoryState = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await
                .context("failed to connect to Postgres, check DATABASE_URL")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to apply database migrations")?;

            Arc::new(PostgresRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            Arc::new(InMemoryRepository::new())
        }
    };

    let storage: StorageState = match config.env {
        Env::Local => Arc::new(LocalStorage::new(&config.upload_dir)),
        Env::Production => Arc::new(S3StorageClient::new(
            &config.s3_endpoint,
            &config.s3_region,
            &config.s3_key,
            &config.s3_secret,
            &config.s3_bucket,
        )),
    };
    storage
        .ensure_ready()
        .await
        .context("image storage is not usable")?;

    let notifier: NotifierState = Arc::new(LogNotifier);

    let port = config.port;
    let app = create_router(AppState::new(config, repo, storage, notifier));

    let address = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!("Listening on {address}");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:{port}/swagger-ui");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
