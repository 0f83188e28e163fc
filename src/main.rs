//! Server binary: load settings and model, prepare the database, serve the API and static files.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use travel_api::{
    app, apply_migrations, connect, ensure_database_exists, load_from_file, resolve, travel_model, AppState,
    Settings,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("travel_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;

    let config = match &settings.model_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading model");
            load_from_file(path).await?
        }
        None => travel_model()?,
    };
    let model = resolve(&config)?;

    ensure_database_exists(&settings.database_url).await?;
    let pool = connect(&settings.database_url, settings.max_connections).await?;
    tracing::info!("connected to database");

    if settings.auto_migrate {
        apply_migrations(&pool, &config).await?;
    }

    let state = AppState {
        pool,
        model: Arc::new(model),
        config: Arc::new(config),
    };
    let router = app(state, &settings);

    let listener = TcpListener::bind(settings.bind_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
