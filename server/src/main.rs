//! Pet shop API server.
//!
//! Run from repo root: `cargo run -p petshop-server`

use petshop::{app, ensure_database_exists, ensure_tables, AppState, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("petshop=info,petshop_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;
    ensure_tables(&pool, &settings.schema).await?;

    let state = AppState::postgres(pool, &settings.schema);
    let router = app(state, settings.body_limit);
    let listener = TcpListener::bind(settings.bind).await?;
    tracing::info!("petshop listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
