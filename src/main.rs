use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::middleware;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use scholar_recs::{
    api::{create_router, AppState, Models},
    config::Config,
    db::{create_pool, DocumentStore, MemoryStore, PostgresStore},
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{
        inference::{load_collaborative_model, load_content_model},
        GoogleIdentityProvider,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scholar_recs=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;

    // 1. Document store
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            Arc::new(PostgresStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    // 2. Trained models, absent when their weights cannot be loaded
    let models = Models {
        content: load_content_model(Path::new(&config.content_model_path)),
        collaborative: load_collaborative_model(Path::new(&config.collaborative_model_path)),
    };

    // 3. Identity provider
    let identity = Arc::new(GoogleIdentityProvider::new(
        config.google_tokeninfo_url.clone(),
        config.google_client_id.clone(),
    ));

    let state = AppState::initialize(store, identity, models, config.default_recommendations).await;

    // Request ids are assigned before the trace span is created
    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
            .layer(CorsLayer::permissive()),
    );

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
