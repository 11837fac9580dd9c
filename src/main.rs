//! Inkpress - An AI-assisted blog backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkpress::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{SqlxBlogRepository, SqlxGenerationRepository, SqlxTokenRepository},
    },
    llm::HttpChatClient,
    services::{BlogService, GenerationService},
    store,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkpress=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Inkpress blog backend...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Initialize object storage
    let object_store = store::create_store(&config.storage)?;
    tracing::info!("Object store initialized: {:?}", config.storage.driver);

    // LLM client; generation endpoints fail without a key but the rest of
    // the API stays up
    if config.llm.api_key.is_none() {
        tracing::warn!("No LLM API key configured; generation endpoints will be unavailable");
    }
    let chat_client = Arc::new(HttpChatClient::new(&config.llm)?);

    // Create repositories
    let blog_repo = SqlxBlogRepository::boxed(pool.clone());
    let generation_repo = SqlxGenerationRepository::boxed(pool.clone());
    let token_repo = SqlxTokenRepository::boxed(pool.clone());

    // Initialize services
    let blog_service = Arc::new(BlogService::new(blog_repo.clone(), object_store));
    let generation_service = Arc::new(GenerationService::new(
        chat_client,
        generation_repo,
        blog_repo,
        &config.llm,
    ));

    // Build application state
    let state = AppState {
        blog_service,
        generation_service,
        tokens: token_repo,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin)?;

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
