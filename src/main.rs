use std::sync::Arc;

use reqwest::Client as HttpClient;
use tracing_subscriber::EnvFilter;

use tastebuddy_api::{
    config::Config,
    db::{self, PgPreferenceStore},
    routes::{create_router, AppState},
    services::providers::{OpenAiProvider, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    if config.openai_api_key.is_none() {
        tracing::warn!(
            "OPENAI_API_KEY has not been provided in this environment. \
             Will use the optional keys incoming from clients, which is not recommended."
        );
    }

    let pool = db::create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;

    let http_client = HttpClient::new();

    let chat = OpenAiProvider::new(
        http_client.clone(),
        config.openai_api_url.clone(),
        config.openai_api_key.clone(),
    );

    let posters = config.tmdb_api_key.clone().map(|api_key| {
        Arc::new(TmdbProvider::new(
            http_client.clone(),
            config.tmdb_api_url.clone(),
            api_key,
        ))
    });

    let state = Arc::new(AppState {
        store: Arc::new(PgPreferenceStore::new(pool)),
        chat: Arc::new(chat),
        posters,
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "TasteBuddy API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
