use anyhow::{Context, Result};
use faq_service::cache::{FaqCache, MemoryCache, RedisCache};
use faq_service::config::Config;
use faq_service::db::PgFaqStore;
use faq_service::faq::FaqService;
use faq_service::metrics::FaqMetrics;
use faq_service::server::{self, AppState};
use faq_service::translation::{GoogleTranslator, TranslationGateway};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when the environment is already set)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("faq_service=info".parse()?),
        )
        .init();

    info!("Starting FAQ service");

    let config = Config::from_env()?;

    let store = Arc::new(
        PgFaqStore::connect(&config.database_url, config.database_max_connections)
            .await
            .context("Failed to connect to PostgreSQL")?,
    );

    let cache: Arc<dyn FaqCache> = match &config.redis_url {
        Some(url) => Arc::new(
            RedisCache::connect(url)
                .await
                .context("Failed to connect to Redis")?,
        ),
        None => {
            warn!("REDIS_URL not set, caching FAQ lists in process memory");
            Arc::new(MemoryCache::new())
        }
    };

    if config.api_key.is_none() {
        warn!("API_KEY not set, every write request will be rejected");
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;
    let translator = Arc::new(GoogleTranslator::new(client, config.translate_api_url.clone()));

    let metrics = Arc::new(FaqMetrics::new());
    let gateway = TranslationGateway::new(translator, config.translation_pacing, metrics.clone());
    let service = FaqService::new(store.clone(), cache, gateway, metrics)
        .with_cache_ttl(config.cache_ttl);

    let state = AppState {
        service: Arc::new(service),
        api_key: config.api_key.as_deref().map(Arc::from),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    server::serve(addr, server::router(state)).await?;

    store.close().await;
    info!("FAQ service stopped");
    Ok(())
}
