use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use judge_client::Judge0Client;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{Level, info, warn};

use server::cache::{MemoryCache, RedisCache, TestcaseCache};
use server::config::{AppConfig, CorsConfig};
use server::database::init_db;
use server::seed;
use server::state::AppState;

fn cors_layer(cfg: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(cfg.max_age));

    if cfg.allow_origins.is_empty() {
        Ok(layer.allow_origin(Any))
    } else {
        let origins = cfg
            .allow_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(layer.allow_origin(AllowOrigin::list(origins)))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    seed::ensure_indexes(&db).await?;

    let cache: Arc<dyn TestcaseCache> = match config.cache.url {
        Some(ref url) => Arc::new(RedisCache::connect(url).await?),
        None => {
            warn!("No cache URL configured; falling back to the in-process cache");
            Arc::new(MemoryCache::new())
        }
    };

    let judge = Judge0Client::new(
        &config.judge.base_url,
        config.judge.api_key.clone(),
        Duration::from_secs(config.judge.timeout_secs),
    )?;

    let cors = cors_layer(&config.server.cors)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db,
        cache,
        judge: Arc::new(judge),
        config,
    };
    let app = server::build_router(state).layer(cors);

    info!("Server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
