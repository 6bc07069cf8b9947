use profile_rag::api::{create_router, AppState};
use profile_rag::application::{StoreRegistry, VectorStoreManager};
use profile_rag::infrastructure::{bootstrap, Adapters, AppConfig, DEFAULT_CONFIG_PATH};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "api=debug,profile_rag=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config_path = std::env::var("APP_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = AppConfig::load(&config_path)?;
    info!(path = %config_path.display(), "configuration loaded");

    let Adapters {
        seed_lock,
        history,
        embedding,
        generator,
    } = Adapters::from_config(&config)?;

    let registry = match bootstrap::vector_store_provider(&config) {
        Ok(provider) => {
            let manager = VectorStoreManager::new(provider, embedding.clone(), seed_lock);
            manager.initialize(&config.data_dir, config.seeding.force).await
        }
        Err(e) => {
            tracing::error!(error = %e, "vector backend unavailable, serving fallback answers only");
            StoreRegistry::default()
        }
    };

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let state = AppState::new(config, registry, history, embedding, generator);
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
