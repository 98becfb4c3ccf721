use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use medsim_api::{app, ApiConfig, AppState};
use medsim_bedrock::client::build_aws_config;
use medsim_bedrock::{BedrockReplyGenerator, FallbackReplies};
use medsim_core::CaseCatalog;
use medsim_session::ConversationRouter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ApiConfig::from_env()?;

    let mut catalog = CaseCatalog::bundled()?;
    if let Some(dir) = &config.case_dir {
        catalog.load_dir(dir)?;
    }
    let catalog = Arc::new(catalog);

    let fallback = FallbackReplies::seeded(config.fallback_seed);
    let router = if config.bedrock_enabled {
        let sdk_config = build_aws_config(&config.region).await;
        let generator = BedrockReplyGenerator::new(&sdk_config, config.model_id.clone())?;
        tracing::info!(model_id = %config.model_id, region = %config.region, "bedrock replies enabled");
        ConversationRouter::new(Arc::new(generator), fallback)
    } else {
        tracing::info!("bedrock disabled, unscripted questions use fallback replies");
        ConversationRouter::offline(fallback)
    };
    let router = Arc::new(
        router
            .with_timeout(config.generator_timeout)
            .with_history_window(config.history_window),
    );

    let state = AppState::new(catalog, router);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}
