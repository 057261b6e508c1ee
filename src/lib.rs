pub mod api;
pub mod config;
pub mod pipeline;
pub mod pipeline_config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::pipeline::extraction::PdfTextExtractor;
use crate::pipeline::orchestrator::TenderEvaluator;
use crate::pipeline_config::PipelineConfig;

/// Process entry point: load configuration, build the pipeline, serve HTTP
/// until Ctrl-C.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional; real environment variables win.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let pipeline_config = PipelineConfig::from_env()?;
    tracing::info!(
        provider = ?pipeline_config.llm_provider,
        model = %pipeline_config.model,
        bind_addr = %pipeline_config.bind_addr,
        "Configuration loaded"
    );

    // The blocking HTTP client owns its own runtime, so it is built before ours.
    let llm = pipeline::llm::client_from_config(&pipeline_config)?;
    let evaluator = Arc::new(TenderEvaluator::new(
        &pipeline_config,
        Arc::new(PdfTextExtractor),
        llm,
    ));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let mut server = api::start_api_server(evaluator, &pipeline_config.bind_addr).await?;

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
        }
        server.shutdown();
        server.stopped().await;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
