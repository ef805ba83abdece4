use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ddx_core::{CoreConfig, DifferentialExplorer, KnowledgeBase, resolve_knowledge_base_dir};

/// Main entry point for the DDX application
///
/// Resolves configuration once, loads and validates the knowledge base, then serves the REST
/// API. A knowledge base that fails integrity checks stops start-up.
///
/// # Environment Variables
/// - `DDX_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `DDX_KNOWLEDGE_BASE_DIR`: directory holding `diagnoses.yaml` and `symptoms.yaml`
///   (default: search for `knowledge-base/`)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, loading or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("ddx=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("DDX_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let override_dir = std::env::var("DDX_KNOWLEDGE_BASE_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    let cfg = CoreConfig::new(resolve_knowledge_base_dir(override_dir)?)?;
    tracing::info!(
        "++ Loading knowledge base from {}",
        cfg.knowledge_base_dir().display()
    );
    let kb = KnowledgeBase::load_from_config(&cfg)?;

    tracing::info!("++ Starting DDX REST on {}", rest_addr);
    api_rest::serve(&rest_addr, DifferentialExplorer::new(Arc::new(kb))).await
}
