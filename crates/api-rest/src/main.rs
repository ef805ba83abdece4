//! Standalone REST API server binary.
//!
//! The workspace's main `ddx-run` binary serves the same router; this one is handy when
//! iterating on the API alone.

use ddx_core::{resolve_knowledge_base_dir, DifferentialExplorer, KnowledgeBase};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Starts the REST API server.
///
/// # Environment Variables
/// - `DDX_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `DDX_KNOWLEDGE_BASE_DIR`: Knowledge-base directory (default: search for `knowledge-base/`)
///
/// # Errors
/// Returns an error if the knowledge base cannot be loaded, the address cannot be bound, or
/// the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("ddx=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("DDX_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let override_dir = std::env::var("DDX_KNOWLEDGE_BASE_DIR").ok().map(PathBuf::from);

    let dir = resolve_knowledge_base_dir(override_dir)?;
    let kb = KnowledgeBase::load_from_dir(&dir)?;

    api_rest::serve(&addr, DifferentialExplorer::new(Arc::new(kb))).await
}
