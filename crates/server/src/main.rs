use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use tillscan_email::Mailer;
use tillscan_ocr::{MockOcr, OcrBackend, ReceiptPipeline};

mod config;
mod routes;
mod util;

use config::Config;
use routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tillscan.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let db = tillscan_storage::create_db(&config.db_path)
        .await
        .context("creating receipt database")?;

    // TODO: swap in the document-analysis service backend once its endpoint
    // and credential configuration land; the mock keeps the wiring honest
    // until then.
    let backend: Box<dyn OcrBackend> = Box::new(MockOcr::new(""));
    let pipeline = ReceiptPipeline::new(backend, config.ocr_features.clone());

    let mailer = match &config.smtp {
        Some(settings) => Some(Mailer::new(settings).context("configuring SMTP notifier")?),
        None => {
            tracing::warn!("No [smtp] config section; notifications disabled");
            None
        }
    };

    let state = Arc::new(AppState { db, pipeline, mailer });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
