//! Caja API Server
//!
//! Main entry point for the petty-cash backend service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use caja_api::{AppState, create_router};
use caja_core::archive::{ArchiveConfig, ArchiveProvider, ArchiveService};
use caja_core::cashbox::{BoxRepository, CashboxService, ExpenseRepository};
use caja_core::consolidation::ConsolidationService;
use caja_core::expense::ExpenseService;
use caja_shared::{AppConfig, ArchiveSettings, EmailService};
use caja_store::{EmailNotifier, HttpRecordStore, HttpSettlementRenderer, MemoryRecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caja=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // "memory" runs the whole stack against the in-process record store;
    // anything else is the URL of the real record store.
    if config.record_store.base_url == "memory" {
        info!("Using in-memory record store (development mode)");
        run(Arc::new(MemoryRecordStore::new()), config).await
    } else {
        let store = HttpRecordStore::from_config(&config.record_store)?;
        info!(base_url = %config.record_store.base_url, "Using HTTP record store");
        run(Arc::new(store), config).await
    }
}

/// Wire the services over the chosen record store and serve.
async fn run<S>(store: Arc<S>, config: AppConfig) -> anyhow::Result<()>
where
    S: BoxRepository + ExpenseRepository + 'static,
{
    // Collaborators
    let renderer = Arc::new(HttpSettlementRenderer::from_config(&config.renderer)?);
    info!(base_url = %config.renderer.base_url, "Document renderer configured");

    let archive = Arc::new(ArchiveService::from_config(archive_config(
        &config.archive,
    )?)?);
    info!(provider = archive.provider_name(), "Settlement archive configured");

    let email = EmailService::new(config.email.clone());
    let notifier = Arc::new(EmailNotifier::new(
        email,
        config.pettycash.notify_recipients.clone(),
    ));
    info!(
        smtp_host = %config.email.smtp_host,
        recipients = config.pettycash.notify_recipients.len(),
        "Settlement notifier configured"
    );

    // Services
    let state = AppState {
        cashboxes: Arc::new(CashboxService::new(Arc::clone(&store))),
        expenses: Arc::new(ExpenseService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            config.pettycash.expense_hard_cap,
        )),
        consolidation: Arc::new(ConsolidationService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            renderer,
            archive,
            notifier,
            Duration::from_secs(config.pettycash.notify_timeout_secs),
        )),
        settings: Arc::new(config.pettycash.clone()),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Map the flat archive settings into the provider config.
fn archive_config(settings: &ArchiveSettings) -> anyhow::Result<ArchiveConfig> {
    let provider = match settings.provider.as_str() {
        "s3" => ArchiveProvider::s3(
            settings
                .endpoint
                .clone()
                .context("archive.endpoint is required for the s3 provider")?,
            settings
                .bucket
                .clone()
                .context("archive.bucket is required for the s3 provider")?,
            settings
                .access_key_id
                .clone()
                .context("archive.access_key_id is required for the s3 provider")?,
            settings
                .secret_access_key
                .clone()
                .context("archive.secret_access_key is required for the s3 provider")?,
            settings
                .region
                .clone()
                .unwrap_or_else(|| "auto".to_string()),
        ),
        "local" => ArchiveProvider::local_fs(
            settings
                .root
                .clone()
                .unwrap_or_else(|| "./archive".to_string()),
        ),
        other => bail!("Unknown archive provider '{other}' (expected 's3' or 'local')"),
    };

    Ok(ArchiveConfig::new(provider))
}
