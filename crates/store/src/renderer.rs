//! HTTP client for the document renderer service.
//!
//! The renderer receives the full settlement snapshot as JSON and returns
//! the rendered document bytes. Rendering is the slowest collaborator call
//! in the consolidation flow, so the timeout is configured separately from
//! the record store's.

use reqwest::Client;
use tracing::debug;

use caja_core::consolidation::{ConsolidationSnapshot, RenderError, SettlementRenderer};
use caja_shared::RendererConfig;

/// Renderer client over HTTP.
pub struct HttpSettlementRenderer {
    client: Client,
    render_url: String,
}

impl HttpSettlementRenderer {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &RendererConfig) -> Result<Self, RenderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RenderError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            render_url: format!("{}/render/settlement", config.base_url.trim_end_matches('/')),
        })
    }
}

impl SettlementRenderer for HttpSettlementRenderer {
    async fn render(&self, snapshot: &ConsolidationSnapshot) -> Result<Vec<u8>, RenderError> {
        debug!(box_id = %snapshot.cashbox.id, expenses = snapshot.expenses.len(),
            "Requesting settlement document");

        let response = self
            .client
            .post(&self.render_url)
            .json(snapshot)
            .send()
            .await
            .map_err(|e| RenderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenderError::Rejected(format!("{status}: {body}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RenderError::Unavailable(e.to_string()))?;

        if bytes.is_empty() {
            return Err(RenderError::Rejected("renderer returned an empty document".into()));
        }

        Ok(bytes.to_vec())
    }
}
