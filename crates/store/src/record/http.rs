//! HTTP client for the external record store.
//!
//! The record store is a generic versioned-record service: every record is
//! `{id, version, fields}`, writes are conditional on the version, and a
//! stale write returns HTTP 409. Timeouts and transport failures surface as
//! `RepoError::Unavailable`; the caller decides whether to re-read and retry.

use reqwest::{Client, StatusCode};
use tracing::debug;

use caja_core::cashbox::{
    BoxPatch, BoxRepository, Expense, ExpenseRepository, PettyCashBox, RepoError,
};
use caja_shared::{BoxId, RecordStoreConfig};

use super::wire::{
    BoxFields, ConditionalUpdate, ExpenseFields, RecordEnvelope, RecordList, box_from_envelope,
    expense_from_envelope, patch_to_fields,
};

const BOXES: &str = "boxes";
const EXPENSES: &str = "expenses";

/// Record-store client over HTTP.
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
    api_token: String,
}

impl HttpRecordStore {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &RecordStoreConfig) -> Result<Self, RepoError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RepoError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/api/records/{collection}", self.base_url)
    }

    fn record_url(&self, collection: &str, id: &str) -> String {
        format!("{}/api/records/{collection}/{id}", self.base_url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, RepoError> {
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(query)
            .send()
            .await
            .map_err(|e| RepoError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|e| RepoError::Malformed(e.to_string())),
            status => Err(RepoError::Unavailable(format!(
                "record store returned {status} for {url}"
            ))),
        }
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        body: &B,
    ) -> Result<T, RepoError> {
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await
            .map_err(|e| RepoError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepoError::Unavailable(format!(
                "record store returned {status} for {url}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RepoError::Malformed(e.to_string()))
    }
}

impl BoxRepository for HttpRecordStore {
    async fn find_by_id(&self, id: BoxId) -> Result<Option<PettyCashBox>, RepoError> {
        let url = self.record_url(BOXES, &id.to_string());
        let envelope: Option<RecordEnvelope<BoxFields>> = self.get_json(url, &[]).await?;
        envelope.map(box_from_envelope).transpose()
    }

    async fn find_active(&self) -> Result<Option<PettyCashBox>, RepoError> {
        let url = self.collection_url(BOXES);
        let list: Option<RecordList<BoxFields>> = self
            .get_json(url, &[("state", "open"), ("state", "consolidating")])
            .await?;

        let Some(list) = list else {
            return Ok(None);
        };

        // At most one active box exists; a second one means stored data
        // broke the single-active invariant and must not be papered over.
        let mut records = list.records;
        if records.len() > 1 {
            return Err(RepoError::Malformed(format!(
                "{} boxes claim the active slot",
                records.len()
            )));
        }

        records.pop().map(box_from_envelope).transpose()
    }

    async fn create(&self, cashbox: PettyCashBox) -> Result<PettyCashBox, RepoError> {
        let url = self.collection_url(BOXES);
        let body = RecordEnvelope {
            id: cashbox.id.into_inner(),
            version: cashbox.version,
            fields: BoxFields::from_domain(&cashbox),
        };

        debug!(box_id = %cashbox.id, "Creating box record");
        let created: RecordEnvelope<BoxFields> = self.post_json(url, &body).await?;
        box_from_envelope(created)
    }

    async fn update_if_version(
        &self,
        id: BoxId,
        expected_version: i64,
        patch: BoxPatch,
    ) -> Result<PettyCashBox, RepoError> {
        let url = self.record_url(BOXES, &id.to_string());
        let body = ConditionalUpdate {
            expected_version,
            fields: patch_to_fields(&patch),
        };

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| RepoError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                Err(RepoError::VersionMismatch {
                    id,
                    expected: expected_version,
                })
            }
            StatusCode::NOT_FOUND => Err(RepoError::NotFound(id.to_string())),
            status if status.is_success() => {
                let envelope: RecordEnvelope<BoxFields> = response
                    .json()
                    .await
                    .map_err(|e| RepoError::Malformed(e.to_string()))?;
                box_from_envelope(envelope)
            }
            status => Err(RepoError::Unavailable(format!(
                "record store returned {status} for {url}"
            ))),
        }
    }
}

impl ExpenseRepository for HttpRecordStore {
    async fn create(&self, expense: Expense) -> Result<Expense, RepoError> {
        let url = self.collection_url(EXPENSES);
        let body = RecordEnvelope {
            id: expense.id.into_inner(),
            version: 0,
            fields: ExpenseFields::from_domain(&expense),
        };

        debug!(expense_id = %expense.id, box_id = %expense.box_id, "Creating expense record");
        let created: RecordEnvelope<ExpenseFields> = self.post_json(url, &body).await?;
        Ok(expense_from_envelope(created))
    }

    async fn list_by_box(&self, box_id: BoxId) -> Result<Vec<Expense>, RepoError> {
        let url = self.collection_url(EXPENSES);
        let box_id_str = box_id.to_string();
        let list: Option<RecordList<ExpenseFields>> =
            self.get_json(url, &[("box_id", box_id_str.as_str())]).await?;

        Ok(list
            .map(|l| l.records.into_iter().map(expense_from_envelope).collect())
            .unwrap_or_default())
    }
}
