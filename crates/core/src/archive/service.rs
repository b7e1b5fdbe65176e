//! Archive service implementation using Apache OpenDAL.
//!
//! Settlement documents are written under a deterministic per-period key,
//! so a retried attempt overwrites its own previous upload instead of
//! accumulating duplicates.

use chrono::{Datelike, NaiveDate};
use opendal::{ErrorKind, Operator, services};

use super::config::{ArchiveConfig, ArchiveProvider};
use super::error::ArchiveError;

/// Archive service for settlement documents.
pub struct ArchiveService {
    operator: Operator,
    config: ArchiveConfig,
}

impl ArchiveService {
    /// Create a new archive service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive provider cannot be initialized.
    pub fn from_config(config: ArchiveConfig) -> Result<Self, ArchiveError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &ArchiveProvider) -> Result<Operator, ArchiveError> {
        match provider {
            ArchiveProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| ArchiveError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            ArchiveProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| ArchiveError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| ArchiveError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
        }
    }

    /// Archive key for a fund period.
    ///
    /// Format: `{month:02}_{year}_pettycash.pdf`
    #[must_use]
    pub fn period_key(opened_at: NaiveDate) -> String {
        format!(
            "{:02}_{}_pettycash.pdf",
            opened_at.month(),
            opened_at.year()
        )
    }

    /// Write document bytes under the given key and return the archive
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, ArchiveError> {
        self.operator
            .write(key, bytes)
            .await
            .map_err(ArchiveError::from)?;

        Ok(self.reference(key))
    }

    /// Check if a document exists in the archive.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// The opaque reference for a key: `{provider}://{bucket}/{key}`.
    #[must_use]
    pub fn reference(&self, key: &str) -> String {
        format!(
            "{}://{}/{}",
            self.config.provider.name(),
            self.config.provider.bucket(),
            key
        )
    }

    /// Get the archive provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}
