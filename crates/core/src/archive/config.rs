//! Archive configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Archive provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArchiveProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl ArchiveProvider {
    /// Create S3-compatible provider (Cloudflare R2, Supabase, AWS S3).
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name used in archive references.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }

    /// Get the bucket/root name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
        }
    }
}

/// Archive service configuration.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Archive provider configuration.
    pub provider: ArchiveProvider,
}

impl ArchiveConfig {
    /// Create a new archive config.
    #[must_use]
    pub const fn new(provider: ArchiveProvider) -> Self {
        Self { provider }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_s3() {
        let provider = ArchiveProvider::s3(
            "https://account.r2.cloudflarestorage.com",
            "settlements",
            "access_key",
            "secret_key",
            "auto",
        );
        assert_eq!(provider.name(), "s3");
        assert_eq!(provider.bucket(), "settlements");
    }

    #[test]
    fn test_provider_local() {
        let provider = ArchiveProvider::local_fs("./archive");
        assert_eq!(provider.name(), "local");
        assert_eq!(provider.bucket(), "./archive");
    }
}
