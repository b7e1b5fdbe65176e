//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Record store configuration.
    pub record_store: RecordStoreConfig,
    /// Document renderer configuration.
    pub renderer: RendererConfig,
    /// Archive (object store) configuration.
    pub archive: ArchiveSettings,
    /// Email (notifier) configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Petty-cash policy configuration.
    #[serde(default)]
    pub pettycash: PettyCashSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Record store (external persistence service) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordStoreConfig {
    /// Base URL of the record store API.
    pub base_url: String,
    /// Bearer token for authentication.
    pub api_token: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

fn default_store_timeout() -> u64 {
    10
}

/// Document renderer service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    /// Base URL of the renderer service.
    pub base_url: String,
    /// Per-request timeout in seconds. Rendering is slow; default is generous.
    #[serde(default = "default_renderer_timeout")]
    pub timeout_secs: u64,
}

fn default_renderer_timeout() -> u64 {
    30
}

/// Archive provider settings, mapped into `caja_core::archive::ArchiveConfig`
/// by the server binary.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveSettings {
    /// Provider name: "s3" or "local".
    pub provider: String,
    /// Root directory (local provider).
    #[serde(default)]
    pub root: Option<String>,
    /// Endpoint URL (s3 provider).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bucket name (s3 provider).
    #[serde(default)]
    pub bucket: Option<String>,
    /// Access key ID (s3 provider).
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Secret access key (s3 provider).
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Region (s3 provider).
    #[serde(default)]
    pub region: Option<String>,
}

/// Email (SMTP) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// From address for outgoing mail.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// From display name for outgoing mail.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_from_email() -> String {
    "noreply@caja.local".to_string()
}

fn default_from_name() -> String {
    "Caja".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

/// Petty-cash policy settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PettyCashSettings {
    /// Absolute ceiling for a single expense, independent of balance.
    /// Guards against data-entry errors (an extra zero on an amount).
    #[serde(default = "default_hard_cap")]
    pub expense_hard_cap: Decimal,
    /// Utilization percentage at which consolidation becomes due.
    #[serde(default = "default_threshold")]
    pub consolidation_threshold_percent: Decimal,
    /// Recipients of the settlement notification email.
    #[serde(default)]
    pub notify_recipients: Vec<String>,
    /// Timeout for the best-effort settlement notification, in seconds.
    #[serde(default = "default_notify_timeout")]
    pub notify_timeout_secs: u64,
}

fn default_hard_cap() -> Decimal {
    Decimal::new(1_000_000, 0)
}

fn default_threshold() -> Decimal {
    Decimal::new(90, 0)
}

fn default_notify_timeout() -> u64 {
    10
}

impl Default for PettyCashSettings {
    fn default() -> Self {
        Self {
            expense_hard_cap: default_hard_cap(),
            consolidation_threshold_percent: default_threshold(),
            notify_recipients: Vec::new(),
            notify_timeout_secs: default_notify_timeout(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CAJA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pettycash_defaults() {
        let settings = PettyCashSettings::default();
        assert_eq!(settings.expense_hard_cap, dec!(1_000_000));
        assert_eq!(settings.consolidation_threshold_percent, dec!(90));
        assert!(settings.notify_recipients.is_empty());
    }

    #[test]
    fn test_email_defaults() {
        let config = EmailConfig::default();
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 1025);
    }
}
