//! Shared types, configuration, and email transport for Caja.
//!
//! This crate holds the pieces every other crate needs: typed entity IDs,
//! layered configuration loading, and the SMTP transport used by the
//! settlement notifier. No business logic lives here.

pub mod config;
pub mod email;
pub mod types;

pub use config::{
    AppConfig, ArchiveSettings, EmailConfig, PettyCashSettings, RecordStoreConfig, RendererConfig,
    ServerConfig,
};
pub use email::{EmailError, EmailService};
pub use types::{BoxId, ExpenseId};
