//! Settlement document archive backed by object storage.

pub mod config;
pub mod error;
pub mod service;

pub use config::{ArchiveConfig, ArchiveProvider};
pub use error::ArchiveError;
pub use service::ArchiveService;
