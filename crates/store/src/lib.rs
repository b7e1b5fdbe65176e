//! Collaborator clients for Caja.
//!
//! This crate implements the narrow interfaces the core consumes:
//! - `record` - the external versioned record store (HTTP), plus an
//!   in-memory implementation for development and tests
//! - `renderer` - the settlement document renderer (HTTP)
//! - `notifier` - the settlement email notifier (SMTP via `caja-shared`)

pub mod notifier;
pub mod record;
pub mod renderer;

pub use notifier::EmailNotifier;
pub use record::{HttpRecordStore, MemoryRecordStore};
pub use renderer::HttpSettlementRenderer;
