//! Period consolidation: freezing a box, settling its expenses into an
//! archived document, and committing the terminal state.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod settlement_props;

pub use error::{ConsolidationError, NotifyError, RenderError};
pub use service::{ConsolidationService, DocumentArchive, SettlementNotifier, SettlementRenderer};
pub use types::{ConsolidationOutcome, ConsolidationSnapshot, Settlement};
