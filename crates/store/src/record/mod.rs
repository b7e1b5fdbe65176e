//! Record-store implementations of the box and expense repositories.

pub mod http;
pub mod memory;
pub mod wire;

pub use http::HttpRecordStore;
pub use memory::MemoryRecordStore;
