//! Adapters for the gateway.
//!
//! Sheet store implementations behind [`crate::ports::SheetStore`].

pub mod memory;
pub mod sheets;

pub use memory::MemorySheetStore;
pub use sheets::GoogleSheetsStore;
