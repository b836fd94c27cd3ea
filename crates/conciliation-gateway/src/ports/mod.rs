//! Ports the gateway depends on: time and the sheet store.

pub mod outbound;

pub use outbound::{
    a1_row, ManualTime, SheetStore, SystemTimeSource, TimeSource, MAX_SHEET_ROWS,
};
