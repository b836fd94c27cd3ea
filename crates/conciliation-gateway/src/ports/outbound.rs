//! Outbound ports for the gateway.

use crate::domain::{Row, StoreError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch
    fn now(&self) -> u64;
}

/// System time implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            // Clock before Unix epoch - return 0 rather than panic
            .unwrap_or(0)
    }
}

/// Settable clock for tests and replay
#[derive(Debug, Default)]
pub struct ManualTime {
    now: AtomicU64,
}

impl ManualTime {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Highest row count a sheet store accepts (10M cells at ten columns)
pub const MAX_SHEET_ROWS: usize = 1_000_000;

/// 1-based A1 row number for a 0-based row index
pub fn a1_row(row: usize) -> Result<usize, StoreError> {
    row.checked_add(1)
        .filter(|&n| n <= MAX_SHEET_ROWS)
        .ok_or(StoreError::RowOutOfRange(row))
}

/// Spreadsheet-backed record store.
///
/// Row and column indices are 0-based; row 0 is the sheet header.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// All rows of a sheet
    async fn fetch_rows(&self, sheet: &str) -> Result<Vec<Row>, StoreError>;

    /// Overwrite a single cell
    async fn write_cell(
        &self,
        sheet: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), StoreError>;

    /// Append a row after the last non-empty one
    async fn append_row(&self, sheet: &str, values: Row) -> Result<(), StoreError>;

    /// Blank a row without shifting the rows below it
    async fn clear_row(&self, sheet: &str, row: usize) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a1_row_bounds() {
        assert_eq!(a1_row(0).unwrap(), 1);
        assert_eq!(a1_row(MAX_SHEET_ROWS - 1).unwrap(), MAX_SHEET_ROWS);
        assert!(matches!(
            a1_row(MAX_SHEET_ROWS),
            Err(StoreError::RowOutOfRange(_))
        ));
        assert!(matches!(
            a1_row(usize::MAX),
            Err(StoreError::RowOutOfRange(usize::MAX))
        ));
    }

    #[test]
    fn test_manual_time_advances() {
        let clock = ManualTime::new(1_000);
        assert_eq!(clock.now(), 1_000);
        clock.advance(86_400);
        assert_eq!(clock.now(), 87_400);
        clock.set(5);
        assert_eq!(clock.now(), 5);
    }

    #[test]
    fn test_system_time_is_after_2020() {
        assert!(SystemTimeSource.now() > 1_577_836_800);
    }
}
