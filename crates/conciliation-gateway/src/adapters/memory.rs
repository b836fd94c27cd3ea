//! In-memory sheet store.
//!
//! Mirrors the remote store's observable behaviour closely enough for tests
//! and local runs: writes past the end grow the sheet up to
//! [`crate::ports::MAX_SHEET_ROWS`], cleared rows stay in place as empty rows.

use crate::domain::{Row, StoreError};
use crate::ports::{a1_row, SheetStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// Thread-safe sheet store held in process memory
#[derive(Debug, Default)]
pub struct MemorySheetStore {
    sheets: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper to seed a sheet
    pub fn with_sheet(self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.sheets.write().insert(name.into(), rows);
        self
    }

    /// Snapshot of a sheet, `None` if it does not exist
    pub fn rows(&self, name: &str) -> Option<Vec<Row>> {
        self.sheets.read().get(name).cloned()
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn fetch_rows(&self, sheet: &str) -> Result<Vec<Row>, StoreError> {
        self.rows(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))
    }

    async fn write_cell(
        &self,
        sheet: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        let min_len = a1_row(row)?;
        let mut sheets = self.sheets.write();
        let rows = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))?;

        if rows.len() < min_len {
            rows.resize_with(min_len, Vec::new);
        }
        let cells = &mut rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, Value::String(String::new()));
        }
        cells[col] = Value::String(value.to_string());
        Ok(())
    }

    async fn append_row(&self, sheet: &str, values: Row) -> Result<(), StoreError> {
        let mut sheets = self.sheets.write();
        let rows = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))?;

        // Append lands after the last row that still has content.
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        rows.push(values);
        Ok(())
    }

    async fn clear_row(&self, sheet: &str, row: usize) -> Result<(), StoreError> {
        let mut sheets = self.sheets.write();
        let rows = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))?;

        if let Some(cells) = rows.get_mut(row) {
            cells.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_sheet() {
        let store = MemorySheetStore::new();
        assert!(matches!(
            store.fetch_rows("ES").await,
            Err(StoreError::SheetNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_write_cell_grows_sheet() {
        let store = MemorySheetStore::new().with_sheet("ES", vec![vec![json!("header")]]);

        store.write_cell("ES", 2, 3, "P-1").await.unwrap();

        let rows = store.fetch_rows("ES").await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].is_empty());
        assert_eq!(rows[2].len(), 4);
        assert_eq!(rows[2][3], json!("P-1"));
        assert_eq!(rows[2][0], json!(""));
    }

    #[tokio::test]
    async fn test_write_cell_past_row_limit() {
        let store = MemorySheetStore::new().with_sheet("ES", vec![vec![json!("header")]]);

        for row in [crate::ports::MAX_SHEET_ROWS, usize::MAX] {
            assert!(matches!(
                store.write_cell("ES", row, 9, "P-1").await,
                Err(StoreError::RowOutOfRange(r)) if r == row
            ));
        }
        assert_eq!(store.rows("ES").unwrap(), vec![vec![json!("header")]]);
    }

    #[tokio::test]
    async fn test_clear_keeps_indices() {
        let store = MemorySheetStore::new().with_sheet(
            "DIF",
            vec![vec![json!("h")], vec![json!("a")], vec![json!("b")]],
        );

        store.clear_row("DIF", 1).await.unwrap();

        let rows = store.fetch_rows("DIF").await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].is_empty());
        assert_eq!(rows[2], vec![json!("b")]);
    }

    #[tokio::test]
    async fn test_append_after_last_content_row() {
        let store = MemorySheetStore::new()
            .with_sheet("REJ", vec![vec![json!("h")], vec![json!("x")], vec![]]);

        store.append_row("REJ", vec![json!("y")]).await.unwrap();

        let rows = store.rows("REJ").unwrap();
        assert_eq!(rows, vec![vec![json!("h")], vec![json!("x")], vec![json!("y")]]);
    }
}
