//! Request and response types for the gateway API.
//!
//! JSON field names are camelCase to match the browser client.

use serde::{Deserialize, Serialize};

/// One spreadsheet row as loosely-typed cells, column A first
pub type Row = Vec<serde_json::Value>;

/// Which sheet a transaction was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetKind {
    /// Bank statement entries
    #[serde(rename = "ES")]
    Es,
    /// Expected entries carrying an installment id
    #[serde(rename = "DIF")]
    Dif,
}

/// A transaction row from the ES or DIF sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// 0-based index in the sheet, header row is 0
    pub row_index: usize,
    pub dono: String,
    pub banco: String,
    pub conta: String,
    pub descricao: String,
    pub recorrente: bool,
    pub data: String,
    pub valor: f64,
    pub id_parcela: String,
    pub sheet: SheetKind,
}

/// A DIF entry with the ES rows that could settle it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConciliationCandidate {
    pub reference: Transaction,
    pub candidates: Vec<Transaction>,
}

/// Lightweight list view of a DIF entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingConciliationSummary {
    pub dif_row_index: usize,
    pub id_parcela: String,
    pub dono: String,
    pub banco: String,
    pub conta: String,
    pub descricao: String,
    pub data: String,
    pub valor: f64,
    pub candidate_count: usize,
}

/// Body of `POST /api/conciliations/{id}/accept`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptRequest {
    pub es_row_indices: Vec<usize>,
}

/// Body of `POST /api/login`
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login acknowledgment; tokens travel only in cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub authenticated: bool,
}
