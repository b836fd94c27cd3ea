//! Conciliation workflow over the sheet store.
//!
//! DIF holds expected future transactions carrying an installment id, ES
//! holds the statement. Accepting a match stamps the DIF installment id
//! onto the chosen ES rows; rejecting moves the DIF row to REJ.

use crate::domain::matching::{
    columns, data_rows, is_blank, is_match, is_open_candidate, row_to_transaction,
};
use crate::domain::{
    ApiError, ConciliationCandidate, PendingConciliationSummary, Row, SheetKind, SheetsConfig,
    StoreError, Transaction,
};
use crate::ports::SheetStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Conciliation failures
#[derive(Debug, thiserror::Error)]
pub enum ConciliationError {
    /// DIF row index past the end of the sheet, or the header row
    #[error("DIF row {0} not found")]
    DifRowNotFound(usize),

    /// DIF row has no installment id to propagate
    #[error("DIF row {0} has no installment id")]
    MissingInstallmentId(usize),

    /// ES row index is the header or past the end of the sheet
    #[error("ES row {0} is not a data row")]
    InvalidEsRow(usize),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ConciliationError> for ApiError {
    fn from(e: ConciliationError) -> Self {
        match e {
            ConciliationError::DifRowNotFound(_) => ApiError::NotFound("Conciliation not found"),
            ConciliationError::MissingInstallmentId(_) => {
                ApiError::BadRequest("DIF transaction has no ID")
            }
            ConciliationError::InvalidEsRow(_) => ApiError::BadRequest("Invalid ES row"),
            ConciliationError::Store(e) => e.into(),
        }
    }
}

/// Sheet names the service works on
#[derive(Debug, Clone)]
struct SheetNames {
    es: String,
    dif: String,
    rej: String,
}

/// Lists, inspects, accepts and rejects pending conciliations
pub struct ConciliationService {
    store: Arc<dyn SheetStore>,
    sheets: SheetNames,
}

impl ConciliationService {
    pub fn new(store: Arc<dyn SheetStore>, config: &SheetsConfig) -> Self {
        Self {
            store,
            sheets: SheetNames {
                es: config.es_sheet.clone(),
                dif: config.dif_sheet.clone(),
                rej: config.rej_sheet.clone(),
            },
        }
    }

    /// One summary per non-blank DIF row, with its match count
    pub async fn list(&self) -> Result<Vec<PendingConciliationSummary>, ConciliationError> {
        let dif_rows = self.store.fetch_rows(&self.sheets.dif).await?;
        let candidates = self.open_candidates().await?;

        let summaries: Vec<_> = data_rows(&dif_rows)
            .map(|(i, row)| row_to_transaction(i, row, SheetKind::Dif))
            .filter(|dif| !is_blank(dif))
            .map(|dif| {
                let candidate_count = candidates.iter().filter(|es| is_match(&dif, es)).count();
                PendingConciliationSummary {
                    dif_row_index: dif.row_index,
                    id_parcela: dif.id_parcela,
                    dono: dif.dono,
                    banco: dif.banco,
                    conta: dif.conta,
                    descricao: dif.descricao,
                    data: dif.data,
                    valor: dif.valor,
                    candidate_count,
                }
            })
            .collect();

        debug!(
            pending = summaries.len(),
            candidates = candidates.len(),
            "Listed conciliations"
        );
        Ok(summaries)
    }

    /// A DIF row and the open ES rows matching it
    pub async fn details(&self, dif_index: usize) -> Result<ConciliationCandidate, ConciliationError> {
        let dif_rows = self.store.fetch_rows(&self.sheets.dif).await?;
        let reference = dif_transaction(&dif_rows, dif_index)?;

        let candidates = self
            .open_candidates()
            .await?
            .into_iter()
            .filter(|es| is_match(&reference, es))
            .collect();

        Ok(ConciliationCandidate {
            reference,
            candidates,
        })
    }

    /// Write the DIF row's installment id into each chosen ES row
    pub async fn accept(
        &self,
        dif_index: usize,
        es_row_indices: &[usize],
    ) -> Result<(), ConciliationError> {
        let dif_rows = self.store.fetch_rows(&self.sheets.dif).await?;
        let dif = dif_transaction(&dif_rows, dif_index)?;

        if dif.id_parcela.is_empty() {
            return Err(ConciliationError::MissingInstallmentId(dif_index));
        }

        let es_len = self.store.fetch_rows(&self.sheets.es).await?.len();
        if let Some(&bad) = es_row_indices.iter().find(|&&i| i == 0 || i >= es_len) {
            return Err(ConciliationError::InvalidEsRow(bad));
        }

        for &es_index in es_row_indices {
            self.store
                .write_cell(&self.sheets.es, es_index, columns::ID_PARCELA, &dif.id_parcela)
                .await?;
        }

        info!(
            dif_row = dif_index,
            es_rows = ?es_row_indices,
            id_parcela = %dif.id_parcela,
            "Conciliation accepted"
        );
        Ok(())
    }

    /// Move the DIF row to REJ: append there, then blank it in DIF
    pub async fn reject(&self, dif_index: usize) -> Result<(), ConciliationError> {
        let dif_rows = self.store.fetch_rows(&self.sheets.dif).await?;
        let row: Row = dif_rows
            .get(dif_index)
            .filter(|_| dif_index > 0)
            .cloned()
            .ok_or(ConciliationError::DifRowNotFound(dif_index))?;

        self.store.append_row(&self.sheets.rej, row).await?;
        self.store.clear_row(&self.sheets.dif, dif_index).await?;

        info!(dif_row = dif_index, "Conciliation rejected");
        Ok(())
    }

    async fn open_candidates(&self) -> Result<Vec<Transaction>, ConciliationError> {
        let es_rows = self.store.fetch_rows(&self.sheets.es).await?;
        Ok(data_rows(&es_rows)
            .map(|(i, row)| row_to_transaction(i, row, SheetKind::Es))
            .filter(is_open_candidate)
            .collect())
    }
}

fn dif_transaction(rows: &[Row], index: usize) -> Result<Transaction, ConciliationError> {
    match rows.get(index) {
        Some(row) if index > 0 => Ok(row_to_transaction(index, row, SheetKind::Dif)),
        _ => Err(ConciliationError::DifRowNotFound(index)),
    }
}
