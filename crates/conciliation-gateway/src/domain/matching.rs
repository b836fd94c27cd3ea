//! Row parsing and the reconciliation match predicate.

use super::types::{Row, SheetKind, Transaction};
use serde_json::Value;

/// Column positions, 0 is column A. Column E (category) is not read.
pub mod columns {
    pub const DATA: usize = 1;
    pub const DESCRICAO: usize = 2;
    pub const VALOR: usize = 3;
    pub const DONO: usize = 5;
    pub const BANCO: usize = 6;
    pub const CONTA: usize = 7;
    pub const RECORRENTE: usize = 8;
    pub const ID_PARCELA: usize = 9;
}

/// Amounts closer than this are considered the same payment
pub const AMOUNT_TOLERANCE: f64 = 5.00;

/// Build a transaction from a raw row; absent cells take empty defaults
pub fn row_to_transaction(row_index: usize, row: &[Value], sheet: SheetKind) -> Transaction {
    let text = |col: usize| row.get(col).map(cell_text).unwrap_or_default();

    Transaction {
        row_index,
        dono: text(columns::DONO),
        banco: text(columns::BANCO),
        conta: text(columns::CONTA),
        descricao: text(columns::DESCRICAO),
        recorrente: row.get(columns::RECORRENTE).is_some_and(parse_bool),
        data: text(columns::DATA),
        valor: row.get(columns::VALOR).map(parse_amount).unwrap_or(0.0),
        id_parcela: text(columns::ID_PARCELA),
        sheet,
    }
}

/// Render a cell as display text
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse an amount such as `1234.56`, `R$ 1.234,56` or `-45,90`; unparseable is 0
pub fn parse_amount(value: &Value) -> f64 {
    if let Value::Number(n) = value {
        return n.as_f64().unwrap_or(0.0);
    }

    let text = cell_text(value).replace("R$", "");
    let text = text.trim();

    if let Ok(amount) = text.parse::<f64>() {
        return amount;
    }

    // pt-BR: dot groups thousands, comma separates decimals
    text.replace('.', "")
        .replace(',', ".")
        .parse::<f64>()
        .unwrap_or(0.0)
}

/// `sim`, `yes` and `true` in any case are true
pub fn parse_bool(value: &Value) -> bool {
    if let Value::Bool(b) = value {
        return *b;
    }
    matches!(
        cell_text(value).to_lowercase().as_str(),
        "sim" | "yes" | "true"
    )
}

/// ES rows still open for conciliation
pub fn is_open_candidate(es: &Transaction) -> bool {
    es.recorrente && es.id_parcela.is_empty()
}

/// DIF rows with neither owner nor amount are blank lines
pub fn is_blank(dif: &Transaction) -> bool {
    dif.dono.is_empty() && dif.valor == 0.0
}

/// Same owner, bank and account, amounts within [`AMOUNT_TOLERANCE`]
pub fn is_match(dif: &Transaction, es: &Transaction) -> bool {
    dif.dono == es.dono
        && dif.banco == es.banco
        && dif.conta == es.conta
        && (dif.valor - es.valor).abs() < AMOUNT_TOLERANCE
}

/// Rows after the header, paired with their sheet index
pub fn data_rows(rows: &[Row]) -> impl Iterator<Item = (usize, &Row)> {
    rows.iter().enumerate().skip(1)
}
