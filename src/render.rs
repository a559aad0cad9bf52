use chrono::NaiveDate;

use crate::fmt::money;
use crate::models::{is_marker, FieldDef, FieldValue, Record, FIELDS};
use crate::status::{derive_status, Status, NOT_YET_COLLECTED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    Paid,
    Overdue,
    Plain,
}

impl From<Status> for RowClass {
    fn from(status: Status) -> Self {
        match status {
            Status::Paid => RowClass::Paid,
            Status::Overdue => RowClass::Overdue,
            _ => RowClass::Plain,
        }
    }
}

/// One displayed table row: a cell per declared field plus the derived status.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub index: usize,
    pub cells: Vec<String>,
    pub status: Status,
    pub class: RowClass,
}

/// Any stored number is money unless its field is one of the plain counts,
/// whatever kind the field is declared as.
pub fn format_cell(def: &FieldDef, value: &FieldValue, symbol: &str) -> String {
    match value {
        FieldValue::Number(n) if !def.plain_number => money(*n, symbol),
        other => other.to_string(),
    }
}

pub fn render_row(index: usize, record: &Record, today: NaiveDate, symbol: &str) -> LedgerRow {
    let status = derive_status(record, today);
    let cells = FIELDS
        .iter()
        .map(|def| {
            if status == Status::Overdue && is_marker(def.id) {
                NOT_YET_COLLECTED.to_string()
            } else {
                format_cell(def, record.get(def.id), symbol)
            }
        })
        .collect();
    LedgerRow {
        index,
        cells,
        status,
        class: status.into(),
    }
}

/// Project the whole record sequence, in storage order.
pub fn render_rows(records: &[Record], today: NaiveDate, symbol: &str) -> Vec<LedgerRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| render_row(i, r, today, symbol))
        .collect()
}

pub fn header() -> Vec<&'static str> {
    FIELDS.iter().map(|f| f.label).collect()
}
