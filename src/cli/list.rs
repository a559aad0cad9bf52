use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::models::FIELDS;
use crate::render::{header, render_rows, LedgerRow, RowClass};
use crate::store::RecordStore;

use super::Context;

const COMPACT_FIELDS: &[&str] = &["company", "drNumber", "drAmt", "collectionDate", "balance"];

fn status_cell(row: &LedgerRow) -> Cell {
    let label = row.status.label();
    match row.class {
        RowClass::Paid => Cell::new(label.green().bold()),
        RowClass::Overdue => Cell::new(label.red().bold()),
        RowClass::Plain => Cell::new(label),
    }
}

pub fn build_table(rows: &[LedgerRow], compact: bool) -> Table {
    let columns: Vec<usize> = if compact {
        COMPACT_FIELDS
            .iter()
            .filter_map(|id| FIELDS.iter().position(|f| f.id == *id))
            .collect()
    } else {
        (0..FIELDS.len()).collect()
    };

    let labels = header();
    let mut head = vec!["#"];
    head.extend(columns.iter().map(|&c| labels[c]));
    head.push("Status");

    let mut table = Table::new();
    table.set_header(head);
    for row in rows {
        let mut cells = vec![Cell::new(row.index + 1)];
        cells.extend(columns.iter().map(|&c| Cell::new(&row.cells[c])));
        cells.push(status_cell(row));
        table.add_row(cells);
    }
    table
}

pub fn run(ctx: &Context, compact: bool) -> Result<()> {
    let conn = ctx.open()?;
    let records = RecordStore::new(&conn).load()?;
    if records.is_empty() {
        println!("No records. Add one with `ledgerbook add`.");
        return Ok(());
    }
    let rows = render_rows(&records, Local::now().date_naive(), ctx.symbol());
    println!("Ledger\n{}", build_table(&rows, compact));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldValue, Record, COLLECTED};
    use chrono::NaiveDate;

    fn rows() -> Vec<LedgerRow> {
        let mut paid = Record::from_form([("company", "Acme"), ("drAmt", "1500")]).unwrap();
        paid.set(COLLECTED, FieldValue::from("Yes"));
        let open = Record::from_form([("company", "Globex")]).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        render_rows(&[paid, open], today, "$")
    }

    #[test]
    fn test_compact_table_has_summary_columns() {
        let out = build_table(&rows(), true).to_string();
        assert!(out.contains("Company"));
        assert!(out.contains("Acme"));
        assert!(out.contains("$1500.00"));
        assert!(out.contains("Paid"));
        assert!(!out.contains("Commission Status"));
    }

    #[test]
    fn test_full_table_has_every_field() {
        let mut table = build_table(&rows(), false);
        assert_eq!(table.column_count(), FIELDS.len() + 2);
    }
}
