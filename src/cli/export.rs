use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::Result;
use crate::render::{header, render_rows, LedgerRow};
use crate::store::RecordStore;

use super::Context;

fn default_path(data_dir: &Path) -> PathBuf {
    let date = Local::now().format("%Y-%m-%d").to_string();
    data_dir.join("exports").join(format!("ledger-{date}.csv"))
}

/// Write rendered rows as CSV: one column per field plus Status.
pub fn write_csv<W: std::io::Write>(rows: &[LedgerRow], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    let mut head = header();
    head.push("Status");
    wtr.write_record(&head)?;
    for row in rows {
        let mut cells: Vec<&str> = row.cells.iter().map(String::as_str).collect();
        cells.push(row.status.label());
        wtr.write_record(&cells)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn run(ctx: &Context, output: Option<String>) -> Result<()> {
    let conn = ctx.open()?;
    let records = RecordStore::new(&conn).load()?;
    let rows = render_rows(&records, Local::now().date_naive(), ctx.symbol());

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&ctx.data_dir));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(&path)?;
    write_csv(&rows, file)?;

    log::info!("exported {} rows to {}", rows.len(), path.display());
    println!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, COLLECTION_DATE};
    use chrono::NaiveDate;

    #[test]
    fn test_write_csv_header_and_rows() {
        let mut r = Record::from_form([("company", "Acme, Inc."), ("drAmt", "10")]).unwrap();
        r.set(COLLECTION_DATE, "2025-06-01".into());
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let rows = render_rows(&[r], today, "$");

        let mut buf = Vec::new();
        write_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        let head = lines.next().unwrap();
        assert!(head.starts_with("Month,Booking Date"));
        assert!(head.ends_with(",Status"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Acme, Inc.\""));
        assert!(row.contains("$10.00"));
        assert!(row.ends_with(",Overdue"));
    }
}
