use chrono::Local;

use crate::error::Result;
use crate::models::field_or_err;
use crate::store::RecordStore;

use super::{report_missing, row_index, Context};

pub fn edit(ctx: &Context, row: usize, field: &str, value: &str) -> Result<()> {
    let index = row_index(row)?;
    let def = field_or_err(field)?;
    let conn = ctx.open()?;
    if RecordStore::new(&conn).edit_cell(index, def.id, value)? {
        println!("Updated {} on row {row}", def.label);
    } else {
        report_missing(row);
    }
    Ok(())
}

pub fn delete(ctx: &Context, row: usize) -> Result<()> {
    let index = row_index(row)?;
    let conn = ctx.open()?;
    match RecordStore::new(&conn).delete(index)? {
        Some(record) => {
            let company = record.raw_text("company");
            if company.is_empty() {
                println!("Deleted row {row}");
            } else {
                println!("Deleted row {row} ({company})");
            }
        }
        None => report_missing(row),
    }
    Ok(())
}

pub fn toggle_paid(ctx: &Context, row: usize) -> Result<()> {
    let index = row_index(row)?;
    let conn = ctx.open()?;
    match RecordStore::new(&conn).toggle_paid(index, Local::now().date_naive())? {
        Some(true) => println!("Row {row} marked paid"),
        Some(false) => println!("Row {row} marked unpaid"),
        None => report_missing(row),
    }
    Ok(())
}
