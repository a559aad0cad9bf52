use chrono::Local;

use crate::db::db_path;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::status::{derive_status, Status};
use crate::store::RecordStore;

use super::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let db = db_path(&ctx.data_dir);

    println!("Data dir:   {}", ctx.data_dir.display());
    println!("Database:   {}", db.display());
    println!("Currency:   {}", ctx.symbol());

    if !db.exists() {
        println!();
        println!("Database not found. Run `ledgerbook init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db)?.len();
    println!("DB size:    {}", format_bytes(size));

    let conn = ctx.open()?;
    let records = RecordStore::new(&conn).load()?;
    let today = Local::now().date_naive();

    println!();
    println!("Records:    {}", records.len());
    for status in Status::ALL {
        let count = records.iter().filter(|r| derive_status(r, today) == status).count();
        let label = match status {
            Status::Undated => "No date",
            other => other.label(),
        };
        println!("  {:<10}{count}", format!("{label}:"));
    }
    Ok(())
}
