use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::Connection;

use crate::db::db_path;
use crate::error::{LedgerError, Result};
use crate::fmt::format_bytes;
use crate::store::RecordStore;

use super::Context;

fn default_dest(data_dir: &Path) -> Result<PathBuf> {
    let backups_dir = data_dir.join("backups");
    std::fs::create_dir_all(&backups_dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    Ok(backups_dir.join(format!("ledgerbook-{stamp}.db")))
}

/// Copy the live store into `dest` page by page. Returns the number of
/// records the copy holds.
pub fn copy_store(conn: &Connection, dest: &Path) -> Result<usize> {
    let mut dest_conn = Connection::open(dest)?;
    {
        let backup = Backup::new(conn, &mut dest_conn)?;
        backup.run_to_completion(100, Duration::from_millis(10), None)?;
    }
    Ok(RecordStore::new(&dest_conn).load()?.len())
}

pub fn run(ctx: &Context, output: Option<String>) -> Result<()> {
    let dest_path = match output {
        Some(p) => PathBuf::from(p),
        None => default_dest(&ctx.data_dir)?,
    };
    if dest_path == db_path(&ctx.data_dir) {
        return Err(LedgerError::Other("Backup path is the live ledger file".into()));
    }

    let conn = ctx.open()?;
    let records = copy_store(&conn, &dest_path)?;

    let size = std::fs::metadata(&dest_path)?.len();
    log::info!("backup of {records} records written to {}", dest_path.display());
    println!("Backup saved to {}", dest_path.display());
    println!("Records: {records}, size: {}", format_bytes(size));
    Ok(())
}
