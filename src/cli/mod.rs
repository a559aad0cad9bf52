pub mod add;
pub mod backup;
pub mod browse;
pub mod edit;
pub mod export;
pub mod init;
pub mod list;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{db_path, get_connection};
use crate::error::{LedgerError, Result};
use crate::settings::{get_data_dir, load_settings, shellexpand_path, Settings};

/// Resolved settings for one run.
pub struct Context {
    pub data_dir: PathBuf,
    pub settings: Settings,
}

impl Context {
    pub fn resolve(data_dir: Option<&str>) -> Self {
        let settings = load_settings();
        let data_dir = match data_dir {
            Some(dir) => PathBuf::from(shellexpand_path(dir)),
            None => get_data_dir(),
        };
        Self { data_dir, settings }
    }

    pub fn open(&self) -> Result<Connection> {
        get_connection(&db_path(&self.data_dir))
    }

    pub fn symbol(&self) -> &str {
        &self.settings.currency_symbol
    }
}

/// Turn a 1-based row number from the command line into an index.
pub(crate) fn row_index(row: usize) -> Result<usize> {
    row.checked_sub(1)
        .ok_or_else(|| LedgerError::Other("Row numbers start at 1".into()))
}

pub(crate) fn report_missing(row: usize) {
    eprintln!("No record at row {row}; nothing changed.");
}

fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got `{s}`")),
    }
}

#[derive(Parser)]
#[command(name = "ledgerbook", about = "Receivables ledger with payment-status tracking.")]
pub struct Cli {
    /// Data directory holding ledgerbook.db (default: from settings)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up ledgerbook: save the data directory and create the store.
    Init,
    /// Add a record. Payment markers are always left blank.
    Add {
        /// Field value, e.g. --set company=Acme --set drAmt=1500
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },
    /// Print the ledger table.
    List {
        /// Show a short summary instead of every field
        #[arg(long)]
        compact: bool,
    },
    /// Edit one cell of a record.
    Edit {
        /// Row number (shown by `ledgerbook list`)
        row: usize,
        /// Field id, e.g. drAmt or collectionDate
        field: String,
        /// New value; numbers are stored as numbers
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Delete a record. Later rows move up by one.
    Delete {
        /// Row number (shown by `ledgerbook list`)
        row: usize,
    },
    /// Toggle paid/unpaid on a record.
    Paid {
        /// Row number (shown by `ledgerbook list`)
        row: usize,
    },
    /// Interactively browse and edit the ledger.
    Browse,
    /// Show data locations and a count of records per status.
    Status,
    /// Export the ledger table to CSV.
    Export {
        /// Output path (default: <data_dir>/exports/ledger-YYYY-MM-DD.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Back up the store.
    Backup {
        /// Output path (default: <data_dir>/backups/ledgerbook-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
}
