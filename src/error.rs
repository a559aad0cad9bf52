use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("{field} expects a number, got {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("{field} expects a date (YYYY-MM-DD), got {value:?}")]
    InvalidDate { field: String, value: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
