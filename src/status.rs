use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{
    parse_iso_date, FieldValue, Record, COLLECTED, COLLECTION_DATE, DATA_COLLECTED,
    MONTH_COLLECTED,
};

/// Text shown in the payment-marker cells of an overdue row.
pub const NOT_YET_COLLECTED: &str = "Not yet collected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Paid,
    Overdue,
    DueToday,
    OnTime,
    /// No collection date and not paid.
    Undated,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Paid,
        Status::Overdue,
        Status::DueToday,
        Status::OnTime,
        Status::Undated,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Status::Paid => "Paid",
            Status::Overdue => "Overdue",
            Status::DueToday => "Due Today",
            Status::OnTime => "On Time",
            Status::Undated => "",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn iso_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex"))
}

/// True when any payment marker says the record has been collected.
pub fn is_paid(record: &Record) -> bool {
    let date_marker = record
        .get(DATA_COLLECTED)
        .as_text()
        .is_some_and(|s| iso_date_re().is_match(s) && parse_iso_date(s).is_some());
    date_marker || !record.is_blank(COLLECTED) || !record.is_blank(MONTH_COLLECTED)
}

fn collection_date(record: &Record) -> Option<NaiveDate> {
    record.get(COLLECTION_DATE).as_text().and_then(|s| parse_iso_date(s.trim()))
}

/// Payment status of `record` as of `today`.
pub fn derive_status(record: &Record, today: NaiveDate) -> Status {
    if is_paid(record) {
        return Status::Paid;
    }
    match collection_date(record) {
        Some(due) if due < today => Status::Overdue,
        Some(due) if due == today => Status::DueToday,
        Some(_) => Status::OnTime,
        None => Status::Undated,
    }
}

/// Flip a record between paid and unpaid. Returns the new paid state.
pub fn toggle_paid(record: &mut Record, today: NaiveDate) -> bool {
    if is_paid(record) {
        record.clear_markers();
        false
    } else {
        record.set(DATA_COLLECTED, FieldValue::Text(today.format("%Y-%m-%d").to_string()));
        record.set(COLLECTED, FieldValue::from("Yes"));
        record.set(MONTH_COLLECTED, FieldValue::Text(today.format("%B %Y").to_string()));
        true
    }
}
