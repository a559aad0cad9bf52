use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{LedgerError, Result};

pub const COLLECTED: &str = "collected";
pub const DATA_COLLECTED: &str = "dataCollected";
pub const MONTH_COLLECTED: &str = "monthCollected";
pub const COLLECTION_DATE: &str = "collectionDate";

/// The three fields whose non-blank state means "paid".
pub const MARKERS: [&str; 3] = [COLLECTED, DATA_COLLECTED, MONTH_COLLECTED];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Number,
}

/// How an inline edit is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditInput {
    /// Number if it parses, trimmed text otherwise.
    Coerce,
    /// Stored as typed; must be empty or a calendar date.
    Date,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Numbers in this field are shown bare rather than as money.
    pub plain_number: bool,
    pub edit: EditInput,
}

const fn text(id: &'static str, label: &'static str) -> FieldDef {
    FieldDef { id, label, kind: FieldKind::Text, plain_number: false, edit: EditInput::Coerce }
}

const fn date(id: &'static str, label: &'static str) -> FieldDef {
    FieldDef { id, label, kind: FieldKind::Date, plain_number: false, edit: EditInput::Coerce }
}

const fn money(id: &'static str, label: &'static str) -> FieldDef {
    FieldDef { id, label, kind: FieldKind::Number, plain_number: false, edit: EditInput::Coerce }
}

const fn count(id: &'static str, label: &'static str) -> FieldDef {
    FieldDef { id, label, kind: FieldKind::Number, plain_number: true, edit: EditInput::Coerce }
}

pub const FIELDS: &[FieldDef] = &[
    text("month", "Month"),
    date("bookingDate", "Booking Date"),
    count("bookingYear", "Booking Year"),
    text("drNumber", "DR No."),
    money("drAmt", "DR Amount"),
    money("serviceAmt", "Service Amount"),
    date("drDate", "DR Date"),
    date("deliveryDate", "Delivery Date"),
    text("company", "Company"),
    text("poNumber", "PO No."),
    text("agent", "Agent"),
    count("days", "Days"),
    text("terms", "Terms"),
    FieldDef {
        id: COLLECTION_DATE,
        label: "Collection Date",
        kind: FieldKind::Date,
        plain_number: false,
        edit: EditInput::Date,
    },
    text("paymentDetails", "Payment Details"),
    text("prcg", "PRCG"),
    text(COLLECTED, "Collected"),
    money("paymentAmt", "Payment Amount"),
    money("ewt", "EWT"),
    money("balance", "Balance"),
    date(DATA_COLLECTED, "Date Collected"),
    count("numDays", "No. of Days"),
    text("remarks", "Remarks"),
    text(MONTH_COLLECTED, "Month Collected"),
    text("commissionStatus", "Commission Status"),
    text("commissionReleasing", "Commission Releasing"),
];

pub fn field(id: &str) -> Option<&'static FieldDef> {
    FIELDS.iter().find(|f| f.id == id)
}

pub fn field_or_err(id: &str) -> Result<&'static FieldDef> {
    field(id).ok_or_else(|| LedgerError::UnknownField(id.to_string()))
}

pub fn is_marker(id: &str) -> bool {
    MARKERS.contains(&id)
}

pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

impl FieldDef {
    /// Read back the text typed into an inline edit of this field.
    pub fn coerce_edit(&self, input: &str) -> Result<FieldValue> {
        match self.edit {
            EditInput::Coerce => Ok(FieldValue::from_input(input)),
            EditInput::Date => {
                let raw = input.trim();
                if raw.is_empty() || parse_iso_date(raw).is_some() {
                    Ok(FieldValue::Text(raw.to_string()))
                } else {
                    Err(LedgerError::InvalidDate {
                        field: self.id.to_string(),
                        value: input.to_string(),
                    })
                }
            }
        }
    }

    /// Read back a creation-form input: numbers must parse, everything else is trimmed text.
    pub fn coerce_form(&self, input: &str) -> Result<FieldValue> {
        let val = input.trim();
        if self.kind != FieldKind::Number || val.is_empty() {
            return Ok(FieldValue::Text(val.to_string()));
        }
        match parse_number(val) {
            Some(n) => Ok(FieldValue::Number(n)),
            None => Err(LedgerError::InvalidNumber {
                field: self.id.to_string(),
                value: val.to_string(),
            }),
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// A stored cell: either a JSON number or a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

static BLANK: FieldValue = FieldValue::Text(String::new());

impl FieldValue {
    pub fn blank() -> Self {
        FieldValue::Text(String::new())
    }

    pub fn from_input(input: &str) -> Self {
        let val = input.trim();
        if val.is_empty() {
            return FieldValue::blank();
        }
        match parse_number(val) {
            Some(n) => FieldValue::Number(n),
            None => FieldValue::Text(val.to_string()),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Number(_) => false,
            FieldValue::Text(s) => s.trim().is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

// Stored blobs may carry nulls or booleans written by other tools; they read as text.
impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => FieldValue::Number(f),
                None => FieldValue::Text(n.to_string()),
            },
            serde_json::Value::String(s) => FieldValue::Text(s),
            serde_json::Value::Null => FieldValue::blank(),
            other => FieldValue::Text(other.to_string()),
        })
    }
}

/// One ledger row. Keys are field ids; absent keys read as blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from creation-form input. Every declared field is
    /// present afterwards; payment markers are always blank.
    pub fn from_form<'a, I>(inputs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut provided: BTreeMap<&str, &str> = BTreeMap::new();
        for (id, val) in inputs {
            field_or_err(id)?;
            provided.insert(id, val);
        }

        let mut record = Record::new();
        for def in FIELDS {
            let value = if is_marker(def.id) {
                FieldValue::blank()
            } else {
                def.coerce_form(provided.get(def.id).copied().unwrap_or(""))?
            };
            record.set(def.id, value);
        }
        Ok(record)
    }

    pub fn get(&self, id: &str) -> &FieldValue {
        self.fields.get(id).unwrap_or(&BLANK)
    }

    pub fn set(&mut self, id: &str, value: FieldValue) {
        self.fields.insert(id.to_string(), value);
    }

    pub fn is_blank(&self, id: &str) -> bool {
        self.get(id).is_blank()
    }

    /// Raw stored value as editable text.
    pub fn raw_text(&self, id: &str) -> String {
        self.get(id).to_string()
    }

    pub fn clear_markers(&mut self) {
        for id in MARKERS {
            self.set(id, FieldValue::blank());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_declared_in_order() {
        assert_eq!(FIELDS.len(), 26);
        assert_eq!(FIELDS[0].id, "month");
        assert_eq!(FIELDS[25].id, "commissionReleasing");
        assert_eq!(field(COLLECTION_DATE).unwrap().edit, EditInput::Date);
    }

    #[test]
    fn test_currency_exemptions() {
        for id in ["bookingYear", "days", "numDays"] {
            let f = field(id).unwrap();
            assert_eq!(f.kind, FieldKind::Number);
            assert!(f.plain_number, "{id} should not be money");
        }
        assert!(!field("drAmt").unwrap().plain_number);
        assert!(!field("drNumber").unwrap().plain_number);
    }

    #[test]
    fn test_from_input_coerces_numbers() {
        assert_eq!(FieldValue::from_input("123.5"), FieldValue::Number(123.5));
        assert_eq!(FieldValue::from_input("  42 "), FieldValue::Number(42.0));
        assert_eq!(FieldValue::from_input("abc"), FieldValue::Text("abc".into()));
        assert_eq!(FieldValue::from_input("  "), FieldValue::blank());
        assert_eq!(FieldValue::from_input("inf"), FieldValue::Text("inf".into()));
    }

    #[test]
    fn test_form_forces_markers_blank() {
        let record = Record::from_form([
            ("company", " Acme "),
            ("drAmt", "1500"),
            (COLLECTED, "Yes"),
            (DATA_COLLECTED, "2025-01-01"),
            (MONTH_COLLECTED, "January 2025"),
        ])
        .unwrap();
        assert_eq!(record.get("company"), &FieldValue::Text("Acme".into()));
        assert_eq!(record.get("drAmt"), &FieldValue::Number(1500.0));
        for id in MARKERS {
            assert!(record.is_blank(id), "{id} should be blank");
        }
        assert_eq!(record.get("remarks"), &FieldValue::blank());
    }

    #[test]
    fn test_form_rejects_non_numeric_number_field() {
        let err = Record::from_form([("drAmt", "lots")]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidNumber { .. }));
    }

    #[test]
    fn test_form_rejects_unknown_field() {
        let err = Record::from_form([("colour", "red")]).unwrap_err();
        assert!(matches!(err, LedgerError::UnknownField(ref f) if f == "colour"));
    }

    #[test]
    fn test_collection_date_edit_requires_date() {
        let def = field(COLLECTION_DATE).unwrap();
        assert_eq!(def.coerce_edit("2025-03-01").unwrap(), FieldValue::Text("2025-03-01".into()));
        assert_eq!(def.coerce_edit("").unwrap(), FieldValue::blank());
        assert!(def.coerce_edit("20250301").is_err());
        assert!(def.coerce_edit("2025-02-30").is_err());
    }

    #[test]
    fn test_deserialize_tolerates_null_and_missing() {
        let record: Record =
            serde_json::from_str(r#"{"company":"Acme","drAmt":12.5,"balance":null}"#).unwrap();
        assert_eq!(record.get("drAmt"), &FieldValue::Number(12.5));
        assert_eq!(record.get("balance"), &FieldValue::blank());
        assert_eq!(record.get("remarks"), &FieldValue::blank());
        assert_eq!(record.raw_text("drAmt"), "12.5");
    }
}
