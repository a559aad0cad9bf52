//! The record sequence and its single stored blob.
//!
//! Every mutation reads the whole sequence, changes it in memory and writes
//! the whole sequence back. A record's identity is its index.

use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::Connection;

use crate::db::{get_item, remove_item, set_item};
use crate::error::Result;
use crate::models::{field_or_err, Record};
use crate::status;

pub const ENTRIES_KEY: &str = "entries";

pub struct RecordStore<'a> {
    conn: &'a Connection,
}

impl<'a> RecordStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Current records in storage order. An absent or unreadable blob is an empty ledger.
    pub fn load(&self) -> Result<Vec<Record>> {
        let Some(blob) = get_item(self.conn, ENTRIES_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<Record>>(&blob) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!("stored entries unreadable, treating ledger as empty: {e}");
                Ok(Vec::new())
            }
        }
    }

    /// Write the whole sequence back. An empty ledger drops the stored key.
    pub fn save(&self, records: &[Record]) -> Result<()> {
        if records.is_empty() {
            return remove_item(self.conn, ENTRIES_KEY);
        }
        let blob = serde_json::to_string(records)?;
        set_item(self.conn, ENTRIES_KEY, &blob)
    }

    /// Append a new record with blank payment markers. Returns its index.
    pub fn append(&self, mut record: Record) -> Result<usize> {
        record.clear_markers();
        let mut records = self.load()?;
        records.push(record);
        self.save(&records)?;
        let index = records.len() - 1;
        info!("appended record at index {index}");
        Ok(index)
    }

    /// Apply an inline edit to one cell. Returns false (and writes nothing)
    /// when there is no record at `index`.
    pub fn edit_cell(&self, index: usize, field_id: &str, input: &str) -> Result<bool> {
        let def = field_or_err(field_id)?;
        let value = def.coerce_edit(input)?;
        let mut records = self.load()?;
        let Some(record) = records.get_mut(index) else {
            return Ok(false);
        };
        record.set(def.id, value);
        self.save(&records)?;
        info!("edited {field_id} at index {index}");
        Ok(true)
    }

    /// Remove the record at `index`; later records shift down by one.
    pub fn delete(&self, index: usize) -> Result<Option<Record>> {
        let mut records = self.load()?;
        if index >= records.len() {
            return Ok(None);
        }
        let removed = records.remove(index);
        self.save(&records)?;
        info!("deleted record at index {index}");
        Ok(Some(removed))
    }

    /// Flip paid/unpaid on the record at `index`. Returns the new paid state.
    pub fn toggle_paid(&self, index: usize, today: NaiveDate) -> Result<Option<bool>> {
        let mut records = self.load()?;
        let Some(record) = records.get_mut(index) else {
            return Ok(None);
        };
        let paid = status::toggle_paid(record, today);
        self.save(&records)?;
        info!("index {index} marked {}", if paid { "paid" } else { "unpaid" });
        Ok(Some(paid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::get_connection;
    use crate::models::{FieldValue, COLLECTED, COLLECTION_DATE, DATA_COLLECTED, MONTH_COLLECTED};
    use crate::render::{render_rows, RowClass};
    use crate::status::{derive_status, Status};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        (dir, conn)
    }

    fn record(company: &str) -> Record {
        Record::from_form([("company", company)]).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_load_empty_when_absent() {
        let (_dir, conn) = test_db();
        assert!(RecordStore::new(&conn).load().unwrap().is_empty());
    }

    #[test]
    fn test_load_empty_when_unparsable() {
        let (_dir, conn) = test_db();
        set_item(&conn, ENTRIES_KEY, "{not json").unwrap();
        assert!(RecordStore::new(&conn).load().unwrap().is_empty());
        set_item(&conn, ENTRIES_KEY, r#"{"company":"Acme"}"#).unwrap();
        assert!(RecordStore::new(&conn).load().unwrap().is_empty());
    }

    #[test]
    fn test_append_preserves_order_and_reload() {
        let (_dir, conn) = test_db();
        let store = RecordStore::new(&conn);
        assert_eq!(store.append(record("A")).unwrap(), 0);
        assert_eq!(store.append(record("B")).unwrap(), 1);
        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded[0].raw_text("company"), "A");
        assert_eq!(reloaded[1].raw_text("company"), "B");
    }

    #[test]
    fn test_append_blanks_markers_even_if_set() {
        let (_dir, conn) = test_db();
        let store = RecordStore::new(&conn);
        let mut r = record("A");
        r.set(COLLECTED, "Yes".into());
        r.set(MONTH_COLLECTED, "June 2025".into());
        store.append(r).unwrap();
        let saved = &store.load().unwrap()[0];
        assert!(saved.is_blank(COLLECTED));
        assert!(saved.is_blank(MONTH_COLLECTED));
    }

    #[test]
    fn test_edit_numeric_and_text() {
        let (_dir, conn) = test_db();
        let store = RecordStore::new(&conn);
        store.append(record("A")).unwrap();

        assert!(store.edit_cell(0, "drAmt", "123.5").unwrap());
        assert_eq!(store.load().unwrap()[0].get("drAmt"), &FieldValue::Number(123.5));

        assert!(store.edit_cell(0, "drAmt", "abc").unwrap());
        assert_eq!(store.load().unwrap()[0].get("drAmt"), &FieldValue::Text("abc".into()));
    }

    #[test]
    fn test_edit_collection_date_is_not_coerced() {
        let (_dir, conn) = test_db();
        let store = RecordStore::new(&conn);
        store.append(record("A")).unwrap();
        assert!(store.edit_cell(0, COLLECTION_DATE, "2025-07-01").unwrap());
        assert_eq!(
            store.load().unwrap()[0].get(COLLECTION_DATE),
            &FieldValue::Text("2025-07-01".into())
        );
        assert!(store.edit_cell(0, COLLECTION_DATE, "tomorrow").is_err());
    }

    #[test]
    fn test_edit_missing_index_is_noop() {
        let (_dir, conn) = test_db();
        let store = RecordStore::new(&conn);
        store.append(record("A")).unwrap();
        let before = get_item(&conn, ENTRIES_KEY).unwrap();
        assert!(!store.edit_cell(5, "company", "B").unwrap());
        assert_eq!(store.toggle_paid(5, today()).unwrap(), None);
        assert!(store.delete(5).unwrap().is_none());
        assert_eq!(get_item(&conn, ENTRIES_KEY).unwrap(), before);
    }

    #[test]
    fn test_delete_shifts_later_records() {
        let (_dir, conn) = test_db();
        let store = RecordStore::new(&conn);
        for name in ["A", "B", "C", "D"] {
            store.append(record(name)).unwrap();
        }
        let removed = store.delete(1).unwrap().unwrap();
        assert_eq!(removed.raw_text("company"), "B");
        let names: Vec<String> = store.load().unwrap().iter().map(|r| r.raw_text("company")).collect();
        assert_eq!(names, vec!["A", "C", "D"]);
    }

    #[test]
    fn test_toggle_paid_twice() {
        let (_dir, conn) = test_db();
        let store = RecordStore::new(&conn);
        store.append(record("A")).unwrap();
        store.edit_cell(0, COLLECTION_DATE, "2025-06-16").unwrap();

        assert_eq!(store.toggle_paid(0, today()).unwrap(), Some(true));
        let r = &store.load().unwrap()[0];
        assert_eq!(r.raw_text(DATA_COLLECTED), "2025-06-15");
        assert_eq!(derive_status(r, today()), Status::Paid);

        assert_eq!(store.toggle_paid(0, today()).unwrap(), Some(false));
        let r = &store.load().unwrap()[0];
        assert!(r.is_blank(DATA_COLLECTED));
        assert_eq!(derive_status(r, today()), Status::OnTime);
    }

    #[test]
    fn test_reload_renders_identical_rows() {
        let (_dir, conn) = test_db();
        let store = RecordStore::new(&conn);

        let mut overdue = Record::from_form([
            ("company", "Acme"),
            ("bookingYear", "2025"),
            ("drAmt", "1500.75"),
            ("days", "30"),
            (COLLECTION_DATE, "2025-06-01"),
        ])
        .unwrap();
        overdue.set("drNumber", FieldValue::from_input("88"));
        let mut paid = Record::from_form([("company", "Bravo"), ("balance", "0")]).unwrap();
        status::toggle_paid(&mut paid, today());
        let mut odd = Record::from_form([("company", "Charlie"), (COLLECTION_DATE, "2025-06-15")]).unwrap();
        odd.set("ewt", FieldValue::Text("pending".into()));
        let original = vec![overdue, paid, odd];

        store.save(&original).unwrap();
        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, original);

        let before = render_rows(&original, today(), "$");
        let after = render_rows(&reloaded, today(), "$");
        assert_eq!(before, after);
        let classes: Vec<RowClass> = after.iter().map(|r| r.class).collect();
        assert_eq!(classes, vec![RowClass::Overdue, RowClass::Paid, RowClass::Plain]);
        assert_eq!(after[2].status, Status::DueToday);
    }

    #[test]
    fn test_deleting_last_record_drops_key() {
        let (_dir, conn) = test_db();
        let store = RecordStore::new(&conn);
        store.append(record("A")).unwrap();
        store.delete(0).unwrap();
        assert_eq!(get_item(&conn, ENTRIES_KEY).unwrap(), None);
        assert!(store.load().unwrap().is_empty());
    }
}
