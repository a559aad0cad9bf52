use crate::error::Result;
use crate::models::Record;
use crate::store::RecordStore;

use super::Context;

pub fn run(ctx: &Context, values: &[(String, String)]) -> Result<()> {
    let record = Record::from_form(values.iter().map(|(f, v)| (f.as_str(), v.as_str())))?;
    let conn = ctx.open()?;
    let index = RecordStore::new(&conn).append(record)?;
    println!("Added record at row {}", index + 1);
    Ok(())
}
