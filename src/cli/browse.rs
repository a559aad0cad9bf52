use chrono::Local;

use crate::browser::LedgerBrowser;
use crate::error::Result;
use crate::store::RecordStore;

use super::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let conn = ctx.open()?;
    let store = RecordStore::new(&conn);
    let mut browser = LedgerBrowser::new(store.load()?, Local::now().date_naive(), ctx.symbol());
    browser.run(&store)?;
    Ok(())
}
