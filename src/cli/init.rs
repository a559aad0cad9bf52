use crate::db::db_path;
use crate::error::Result;
use crate::settings::save_settings;

use super::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let mut settings = ctx.settings.clone();
    settings.data_dir = ctx.data_dir.to_string_lossy().to_string();
    save_settings(&settings)?;

    std::fs::create_dir_all(&ctx.data_dir)?;
    std::fs::create_dir_all(ctx.data_dir.join("exports"))?;
    ctx.open()?;

    log::info!("initialized store at {}", db_path(&ctx.data_dir).display());
    println!("Initialized ledgerbook at {}", ctx.data_dir.display());
    Ok(())
}
