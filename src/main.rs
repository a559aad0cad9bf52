mod browser;
mod cli;
mod db;
mod error;
mod fmt;
mod logging;
mod models;
mod render;
mod settings;
mod status;
mod store;
mod tui;

use clap::Parser;

use cli::{Cli, Commands, Context};

fn main() {
    let cli = Cli::parse();
    let ctx = Context::resolve(cli.data_dir.as_deref());

    // Runs without logs if the log directory is unusable.
    let logger = logging::init_logging(&ctx.settings.log_level, &ctx.data_dir.join("logs")).ok();

    let result = match cli.command {
        Some(Commands::Init) => cli::init::run(&ctx),
        Some(Commands::Add { values }) => cli::add::run(&ctx, &values),
        Some(Commands::List { compact }) => cli::list::run(&ctx, compact),
        Some(Commands::Edit { row, field, value }) => cli::edit::edit(&ctx, row, &field, &value),
        Some(Commands::Delete { row }) => cli::edit::delete(&ctx, row),
        Some(Commands::Paid { row }) => cli::edit::toggle_paid(&ctx, row),
        Some(Commands::Status) => cli::status::run(&ctx),
        Some(Commands::Export { output }) => cli::export::run(&ctx, output),
        Some(Commands::Backup { output }) => cli::backup::run(&ctx, output),
        Some(Commands::Browse) | None => cli::browse::run(&ctx),
    };

    if let Err(e) = result {
        log::error!("{e}");
        if let Some(handle) = &logger {
            handle.flush();
        }
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
