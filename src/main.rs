use anyhow::{anyhow, Context, Result};
use clap::Parser;
use itertools::Itertools;
use sqlite_inspect::sqlite::core::serial_type::Value;
use sqlite_inspect::sqlite::SQLiteDatabase;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    run(args)
}

pub fn run(args: cli::Args) -> Result<()> {
    let command = args.to_command().map_err(|e| anyhow!(e))?;
    info!("Command: {}", command);

    let db = SQLiteDatabase::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    match command {
        cli::Command::DbInfo => {
            let info = db.get_info()?;
            println!("{}", format_info(info.page_size(), info.num_tables()));
        }
        cli::Command::Tables => {
            let tables = db.list_tables()?;
            println!("{}", format_tables(&tables));
        }
        cli::Command::Count(table) => {
            let count = db
                .count_rows(&table)
                .with_context(|| format!("failed to count rows of {}", table))?;
            println!("{}", count);
        }
        cli::Command::Rows(table) => {
            for row in db.table_rows(&table)? {
                let values = row.record().values()?;
                println!("{}", format_row(row.row_id(), &values));
            }
        }
    }
    Ok(())
}

/// `.dbinfo` output.
fn format_info(page_size: u32, num_tables: usize) -> String {
    format!(
        "database page size: {}\nnumber of tables: {}",
        page_size, num_tables
    )
}

fn format_tables(tables: &[String]) -> String {
    tables.iter().join(" ")
}

/// One `.rows` line: the rowid followed by every column, NULL as empty.
fn format_row(row_id: u64, values: &[Value<'_>]) -> String {
    std::iter::once(row_id.to_string())
        .chain(values.iter().map(|v| v.to_string()))
        .join("|")
}
