use clap::Parser;
use regex::Regex;
use std::{fmt::Display, path::PathBuf, sync::OnceLock};

/// Available commands for the SQLite CLI
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    DbInfo,
    Tables,
    /// Cell count of a table's root page
    Count(String),
    /// Decoded rows of a table's root page
    Rows(String),
}

impl std::str::FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        match words.as_slice() {
            [".dbinfo"] => Ok(Command::DbInfo),
            [".tables"] => Ok(Command::Tables),
            [".count", table] => Ok(Command::Count(table.to_string())),
            [".rows", table] => Ok(Command::Rows(table.to_string())),
            _ => parse_count_statement(s)?
                .map(Command::Count)
                .ok_or_else(|| format!("Unknown command: {}", s)),
        }
    }
}

/// Compiled once per process.
fn count_pattern() -> Result<&'static Regex, String> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"(?i)^\s*select\s+count\(\s*\*\s*\)\s+from\s+([A-Za-z_][A-Za-z0-9_]*)\s*;?\s*$",
            )
        })
        .as_ref()
        .map_err(|e| e.to_string())
}

/// Recognises `SELECT COUNT(*) FROM <table>`, the only statement accepted.
fn parse_count_statement(s: &str) -> Result<Option<String>, String> {
    Ok(count_pattern()?
        .captures(s)
        .and_then(|caps| caps.get(1))
        .map(|table| table.as_str().to_string()))
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::DbInfo => write!(f, ".dbinfo"),
            Command::Tables => write!(f, ".tables"),
            Command::Count(table) => write!(f, ".count {}", table),
            Command::Rows(table) => write!(f, ".rows {}", table),
        }
    }
}

/// Command line arguments for the SQLite CLI
#[derive(Debug, Parser)]
#[command(version, about = "Inspect the pages of a SQLite database file")]
pub struct Args {
    /// Path to the database file
    pub file: PathBuf,

    /// .dbinfo, .tables, .count <table>, .rows <table> or "SELECT COUNT(*) FROM <table>"
    #[arg(required = true, num_args = 1..)]
    command: Vec<String>,
}

impl Args {
    pub fn to_command(&self) -> Result<Command, String> {
        self.command.join(" ").parse()
    }
}
