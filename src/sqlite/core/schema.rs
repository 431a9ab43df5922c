use super::record::Record;
use crate::sqlite::error::{Error, Result};
use tracing::debug;

/// Column positions of the `sqlite_schema` table.
pub const TYPE_COLUMN: usize = 0;
pub const NAME_COLUMN: usize = 1;
pub const TABLE_NAME_COLUMN: usize = 2;
pub const ROOT_PAGE_COLUMN: usize = 3;
pub const SQL_COLUMN: usize = 4;

/// One row of `sqlite_schema`: a table, index, view or trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    pub kind: String,
    pub name: String,
    pub table_name: String,
    /// Zero for views and triggers
    pub root_page: u32,
    pub sql: Option<String>,
}

impl SchemaEntry {
    /// Maps the record's fields onto the schema columns by position.
    pub fn from_record(row_id: u64, record: &Record<'_>) -> Result<Self> {
        let entry = SchemaEntry {
            kind: text_column(row_id, record, TYPE_COLUMN)?.to_string(),
            name: text_column(row_id, record, NAME_COLUMN)?.to_string(),
            table_name: text_column(row_id, record, TABLE_NAME_COLUMN)?.to_string(),
            root_page: root_page_column(row_id, record)?,
            sql: match record.field(SQL_COLUMN) {
                Some(field) => field.value()?.as_text().map(str::to_string),
                None => None,
            },
        };
        debug!("Schema entry: {:?}", entry);
        Ok(entry)
    }

    pub fn is_table(&self) -> bool {
        self.kind == "table"
    }

    /// Tables SQLite creates for its own bookkeeping, e.g. `sqlite_sequence`.
    pub fn is_internal(&self) -> bool {
        self.name.starts_with("sqlite_")
    }
}

/// Decodes a text column, failing when it is missing or not text.
pub fn text_column<'a>(row_id: u64, record: &Record<'a>, index: usize) -> Result<&'a str> {
    let field = record.field(index).ok_or_else(|| missing(row_id, index))?;
    field
        .value()?
        .as_text()
        .ok_or_else(|| Error::MalformedSchemaRow {
            row_id,
            reason: format!("column {} is {:?}, expected text", index, field.kind()),
        })
}

/// Decodes the root page column. Any integer kind is accepted, including the
/// constant 0 and 1 encodings.
pub fn root_page_column(row_id: u64, record: &Record<'_>) -> Result<u32> {
    let field = record
        .field(ROOT_PAGE_COLUMN)
        .ok_or_else(|| missing(row_id, ROOT_PAGE_COLUMN))?;
    if !field.kind().is_integer() {
        return Err(Error::MalformedSchemaRow {
            row_id,
            reason: format!("root page is {:?}, expected an integer", field.kind()),
        });
    }

    let page = field.value()?.as_integer().unwrap_or_default();
    u32::try_from(page).map_err(|_| Error::MalformedSchemaRow {
        row_id,
        reason: format!("root page {} is out of range", page),
    })
}

fn missing(row_id: u64, index: usize) -> Error {
    Error::MalformedSchemaRow {
        row_id,
        reason: format!("missing column {}", index),
    }
}
