//! SQLite File Format Implementation
//!
//! This module ties the page decoders together behind a database handle.
//!
//! # SQLite File Structure
//!
//! A SQLite database file consists of one or more pages. The first page (page 1) contains:
//!
//! - Database header (100 bytes)
//! - First page of the sqlite_schema table
//!
//! Every other page starts its B-tree page header at byte 0 of the page.
//!
//! ## B-tree Page Structure
//!
//! Each page in the database file is a B-tree page that contains:
//!
//! - Page header (8-12 bytes)
//! - Cell pointer array
//! - Unallocated space
//! - Cell content area
//! - Reserved region

use super::btree::PageHeader;
use super::core::cell::Cell;
use super::core::header::DatabaseHeader;
use super::core::schema::SchemaEntry;
use super::error::Result;
use super::source::ByteSource;
use super::storage::table::{Row, TableReader, SCHEMA_PAGE};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Represents a SQLite database file
pub struct SQLiteDatabase<S = File> {
    /// The underlying byte source
    source: S,
    header: DatabaseHeader,
}

/// Contains metadata about a SQLite database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SQLiteDatabaseInfo {
    /// Size of each page in bytes
    page_size: u32,
    /// Number of cells on the schema page
    num_tables: usize,
}

impl SQLiteDatabaseInfo {
    /// Returns the page size in bytes
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the number of `sqlite_schema` rows on page 1
    pub fn num_tables(&self) -> usize {
        self.num_tables
    }
}

impl SQLiteDatabase<File> {
    /// Opens a SQLite database file at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening database {}", path.display());
        Self::from_source(File::open(path)?)
    }
}

impl<S: ByteSource> SQLiteDatabase<S> {
    /// Reads the file header of `source`. Nothing else is read until asked.
    pub fn from_source(source: S) -> Result<Self> {
        let header = DatabaseHeader::read(&source)?;
        Ok(Self { source, header })
    }

    pub fn header(&self) -> &DatabaseHeader {
        &self.header
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn tables(&self) -> TableReader<'_, S> {
        TableReader::new(&self.source, &self.header)
    }

    /// Page size and the number of schema rows, as `.dbinfo` reports them.
    pub fn get_info(&self) -> Result<SQLiteDatabaseInfo> {
        Ok(SQLiteDatabaseInfo {
            page_size: self.header.page_size_bytes(),
            num_tables: self.row_count(SCHEMA_PAGE)?,
        })
    }

    pub fn read_page(&self, page_number: u32) -> Result<PageHeader> {
        PageHeader::read(&self.source, &self.header, page_number)
    }

    pub fn cell_offsets(&self, page: &PageHeader) -> Result<Vec<u64>> {
        page.cell_offsets(&self.source)
    }

    pub fn read_cell(&self, offset: u64) -> Result<Cell> {
        Cell::read(&self.source, offset)
    }

    pub fn rows(&self, page_number: u32) -> Result<Vec<Row>> {
        self.tables().rows(page_number)
    }

    pub fn row_count(&self, page_number: u32) -> Result<usize> {
        self.tables().row_count(page_number)
    }

    pub fn find_table(&self, table_name: &str) -> Result<u32> {
        self.tables().find_table(table_name)
    }

    /// Row count of the named table's root page.
    pub fn count_rows(&self, table_name: &str) -> Result<usize> {
        let root_page = self.find_table(table_name)?;
        self.row_count(root_page)
    }

    /// Rows of the named table's root page.
    pub fn table_rows(&self, table_name: &str) -> Result<Vec<Row>> {
        let root_page = self.find_table(table_name)?;
        self.rows(root_page)
    }

    pub fn schema(&self) -> Result<Vec<SchemaEntry>> {
        self.tables().schema()
    }

    /// Lists all user tables in the database by reading the sqlite_schema table
    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.tables().list_user_tables()
    }
}
