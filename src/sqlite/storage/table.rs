use crate::sqlite::btree::{PageHeader, PageType};
use crate::sqlite::core::cell::Cell;
use crate::sqlite::core::header::DatabaseHeader;
use crate::sqlite::core::record::{Record, RecordLayout};
use crate::sqlite::core::schema::{self, SchemaEntry};
use crate::sqlite::error::{Error, Result};
use crate::sqlite::source::ByteSource;
use tracing::{debug, info, warn};

/// Page number of the `sqlite_schema` root page.
pub const SCHEMA_PAGE: u32 = 1;

/// A decoded table row: the cell plus the field layout of its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cell: Cell,
    layout: RecordLayout,
}

impl Row {
    fn decode(cell: Cell) -> Result<Self> {
        let layout = RecordLayout::parse(cell.payload())?;
        Ok(Self { cell, layout })
    }

    pub fn row_id(&self) -> u64 {
        self.cell.row_id()
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub fn record(&self) -> Record<'_> {
        self.layout.bind(self.cell.payload())
    }
}

/// Walks single table B-tree pages.
///
/// Only the page asked for is read. Interior pages are not followed, so rows
/// of a multi-page table outside the root page are not visited.
pub struct TableReader<'a, S: ?Sized> {
    source: &'a S,
    header: &'a DatabaseHeader,
}

impl<'a, S: ByteSource + ?Sized> TableReader<'a, S> {
    pub fn new(source: &'a S, header: &'a DatabaseHeader) -> Self {
        Self { source, header }
    }

    pub fn page_header(&self, page_number: u32) -> Result<PageHeader> {
        PageHeader::read(self.source, self.header, page_number)
    }

    /// Reads a page header, failing unless the page is a table leaf. Only
    /// table leaf cells carry the `size | rowid | record` layout.
    fn leaf_table_page(&self, page_number: u32) -> Result<PageHeader> {
        let page = self.page_header(page_number)?;
        if page.page_type() != PageType::LeafTable {
            return Err(Error::UnexpectedPageType {
                page_number,
                found: page.page_type(),
            });
        }
        Ok(page)
    }

    /// Decodes every cell of a table leaf page, in pointer order. The first
    /// malformed cell aborts the scan.
    pub fn rows(&self, page_number: u32) -> Result<Vec<Row>> {
        let page = self.leaf_table_page(page_number)?;
        let rows = page
            .cell_offsets(self.source)?
            .into_iter()
            .map(|offset| Cell::read(self.source, offset).and_then(Row::decode))
            .collect::<Result<Vec<_>>>()?;

        debug!("Decoded {} rows from page {}", rows.len(), page_number);
        Ok(rows)
    }

    /// Number of cells on the page. No record is decoded.
    pub fn row_count(&self, page_number: u32) -> Result<usize> {
        let page = self.page_header(page_number)?;
        if page.page_type().is_interior() {
            warn!(
                "page {} is {:?}; counting its cells, not the rows below it",
                page_number,
                page.page_type()
            );
        }
        Ok(page.cell_offsets(self.source)?.len())
    }

    /// Resolves a table name to its root page by scanning `sqlite_schema`.
    ///
    /// Matches the `tbl_name` column exactly and case-sensitively; the first
    /// matching row wins.
    pub fn find_table(&self, table_name: &str) -> Result<u32> {
        info!("Finding root page for table: {}", table_name);
        let page = self.leaf_table_page(SCHEMA_PAGE)?;

        for offset in page.cell_offsets(self.source)? {
            let cell = Cell::read(self.source, offset)?;
            let record = cell.record()?;
            let name = schema::text_column(cell.row_id(), &record, schema::TABLE_NAME_COLUMN)?;
            if name == table_name {
                let root_page = schema::root_page_column(cell.row_id(), &record)?;
                info!("Found table '{}' at root page {}", table_name, root_page);
                return Ok(root_page);
            }
        }

        Err(Error::TableNotFound(table_name.to_string()))
    }

    /// Every `sqlite_schema` entry, in on-disk order.
    pub fn schema(&self) -> Result<Vec<SchemaEntry>> {
        self.rows(SCHEMA_PAGE)?
            .iter()
            .map(|row| SchemaEntry::from_record(row.row_id(), &row.record()))
            .collect()
    }

    pub fn list_user_tables(&self) -> Result<Vec<String>> {
        Ok(self
            .schema()?
            .into_iter()
            .filter(|entry| entry.is_table() && !entry.is_internal())
            .map(|entry| entry.name)
            .collect())
    }
}
