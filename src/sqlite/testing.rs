//! In-memory database images for tests.

use crate::sqlite::btree::PageType;
use crate::sqlite::core::header::DatabaseHeader;
use crate::sqlite::core::varint::{encode_varint, varint_len};

/// One column value to encode into a record.
#[derive(Debug, Clone, Copy)]
pub enum Column<'a> {
    Null,
    Int(i64),
    Float(f64),
    Text(&'a str),
    Blob(&'a [u8]),
}

impl Column<'_> {
    fn serial_type_and_body(&self) -> (u64, Vec<u8>) {
        match *self {
            Column::Null => (0, Vec::new()),
            Column::Int(0) => (8, Vec::new()),
            Column::Int(1) => (9, Vec::new()),
            Column::Int(n) => {
                let (code, width) = match n {
                    n if i8::try_from(n).is_ok() => (1, 1),
                    n if i16::try_from(n).is_ok() => (2, 2),
                    n if (-(1 << 23)..(1 << 23)).contains(&n) => (3, 3),
                    n if i32::try_from(n).is_ok() => (4, 4),
                    n if (-(1 << 47)..(1 << 47)).contains(&n) => (5, 6),
                    _ => (6, 8),
                };
                (code, n.to_be_bytes()[8 - width..].to_vec())
            }
            Column::Float(x) => (7, x.to_be_bytes().to_vec()),
            Column::Text(s) => (s.len() as u64 * 2 + 13, s.as_bytes().to_vec()),
            Column::Blob(b) => (b.len() as u64 * 2 + 12, b.to_vec()),
        }
    }
}

/// Encode a record payload: header size, serial types, then the body.
pub fn record(columns: &[Column]) -> Vec<u8> {
    let (codes, bodies): (Vec<u64>, Vec<Vec<u8>>) =
        columns.iter().map(|c| c.serial_type_and_body()).unzip();
    let mut types: Vec<u8> = Vec::new();
    for code in codes {
        types.extend(encode_varint(code));
    }
    record_from_parts(&types, &bodies.concat())
}

/// Assemble a payload from an already encoded serial type list and body.
pub fn record_from_parts(types: &[u8], body: &[u8]) -> Vec<u8> {
    let mut size_len = 1;
    while varint_len((types.len() + size_len) as u64) != size_len {
        size_len += 1;
    }
    let mut payload = encode_varint((types.len() + size_len) as u64);
    payload.extend_from_slice(types);
    payload.extend_from_slice(body);
    payload
}

/// Encode a table leaf cell around `payload`.
pub fn table_cell(row_id: u64, payload: &[u8]) -> Vec<u8> {
    let mut cell = encode_varint(payload.len() as u64);
    cell.extend(encode_varint(row_id));
    cell.extend_from_slice(payload);
    cell
}

/// A `sqlite_schema` row: type, name, tbl_name, rootpage, sql.
pub fn schema_cell(row_id: u64, name: &str, root_page: i64) -> Vec<u8> {
    let sql = format!("CREATE TABLE {} (id integer primary key)", name);
    table_cell(
        row_id,
        &record(&[
            Column::Text("table"),
            Column::Text(name),
            Column::Text(name),
            Column::Int(root_page),
            Column::Text(&sql),
        ]),
    )
}

/// A B-tree page with cells packed from the end of the page, first cell last.
pub struct PageImage {
    page_type: PageType,
    right_most: u32,
    cells: Vec<Vec<u8>>,
}

impl PageImage {
    pub fn leaf_table() -> Self {
        Self {
            page_type: PageType::LeafTable,
            right_most: 0,
            cells: Vec::new(),
        }
    }

    pub fn interior_table(right_most: u32) -> Self {
        Self {
            page_type: PageType::InteriorTable,
            right_most,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, cell: Vec<u8>) -> Self {
        self.cells.push(cell);
        self
    }

    fn render(&self, page_size: usize, first_page: bool) -> Vec<u8> {
        let mut page = vec![0u8; page_size];
        let header = if first_page {
            DatabaseHeader::HEADER_SIZE
        } else {
            0
        };
        let pointers = header + self.page_type.header_size();

        page[header] = self.page_type.flag();
        page[header + 3..header + 5].copy_from_slice(&(self.cells.len() as u16).to_be_bytes());
        if self.page_type.is_interior() {
            page[header + 8..header + 12].copy_from_slice(&self.right_most.to_be_bytes());
        }

        let mut content = page_size;
        for (i, cell) in self.cells.iter().enumerate() {
            content -= cell.len();
            page[content..content + cell.len()].copy_from_slice(cell);
            let slot = pointers + i * 2;
            page[slot..slot + 2].copy_from_slice(&(content as u16).to_be_bytes());
        }
        page[header + 5..header + 7].copy_from_slice(&(content as u16).to_be_bytes());
        page
    }
}

/// A whole database file: the 100 byte header followed by its pages.
pub struct DatabaseImage {
    page_size: u16,
    pages: Vec<PageImage>,
}

impl DatabaseImage {
    pub fn new(page_size: u16) -> Self {
        Self {
            page_size,
            pages: Vec::new(),
        }
    }

    pub fn page(mut self, page: PageImage) -> Self {
        self.pages.push(page);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let page_size = usize::from(self.page_size);
        let mut image = Vec::with_capacity(page_size * self.pages.len());
        for (i, page) in self.pages.iter().enumerate() {
            image.extend(page.render(page_size, i == 0));
        }
        if image.len() >= DatabaseHeader::HEADER_SIZE {
            image[..16].copy_from_slice(b"SQLite format 3\0");
            image[16..18].copy_from_slice(&self.page_size.to_be_bytes());
            image[28..32].copy_from_slice(&(self.pages.len() as u32).to_be_bytes());
            image[56..60].copy_from_slice(&1u32.to_be_bytes());
        }
        image
    }
}
