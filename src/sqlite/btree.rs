use crate::sqlite::core::header::DatabaseHeader;
use crate::sqlite::error::{Error, Result};
use crate::sqlite::source::ByteSource;
use nom::multi::count;
use nom::number::complete::{be_u16, be_u32, be_u8};
use nom::sequence::tuple;
use nom::IResult;
use tracing::debug;

/// B-tree page kind, selected by the flag byte at the start of the page header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageType {
    InteriorIndex,
    InteriorTable,
    LeafIndex,
    LeafTable,
}

impl PageType {
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0x02 => Some(PageType::InteriorIndex),
            0x05 => Some(PageType::InteriorTable),
            0x0a => Some(PageType::LeafIndex),
            0x0d => Some(PageType::LeafTable),
            _ => None,
        }
    }

    pub fn flag(self) -> u8 {
        match self {
            PageType::InteriorIndex => 0x02,
            PageType::InteriorTable => 0x05,
            PageType::LeafIndex => 0x0a,
            PageType::LeafTable => 0x0d,
        }
    }

    /// Interior headers carry a four byte right-most pointer after the
    /// common eight bytes.
    pub fn header_size(self) -> usize {
        if self.is_interior() {
            12
        } else {
            8
        }
    }

    pub fn is_interior(self) -> bool {
        matches!(self, PageType::InteriorIndex | PageType::InteriorTable)
    }
}

/// Represents a B-tree page header
///
/// ## B-tree Page Header Format
///
/// - Byte 0: Page type
/// - Bytes 1-2: First freeblock offset
/// - Bytes 3-4: Number of cells
/// - Bytes 5-6: Cell content offset
/// - Byte 7: Number of fragmented free bytes
/// - Bytes 8-11: Right-most pointer (interior pages only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHeader {
    page_number: u32,
    page_type: PageType,
    cell_count: u16,
    /// Absolute file offset of byte 0 of the page
    page_offset: u64,
    /// Absolute file offset of the header; 100 bytes in on page 1
    header_offset: u64,
    right_most_pointer: Option<u32>,
}

impl PageHeader {
    /// Reads the header of the 1-based page `page_number`.
    pub fn read<S: ByteSource + ?Sized>(
        source: &S,
        db_header: &DatabaseHeader,
        page_number: u32,
    ) -> Result<Self> {
        if page_number == 0 {
            return Err(Error::InvalidPageNumber(page_number));
        }

        let page_offset = u64::from(page_number - 1) * u64::from(db_header.page_size_bytes());
        let header_offset = if page_number == 1 {
            page_offset + DatabaseHeader::HEADER_SIZE as u64
        } else {
            page_offset
        };

        let flag = source.read_vec_at(header_offset, 1)?[0];
        let page_type = PageType::from_flag(flag).ok_or(Error::UnknownPageType {
            flag,
            offset: header_offset,
        })?;

        let bytes = source.read_vec_at(header_offset, page_type.header_size())?;
        let (_, (_, _, cell_count, _, _)) = common_fields(&bytes)?;
        let right_most_pointer = if page_type.is_interior() {
            let (_, pointer) = right_most(&bytes[8..])?;
            Some(pointer)
        } else {
            None
        };

        let header = Self {
            page_number,
            page_type,
            cell_count,
            page_offset,
            header_offset,
            right_most_pointer,
        };
        debug!("Read page header: {:?}", header);
        Ok(header)
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_type(&self) -> PageType {
        self.page_type
    }

    pub fn cell_count(&self) -> u16 {
        self.cell_count
    }

    /// Size of the header itself, always 8 or 12 and fixed by the page type.
    pub fn header_size(&self) -> usize {
        self.page_type.header_size()
    }

    pub fn page_offset(&self) -> u64 {
        self.page_offset
    }

    pub fn header_offset(&self) -> u64 {
        self.header_offset
    }

    pub fn right_most_pointer(&self) -> Option<u32> {
        self.right_most_pointer
    }

    /// Returns the offset where cell pointer array starts
    pub fn cell_pointer_array_offset(&self) -> u64 {
        self.header_offset + self.header_size() as u64
    }

    /// Reads the cell pointer array and resolves every slot to an absolute file
    /// offset, in on-disk pointer order.
    ///
    /// Pointers are page-relative. On page 1 the page starts at file offset 0,
    /// so the stored value is already a file offset.
    pub fn cell_offsets<S: ByteSource + ?Sized>(&self, source: &S) -> Result<Vec<u64>> {
        let cells = usize::from(self.cell_count);
        let bytes = source.read_vec_at(self.cell_pointer_array_offset(), cells * 2)?;
        let (_, pointers) = cell_pointers(&bytes, cells)?;

        let offsets: Vec<u64> = pointers
            .into_iter()
            .map(|ptr| self.page_offset + u64::from(ptr))
            .collect();
        debug!(
            "Cell offsets for page {}: {:?}",
            self.page_number, offsets
        );
        Ok(offsets)
    }
}

/// Page type, first freeblock, cell count, content offset, fragmented bytes.
fn common_fields(input: &[u8]) -> IResult<&[u8], (u8, u16, u16, u16, u8)> {
    tuple((be_u8, be_u16, be_u16, be_u16, be_u8))(input)
}

fn right_most(input: &[u8]) -> IResult<&[u8], u32> {
    be_u32(input)
}

fn cell_pointers(input: &[u8], cells: usize) -> IResult<&[u8], Vec<u16>> {
    count(be_u16, cells)(input)
}
