//! Read-only decoding of the SQLite on-disk page format.

pub mod btree;
pub mod core;
pub mod db;
pub mod error;
pub mod source;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use self::db::{SQLiteDatabase, SQLiteDatabaseInfo};
pub use self::error::{Error, Result};
pub use self::source::ByteSource;
