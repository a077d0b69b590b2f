//! Typed, validated Open Library records and a blocking client to fetch them.

pub mod config;
pub mod error;
pub mod openlibrary;
pub mod sketch;
pub mod traits;
pub mod types;
pub mod validation;

/// Version of the record rules: non-empty names and records, calendar publish dates.
pub const SCHEMA_VERSION: u32 = 2;

pub use error::FetchError;
pub use openlibrary::Client;
pub use traits::Fetch;
pub use types::{
    author::Author,
    book::Book,
    olid::Olid,
    publisher::Publisher,
    source_record::SourceRecord,
    work::{Identifier, OlId, OlType, Reference, Work},
};
pub use validation::{Mode, Record, ValidationError};
