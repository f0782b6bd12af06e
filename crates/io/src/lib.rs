//! `fieldrisk-io` - ingestion normalizer.
//!
//! Turns a delimited text file with a header row into an ordered
//! `Vec<FieldRecord>`. Header names are normalized and resolved through the
//! alias table in `fieldrisk-core`. No network access.

pub mod csv;
pub mod error;

pub use crate::csv::{
    duplicate_field_ids, parse_bytes, parse_fields, parse_fields_with, read_fields, IngestOptions,
};
pub use error::ParseError;
