//! `fieldrisk-core` - canonical field record shape shared by ingestion and
//! reconciliation.
//!
//! No IO. No network. Just the record type and the header alias table.

pub mod record;

pub use record::{normalize_header, CanonicalField, FieldRecord};
