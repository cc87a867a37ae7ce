//! Field schema registry for Elasticsearch index mappings.
//!
//! This crate turns a raw `_mapping` response into a flat dictionary of
//! dot-joined field paths with type metadata. The registry is the read-only
//! schema input for both completion and validation.

mod field;
mod parse;
mod registry;

pub use field::{FieldInfo, FieldType};
pub use parse::build_registry;
pub use registry::FieldRegistry;
