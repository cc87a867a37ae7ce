//! Cursor context resolution for partially written JSON query documents.
//!
//! The editor calls [`resolve_context`] on every keystroke, so the input is
//! usually not valid JSON. The resolver recovers the structural path to the
//! cursor (which containers enclose it, which keys led there) and whether a
//! key or a value is expected next, without ever failing: anything it cannot
//! make sense of degrades to the default record.

mod record;
mod recovery;
mod resolve;
mod scanner;

pub use record::{ContextRecord, Expecting, Location, PathSegment};
pub use recovery::recover_parse;
pub use resolve::{QUERY_CLAUSE_TYPES, resolve_context};
