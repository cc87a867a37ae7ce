//! Schema-aware editing support for the Elasticsearch query DSL.
//!
//! The flow on every keystroke: the text buffer and cursor go through
//! [`resolve_context`] into [`complete`], producing suggestions; the whole
//! buffer goes through [`validate`] into positioned findings. The
//! [`MappingService`] supplies the read-only [`FieldRegistry`] to both
//! whenever the active index selection changes.

pub use esq_client as client;
pub use esq_context as context;
pub use esq_editor_support as editor;
pub use esq_mapping as mapping;

pub use esq_client::{HttpTransport, MappingService, MappingStats, MappingTransport};
pub use esq_context::{ContextRecord, Expecting, Location, resolve_context};
pub use esq_editor_support::{Finding, Severity, complete, findings_to_diagnostics, validate};
pub use esq_mapping::{FieldInfo, FieldRegistry, FieldType, build_registry};
