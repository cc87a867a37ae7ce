//! Schema-aware editing support for the query DSL.
//!
//! Two synchronous, side-effect-free engines over a shared grammar: the
//! completion engine turns a cursor context plus a field registry into
//! suggestions, and the diagnostics engine walks a parsed document against
//! the clause grammar and the registry. Both are safe to call on every
//! keystroke and never raise past their public boundary.

pub mod completions;
pub mod diagnostics;
pub mod findings;
pub mod grammar;
pub mod templates;
pub mod validation;

mod token;

pub use completions::complete;
pub use diagnostics::findings_to_diagnostics;
pub use findings::{Finding, Severity, Span};
pub use validation::validate;
