//! Transport-agnostic building blocks for server-side processed list views.
//!
//! Column declarations, behaviors, search predicates, sort directives and page
//! windows live here, together with the [`QueryAssembler`] port that storage
//! backends implement. Nothing in this crate talks to a database or parses HTTP.

pub mod assembler;
pub mod behavior;
pub mod column;
pub mod error;
pub mod query;

pub use assembler::{QueryAssembler, Row};
pub use behavior::{
    Cell, ChecklistBehavior, ColumnBehavior, FnBehavior, SearchSemantics, ValueMap,
    ValueMapBehavior, ValueMapEntry,
};
pub use column::{Column, ColumnHandle};
pub use error::{DataTableError, Result};
pub use query::{PageWindow, SearchKind, SearchPredicate, SortDir, SortDirective};

#[cfg(test)]
mod tests;
