//! Port between the result translator and a query backend.

use async_trait::async_trait;

use crate::error::Result;
use crate::query::{PageWindow, SearchPredicate, SortDirective};

/// One fetched row, keyed by result column name.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Owns a base query plus the predicates, ordering, window and grouping
/// accumulated while translating one request.
///
/// An assembler is built per request, executed once and then dropped; it is
/// the only place where SQL is generated and run.
#[async_trait]
pub trait QueryAssembler: Send {
    /// Append an ORDER BY key. The first directive added is the primary key.
    fn add_sort_order(&mut self, directive: SortDirective);

    /// Add a predicate to the OR group when `combine_as_or` is set, to the AND
    /// group otherwise.
    fn add_search_filter(&mut self, predicate: SearchPredicate);

    fn set_limit(&mut self, window: PageWindow);

    fn set_group_by(&mut self, expr: String);

    /// Compile and run the paged data query, opening a forward-only cursor.
    async fn execute(&mut self) -> Result<()>;

    /// Next row of the open cursor, `None` once it is drained.
    fn fetch_next(&mut self) -> Option<Row>;

    /// Rows matched by the base query alone: no predicates, no window.
    async fn total_count(&self) -> Result<u64>;

    /// Rows matched by the base query plus every predicate, ignoring the window.
    async fn filtered_count(&self) -> Result<u64>;

    /// Release the cursor before all rows were fetched.
    fn close(&mut self) {
        while self.fetch_next().is_some() {}
    }
}
