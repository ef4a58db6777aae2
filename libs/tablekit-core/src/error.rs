use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DataTableError>;

/// Errors surfaced by one list-view request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataTableError {
    /// A sort or search request referenced a column index with no declaration.
    #[error("Column not found at index {index}")]
    ColumnNotFound { index: i64 },

    /// The backend failed to compile or run one of the request's queries.
    #[error("query failed: {0}")]
    Query(String),
}

impl DataTableError {
    pub fn column_not_found(index: i64) -> Self {
        Self::ColumnNotFound { index }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    /// True for failures raised by the storage backend.
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}
