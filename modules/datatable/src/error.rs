use tablekit_core::DataTableError;
use thiserror::Error;

/// Problems found while building tables from configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Table '{table}' declares no columns")]
    NoColumns { table: String },

    #[error("Table '{table}': column {index} has an empty field")]
    EmptyField { table: String, index: usize },

    #[error("Table '{table}' has an empty source table")]
    EmptySource { table: String },
}

impl ConfigError {
    pub fn no_columns(table: impl Into<String>) -> Self {
        Self::NoColumns {
            table: table.into(),
        }
    }

    pub fn empty_field(table: impl Into<String>, index: usize) -> Self {
        Self::EmptyField {
            table: table.into(),
            index,
        }
    }

    pub fn empty_source(table: impl Into<String>) -> Self {
        Self::EmptySource {
            table: table.into(),
        }
    }
}

/// Errors returned by [`crate::service::DataTableService`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Table not found: {id}")]
    UnknownTable { id: String },

    #[error(transparent)]
    DataTable(#[from] DataTableError),
}

impl ServiceError {
    pub fn unknown_table(id: impl Into<String>) -> Self {
        Self::UnknownTable { id: id.into() }
    }
}
