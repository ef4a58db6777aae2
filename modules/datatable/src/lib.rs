//! Server-side processing for paged, sortable, searchable list views.
//!
//! A [`DataTable`] declares the columns of one view. For every client request
//! the [`ResultTranslator`] decodes the wire parameters through a
//! [`Protocol`] adapter, loads predicates, ordering and paging into a
//! [`tablekit_core::QueryAssembler`], runs it and maps the fetched rows
//! through the column behaviors into the protocol's response envelope.

pub mod config;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod request;
pub mod row;
pub mod service;
pub mod table;
pub mod translator;

pub use config::{BehaviorSpec, ColumnSpec, DataTableConfig, PagerLabels, TableSpec};
pub use error::{ConfigError, ServiceError};
pub use protocol::{
    ColumnErrorPolicy, CurrentProtocol, LegacyProtocol, LegacyShape, Protocol, ProtocolKind,
    TableResult,
};
pub use registry::{TableEntry, TableRegistry};
pub use request::{Params, SortTerm, TableRequest};
pub use row::{DefaultRowAttributes, KeyedRowAttributes, OutputRow, RowAttributes};
pub use service::DataTableService;
pub use table::DataTable;
pub use translator::ResultTranslator;
