//! Wire adapters. Each one decodes its parameter names into a
//! [`TableRequest`] and encodes a [`TableResult`] into its envelope shape; the
//! translation pipeline itself is shared.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tablekit_core::{Column, SortDirective};

use crate::request::{Params, TableRequest};
use crate::row::OutputRow;

mod current;
mod legacy;

pub use current::CurrentProtocol;
pub use legacy::{strip_slashes, LegacyProtocol, LegacyShape};

/// What to do with a sort term that names an undeclared column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnErrorPolicy {
    /// Abort the request with `ColumnNotFound`.
    Fail,
    /// Log a warning and drop the term.
    LogAndSkip,
}

/// Protocol-neutral outcome of one request.
#[derive(Clone, Debug, PartialEq)]
pub struct TableResult {
    pub echo: i64,
    pub total: u64,
    pub filtered: u64,
    pub rows: Vec<OutputRow>,
}

pub trait Protocol: Send + Sync {
    fn name(&self) -> &'static str;

    /// `column_count` bounds the per-column search terms that are read.
    fn parse_request(&self, params: &Params, column_count: usize) -> TableRequest;

    fn column_error_policy(&self) -> ColumnErrorPolicy;

    /// Ordering appended after every request's own sort terms.
    fn trailing_sort(&self) -> Option<SortDirective> {
        None
    }

    fn format_envelope(&self, result: &TableResult) -> Value;

    /// Column header export in this protocol's vocabulary.
    fn column_metadata(&self, columns: &[Column]) -> Value;
}

/// Selectable protocol generations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolKind {
    #[default]
    Current,
    /// Legacy parameters, `sEcho`/`aaData` envelope.
    Legacy,
    /// Legacy parameters, `draw`/`data` envelope.
    LegacyHybrid,
}

impl ProtocolKind {
    /// Adapter for this generation. `legacy_sort_field` feeds the trailing
    /// sort of the legacy variants.
    pub fn adapter(self, legacy_sort_field: &str) -> Box<dyn Protocol> {
        match self {
            ProtocolKind::Current => Box::new(CurrentProtocol),
            ProtocolKind::Legacy => {
                Box::new(LegacyProtocol::new(LegacyShape::Echo, legacy_sort_field))
            }
            ProtocolKind::LegacyHybrid => {
                Box::new(LegacyProtocol::new(LegacyShape::Hybrid, legacy_sort_field))
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolKind::Current => "current",
            ProtocolKind::Legacy => "legacy",
            ProtocolKind::LegacyHybrid => "legacy_hybrid",
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "current" => Ok(ProtocolKind::Current),
            "legacy" => Ok(ProtocolKind::Legacy),
            "legacy_hybrid" | "hybrid" => Ok(ProtocolKind::LegacyHybrid),
            other => Err(format!("unknown protocol '{other}'")),
        }
    }
}
