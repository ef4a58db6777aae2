//! Per-column value post-processing.
//!
//! A behavior turns a stored row value into its display value and decides how
//! search terms aimed at its column are matched. The translator only talks to
//! the [`ColumnBehavior`] capability; it never looks at concrete types.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assembler::Row;

/// How a search term is matched against a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchSemantics {
    Substring,
    Exact,
    IsNull,
    /// Substring match of the term wrapped in double quotes, for cells that
    /// store a JSON-encoded list.
    QuotedSubstring,
}

/// The row being rendered plus the slot one column reads from.
#[derive(Clone, Copy, Debug)]
pub struct Cell<'r> {
    pub row: &'r Row,
    /// Output key of the column (last segment of its field).
    pub key: &'r str,
    /// Stored value for the column, if the row has one.
    pub raw: Option<&'r Value>,
}

pub trait ColumnBehavior: Send + Sync + fmt::Debug {
    /// Display value for one cell.
    fn value_transform(&self, cell: &Cell<'_>) -> Value;

    /// Discrete label → stored value mapping, when the column has one.
    fn value_map(&self) -> Option<&ValueMap> {
        None
    }

    /// Match semantics for `term`. Columns backed by a non-empty value map
    /// compare exactly, and the literal `NULL` asks for missing values.
    fn search_semantics(&self, term: &str) -> SearchSemantics {
        match self.value_map() {
            Some(map) if map.is_empty() => SearchSemantics::Substring,
            Some(_) if term == "NULL" => SearchSemantics::IsNull,
            Some(_) => SearchSemantics::Exact,
            None => SearchSemantics::Substring,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueMapEntry {
    pub label: String,
    pub value: Value,
}

/// Ordered label → value pairs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueMap(Vec<ValueMapEntry>);

impl ValueMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(mut self, label: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push(ValueMapEntry {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValueMapEntry> {
        self.0.iter()
    }

    /// Label whose value matches `stored`. Strings and numbers compare by
    /// their text so `"1"` in a cell finds the entry for `1`.
    pub fn label_for(&self, stored: &Value) -> Option<&str> {
        let wanted = value_text(stored);
        self.0
            .iter()
            .find(|e| e.value == *stored || value_text(&e.value) == wanted)
            .map(|e| e.label.as_str())
    }
}

impl<L: Into<String>, V: Into<Value>> FromIterator<(L, V)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (L, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(ValueMap::new(), |m, (l, v)| m.insert(l, v))
    }
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Shows the label of a discrete stored value; unknown values pass through.
#[derive(Clone, Debug)]
pub struct ValueMapBehavior {
    map: ValueMap,
}

impl ValueMapBehavior {
    pub fn new(map: ValueMap) -> Self {
        Self { map }
    }
}

impl ColumnBehavior for ValueMapBehavior {
    fn value_transform(&self, cell: &Cell<'_>) -> Value {
        match cell.raw {
            Some(raw) => self
                .map
                .label_for(raw)
                .map(|l| Value::String(l.to_string()))
                .unwrap_or_else(|| raw.clone()),
            None => Value::Null,
        }
    }

    fn value_map(&self) -> Option<&ValueMap> {
        Some(&self.map)
    }
}

/// Multi-value cell stored as a JSON-encoded list, e.g. `["red","blue"]`.
#[derive(Clone, Debug)]
pub struct ChecklistBehavior {
    map: ValueMap,
    separator: String,
}

impl ChecklistBehavior {
    pub fn new(map: ValueMap) -> Self {
        Self {
            map,
            separator: ", ".to_string(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    fn decode(raw: &Value) -> Vec<Value> {
        match raw {
            Value::Array(items) => items.clone(),
            Value::String(s) => serde_json::from_str::<Vec<Value>>(s).unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

impl ColumnBehavior for ChecklistBehavior {
    fn value_transform(&self, cell: &Cell<'_>) -> Value {
        let Some(raw) = cell.raw else {
            return Value::Null;
        };
        let labels: Vec<String> = Self::decode(raw)
            .iter()
            .map(|v| {
                self.map
                    .label_for(v)
                    .map(str::to_string)
                    .unwrap_or_else(|| value_text(v))
            })
            .collect();
        Value::String(labels.join(&self.separator))
    }

    fn value_map(&self) -> Option<&ValueMap> {
        Some(&self.map)
    }

    fn search_semantics(&self, _term: &str) -> SearchSemantics {
        SearchSemantics::QuotedSubstring
    }
}

type TransformFn = dyn Fn(&Cell<'_>) -> Value + Send + Sync;

/// Behavior backed by a closure, optionally carrying a value map.
#[derive(Clone)]
pub struct FnBehavior {
    transform: Arc<TransformFn>,
    map: Option<ValueMap>,
}

impl FnBehavior {
    pub fn new(transform: impl Fn(&Cell<'_>) -> Value + Send + Sync + 'static) -> Self {
        Self {
            transform: Arc::new(transform),
            map: None,
        }
    }

    pub fn with_value_map(mut self, map: ValueMap) -> Self {
        self.map = Some(map);
        self
    }
}

impl fmt::Debug for FnBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnBehavior")
            .field("map", &self.map)
            .finish_non_exhaustive()
    }
}

impl ColumnBehavior for FnBehavior {
    fn value_transform(&self, cell: &Cell<'_>) -> Value {
        (self.transform)(cell)
    }

    fn value_map(&self) -> Option<&ValueMap> {
        self.map.as_ref()
    }
}
