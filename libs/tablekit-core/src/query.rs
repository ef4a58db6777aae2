//! Value objects accumulated by a [`crate::QueryAssembler`] during one request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a predicate compares its target with its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    /// `target LIKE '%value%'`
    Substring,
    /// `target = value`
    Exact,
    /// `target IS NULL`; the value is ignored.
    IsNull,
}

/// A single filter condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchPredicate {
    pub target: String,
    #[serde(default)]
    pub value: Value,
    pub kind: SearchKind,
    /// Member of the global free-text OR group instead of an individual AND term.
    #[serde(default)]
    pub combine_as_or: bool,
}

impl SearchPredicate {
    pub fn new(target: impl Into<String>, value: impl Into<Value>, kind: SearchKind) -> Self {
        Self {
            target: target.into(),
            value: value.into(),
            kind,
            combine_as_or: false,
        }
    }

    pub fn substring(target: impl Into<String>, term: impl Into<String>) -> Self {
        Self::new(target, term.into(), SearchKind::Substring)
    }

    pub fn exact(target: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(target, value, SearchKind::Exact)
    }

    pub fn is_null(target: impl Into<String>) -> Self {
        Self::new(target, Value::Null, SearchKind::IsNull)
    }

    /// Mark the predicate as part of the OR group (or take it out again).
    pub fn or_group(mut self, combine_as_or: bool) -> Self {
        self.combine_as_or = combine_as_or;
        self
    }

    /// Value as plain text, the form LIKE patterns are built from.
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    /// Wire direction token. Anything other than `desc` sorts ascending.
    pub fn from_token(token: &str) -> Self {
        if token.trim().eq_ignore_ascii_case("desc") {
            SortDir::Desc
        } else {
            SortDir::Asc
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

/// One ORDER BY key. Directives apply in the order they were added.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    pub target: String,
    pub dir: SortDir,
}

impl SortDirective {
    pub fn new(target: impl Into<String>, dir: SortDir) -> Self {
        Self {
            target: target.into(),
            dir,
        }
    }

    pub fn asc(target: impl Into<String>) -> Self {
        Self::new(target, SortDir::Asc)
    }

    pub fn desc(target: impl Into<String>) -> Self {
        Self::new(target, SortDir::Desc)
    }
}

/// Offset + row count of one page. "No limit" is expressed by not setting a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub offset: u64,
    pub count: u64,
}

impl PageWindow {
    /// Builds a window from raw wire values. Negative offsets and negative
    /// counts (including the `-1` unlimited sentinel) yield `None`; a zero
    /// length is an empty page.
    pub fn from_wire(start: i64, length: i64) -> Option<Self> {
        if start < 0 || length < 0 {
            return None;
        }
        Some(Self {
            offset: start as u64,
            count: length as u64,
        })
    }

    pub fn new(offset: u64, count: u64) -> Option<Self> {
        (count > 0).then_some(Self { offset, count })
    }
}
