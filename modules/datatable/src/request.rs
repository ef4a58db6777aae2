//! Protocol-neutral view of one client request.

use std::collections::BTreeMap;

use tablekit_core::{PageWindow, SortDir};

/// Flat, already-decoded request parameters.
///
/// Bracketed wire names such as `order[0][column]` are kept verbatim as keys.
/// When a key repeats, the last occurrence wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` body or query string.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Integer value of `key`; absent or non-numeric values yield `None`.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One requested ordering, still addressed by wire column index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortTerm {
    pub column: i64,
    pub dir: SortDir,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableRequest {
    /// Correlation token echoed back in the envelope.
    pub echo: i64,
    pub start: Option<i64>,
    pub length: Option<i64>,
    pub order: Vec<SortTerm>,
    pub search: Option<String>,
    /// Per-column terms keyed by declared column position.
    pub column_search: BTreeMap<usize, String>,
}

impl TableRequest {
    /// Page window, when both paging values are present and usable.
    pub fn window(&self) -> Option<PageWindow> {
        PageWindow::from_wire(self.start?, self.length?)
    }

    /// Global search term, if non-empty.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    pub fn column_term(&self, index: usize) -> Option<&str> {
        self.column_search
            .get(&index)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}
