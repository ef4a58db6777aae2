use serde_json::{json, Value};
use tablekit_core::Row;

/// Per-row `DT_RowId` / `DT_RowClass` provider.
pub trait RowAttributes: Send + Sync {
    /// `seq` is the 1-based position of the row within the page.
    fn row_id(&self, row: &Row, seq: usize) -> Value {
        let _ = row;
        json!(seq)
    }

    fn row_class(&self, row: &Row) -> String {
        let _ = row;
        String::new()
    }
}

/// Sequence ids and no class.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRowAttributes;

impl RowAttributes for DefaultRowAttributes {}

/// Row id taken from one result column, falling back to the sequence number.
#[derive(Clone, Debug)]
pub struct KeyedRowAttributes {
    key: String,
}

impl KeyedRowAttributes {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl RowAttributes for KeyedRowAttributes {
    fn row_id(&self, row: &Row, seq: usize) -> Value {
        row.get(&self.key)
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| json!(seq))
    }
}

/// One transformed row, values in column order.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputRow {
    pub values: Vec<(String, Value)>,
    pub id: Value,
    pub class: String,
}

impl OutputRow {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}
