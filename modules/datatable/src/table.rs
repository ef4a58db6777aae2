use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use tablekit_core::{Cell, Column, Row, SearchPredicate};

use crate::config::{DataTableConfig, PagerLabels};
use crate::row::{DefaultRowAttributes, OutputRow, RowAttributes};

/// A declared list view: its columns plus everything that does not come from
/// the client request.
#[derive(Clone)]
pub struct DataTable {
    id: String,
    url: String,
    columns: Vec<Column>,
    filters: Vec<SearchPredicate>,
    group_by: Option<String>,
    page_length: u32,
    labels: PagerLabels,
    row_attributes: Arc<dyn RowAttributes>,
}

impl DataTable {
    pub fn new(id: impl Into<String>, config: &DataTableConfig) -> Self {
        let id = id.into();
        Self {
            url: config.results_url(&id),
            id,
            columns: Vec::new(),
            filters: Vec::new(),
            group_by: None,
            page_length: config.default_page_length,
            labels: config.labels.clone(),
            row_attributes: Arc::new(DefaultRowAttributes),
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns<I: IntoIterator<Item = Column>>(mut self, columns: I) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Add a predicate applied to every request regardless of its parameters.
    pub fn add_search_filter(&mut self, predicate: SearchPredicate) {
        self.filters.push(predicate.or_group(false));
    }

    pub fn with_filter(mut self, predicate: SearchPredicate) -> Self {
        self.add_search_filter(predicate);
        self
    }

    pub fn group_by(mut self, expr: impl Into<String>) -> Self {
        let expr = expr.into();
        self.group_by = (!expr.trim().is_empty()).then_some(expr);
        self
    }

    pub fn page_length(mut self, length: u32) -> Self {
        self.page_length = length;
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn row_attributes(mut self, attributes: impl RowAttributes + 'static) -> Self {
        self.row_attributes = Arc::new(attributes);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get_url(&self) -> &str {
        &self.url
    }

    pub fn get_columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn get_filters(&self) -> &[SearchPredicate] {
        &self.filters
    }

    pub fn get_group_by(&self) -> Option<&str> {
        self.group_by.as_deref()
    }

    pub fn get_page_length(&self) -> u32 {
        self.page_length
    }

    /// Column header descriptions, in declaration order.
    pub fn columns_json(&self) -> Value {
        Value::Array(self.columns.iter().map(Column::to_json).collect())
    }

    /// Settings object for initialising the client grid in server-side mode.
    pub fn to_client_json(&self) -> Value {
        json!({
            "processing": true,
            "serverSide": true,
            "ajax": {
                "url": self.url,
                "type": "POST",
            },
            "pageLength": self.page_length,
            "language": {
                "paginate": {
                    "first": self.labels.first,
                    "last": self.labels.last,
                    "next": self.labels.next,
                    "previous": self.labels.previous,
                }
            },
            "columns": self.columns_json(),
        })
    }

    /// Map one fetched row through the column behaviors.
    ///
    /// Each column reads the value stored under its key (the last segment of
    /// its field) and falls back to the full field name.
    pub fn process_row(&self, row: &Row, seq: usize) -> OutputRow {
        let values = self
            .columns
            .iter()
            .map(|column| {
                let key = column.key();
                let raw = row.get(key).or_else(|| row.get(column.field()));
                let value = match column.get_behavior() {
                    Some(behavior) => behavior.value_transform(&Cell { row, key, raw }),
                    None => raw.cloned().unwrap_or(Value::Null),
                };
                (key.to_string(), value)
            })
            .collect();

        OutputRow {
            values,
            id: self.row_attributes.row_id(row, seq),
            class: self.row_attributes.row_class(row),
        }
    }
}

impl fmt::Debug for DataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTable")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("columns", &self.columns)
            .field("filters", &self.filters)
            .field("group_by", &self.group_by)
            .finish_non_exhaustive()
    }
}
