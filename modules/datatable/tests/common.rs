#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::{json, Value};
use tablekit_core::{
    Column, DataTableError, PageWindow, QueryAssembler, Result, Row, SearchKind, SearchPredicate,
    SortDir, SortDirective, ValueMap, ValueMapBehavior,
};

use datatable::{DataTable, DataTableConfig};

/// In-memory assembler: evaluates predicates, ordering and paging over a
/// fixed row set and records everything it was given.
#[derive(Debug, Default)]
pub struct MockAssembler {
    rows: Vec<Row>,
    pub and_group: Vec<SearchPredicate>,
    pub or_group: Vec<SearchPredicate>,
    pub sort: Vec<SortDirective>,
    pub window: Option<PageWindow>,
    pub group_by: Option<String>,
    pub executions: usize,
    pub fail_with: Option<String>,
    cursor: VecDeque<Row>,
}

impl MockAssembler {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    fn filtered(&self) -> Vec<Row> {
        self.rows
            .iter()
            .filter(|r| self.and_group.iter().all(|p| matches(r, p)))
            .filter(|r| self.or_group.is_empty() || self.or_group.iter().any(|p| matches(r, p)))
            .cloned()
            .collect()
    }
}

fn lookup<'r>(row: &'r Row, target: &str) -> Option<&'r Value> {
    row.get(target)
        .or_else(|| row.get(target.rsplit('.').next().unwrap_or(target)))
}

fn text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(row: &Row, p: &SearchPredicate) -> bool {
    let value = lookup(row, &p.target).filter(|v| !v.is_null());
    match p.kind {
        SearchKind::Substring => value.is_some_and(|v| {
            text(v)
                .to_lowercase()
                .contains(&p.value_text().to_lowercase())
        }),
        SearchKind::Exact => value.is_some_and(|v| text(v) == p.value_text()),
        SearchKind::IsNull => value.is_none(),
    }
}

fn compare(a: &Row, b: &Row, sort: &[SortDirective]) -> Ordering {
    for d in sort {
        let (x, y) = (lookup(a, &d.target), lookup(b, &d.target));
        let ord = match (x.and_then(Value::as_f64), y.and_then(Value::as_f64)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => x.map(text).cmp(&y.map(text)),
        };
        let ord = match d.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl QueryAssembler for MockAssembler {
    fn add_sort_order(&mut self, directive: SortDirective) {
        self.sort.push(directive);
    }

    fn add_search_filter(&mut self, predicate: SearchPredicate) {
        if predicate.combine_as_or {
            self.or_group.push(predicate);
        } else {
            self.and_group.push(predicate);
        }
    }

    fn set_limit(&mut self, window: PageWindow) {
        self.window = Some(window);
    }

    fn set_group_by(&mut self, expr: String) {
        self.group_by = Some(expr);
    }

    async fn execute(&mut self) -> Result<()> {
        if let Some(message) = &self.fail_with {
            return Err(DataTableError::query(message.clone()));
        }
        self.executions += 1;
        let mut rows = self.filtered();
        rows.sort_by(|a, b| compare(a, b, &self.sort));
        let rows = match self.window {
            Some(w) => rows
                .into_iter()
                .skip(w.offset as usize)
                .take(w.count as usize)
                .collect(),
            None => rows,
        };
        self.cursor = rows.into();
        Ok(())
    }

    fn fetch_next(&mut self) -> Option<Row> {
        self.cursor.pop_front()
    }

    async fn total_count(&self) -> Result<u64> {
        Ok(self.rows.len() as u64)
    }

    async fn filtered_count(&self) -> Result<u64> {
        Ok(self.filtered().len() as u64)
    }
}

pub fn row(v: Value) -> Row {
    v.as_object().cloned().expect("row fixture must be an object")
}

/// 50 people; every fourth name up to 48 contains "abc" (12 rows).
pub fn people() -> Vec<Row> {
    (1..=50)
        .map(|i| {
            let name = if i % 4 == 0 && i <= 48 {
                format!("abc-{i:02}")
            } else {
                format!("row-{i:02}")
            };
            let status = match i % 3 {
                0 => Value::Null,
                1 => json!("A"),
                _ => json!("I"),
            };
            let color = if i % 2 == 0 { "red" } else { "blue" };
            row(json!({
                "id": i,
                "name": name,
                "status": status,
                "color": color,
                "last_updated_datetime": format!("2024-01-{:02}", (i % 28) + 1),
            }))
        })
        .collect()
}

pub fn status_map() -> ValueMap {
    ValueMap::new().insert("Active", "A").insert("Inactive", "I")
}

/// Id, Name (sorted by `p.name`), Status (value map), Color.
pub fn people_table() -> DataTable {
    DataTable::new("people", &DataTableConfig::default()).columns([
        Column::new("Id", "p.id"),
        Column::new("Name", "p.name").sort_field("p.name"),
        Column::new("Status", "p.status").behavior(ValueMapBehavior::new(status_map())),
        Column::new("Color", "p.color"),
    ])
}
