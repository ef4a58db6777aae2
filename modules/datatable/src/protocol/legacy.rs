use serde_json::{json, Map, Value};
use tablekit_core::{Column, SortDir, SortDirective};
use tracing::debug;

use super::{ColumnErrorPolicy, Protocol, TableResult};
use crate::request::{Params, SortTerm, TableRequest};
use crate::row::OutputRow;

/// Envelope key set emitted by [`LegacyProtocol`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegacyShape {
    /// `sEcho`, `iTotalRecords`, `iTotalDisplayRecords`, `aaData`.
    Echo,
    /// `draw`, `recordsTotal`, `recordsFiltered`, `data`.
    Hybrid,
}

/// Hungarian-notation parameters (`sEcho`, `iSortCol_0`, `sSearch_1`, ...).
/// Echo rows are arrays in column order; Hybrid rows are objects keyed by
/// column position that also carry `DT_RowId` and `DT_RowClass`.
#[derive(Clone, Debug)]
pub struct LegacyProtocol {
    shape: LegacyShape,
    trailing_sort_field: String,
}

impl LegacyProtocol {
    pub fn new(shape: LegacyShape, trailing_sort_field: impl Into<String>) -> Self {
        Self {
            shape,
            trailing_sort_field: trailing_sort_field.into(),
        }
    }

    pub fn shape(&self) -> LegacyShape {
        self.shape
    }
}

impl Protocol for LegacyProtocol {
    fn name(&self) -> &'static str {
        match self.shape {
            LegacyShape::Echo => "legacy",
            LegacyShape::Hybrid => "legacy_hybrid",
        }
    }

    fn parse_request(&self, params: &Params, column_count: usize) -> TableRequest {
        let sorting_cols = params.get_i64("iSortingCols").unwrap_or(0).max(0);
        let mut order = Vec::new();
        for i in 0..sorting_cols {
            let Some(column) = params.get_i64(&format!("iSortCol_{i}")) else {
                continue;
            };
            // The client must also report the column as sortable.
            if params.get(&format!("bSortable_{column}")) != Some("true") {
                debug!(column, "sort term dropped: column not reported sortable");
                continue;
            }
            let dir = params
                .get(&format!("sSortDir_{i}"))
                .map(SortDir::from_token)
                .unwrap_or_default();
            order.push(SortTerm { column, dir });
        }

        let column_search = (0..column_count)
            .filter_map(|n| {
                params
                    .get(&format!("sSearch_{n}"))
                    .map(|term| (n, term.to_string()))
            })
            .collect();

        TableRequest {
            echo: params.get_i64("sEcho").unwrap_or(0),
            start: params.get_i64("iDisplayStart"),
            length: params.get_i64("iDisplayLength"),
            order,
            search: params.get("sSearch").map(str::to_string),
            column_search,
        }
    }

    fn column_error_policy(&self) -> ColumnErrorPolicy {
        ColumnErrorPolicy::LogAndSkip
    }

    fn trailing_sort(&self) -> Option<SortDirective> {
        let field = self.trailing_sort_field.trim();
        (!field.is_empty()).then(|| SortDirective::desc(field))
    }

    fn format_envelope(&self, result: &TableResult) -> Value {
        match self.shape {
            LegacyShape::Echo => {
                let rows: Vec<Value> = result
                    .rows
                    .iter()
                    .map(|row| Value::Array(unescaped(row).collect()))
                    .collect();
                json!({
                    "sEcho": result.echo,
                    "iTotalRecords": result.total,
                    "iTotalDisplayRecords": result.filtered,
                    "aaData": rows,
                })
            }
            LegacyShape::Hybrid => {
                let rows: Vec<Value> = result.rows.iter().map(indexed_row).collect();
                json!({
                    "draw": result.echo,
                    "recordsTotal": result.total,
                    "recordsFiltered": result.filtered,
                    "data": rows,
                })
            }
        }
    }

    fn column_metadata(&self, columns: &[Column]) -> Value {
        Value::Array(
            columns
                .iter()
                .map(|c| {
                    json!({
                        "sWidth": c.get_width(),
                        "bSortable": c.is_orderable(),
                        "bSearchable": c.is_searchable(),
                        "sTitle": c.title(),
                    })
                })
                .collect(),
        )
    }
}

fn unescaped(row: &OutputRow) -> impl Iterator<Item = Value> + '_ {
    row.values.iter().map(|(_, v)| match v {
        Value::String(s) => Value::String(strip_slashes(s)),
        other => other.clone(),
    })
}

/// `{"0": .., "1": .., "DT_RowId": .., "DT_RowClass": ..}`: positional values
/// plus the row attributes.
fn indexed_row(row: &OutputRow) -> Value {
    let mut obj: Map<String, Value> = unescaped(row)
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect();
    obj.insert("DT_RowId".to_string(), row.id.clone());
    obj.insert("DT_RowClass".to_string(), Value::String(row.class.clone()));
    Value::Object(obj)
}

/// Remove backslash escaping: `\x` becomes `x`, `\\` becomes `\` and `\0`
/// becomes NUL. A lone trailing backslash is dropped.
pub fn strip_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('\0'),
            Some(next) => out.push(next),
            None => {}
        }
    }
    out
}
