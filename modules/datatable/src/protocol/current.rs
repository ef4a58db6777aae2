use serde_json::{json, Map, Value};
use tablekit_core::{Column, SortDir};

use super::{ColumnErrorPolicy, Protocol, TableResult};
use crate::request::{Params, SortTerm, TableRequest};

/// `draw` / `start` / `length` / `order[i][..]` / `search[value]` parameters,
/// keyed-object rows.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentProtocol;

impl Protocol for CurrentProtocol {
    fn name(&self) -> &'static str {
        "current"
    }

    fn parse_request(&self, params: &Params, column_count: usize) -> TableRequest {
        let mut order = Vec::new();
        for i in 0.. {
            let Some(column) = params.get(&format!("order[{i}][column]")) else {
                break;
            };
            // An index that is not a number can never resolve.
            let column = column.trim().parse().unwrap_or(-1);
            let dir = params
                .get(&format!("order[{i}][dir]"))
                .map(SortDir::from_token)
                .unwrap_or_default();
            order.push(SortTerm { column, dir });
        }

        let column_search = (0..column_count)
            .filter_map(|n| {
                params
                    .get(&format!("columns[{n}][search][value]"))
                    .or_else(|| params.get(&format!("sSearch_{n}")))
                    .map(|term| (n, term.to_string()))
            })
            .collect();

        TableRequest {
            echo: params.get_i64("draw").unwrap_or(0),
            start: params.get_i64("start"),
            length: params.get_i64("length"),
            order,
            search: params.get("search[value]").map(str::to_string),
            column_search,
        }
    }

    fn column_error_policy(&self) -> ColumnErrorPolicy {
        ColumnErrorPolicy::Fail
    }

    fn format_envelope(&self, result: &TableResult) -> Value {
        let data: Vec<Value> = result
            .rows
            .iter()
            .map(|row| {
                let mut obj: Map<String, Value> = row.values.iter().cloned().collect();
                obj.insert("DT_RowId".to_string(), row.id.clone());
                obj.insert("DT_RowClass".to_string(), Value::String(row.class.clone()));
                Value::Object(obj)
            })
            .collect();

        json!({
            "draw": result.echo,
            "recordsTotal": result.total,
            "recordsFiltered": result.filtered,
            "data": data,
        })
    }

    fn column_metadata(&self, columns: &[Column]) -> Value {
        Value::Array(columns.iter().map(Column::to_json).collect())
    }
}
