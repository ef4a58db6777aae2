//! Lowering of list-view request terms into sea-query.
//!
//! Targets are raw SQL expressions taken from column declarations
//! (`p.lname`, `CONCAT(a, b)`), so they are emitted with `Expr::cust` and never
//! quoted. Values always travel as bound parameters.

use sea_orm::sea_query::{
    Alias, Condition, Expr, LikeExpr, Order, Query, SelectStatement, SimpleExpr, Value as SeaValue,
};
use serde_json::Value as JsonValue;
use tablekit_core::{PageWindow, SearchKind, SearchPredicate, SortDir, SortDirective};

/// Result column of [`count_statement`].
pub const COUNT_ALIAS: &str = "n";

const COUNT_SUBQUERY_ALIAS: &str = "dt_count";

/// Escape LIKE wildcards with `\`.
pub fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}

pub fn like_contains(s: &str) -> String {
    format!("%{}%", like_escape(s))
}

/// Bindable value for a JSON scalar. Arrays and objects bind as their JSON text.
pub fn json_to_value(v: &JsonValue) -> SeaValue {
    match v {
        JsonValue::Null => SeaValue::String(None),
        JsonValue::Bool(b) => (*b).into(),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into()
            } else if let Some(u) = n.as_u64() {
                u.into()
            } else {
                n.as_f64().unwrap_or_default().into()
            }
        }
        JsonValue::String(s) => s.clone().into(),
        other => other.to_string().into(),
    }
}

pub fn predicate_expr(p: &SearchPredicate) -> SimpleExpr {
    let target = Expr::expr(Expr::cust(p.target.as_str()));
    match p.kind {
        SearchKind::Substring => {
            target.like(LikeExpr::new(like_contains(&p.value_text())).escape('\\'))
        }
        SearchKind::Exact => target.eq(json_to_value(&p.value)),
        SearchKind::IsNull => target.is_null(),
    }
}

/// Every AND predicate plus, when present, one parenthesised OR group.
pub fn filter_condition(
    and_group: &[SearchPredicate],
    or_group: &[SearchPredicate],
) -> Option<Condition> {
    if and_group.is_empty() && or_group.is_empty() {
        return None;
    }
    let mut cond = and_group
        .iter()
        .fold(Condition::all(), |c, p| c.add(predicate_expr(p)));
    if !or_group.is_empty() {
        let any = or_group
            .iter()
            .fold(Condition::any(), |c, p| c.add(predicate_expr(p)));
        cond = cond.add(any);
    }
    Some(cond)
}

pub fn apply_filters(
    stmt: &mut SelectStatement,
    and_group: &[SearchPredicate],
    or_group: &[SearchPredicate],
) {
    if let Some(cond) = filter_condition(and_group, or_group) {
        stmt.cond_where(cond);
    }
}

pub fn apply_group_by(stmt: &mut SelectStatement, group_by: Option<&str>) {
    if let Some(expr) = group_by.filter(|g| !g.trim().is_empty()) {
        stmt.add_group_by([Expr::cust(expr)]);
    }
}

pub fn apply_order(stmt: &mut SelectStatement, sort: &[SortDirective]) {
    for d in sort {
        let order = match d.dir {
            SortDir::Asc => Order::Asc,
            SortDir::Desc => Order::Desc,
        };
        stmt.order_by_expr(Expr::cust(d.target.as_str()), order);
    }
}

pub fn apply_window(stmt: &mut SelectStatement, window: Option<PageWindow>) {
    if let Some(w) = window {
        stmt.limit(w.count).offset(w.offset);
    }
}

/// `SELECT COUNT(*) AS n FROM (<inner>) AS dt_count`.
///
/// Wrapping keeps grouped queries counting groups rather than rows.
pub fn count_statement(inner: SelectStatement) -> SelectStatement {
    let mut stmt = Query::select();
    stmt.expr_as(Expr::cust("COUNT(*)"), Alias::new(COUNT_ALIAS))
        .from_subquery(inner, Alias::new(COUNT_SUBQUERY_ALIAS));
    stmt
}

#[cfg(test)]
#[path = "compile_tests.rs"]
mod compile_tests;
