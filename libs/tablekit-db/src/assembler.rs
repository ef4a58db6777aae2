use std::collections::VecDeque;

use async_trait::async_trait;
use sea_orm::sea_query::SelectStatement;
use sea_orm::{ConnectionTrait, FromQueryResult, JsonValue};
use tablekit_core::{
    DataTableError, PageWindow, QueryAssembler, Result, Row, SearchPredicate, SortDirective,
};

use crate::compile;

/// [`QueryAssembler`] over any SeaORM connection.
///
/// The base statement carries `SELECT`, `FROM`, joins and fixed `WHERE`
/// clauses. Request terms are layered on top when a statement is built, so
/// the base is never mutated and each count starts from the same query.
pub struct SqlQueryAssembler<C> {
    conn: C,
    base: SelectStatement,
    and_group: Vec<SearchPredicate>,
    or_group: Vec<SearchPredicate>,
    sort: Vec<SortDirective>,
    window: Option<PageWindow>,
    group_by: Option<String>,
    cursor: VecDeque<Row>,
}

impl<C> SqlQueryAssembler<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C, base: SelectStatement) -> Self {
        Self {
            conn,
            base,
            and_group: Vec::new(),
            or_group: Vec::new(),
            sort: Vec::new(),
            window: None,
            group_by: None,
            cursor: VecDeque::new(),
        }
    }

    /// Base + predicates + grouping + ordering + window.
    pub fn data_statement(&self) -> SelectStatement {
        let mut stmt = self.filtered_statement();
        compile::apply_order(&mut stmt, &self.sort);
        compile::apply_window(&mut stmt, self.window);
        stmt
    }

    /// Base + grouping.
    pub fn total_statement(&self) -> SelectStatement {
        let mut stmt = self.base.clone();
        compile::apply_group_by(&mut stmt, self.group_by.as_deref());
        stmt
    }

    /// Base + predicates + grouping.
    pub fn filtered_statement(&self) -> SelectStatement {
        let mut stmt = self.base.clone();
        compile::apply_filters(&mut stmt, &self.and_group, &self.or_group);
        compile::apply_group_by(&mut stmt, self.group_by.as_deref());
        stmt
    }

    async fn count(&self, inner: SelectStatement) -> Result<u64> {
        let backend = self.conn.get_database_backend();
        let statement = backend.build(&compile::count_statement(inner));
        tracing::debug!(sql = %statement.sql, "counting rows");

        let row = self
            .conn
            .query_one(statement)
            .await
            .map_err(|e| DataTableError::query(e.to_string()))?;
        let n = match row {
            Some(row) => row
                .try_get::<i64>("", compile::COUNT_ALIAS)
                .map_err(|e| DataTableError::query(e.to_string()))?,
            None => 0,
        };
        Ok(u64::try_from(n).unwrap_or(0))
    }
}

#[async_trait]
impl<C> QueryAssembler for SqlQueryAssembler<C>
where
    C: ConnectionTrait + Send + Sync,
{
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
        let statement = self
            .conn
            .get_database_backend()
            .build(&self.data_statement());
        tracing::debug!(sql = %statement.sql, "fetching page");

        let rows = JsonValue::find_by_statement(statement)
            .all(&self.conn)
            .await
            .map_err(|e| DataTableError::query(e.to_string()))?;

        self.cursor = rows
            .into_iter()
            .filter_map(|v| match v {
                JsonValue::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        Ok(())
    }

    fn fetch_next(&mut self) -> Option<Row> {
        self.cursor.pop_front()
    }

    async fn total_count(&self) -> Result<u64> {
        self.count(self.total_statement()).await
    }

    async fn filtered_count(&self) -> Result<u64> {
        self.count(self.filtered_statement()).await
    }

    fn close(&mut self) {
        self.cursor.clear();
    }
}
