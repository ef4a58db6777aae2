//! One request, end to end: wire parameters in, protocol envelope out.

use serde_json::Value;
use tablekit_core::{
    Column, ColumnHandle, DataTableError, QueryAssembler, Result, SearchPredicate,
    SearchSemantics, SortDirective,
};
use tracing::{debug, instrument, warn};

use crate::protocol::{ColumnErrorPolicy, Protocol, TableResult};
use crate::request::{Params, TableRequest};
use crate::table::DataTable;

/// Runs the translation pipeline for one table under one protocol.
///
/// The translator holds no request state; one instance may serve any number
/// of requests, each with its own assembler.
#[derive(Clone, Copy)]
pub struct ResultTranslator<'a> {
    table: &'a DataTable,
    protocol: &'a dyn Protocol,
}

impl<'a> ResultTranslator<'a> {
    pub fn new(table: &'a DataTable, protocol: &'a dyn Protocol) -> Self {
        Self { table, protocol }
    }

    /// Decode `params`, run the request against `assembler` and encode the
    /// envelope.
    #[instrument(
        name = "datatable.translator.process",
        skip_all,
        fields(table = %self.table.id(), protocol = self.protocol.name())
    )]
    pub async fn process<A>(&self, params: &Params, assembler: &mut A) -> Result<Value>
    where
        A: QueryAssembler + ?Sized,
    {
        let request = self
            .protocol
            .parse_request(params, self.table.get_columns().len());
        let result = self.translate(&request, assembler).await?;
        Ok(self.protocol.format_envelope(&result))
    }

    pub async fn translate<A>(
        &self,
        request: &TableRequest,
        assembler: &mut A,
    ) -> Result<TableResult>
    where
        A: QueryAssembler + ?Sized,
    {
        let echo = request.echo;
        self.prepare(request, assembler)?;

        assembler.execute().await?;
        let mut rows = Vec::new();
        while let Some(row) = assembler.fetch_next() {
            let seq = rows.len() + 1;
            rows.push(self.table.process_row(&row, seq));
        }
        assembler.close();

        let total = assembler.total_count().await?;
        let filtered = assembler.filtered_count().await?;
        debug!(total, filtered, rows = rows.len(), "request translated");

        Ok(TableResult {
            echo,
            total,
            filtered,
            rows,
        })
    }

    /// Apply paging, ordering, predicates and grouping to `assembler`.
    pub fn prepare<A>(&self, request: &TableRequest, assembler: &mut A) -> Result<()>
    where
        A: QueryAssembler + ?Sized,
    {
        if let Some(window) = request.window() {
            assembler.set_limit(window);
        }

        for directive in self.sort_directives(request)? {
            assembler.add_sort_order(directive);
        }

        for predicate in self.global_search_predicates(request) {
            assembler.add_search_filter(predicate);
        }

        for predicate in self.table.get_filters() {
            assembler.add_search_filter(predicate.clone().or_group(false));
        }

        for predicate in self.column_filter_predicates(request) {
            assembler.add_search_filter(predicate);
        }

        if let Some(group_by) = self.table.get_group_by() {
            assembler.set_group_by(group_by.to_string());
        }
        Ok(())
    }

    /// Requested ordering resolved against the declared columns, followed by
    /// the protocol's trailing sort.
    pub fn sort_directives(&self, request: &TableRequest) -> Result<Vec<SortDirective>> {
        let columns = self.table.get_columns();
        let mut out = Vec::with_capacity(request.order.len() + 1);

        for term in &request.order {
            let Some(handle) = ColumnHandle::resolve(columns, term.column) else {
                let err = DataTableError::column_not_found(term.column);
                match self.protocol.column_error_policy() {
                    ColumnErrorPolicy::Fail => return Err(err),
                    ColumnErrorPolicy::LogAndSkip => {
                        warn!(index = term.column, "{err}; sort term skipped");
                        continue;
                    }
                }
            };
            if !handle.column.is_orderable() {
                debug!(index = handle.index, "column not orderable, sort term dropped");
                continue;
            }
            out.push(SortDirective::new(
                handle.column.effective_sort_target(),
                term.dir,
            ));
        }

        out.extend(self.protocol.trailing_sort());
        Ok(out)
    }

    /// One OR-grouped predicate per searchable column.
    pub fn global_search_predicates(&self, request: &TableRequest) -> Vec<SearchPredicate> {
        let Some(term) = request.search_term() else {
            return Vec::new();
        };

        ColumnHandle::all(self.table.get_columns())
            .filter(|h| h.column.is_searchable())
            .map(|h| {
                let column = h.column;
                let predicate = match column.sort() {
                    // A sort expression is always matched as text.
                    Some(sort) => match semantics(column, term) {
                        SearchSemantics::QuotedSubstring => {
                            SearchPredicate::substring(sort, quoted(term))
                        }
                        _ => SearchPredicate::substring(sort, term),
                    },
                    None => plain_term(column, column.field(), term),
                };
                predicate.or_group(true)
            })
            .collect()
    }

    /// AND predicates for per-column terms. `[a|b]` yields one predicate per
    /// alternative, each of which must match.
    pub fn column_filter_predicates(&self, request: &TableRequest) -> Vec<SearchPredicate> {
        let mut out = Vec::new();
        for handle in ColumnHandle::all(self.table.get_columns()) {
            if !handle.column.is_searchable() {
                continue;
            }
            let Some(term) = request.column_term(handle.index) else {
                continue;
            };
            let field = handle.column.field();
            match alternatives(term) {
                Some(parts) => {
                    out.extend(parts.map(|part| plain_term(handle.column, field, part)));
                }
                None => out.push(plain_term(handle.column, field, term)),
            }
        }
        out
    }
}

fn semantics(column: &Column, term: &str) -> SearchSemantics {
    column
        .get_behavior()
        .map_or(SearchSemantics::Substring, |b| b.search_semantics(term))
}

fn plain_term(column: &Column, target: &str, term: &str) -> SearchPredicate {
    match semantics(column, term) {
        SearchSemantics::Substring => SearchPredicate::substring(target, term),
        SearchSemantics::QuotedSubstring => SearchPredicate::substring(target, quoted(term)),
        SearchSemantics::Exact => SearchPredicate::exact(target, term),
        SearchSemantics::IsNull => SearchPredicate::is_null(target),
    }
}

fn quoted(term: &str) -> String {
    format!("\"{term}\"")
}

/// Non-empty alternatives of a `[a|b|c]` term.
fn alternatives(term: &str) -> Option<impl Iterator<Item = &str>> {
    let inner = term.strip_prefix('[')?.strip_suffix(']')?;
    Some(inner.split('|').filter(|p| !p.is_empty()))
}
