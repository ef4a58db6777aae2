//! Tables declared in configuration, ready to serve requests.

use std::collections::BTreeMap;

use tablekit_core::{ChecklistBehavior, Column, ValueMapBehavior};
use tablekit_db::TableSource;

use crate::config::{BehaviorSpec, ColumnSpec, DataTableConfig, TableSpec};
use crate::error::ConfigError;
use crate::table::DataTable;

/// A table declaration plus the base query it reads from.
#[derive(Clone, Debug)]
pub struct TableEntry {
    pub table: DataTable,
    pub source: TableSource,
}

#[derive(Clone, Debug, Default)]
pub struct TableRegistry {
    entries: BTreeMap<String, TableEntry>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DataTableConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for (id, spec) in &config.tables {
            let table = build_table(id, spec, config)?;
            registry.register(table, spec.source.clone());
        }
        Ok(registry)
    }

    /// Add or replace the entry for `table.id()`.
    pub fn register(&mut self, table: DataTable, source: TableSource) {
        self.entries
            .insert(table.id().to_string(), TableEntry { table, source });
    }

    pub fn get(&self, id: &str) -> Option<&TableEntry> {
        self.entries.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn build_table(
    id: &str,
    spec: &TableSpec,
    config: &DataTableConfig,
) -> Result<DataTable, ConfigError> {
    if spec.source.from.trim().is_empty() {
        return Err(ConfigError::empty_source(id));
    }
    if spec.columns.is_empty() {
        return Err(ConfigError::no_columns(id));
    }

    let mut columns = Vec::with_capacity(spec.columns.len());
    for (index, c) in spec.columns.iter().enumerate() {
        if c.field.trim().is_empty() {
            return Err(ConfigError::empty_field(id, index));
        }
        columns.push(build_column(c));
    }

    let mut table = DataTable::new(id, config).columns(columns);
    for predicate in &spec.filters {
        table.add_search_filter(predicate.clone());
    }
    if let Some(group_by) = &spec.group_by {
        table = table.group_by(group_by.as_str());
    }
    if let Some(length) = spec.page_length {
        table = table.page_length(length);
    }
    Ok(table)
}

pub fn build_column(spec: &ColumnSpec) -> Column {
    let mut column = Column::new(&spec.title, &spec.field)
        .searchable(spec.searchable)
        .orderable(spec.orderable)
        .visible(spec.visible);
    if let Some(sort) = &spec.sort_field {
        column = column.sort_field(sort.as_str());
    }
    if let Some(width) = &spec.width {
        column = column.width(width.as_str());
    }
    if let Some(class) = &spec.class {
        column = column.class(class.as_str());
    }
    if let Some(content) = &spec.default_content {
        column = column.default_content(content.as_str());
    }
    match &spec.behavior {
        Some(BehaviorSpec::ValueMap { values }) => {
            column = column.behavior(ValueMapBehavior::new(values.clone()));
        }
        Some(BehaviorSpec::Checklist { values, separator }) => {
            let mut behavior = ChecklistBehavior::new(values.clone());
            if let Some(sep) = separator {
                behavior = behavior.with_separator(sep.as_str());
            }
            column = column.behavior(behavior);
        }
        None => {}
    }
    column
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tablekit_core::{SearchKind, SearchSemantics};

    fn config() -> DataTableConfig {
        serde_json::from_value(json!({
            "tables": {
                "people": {
                    "source": { "from": "people", "alias": "p", "select": ["p.id", "p.name", "p.status"] },
                    "columns": [
                        { "title": "Name", "field": "p.name", "sort_field": "p.name, p.id" },
                        {
                            "title": "Status", "field": "p.status",
                            "behavior": { "kind": "value_map", "values": [{ "label": "Active", "value": "A" }] }
                        }
                    ],
                    "filters": [{ "target": "p.deleted", "value": 0, "kind": "exact", "combine_as_or": true }],
                    "group_by": "p.id",
                    "page_length": 25
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn builds_tables_from_config() {
        let registry = TableRegistry::from_config(&config()).unwrap();
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["people"]);

        let entry = registry.get("people").unwrap();
        let table = &entry.table;
        assert_eq!(table.get_columns().len(), 2);
        assert_eq!(table.get_columns()[0].effective_sort_target(), "p.name, p.id");
        assert_eq!(table.get_group_by(), Some("p.id"));
        assert_eq!(table.get_page_length(), 25);
        assert_eq!(table.get_url(), "/datatables/people");

        let filter = &table.get_filters()[0];
        assert_eq!(filter.kind, SearchKind::Exact);
        assert!(!filter.combine_as_or);

        let status = table.get_columns()[1].get_behavior().unwrap();
        assert_eq!(status.search_semantics("NULL"), SearchSemantics::IsNull);
        assert_eq!(entry.source.alias.as_deref(), Some("p"));
    }

    #[test]
    fn rejects_empty_fields() {
        let mut cfg = config();
        if let Some(t) = cfg.tables.get_mut("people") {
            t.columns[1].field = " ".to_string();
        }
        assert_eq!(
            TableRegistry::from_config(&cfg).unwrap_err(),
            ConfigError::empty_field("people", 1)
        );
    }

    #[test]
    fn rejects_tables_without_columns() {
        let mut cfg = config();
        if let Some(t) = cfg.tables.get_mut("people") {
            t.columns.clear();
        }
        assert_eq!(
            TableRegistry::from_config(&cfg).unwrap_err(),
            ConfigError::no_columns("people")
        );
    }
}
