use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tablekit_core::{SearchPredicate, ValueMap};
use tablekit_db::TableSource;

/// Configuration for the datatable module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataTableConfig {
    /// Web root every results URL is built under.
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Path segment between the base path and a table id.
    #[serde(default = "default_results_prefix")]
    pub results_prefix: String,
    #[serde(default = "default_page_length")]
    pub default_page_length: u32,
    /// Field legacy protocols always sort by, descending, after the request's
    /// own ordering. Empty disables the trailing sort.
    #[serde(default = "default_legacy_sort_field")]
    pub legacy_sort_field: String,
    #[serde(default)]
    pub labels: PagerLabels,
    #[serde(default)]
    pub tables: BTreeMap<String, TableSpec>,
}

impl Default for DataTableConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            results_prefix: default_results_prefix(),
            default_page_length: default_page_length(),
            legacy_sort_field: default_legacy_sort_field(),
            labels: PagerLabels::default(),
            tables: BTreeMap::new(),
        }
    }
}

impl DataTableConfig {
    /// `<base_path>/<results_prefix>/<id>` with duplicate slashes collapsed.
    pub fn results_url(&self, id: &str) -> String {
        let parts = [
            self.base_path.trim_matches('/'),
            self.results_prefix.trim_matches('/'),
            id.trim_matches('/'),
        ];
        let joined = parts
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("/");
        format!("/{joined}")
    }
}

fn default_base_path() -> String {
    "/".to_string()
}

fn default_results_prefix() -> String {
    "datatables".to_string()
}

fn default_page_length() -> u32 {
    10
}

fn default_legacy_sort_field() -> String {
    "last_updated_datetime".to_string()
}

/// Localized pager button captions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PagerLabels {
    pub first: String,
    pub last: String,
    pub next: String,
    pub previous: String,
}

impl Default for PagerLabels {
    fn default() -> Self {
        Self {
            first: "First".to_string(),
            last: "Last".to_string(),
            next: "Next".to_string(),
            previous: "Previous".to_string(),
        }
    }
}

/// One list view declared in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSpec {
    pub source: TableSource,
    pub columns: Vec<ColumnSpec>,
    /// Predicates applied to every request, ANDed.
    #[serde(default)]
    pub filters: Vec<SearchPredicate>,
    #[serde(default)]
    pub group_by: Option<String>,
    #[serde(default)]
    pub page_length: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    pub title: String,
    pub field: String,
    #[serde(default)]
    pub sort_field: Option<String>,
    #[serde(default = "default_true")]
    pub searchable: bool,
    #[serde(default = "default_true")]
    pub orderable: bool,
    #[serde(default)]
    pub width: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub default_content: Option<String>,
    #[serde(default)]
    pub behavior: Option<BehaviorSpec>,
}

fn default_true() -> bool {
    true
}

/// Built-in behaviors available from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BehaviorSpec {
    ValueMap {
        values: ValueMap,
    },
    Checklist {
        values: ValueMap,
        #[serde(default)]
        separator: Option<String>,
    },
}
