use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::behavior::ColumnBehavior;

/// One displayable, queryable field of a list view.
///
/// The position of a column inside its table is the identifier clients use on
/// the wire; see [`ColumnHandle::resolve`].
#[derive(Clone)]
pub struct Column {
    title: String,
    field: String,
    sort: String,
    searchable: bool,
    orderable: bool,
    width: String,
    visible: bool,
    class: String,
    default_content: String,
    behavior: Option<Arc<dyn ColumnBehavior>>,
}

impl Column {
    pub fn new(title: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            field: field.into(),
            sort: String::new(),
            searchable: true,
            orderable: true,
            width: String::new(),
            visible: true,
            class: String::new(),
            default_content: String::new(),
            behavior: None,
        }
    }

    /// Expression used for ordering (and global search) instead of `field`.
    pub fn sort_field(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn orderable(mut self, orderable: bool) -> Self {
        self.orderable = orderable;
        self
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = width.into();
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn default_content(mut self, content: impl Into<String>) -> Self {
        self.default_content = content.into();
        self
    }

    pub fn behavior(mut self, behavior: impl ColumnBehavior + 'static) -> Self {
        self.behavior = Some(Arc::new(behavior));
        self
    }

    pub fn shared_behavior(mut self, behavior: Arc<dyn ColumnBehavior>) -> Self {
        self.behavior = Some(behavior);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// The explicit sort expression, if one was declared.
    pub fn sort(&self) -> Option<&str> {
        (!self.sort.is_empty()).then_some(self.sort.as_str())
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn is_orderable(&self) -> bool {
        self.orderable
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn get_width(&self) -> &str {
        &self.width
    }

    pub fn get_class(&self) -> &str {
        &self.class
    }

    pub fn get_default_content(&self) -> &str {
        &self.default_content
    }

    pub fn get_behavior(&self) -> Option<&dyn ColumnBehavior> {
        self.behavior.as_deref()
    }

    /// `sort` when declared, otherwise `field`.
    pub fn effective_sort_target(&self) -> &str {
        self.sort().unwrap_or(&self.field)
    }

    /// Key the column occupies in result rows: the last `.` segment of `field`,
    /// so `t.status` becomes `status`.
    pub fn key(&self) -> &str {
        self.field.rsplit('.').next().unwrap_or(&self.field)
    }

    /// Column header description sent to the client grid.
    pub fn to_json(&self) -> Value {
        json!({
            "width": self.width,
            "sortable": self.orderable,
            "searchable": self.searchable,
            "data": self.field,
            "name": self.title,
            "visible": self.visible,
        })
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("title", &self.title)
            .field("field", &self.field)
            .field("sort", &self.sort)
            .field("searchable", &self.searchable)
            .field("orderable", &self.orderable)
            .field("behavior", &self.behavior)
            .finish()
    }
}

/// A wire column index resolved against a declared column list.
#[derive(Clone, Copy, Debug)]
pub struct ColumnHandle<'a> {
    pub index: usize,
    pub column: &'a Column,
}

impl<'a> ColumnHandle<'a> {
    /// Look up `index` by position. Negative or out-of-range indices resolve to `None`.
    pub fn resolve(columns: &'a [Column], index: i64) -> Option<Self> {
        let index = usize::try_from(index).ok()?;
        columns.get(index).map(|column| Self { index, column })
    }

    /// Every declared column, in declaration order.
    pub fn all(columns: &'a [Column]) -> impl Iterator<Item = ColumnHandle<'a>> {
        columns
            .iter()
            .enumerate()
            .map(|(index, column)| Self { index, column })
    }
}
