#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use crate::{
        Column, ColumnHandle, DataTableError, PageWindow, SearchKind, SearchPredicate, SortDir,
        SortDirective,
    };
    use serde_json::json;

    #[test]
    fn test_effective_sort_target_prefers_sort_field() {
        let plain = Column::new("Name", "p.lname");
        assert_eq!(plain.effective_sort_target(), "p.lname");
        assert_eq!(plain.sort(), None);

        let sorted = Column::new("Name", "p.lname").sort_field("p.lname, p.fname");
        assert_eq!(sorted.effective_sort_target(), "p.lname, p.fname");
    }

    #[test]
    fn test_empty_sort_field_falls_back_to_field() {
        let col = Column::new("Status", "status").sort_field("");
        assert_eq!(col.sort(), None);
        assert_eq!(col.effective_sort_target(), "status");
    }

    #[test]
    fn test_column_defaults() {
        let col = Column::new("Status", "t.status");
        assert!(col.is_searchable());
        assert!(col.is_orderable());
        assert!(col.is_visible());
        assert!(col.get_behavior().is_none());
    }

    #[test]
    fn test_column_key_uses_last_segment() {
        assert_eq!(Column::new("", "t.status").key(), "status");
        assert_eq!(Column::new("", "status").key(), "status");
        assert_eq!(Column::new("", "db.t.status").key(), "status");
    }

    #[test]
    fn test_column_to_json_shape() {
        let col = Column::new("Status", "t.status")
            .width("10%")
            .orderable(false)
            .visible(false);
        assert_eq!(
            col.to_json(),
            json!({
                "width": "10%",
                "sortable": false,
                "searchable": true,
                "data": "t.status",
                "name": "Status",
                "visible": false,
            })
        );
    }

    #[test]
    fn test_column_handle_resolution() {
        let columns = vec![Column::new("A", "a"), Column::new("B", "b")];

        let handle = ColumnHandle::resolve(&columns, 1).expect("index 1 resolves");
        assert_eq!(handle.index, 1);
        assert_eq!(handle.column.field(), "b");

        assert!(ColumnHandle::resolve(&columns, 2).is_none());
        assert!(ColumnHandle::resolve(&columns, -1).is_none());
        assert_eq!(ColumnHandle::all(&columns).count(), 2);
    }

    #[test]
    fn test_page_window_from_wire() {
        assert_eq!(
            PageWindow::from_wire(10, 10),
            Some(PageWindow {
                offset: 10,
                count: 10
            })
        );
        assert_eq!(PageWindow::from_wire(0, -1), None);
        assert_eq!(PageWindow::from_wire(-5, 10), None);
        assert_eq!(
            PageWindow::from_wire(20, 0),
            Some(PageWindow {
                offset: 20,
                count: 0
            })
        );
        assert_eq!(PageWindow::new(3, 0), None);
    }

    #[test]
    fn test_sort_dir_from_token() {
        assert_eq!(SortDir::from_token("desc"), SortDir::Desc);
        assert_eq!(SortDir::from_token("DESC"), SortDir::Desc);
        assert_eq!(SortDir::from_token("asc"), SortDir::Asc);
        assert_eq!(SortDir::from_token("sideways"), SortDir::Asc);
        assert_eq!(SortDirective::desc("x").dir.as_str(), "desc");
    }

    #[test]
    fn test_predicate_constructors() {
        let p = SearchPredicate::substring("name", "abc").or_group(true);
        assert_eq!(p.kind, SearchKind::Substring);
        assert!(p.combine_as_or);
        assert_eq!(p.value_text(), "abc");

        let n = SearchPredicate::is_null("status");
        assert_eq!(n.kind, SearchKind::IsNull);
        assert!(!n.combine_as_or);
        assert_eq!(n.value_text(), "");

        let e = SearchPredicate::exact("age", 42);
        assert_eq!(e.value_text(), "42");
    }

    #[test]
    fn test_error_messages() {
        let err = DataTableError::column_not_found(7);
        assert_eq!(err.to_string(), "Column not found at index 7");
        assert!(!err.is_query());
        assert!(DataTableError::query("boom").is_query());
    }
}
