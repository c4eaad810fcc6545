//! Declarative table model: columns, local sorting and filtering, column
//! visibility and the pagination footer.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use attendify_core::{EMPTY_TABLE_MESSAGE, FIRST_PAGE, ListQueryState, PageResult, SortDirection, SortKey};
use chrono::{DateTime, Utc};

/// Header of the row-number column.
pub const ROW_NUMBER_HEADER: &str = "#";

/// A typed cell, compared by value when sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Date(DateTime<Utc>),
    Bool(bool),
    Empty,
}

impl CellValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// `Empty` for `None`, otherwise the mapped value.
    #[must_use]
    pub fn optional<V>(value: Option<V>, f: impl FnOnce(V) -> Self) -> Self {
        value.map_or(Self::Empty, f)
    }

    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(n) => n.to_string(),
            Self::Number(n) => format!("{n}"),
            Self::Date(d) => attendify_core::date_format::format_date(*d),
            Self::Bool(true) => "Yes".to_owned(),
            Self::Bool(false) => "No".to_owned(),
            Self::Empty => String::new(),
        }
    }

    /// Empty cells sort last in ascending order.
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Empty, Self::Empty) => Ordering::Equal,
            (Self::Empty, _) => Ordering::Greater,
            (_, Self::Empty) => Ordering::Less,
            (Self::Text(a), Self::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (a, b) => a.display().cmp(&b.display()),
        }
    }
}

/// Static description of one column over rows of `T`.
pub struct ColumnDescriptor<T> {
    pub id: &'static str,
    pub header: &'static str,
    pub accessor: fn(&T) -> CellValue,
    pub sortable: bool,
    pub filterable: bool,
    pub hideable: bool,
}

impl<T> std::fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("hideable", &self.hideable)
            .finish_non_exhaustive()
    }
}

impl<T> ColumnDescriptor<T> {
    #[must_use]
    pub const fn new(id: &'static str, header: &'static str, accessor: fn(&T) -> CellValue) -> Self {
        Self { id, header, accessor, sortable: false, filterable: false, hideable: true }
    }

    #[must_use]
    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    #[must_use]
    pub const fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Always visible.
    #[must_use]
    pub const fn pinned(mut self) -> Self {
        self.hideable = false;
        self
    }
}

/// One rendered body row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub cells: Vec<String>,
    /// Target of the row click, typically a detail route.
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    Rows(Vec<RenderedRow>),
    /// No row survived filtering; rendered as one full-width cell.
    Empty(&'static str),
}

type RowAction<'a, T> = Box<dyn Fn(&T) -> String + 'a>;

/// Header and body of a table over one page of rows.
pub struct TableModel<'a, T> {
    columns: &'a [ColumnDescriptor<T>],
    rows: &'a [T],
    sort: Vec<SortKey>,
    filters: BTreeMap<&'static str, String>,
    hidden: BTreeSet<&'static str>,
    row_offset: Option<u64>,
    row_action: Option<RowAction<'a, T>>,
}

impl<T> std::fmt::Debug for TableModel<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableModel")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("sort", &self.sort)
            .field("filters", &self.filters)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

impl<'a, T> TableModel<'a, T> {
    #[must_use]
    pub fn new(columns: &'a [ColumnDescriptor<T>], rows: &'a [T]) -> Self {
        Self {
            columns,
            rows,
            sort: Vec::new(),
            filters: BTreeMap::new(),
            hidden: BTreeSet::new(),
            row_offset: None,
            row_action: None,
        }
    }

    /// Sort keys in priority order; keys naming unknown or unsortable
    /// columns are ignored.
    #[must_use]
    pub fn with_sort(mut self, sort: &[SortKey]) -> Self {
        self.sort = sort
            .iter()
            .filter(|key| self.column(&key.column).is_some_and(|c| c.sortable))
            .cloned()
            .collect();
        self
    }

    /// Prepends a `#` column numbering rows from `offset + 1`.
    #[must_use]
    pub const fn with_row_numbers(mut self, offset: u64) -> Self {
        self.row_offset = Some(offset);
        self
    }

    #[must_use]
    pub fn with_row_action(mut self, action: impl Fn(&T) -> String + 'a) -> Self {
        self.row_action = Some(Box::new(action));
        self
    }

    /// Sets a case-insensitive "contains" filter on a filterable column.
    ///
    /// Returns false if the column does not exist or is not filterable. An
    /// empty needle removes the filter.
    pub fn set_filter(&mut self, column: &str, needle: &str) -> bool {
        let Some(col) = self.column(column).filter(|c| c.filterable) else {
            return false;
        };
        let id = col.id;
        if needle.trim().is_empty() {
            self.filters.remove(id);
        } else {
            self.filters.insert(id, needle.trim().to_lowercase());
        }
        true
    }

    /// Hides a hideable column. Returns false for unknown or pinned columns.
    pub fn hide(&mut self, column: &str) -> bool {
        let Some(id) = self.column(column).filter(|c| c.hideable).map(|c| c.id) else {
            return false;
        };
        self.hidden.insert(id);
        true
    }

    pub fn show(&mut self, column: &str) {
        self.hidden.retain(|id| *id != column);
    }

    #[must_use]
    pub fn is_visible(&self, column: &str) -> bool {
        self.column(column).is_some() && !self.hidden.contains(column)
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnDescriptor<T>> {
        self.columns.iter().filter(|c| !self.hidden.contains(c.id))
    }

    #[must_use]
    pub fn header(&self) -> Vec<String> {
        let numbers = self.row_offset.map(|_| ROW_NUMBER_HEADER.to_owned());
        numbers.into_iter().chain(self.visible_columns().map(|c| c.header.to_owned())).collect()
    }

    /// Rows after filtering and sorting, as display strings.
    #[must_use]
    pub fn body(&self) -> TableBody {
        let mut indices: Vec<usize> = (0..self.rows.len()).filter(|&i| self.passes_filters(&self.rows[i])).collect();
        if indices.is_empty() {
            return TableBody::Empty(EMPTY_TABLE_MESSAGE);
        }
        indices.sort_by(|&a, &b| self.compare_rows(&self.rows[a], &self.rows[b]));

        let rows = indices
            .into_iter()
            .enumerate()
            .map(|(position, index)| {
                let row = &self.rows[index];
                let number = self.row_offset.map(|offset| (offset + position as u64 + 1).to_string());
                let cells = number
                    .into_iter()
                    .chain(self.visible_columns().map(|c| (c.accessor)(row).display()))
                    .collect();
                RenderedRow { cells, action: self.row_action.as_ref().map(|f| f(row)) }
            })
            .collect();
        TableBody::Rows(rows)
    }

    fn column(&self, id: &str) -> Option<&ColumnDescriptor<T>> {
        self.columns.iter().find(|c| c.id == id)
    }

    fn passes_filters(&self, row: &T) -> bool {
        self.filters.iter().all(|(id, needle)| {
            self.column(id).is_none_or(|c| (c.accessor)(row).display().to_lowercase().contains(needle.as_str()))
        })
    }

    fn compare_rows(&self, a: &T, b: &T) -> Ordering {
        for key in &self.sort {
            let Some(col) = self.column(&key.column) else {
                continue;
            };
            let ord = (col.accessor)(a).compare(&(col.accessor)(b));
            let ord = match key.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// Position and navigation of a paginated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationFooter {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationFooter {
    #[must_use]
    pub fn new<T>(query: &ListQueryState, result: &PageResult<T>) -> Self {
        Self {
            page: query.page,
            page_size: query.page_size.get(),
            total: result.total,
            total_pages: result.total_pages,
        }
    }

    fn last_page(&self) -> u64 {
        self.total_pages.max(u64::from(FIRST_PAGE))
    }

    /// Current page, clamped while a refetch past the end is pending.
    fn shown_page(&self) -> u64 {
        u64::from(self.page).min(self.last_page())
    }

    /// "Page X of Y".
    #[must_use]
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.shown_page(), self.last_page())
    }

    /// "A–B of N", or "0–0 of 0" for an empty list.
    #[must_use]
    pub fn range_label(&self) -> String {
        if self.total == 0 {
            return "0\u{2013}0 of 0".to_owned();
        }
        let page = self.shown_page();
        let first = (page.saturating_sub(1) * u64::from(self.page_size) + 1).min(self.total);
        let last = (page * u64::from(self.page_size)).min(self.total);
        format!("{first}\u{2013}{last} of {}", self.total)
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > FIRST_PAGE
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.last_page()
    }

    /// Target of the "last page" control.
    #[must_use]
    pub fn last(&self) -> u32 {
        u32::try_from(self.last_page()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendify_core::PageSize;

    #[derive(Debug, Clone)]
    struct Row {
        name: &'static str,
        members: i64,
        note: Option<&'static str>,
    }

    fn columns() -> Vec<ColumnDescriptor<Row>> {
        vec![
            ColumnDescriptor::new("name", "Name", |r: &Row| CellValue::text(r.name)).sortable().filterable().pinned(),
            ColumnDescriptor::new("members", "Members", |r: &Row| CellValue::Integer(r.members)).sortable(),
            ColumnDescriptor::new("note", "Note", |r: &Row| CellValue::optional(r.note, CellValue::text)),
        ]
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "beta", members: 3, note: None },
            Row { name: "Alpha", members: 3, note: Some("core") },
            Row { name: "gamma", members: 1, note: None },
        ]
    }

    fn names(body: &TableBody, col: usize) -> Vec<String> {
        match body {
            TableBody::Rows(rows) => rows.iter().map(|r| r.cells[col].clone()).collect(),
            TableBody::Empty(_) => vec![],
        }
    }

    #[test]
    fn test_unsorted_keeps_server_order() {
        let cols = columns();
        let data = rows();
        let table = TableModel::new(&cols, &data);
        assert_eq!(table.header(), vec!["Name", "Members", "Note"]);
        assert_eq!(names(&table.body(), 0), vec!["beta", "Alpha", "gamma"]);
    }

    #[test]
    fn test_multi_key_sort() {
        let cols = columns();
        let data = rows();
        let sort = vec![
            SortKey { column: "members".to_owned(), direction: SortDirection::Desc },
            SortKey { column: "name".to_owned(), direction: SortDirection::Asc },
        ];
        let table = TableModel::new(&cols, &data).with_sort(&sort);
        assert_eq!(names(&table.body(), 0), vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_unsortable_key_is_ignored() {
        let cols = columns();
        let data = rows();
        let sort = vec![SortKey { column: "note".to_owned(), direction: SortDirection::Asc }];
        let table = TableModel::new(&cols, &data).with_sort(&sort);
        assert_eq!(names(&table.body(), 0), vec!["beta", "Alpha", "gamma"]);
    }

    #[test]
    fn test_filter_is_case_insensitive_contains() {
        let cols = columns();
        let data = rows();
        let mut table = TableModel::new(&cols, &data);
        assert!(table.set_filter("name", "AL"));
        assert_eq!(names(&table.body(), 0), vec!["Alpha"]);
        assert!(!table.set_filter("members", "3"));
    }

    #[test]
    fn test_empty_state_row() {
        let cols = columns();
        let data = rows();
        let mut table = TableModel::new(&cols, &data);
        table.set_filter("name", "zzz");
        assert_eq!(table.body(), TableBody::Empty("No results."));
    }

    #[test]
    fn test_visibility() {
        let cols = columns();
        let data = rows();
        let mut table = TableModel::new(&cols, &data);
        assert!(table.hide("note"));
        assert!(!table.hide("name"));
        assert_eq!(table.header(), vec!["Name", "Members"]);
        table.show("note");
        assert!(table.is_visible("note"));
    }

    #[test]
    fn test_row_numbers_and_action() {
        let cols = columns();
        let data = rows();
        let table = TableModel::new(&cols, &data)
            .with_row_numbers(20)
            .with_row_action(|r: &Row| format!("/group/{}", r.name));
        let TableBody::Rows(body) = table.body() else {
            panic!("expected rows");
        };
        assert_eq!(body[0].cells[0], "21");
        assert_eq!(body[2].cells[0], "23");
        assert_eq!(body[1].action.as_deref(), Some("/group/Alpha"));
        assert_eq!(table.header()[0], "#");
    }

    #[test]
    fn test_footer_first_page_of_three() {
        let query = ListQueryState { page_size: PageSize::Ten, ..ListQueryState::default() };
        let result = PageResult { items: vec![0_u8; 10], total: 25, total_pages: 3 };
        let footer = PaginationFooter::new(&query, &result);

        assert_eq!(footer.page_label(), "Page 1 of 3");
        assert_eq!(footer.range_label(), "1\u{2013}10 of 25");
        assert!(!footer.has_previous());
        assert!(footer.has_next());
        assert_eq!(footer.last(), 3);
    }

    #[test]
    fn test_footer_last_partial_page() {
        let query = ListQueryState { page: 3, ..ListQueryState::default() };
        let result = PageResult { items: vec![0_u8; 5], total: 25, total_pages: 3 };
        let footer = PaginationFooter::new(&query, &result);
        assert_eq!(footer.range_label(), "21\u{2013}25 of 25");
        assert!(!footer.has_next());
    }

    #[test]
    fn test_footer_empty() {
        let footer = PaginationFooter::new(&ListQueryState::default(), &PageResult::<u8>::default());
        assert_eq!(footer.page_label(), "Page 1 of 1");
        assert_eq!(footer.range_label(), "0\u{2013}0 of 0");
        assert!(!footer.has_next());
    }

    #[test]
    fn test_footer_past_last_page_shows_last_range() {
        let query = ListQueryState { page: 4, ..ListQueryState::default() };
        let result = PageResult { items: Vec::<u8>::new(), total: 25, total_pages: 3 };
        let footer = PaginationFooter::new(&query, &result);
        assert_eq!(footer.page_label(), "Page 3 of 3");
        assert_eq!(footer.range_label(), "21\u{2013}25 of 25");
    }
}
