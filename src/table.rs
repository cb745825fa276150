use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const PAGE_SIZE_OPTIONS: [u32; 5] = [10, 20, 30, 40, 50];
pub const SKELETON_CELL: &str = "░░░░░░";
pub const NO_RESULTS: &str = "No results.";

type CellFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;
type SortFn<T> = Box<dyn Fn(&T) -> SortValue + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    Time(i64),
    Missing,
}

impl SortValue {
    fn compare(&self, other: &SortValue) -> Ordering {
        use SortValue::*;
        match (self, other) {
            (Text(a), Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Number(a), Number(b)) => a.total_cmp(b),
            (Time(a), Time(b)) => a.cmp(b),
            (Missing, Missing) => Ordering::Equal,
            (Missing, _) => Ordering::Greater,
            (_, Missing) => Ordering::Less,
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Number(_) => 0,
            SortValue::Time(_) => 1,
            SortValue::Text(_) => 2,
            SortValue::Missing => 3,
        }
    }
}

pub struct Column<T> {
    pub id: &'static str,
    pub header: &'static str,
    pub hideable: bool,
    cell: CellFn<T>,
    sort_key: Option<SortFn<T>>,
    facet: Option<CellFn<T>>,
}

impl<T> Column<T> {
    pub fn new(
        id: &'static str,
        header: &'static str,
        cell: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Column {
            id,
            header,
            hideable: true,
            cell: Box::new(cell),
            sort_key: None,
            facet: None,
        }
    }

    pub fn sortable(mut self, key: impl Fn(&T) -> SortValue + Send + Sync + 'static) -> Self {
        self.sort_key = Some(Box::new(key));
        self
    }

    /// Allow faceted filtering on the raw value `facet` extracts.
    pub fn filterable(mut self, facet: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.facet = Some(Box::new(facet));
        self
    }

    pub fn always_visible(mut self) -> Self {
        self.hideable = false;
        self
    }

    pub fn cell(&self, row: &T) -> String {
        (self.cell)(row)
    }

    pub fn is_sortable(&self) -> bool {
        self.sort_key.is_some()
    }

    pub fn is_filterable(&self) -> bool {
        self.facet.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

impl CheckState {
    fn mark(&self) -> &'static str {
        match self {
            CheckState::Unchecked => "[ ]",
            CheckState::Indeterminate => "[-]",
            CheckState::Checked => "[x]",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Requests the table makes of whoever owns the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
    PageChanged(u32),
    PageSizeChanged(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: 1,
            page_size: PAGE_SIZE_OPTIONS[0],
            page_count: 1,
        }
    }
}

pub struct DataTable<T> {
    columns: Vec<Column<T>>,
    rows: Vec<T>,
    view: Vec<usize>,
    selected: BTreeSet<usize>,
    hidden: BTreeSet<&'static str>,
    sort: Option<(&'static str, SortDirection)>,
    facets: BTreeMap<&'static str, BTreeSet<String>>,
    pagination: Pagination,
    loading: bool,
    selectable: bool,
}

impl<T> DataTable<T> {
    pub fn new(columns: Vec<Column<T>>) -> Self {
        DataTable {
            columns,
            rows: Vec::new(),
            view: Vec::new(),
            selected: BTreeSet::new(),
            hidden: BTreeSet::new(),
            sort: None,
            facets: BTreeMap::new(),
            pagination: Pagination::default(),
            loading: false,
            selectable: true,
        }
    }

    pub fn without_selection(mut self) -> Self {
        self.selectable = false;
        self
    }

    /// Replace the page being shown. Selection does not carry over.
    pub fn set_data(&mut self, rows: Vec<T>, pagination: Pagination, loading: bool) {
        self.rows = rows;
        self.pagination = Pagination {
            page: pagination.page.max(1),
            page_size: pagination.page_size.max(1),
            page_count: pagination.page_count.max(1),
        };
        self.loading = loading;
        self.selected.clear();
        self.rebuild_view();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    fn rebuild_view(&mut self) {
        let mut view: Vec<usize> = (0..self.rows.len())
            .filter(|&i| self.passes_facets(&self.rows[i]))
            .collect();

        if let Some((id, direction)) = self.sort {
            if let Some(key) = self
                .columns
                .iter()
                .find(|c| c.id == id)
                .and_then(|c| c.sort_key.as_ref())
            {
                view.sort_by(|&a, &b| {
                    let ord = key(&self.rows[a]).compare(&key(&self.rows[b]));
                    match direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                });
            }
        }
        self.view = view;
    }

    fn passes_facets(&self, row: &T) -> bool {
        self.facets.iter().all(|(id, accepted)| {
            self.columns
                .iter()
                .find(|c| c.id == *id)
                .and_then(|c| c.facet.as_ref())
                .map_or(true, |facet| accepted.contains(&facet(row)))
        })
    }

    /// Rows after filtering and sorting, in display order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &T> {
        self.view.iter().map(|&i| &self.rows[i])
    }

    pub fn visible_len(&self) -> usize {
        self.view.len()
    }

    pub fn row(&self, index: usize) -> Option<&T> {
        self.view.get(index).map(|&i| &self.rows[i])
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &Column<T>> {
        self.columns
            .iter()
            .filter(|c| !self.hidden.contains(c.id))
    }

    pub fn set_column_visible(&mut self, id: &str, visible: bool) -> bool {
        let Some(id) = self
            .columns
            .iter()
            .find(|c| c.id == id && c.hideable)
            .map(|c| c.id)
        else {
            return false;
        };
        if visible {
            self.hidden.remove(id);
        } else {
            self.hidden.insert(id);
        }
        true
    }

    pub fn set_sort(&mut self, id: &str, direction: SortDirection) -> bool {
        let Some(column) = self.columns.iter().find(|c| c.id == id && c.is_sortable()) else {
            return false;
        };
        self.sort = Some((column.id, direction));
        self.rebuild_view();
        true
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.rebuild_view();
    }

    /// Only rows whose facet value is in `values` stay visible. An empty set
    /// removes the filter.
    pub fn set_facet_filter<I, V>(&mut self, id: &str, values: I) -> bool
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let Some(column) = self.columns.iter().find(|c| c.id == id && c.is_filterable()) else {
            return false;
        };
        let column_id = column.id;
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.facets.remove(column_id);
        } else {
            self.facets.insert(column_id, values);
        }
        self.rebuild_view();
        true
    }

    pub fn reset_filters(&mut self) {
        self.facets.clear();
        self.rebuild_view();
    }

    /// Distinct facet values on this page with how many rows carry each.
    pub fn facet_counts(&self, id: &str) -> Vec<(String, usize)> {
        let Some(facet) = self
            .columns
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.facet.as_ref())
        else {
            return Vec::new();
        };
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(facet(row)).or_default() += 1;
        }
        counts.into_iter().collect()
    }

    pub fn is_row_selected(&self, index: usize) -> bool {
        self.view
            .get(index)
            .is_some_and(|i| self.selected.contains(i))
    }

    pub fn set_row_selected(&mut self, index: usize, selected: bool) -> bool {
        if !self.selectable {
            return false;
        }
        let Some(&row) = self.view.get(index) else {
            return false;
        };
        if selected {
            self.selected.insert(row);
        } else {
            self.selected.remove(&row);
        }
        true
    }

    pub fn toggle_row(&mut self, index: usize) -> bool {
        let selected = self.is_row_selected(index);
        self.set_row_selected(index, !selected)
    }

    /// Header checkbox: select or clear every row on the page.
    pub fn toggle_all_page_rows(&mut self, selected: bool) {
        if !self.selectable {
            return;
        }
        if selected {
            self.selected.extend(self.view.iter().copied());
        } else {
            self.selected.clear();
        }
    }

    pub fn header_check_state(&self) -> CheckState {
        let picked = self
            .view
            .iter()
            .filter(|&&i| self.selected.contains(&i))
            .count();
        if picked == 0 {
            CheckState::Unchecked
        } else if picked == self.view.len() {
            CheckState::Checked
        } else {
            CheckState::Indeterminate
        }
    }

    pub fn selected_rows(&self) -> Vec<&T> {
        self.view
            .iter()
            .filter(|&&i| self.selected.contains(&i))
            .map(|&i| &self.rows[i])
            .collect()
    }

    pub fn can_previous_page(&self) -> bool {
        self.pagination.page > 1
    }

    pub fn can_next_page(&self) -> bool {
        self.pagination.page < self.pagination.page_count
    }

    /// Clamped to the known page range; `None` when already there.
    pub fn go_to_page(&mut self, page: u32) -> Option<TableEvent> {
        let page = page.clamp(1, self.pagination.page_count);
        if page == self.pagination.page {
            return None;
        }
        self.pagination.page = page;
        Some(TableEvent::PageChanged(page))
    }

    pub fn next_page(&mut self) -> Option<TableEvent> {
        self.go_to_page(self.pagination.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Option<TableEvent> {
        self.go_to_page(self.pagination.page.saturating_sub(1))
    }

    pub fn first_page(&mut self) -> Option<TableEvent> {
        self.go_to_page(1)
    }

    pub fn last_page(&mut self) -> Option<TableEvent> {
        self.go_to_page(self.pagination.page_count)
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Option<TableEvent> {
        if page_size == 0 || page_size == self.pagination.page_size {
            return None;
        }
        self.pagination.page_size = page_size;
        Some(TableEvent::PageSizeChanged(page_size))
    }

    pub fn render(&self) -> RenderedTable {
        let columns: Vec<&Column<T>> = self.visible_columns().collect();
        let mut headers: Vec<String> = Vec::with_capacity(columns.len() + 1);
        if self.selectable {
            headers.push(self.header_check_state().mark().to_string());
        }
        headers.extend(columns.iter().map(|c| c.header.to_string()));

        let body = if self.loading {
            Body::Skeleton(self.pagination.page_size as usize)
        } else if self.view.is_empty() {
            Body::Empty
        } else {
            Body::Rows(
                self.view
                    .iter()
                    .map(|&i| {
                        let row = &self.rows[i];
                        let mut cells = Vec::with_capacity(headers.len());
                        if self.selectable {
                            let state = if self.selected.contains(&i) {
                                CheckState::Checked
                            } else {
                                CheckState::Unchecked
                            };
                            cells.push(state.mark().to_string());
                        }
                        cells.extend(columns.iter().map(|c| c.cell(row)));
                        cells
                    })
                    .collect(),
            )
        };

        let footer = if self.selectable {
            format!(
                "{} of {} row(s) selected. Page {} of {}",
                self.selected_rows().len(),
                self.view.len(),
                self.pagination.page,
                self.pagination.page_count
            )
        } else {
            format!(
                "Page {} of {}",
                self.pagination.page, self.pagination.page_count
            )
        };

        RenderedTable {
            headers,
            body,
            footer,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Placeholder rows while the page loads.
    Skeleton(usize),
    Empty,
    Rows(Vec<Vec<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub body: Body,
    pub footer: String,
}

impl RenderedTable {
    fn lines(&self) -> Vec<Vec<String>> {
        match &self.body {
            Body::Rows(rows) => rows.clone(),
            Body::Skeleton(n) => {
                vec![vec![SKELETON_CELL.to_string(); self.headers.len()]; *n]
            }
            Body::Empty => vec![vec![NO_RESULTS.to_string()]],
        }
    }
}

impl fmt::Display for RenderedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.lines();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        if !matches!(self.body, Body::Empty) {
            for line in &lines {
                for (w, cell) in widths.iter_mut().zip(line) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        write_line(f, &widths, &self.headers)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(f, &widths, &rule)?;
        for line in &lines {
            write_line(f, &widths, line)?;
        }
        write!(f, "{}", self.footer)
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: &[String]) -> fmt::Result {
    let mut out = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        if i + 1 < cells.len() {
            let width = widths.get(i).copied().unwrap_or(0);
            let pad = width.saturating_sub(cell.chars().count());
            out.push_str(&" ".repeat(pad));
        }
    }
    writeln!(f, "{}", out.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        amount: f64,
        status: &'static str,
    }

    fn columns() -> Vec<Column<Row>> {
        vec![
            Column::new("name", "Name", |r: &Row| r.name.to_string())
                .sortable(|r| SortValue::Text(r.name.to_string()))
                .always_visible(),
            Column::new("amount", "Amount", |r: &Row| r.amount.to_string())
                .sortable(|r| SortValue::Number(r.amount)),
            Column::new("status", "Status", |r: &Row| r.status.to_string())
                .filterable(|r| r.status.to_string()),
        ]
    }

    #[fixture]
    fn table() -> DataTable<Row> {
        let mut table = DataTable::new(columns());
        table.set_data(
            vec![
                Row { name: "carol", amount: 30.0, status: "pending" },
                Row { name: "alice", amount: 5.0, status: "completed" },
                Row { name: "bob", amount: 120.0, status: "pending" },
            ],
            Pagination { page: 1, page_size: 10, page_count: 3 },
            false,
        );
        table
    }

    #[rstest]
    fn select_all_checks_the_header(mut table: DataTable<Row>) {
        assert_eq!(table.header_check_state(), CheckState::Unchecked);
        table.toggle_all_page_rows(true);
        assert_eq!(table.header_check_state(), CheckState::Checked);
        assert_eq!(table.selected_rows().len(), 3);
    }

    #[rstest]
    fn deselecting_one_row_is_indeterminate(mut table: DataTable<Row>) {
        table.toggle_all_page_rows(true);
        table.toggle_row(1);
        assert_eq!(table.header_check_state(), CheckState::Indeterminate);
        assert!(!table.is_row_selected(1));

        table.toggle_all_page_rows(false);
        assert_eq!(table.header_check_state(), CheckState::Unchecked);
    }

    #[test]
    fn single_row_page_goes_straight_back_to_unchecked() {
        let mut table = DataTable::new(columns());
        table.set_data(
            vec![Row { name: "solo", amount: 1.0, status: "pending" }],
            Pagination::default(),
            false,
        );
        table.toggle_all_page_rows(true);
        table.toggle_row(0);
        assert_eq!(table.header_check_state(), CheckState::Unchecked);
    }

    #[rstest]
    fn new_data_clears_selection(mut table: DataTable<Row>) {
        table.toggle_row(0);
        let rows: Vec<Row> = table.visible_rows().cloned().collect();
        table.set_data(rows, Pagination::default(), false);
        assert!(table.selected_rows().is_empty());
    }

    #[rstest]
    fn sorting_orders_the_visible_rows(mut table: DataTable<Row>) {
        assert!(table.set_sort("amount", SortDirection::Desc));
        let names: Vec<_> = table.visible_rows().map(|r| r.name).collect();
        assert_eq!(names, ["bob", "carol", "alice"]);

        assert!(table.set_sort("name", SortDirection::Asc));
        assert_eq!(table.row(0).map(|r| r.name), Some("alice"));

        assert!(!table.set_sort("status", SortDirection::Asc), "status is not sortable");
    }

    #[rstest]
    fn facet_filter_hides_rows(mut table: DataTable<Row>) {
        assert_eq!(
            table.facet_counts("status"),
            vec![("completed".to_string(), 1), ("pending".to_string(), 2)]
        );
        assert!(table.set_facet_filter("status", ["pending"]));
        assert_eq!(table.visible_len(), 2);

        table.toggle_all_page_rows(true);
        assert_eq!(table.header_check_state(), CheckState::Checked);

        table.set_facet_filter("status", Vec::<String>::new());
        assert_eq!(table.visible_len(), 3);
    }

    #[rstest]
    fn pagination_emits_events_within_range(mut table: DataTable<Row>) {
        assert!(!table.can_previous_page());
        assert_eq!(table.next_page(), Some(TableEvent::PageChanged(2)));
        assert_eq!(table.last_page(), Some(TableEvent::PageChanged(3)));
        assert_eq!(table.next_page(), None);
        assert_eq!(table.go_to_page(40), None);
        assert_eq!(table.first_page(), Some(TableEvent::PageChanged(1)));
        assert_eq!(table.set_page_size(20), Some(TableEvent::PageSizeChanged(20)));
        assert_eq!(table.set_page_size(20), None);
    }

    #[rstest]
    fn loading_renders_skeleton_rows(mut table: DataTable<Row>) {
        table.set_loading(true);
        let rendered = table.render();
        assert_eq!(rendered.body, Body::Skeleton(10));
        assert!(rendered.to_string().contains(SKELETON_CELL));
        assert!(!rendered.to_string().contains("carol"));
    }

    #[test]
    fn empty_page_says_no_results() {
        let table: DataTable<Row> = DataTable::new(columns());
        let rendered = table.render();
        assert_eq!(rendered.body, Body::Empty);
        assert!(rendered.to_string().contains(NO_RESULTS));
    }

    #[rstest]
    fn hidden_columns_are_not_rendered(mut table: DataTable<Row>) {
        assert!(table.set_column_visible("amount", false));
        assert!(!table.set_column_visible("name", false), "name is always visible");
        let rendered = table.render();
        assert_eq!(rendered.headers, ["[ ]", "Name", "Status"]);
        assert!(rendered.footer.starts_with("0 of 3 row(s) selected"));
    }
}
