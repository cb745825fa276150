pub mod auth;
pub mod dashboard;
pub mod settings;
pub mod tasks;
pub mod transactions;
pub mod users;

use crate::api::Filters;
use crate::error::AppError;
use crate::query::{PageSource, QueryKey, ResourceQuery};
use crate::table::{Column, DataTable, Pagination, RenderedTable, TableEvent};

pub(crate) fn pagination(key: &QueryKey, page_count: u32) -> Pagination {
    Pagination {
        page: key.page,
        page_size: key.page_size,
        page_count,
    }
}

/// One query feeding one table.
pub struct ListView<S: PageSource> {
    query: ResourceQuery<S>,
    table: DataTable<S::Item>,
}

impl<S> ListView<S>
where
    S: PageSource,
    S::Item: Clone,
{
    pub fn new(query: ResourceQuery<S>, columns: Vec<Column<S::Item>>) -> Self {
        let mut table = DataTable::new(columns);
        table.set_loading(true);
        ListView { query, table }
    }

    pub fn query(&self) -> &ResourceQuery<S> {
        &self.query
    }

    /// For setting page, page size and filters without loading.
    pub fn query_mut(&mut self) -> &mut ResourceQuery<S> {
        &mut self.query
    }

    pub fn table(&self) -> &DataTable<S::Item> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut DataTable<S::Item> {
        &mut self.table
    }

    /// Load the current key (from the memo when it is still fresh) into the
    /// table. A failure leaves the last rows shown.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        self.table.set_loading(true);
        let result = self.query.sync().await.map(|_| ());
        let state = self.query.state();
        let pagination = pagination(self.query.key(), state.total_pages);
        self.table
            .set_data(state.items.clone(), pagination, state.is_loading);
        result
    }

    pub async fn handle(&mut self, event: TableEvent) -> Result<(), AppError> {
        let changed = match event {
            TableEvent::PageChanged(page) => self.query.set_page(page),
            TableEvent::PageSizeChanged(size) => self.query.set_page_size(size),
        };
        if changed {
            self.refresh().await?;
        }
        Ok(())
    }

    pub async fn set_filters(&mut self, filters: Filters) -> Result<(), AppError> {
        if self.query.set_filters(filters) {
            self.refresh().await?;
        }
        Ok(())
    }

    pub fn render(&self) -> RenderedTable {
        self.table.render()
    }
}
