use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::api::Filters;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::AppError;
use crate::models::Page;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: &'static str,
    pub page: u32,
    pub page_size: u32,
    pub filters: Filters,
}

/// Where a list view gets its pages from.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    fn resource(&self) -> &'static str;

    async fn fetch_page(&self, key: &QueryKey) -> Result<Page<Self::Item>, AppError>;
}

/// Shared invalidation registry. Mutations call [`QueryClient::invalidate`]
/// with the resource they touched; every query over that resource treats
/// its memoized pages as stale from then on.
#[derive(Clone, Default)]
pub struct QueryClient {
    generations: Arc<Mutex<HashMap<String, u64>>>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self, resource: &str) -> u64 {
        self.generations.lock().get(resource).copied().unwrap_or(0)
    }

    pub fn invalidate(&self, resource: &str) {
        let mut generations = self.generations.lock();
        *generations.entry(resource.to_string()).or_insert(0) += 1;
        tracing::debug!(resource, "query invalidated");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub items: Vec<T>,
    pub is_loading: bool,
    pub total_pages: u32,
    pub total: u64,
    pub error: Option<String>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        QueryState {
            items: Vec::new(),
            is_loading: true,
            total_pages: 1,
            total: 0,
            error: None,
        }
    }
}

/// Handle for one in-flight fetch. Only the most recently issued ticket may
/// update the query; older ones are dropped on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    generation: u64,
    key: QueryKey,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

struct Memo<T> {
    generation: u64,
    page: Page<T>,
}

pub struct ResourceQuery<S: PageSource> {
    source: S,
    client: QueryClient,
    key: QueryKey,
    memo: HashMap<QueryKey, Memo<S::Item>>,
    state: QueryState<S::Item>,
    latest: u64,
}

impl<S> ResourceQuery<S>
where
    S: PageSource,
    S::Item: Clone,
{
    pub fn new(source: S, client: QueryClient) -> Self {
        let key = QueryKey {
            resource: source.resource(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            filters: Filters::new(),
        };
        ResourceQuery {
            source,
            client,
            key,
            memo: HashMap::new(),
            state: QueryState::default(),
            latest: 0,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.key.page_size = page_size.max(1);
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.key.filters = filters;
        self
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn state(&self) -> &QueryState<S::Item> {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns whether the key changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if self.key.page == page {
            return false;
        }
        self.key.page = page;
        true
    }

    /// Changing the page size goes back to the first page.
    pub fn set_page_size(&mut self, page_size: u32) -> bool {
        let page_size = page_size.max(1);
        if self.key.page_size == page_size {
            return false;
        }
        self.key.page_size = page_size;
        self.key.page = 1;
        true
    }

    /// Changing the filters goes back to the first page.
    pub fn set_filters(&mut self, filters: Filters) -> bool {
        if self.key.filters == filters {
            return false;
        }
        self.key.filters = filters;
        self.key.page = 1;
        true
    }

    pub fn needs_fetch(&self) -> bool {
        let generation = self.client.generation(self.key.resource);
        self.memo
            .get(&self.key)
            .map_or(true, |memo| memo.generation != generation)
    }

    /// Start loading the current key. Returns `None` when the memo already
    /// holds a fresh page, which is applied immediately. Either way every
    /// ticket issued before this call is superseded.
    pub fn begin(&mut self) -> Option<FetchTicket> {
        let generation = self.client.generation(self.key.resource);
        self.memo.retain(|_, memo| memo.generation == generation);
        self.latest += 1;

        if let Some(memo) = self.memo.get(&self.key) {
            let page = memo.page.clone();
            self.apply(page);
            return None;
        }

        self.state.is_loading = true;
        Some(FetchTicket {
            seq: self.latest,
            generation,
            key: self.key.clone(),
        })
    }

    /// Finish a fetch. `Ok(false)` means the ticket was superseded and the
    /// result was dropped. A failed fetch leaves the previous items in place.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page<S::Item>, AppError>,
    ) -> Result<bool, AppError> {
        if ticket.seq != self.latest || ticket.key != self.key {
            tracing::debug!(
                resource = ticket.key.resource,
                page = ticket.key.page,
                "dropping superseded response"
            );
            return Ok(false);
        }
        self.state.is_loading = false;

        match result {
            Ok(page) => {
                self.apply(page.clone());
                self.memo.insert(
                    ticket.key,
                    Memo {
                        generation: ticket.generation,
                        page,
                    },
                );
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(resource = ticket.key.resource, error = %e, "fetch failed");
                self.state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    fn apply(&mut self, page: Page<S::Item>) {
        self.state.total_pages = page.page_count(self.key.page_size);
        self.state.total = page.total_items();
        self.state.items = page.items;
        self.state.is_loading = false;
        self.state.error = None;
    }

    /// Bring the state in line with the current key, fetching if needed.
    pub async fn sync(&mut self) -> Result<&QueryState<S::Item>, AppError> {
        if let Some(ticket) = self.begin() {
            let result = self.source.fetch_page(ticket.key()).await;
            self.complete(ticket, result)?;
        }
        Ok(&self.state)
    }

    /// Drop the memo for the current key and fetch it again.
    pub async fn refetch(&mut self) -> Result<&QueryState<S::Item>, AppError> {
        self.memo.remove(&self.key);
        self.sync().await
    }
}
