use serde::Deserialize;

/// One page of a list endpoint.
///
/// The backend names the item array after the resource (`users`,
/// `transactions`, ...) and spells the page count either `total_pages` or
/// `totalPages`; all of those decode into this one shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    #[serde(
        default = "Vec::new",
        alias = "users",
        alias = "admins",
        alias = "transactions",
        alias = "tasks"
    )]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default, alias = "totalPages")]
    pub total_pages: Option<u32>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Page {
            items: Vec::new(),
            total: None,
            total_pages: None,
        }
    }
}

impl<T> Page<T> {
    /// Number of pages, preferring the backend's own count. Never below one.
    pub fn page_count(&self, page_size: u32) -> u32 {
        if let Some(pages) = self.total_pages {
            return pages.max(1);
        }
        match self.total {
            Some(total) if page_size > 0 => total_pages(total, page_size),
            _ => 1,
        }
    }

    /// Total item count, falling back to what was received.
    pub fn total_items(&self) -> u64 {
        self.total.unwrap_or(self.items.len() as u64)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}
