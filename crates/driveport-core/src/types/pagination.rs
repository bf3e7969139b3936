//! Cursor pagination types for Drive-backed list endpoints.
//!
//! Drive listings are paginated with opaque page tokens rather than
//! page/offset numbers, so the list wrapper carries the upstream cursor
//! through to the caller unchanged.

use serde::{Deserialize, Serialize};

/// Default number of items requested per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;
/// Maximum number of items requested per listing page.
pub const MAX_PAGE_SIZE: u32 = 200;

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPage<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Opaque cursor for the next page, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl<T> ListPage<T> {
    /// Create a new page.
    pub fn new(items: Vec<T>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token,
        }
    }

    /// Create an empty final page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_page_token: None,
        }
    }

    /// Map the items of this page, preserving the cursor.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListPage<U> {
        ListPage {
            items: self.items.into_iter().map(f).collect(),
            next_page_token: self.next_page_token,
        }
    }

    /// Whether a further page exists.
    pub fn has_next(&self) -> bool {
        self.next_page_token.is_some()
    }
}

/// Clamp a caller-supplied page size into the allowed range.
pub fn clamp_page_size(requested: Option<u32>) -> u32 {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_size() {
        assert_eq!(clamp_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(0)), 1);
        assert_eq!(clamp_page_size(Some(10_000)), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_map_preserves_cursor() {
        let page = ListPage::new(vec![1, 2, 3], Some("abc".to_string()));
        let mapped = page.map(|n| n * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.next_page_token.as_deref(), Some("abc"));
    }
}
