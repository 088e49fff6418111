use serde::Serialize;

use super::TokenSummary;

/// What one collection tab currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPageState {
    pub items: Vec<TokenSummary>,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_more: bool,
    pub is_initial_loading: bool,
    pub is_page_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Default for CollectionPageState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            total_pages: 1,
            has_more: false,
            is_initial_loading: false,
            is_page_loading: false,
            last_error: None,
        }
    }
}

impl CollectionPageState {
    /// Upstream never reports a total, so the page count runs one page
    /// ahead of the cursor while `has_more` holds.
    pub fn provisional_total_pages(current_page: u32, has_more: bool) -> u32 {
        if has_more { current_page + 1 } else { current_page }
    }

    pub fn is_loading(&self) -> bool {
        self.is_initial_loading || self.is_page_loading
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}
