//! Query state behind the dashboard's list pages: a debounced search box,
//! a tab filter and 1-based pagination.
//!
//! Changing the applied search or the tab always sends the list back to page 1.
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Parameters a list page sends to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search:    Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab:       Option<String>,
    pub page:      u32,
    pub page_size: u32,
}

impl QueryParams {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

#[derive(Debug, Clone)]
pub struct ListQuery {
    debounce:   Duration,
    page_size:  u32,
    input:      String,
    changed_at: Option<Instant>,
    search:     String,
    tab:        Option<String>,
    page:       u32,
}

impl ListQuery {
    pub fn new(debounce: Duration, page_size: u32) -> Self {
        Self {
            debounce,
            page_size: page_size.max(1),
            input: String::new(),
            changed_at: None,
            search: String::new(),
            tab: None,
            page: 1,
        }
    }

    /// Records a keystroke; the search is applied by a later `poll` or `flush`.
    pub fn set_search_input(&mut self, text: impl Into<String>) {
        self.input      = text.into();
        self.changed_at = Some(Instant::now());
    }

    /// Applies the pending input once it has been stable for the debounce
    /// window. Returns new params only when the applied search changed.
    pub fn poll(&mut self) -> Option<QueryParams> {
        let changed_at = self.changed_at?;
        if changed_at.elapsed() < self.debounce {
            return None;
        }
        self.apply_input()
    }

    /// Applies the pending input immediately.
    pub fn flush(&mut self) -> Option<QueryParams> {
        self.changed_at?;
        self.apply_input()
    }

    pub fn set_tab(&mut self, tab: Option<String>) -> Option<QueryParams> {
        if self.tab == tab { return None; }
        self.tab  = tab;
        self.page = 1;
        Some(self.params())
    }

    pub fn set_page(&mut self, page: u32) -> Option<QueryParams> {
        let page = page.max(1);
        if self.page == page { return None; }
        self.page = page;
        Some(self.params())
    }

    pub fn is_pending(&self) -> bool { self.changed_at.is_some() }

    pub fn page(&self) -> u32 { self.page }

    pub fn params(&self) -> QueryParams {
        QueryParams {
            search:    (!self.search.is_empty()).then(|| self.search.clone()),
            tab:       self.tab.clone(),
            page:      self.page,
            page_size: self.page_size,
        }
    }

    fn apply_input(&mut self) -> Option<QueryParams> {
        self.changed_at = None;
        let next = self.input.trim();
        if next == self.search { return None; }
        debug!(search = next, "applying search");
        self.search = next.to_owned();
        self.page   = 1;
        Some(self.params())
    }
}

/// Number of pages needed for `total_items`; an empty list still has one page.
pub fn total_pages(total_items: u64, page_size: u32) -> u32 {
    if page_size == 0 { return 1; }
    let pages = total_items.div_ceil(u64::from(page_size)).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::time::advance;

    fn query() -> ListQuery { ListQuery::new(Duration::from_millis(500), 20) }

    #[tokio::test(start_paused = true)]
    async fn search_applies_after_input_settles() {
        let mut q = query();
        q.set_search_input("ro");
        advance(Duration::from_millis(300)).await;
        assert_eq!(q.poll(), None);

        q.set_search_input("rose");
        advance(Duration::from_millis(400)).await;
        assert_eq!(q.poll(), None);
        assert!(q.is_pending());

        advance(Duration::from_millis(100)).await;
        let params = q.poll().unwrap();
        assert_eq!(params.search.as_deref(), Some("rose"));
        assert_eq!(params.page, 1);
        assert!(!q.is_pending());
        assert_eq!(q.poll(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn new_search_resets_page() {
        let mut q = query();
        assert!(q.set_page(3).is_some());
        q.set_search_input("oak");
        advance(Duration::from_millis(500)).await;
        assert_eq!(q.poll().map(|p| p.page), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn whitespace_only_change_is_not_a_new_search() {
        let mut q = query();
        q.set_search_input("  ");
        assert_eq!(q.flush(), None);
        q.set_search_input("elm");
        assert!(q.flush().is_some());
        q.set_search_input(" elm ");
        advance(Duration::from_secs(1)).await;
        assert_eq!(q.poll(), None);
    }

    #[test]
    fn tab_change_resets_page_and_same_tab_is_noop() {
        let mut q = query();
        q.set_page(4);
        let p = q.set_tab(Some("archived".into())).unwrap();
        assert_eq!((p.tab.as_deref(), p.page), (Some("archived"), 1));
        assert_eq!(q.set_tab(Some("archived".into())), None);
    }

    #[test]
    fn page_zero_is_clamped() {
        let mut q = query();
        assert_eq!(q.set_page(0), None);
        assert_eq!(q.page(), 1);
        assert_eq!(q.set_page(2).map(|p| p.offset()), Some(20));
    }

    #[test]
    fn empty_search_is_left_out_of_the_payload() {
        let v = serde_json::to_value(query().params()).unwrap();
        assert_eq!(v, serde_json::json!({ "page": 1, "pageSize": 20 }));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(5, 0), 1);
    }
}
