//! Paginated, searchable list views backed by a remote page source.
//!
//! [`ListViewController`] owns the query state and decides which responses
//! may be applied; [`ListView`] drives it against a [`PageSource`].

use std::fmt;
use std::sync::Arc;

use attendify_client::PageSource;
use attendify_core::{CoreError, FIRST_PAGE, ListQueryState, PageResult, PageSize};
use tokio::sync::Mutex;

use crate::error::ServiceError;
use crate::notify::{Notice, Notifier};

/// Identifies one issued fetch. Tokens increase strictly per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Result of offering a response to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A newer request was issued after this one; the response was dropped.
    Stale,
    /// The response is current. `refetch` is set when the page had to be
    /// clamped because the result reported fewer pages.
    Current { refetch: bool },
}

/// Route plus query string that reproduces the visible list state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLocation {
    pub path: String,
    pub query: String,
}

impl ViewLocation {
    #[must_use]
    pub fn href(&self) -> String {
        if self.query.is_empty() { self.path.clone() } else { format!("{}?{}", self.path, self.query) }
    }
}

impl fmt::Display for ViewLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

/// Query state of one list plus the bookkeeping needed to apply responses
/// in issue order.
#[derive(Debug, Clone)]
pub struct ListViewController {
    query: ListQueryState,
    /// `None` until the first response is applied.
    total_pages: Option<u64>,
    issued: u64,
}

impl ListViewController {
    #[must_use]
    pub const fn new(query: ListQueryState) -> Self {
        Self { query, total_pages: None, issued: 0 }
    }

    /// Builds the controller from a URL query string, with defaults for
    /// anything missing or invalid.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self::new(ListQueryState::from_query(query))
    }

    #[must_use]
    pub const fn query(&self) -> &ListQueryState {
        &self.query
    }

    #[must_use]
    pub const fn total_pages(&self) -> Option<u64> {
        self.total_pages
    }

    /// The serialized `{page, pageSize, search}` for the view's URL.
    #[must_use]
    pub fn query_string(&self) -> String {
        self.query.to_query()
    }

    /// Moves to page `n`, clamped into `[1, total_pages]`.
    ///
    /// Returns whether the page changed, i.e. whether a fetch is needed.
    pub fn set_page(&mut self, n: u32) -> bool {
        let target = self.clamp_page(n);
        if target == self.query.page {
            return false;
        }
        self.query.page = target;
        true
    }

    /// Changes the page size and returns to the first page.
    pub fn set_page_size(&mut self, size: PageSize) {
        self.query.page_size = size;
        self.query.page = FIRST_PAGE;
    }

    /// Like [`Self::set_page_size`] for an unvalidated number.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidPageSize` unless `n` is 10, 20, 30, 40 or 50;
    /// the state is left untouched in that case.
    pub fn try_set_page_size(&mut self, n: u32) -> Result<(), CoreError> {
        self.set_page_size(PageSize::try_from(n)?);
        Ok(())
    }

    /// Replaces the search text and returns to the first page.
    ///
    /// Returns whether anything changed.
    pub fn set_search(&mut self, text: &str) -> bool {
        if self.query.search == text && self.query.page == FIRST_PAGE {
            return false;
        }
        text.clone_into(&mut self.query.search);
        self.query.page = FIRST_PAGE;
        true
    }

    /// Cycles the local sort on `column`. Never requires a fetch.
    pub fn toggle_sort(&mut self, column: &str, multi: bool) {
        self.query.toggle_sort(column, multi);
    }

    /// Issues a new token and returns it with the query to send.
    pub fn begin_fetch(&mut self) -> (RequestToken, ListQueryState) {
        self.issued += 1;
        (RequestToken(self.issued), self.query.clone())
    }

    #[must_use]
    pub const fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.issued
    }

    /// Offers the `total_pages` of a response issued under `token`.
    pub fn apply(&mut self, token: RequestToken, total_pages: u64) -> Applied {
        if !self.is_current(token) {
            tracing::debug!(token = token.0, latest = self.issued, "Discarding stale response");
            return Applied::Stale;
        }
        self.total_pages = Some(total_pages);

        let last = last_page(total_pages);
        if self.query.page <= last {
            return Applied::Current { refetch: false };
        }
        tracing::debug!(page = self.query.page, last, "Clamping page after fewer pages reported");
        self.query.page = last;
        Applied::Current { refetch: total_pages > 0 }
    }

    fn clamp_page(&self, n: u32) -> u32 {
        let n = n.max(FIRST_PAGE);
        match self.total_pages {
            Some(total) => n.min(last_page(total)),
            None => n,
        }
    }
}

fn last_page(total_pages: u64) -> u32 {
    u32::try_from(total_pages).unwrap_or(u32::MAX).max(FIRST_PAGE)
}

/// What a caller can display after a refresh.
#[derive(Debug, Clone)]
pub struct ListSnapshot<T> {
    pub query: ListQueryState,
    pub page: PageResult<T>,
    pub location: ViewLocation,
    /// False until a response has been applied.
    pub loaded: bool,
}

struct ViewState<T> {
    controller: ListViewController,
    page: PageResult<T>,
    loaded: bool,
}

/// A list view bound to a page source and a route.
///
/// Refreshes may overlap; the lock is released while a request is in
/// flight and only the response to the latest request is applied. A failed
/// current request leaves the previous page displayed and emits an error
/// notice.
pub struct ListView<T> {
    source: Arc<dyn PageSource<T>>,
    route: String,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ViewState<T>>,
}

impl<T> fmt::Debug for ListView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListView").field("route", &self.route).finish_non_exhaustive()
    }
}

impl<T: Clone + Send + 'static> ListView<T> {
    /// Mounts a view at `route`, restoring its state from `query`.
    #[must_use]
    pub fn mount(
        source: Arc<dyn PageSource<T>>,
        route: impl Into<String>,
        query: &str,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            route: route.into(),
            notifier,
            state: Mutex::new(ViewState {
                controller: ListViewController::from_query(query),
                page: PageResult::default(),
                loaded: false,
            }),
        }
    }

    /// Fetches the current query and applies the response if it is still
    /// the latest. Repeats once more if the response forced a page clamp.
    ///
    /// Returns whether a response was applied.
    ///
    /// # Errors
    /// Returns the API error of the latest request; stale failures are
    /// ignored.
    pub async fn refresh(&self) -> Result<bool, ServiceError> {
        loop {
            let (token, query) = self.state.lock().await.controller.begin_fetch();
            tracing::debug!(route = %self.route, page = query.page, "Fetching list page");

            let result = self.source.fetch(&query).await;

            let mut state = self.state.lock().await;
            match result {
                Ok(page) => match state.controller.apply(token, page.total_pages) {
                    Applied::Stale => return Ok(false),
                    Applied::Current { refetch } => {
                        state.page = page;
                        state.loaded = true;
                        if !refetch {
                            return Ok(true);
                        }
                    },
                },
                Err(err) => {
                    if !state.controller.is_current(token) {
                        tracing::debug!(error = %err, "Ignoring failure of stale request");
                        return Ok(false);
                    }
                    drop(state);
                    tracing::warn!(route = %self.route, error = %err, "List fetch failed");
                    self.notifier.notify(Notice::error(err.message()));
                    return Err(err.into());
                },
            }
        }
    }

    /// # Errors
    /// See [`ListView::refresh`].
    pub async fn set_page(&self, n: u32) -> Result<bool, ServiceError> {
        let changed = self.state.lock().await.controller.set_page(n);
        if changed { self.refresh().await } else { Ok(false) }
    }

    /// # Errors
    /// See [`ListView::refresh`].
    pub async fn set_page_size(&self, size: PageSize) -> Result<bool, ServiceError> {
        self.state.lock().await.controller.set_page_size(size);
        self.refresh().await
    }

    /// # Errors
    /// See [`ListView::refresh`].
    pub async fn set_search(&self, text: &str) -> Result<bool, ServiceError> {
        let changed = self.state.lock().await.controller.set_search(text);
        if changed { self.refresh().await } else { Ok(false) }
    }

    pub async fn toggle_sort(&self, column: &str, multi: bool) {
        self.state.lock().await.controller.toggle_sort(column, multi);
    }

    /// Drops matching rows from the displayed page without refetching.
    pub async fn remove_local<F>(&self, matches: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut state = self.state.lock().await;
        state.page = state.page.without(matches);
    }

    pub async fn location(&self) -> ViewLocation {
        let state = self.state.lock().await;
        ViewLocation { path: self.route.clone(), query: state.controller.query_string() }
    }

    pub async fn snapshot(&self) -> ListSnapshot<T> {
        let state = self.state.lock().await;
        ListSnapshot {
            query: state.controller.query().clone(),
            page: state.page.clone(),
            location: ViewLocation { path: self.route.clone(), query: state.controller.query_string() },
            loaded: state.loaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_page_clamps_to_known_total() {
        let mut ctl = ListViewController::from_query("");
        let (token, _) = ctl.begin_fetch();
        ctl.apply(token, 3);

        assert!(ctl.set_page(3));
        assert_eq!(ctl.query().page, 3);
        assert!(!ctl.set_page(7));
        assert_eq!(ctl.query().page, 3);
        assert!(ctl.set_page(0));
        assert_eq!(ctl.query().page, 1);
    }

    #[test]
    fn test_set_page_then_fetch_requests_that_page() {
        let mut ctl = ListViewController::from_query("");
        let (token, _) = ctl.begin_fetch();
        ctl.apply(token, 5);

        for page in 1..=5 {
            ctl.set_page(page);
            let (_, query) = ctl.begin_fetch();
            assert_eq!(query.page, page);
        }
    }

    #[test]
    fn test_zero_pages_never_leaves_page_one() {
        let mut ctl = ListViewController::from_query("?page=4");
        let (token, _) = ctl.begin_fetch();
        assert_eq!(ctl.apply(token, 0), Applied::Current { refetch: false });
        assert_eq!(ctl.query().page, 1);

        for n in [1, 2, 9, u32::MAX] {
            assert!(!ctl.set_page(n));
            assert_eq!(ctl.query().page, 1);
        }
    }

    #[test]
    fn test_set_page_size_always_resets_page() {
        for start in ["?page=1", "?page=3", "?page=999", "?page=-2", "?page=abc"] {
            let mut ctl = ListViewController::from_query(start);
            ctl.set_page_size(PageSize::Forty);
            assert_eq!(ctl.query().page, 1, "from {start}");
            assert_eq!(ctl.query().page_size, PageSize::Forty);
        }
    }

    #[test]
    fn test_invalid_page_size_is_rejected() {
        let mut ctl = ListViewController::from_query("?page=2&pageSize=20");
        assert!(ctl.try_set_page_size(25).is_err());
        assert_eq!(ctl.query().page, 2);
        assert_eq!(ctl.query().page_size, PageSize::Twenty);
    }

    #[test]
    fn test_search_resets_page() {
        let mut ctl = ListViewController::from_query("?page=3");
        assert!(ctl.set_search("ops"));
        assert_eq!(ctl.query().page, 1);
        assert!(!ctl.set_search("ops"));
        assert_eq!(ctl.query_string(), "page=1&pageSize=10&search=ops");
    }

    #[test]
    fn test_stale_token_is_discarded() {
        let mut ctl = ListViewController::from_query("");
        let (first, _) = ctl.begin_fetch();
        let (second, _) = ctl.begin_fetch();

        assert_eq!(ctl.apply(first, 9), Applied::Stale);
        assert_eq!(ctl.total_pages(), None);
        assert_eq!(ctl.apply(second, 2), Applied::Current { refetch: false });
        assert_eq!(ctl.total_pages(), Some(2));
    }

    #[test]
    fn test_shrinking_total_clamps_and_refetches() {
        let mut ctl = ListViewController::from_query("?page=5");
        let (token, _) = ctl.begin_fetch();
        assert_eq!(ctl.apply(token, 2), Applied::Current { refetch: true });
        assert_eq!(ctl.query().page, 2);
    }

    #[test]
    fn test_sort_does_not_touch_url_state() {
        let mut ctl = ListViewController::from_query("?page=2");
        ctl.toggle_sort("name", false);
        assert_eq!(ctl.query().page, 2);
        assert_eq!(ctl.query_string(), "page=2&pageSize=10");
    }

    #[test]
    fn test_location_href() {
        let loc = ViewLocation { path: "/groups".to_owned(), query: "page=1&pageSize=10".to_owned() };
        assert_eq!(loc.href(), "/groups?page=1&pageSize=10");
        let bare = ViewLocation { path: "/groups".to_owned(), query: String::new() };
        assert_eq!(bare.to_string(), "/groups");
    }
}
