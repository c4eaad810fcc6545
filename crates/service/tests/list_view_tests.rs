#![allow(clippy::unwrap_used, reason = "test code")]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use attendify_client::{ApiError, PageSource};
use attendify_core::{ListQueryState, PageResult};
use attendify_service::{ListView, NoticeLevel, NoticeLog};
use tokio::sync::Notify;

/// Answers every query immediately except the search `"a"`, which waits
/// until `release` is notified.
#[derive(Default)]
struct GatedSource {
    started: Notify,
    release: Notify,
    calls: AtomicUsize,
}

#[async_trait]
impl PageSource<String> for GatedSource {
    async fn fetch(&self, query: &ListQueryState) -> Result<PageResult<String>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if query.search == "a" {
            self.started.notify_one();
            self.release.notified().await;
        }
        if query.search == "boom" {
            return Err(ApiError::Timeout);
        }
        Ok(PageResult { items: vec![format!("{}-1", query.search)], total: 1, total_pages: 1 })
    }
}

/// Always reports two pages of one row each.
#[derive(Default)]
struct TwoPages {
    calls: AtomicUsize,
}

#[async_trait]
impl PageSource<String> for TwoPages {
    async fn fetch(&self, query: &ListQueryState) -> Result<PageResult<String>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PageResult { items: vec![format!("p{}", query.page)], total: 2, total_pages: 2 })
    }
}

#[tokio::test]
async fn test_slow_stale_response_does_not_overwrite_newer_one() {
    let source = Arc::new(GatedSource::default());
    let notices = Arc::new(NoticeLog::new());
    let view = Arc::new(ListView::<String>::mount(source.clone(), "/groups", "", notices.clone()));

    let slow = tokio::spawn({
        let view = Arc::clone(&view);
        async move { view.set_search("a").await }
    });
    source.started.notified().await;

    assert!(view.set_search("ab").await.unwrap());
    source.release.notify_one();
    assert!(!slow.await.unwrap().unwrap(), "stale response must not be applied");

    let snapshot = view.snapshot().await;
    assert_eq!(snapshot.query.search, "ab");
    assert_eq!(snapshot.page.items, vec!["ab-1".to_owned()]);
    assert_eq!(snapshot.location.href(), "/groups?page=1&pageSize=10&search=ab");
    assert!(notices.notices().is_empty());
}

#[tokio::test]
async fn test_out_of_range_page_is_clamped_and_refetched() {
    let source = Arc::new(TwoPages::default());
    let view = ListView::<String>::mount(source.clone(), "/users", "?page=5", Arc::new(NoticeLog::new()));

    assert!(view.refresh().await.unwrap());

    let snapshot = view.snapshot().await;
    assert_eq!(snapshot.query.page, 2);
    assert_eq!(snapshot.page.items, vec!["p2".to_owned()]);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_set_page_beyond_last_page_stays_put() {
    let source = Arc::new(TwoPages::default());
    let view = ListView::<String>::mount(source.clone(), "/users", "", Arc::new(NoticeLog::new()));
    view.refresh().await.unwrap();

    assert!(view.set_page(2).await.unwrap());
    assert!(!view.set_page(9).await.unwrap());
    assert_eq!(view.snapshot().await.page.items, vec!["p2".to_owned()]);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_rows_and_notifies() {
    let source = Arc::new(GatedSource::default());
    let notices = Arc::new(NoticeLog::new());
    let view = ListView::<String>::mount(source, "/locations", "", notices.clone());
    view.refresh().await.unwrap();

    assert!(view.set_search("boom").await.is_err());

    let snapshot = view.snapshot().await;
    assert!(snapshot.loaded);
    assert_eq!(snapshot.page.items, vec!["-1".to_owned()]);
    let notices = notices.drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_remove_local_drops_row_without_fetching() {
    let source = Arc::new(TwoPages::default());
    let view = ListView::<String>::mount(source.clone(), "/users", "", Arc::new(NoticeLog::new()));
    view.refresh().await.unwrap();

    view.remove_local(|row| row == "p1").await;

    let snapshot = view.snapshot().await;
    assert!(snapshot.page.items.is_empty());
    assert_eq!(snapshot.page.total, 1);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}
