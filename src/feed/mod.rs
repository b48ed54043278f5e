//! Feed/session orchestration: which remote list is shown, the loaded
//! pages, and the bookmark annotations merged into them.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;

use crate::app::Result;
use crate::client::FeedSource;
use crate::domain::{Bookmark, FeedKind, Item, SortOrder};
use crate::store::BookmarkStore;

pub const PAGE_SIZE: usize = 20;

/// Silent background refresh cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshInterval {
    Off,
    Sec30,
    Sec60,
    Sec300,
}

impl RefreshInterval {
    pub fn next(self) -> Self {
        match self {
            RefreshInterval::Off => RefreshInterval::Sec30,
            RefreshInterval::Sec30 => RefreshInterval::Sec60,
            RefreshInterval::Sec60 => RefreshInterval::Sec300,
            RefreshInterval::Sec300 => RefreshInterval::Off,
        }
    }

    pub fn duration(self) -> Option<Duration> {
        match self {
            RefreshInterval::Off => None,
            RefreshInterval::Sec30 => Some(Duration::from_secs(30)),
            RefreshInterval::Sec60 => Some(Duration::from_secs(60)),
            RefreshInterval::Sec300 => Some(Duration::from_secs(300)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RefreshInterval::Off => "OFF",
            RefreshInterval::Sec30 => "30s",
            RefreshInterval::Sec60 => "60s",
            RefreshInterval::Sec300 => "300s",
        }
    }
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub struct FeedController {
    source: Arc<dyn FeedSource>,
    store: Arc<dyn BookmarkStore + Send + Sync>,
    pub kind: FeedKind,
    pub sort: SortOrder,
    story_ids: Vec<i64>,
    items: Vec<Item>,
    bookmarks: Vec<Bookmark>,
    page: usize,
}

impl FeedController {
    pub fn new(
        source: Arc<dyn FeedSource>,
        store: Arc<dyn BookmarkStore + Send + Sync>,
        kind: FeedKind,
        sort: SortOrder,
    ) -> Self {
        Self {
            source,
            store,
            kind,
            sort,
            story_ids: Vec::new(),
            items: Vec::new(),
            bookmarks: Vec::new(),
            page: 0,
        }
    }

    /// Re-read the bookmark set, newest save first.
    pub fn reload_bookmarks(&mut self) -> Result<()> {
        let mut bookmarks = self.store.get_all()?;
        bookmarks.sort_by_key(|b| std::cmp::Reverse(b.saved_at));
        self.bookmarks = bookmarks;
        Ok(())
    }

    /// Fetch the id list for the current category and its first page.
    /// The bookmarks category is purely local.
    pub async fn load(&mut self) -> Result<()> {
        self.reload_bookmarks()?;
        if self.kind == FeedKind::Bookmarks {
            return Ok(());
        }

        self.story_ids = self.source.list_ids(self.kind).await?;
        self.page = 0;
        self.items = self.fetch_page(0).await;
        Ok(())
    }

    /// Append the next page of 20 to the loaded items.
    pub async fn load_more(&mut self) -> Result<()> {
        if self.kind == FeedKind::Bookmarks {
            return Ok(());
        }
        self.page += 1;
        let mut next = self.fetch_page(self.page).await;
        self.items.append(&mut next);
        Ok(())
    }

    /// Silent replacement of the current first page; used by the
    /// auto-refresh timer.
    pub async fn refresh(&mut self) -> Result<()> {
        self.load().await
    }

    /// Page item fetches are issued together; failures are isolated per
    /// item and the page renders whatever succeeded.
    async fn fetch_page(&self, page: usize) -> Vec<Item> {
        let start = page * PAGE_SIZE;
        let ids: Vec<i64> = self
            .story_ids
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .copied()
            .collect();

        let fetches = ids.iter().map(|&id| self.source.fetch_item(id));
        let results = join_all(fetches).await;

        let mut items = Vec::with_capacity(ids.len());
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(e) => tracing::warn!(id, error = %e, "item fetch failed"),
            }
        }
        items
    }

    pub fn set_kind(&mut self, kind: FeedKind) {
        self.kind = kind;
    }

    /// Pure client-side re-sort of whatever is loaded; never refetches.
    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
    }

    /// The items to display: the bookmark snapshots (newest save first)
    /// for the bookmarks category, otherwise the loaded page under the
    /// current sort order.
    pub fn view_items(&self) -> Vec<Item> {
        if self.kind == FeedKind::Bookmarks {
            return self.bookmarks.iter().map(Bookmark::to_item).collect();
        }
        let mut items = self.items.clone();
        self.sort.apply(&mut items);
        items
    }

    pub fn bookmark_for(&self, id: i64) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.id == id)
    }

    pub fn is_bookmarked(&self, id: i64) -> bool {
        self.bookmark_for(id).is_some()
    }

    pub fn is_read(&self, id: i64) -> bool {
        self.bookmark_for(id).map(|b| b.read).unwrap_or(false)
    }

    pub fn bookmark_count(&self) -> usize {
        self.bookmarks.len()
    }

    /// Save the item if it is not bookmarked, drop the bookmark if it
    /// is, then re-read the bookmark set.
    pub fn toggle_bookmark(&mut self, item: &Item) -> Result<()> {
        if self.is_bookmarked(item.id) {
            self.store.remove(item.id)?;
        } else {
            self.store.add(item, now_ms())?;
        }
        self.reload_bookmarks()
    }

    /// Flip the read flag on a bookmarked story. Returns the updated
    /// record, or `None` when the story is not bookmarked.
    pub fn toggle_read(&mut self, id: i64) -> Result<Option<Bookmark>> {
        let read = self.is_read(id);
        let updated = self.store.toggle_read(id, !read)?;
        if updated.is_some() {
            self.reload_bookmarks()?;
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::app::KindlingError;
    use crate::client::ItemFetcher;
    use crate::store::SqliteStore;

    struct StubSource {
        ids: Vec<i64>,
        items: HashMap<i64, Item>,
        fail: HashSet<i64>,
        item_calls: AtomicUsize,
    }

    impl StubSource {
        fn new(count: i64) -> Self {
            let ids: Vec<i64> = (1..=count).collect();
            let items = ids
                .iter()
                .map(|&id| {
                    (
                        id,
                        Item {
                            id,
                            kind: Some("story".into()),
                            title: Some(format!("story {}", id)),
                            time: Some(id),
                            score: Some(100 - id),
                            descendants: Some(id % 7),
                            ..Default::default()
                        },
                    )
                })
                .collect();
            Self {
                ids,
                items,
                fail: HashSet::new(),
                item_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ItemFetcher for StubSource {
        async fn fetch_item(&self, id: i64) -> Result<Option<Item>> {
            self.item_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.contains(&id) {
                return Err(KindlingError::Remote("stub offline".into()));
            }
            Ok(self.items.get(&id).cloned())
        }
    }

    #[async_trait]
    impl FeedSource for StubSource {
        async fn list_ids(&self, _kind: FeedKind) -> Result<Vec<i64>> {
            Ok(self.ids.clone())
        }
    }

    fn controller(source: StubSource) -> (Arc<StubSource>, FeedController) {
        let source = Arc::new(source);
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let ctrl = FeedController::new(source.clone(), store, FeedKind::Top, SortOrder::Rank);
        (source, ctrl)
    }

    #[tokio::test]
    async fn test_load_fetches_one_page_of_twenty() {
        let (_, mut ctrl) = controller(StubSource::new(25));
        ctrl.load().await.unwrap();

        let items = ctrl.view_items();
        assert_eq!(items.len(), 20);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[19].id, 20);
    }

    #[tokio::test]
    async fn test_load_more_appends_the_next_page() {
        let (_, mut ctrl) = controller(StubSource::new(25));
        ctrl.load().await.unwrap();
        ctrl.load_more().await.unwrap();

        let items = ctrl.view_items();
        assert_eq!(items.len(), 25);
        assert_eq!(items[24].id, 25);
    }

    #[tokio::test]
    async fn test_failed_item_fetch_does_not_discard_the_page() {
        let mut source = StubSource::new(5);
        source.fail.insert(3);
        let (_, mut ctrl) = controller(source);
        ctrl.load().await.unwrap();

        let ids: Vec<i64> = ctrl.view_items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 5]);
    }

    #[tokio::test]
    async fn test_missing_items_are_skipped() {
        let mut source = StubSource::new(5);
        source.items.remove(&2);
        let (_, mut ctrl) = controller(source);
        ctrl.load().await.unwrap();
        assert_eq!(ctrl.view_items().len(), 4);
    }

    #[tokio::test]
    async fn test_sorting_never_refetches() {
        let (source, mut ctrl) = controller(StubSource::new(5));
        ctrl.load().await.unwrap();
        let calls = source.item_calls.load(Ordering::SeqCst);

        ctrl.set_sort(SortOrder::Score);
        let by_score: Vec<i64> = ctrl.view_items().iter().map(|i| i.id).collect();
        assert_eq!(by_score, vec![1, 2, 3, 4, 5]); // score = 100 - id

        ctrl.set_sort(SortOrder::Time);
        let by_time: Vec<i64> = ctrl.view_items().iter().map(|i| i.id).collect();
        assert_eq!(by_time, vec![5, 4, 3, 2, 1]);

        assert_eq!(source.item_calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test]
    async fn test_toggle_bookmark_saves_then_removes() {
        let (_, mut ctrl) = controller(StubSource::new(3));
        ctrl.load().await.unwrap();
        let item = ctrl.view_items()[0].clone();

        ctrl.toggle_bookmark(&item).unwrap();
        assert!(ctrl.is_bookmarked(item.id));
        assert_eq!(ctrl.bookmark_count(), 1);

        ctrl.toggle_bookmark(&item).unwrap();
        assert!(!ctrl.is_bookmarked(item.id));
        assert_eq!(ctrl.bookmark_count(), 0);
    }

    #[tokio::test]
    async fn test_toggle_read_requires_a_bookmark() {
        let (_, mut ctrl) = controller(StubSource::new(3));
        ctrl.load().await.unwrap();
        let item = ctrl.view_items()[0].clone();

        assert!(ctrl.toggle_read(item.id).unwrap().is_none());

        ctrl.toggle_bookmark(&item).unwrap();
        let updated = ctrl.toggle_read(item.id).unwrap().unwrap();
        assert!(updated.read);
        assert!(ctrl.is_read(item.id));
    }

    #[tokio::test]
    async fn test_bookmarks_view_is_newest_save_first() {
        let (_, mut ctrl) = controller(StubSource::new(3));
        ctrl.load().await.unwrap();
        for item in ctrl.view_items() {
            ctrl.toggle_bookmark(&item).unwrap();
        }

        ctrl.set_kind(FeedKind::Bookmarks);
        ctrl.load().await.unwrap();

        let saved: Vec<i64> = ctrl
            .view_items()
            .iter()
            .map(|i| ctrl.bookmark_for(i.id).unwrap().saved_at)
            .collect();
        assert!(saved.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_refresh_interval_cycles_back_to_off() {
        let mut interval = RefreshInterval::Off;
        for _ in 0..4 {
            interval = interval.next();
        }
        assert_eq!(interval, RefreshInterval::Off);
        assert!(RefreshInterval::Off.duration().is_none());
        assert_eq!(
            RefreshInterval::Sec30.duration(),
            Some(Duration::from_secs(30))
        );
    }
}
