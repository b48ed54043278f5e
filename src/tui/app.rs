use std::sync::Arc;
use std::time::Instant;

use crate::client::ItemFetcher;
use crate::comments::{CommentTree, NodeState};
use crate::config::Settings;
use crate::domain::{FeedKind, Item};
use crate::feed::{FeedController, RefreshInterval};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Detail,
}

/// A selected story plus its lazily-loaded comment tree.
pub struct DetailView {
    pub story: Item,
    pub tree: CommentTree,
}

pub struct TuiApp {
    pub view: View,
    pub controller: FeedController,
    pub settings: Settings,
    pub selected: usize,
    pub comment_index: usize,
    pub detail: Option<DetailView>,
    pub auto_refresh: RefreshInterval,
    pub last_refresh: Instant,
    pub status_message: Option<String>,
    pub is_loading: bool,
    pub should_quit: bool,
}

impl TuiApp {
    pub fn new(controller: FeedController, settings: Settings) -> Self {
        Self {
            view: View::List,
            controller,
            settings,
            selected: 0,
            comment_index: 0,
            detail: None,
            auto_refresh: RefreshInterval::Off,
            last_refresh: Instant::now(),
            status_message: None,
            is_loading: false,
            should_quit: false,
        }
    }

    pub fn selected_story(&self) -> Option<Item> {
        self.controller.view_items().into_iter().nth(self.selected)
    }

    /// Open a story's detail view. A bookmarked story opens its stored
    /// snapshot, matching what the bookmarks list shows.
    pub fn open_detail(&mut self, story: Item, fetcher: Arc<dyn ItemFetcher>) {
        let story = self
            .controller
            .bookmark_for(story.id)
            .map(|b| b.to_item())
            .unwrap_or(story);
        let tree = CommentTree::new(fetcher, &story.kids);
        self.detail = Some(DetailView { story, tree });
        self.comment_index = 0;
        self.view = View::Detail;
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
        self.view = View::List;
    }

    pub fn move_up(&mut self) {
        match self.view {
            View::List => self.selected = self.selected.saturating_sub(1),
            View::Detail => self.comment_index = self.comment_index.saturating_sub(1),
        }
    }

    pub fn move_down(&mut self) {
        match self.view {
            View::List => {
                let len = self.controller.view_items().len();
                if len > 0 && self.selected < len - 1 {
                    self.selected += 1;
                }
            }
            View::Detail => {
                let len = self
                    .detail
                    .as_ref()
                    .map(|d| d.tree.visible().len())
                    .unwrap_or(0);
                if len > 0 && self.comment_index < len - 1 {
                    self.comment_index += 1;
                }
            }
        }
    }

    /// Keep selections in range after the underlying lists change.
    pub fn clamp_selection(&mut self) {
        let list_len = self.controller.view_items().len();
        if self.selected >= list_len && list_len > 0 {
            self.selected = list_len - 1;
        }
        if let Some(detail) = &self.detail {
            let len = detail.tree.visible().len();
            if self.comment_index >= len && len > 0 {
                self.comment_index = len - 1;
            }
        }
    }

    /// Id of the comment under the cursor in the detail view.
    pub fn selected_comment(&self) -> Option<i64> {
        let detail = self.detail.as_ref()?;
        detail.tree.visible().get(self.comment_index).map(|v| v.id)
    }

    /// Author under the cursor: the selected comment's author in the
    /// detail view, the selected story's otherwise.
    pub fn selected_author(&self) -> Option<String> {
        match self.view {
            View::List => self.selected_story().and_then(|s| s.by),
            View::Detail => {
                let detail = self.detail.as_ref()?;
                match detail.tree.visible().get(self.comment_index).map(|v| v.state) {
                    Some(NodeState::Rendered { item, .. }) => item.by.clone(),
                    _ => detail.story.by.clone(),
                }
            }
        }
    }

    pub fn category_at(&self, index: usize) -> Option<FeedKind> {
        FeedKind::ALL.get(index).copied()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}
