pub mod cache;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::{KindlingError, Result};
use crate::client::cache::InflightCache;
use crate::domain::{FeedKind, Item, User};

pub const BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Seam over single-item lookups so the comment tree and feed
/// controller can run against stubs in tests.
#[async_trait]
pub trait ItemFetcher: Send + Sync {
    async fn fetch_item(&self, id: i64) -> Result<Option<Item>>;
}

/// Item lookups plus story-id lists; what the feed controller needs.
#[async_trait]
pub trait FeedSource: ItemFetcher {
    async fn list_ids(&self, kind: FeedKind) -> Result<Vec<i64>>;
}

/// Read-only client for the remote content API.
///
/// User lookups are de-duplicated and cached through an [`InflightCache`]
/// owned by the client instance; item and id-list lookups go straight to
/// the network every time.
pub struct HnClient {
    client: Client,
    base: String,
    users: InflightCache<User>,
}

impl HnClient {
    pub fn new() -> Self {
        Self::with_base(BASE_URL)
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .gzip(true)
            .user_agent("kindling/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base: base.into(),
            users: InflightCache::new(),
        }
    }

    /// Ordered story ids for a feed category. `Bookmarks` is local-only
    /// and has no remote list.
    pub async fn story_ids(&self, kind: FeedKind) -> Result<Vec<i64>> {
        let prefix = kind
            .remote_prefix()
            .ok_or_else(|| KindlingError::Other("bookmarks feed has no remote list".into()))?;
        let url = format!("{}/{}stories.json", self.base, prefix);
        let ids = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(ids)
    }

    /// One item by id. The API answers `null` for unknown ids.
    pub async fn item(&self, id: i64) -> Result<Option<Item>> {
        let url = format!("{}/item/{}.json", self.base, id);
        let item = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(item)
    }

    /// One user by id, de-duplicated across concurrent callers.
    pub async fn user(&self, id: &str) -> Result<User> {
        let url = format!("{}/user/{}.json", self.base, id);
        let client = self.client.clone();
        let name = id.to_string();

        self.users
            .get_or_fetch(id, async move {
                let user: Option<User> = client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| e.to_string())?
                    .error_for_status()
                    .map_err(|e| e.to_string())?
                    .json()
                    .await
                    .map_err(|e| e.to_string())?;
                user.ok_or_else(|| format!("no such user: {}", name))
            })
            .await
            .map_err(KindlingError::Remote)
    }
}

impl Default for HnClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemFetcher for HnClient {
    async fn fetch_item(&self, id: i64) -> Result<Option<Item>> {
        self.item(id).await
    }
}

#[async_trait]
impl FeedSource for HnClient {
    async fn list_ids(&self, kind: FeedKind) -> Result<Vec<i64>> {
        self.story_ids(kind).await
    }
}
