pub mod sqlite;

use crate::app::Result;
use crate::domain::{Bookmark, Item};

pub use sqlite::SqliteStore;

/// The local bookmark store.
///
/// Presence of a record is the sole definition of "bookmarked". Each
/// operation is one atomic transaction; there is no cross-operation
/// locking, so a `remove` racing a `toggle_read` on the same id is
/// last-write-wins.
pub trait BookmarkStore {
    /// Snapshot `item` with `saved_at = now_ms`, a fixed three-day
    /// deadline, and `read = false`. An existing record with the same id
    /// is fully replaced, not merged.
    fn add(&self, item: &Item, now_ms: i64) -> Result<Bookmark>;

    /// Delete the record if present; absent ids are a no-op, not an error.
    fn remove(&self, id: i64) -> Result<i64>;

    /// Set the read flag and write the full record back. Returns `None`
    /// without writing when no record exists — callers must check.
    fn toggle_read(&self, id: i64, read: bool) -> Result<Option<Bookmark>>;

    fn get(&self, id: i64) -> Result<Option<Bookmark>>;

    /// Every record, unordered as stored; callers sort.
    fn get_all(&self) -> Result<Vec<Bookmark>>;
}
