use serde::{Deserialize, Serialize};

use crate::domain::Item;

/// Soft expiry window: 3 days in milliseconds.
pub const DEADLINE_OFFSET_MS: i64 = 259_200_000;

/// A locally persisted snapshot of an item plus save metadata.
///
/// The snapshot is taken at save time and never follows the remote item.
/// `read` is the only field that may change after creation; `saved_at`
/// and `deadline` are fixed. Presence of a record in the store is the
/// sole definition of "bookmarked".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub kind: Option<String>,
    pub by: Option<String>,
    pub time: Option<i64>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub url: Option<String>,
    pub score: Option<i64>,
    pub descendants: Option<i64>,
    pub kids: Vec<i64>,
    /// Epoch milliseconds, set once at creation.
    pub saved_at: i64,
    /// Always `saved_at + DEADLINE_OFFSET_MS`, never recomputed.
    pub deadline: i64,
    pub read: bool,
}

impl Bookmark {
    pub fn new(item: &Item, now_ms: i64) -> Self {
        Self {
            id: item.id,
            kind: item.kind.clone(),
            by: item.by.clone(),
            time: item.time,
            title: item.title.clone(),
            text: item.text.clone(),
            url: item.url.clone(),
            score: item.score,
            descendants: item.descendants,
            kids: item.kids.clone(),
            saved_at: now_ms,
            deadline: now_ms + DEADLINE_OFFSET_MS,
            read: false,
        }
    }

    /// Advisory only; the store never deletes on expiry.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.deadline && !self.read
    }

    /// The snapshot as an [`Item`], for views that take either source.
    pub fn to_item(&self) -> Item {
        Item {
            id: self.id,
            kind: self.kind.clone(),
            by: self.by.clone(),
            time: self.time,
            title: self.title.clone(),
            text: self.text.clone(),
            url: self.url.clone(),
            score: self.score,
            descendants: self.descendants,
            kids: self.kids.clone(),
            deleted: false,
            dead: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story() -> Item {
        Item {
            id: 1,
            kind: Some("story".into()),
            title: Some("A".into()),
            score: Some(5),
            ..Default::default()
        }
    }

    #[test]
    fn test_deadline_is_three_days_after_save() {
        let b = Bookmark::new(&story(), 1_700_000_000_000);
        assert_eq!(b.saved_at, 1_700_000_000_000);
        assert_eq!(b.deadline - b.saved_at, 259_200_000);
        assert!(!b.read);
    }

    #[test]
    fn test_expiry_requires_deadline_passed_and_unread() {
        let mut b = Bookmark::new(&story(), 1000);
        assert!(!b.is_expired(1000 + DEADLINE_OFFSET_MS));
        assert!(b.is_expired(1001 + DEADLINE_OFFSET_MS));
        b.read = true;
        assert!(!b.is_expired(1001 + DEADLINE_OFFSET_MS));
    }

    #[test]
    fn test_snapshot_round_trips_to_item() {
        let b = Bookmark::new(&story(), 42);
        let item = b.to_item();
        assert_eq!(item.id, 1);
        assert_eq!(item.title.as_deref(), Some("A"));
        assert_eq!(item.score, Some(5));
        assert!(!item.is_removed());
    }
}
