use serde::{Deserialize, Serialize};

use crate::domain::Item;

/// Feed categories. All but [`FeedKind::Bookmarks`] map to a remote id list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Top,
    New,
    Best,
    Ask,
    Show,
    Job,
    Bookmarks,
}

impl FeedKind {
    pub const ALL: [FeedKind; 7] = [
        FeedKind::Top,
        FeedKind::New,
        FeedKind::Best,
        FeedKind::Ask,
        FeedKind::Show,
        FeedKind::Job,
        FeedKind::Bookmarks,
    ];

    /// Path prefix of the remote id list (`{prefix}stories.json`).
    pub fn remote_prefix(self) -> Option<&'static str> {
        match self {
            FeedKind::Top => Some("top"),
            FeedKind::New => Some("new"),
            FeedKind::Best => Some("best"),
            FeedKind::Ask => Some("ask"),
            FeedKind::Show => Some("show"),
            FeedKind::Job => Some("job"),
            FeedKind::Bookmarks => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeedKind::Top => "TOP",
            FeedKind::New => "NEW",
            FeedKind::Best => "BEST",
            FeedKind::Ask => "ASK",
            FeedKind::Show => "SHOW",
            FeedKind::Job => "JOBS",
            FeedKind::Bookmarks => "SAVED",
        }
    }
}

impl std::str::FromStr for FeedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(FeedKind::Top),
            "new" => Ok(FeedKind::New),
            "best" => Ok(FeedKind::Best),
            "ask" => Ok(FeedKind::Ask),
            "show" => Ok(FeedKind::Show),
            "job" => Ok(FeedKind::Job),
            "bookmarks" => Ok(FeedKind::Bookmarks),
            other => Err(format!("unknown feed category: {}", other)),
        }
    }
}

/// Pure client-side re-sort of the loaded page; never triggers a refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Remote list order, untouched.
    Rank,
    /// Newest first.
    Time,
    /// Highest score first.
    Score,
    /// Most comments first.
    Comments,
}

impl SortOrder {
    pub fn next(self) -> Self {
        match self {
            SortOrder::Rank => SortOrder::Time,
            SortOrder::Time => SortOrder::Score,
            SortOrder::Score => SortOrder::Comments,
            SortOrder::Comments => SortOrder::Rank,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Rank => "RANK",
            SortOrder::Time => "NEWEST",
            SortOrder::Score => "POPULAR",
            SortOrder::Comments => "DISCUSSED",
        }
    }

    pub fn apply(self, items: &mut [Item]) {
        match self {
            SortOrder::Rank => {}
            SortOrder::Time => items.sort_by_key(|i| std::cmp::Reverse(i.time.unwrap_or(0))),
            SortOrder::Score => items.sort_by_key(|i| std::cmp::Reverse(i.score.unwrap_or(0))),
            SortOrder::Comments => {
                items.sort_by_key(|i| std::cmp::Reverse(i.descendants.unwrap_or(0)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, time: i64, score: i64, descendants: i64) -> Item {
        Item {
            id,
            time: Some(time),
            score: Some(score),
            descendants: Some(descendants),
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_keeps_remote_order() {
        let mut items = vec![item(3, 1, 1, 1), item(1, 9, 9, 9), item(2, 5, 5, 5)];
        SortOrder::Rank.apply(&mut items);
        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_score_sorts_descending() {
        let mut items = vec![item(1, 0, 2, 0), item(2, 0, 9, 0), item(3, 0, 5, 0)];
        SortOrder::Score.apply(&mut items);
        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_missing_fields_sort_last() {
        let mut items = vec![Item { id: 1, ..Default::default() }, item(2, 0, 3, 0)];
        SortOrder::Score.apply(&mut items);
        assert_eq!(items[0].id, 2);
    }

    #[test]
    fn test_sort_cycle_returns_to_rank() {
        let mut order = SortOrder::Rank;
        for _ in 0..4 {
            order = order.next();
        }
        assert_eq!(order, SortOrder::Rank);
    }

    #[test]
    fn test_feed_kind_parses_category_names() {
        assert_eq!("top".parse::<FeedKind>().unwrap(), FeedKind::Top);
        assert_eq!("bookmarks".parse::<FeedKind>().unwrap(), FeedKind::Bookmarks);
        assert!("hot".parse::<FeedKind>().is_err());
    }

    #[test]
    fn test_bookmarks_has_no_remote_list() {
        assert!(FeedKind::Bookmarks.remote_prefix().is_none());
        assert_eq!(FeedKind::Top.remote_prefix(), Some("top"));
    }
}
