pub mod bookmark;
pub mod feed;
pub mod item;
pub mod time;

pub use bookmark::{Bookmark, DEADLINE_OFFSET_MS};
pub use feed::{FeedKind, SortOrder};
pub use item::{Item, User};
pub use time::time_ago;
