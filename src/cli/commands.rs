use chrono::Utc;

use crate::app::{AppContext, KindlingError, Result};
use crate::domain::{time_ago, Bookmark, FeedKind, SortOrder};
use crate::feed::{now_ms, FeedController};
use crate::store::BookmarkStore;

pub async fn list(ctx: &AppContext, category: FeedKind) -> Result<()> {
    let mut controller = FeedController::new(
        ctx.client.clone(),
        ctx.store.clone(),
        category,
        SortOrder::Rank,
    );
    controller.load().await?;

    let items = controller.view_items();
    if items.is_empty() {
        println!("No stories");
        return Ok(());
    }

    let now = Utc::now().timestamp();
    for (rank, item) in items.iter().enumerate() {
        let mut markers = String::new();
        if controller.is_bookmarked(item.id) {
            markers.push_str(" [SAVED]");
        }
        if controller.is_read(item.id) {
            markers.push_str(" [READ]");
        }

        let host = item.host().map(|h| format!(" ({})", h)).unwrap_or_default();
        println!(
            "{:>3}. {}{}{}",
            rank + 1,
            item.display_title(),
            host,
            markers
        );
        println!(
            "     {} pts by {} {} | {} comments | id {}",
            item.score.unwrap_or(0),
            item.display_author(),
            time_ago(item.time.unwrap_or(0), now),
            item.descendants.unwrap_or(0),
            item.id
        );
    }

    Ok(())
}

pub fn bookmarks(ctx: &AppContext) -> Result<()> {
    let mut saved = ctx.store.get_all()?;
    if saved.is_empty() {
        println!("No bookmarks");
        return Ok(());
    }
    saved.sort_by_key(|b: &Bookmark| std::cmp::Reverse(b.saved_at));

    let now = now_ms();
    for bookmark in saved {
        let marker = if bookmark.read {
            " [READ]"
        } else if bookmark.is_expired(now) {
            " [EXPIRED]"
        } else {
            ""
        };
        println!("{:>10}  {}{}", bookmark.id, bookmark.title.as_deref().unwrap_or("(untitled)"), marker);
    }

    Ok(())
}

pub async fn save(ctx: &AppContext, id: i64) -> Result<()> {
    let item = ctx
        .client
        .item(id)
        .await?
        .ok_or(KindlingError::ItemNotFound(id))?;

    let bookmark = ctx.store.add(&item, now_ms())?;
    println!(
        "Saved: {} (expires {})",
        bookmark.title.as_deref().unwrap_or("(untitled)"),
        format_deadline(bookmark.deadline)
    );
    Ok(())
}

pub fn remove(ctx: &AppContext, id: i64) -> Result<()> {
    ctx.store.remove(id)?;
    println!("Removed bookmark {}", id);
    Ok(())
}

pub fn read(ctx: &AppContext, id: i64) -> Result<()> {
    let current = match ctx.store.get(id)? {
        Some(bookmark) => bookmark.read,
        None => {
            println!("Not bookmarked: {}", id);
            return Ok(());
        }
    };

    match ctx.store.toggle_read(id, !current)? {
        Some(updated) => {
            let state = if updated.read { "read" } else { "unread" };
            println!("Marked {} as {}", id, state);
        }
        None => println!("Not bookmarked: {}", id),
    }
    Ok(())
}

fn format_deadline(deadline_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(deadline_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "?".to_string())
}
