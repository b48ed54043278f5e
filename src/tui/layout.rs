use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::comments::NodeState;
use crate::domain::{time_ago, FeedKind, Item};
use crate::feed::now_ms;
use crate::tui::app::{TuiApp, View};

pub fn render(frame: &mut Frame, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // category/sort bar
            Constraint::Min(5),    // list or detail
            Constraint::Length(1), // status bar
        ])
        .split(frame.area());

    render_tab_bar(frame, app, chunks[0]);
    match app.view {
        View::List => render_story_list(frame, app, chunks[1]),
        View::Detail => render_detail(frame, app, chunks[1]),
    }
    render_status_bar(frame, app, chunks[2]);
}

fn render_tab_bar(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let mut spans = Vec::new();
    for (i, kind) in FeedKind::ALL.iter().enumerate() {
        let label = if *kind == FeedKind::Bookmarks {
            format!("{}:{}({})", i + 1, kind.label(), app.controller.bookmark_count())
        } else {
            format!("{}:{}", i + 1, kind.label())
        };
        let style = if *kind == app.controller.kind {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    spans.push(Span::styled(
        format!(
            "| sort:{} auto:{}",
            app.controller.sort.label(),
            app.auto_refresh.label()
        ),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_story_list(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let stories = app.controller.view_items();
    let now_secs = Utc::now().timestamp();
    let now = now_ms();

    if stories.is_empty() {
        let message = if app.is_loading { "Loading..." } else { "No stories" };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = stories
        .iter()
        .enumerate()
        .map(|(rank, story)| story_row(app, story, rank, now_secs, now))
        .collect();

    let title = format!(" {} ({}) ", app.controller.kind.label(), stories.len());
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn story_row<'a>(
    app: &TuiApp,
    story: &'a Item,
    rank: usize,
    now_secs: i64,
    now: i64,
) -> ListItem<'a> {
    let bookmark = app.controller.bookmark_for(story.id);
    let is_read = bookmark.map(|b| b.read).unwrap_or(false);

    let title_style = if is_read {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    let mut title_spans = vec![
        Span::styled(format!("{:>3}. ", rank + 1), Style::default().fg(Color::DarkGray)),
        Span::styled(story.display_title().to_string(), title_style),
    ];
    if let Some(host) = story.host() {
        title_spans.push(Span::styled(
            format!(" ({})", host),
            Style::default().fg(Color::DarkGray),
        ));
    }

    // A bookmarked story in a remote feed shows its saved-at age, like
    // the bookmarks view does.
    let display_time = bookmark
        .map(|b| b.saved_at / 1000)
        .or(story.time)
        .unwrap_or(0);

    let mut meta = format!(
        "     {} pts by {} {} | {} comments",
        story.score.unwrap_or(0),
        story.display_author(),
        time_ago(display_time, now_secs),
        story.descendants.unwrap_or(0),
    );
    if bookmark.is_some() {
        meta.push_str(" [SAVED]");
    }
    if is_read {
        meta.push_str(" [READ]");
    }

    let mut lines = vec![
        Line::from(title_spans),
        Line::from(Span::styled(meta, Style::default().fg(Color::DarkGray))),
    ];
    if let Some(b) = bookmark {
        if b.is_expired(now) {
            lines[1].spans.push(Span::styled(
                " [EXPIRED]",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
    }

    ListItem::new(Text::from(lines))
}

fn render_detail(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let detail = match &app.detail {
        Some(detail) => detail,
        None => return,
    };
    let story = &detail.story;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(4)])
        .split(area);

    render_story_header(frame, app, story, chunks[0]);
    render_comments(frame, app, chunks[1]);
}

fn render_story_header(frame: &mut Frame, app: &TuiApp, story: &Item, area: Rect) {
    let now_secs = Utc::now().timestamp();
    let mut lines = vec![Line::from(Span::styled(
        story.display_title().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    let mut meta = format!(
        "{} pts by {} {}",
        story.score.unwrap_or(0),
        story.display_author(),
        time_ago(story.time.unwrap_or(0), now_secs),
    );
    if app.controller.is_bookmarked(story.id) {
        meta.push_str(" [SAVED]");
    }
    if app.controller.is_read(story.id) {
        meta.push_str(" [READ]");
    }
    lines.push(Line::from(Span::styled(
        meta,
        Style::default().fg(Color::DarkGray),
    )));

    if let Some(url) = &story.url {
        lines.push(Line::from(Span::styled(
            url.clone(),
            Style::default().fg(Color::Blue),
        )));
    } else if let Some(text) = &story.text {
        for line in clean_html(text).lines().take(4) {
            lines.push(Line::from(line.to_string()));
        }
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_comments(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let detail = match &app.detail {
        Some(detail) => detail,
        None => return,
    };
    let now_secs = Utc::now().timestamp();
    let visible = detail.tree.visible();

    let title = format!(
        " Comments ({}) ",
        detail.story.descendants.unwrap_or(visible.len() as i64)
    );
    let block = Block::default().title(title).borders(Borders::ALL);

    if visible.is_empty() {
        let message = if detail.tree.has_pending() {
            "Loading comments..."
        } else {
            "No comments"
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = visible
        .iter()
        .map(|node| {
            let indent = "  ".repeat(node.depth);
            match node.state {
                NodeState::Loading => ListItem::new(Line::from(Span::styled(
                    format!("{}...", indent),
                    Style::default().fg(Color::DarkGray),
                ))),
                NodeState::Failed => ListItem::new(Line::from(Span::styled(
                    format!("{}! failed to load (x to retry)", indent),
                    Style::default().fg(Color::Red),
                ))),
                NodeState::Rendered { item, collapsed } => {
                    comment_row(item, *collapsed, &indent, width, now_secs)
                }
                // Empty nodes never appear in visible().
                NodeState::Empty => ListItem::new(""),
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.comment_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn comment_row<'a>(
    item: &Item,
    collapsed: bool,
    indent: &str,
    width: usize,
    now_secs: i64,
) -> ListItem<'a> {
    let mut header = format!(
        "{}{} {} [{}]",
        indent,
        if collapsed { "+" } else { "-" },
        item.display_author(),
        time_ago(item.time.unwrap_or(0), now_secs),
    );
    if collapsed && !item.kids.is_empty() {
        header.push_str(&format!(" ({} replies hidden)", item.kids.len()));
    }

    let mut lines = vec![Line::from(Span::styled(
        header,
        Style::default().fg(Color::Yellow),
    ))];

    if !collapsed {
        let text = clean_html(item.text.as_deref().unwrap_or(""));
        for raw_line in text.lines() {
            for wrapped in wrap_line(raw_line, width.saturating_sub(indent.len())) {
                lines.push(Line::from(format!("{}{}", indent, wrapped)));
            }
        }
    }

    ListItem::new(Text::from(lines))
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let status = if app.is_loading {
        "Loading...".to_string()
    } else if let Some(ref msg) = app.status_message {
        msg.clone()
    } else {
        match app.view {
            View::List => {
                "j/k:Navigate  Enter:Open  b:Save  r:Read  s:Sort  n:More  R:Refresh  a:Auto  u:Author  1-7:Feed  q:Quit"
                    .to_string()
            }
            View::Detail => {
                "j/k:Navigate  Enter:Collapse  x:Retry  b:Save  r:Read  o:Browser  u:Author  Esc:Back  q:Quit"
                    .to_string()
            }
        }
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Decode HTML entities and reduce markup to plain text: paragraph and
/// line-break tags become newlines, every other tag is dropped.
fn clean_html(html: &str) -> String {
    let decoded = html_escape::decode_html_entities(html);
    let mut result = String::new();
    let mut rest = decoded.as_ref();

    while let Some(open) = rest.find('<') {
        result.push_str(&rest[..open]);
        rest = &rest[open..];
        let close = match rest.find('>') {
            Some(i) => i,
            None => break, // unterminated tag, drop the remainder
        };
        let tag = rest[1..close].to_ascii_lowercase();
        if tag == "p" || tag.starts_with("p ") {
            result.push_str("\n\n");
        } else if tag == "br" || tag == "br/" || tag == "br /" {
            result.push('\n');
        }
        rest = &rest[close + 1..];
    }
    result.push_str(rest);
    result.trim().to_string()
}

/// Plain word wrap for comment bodies; the List widget does not wrap.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![line.to_string()];
    }
    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || out.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_html_decodes_entities_and_drops_tags() {
        let html = "Rust&#x27;s <i>borrow checker</i> &amp; you";
        assert_eq!(clean_html(html), "Rust's borrow checker & you");
    }

    #[test]
    fn test_clean_html_turns_paragraphs_into_blank_lines() {
        let html = "first<p>second<p>third";
        assert_eq!(clean_html(html), "first\n\nsecond\n\nthird");
    }

    #[test]
    fn test_clean_html_handles_links() {
        let html = r#"see <a href="https://example.com">here</a>"#;
        assert_eq!(clean_html(html), "see here");
    }

    #[test]
    fn test_wrap_line_respects_width() {
        let wrapped = wrap_line("one two three four", 9);
        assert_eq!(wrapped, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_wrap_line_keeps_short_lines() {
        assert_eq!(wrap_line("short", 80), vec!["short"]);
    }
}
