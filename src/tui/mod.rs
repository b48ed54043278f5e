pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::{AppContext, Result};
use crate::config::Settings;
use crate::feed::FeedController;

use self::app::{TuiApp, View};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run the TUI. The terminal is restored before any error propagates,
/// so an unexpected render failure cannot leave the shell raw.
pub async fn run(ctx: Arc<AppContext>, settings: Settings) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, settings).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>, settings: Settings) -> Result<()> {
    let controller = FeedController::new(
        ctx.client.clone(),
        ctx.store.clone(),
        settings.default_view,
        settings.default_sort,
    );
    let mut app = TuiApp::new(controller, settings);
    let event_handler = EventHandler::new(Duration::from_millis(100));

    load_with_indicator(terminal, &mut app).await?;

    loop {
        // Apply any comment fetches that settled since the last frame.
        if let Some(detail) = app.detail.as_mut() {
            if detail.tree.pump() > 0 {
                app.clamp_selection();
            }
        }

        terminal.draw(|frame| layout::render(frame, &app))?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                app.clear_status();
                handle_action(terminal, &mut app, &ctx, Action::from(key)).await?;
            }
            AppEvent::Tick => {
                // Silent auto-refresh: replace the page without a loading state.
                if let Some(interval) = app.auto_refresh.duration() {
                    if app.view == View::List && app.last_refresh.elapsed() >= interval {
                        if let Err(e) = app.controller.refresh().await {
                            tracing::warn!(error = %e, "auto-refresh failed");
                        }
                        app.clamp_selection();
                        app.last_refresh = Instant::now();
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

async fn handle_action(
    terminal: &mut Tui,
    app: &mut TuiApp,
    ctx: &Arc<AppContext>,
    action: Action,
) -> Result<()> {
    match action {
        Action::Quit => app.should_quit = true,
        Action::Back => {
            if app.view == View::Detail {
                app.close_detail();
            }
        }
        Action::MoveUp => app.move_up(),
        Action::MoveDown => app.move_down(),
        Action::Select => match app.view {
            View::List => {
                if let Some(story) = app.selected_story() {
                    match story.url.clone() {
                        Some(url) if app.settings.open_links_externally => open_url(app, &url),
                        _ => app.open_detail(story, ctx.client.clone()),
                    }
                }
            }
            View::Detail => {
                if let (Some(id), Some(detail)) = (app.selected_comment(), app.detail.as_mut()) {
                    detail.tree.toggle(id);
                    app.clamp_selection();
                }
            }
        },
        Action::ToggleBookmark => {
            let story = match app.view {
                View::List => app.selected_story(),
                View::Detail => app.detail.as_ref().map(|d| d.story.clone()),
            };
            if let Some(story) = story {
                let was_saved = app.controller.is_bookmarked(story.id);
                app.controller.toggle_bookmark(&story)?;
                app.clamp_selection();
                app.set_status(if was_saved { "Bookmark removed" } else { "Saved" });
            }
        }
        Action::ToggleRead => {
            let id = match app.view {
                View::List => app.selected_story().map(|s| s.id),
                View::Detail => app.detail.as_ref().map(|d| d.story.id),
            };
            if let Some(id) = id {
                match app.controller.toggle_read(id)? {
                    Some(updated) => {
                        app.set_status(if updated.read {
                            "Marked read"
                        } else {
                            "Marked unread"
                        });
                    }
                    None => app.set_status("Not bookmarked; save it first"),
                }
            }
        }
        Action::OpenInBrowser => {
            let url = match app.view {
                View::List => app.selected_story().and_then(|s| s.url),
                View::Detail => app.detail.as_ref().and_then(|d| d.story.url.clone()),
            };
            match url {
                Some(url) => open_url(app, &url),
                None => app.set_status("No URL for this story"),
            }
        }
        Action::CycleSort => {
            if app.view == View::List {
                app.controller.cycle_sort();
                app.set_status(format!("Sort: {}", app.controller.sort.label()));
            }
        }
        Action::NextPage => {
            if app.view == View::List {
                app.is_loading = true;
                terminal.draw(|frame| layout::render(frame, app))?;
                let result = app.controller.load_more().await;
                app.is_loading = false;
                if let Err(e) = result {
                    app.set_status(format!("Load failed: {}", e));
                }
            }
        }
        Action::Refresh => {
            if app.view == View::List {
                load_with_indicator(terminal, app).await?;
            }
        }
        Action::CycleAutoRefresh => {
            app.auto_refresh = app.auto_refresh.next();
            app.set_status(format!("Auto-refresh: {}", app.auto_refresh.label()));
        }
        Action::AuthorInfo => {
            if let Some(name) = app.selected_author() {
                app.set_status(format!("Looking up {}...", name));
                terminal.draw(|frame| layout::render(frame, app))?;
                match ctx.client.user(&name).await {
                    Ok(user) => app.set_status(format!(
                        "{}: {} karma, joined {}",
                        user.id,
                        user.karma.unwrap_or(0),
                        chrono::DateTime::from_timestamp(user.created, 0)
                            .map(|dt| dt.format("%Y-%m-%d").to_string())
                            .unwrap_or_else(|| "?".to_string())
                    )),
                    Err(e) => app.set_status(format!("User lookup failed: {}", e)),
                }
            }
        }
        Action::RetryComment => {
            if let (Some(id), Some(detail)) = (app.selected_comment(), app.detail.as_mut()) {
                detail.tree.retry(id);
            }
        }
        Action::Category(index) => {
            if let Some(kind) = app.category_at(index) {
                if app.view == View::List && kind != app.controller.kind {
                    app.controller.set_kind(kind);
                    app.selected = 0;
                    load_with_indicator(terminal, app).await?;
                }
            }
        }
        Action::None => {}
    }
    Ok(())
}

/// Visible (non-silent) load: draws a loading frame first, degrades to an
/// empty list with a status message on failure.
async fn load_with_indicator(terminal: &mut Tui, app: &mut TuiApp) -> Result<()> {
    app.is_loading = true;
    terminal.draw(|frame| layout::render(frame, app))?;

    let result = app.controller.load().await;
    app.is_loading = false;
    app.last_refresh = Instant::now();
    app.clamp_selection();

    if let Err(e) = result {
        tracing::warn!(error = %e, "feed load failed");
        app.set_status(format!("Load failed: {}", e));
    }
    Ok(())
}

fn open_url(app: &mut TuiApp, url: &str) {
    if let Err(e) = open::that(url) {
        app.set_status(format!("Failed to open browser: {}", e));
    }
}
