pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use crate::app::{AppContext, Result};
use crate::config::Config;
use crate::feed::{Committed, Decision, FeedEvent};
use crate::gesture::{DragTracker, SwipeOutcome};

use self::app::{TuiApp, View, PAGE_SIZE};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, config).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let mut feed_events = ctx.feed.subscribe();
    let mut tui_app = TuiApp::new(ctx.feed.snapshot());
    let mut tracker = DragTracker::new(config.gesture.clone());
    let event_handler = EventHandler::new(Duration::from_millis(100));

    // Initial batch loads in the background; the card shows a loading state.
    spawn_load(&ctx);

    loop {
        drain_feed_events(&mut tui_app, &mut feed_events);
        tui_app.feed = ctx.feed.snapshot();
        tui_app.drag_offset = tracker.offset();

        terminal.draw(|frame| layout::render(frame, &mut tui_app, &config))?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                // Handle pending remove confirmation
                if let Some((id, title)) = tui_app.pending_remove.take() {
                    match key.code {
                        KeyCode::Char('y') | KeyCode::Char('Y') => {
                            match ctx.library.unsave(&id).await {
                                Ok(()) => tui_app.set_status(format!("Removed: {}", title)),
                                Err(e) => tui_app.set_status(format!("Remove failed: {}", e)),
                            }
                            reload_saved(&mut tui_app, &ctx).await;
                        }
                        _ => {
                            tui_app.set_status("Remove cancelled".to_string());
                        }
                    }
                    continue;
                }

                if tui_app.searching {
                    handle_search_key(&mut tui_app, &ctx, key).await;
                    continue;
                }

                if handle_raw_key(terminal, &mut tui_app, &ctx, &config, key).await? {
                    continue;
                }

                let action = config.keybindings.get_action(&key);
                handle_action(terminal, &mut tui_app, &ctx, &config, action).await?;
            }
            AppEvent::Mouse(mouse) => {
                if tui_app.view == View::Feed {
                    if let Some(outcome) = track_mouse(&mut tracker, mouse) {
                        commit(terminal, &mut tui_app, &ctx, &config, outcome).await?;
                    }
                } else {
                    tracker.cancel();
                }
            }
            AppEvent::Tick => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    ctx.feed.reset();
    Ok(())
}

fn spawn_load(ctx: &AppContext) {
    let feed = ctx.feed.clone();
    tokio::spawn(async move {
        let outcome = feed.load_more().await;
        debug!("Load finished: {:?}", outcome);
    });
}

fn drain_feed_events(tui_app: &mut TuiApp, events: &mut broadcast::Receiver<FeedEvent>) {
    loop {
        match events.try_recv() {
            Ok(FeedEvent::BatchLoaded { added, failed }) => {
                let message = if failed > 0 {
                    format!("Loaded {} articles ({} failed)", added, failed)
                } else {
                    format!("Loaded {} articles", added)
                };
                tui_app.set_status(message);
            }
            Ok(FeedEvent::BatchFailed(message)) => {
                tui_app.set_status(format!("Could not load articles: {}", message));
            }
            Ok(FeedEvent::PersistenceFailed { message, .. }) => {
                tui_app.set_status(format!("Could not save decision: {}", message));
            }
            Ok(_) => {}
            Err(TryRecvError::Lagged(skipped)) => {
                warn!("Dropped {} feed events", skipped);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

/// Mouse events drive the drag tracker; a release yields what to commit.
fn track_mouse(tracker: &mut DragTracker, mouse: MouseEvent) -> Option<SwipeOutcome> {
    let now = Instant::now();
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            tracker.press_cell(mouse.column, mouse.row, now);
            None
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            tracker.move_cell(mouse.column, mouse.row, now);
            None
        }
        MouseEventKind::Up(MouseButton::Left) => tracker
            .release_cell(mouse.column, mouse.row, now)
            .map(|resolution| resolution.action()),
        _ => None,
    }
}

async fn handle_search_key(tui_app: &mut TuiApp, ctx: &AppContext, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => tui_app.searching = false,
        KeyCode::Esc => {
            tui_app.searching = false;
            tui_app.search_query.clear();
        }
        KeyCode::Backspace => {
            tui_app.search_query.pop();
        }
        KeyCode::Char(c) => tui_app.search_query.push(c),
        _ => return,
    }
    reload_saved(tui_app, ctx).await;
}

/// Keys that mean something fixed in a view regardless of bindings. Returns
/// whether the key was consumed.
async fn handle_raw_key(
    terminal: &mut Tui,
    tui_app: &mut TuiApp,
    ctx: &AppContext,
    config: &Config,
    key: KeyEvent,
) -> Result<bool> {
    match (tui_app.view, key.code) {
        (View::Detail | View::Saved, KeyCode::Down) => {
            tui_app.move_down(1);
            Ok(true)
        }
        (View::Detail | View::Saved, KeyCode::Up) => {
            tui_app.move_up(1);
            Ok(true)
        }
        (View::Detail, KeyCode::Char(c @ '1'..='9')) => {
            let index = c.to_digit(10).unwrap_or(1) as usize - 1;
            let title = tui_app
                .detail
                .as_ref()
                .and_then(|d| d.opened.article.related.get(index))
                .map(|r| r.title.clone());
            match title {
                Some(title) => open_article(terminal, tui_app, ctx, config, &title).await?,
                None => tui_app.set_status(format!("No related article {}", c)),
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}

async fn handle_action(
    terminal: &mut Tui,
    tui_app: &mut TuiApp,
    ctx: &AppContext,
    config: &Config,
    action: Action,
) -> Result<()> {
    match action {
        Action::Quit => {
            tui_app.should_quit = true;
        }
        Action::Like | Action::Skip | Action::DeepDive => match tui_app.view {
            View::Feed => {
                if let Some(outcome) = action.swipe_outcome() {
                    commit(terminal, tui_app, ctx, config, outcome).await?;
                }
            }
            View::Saved if action == Action::DeepDive => {
                let title = tui_app.selected_saved().map(|a| a.title().to_string());
                if let Some(title) = title {
                    open_article(terminal, tui_app, ctx, config, &title).await?;
                }
            }
            _ => {}
        },
        Action::Back => match tui_app.view {
            View::Detail => tui_app.close_detail(),
            View::Saved => tui_app.view = View::Feed,
            View::Feed => tui_app.clear_status(),
        },
        Action::ToggleView => match tui_app.view {
            View::Feed => {
                reload_saved(tui_app, ctx).await;
                tui_app.view = View::Saved;
            }
            View::Saved => tui_app.view = View::Feed,
            View::Detail => tui_app.close_detail(),
        },
        Action::ToggleSave => {
            if let Some(detail) = tui_app.detail.as_mut() {
                match ctx.library.toggle(&detail.opened.article).await {
                    Ok(saved) => {
                        detail.opened.saved = saved;
                        let verb = if saved { "Saved" } else { "Unsaved" };
                        let message = format!("{}: {}", verb, detail.opened.article.title());
                        tui_app.set_status(message);
                    }
                    Err(e) => tui_app.set_status(format!("Save failed: {}", e)),
                }
            }
        }
        Action::OpenInBrowser => {
            let url = match tui_app.view {
                View::Feed => tui_app.feed.current_article.as_ref().map(|a| a.page_url.clone()),
                View::Detail => tui_app
                    .detail
                    .as_ref()
                    .map(|d| d.opened.article.summary.page_url.clone()),
                View::Saved => tui_app.selected_saved().map(|a| a.summary.page_url.clone()),
            };
            if let Some(url) = url {
                if let Err(e) = open::that(&url) {
                    tui_app.set_status(format!("Failed to open browser: {}", e));
                }
            }
        }
        Action::Retry => {
            if tui_app.view == View::Feed {
                tui_app.set_status("Loading articles...".to_string());
                spawn_load(ctx);
            }
        }
        Action::MoveUp => tui_app.move_up(1),
        Action::MoveDown => tui_app.move_down(1),
        Action::NextPage => tui_app.move_down(PAGE_SIZE),
        Action::PrevPage => tui_app.move_up(PAGE_SIZE),
        Action::RemoveSaved => {
            if tui_app.view == View::Saved {
                if let Some(article) = tui_app.selected_saved() {
                    tui_app.pending_remove =
                        Some((article.id().to_string(), article.title().to_string()));
                }
            }
        }
        Action::Search => {
            if tui_app.view == View::Saved {
                tui_app.searching = true;
            }
        }
        Action::None => {}
    }
    Ok(())
}

async fn commit(
    terminal: &mut Tui,
    tui_app: &mut TuiApp,
    ctx: &AppContext,
    config: &Config,
    outcome: SwipeOutcome,
) -> Result<()> {
    match ctx.feed.commit(outcome).await {
        Committed::Liked(decision) => report_decision(tui_app, "Liked", decision),
        Committed::Skipped(decision) => report_decision(tui_app, "Skipped", decision),
        Committed::DeepDive(title) => {
            open_article(terminal, tui_app, ctx, config, &title).await?;
        }
        Committed::Nothing => {}
    }
    Ok(())
}

fn report_decision(tui_app: &mut TuiApp, verb: &str, decision: Decision) {
    match decision.persist_error {
        Some(e) => tui_app.set_status(format!(
            "{} {}, but it was not recorded: {}",
            verb, decision.article.title, e
        )),
        None => tui_app.set_status(format!("{}: {}", verb, decision.article.title)),
    }
}

async fn open_article(
    terminal: &mut Tui,
    tui_app: &mut TuiApp,
    ctx: &AppContext,
    config: &Config,
    title: &str,
) -> Result<()> {
    tui_app.set_status(format!("Opening {}...", title));
    terminal.draw(|frame| layout::render(frame, tui_app, config))?;

    match ctx.open_article(title).await {
        Ok(opened) => {
            if opened.saved {
                if let Err(e) = ctx.library.mark_viewed(opened.article.id()).await {
                    warn!("Could not mark {} as viewed: {}", opened.article.id(), e);
                }
            }
            if opened.offline {
                tui_app.set_status("Offline copy".to_string());
            } else {
                tui_app.clear_status();
            }
            tui_app.open_detail(opened);
        }
        Err(e) => tui_app.set_status(format!("Could not open {}: {}", title, e)),
    }
    Ok(())
}

async fn reload_saved(tui_app: &mut TuiApp, ctx: &AppContext) {
    let result = if tui_app.search_query.trim().is_empty() {
        ctx.library.list_saved().await
    } else {
        ctx.library.search(&tui_app.search_query).await
    };

    match result {
        Ok(saved) => tui_app.set_saved(saved),
        Err(e) => tui_app.set_status(format!("Could not load saved articles: {}", e)),
    }
}
