use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::{ColorConfig, Config};
use crate::gesture::{DragGesture, SwipeOutcome};
use crate::tui::app::{TuiApp, View};

const CARD_MAX_WIDTH: u16 = 72;

pub fn render(frame: &mut Frame, app: &mut TuiApp, config: &Config) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Active view
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    match app.view {
        View::Feed => render_feed(frame, app, chunks[0], config),
        View::Detail => render_detail(frame, app, chunks[0], &config.colors),
        View::Saved => render_saved(frame, app, chunks[0], &config.colors),
    }
    render_status_bar(frame, app, chunks[1], &config.colors);
}

/// Card area, shifted horizontally by the live drag.
fn card_area(area: Rect, shift: i32) -> Rect {
    let width = area.width.min(CARD_MAX_WIDTH);
    let centered = i32::from(area.x) + i32::from(area.width.saturating_sub(width) / 2);
    let max_x = i32::from(area.x) + i32::from(area.width - width);
    let x = (centered + shift).clamp(i32::from(area.x), max_x);

    Rect {
        x: x as u16,
        width,
        ..area
    }
}

fn render_feed(frame: &mut Frame, app: &TuiApp, area: Rect, config: &Config) {
    let colors = &config.colors;
    let feed = &app.feed;

    let (shift, hint) = match app.drag_offset {
        Some((dx, dy)) => {
            let preview = config.gesture.interpret(&DragGesture::new(dx, dy, 0.0));
            ((dx / config.gesture.cell_width).round() as i32, Some(preview))
        }
        None => (0, None),
    };
    let card = card_area(area, shift);

    let border_style = match hint {
        Some(SwipeOutcome::Like) => Style::default().fg(colors.like),
        Some(SwipeOutcome::Skip) => Style::default().fg(colors.skip),
        Some(_) => Style::default().fg(colors.drag_border),
        None => Style::default().fg(colors.border),
    };

    let queue_status = format!(
        " {}/{} · {} left{} ",
        (feed.current_index + 1).min(feed.queue_len.max(1)),
        feed.queue_len,
        feed.remaining,
        if feed.is_loading { " · loading" } else { "" }
    );

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title_bottom(Line::from(queue_status).alignment(Alignment::Right));
    if let Some(label) = hint.and_then(hint_label) {
        block = block.title(Line::from(format!(" {} ", label)).alignment(Alignment::Center));
    }

    let content = match &feed.current_article {
        Some(article) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    article.title.clone(),
                    Style::default()
                        .fg(colors.title)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    article.display_extract().to_string(),
                    Style::default().fg(colors.extract),
                )),
                Line::from(""),
            ];
            if let Some(thumbnail) = &article.thumbnail {
                lines.push(Line::from(Span::styled(
                    format!("[image {}x{}]", thumbnail.width, thumbnail.height),
                    Style::default().fg(colors.border),
                )));
            }
            lines.push(Line::from(Span::styled(
                article.page_url.clone(),
                Style::default().fg(colors.link),
            )));
            Text::from(lines)
        }
        None if feed.is_loading => Text::from("Loading articles..."),
        None => match &feed.error {
            Some(error) => Text::from(vec![
                Line::from(Span::styled(
                    format!("Could not load articles: {}", error),
                    Style::default().fg(colors.error),
                )),
                Line::from(""),
                Line::from("Press r to retry"),
            ]),
            None => Text::from("No more articles. Press r to load more"),
        },
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, card);
    frame.render_widget(paragraph, card);
}

fn hint_label(outcome: SwipeOutcome) -> Option<&'static str> {
    match outcome {
        SwipeOutcome::Like => Some("LIKE"),
        SwipeOutcome::Skip => Some("SKIP"),
        SwipeOutcome::DeepDive => Some("DEEP DIVE"),
        SwipeOutcome::None => None,
    }
}

fn render_detail(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let Some(detail) = &app.detail else {
        frame.render_widget(Paragraph::new("Nothing to show"), area);
        return;
    };
    let article = &detail.opened.article;

    let mut title = format!(" {} ", article.title());
    if detail.opened.saved {
        title.push_str("★ ");
    }
    if detail.opened.offline {
        title.push_str("(offline) ");
    }

    let mut lines = vec![
        Line::from(Span::styled(
            article.summary.page_url.clone(),
            Style::default().fg(colors.link),
        )),
        Line::from(""),
    ];

    for block in &detail.blocks {
        let marker = "#".repeat(usize::from(block.level.max(1)));
        lines.push(Line::from(Span::styled(
            format!("{} {}", marker, block.heading),
            Style::default()
                .fg(colors.heading)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        for line in block.body.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::from(""));
    }

    if !article.related.is_empty() {
        lines.push(Line::from(
            "─".repeat(area.width.saturating_sub(2) as usize),
        ));
        lines.push(Line::from(Span::styled(
            "Related",
            Style::default()
                .fg(colors.heading)
                .add_modifier(Modifier::BOLD),
        )));
        for (i, related) in article.related.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Style::default().fg(colors.link)),
                Span::raw(related.title.clone()),
            ]));
        }
    }

    let title_style = if detail.opened.saved {
        Style::default().fg(colors.saved_marker)
    } else {
        Style::default().fg(colors.title)
    };

    let block = Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((detail.scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_saved(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Search line
            Constraint::Min(3),    // List
        ])
        .split(area);

    let search = if app.searching {
        format!("/{}_", app.search_query)
    } else if app.search_query.is_empty() {
        String::new()
    } else {
        format!("Filter: {}", app.search_query)
    };
    frame.render_widget(Paragraph::new(search), chunks[0]);

    let items: Vec<ListItem> = app
        .saved
        .iter()
        .map(|article| {
            let marker = if article.offline_content.is_some() {
                "●"
            } else {
                " "
            };
            let date = article.saved_at.format("%Y-%m-%d");
            ListItem::new(format!("{} {} {}", marker, date, article.title()))
        })
        .collect();

    let title = format!(
        " Saved ({}) [{}/{}] ",
        app.saved.len(),
        app.saved_index + 1,
        app.saved.len().max(1)
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(colors.selection_bg)
                .fg(colors.selection_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[1], &mut app.saved_list_state);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status = if let Some((_, ref title)) = app.pending_remove {
        format!("Remove \"{}\"? (y/n)", title)
    } else if let Some(ref msg) = app.status_message {
        msg.clone()
    } else {
        match app.view {
            View::Feed => "←/h:Skip  →/l:Like  ↓/Enter:Dive  drag:Swipe  Tab:Saved  o:Open  r:Retry  q:Quit",
            View::Detail => "j/k:Scroll  1-8:Related  s:Save  o:Open  Esc:Back  q:Quit",
            View::Saved => "j/k:Nav  Enter:Open  /:Search  d:Remove  Tab:Feed  q:Quit",
        }
        .to_string()
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}
