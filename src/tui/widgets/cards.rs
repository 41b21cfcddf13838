use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::{format_due, status_color, truncate};
use crate::tui::App;
use cadence::format_interval;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(6)])
        .split(area);

    draw_list(f, app, chunks[0]);
    draw_selected(f, app, chunks[1]);
}

fn header_span(text: String) -> Span<'static> {
    Span::styled(
        text,
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
}

fn draw_list(f: &mut Frame, app: &App, area: Rect) {
    let now = Utc::now();
    let items: Vec<ListItem> = app
        .cards
        .items
        .iter()
        .map(|cwr| {
            let record = &cwr.review.record;
            let due_color = if record.is_due(now) {
                Color::Red
            } else {
                Color::White
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<36}", truncate(&cwr.card.question, 34)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<12}", record.status.label()),
                    Style::default().fg(status_color(record.status)),
                ),
                Span::styled(
                    format!("{:<6.2}", record.ease_factor),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{:<10}", format_interval(record.interval_minutes)),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(format_due(record.due_at, now), Style::default().fg(due_color)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Cards ({}) ", app.cards.items.len()))
        .title_style(Style::default().fg(Color::Cyan));

    // Leading pad lines the header up past the highlight symbol
    let header = Line::from(vec![
        Span::raw("  "),
        header_span(format!("{:<36}", "Question")),
        header_span(format!("{:<12}", "Status")),
        header_span(format!("{:<6}", "Ease")),
        header_span(format!("{:<10}", "Interval")),
        header_span("Due".to_string()),
    ]);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    f.render_widget(Paragraph::new(header), rows[0]);

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.cards.selected);
    f.render_stateful_widget(list, rows[1], &mut state);
}

fn draw_selected(f: &mut Frame, app: &App, area: Rect) {
    let selected = app.cards.selected.and_then(|i| app.cards.items.get(i));

    let text = match selected {
        Some(cwr) => {
            let record = &cwr.review.record;
            vec![
                Line::from(vec![
                    Span::styled("A: ", Style::default().fg(Color::Gray)),
                    Span::styled(cwr.card.answer.clone(), Style::default().fg(Color::White)),
                ]),
                Line::from(vec![
                    Span::styled("Reviews: ", Style::default().fg(Color::Gray)),
                    Span::raw(record.review_count.to_string()),
                    Span::styled("  Lapses: ", Style::default().fg(Color::Gray)),
                    Span::raw(record.lapse_count.to_string()),
                    Span::styled("  Last: ", Style::default().fg(Color::Gray)),
                    Span::raw(
                        record
                            .last_reviewed_at
                            .map(|t| t.format("%b %d %H:%M").to_string())
                            .unwrap_or_else(|| "never".to_string()),
                    ),
                ]),
            ]
        }
        None => vec![Line::from(Span::styled(
            "No cards in this collection. Add some with `cadence card add`.",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Selected ")
        .title_style(Style::default().fg(Color::Magenta));

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
