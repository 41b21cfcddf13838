use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::{format_due, status_color, truncate};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(11), // Stats + status breakdown row
            Constraint::Min(0),     // Due queue
        ])
        .split(area);

    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    draw_stats(f, app, top_chunks[0]);
    draw_breakdown(f, app, top_chunks[1]);
    draw_due_queue(f, app, chunks[1]);
}

fn stat_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let stats = &app.stats;

    let mut text = vec![
        Line::from(vec![
            Span::styled("Cards: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.total_cards),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        stat_line(
            "Due",
            stats.due_cards.to_string(),
            if stats.due_cards > 0 {
                Color::Yellow
            } else {
                Color::White
            },
        ),
        stat_line("Reviews", stats.total_reviews.to_string(), Color::White),
        stat_line("Lapses", stats.total_lapses.to_string(), Color::Red),
        stat_line("Mature", stats.mature_cards.to_string(), Color::Green),
        stat_line("Avg Ease", format!("{:.2}", stats.average_ease), Color::Cyan),
    ];

    if app.session.reviewed > 0 {
        text.push(Line::from(""));
        text.push(stat_line(
            "This session",
            app.session.reviewed.to_string(),
            Color::Magenta,
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Stats ")
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(text).block(block);
    f.render_widget(paragraph, area);
}

fn draw_breakdown(f: &mut Frame, app: &App, area: Rect) {
    let stats = &app.stats;
    let rows = [
        ("New", stats.new_cards, Color::Blue),
        ("Learning", stats.learning_cards, Color::Yellow),
        ("Review", stats.review_cards, Color::Green),
    ];
    // Width of the bar area inside the borders, minus the label column
    let bar_width = area.width.saturating_sub(18) as u64;

    let text: Vec<Line> = rows
        .iter()
        .map(|(label, count, color)| {
            let filled = if stats.total_cards == 0 {
                0
            } else {
                count * bar_width / stats.total_cards
            };
            Line::from(vec![
                Span::styled(format!("{:<10}", label), Style::default().fg(Color::Gray)),
                Span::styled(format!("{:>4} ", count), Style::default().fg(*color)),
                Span::styled("█".repeat(filled as usize), Style::default().fg(*color)),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Status ")
        .title_style(Style::default().fg(Color::Green));

    let paragraph = Paragraph::new(text).block(block);
    f.render_widget(paragraph, area);
}

fn draw_due_queue(f: &mut Frame, app: &App, area: Rect) {
    let now = Utc::now();
    let items: Vec<ListItem> = app
        .session
        .queue
        .iter()
        .enumerate()
        .map(|(i, cwr)| {
            let record = &cwr.review.record;
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>3}. ", i + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<42}", truncate(&cwr.card.question, 40)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<12}", record.status.label()),
                    Style::default().fg(status_color(record.status)),
                ),
                Span::styled(
                    format_due(record.due_at, now),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let title = if items.is_empty() {
        " Due Queue (nothing due) ".to_string()
    } else {
        format!(" Due Queue ({}) ", items.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Yellow));

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}
