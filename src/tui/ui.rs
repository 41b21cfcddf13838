use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::widgets::{cards, dashboard, review};
use super::{App, View};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_help_bar(f, app, chunks[2]);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let due = app.session.queue.len();
    let review_title = if due > 0 {
        format!("Review ({})", due)
    } else {
        "Review".to_string()
    };
    let tab_titles = vec!["Dashboard".to_string(), "Cards".to_string(), review_title];
    let selected = match app.view {
        View::Dashboard => 0,
        View::Cards => 1,
        View::Review => 2,
    };

    let tabs = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Cadence: {} ", app.collection.name)),
        )
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::Dashboard => dashboard::draw(f, app, area),
        View::Cards => cards::draw(f, app, area),
        View::Review => review::draw(f, app, area),
    }
}

fn key(k: &str) -> Span<'_> {
    Span::styled(k, Style::default().fg(Color::Cyan))
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let spans = if let Some(message) = &app.message {
        vec![Span::styled(
            message.as_str(),
            Style::default().fg(Color::Red),
        )]
    } else {
        let mut spans = vec![key("h/l"), Span::raw(" Views  ")];

        match app.view {
            View::Dashboard => {
                spans.extend(vec![key("^r"), Span::raw(" Refresh  ")]);
            }
            View::Cards => {
                spans.extend(vec![
                    key("j/k"),
                    Span::raw(" Nav  "),
                    key("g/G"),
                    Span::raw(" Top/Bot  "),
                ]);
            }
            View::Review if app.session.revealed => {
                spans.extend(vec![
                    key("1"),
                    Span::raw(" Again  "),
                    key("2"),
                    Span::raw(" Hard  "),
                    key("3"),
                    Span::raw(" Good  "),
                    key("4"),
                    Span::raw(" Easy  "),
                    key("s"),
                    Span::raw(" Skip  "),
                ]);
            }
            View::Review => {
                spans.extend(vec![
                    key("<Space>"),
                    Span::raw(" Show answer  "),
                    key("s"),
                    Span::raw(" Skip  "),
                ]);
            }
        }

        spans.extend(vec![key("q"), Span::raw(" Quit")]);
        spans
    };

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}
