use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::status_color;
use crate::tui::App;
use cadence::{format_interval, Rating};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(current) = app.session.current() else {
        draw_empty(f, app, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),      // Progress
            Constraint::Percentage(40), // Question
            Constraint::Min(3),         // Answer
            Constraint::Length(3),      // Rating buttons
        ])
        .split(area);

    draw_progress(f, app, chunks[0]);

    let record = &current.review.record;
    let question = Paragraph::new(current.card.question.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Question [{}] ", record.status.label()))
                .title_style(Style::default().fg(status_color(record.status))),
        )
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);
    f.render_widget(question, chunks[1]);

    let answer_block = Block::default()
        .borders(Borders::ALL)
        .title(" Answer ")
        .title_style(Style::default().fg(Color::Green));
    let answer = if app.session.revealed {
        Paragraph::new(current.card.answer.as_str())
    } else {
        Paragraph::new(Span::styled(
            "Press <Space> to show the answer",
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(
        answer
            .block(answer_block)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center),
        chunks[2],
    );

    draw_buttons(f, app, chunks[3]);
}

fn draw_progress(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled("Remaining: ", Style::default().fg(Color::Gray)),
        Span::styled(
            app.session.queue.len().to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  Reviewed: ", Style::default().fg(Color::Gray)),
        Span::raw(app.session.reviewed.to_string()),
    ];

    if let Some((rating, interval)) = app.session.last_rating {
        spans.push(Span::styled("  Last: ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            format!("{} → {}", rating.label(), format_interval(interval)),
            Style::default().fg(rating_color(rating)),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_buttons(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (i, rating) in Rating::ALL.iter().enumerate() {
        // Intervals are only known once the answer has been previewed
        let interval = app
            .session
            .preview
            .as_ref()
            .map(|p| format_interval(p.get(*rating).interval_minutes))
            .unwrap_or_else(|| "-".to_string());

        let style = if app.session.revealed {
            Style::default().fg(rating_color(*rating))
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let button = Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", i + 1), Style::default().fg(Color::Cyan)),
            Span::styled(rating.label(), style.add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", interval), style),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(style));

        f.render_widget(button, columns[i]);
    }
}

fn draw_empty(f: &mut Frame, app: &App, area: Rect) {
    let mut text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Nothing due right now.",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    if app.session.reviewed > 0 {
        text.push(Line::from(format!(
            "Reviewed {} card{} this session.",
            app.session.reviewed,
            if app.session.reviewed == 1 { "" } else { "s" }
        )));
    }
    text.push(Line::from(Span::styled(
        "Press ^r to check again.",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Review "));
    f.render_widget(paragraph, area);
}

fn rating_color(rating: Rating) -> Color {
    match rating {
        Rating::Again => Color::Red,
        Rating::Hard => Color::Yellow,
        Rating::Good => Color::Green,
        Rating::Easy => Color::Blue,
    }
}
