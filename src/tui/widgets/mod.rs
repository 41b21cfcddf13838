pub mod cards;
pub mod dashboard;
pub mod review;

use chrono::{DateTime, Utc};
use ratatui::style::Color;

use cadence::{format_interval, CardStatus};

pub fn status_color(status: CardStatus) -> Color {
    match status {
        CardStatus::New => Color::Blue,
        CardStatus::Learning => Color::Yellow,
        CardStatus::Review => Color::Green,
        CardStatus::Relearning => Color::Red,
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// "now" for overdue cards, otherwise "in 3h" style.
pub fn format_due(due_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if due_at <= now {
        return "now".to_string();
    }
    let minutes = (due_at - now).num_minutes().max(1);
    let minutes = u32::try_from(minutes).unwrap_or(u32::MAX);
    format!("in {}", format_interval(minutes))
}
