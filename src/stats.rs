use chrono::{DateTime, Utc};

use crate::models::{CardStatus, CollectionStats, ReviewRecord};

/// Summarise a snapshot of one learner's review records in a single pass.
pub fn summarize<'a, I>(records: I, now: DateTime<Utc>) -> CollectionStats
where
    I: IntoIterator<Item = &'a ReviewRecord>,
{
    let mut stats = CollectionStats::default();
    let mut total_ease = 0.0;
    let mut ease_count: u64 = 0;

    for record in records {
        stats.total_cards += 1;

        match record.status {
            CardStatus::New => stats.new_cards += 1,
            CardStatus::Learning | CardStatus::Relearning => stats.learning_cards += 1,
            CardStatus::Review => stats.review_cards += 1,
        }

        if record.is_due(now) {
            stats.due_cards += 1;
        }

        if record.ease_factor > 0.0 {
            total_ease += record.ease_factor;
            ease_count += 1;
        }

        stats.total_reviews += u64::from(record.review_count);
        stats.total_lapses += u64::from(record.lapse_count);

        if record.is_mature() {
            stats.mature_cards += 1;
        }
    }

    if ease_count > 0 {
        stats.average_ease = total_ease / ease_count as f64;
    }

    stats
}
