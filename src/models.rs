use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ease given to a card the first time a learner meets it.
pub const DEFAULT_EASE: f64 = 2.5;

/// Cards whose interval reaches 21 days count as mature.
pub const MATURE_INTERVAL_MINUTES: u32 = 21 * 1440;

// Learning phase of a review record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    New,
    Learning,
    Review,
    Relearning,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::New => "new",
            CardStatus::Learning => "learning",
            CardStatus::Review => "review",
            CardStatus::Relearning => "relearning",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "new" => Some(CardStatus::New),
            "learning" => Some(CardStatus::Learning),
            "review" => Some(CardStatus::Review),
            "relearning" => Some(CardStatus::Relearning),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardStatus::New => "New",
            CardStatus::Learning => "Learning",
            CardStatus::Review => "Review",
            CardStatus::Relearning => "Relearning",
        }
    }
}

// Quality of recall reported by the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again = 0,
    Hard = 1,
    Good = 2,
    Easy = 3,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn as_i64(&self) -> i64 {
        *self as i64
    }

    pub fn from_i64(v: i64) -> Result<Self> {
        match v {
            0 => Ok(Rating::Again),
            1 => Ok(Rating::Hard),
            2 => Ok(Rating::Good),
            3 => Ok(Rating::Easy),
            _ => Err(Error::InvalidRating(v.to_string())),
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "again" | "a" | "0" => Ok(Rating::Again),
            "hard" | "h" | "1" => Ok(Rating::Hard),
            "good" | "g" | "2" => Ok(Rating::Good),
            "easy" | "e" | "3" => Ok(Rating::Easy),
            _ => Err(Error::InvalidRating(s.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Rating::Again => "I didn't remember",
            Rating::Hard => "It was difficult",
            Rating::Good => "I remembered",
            Rating::Easy => "It was easy",
        }
    }
}

/// Memorisation state of one card for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub ease_factor: f64,
    pub interval_minutes: u32,
    pub due_at: DateTime<Utc>,
    pub status: CardStatus,
    pub learning_step: u32,
    pub review_count: u32,
    pub lapse_count: u32,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl ReviewRecord {
    /// A card the learner has never seen. It is due immediately.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            ease_factor: DEFAULT_EASE,
            interval_minutes: 0,
            due_at: now,
            status: CardStatus::New,
            learning_step: 0,
            review_count: 0,
            lapse_count: 0,
            last_reviewed_at: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at <= now
    }

    pub fn is_mature(&self) -> bool {
        self.interval_minutes >= MATURE_INTERVAL_MINUTES
    }
}

/// Summary counts over one learner's review records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub total_cards: u64,
    pub new_cards: u64,
    pub learning_cards: u64,
    pub review_cards: u64,
    pub due_cards: u64,
    pub average_ease: f64,
    pub total_reviews: u64,
    pub total_lapses: u64,
    pub mature_cards: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub collection: Collection,
    pub card_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub collection_id: i64,
    pub question: String,
    pub answer: String,
    pub card_type: String,
    pub created_at: String,
    pub updated_at: String,
}

// A review record as persisted: keyed by learner and card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredReview {
    pub id: i64,
    pub learner: String,
    pub card_id: i64,
    #[serde(flatten)]
    pub record: ReviewRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardWithReview {
    pub card: Card,
    pub review: StoredReview,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewLogEntry {
    pub id: i64,
    pub card_id: i64,
    pub rating: Rating,
    pub status_before: CardStatus,
    pub status_after: CardStatus,
    pub interval_before: u32,
    pub interval_after: u32,
    pub ease_after: f64,
    pub reviewed_at: String,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
