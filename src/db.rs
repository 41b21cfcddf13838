use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result, Violation};
use crate::models::{
    Card, CardStatus, CardWithReview, Collection, CollectionStats, CollectionSummary, Rating,
    ReviewLogEntry, ReviewRecord, StoredReview,
};
use crate::scheduler::Scheduler;
use crate::stats;

const REVIEW_COLUMNS: &str = "r.id, r.learner, r.card_id, r.ease_factor, r.interval_minutes, \
     r.due_at, r.status, r.learning_step, r.review_count, r.lapse_count, r.last_reviewed_at";

const CARD_COLUMNS: &str =
    "c.id, c.collection_id, c.question, c.answer, c.card_type, c.created_at, c.updated_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS collections (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE IF NOT EXISTS cards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                collection_id INTEGER NOT NULL,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                card_type TEXT NOT NULL DEFAULT 'simple',
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                FOREIGN KEY (collection_id) REFERENCES collections(id) ON DELETE CASCADE
            );

            -- One scheduling state per learner and card
            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                learner TEXT NOT NULL,
                card_id INTEGER NOT NULL,
                ease_factor REAL NOT NULL DEFAULT 2.5,
                interval_minutes INTEGER NOT NULL DEFAULT 0,
                due_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'new',
                learning_step INTEGER NOT NULL DEFAULT 0,
                review_count INTEGER NOT NULL DEFAULT 0,
                lapse_count INTEGER NOT NULL DEFAULT 0,
                last_reviewed_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (learner, card_id),
                FOREIGN KEY (card_id) REFERENCES cards(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS review_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                learner TEXT NOT NULL,
                card_id INTEGER NOT NULL,
                rating INTEGER NOT NULL,
                status_before TEXT NOT NULL,
                status_after TEXT NOT NULL,
                interval_before INTEGER NOT NULL,
                interval_after INTEGER NOT NULL,
                ease_after REAL NOT NULL,
                reviewed_at TEXT NOT NULL,
                FOREIGN KEY (card_id) REFERENCES cards(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_cards_collection ON cards(collection_id);
            CREATE INDEX IF NOT EXISTS idx_reviews_learner_due ON reviews(learner, due_at);
            CREATE INDEX IF NOT EXISTS idx_reviews_learner_status ON reviews(learner, status);
            CREATE INDEX IF NOT EXISTS idx_review_log_card ON review_log(learner, card_id);
            "#,
        )?;

        Ok(())
    }

    // Collection operations
    pub fn add_collection(&self, name: &str, description: Option<&str>) -> Result<i64> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("collection name is empty".to_string()));
        }
        self.conn.execute(
            "INSERT INTO collections (name, description) VALUES (?1, ?2)",
            params![name, description],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(collection_id = id, name, "added collection");
        Ok(id)
    }

    pub fn get_collection(&self, id: i64) -> Result<Option<Collection>> {
        let collection = self
            .conn
            .query_row(
                "SELECT id, name, description, created_at, updated_at FROM collections WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Collection {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        created_at: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(collection)
    }

    fn require_collection(&self, id: i64) -> Result<Collection> {
        self.get_collection(id)?
            .ok_or_else(|| Error::NotFound(format!("Collection {}", id)))
    }

    pub fn list_collections(&self) -> Result<Vec<CollectionSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT co.id, co.name, co.description, co.created_at, co.updated_at,
                   COUNT(c.id) as card_count
            FROM collections co
            LEFT JOIN cards c ON c.collection_id = co.id
            GROUP BY co.id
            ORDER BY co.name
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(CollectionSummary {
                collection: Collection {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                },
                card_count: row.get(5)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Rename a collection or change its description. `None` keeps the
    /// current value; a blank description clears it.
    pub fn update_collection(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Collection> {
        if name.is_none() && description.is_none() {
            return Err(Error::InvalidInput("nothing to update".to_string()));
        }
        if name.is_some_and(|n| n.trim().is_empty()) {
            return Err(Error::InvalidInput("collection name is empty".to_string()));
        }
        let current = self.require_collection(id)?;

        let name = name.unwrap_or(&current.name);
        let description = match description {
            Some(d) if d.trim().is_empty() => None,
            Some(d) => Some(d),
            None => current.description.as_deref(),
        };

        self.conn.execute(
            "UPDATE collections SET name = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
            params![name, description, to_timestamp(now), id],
        )?;
        info!(collection_id = id, name, "updated collection");
        self.require_collection(id)
    }

    pub fn delete_collection(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM collections WHERE id = ?1", params![id])?;
        if affected > 0 {
            info!(collection_id = id, "deleted collection");
        }
        Ok(affected > 0)
    }

    // Card operations
    pub fn add_card(&self, collection_id: i64, question: &str, answer: &str) -> Result<i64> {
        if question.trim().is_empty() || answer.trim().is_empty() {
            return Err(Error::InvalidInput(
                "question and answer must not be empty".to_string(),
            ));
        }
        self.require_collection(collection_id)?;

        self.conn.execute(
            "INSERT INTO cards (collection_id, question, answer) VALUES (?1, ?2, ?3)",
            params![collection_id, question, answer],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(card_id = id, collection_id, "added card");
        Ok(id)
    }

    pub fn get_card(&self, id: i64) -> Result<Option<Card>> {
        let sql = format!("SELECT {} FROM cards c WHERE c.id = ?1", CARD_COLUMNS);
        let card = self
            .conn
            .query_row(&sql, params![id], |row| card_from_row(row, 0))
            .optional()?;
        Ok(card)
    }

    fn require_card(&self, id: i64) -> Result<Card> {
        self.get_card(id)?
            .ok_or_else(|| Error::NotFound(format!("Card {}", id)))
    }

    pub fn list_cards(&self, collection_id: i64) -> Result<Vec<Card>> {
        self.require_collection(collection_id)?;
        let sql = format!(
            "SELECT {} FROM cards c WHERE c.collection_id = ?1 ORDER BY c.id",
            CARD_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![collection_id], |row| card_from_row(row, 0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Change either side of a card. `None` keeps the current text.
    /// Scheduling state is left alone.
    pub fn update_card(
        &self,
        id: i64,
        question: Option<&str>,
        answer: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Card> {
        if question.is_none() && answer.is_none() {
            return Err(Error::InvalidInput("nothing to update".to_string()));
        }
        if [question, answer].iter().flatten().any(|s| s.trim().is_empty()) {
            return Err(Error::InvalidInput(
                "question and answer must not be empty".to_string(),
            ));
        }
        let current = self.require_card(id)?;

        self.conn.execute(
            "UPDATE cards SET question = ?1, answer = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                question.unwrap_or(&current.question),
                answer.unwrap_or(&current.answer),
                to_timestamp(now),
                id
            ],
        )?;
        debug!(card_id = id, "updated card");
        self.require_card(id)
    }

    pub fn delete_card(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM cards WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    // Review operations

    /// Create a fresh review record for every card in the collection the
    /// learner has not met yet. Returns how many were created.
    pub fn start_learning(&self, learner: &str, collection_id: i64, now: DateTime<Utc>) -> Result<usize> {
        self.require_collection(collection_id)?;
        let fresh = ReviewRecord::new(now);
        let stamp = to_timestamp(now);

        let created = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO reviews
                (learner, card_id, ease_factor, interval_minutes, due_at, status,
                 learning_step, review_count, lapse_count, created_at, updated_at)
            SELECT ?1, id, ?2, ?3, ?4, ?5, 0, 0, 0, ?4, ?4
            FROM cards
            WHERE collection_id = ?6
            "#,
            params![
                learner,
                fresh.ease_factor,
                fresh.interval_minutes,
                stamp,
                fresh.status.as_str(),
                collection_id
            ],
        )?;

        info!(learner, collection_id, created, "started learning session");
        Ok(created)
    }

    pub fn get_review(&self, learner: &str, card_id: i64) -> Result<Option<StoredReview>> {
        let sql = format!(
            "SELECT {} FROM reviews r WHERE r.learner = ?1 AND r.card_id = ?2",
            REVIEW_COLUMNS
        );
        let raw = self
            .conn
            .query_row(&sql, params![learner, card_id], |row| RawReview::from_row(row, 0))
            .optional()?;
        raw.map(RawReview::decode).transpose()
    }

    pub fn get_or_create_review(
        &self,
        learner: &str,
        card_id: i64,
        now: DateTime<Utc>,
    ) -> Result<StoredReview> {
        self.require_card(card_id)?;
        let fresh = ReviewRecord::new(now);
        let stamp = to_timestamp(now);

        let created = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO reviews
                (learner, card_id, ease_factor, interval_minutes, due_at, status,
                 learning_step, review_count, lapse_count, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, 0, ?5, ?5)
            "#,
            params![
                learner,
                card_id,
                fresh.ease_factor,
                fresh.interval_minutes,
                stamp,
                fresh.status.as_str()
            ],
        )?;
        if created > 0 {
            debug!(learner, card_id, "created review record");
        }

        self.get_review(learner, card_id)?
            .ok_or_else(|| Error::NotFound(format!("Review for card {}", card_id)))
    }

    fn save_review(&self, id: i64, record: &ReviewRecord, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            r#"
            UPDATE reviews
            SET ease_factor = ?1,
                interval_minutes = ?2,
                due_at = ?3,
                status = ?4,
                learning_step = ?5,
                review_count = ?6,
                lapse_count = ?7,
                last_reviewed_at = ?8,
                updated_at = ?9
            WHERE id = ?10
            "#,
            params![
                record.ease_factor,
                record.interval_minutes,
                to_timestamp(record.due_at),
                record.status.as_str(),
                record.learning_step,
                record.review_count,
                record.lapse_count,
                record.last_reviewed_at.map(to_timestamp),
                to_timestamp(now),
                id
            ],
        )?;
        Ok(())
    }

    /// Apply a rating to the learner's record for a card and persist the
    /// result. Read, advance and write happen in one transaction.
    pub fn record_review(
        &self,
        learner: &str,
        card_id: i64,
        rating: Rating,
        scheduler: &Scheduler,
        now: DateTime<Utc>,
    ) -> Result<StoredReview> {
        // Stored timestamps keep milliseconds; the returned record must match the row
        let now = now.trunc_subsecs(3);
        let tx = self.conn.unchecked_transaction()?;

        let current = self.get_or_create_review(learner, card_id, now)?;
        let next = scheduler.advance(&current.record, rating, now)?;
        self.save_review(current.id, &next, now)?;

        self.conn.execute(
            r#"
            INSERT INTO review_log
                (learner, card_id, rating, status_before, status_after,
                 interval_before, interval_after, ease_after, reviewed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                learner,
                card_id,
                rating.as_i64(),
                current.record.status.as_str(),
                next.status.as_str(),
                current.record.interval_minutes,
                next.interval_minutes,
                next.ease_factor,
                to_timestamp(now)
            ],
        )?;

        tx.commit()?;

        info!(
            learner,
            card_id,
            rating = rating.label(),
            status = next.status.as_str(),
            interval = next.interval_minutes,
            "recorded review"
        );

        Ok(StoredReview {
            record: next,
            ..current
        })
    }

    /// Cards due at `now`, oldest due first. A `limit` of 0 means no limit.
    pub fn list_due(
        &self,
        learner: &str,
        collection_id: i64,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CardWithReview>> {
        self.require_collection(collection_id)?;
        let sql = format!(
            r#"
            SELECT {}, {}
            FROM reviews r
            JOIN cards c ON c.id = r.card_id
            WHERE r.learner = ?1 AND c.collection_id = ?2 AND r.due_at <= ?3
            ORDER BY r.due_at ASC, r.id ASC
            LIMIT ?4
            "#,
            CARD_COLUMNS, REVIEW_COLUMNS
        );
        let limit: i64 = if limit == 0 { -1 } else { limit as i64 };

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![learner, collection_id, to_timestamp(now), limit],
            |row| Ok((card_from_row(row, 0)?, RawReview::from_row(row, 7)?)),
        )?;
        collect_with_cards(rows)
    }

    pub fn list_reviews(&self, learner: &str, collection_id: i64) -> Result<Vec<CardWithReview>> {
        self.require_collection(collection_id)?;
        let sql = format!(
            r#"
            SELECT {}, {}
            FROM reviews r
            JOIN cards c ON c.id = r.card_id
            WHERE r.learner = ?1 AND c.collection_id = ?2
            ORDER BY c.id
            "#,
            CARD_COLUMNS, REVIEW_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![learner, collection_id], |row| {
            Ok((card_from_row(row, 0)?, RawReview::from_row(row, 7)?))
        })?;
        collect_with_cards(rows)
    }

    pub fn collection_stats(
        &self,
        learner: &str,
        collection_id: i64,
        now: DateTime<Utc>,
    ) -> Result<CollectionStats> {
        let reviews = self.list_reviews(learner, collection_id)?;
        Ok(stats::summarize(
            reviews.iter().map(|cwr| &cwr.review.record),
            now,
        ))
    }

    /// Forget all of the learner's progress in a collection.
    pub fn clear_progress(&self, learner: &str, collection_id: i64) -> Result<usize> {
        self.require_collection(collection_id)?;
        let tx = self.conn.unchecked_transaction()?;

        self.conn.execute(
            r#"
            DELETE FROM review_log
            WHERE learner = ?1
              AND card_id IN (SELECT id FROM cards WHERE collection_id = ?2)
            "#,
            params![learner, collection_id],
        )?;
        let deleted = self.conn.execute(
            r#"
            DELETE FROM reviews
            WHERE learner = ?1
              AND card_id IN (SELECT id FROM cards WHERE collection_id = ?2)
            "#,
            params![learner, collection_id],
        )?;

        tx.commit()?;
        info!(learner, collection_id, deleted, "cleared progress");
        Ok(deleted)
    }

    pub fn review_history(&self, learner: &str, card_id: i64) -> Result<Vec<ReviewLogEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, card_id, rating, status_before, status_after,
                   interval_before, interval_after, ease_after, reviewed_at
            FROM review_log
            WHERE learner = ?1 AND card_id = ?2
            ORDER BY reviewed_at DESC, id DESC
            "#,
        )?;

        let rows = stmt.query_map(params![learner, card_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, u32>(5)?,
                row.get::<_, u32>(6)?,
                row.get::<_, f64>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, card_id, rating, before, after, interval_before, interval_after, ease_after, reviewed_at) =
                row?;
            entries.push(ReviewLogEntry {
                id,
                card_id,
                rating: Rating::from_i64(rating)?,
                status_before: parse_status(&before)?,
                status_after: parse_status(&after)?,
                interval_before,
                interval_after,
                ease_after,
                reviewed_at,
            });
        }
        Ok(entries)
    }
}

/// Fixed-width RFC 3339 so that text order equals time order in SQL.
fn to_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Violation::BadTimestamp(s.to_string()).into())
}

fn parse_status(s: &str) -> Result<CardStatus> {
    CardStatus::from_str(s).ok_or_else(|| Violation::UnknownStatus(s.to_string()).into())
}

fn card_from_row(row: &Row, offset: usize) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(offset)?,
        collection_id: row.get(offset + 1)?,
        question: row.get(offset + 2)?,
        answer: row.get(offset + 3)?,
        card_type: row.get(offset + 4)?,
        created_at: row.get(offset + 5)?,
        updated_at: row.get(offset + 6)?,
    })
}

fn collect_with_cards<I>(rows: I) -> Result<Vec<CardWithReview>>
where
    I: Iterator<Item = rusqlite::Result<(Card, RawReview)>>,
{
    let mut result = Vec::new();
    for row in rows {
        let (card, raw) = row?;
        result.push(CardWithReview {
            card,
            review: raw.decode()?,
        });
    }
    Ok(result)
}

// Review row exactly as stored, before its invariants are checked
struct RawReview {
    id: i64,
    learner: String,
    card_id: i64,
    ease_factor: f64,
    interval_minutes: i64,
    due_at: String,
    status: String,
    learning_step: i64,
    review_count: i64,
    lapse_count: i64,
    last_reviewed_at: Option<String>,
}

impl RawReview {
    fn from_row(row: &Row, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(offset)?,
            learner: row.get(offset + 1)?,
            card_id: row.get(offset + 2)?,
            ease_factor: row.get(offset + 3)?,
            interval_minutes: row.get(offset + 4)?,
            due_at: row.get(offset + 5)?,
            status: row.get(offset + 6)?,
            learning_step: row.get(offset + 7)?,
            review_count: row.get(offset + 8)?,
            lapse_count: row.get(offset + 9)?,
            last_reviewed_at: row.get(offset + 10)?,
        })
    }

    fn decode(self) -> Result<StoredReview> {
        let interval_minutes =
            u32::try_from(self.interval_minutes).map_err(|_| Violation::IntervalOutOfRange {
                interval: self.interval_minutes,
                maximum: u32::MAX,
            })?;

        let record = ReviewRecord {
            ease_factor: self.ease_factor,
            interval_minutes,
            due_at: parse_timestamp(&self.due_at)?,
            status: parse_status(&self.status)?,
            learning_step: counter("learning_step", self.learning_step)?,
            review_count: counter("review_count", self.review_count)?,
            lapse_count: counter("lapse_count", self.lapse_count)?,
            last_reviewed_at: self
                .last_reviewed_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
        };

        Ok(StoredReview {
            id: self.id,
            learner: self.learner,
            card_id: self.card_id,
            record,
        })
    }
}

fn counter(field: &'static str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| Violation::NegativeCounter { field, value }.into())
}
