//! Anki-style SM-2 scheduler.
//!
//! A card moves through four phases:
//! - New / Learning: short fixed steps (default 1m, 10m) until it graduates
//! - Review: the interval grows by the card's ease factor on every success
//! - Relearning: a forgotten review card repeats short steps, then returns
//!   to Review
//!
//! The scheduler is pure. It never reads the clock; `now` is always passed in.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result, Violation};
use crate::models::{CardStatus, Rating, ReviewRecord};

/// Interval used by the learning phases when their step list is empty.
const LEARNING_FALLBACK_MINUTES: u32 = 1;
/// Interval used for a lapse when the relearning step list is empty.
const LAPSE_FALLBACK_MINUTES: u32 = 10;

const HARD_MULTIPLIER: f64 = 1.2;
const EASY_BONUS: f64 = 1.3;
const LAPSE_EASE_PENALTY: f64 = 0.2;
const HARD_EASE_PENALTY: f64 = 0.15;
const EASY_EASE_BONUS: f64 = 0.15;

/// Step sequences and thresholds. All durations are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub learning_steps: Vec<u32>,
    pub relearning_steps: Vec<u32>,
    pub graduating_interval: u32,
    pub easy_interval: u32,
    pub minimum_ease: f64,
    pub maximum_interval: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            learning_steps: vec![1, 10],
            relearning_steps: vec![10],
            graduating_interval: 1440,
            easy_interval: 4 * 1440,
            minimum_ease: 1.3,
            maximum_interval: 365 * 1440,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.minimum_ease.is_finite() || self.minimum_ease <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "minimum_ease must be a positive number, got {}",
                self.minimum_ease
            )));
        }
        if self.maximum_interval == 0 {
            return Err(Error::InvalidConfig(
                "maximum_interval must be at least one minute".to_string(),
            ));
        }
        for (name, steps) in [
            ("learning_steps", &self.learning_steps),
            ("relearning_steps", &self.relearning_steps),
        ] {
            if steps.contains(&0) {
                return Err(Error::InvalidConfig(format!(
                    "{} must not contain a zero-minute step",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of each rating for one record, used to label answer buttons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingPreview {
    pub again: ReviewRecord,
    pub hard: ReviewRecord,
    pub good: ReviewRecord,
    pub easy: ReviewRecord,
}

impl RatingPreview {
    pub fn get(&self, rating: Rating) -> &ReviewRecord {
        match rating {
            Rating::Again => &self.again,
            Rating::Hard => &self.hard,
            Rating::Good => &self.good,
            Rating::Easy => &self.easy,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Apply one rating to a record and return its next state.
    ///
    /// Fails with [`Error::InvariantViolation`] if the input record is
    /// already outside the configured ease/interval bounds. Such a record is
    /// reported, not repaired.
    pub fn advance(
        &self,
        record: &ReviewRecord,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<ReviewRecord> {
        self.check_preconditions(record)?;

        let mut next = ReviewRecord {
            review_count: record.review_count.saturating_add(1),
            last_reviewed_at: Some(now),
            ..record.clone()
        };

        match record.status {
            CardStatus::New | CardStatus::Learning => {
                self.advance_learning(&mut next, rating, &self.config.learning_steps)
            }
            CardStatus::Relearning => {
                self.advance_learning(&mut next, rating, &self.config.relearning_steps)
            }
            CardStatus::Review => self.advance_review(&mut next, rating),
        }

        next.due_at = now + Duration::minutes(i64::from(next.interval_minutes));

        trace!(
            rating = rating.label(),
            from = record.status.as_str(),
            to = next.status.as_str(),
            interval = next.interval_minutes,
            ease = next.ease_factor,
            "advanced review record"
        );

        Ok(next)
    }

    pub fn preview(&self, record: &ReviewRecord, now: DateTime<Utc>) -> Result<RatingPreview> {
        Ok(RatingPreview {
            again: self.advance(record, Rating::Again, now)?,
            hard: self.advance(record, Rating::Hard, now)?,
            good: self.advance(record, Rating::Good, now)?,
            easy: self.advance(record, Rating::Easy, now)?,
        })
    }

    fn check_preconditions(&self, record: &ReviewRecord) -> Result<()> {
        // Written as a negated >= so that NaN is rejected too
        if !(record.ease_factor >= self.config.minimum_ease) {
            return Err(Violation::EaseBelowMinimum {
                ease: record.ease_factor,
                minimum: self.config.minimum_ease,
            }
            .into());
        }
        if record.interval_minutes > self.config.maximum_interval {
            return Err(Violation::IntervalOutOfRange {
                interval: i64::from(record.interval_minutes),
                maximum: self.config.maximum_interval,
            }
            .into());
        }
        Ok(())
    }

    // Shared by New/Learning and Relearning; only the step list differs
    fn advance_learning(&self, next: &mut ReviewRecord, rating: Rating, steps: &[u32]) {
        match rating {
            Rating::Again => {
                next.learning_step = 0;
                next.interval_minutes = steps.first().copied().unwrap_or(LEARNING_FALLBACK_MINUTES);
                if next.status == CardStatus::Relearning {
                    next.lapse_count = next.lapse_count.saturating_add(1);
                }
            }
            Rating::Hard => {
                next.interval_minutes = steps
                    .get(next.learning_step as usize)
                    .or(steps.last())
                    .copied()
                    .unwrap_or(LEARNING_FALLBACK_MINUTES);
            }
            Rating::Good => {
                next.learning_step = next.learning_step.saturating_add(1);
                match steps.get(next.learning_step as usize) {
                    Some(&step) => {
                        next.interval_minutes = step;
                        if next.status == CardStatus::New {
                            next.status = CardStatus::Learning;
                        }
                    }
                    None => graduate(next, self.config.graduating_interval),
                }
            }
            Rating::Easy => graduate(next, self.config.easy_interval),
        }
    }

    fn advance_review(&self, next: &mut ReviewRecord, rating: Rating) {
        let min_ease = self.config.minimum_ease;
        let interval = f64::from(next.interval_minutes);

        // `as u32` truncates toward zero, matching floor for these non-negative products
        match rating {
            Rating::Again => {
                next.status = CardStatus::Relearning;
                next.learning_step = 0;
                next.lapse_count = next.lapse_count.saturating_add(1);
                next.interval_minutes = self
                    .config
                    .relearning_steps
                    .first()
                    .copied()
                    .unwrap_or(LAPSE_FALLBACK_MINUTES);
                next.ease_factor = min_ease.max(next.ease_factor - LAPSE_EASE_PENALTY);
            }
            Rating::Hard => {
                next.interval_minutes = (interval * HARD_MULTIPLIER) as u32;
                next.ease_factor = min_ease.max(next.ease_factor - HARD_EASE_PENALTY);
            }
            Rating::Good => {
                next.interval_minutes = (interval * next.ease_factor) as u32;
            }
            Rating::Easy => {
                next.interval_minutes = (interval * next.ease_factor * EASY_BONUS) as u32;
                next.ease_factor += EASY_EASE_BONUS;
            }
        }

        next.interval_minutes = next.interval_minutes.min(self.config.maximum_interval);
    }
}

// Graduation intervals are not clamped to maximum_interval
fn graduate(next: &mut ReviewRecord, interval: u32) {
    next.status = CardStatus::Review;
    next.interval_minutes = interval;
    next.learning_step = 0;
}

/// Human-readable interval: `45m`, `3h`, `4d`, `2mo`, `1.5y`.
pub fn format_interval(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    if minutes < 1440 {
        let hours = (f64::from(minutes) / 60.0).round();
        return format!("{}h", hours);
    }
    let days = (f64::from(minutes) / 1440.0).round();
    if days < 30.0 {
        return format!("{}d", days);
    }
    let months = (days / 30.0).round();
    if months < 12.0 {
        return format!("{}mo", months);
    }
    format!("{:.1}y", days / 365.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn scheduler() -> Scheduler {
        Scheduler::default()
    }

    fn review_card(ease: f64, interval: u32) -> ReviewRecord {
        ReviewRecord {
            ease_factor: ease,
            interval_minutes: interval,
            status: CardStatus::Review,
            ..ReviewRecord::new(now())
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    mod learning_tests {
        use super::*;

        #[test]
        fn new_good_then_good_graduates() {
            let s = scheduler();
            let first = s.advance(&ReviewRecord::new(now()), Rating::Good, now()).unwrap();
            assert_eq!(first.status, CardStatus::Learning);
            assert_eq!(first.interval_minutes, 10);
            assert_eq!(first.learning_step, 1);

            let second = s.advance(&first, Rating::Good, now()).unwrap();
            assert_eq!(second.status, CardStatus::Review);
            assert_eq!(second.interval_minutes, 1440);
            assert_eq!(second.learning_step, 0);
            assert_eq!(second.review_count, 2);
        }

        #[test]
        fn new_again_keeps_status_and_uses_first_step() {
            let r = scheduler()
                .advance(&ReviewRecord::new(now()), Rating::Again, now())
                .unwrap();
            assert_eq!(r.status, CardStatus::New);
            assert_eq!(r.interval_minutes, 1);
            assert_eq!(r.learning_step, 0);
            assert_eq!(r.lapse_count, 0);
        }

        #[test]
        fn new_hard_repeats_current_step() {
            let r = scheduler()
                .advance(&ReviewRecord::new(now()), Rating::Hard, now())
                .unwrap();
            assert_eq!(r.status, CardStatus::New);
            assert_eq!(r.interval_minutes, 1);
            assert_eq!(r.learning_step, 0);
        }

        #[test]
        fn learning_hard_on_second_step() {
            let mut rec = ReviewRecord::new(now());
            rec.status = CardStatus::Learning;
            rec.learning_step = 1;
            let r = scheduler().advance(&rec, Rating::Hard, now()).unwrap();
            assert_eq!(r.interval_minutes, 10);
            assert_eq!(r.learning_step, 1);
            assert_eq!(r.status, CardStatus::Learning);
        }

        #[test]
        fn hard_past_last_step_uses_last_step() {
            let mut rec = ReviewRecord::new(now());
            rec.status = CardStatus::Learning;
            rec.learning_step = 7;
            let r = scheduler().advance(&rec, Rating::Hard, now()).unwrap();
            assert_eq!(r.interval_minutes, 10);
        }

        #[test]
        fn learning_again_resets_step_without_lapse() {
            let mut rec = ReviewRecord::new(now());
            rec.status = CardStatus::Learning;
            rec.learning_step = 1;
            let r = scheduler().advance(&rec, Rating::Again, now()).unwrap();
            assert_eq!(r.status, CardStatus::Learning);
            assert_eq!(r.learning_step, 0);
            assert_eq!(r.interval_minutes, 1);
            assert_eq!(r.lapse_count, 0);
        }

        #[test]
        fn easy_graduates_from_any_step() {
            let r = scheduler()
                .advance(&ReviewRecord::new(now()), Rating::Easy, now())
                .unwrap();
            assert_eq!(r.status, CardStatus::Review);
            assert_eq!(r.interval_minutes, 5760);
            assert_eq!(r.learning_step, 0);
        }

        #[test]
        fn learning_never_changes_ease() {
            let s = scheduler();
            for rating in Rating::ALL {
                let r = s.advance(&ReviewRecord::new(now()), rating, now()).unwrap();
                assert_eq!(r.ease_factor, 2.5);
            }
        }
    }

    mod relearning_tests {
        use super::*;

        fn relearning_card() -> ReviewRecord {
            ReviewRecord {
                status: CardStatus::Relearning,
                ease_factor: 2.3,
                interval_minutes: 10,
                lapse_count: 1,
                ..ReviewRecord::new(now())
            }
        }

        #[test]
        fn again_counts_another_lapse() {
            let r = scheduler().advance(&relearning_card(), Rating::Again, now()).unwrap();
            assert_eq!(r.status, CardStatus::Relearning);
            assert_eq!(r.interval_minutes, 10);
            assert_eq!(r.learning_step, 0);
            assert_eq!(r.lapse_count, 2);
            assert_eq!(r.ease_factor, 2.3);
        }

        #[test]
        fn good_returns_to_review() {
            let r = scheduler().advance(&relearning_card(), Rating::Good, now()).unwrap();
            assert_eq!(r.status, CardStatus::Review);
            assert_eq!(r.interval_minutes, 1440);
            assert_eq!(r.learning_step, 0);
            assert_eq!(r.lapse_count, 1);
        }

        #[test]
        fn hard_repeats_relearning_step() {
            let r = scheduler().advance(&relearning_card(), Rating::Hard, now()).unwrap();
            assert_eq!(r.status, CardStatus::Relearning);
            assert_eq!(r.interval_minutes, 10);
            assert_eq!(r.lapse_count, 1);
        }

        #[test]
        fn easy_returns_to_review_with_easy_interval() {
            let r = scheduler().advance(&relearning_card(), Rating::Easy, now()).unwrap();
            assert_eq!(r.status, CardStatus::Review);
            assert_eq!(r.interval_minutes, 5760);
            assert_eq!(r.lapse_count, 1);
        }

        #[test]
        fn multi_step_relearning_advances_through_steps() {
            let s = Scheduler::new(SchedulerConfig {
                relearning_steps: vec![10, 60],
                ..SchedulerConfig::default()
            });
            let r = s.advance(&relearning_card(), Rating::Good, now()).unwrap();
            assert_eq!(r.status, CardStatus::Relearning);
            assert_eq!(r.learning_step, 1);
            assert_eq!(r.interval_minutes, 60);

            let r = s.advance(&r, Rating::Good, now()).unwrap();
            assert_eq!(r.status, CardStatus::Review);
        }
    }

    mod review_tests {
        use super::*;

        #[test]
        fn again_lapses_into_relearning() {
            let rec = review_card(2.5, 10);
            let r = scheduler().advance(&rec, Rating::Again, now()).unwrap();
            assert_eq!(r.status, CardStatus::Relearning);
            assert_eq!(r.interval_minutes, 10);
            assert_eq!(r.lapse_count, rec.lapse_count + 1);
            assert_eq!(r.learning_step, 0);
            assert_close(r.ease_factor, 2.3);
        }

        #[test]
        fn good_multiplies_by_ease() {
            let r = scheduler().advance(&review_card(2.5, 10), Rating::Good, now()).unwrap();
            assert_eq!(r.interval_minutes, 25);
            assert_eq!(r.status, CardStatus::Review);
            assert_eq!(r.ease_factor, 2.5);
        }

        #[test]
        fn easy_applies_bonus_and_raises_ease() {
            let r = scheduler().advance(&review_card(2.5, 10), Rating::Easy, now()).unwrap();
            assert_eq!(r.interval_minutes, 32);
            assert_close(r.ease_factor, 2.65);
        }

        #[test]
        fn hard_grows_slowly_and_lowers_ease() {
            let r = scheduler().advance(&review_card(2.5, 10), Rating::Hard, now()).unwrap();
            assert_eq!(r.interval_minutes, 12);
            assert_close(r.ease_factor, 2.35);
            assert_eq!(r.status, CardStatus::Review);
        }

        #[test]
        fn interval_clamped_to_maximum() {
            let r = scheduler()
                .advance(&review_card(2.5, 500_000), Rating::Easy, now())
                .unwrap();
            assert_eq!(r.interval_minutes, 525_600);
            assert_eq!(r.due_at, now() + Duration::minutes(525_600));
        }

        #[test]
        fn ease_floor_on_again() {
            let r = scheduler().advance(&review_card(1.4, 100), Rating::Again, now()).unwrap();
            assert_eq!(r.ease_factor, 1.3);
        }

        #[test]
        fn ease_floor_on_hard() {
            let r = scheduler().advance(&review_card(1.3, 100), Rating::Hard, now()).unwrap();
            assert_eq!(r.ease_factor, 1.3);
            assert_eq!(r.interval_minutes, 120);
        }

        #[test]
        fn zero_interval_review_stays_due_now() {
            let r = scheduler().advance(&review_card(2.5, 0), Rating::Good, now()).unwrap();
            assert_eq!(r.interval_minutes, 0);
            assert_eq!(r.due_at, now());
        }

        #[test]
        fn successive_goods_compound() {
            let s = scheduler();
            let mut rec = review_card(2.5, 1440);
            let mut seen = Vec::new();
            for _ in 0..3 {
                rec = s.advance(&rec, Rating::Good, now()).unwrap();
                seen.push(rec.interval_minutes);
            }
            assert_eq!(seen, vec![3600, 9000, 22500]);
        }
    }

    mod invariant_tests {
        use super::*;

        #[test]
        fn every_transition_keeps_bounds_and_counts() {
            let s = scheduler();
            let statuses = [
                CardStatus::New,
                CardStatus::Learning,
                CardStatus::Review,
                CardStatus::Relearning,
            ];
            let later = now() + Duration::hours(5);
            for status in statuses {
                for ease in [1.3, 1.31, 2.5, 4.0] {
                    for interval in [0, 1, 10, 30_240, 525_600] {
                        for step in [0, 1, 5] {
                            let rec = ReviewRecord {
                                status,
                                ease_factor: ease,
                                interval_minutes: interval,
                                learning_step: step,
                                review_count: 3,
                                ..ReviewRecord::new(now())
                            };
                            for rating in Rating::ALL {
                                let r = s.advance(&rec, rating, later).unwrap();
                                assert!(r.ease_factor >= 1.3);
                                assert!(r.interval_minutes <= 525_600);
                                assert_eq!(r.review_count, 4);
                                assert_eq!(r.last_reviewed_at, Some(later));
                                assert_eq!(
                                    r.due_at,
                                    later + Duration::minutes(i64::from(r.interval_minutes))
                                );
                            }
                        }
                    }
                }
            }
        }

        #[test]
        fn rejects_ease_below_minimum() {
            let err = scheduler()
                .advance(&review_card(1.2, 10), Rating::Good, now())
                .unwrap_err();
            assert!(matches!(
                err,
                Error::InvariantViolation(Violation::EaseBelowMinimum { .. })
            ));
        }

        #[test]
        fn rejects_nan_ease() {
            let err = scheduler()
                .advance(&review_card(f64::NAN, 10), Rating::Good, now())
                .unwrap_err();
            assert!(matches!(err, Error::InvariantViolation(_)));
        }

        #[test]
        fn rejects_interval_above_maximum() {
            let err = scheduler()
                .advance(&review_card(2.5, 525_601), Rating::Again, now())
                .unwrap_err();
            assert!(matches!(
                err,
                Error::InvariantViolation(Violation::IntervalOutOfRange { .. })
            ));
        }

        #[test]
        fn input_record_is_untouched() {
            let rec = review_card(2.5, 10);
            let before = rec.clone();
            let _ = scheduler().advance(&rec, Rating::Again, now()).unwrap();
            assert_eq!(rec, before);
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn defaults() {
            let c = SchedulerConfig::default();
            assert_eq!(c.learning_steps, vec![1, 10]);
            assert_eq!(c.relearning_steps, vec![10]);
            assert_eq!(c.graduating_interval, 1440);
            assert_eq!(c.easy_interval, 5760);
            assert_eq!(c.minimum_ease, 1.3);
            assert_eq!(c.maximum_interval, 525_600);
            assert!(c.validate().is_ok());
        }

        #[test]
        fn validate_rejects_bad_minimum_ease() {
            let c = SchedulerConfig {
                minimum_ease: 0.0,
                ..SchedulerConfig::default()
            };
            assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));
        }

        #[test]
        fn validate_rejects_zero_maximum_interval() {
            let c = SchedulerConfig {
                maximum_interval: 0,
                ..SchedulerConfig::default()
            };
            assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));
        }

        #[test]
        fn validate_rejects_zero_minute_steps() {
            let c = SchedulerConfig {
                relearning_steps: vec![0, 10],
                ..SchedulerConfig::default()
            };
            assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));
            assert!(SchedulerConfig::default().validate().is_ok());
        }

        #[test]
        fn empty_learning_steps_fall_back() {
            let s = Scheduler::new(SchedulerConfig {
                learning_steps: vec![],
                relearning_steps: vec![],
                ..SchedulerConfig::default()
            });
            let new = ReviewRecord::new(now());
            assert_eq!(s.advance(&new, Rating::Again, now()).unwrap().interval_minutes, 1);
            assert_eq!(s.advance(&new, Rating::Hard, now()).unwrap().interval_minutes, 1);

            let graduated = s.advance(&new, Rating::Good, now()).unwrap();
            assert_eq!(graduated.status, CardStatus::Review);
            assert_eq!(graduated.interval_minutes, 1440);

            let lapsed = s.advance(&review_card(2.5, 100), Rating::Again, now()).unwrap();
            assert_eq!(lapsed.interval_minutes, 10);
        }

        #[test]
        fn custom_steps_drive_learning() {
            let s = Scheduler::new(SchedulerConfig {
                learning_steps: vec![5, 30, 120],
                graduating_interval: 2880,
                ..SchedulerConfig::default()
            });
            let mut rec = ReviewRecord::new(now());
            let mut intervals = Vec::new();
            for _ in 0..3 {
                rec = s.advance(&rec, Rating::Good, now()).unwrap();
                intervals.push(rec.interval_minutes);
            }
            assert_eq!(intervals, vec![30, 120, 2880]);
            assert_eq!(rec.status, CardStatus::Review);
        }

        #[test]
        fn graduation_is_not_clamped() {
            let s = Scheduler::new(SchedulerConfig {
                easy_interval: 10_000,
                maximum_interval: 5_000,
                ..SchedulerConfig::default()
            });
            let r = s.advance(&ReviewRecord::new(now()), Rating::Easy, now()).unwrap();
            assert_eq!(r.interval_minutes, 10_000);
        }

        #[test]
        fn custom_minimum_ease() {
            let s = Scheduler::new(SchedulerConfig {
                minimum_ease: 2.0,
                ..SchedulerConfig::default()
            });
            let r = s.advance(&review_card(2.1, 100), Rating::Again, now()).unwrap();
            assert_eq!(r.ease_factor, 2.0);
        }

        #[test]
        fn deserializes_partial_toml_section() {
            let c: SchedulerConfig = toml::from_str("learning_steps = [2, 20, 60]").unwrap();
            assert_eq!(c.learning_steps, vec![2, 20, 60]);
            assert_eq!(c.relearning_steps, vec![10]);
            assert_eq!(c.graduating_interval, 1440);
        }
    }

    mod preview_tests {
        use super::*;

        #[test]
        fn preview_matches_advance() {
            let s = scheduler();
            let rec = review_card(2.5, 1440);
            let preview = s.preview(&rec, now()).unwrap();
            for rating in Rating::ALL {
                assert_eq!(preview.get(rating), &s.advance(&rec, rating, now()).unwrap());
            }
            assert_eq!(preview.again.interval_minutes, 10);
            assert_eq!(preview.hard.interval_minutes, 1728);
            assert_eq!(preview.good.interval_minutes, 3600);
            assert_eq!(preview.easy.interval_minutes, 4680);
        }

        #[test]
        fn preview_of_new_card() {
            let preview = scheduler().preview(&ReviewRecord::new(now()), now()).unwrap();
            assert_eq!(preview.again.interval_minutes, 1);
            assert_eq!(preview.hard.interval_minutes, 1);
            assert_eq!(preview.good.interval_minutes, 10);
            assert_eq!(preview.easy.interval_minutes, 5760);
        }

        #[test]
        fn preview_propagates_violation() {
            assert!(scheduler().preview(&review_card(0.5, 10), now()).is_err());
        }
    }

    mod format_interval_tests {
        use super::*;

        #[test]
        fn minutes() {
            assert_eq!(format_interval(0), "0m");
            assert_eq!(format_interval(45), "45m");
        }

        #[test]
        fn hours() {
            assert_eq!(format_interval(60), "1h");
            assert_eq!(format_interval(150), "3h");
        }

        #[test]
        fn days() {
            assert_eq!(format_interval(1440), "1d");
            assert_eq!(format_interval(5760), "4d");
        }

        #[test]
        fn months() {
            assert_eq!(format_interval(30 * 1440), "1mo");
            assert_eq!(format_interval(90 * 1440), "3mo");
        }

        #[test]
        fn years() {
            assert_eq!(format_interval(525_600), "1.0y");
            assert_eq!(format_interval(547 * 1440), "1.5y");
        }
    }
}
