// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The review transition: an SM-2 variant with four ratings.

use serde::Deserialize;
use serde::Serialize;

use crate::types::card::Card;
use crate::types::card::DEFAULT_EASE;
use crate::types::card::MIN_EASE;
use crate::types::card::Schedule;
use crate::types::rating::Rating;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

/// How long a lapsed card waits before it is shown again.
pub const RELEARN_DELAY_MINUTES: u32 = 10;

/// Interval, in days, after the second successful review.
const SECOND_INTERVAL: u32 = 6;

/// A card with at least this interval, and two or more successful reviews, is
/// mastered.
pub const MASTERY_INTERVAL: u32 = 21;

const LAPSE_PENALTY: f64 = 0.2;
const HARD_PENALTY: f64 = 0.15;
const EASY_BONUS: f64 = 0.15;

/// What an `easy` rating does to ease.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EasePolicy {
    /// Ease grows without bound.
    #[default]
    Uncapped,
    /// Ease never grows past the default ease. An ease that is already above
    /// the cap is left alone rather than pulled down.
    Capped,
}

/// Compute a card's state after the learner rates it at `now`.
pub fn apply_rating(card: &Card, rating: Rating, now: Timestamp, policy: EasePolicy) -> Card {
    card.with_schedule(next_schedule(&card.schedule, rating, now, policy))
}

pub fn next_schedule(
    schedule: &Schedule,
    rating: Rating,
    now: Timestamp,
    policy: EasePolicy,
) -> Schedule {
    let ease = next_ease(schedule.ease, rating, policy);
    if rating == Rating::Again {
        return Schedule {
            interval: 1,
            ease,
            repetitions: 0,
            due_date: now.plus_minutes(RELEARN_DELAY_MINUTES),
            status: Status::Learning,
            last_reviewed: Some(now),
        };
    }
    let interval = match schedule.repetitions {
        0 => 1,
        1 => SECOND_INTERVAL,
        // Float-to-int casts saturate, so an enormous product cannot wrap.
        _ => ((schedule.interval as f64 * ease).round() as u32).max(1),
    };
    let repetitions = schedule.repetitions.saturating_add(1);
    let status = if repetitions >= 2 && interval >= MASTERY_INTERVAL {
        Status::Mastered
    } else {
        Status::Review
    };
    Schedule {
        interval,
        ease,
        repetitions,
        due_date: now.plus_days(interval),
        status,
        last_reviewed: Some(now),
    }
}

fn next_ease(ease: f64, rating: Rating, policy: EasePolicy) -> f64 {
    match rating {
        Rating::Again => (ease - LAPSE_PENALTY).max(MIN_EASE),
        Rating::Hard => (ease - HARD_PENALTY).max(MIN_EASE),
        Rating::Good => ease,
        Rating::Easy => match policy {
            EasePolicy::Uncapped => ease + EASY_BONUS,
            EasePolicy::Capped => (ease + EASY_BONUS).min(DEFAULT_EASE.max(ease)),
        },
    }
}
