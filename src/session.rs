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

use std::collections::HashMap;
use std::collections::VecDeque;

use crate::db::Database;
use crate::db::ReviewRecord;
use crate::db::StoredCard;
use crate::error::Fallible;
use crate::error::fail;
use crate::scheduler::EasePolicy;
use crate::scheduler::apply_rating;
use crate::select::due_for_review;
use crate::select::new_cards;
use crate::stats::percentage;
use crate::types::card::Card;
use crate::types::card_id::CardId;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// A study session. Ratings are applied in memory and only written to the
/// database when the session is saved, so an aborted session changes nothing.
pub struct Session {
    started_at: Timestamp,
    policy: EasePolicy,
    /// Cards still to be shown, front first.
    queue: VecDeque<CardId>,
    /// The latest state of every card in the session, under the version it
    /// was loaded with.
    cards: HashMap<CardId, StoredCard>,
    reviews: Vec<ReviewRecord>,
}

/// What the learner is shown when a session ends.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SessionSummary {
    /// Ratings given, counting every retry of a lapsed card.
    pub studied: usize,
    /// Ratings of `good` or `easy`.
    pub correct: usize,
    /// `correct / studied` as a whole percentage; zero when nothing was studied.
    pub accuracy: u32,
    /// Session length, rounded to the nearest minute.
    pub minutes: u32,
}

impl Session {
    /// Build the queue: cards due for review first, then up to `new_limit`
    /// unseen cards.
    pub fn new(
        stored: Vec<StoredCard>,
        started_at: Timestamp,
        new_limit: usize,
        policy: EasePolicy,
    ) -> Self {
        let plain: Vec<Card> = stored.iter().map(|s| s.card.clone()).collect();
        let mut queue: VecDeque<CardId> = due_for_review(&plain, started_at)
            .into_iter()
            .map(|card| card.id())
            .collect();
        queue.extend(new_cards(&plain, new_limit).into_iter().map(|card| card.id()));
        let cards: HashMap<CardId, StoredCard> = stored
            .into_iter()
            .filter(|s| queue.contains(&s.card.id()))
            .map(|s| (s.card.id(), s))
            .collect();
        log::debug!("Session started with {} cards.", queue.len());
        Self {
            started_at,
            policy,
            queue,
            cards,
            reviews: Vec::new(),
        }
    }

    /// The card to show next, if any.
    pub fn current(&self) -> Option<&Card> {
        self.queue
            .front()
            .and_then(|id| self.cards.get(id))
            .map(|s| &s.card)
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn reviews(&self) -> &[ReviewRecord] {
        &self.reviews
    }

    /// Rate the current card. A lapsed card goes to the back of the queue to
    /// be retried in this session.
    pub fn rate(&mut self, rating: Rating, now: Timestamp) -> Fallible<&Card> {
        let Some(id) = self.queue.pop_front() else {
            return fail("no card to rate: the session is finished.");
        };
        let Some(stored) = self.cards.get_mut(&id) else {
            return fail(format!("card {id} is not part of this session."));
        };
        let card = apply_rating(&stored.card, rating, now, self.policy);
        log::debug!(
            "{} {} ease={:.2} interval={}d due={}",
            id.short(),
            rating,
            card.schedule.ease,
            card.schedule.interval,
            card.due_date()
        );
        self.reviews.push(ReviewRecord {
            card_id: id,
            reviewed_at: now,
            rating,
            interval: card.schedule.interval,
            ease: card.schedule.ease,
            due_date: card.due_date(),
        });
        stored.card = card;
        if rating.is_lapse() {
            self.queue.push_back(id);
        }
        Ok(&stored.card)
    }

    /// The cards that were rated at least once, in their latest state.
    pub fn changed_cards(&self) -> Vec<StoredCard> {
        let mut seen = Vec::new();
        for review in &self.reviews {
            if !seen.contains(&review.card_id) {
                seen.push(review.card_id);
            }
        }
        seen.into_iter()
            .filter_map(|id| self.cards.get(&id).cloned())
            .collect()
    }

    pub fn summary(&self, ended_at: Timestamp) -> SessionSummary {
        let studied = self.reviews.len();
        let correct = self
            .reviews
            .iter()
            .filter(|r| matches!(r.rating, Rating::Good | Rating::Easy))
            .count();
        let elapsed = ended_at.into_inner() - self.started_at.into_inner();
        let minutes = (elapsed.num_seconds().max(0) as f64 / 60.0).round() as u32;
        SessionSummary {
            studied,
            correct,
            accuracy: percentage(correct, studied),
            minutes,
        }
    }

    /// Persist every rated card and the review log. A session with no
    /// reviews writes nothing.
    pub fn save(&self, db: &mut Database, ended_at: Timestamp) -> Fallible<()> {
        if self.reviews.is_empty() {
            log::debug!("Session had no reviews; nothing to save.");
            return Ok(());
        }
        db.save_session(
            self.started_at,
            ended_at,
            &self.changed_cards(),
            &self.reviews,
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use tempfile::tempdir;

    use super::*;
    use crate::types::card::Schedule;
    use crate::types::card::Vocab;
    use crate::types::status::Status;

    fn t0() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 9, 15, 19, 0, 0).unwrap())
    }

    fn stored(front: &str, status: Status, due_date: Timestamp) -> StoredCard {
        let mut card = Card::new("German", Vocab::new(front, "x"), t0().minus_days(30));
        if status != Status::New {
            card.schedule = Schedule {
                interval: 3,
                repetitions: 2,
                status,
                due_date,
                last_reviewed: Some(due_date.minus_days(3)),
                ..card.schedule
            };
        }
        StoredCard { card, version: 0 }
    }

    fn front(card: Option<&Card>) -> Option<String> {
        card.map(|c| c.content().front.clone())
    }

    fn deck() -> Vec<StoredCard> {
        vec![
            stored("neu-1", Status::New, t0()),
            stored("due", Status::Review, t0().minus_days(1)),
            stored("later", Status::Review, t0().plus_days(2)),
            stored("neu-2", Status::New, t0()),
            stored("neu-3", Status::New, t0()),
        ]
    }

    #[test]
    fn test_queue_order() -> Fallible<()> {
        let mut session = Session::new(deck(), t0(), 2, EasePolicy::Uncapped);
        assert_eq!(session.remaining(), 3);
        assert_eq!(front(session.current()).as_deref(), Some("due"));
        session.rate(Rating::Good, t0())?;
        assert_eq!(front(session.current()).as_deref(), Some("neu-1"));
        session.rate(Rating::Good, t0())?;
        assert_eq!(front(session.current()).as_deref(), Some("neu-2"));
        session.rate(Rating::Good, t0())?;
        assert!(session.is_finished());
        assert!(session.current().is_none());
        Ok(())
    }

    #[test]
    fn test_lapse_is_retried() -> Fallible<()> {
        let mut session = Session::new(deck(), t0(), 1, EasePolicy::Uncapped);
        let card = session.rate(Rating::Again, t0())?;
        assert_eq!(card.status(), Status::Learning);
        assert_eq!(front(session.current()).as_deref(), Some("neu-1"));
        session.rate(Rating::Good, t0())?;
        assert_eq!(front(session.current()).as_deref(), Some("due"));
        let card = session.rate(Rating::Good, t0().plus_minutes(10))?;
        assert_eq!(card.schedule.repetitions, 1);
        assert!(session.is_finished());
        assert_eq!(session.reviews().len(), 3);
        assert_eq!(session.changed_cards().len(), 2);
        Ok(())
    }

    #[test]
    fn test_summary() -> Fallible<()> {
        let mut session = Session::new(deck(), t0(), 2, EasePolicy::Uncapped);
        session.rate(Rating::Again, t0())?;
        session.rate(Rating::Easy, t0().plus_minutes(1))?;
        session.rate(Rating::Hard, t0().plus_minutes(2))?;
        session.rate(Rating::Good, t0().plus_minutes(3))?;
        let summary = session.summary(t0().plus_minutes(7));
        assert_eq!(
            summary,
            SessionSummary {
                studied: 4,
                correct: 2,
                accuracy: 50,
                minutes: 7,
            }
        );
        Ok(())
    }

    #[test]
    fn test_summary_of_empty_session() {
        let session = Session::new(deck(), t0(), 2, EasePolicy::Uncapped);
        let summary = session.summary(t0().plus_minutes(5).minus_days(1));
        assert_eq!(
            summary,
            SessionSummary {
                studied: 0,
                correct: 0,
                accuracy: 0,
                minutes: 0,
            }
        );
    }

    #[test]
    fn test_summary_rounds_minutes() -> Fallible<()> {
        let mut session = Session::new(deck(), t0(), 2, EasePolicy::Uncapped);
        session.rate(Rating::Good, t0())?;
        let ended_at = Timestamp::new(Utc.with_ymd_and_hms(2025, 9, 15, 19, 2, 31).unwrap());
        let summary = session.summary(ended_at);
        assert_eq!(summary.minutes, 3);
        assert_eq!(summary.accuracy, 100);
        Ok(())
    }

    #[test]
    fn test_rate_finished_session() {
        let mut session = Session::new(Vec::new(), t0(), 10, EasePolicy::Uncapped);
        assert!(session.is_finished());
        assert!(session.rate(Rating::Good, t0()).is_err());
    }

    #[test]
    fn test_save() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("test.db");
        let mut db = Database::new(path.to_str().unwrap())?;
        for s in deck() {
            db.insert_card(&s.card, t0().minus_days(30))?;
        }

        let mut session = Session::new(db.all_cards()?, t0(), 1, EasePolicy::Uncapped);
        session.rate(Rating::Again, t0())?;
        session.rate(Rating::Easy, t0())?;
        session.rate(Rating::Hard, t0().plus_minutes(11))?;
        session.save(&mut db, t0().plus_minutes(12))?;

        let cards: Vec<Card> = db.all_cards()?.into_iter().map(|s| s.card).collect();
        let due: Vec<&str> = crate::select::due_for_review(&cards, t0().plus_days(2))
            .iter()
            .map(|c| c.content().front.as_str())
            .collect();
        assert_eq!(due, vec!["neu-1", "due", "later"]);
        assert_eq!(cards[3].status(), Status::New);
        let sessions = db.sessions()?;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].reviews.len(), 3);
        Ok(())
    }

    #[test]
    fn test_empty_session_saves_nothing() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("test.db");
        let mut db = Database::new(path.to_str().unwrap())?;
        let session = Session::new(Vec::new(), t0(), 10, EasePolicy::Uncapped);
        session.save(&mut db, t0())?;
        assert!(db.sessions()?.is_empty());
        Ok(())
    }
}
