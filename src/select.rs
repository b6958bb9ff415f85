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

use serde::Serialize;

use crate::types::card::Card;
use crate::types::date::Date;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

/// Cards in learning or review whose due date has passed. New and mastered
/// cards are never due, whatever their stored due date says.
pub fn due_for_review(cards: &[Card], now: Timestamp) -> Vec<&Card> {
    cards
        .iter()
        .filter(|card| card.status().is_scheduled() && card.due_date() <= now)
        .collect()
}

/// Up to `limit` unseen cards, in the order given.
pub fn new_cards(cards: &[Card], limit: usize) -> Vec<&Card> {
    cards
        .iter()
        .filter(|card| card.status() == Status::New)
        .take(limit)
        .collect()
}

/// Whether a scheduled card's due date is strictly in the past.
pub fn is_overdue(card: &Card, now: Timestamp) -> bool {
    card.status().is_scheduled() && now > card.due_date()
}

/// Every card, of any status, whose due date falls on the given day.
pub fn cards_due_on(cards: &[Card], date: Date) -> Vec<&Card> {
    cards
        .iter()
        .filter(|card| card.due_date().date() == date)
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct DayCount {
    pub date: Date,
    pub count: usize,
}

/// How many cards fall due on each of the `days` days starting with today.
pub fn upcoming_schedule(cards: &[Card], now: Timestamp, days: u32) -> Vec<DayCount> {
    let today = now.date();
    (0..days)
        .map(|offset| {
            let date = today.plus_days(u64::from(offset));
            DayCount {
                date,
                count: cards_due_on(cards, date).len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::types::card::Schedule;
    use crate::types::card::Vocab;

    fn t0() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap())
    }

    fn card(front: &str, status: Status, due_date: Timestamp) -> Card {
        let mut card = Card::new("Spanish", Vocab::new(front, "x"), t0());
        card.schedule = Schedule {
            status,
            due_date,
            last_reviewed: (status != Status::New).then_some(t0()),
            ..card.schedule
        };
        card
    }

    fn fronts(cards: &[&Card]) -> Vec<String> {
        cards.iter().map(|c| c.content().front.clone()).collect()
    }

    fn deck() -> Vec<Card> {
        vec![
            card("new-a", Status::New, t0().minus_days(3)),
            card("learning-past", Status::Learning, t0().minus_days(1)),
            card("learning-future", Status::Learning, t0().plus_minutes(10)),
            card("review-now", Status::Review, t0()),
            card("review-future", Status::Review, t0().plus_days(2)),
            card("mastered-past", Status::Mastered, t0().minus_days(10)),
            card("new-b", Status::New, t0()),
            card("new-c", Status::New, t0()),
        ]
    }

    #[test]
    fn test_due_for_review() {
        let cards = deck();
        let due = due_for_review(&cards, t0());
        assert_eq!(fronts(&due), vec!["learning-past", "review-now"]);
    }

    #[test]
    fn test_due_for_review_is_idempotent() {
        let cards = deck();
        let first = fronts(&due_for_review(&cards, t0()));
        let second = fronts(&due_for_review(&cards, t0()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_new_cards_keeps_order() {
        let cards = deck();
        assert_eq!(fronts(&new_cards(&cards, 2)), vec!["new-a", "new-b"]);
        assert_eq!(fronts(&new_cards(&cards, 10)).len(), 3);
        assert!(new_cards(&cards, 0).is_empty());
    }

    #[test]
    fn test_is_overdue() {
        let cards = deck();
        let overdue: Vec<&str> = cards
            .iter()
            .filter(|c| is_overdue(c, t0()))
            .map(|c| c.content().front.as_str())
            .collect();
        // Due exactly now is due, but not overdue.
        assert_eq!(overdue, vec!["learning-past"]);
    }

    #[test]
    fn test_upcoming_schedule() {
        let cards = deck();
        let schedule = upcoming_schedule(&cards, t0(), 4);
        let counts: Vec<(String, usize)> = schedule
            .iter()
            .map(|d| (d.date.to_string(), d.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                // learning-future, review-now, new-b, new-c
                ("2025-05-20".to_string(), 4),
                ("2025-05-21".to_string(), 0),
                ("2025-05-22".to_string(), 1),
                ("2025-05-23".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_upcoming_schedule_zero_days() {
        assert!(upcoming_schedule(&deck(), t0(), 0).is_empty());
    }

    #[test]
    fn test_cards_due_on_truncates_time() {
        let late = Timestamp::new(Utc.with_ymd_and_hms(2025, 5, 20, 23, 59, 0).unwrap());
        let cards = vec![card("late", Status::Review, late)];
        assert_eq!(cards_due_on(&cards, t0().date()).len(), 1);
        assert!(cards_due_on(&cards, t0().plus_days(1).date()).is_empty());
    }
}
