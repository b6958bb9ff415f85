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
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub total: usize,
    pub new: usize,
    pub learning: usize,
    /// Review cards whose due date has passed.
    pub review: usize,
    /// Every card in review status, due or not.
    pub in_review: usize,
    pub mastered: usize,
    /// Learning and review cards whose due date has passed: the cards a
    /// drill started now would show before any new ones.
    pub due_today: usize,
    /// Learning and review cards at least a whole day past their due date.
    pub overdue: usize,
}

pub fn deck_stats(cards: &[Card], now: Timestamp) -> DeckStats {
    let mut stats = DeckStats {
        total: cards.len(),
        ..DeckStats::default()
    };
    let overdue_cutoff = now.minus_days(1);
    for card in cards {
        match card.status() {
            Status::New => stats.new += 1,
            Status::Learning => {
                stats.learning += 1;
                if card.due_date() <= now {
                    stats.due_today += 1;
                }
            }
            Status::Review => {
                stats.in_review += 1;
                if card.due_date() <= now {
                    stats.review += 1;
                    stats.due_today += 1;
                }
            }
            Status::Mastered => stats.mastered += 1,
        }
        if card.status().is_scheduled() && card.due_date() <= overdue_cutoff {
            stats.overdue += 1;
        }
    }
    stats
}

/// The percentage of reviewed cards currently in review or mastered.
pub fn retention_rate(cards: &[Card]) -> u32 {
    let reviewed = cards
        .iter()
        .filter(|card| card.schedule.last_reviewed.is_some())
        .count();
    let retained = cards
        .iter()
        .filter(|card| matches!(card.status(), Status::Review | Status::Mastered))
        .count();
    percentage(retained, reviewed)
}

/// The percentage of all cards that are mastered.
pub fn mastery_percentage(cards: &[Card]) -> u32 {
    let mastered = cards
        .iter()
        .filter(|card| card.status() == Status::Mastered)
        .count();
    percentage(mastered, cards.len())
}

/// `part / whole` as a whole percentage, or zero when `whole` is zero.
pub(crate) fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}
