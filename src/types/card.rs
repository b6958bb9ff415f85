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

use serde::Deserialize;
use serde::Serialize;

use crate::types::card_id::CardId;
use crate::types::card_id::Hasher;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

/// The lowest ease a card can have.
pub const MIN_EASE: f64 = 1.3;

/// The ease a card starts with.
pub const DEFAULT_EASE: f64 = 2.5;

#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    /// Derived from the deck name and content, never changes.
    id: CardId,
    /// The name of the deck this card belongs to.
    deck_name: String,
    /// What the learner sees.
    content: Vocab,
    /// Scheduling state.
    pub schedule: Schedule,
}

/// A vocabulary item. Opaque to the scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vocab {
    pub front: String,
    pub back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// The part of a card the scheduler reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Days until the next review. Meaningless while the card is new.
    pub interval: u32,
    /// Multiplier on interval growth, never below [`MIN_EASE`].
    pub ease: f64,
    /// Consecutive successful reviews since the last lapse.
    pub repetitions: u32,
    /// The card is not shown before this instant.
    pub due_date: Timestamp,
    pub status: Status,
    pub last_reviewed: Option<Timestamp>,
}

impl Card {
    /// Create a new, never-reviewed card.
    pub fn new(deck_name: impl Into<String>, content: Vocab, created_at: Timestamp) -> Self {
        let deck_name = deck_name.into();
        let id = content.id_in(&deck_name);
        Self {
            id,
            deck_name,
            content,
            schedule: Schedule::new(created_at),
        }
    }

    /// Reassemble a card from storage. The schedule is taken as given; see
    /// [`Schedule::normalize`] for repairing corrupt values.
    pub fn from_parts(id: CardId, deck_name: String, content: Vocab, schedule: Schedule) -> Self {
        Self {
            id,
            deck_name,
            content,
            schedule,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn deck_name(&self) -> &str {
        &self.deck_name
    }

    pub fn content(&self) -> &Vocab {
        &self.content
    }

    pub fn status(&self) -> Status {
        self.schedule.status
    }

    pub fn due_date(&self) -> Timestamp {
        self.schedule.due_date
    }

    pub fn with_schedule(&self, schedule: Schedule) -> Self {
        Self {
            schedule,
            ..self.clone()
        }
    }
}

impl Vocab {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into().trim().to_string(),
            back: back.into().trim().to_string(),
            example: None,
            example_translation: None,
            image_url: None,
            audio_url: None,
        }
    }

    /// Trim every field and drop optional fields that are blank.
    pub fn trimmed(self) -> Self {
        fn opt(value: Option<String>) -> Option<String> {
            value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        }
        Self {
            front: self.front.trim().to_string(),
            back: self.back.trim().to_string(),
            example: opt(self.example),
            example_translation: opt(self.example_translation),
            image_url: opt(self.image_url),
            audio_url: opt(self.audio_url),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.front.trim().is_empty() || self.back.trim().is_empty()
    }

    /// The identifier a card with this content gets in the given deck. Only
    /// the deck, front and back take part: editing an example sentence does
    /// not make a new card.
    pub fn id_in(&self, deck_name: &str) -> CardId {
        let mut hasher = Hasher::new();
        hasher.field(deck_name);
        hasher.field(&self.front);
        hasher.field(&self.back);
        hasher.finalize()
    }
}

impl Schedule {
    /// The schedule of a card created at the given instant: due immediately.
    pub fn new(created_at: Timestamp) -> Self {
        Self {
            interval: 1,
            ease: DEFAULT_EASE,
            repetitions: 0,
            due_date: created_at,
            status: Status::New,
            last_reviewed: None,
        }
    }

    /// Repair values that cannot come out of a transition. Returns `None` if
    /// the schedule was already well-formed.
    pub fn normalize(&self) -> Option<Self> {
        let mut fixed = *self;
        if fixed.ease.is_nan() {
            fixed.ease = DEFAULT_EASE;
        } else if fixed.ease < MIN_EASE {
            fixed.ease = MIN_EASE;
        }
        if fixed.status != Status::New && fixed.interval < 1 {
            fixed.interval = 1;
        }
        if fixed == *self { None } else { Some(fixed) }
    }

    /// Check the invariants that [`Schedule::normalize`] cannot repair.
    pub fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.status != Status::New && self.last_reviewed.is_none() {
            out.push(format!("{} card was never reviewed", self.status));
        }
        out
    }
}
