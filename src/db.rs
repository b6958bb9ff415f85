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

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::card::Card;
use crate::types::card::Schedule;
use crate::types::card::Vocab;
use crate::types::card_id::CardId;
use crate::types::rating::Rating;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

pub struct Database {
    conn: Connection,
}

/// A card as it was read from the database. The version is bumped on every
/// write; a write carrying a stale version is refused.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredCard {
    pub card: Card,
    pub version: i64,
}

impl StoredCard {
    /// The same stored card with a new state, to be written back under the
    /// version it was read with.
    pub fn updated(&self, card: Card) -> Self {
        Self {
            card,
            version: self.version,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewRecord {
    pub card_id: CardId,
    pub reviewed_at: Timestamp,
    pub rating: Rating,
    pub interval: u32,
    pub ease: f64,
    pub due_date: Timestamp,
}

pub struct SessionRecord {
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    pub reviews: Vec<ReviewRecord>,
}

const CARD_COLUMNS: &str = "card_id, deck_name, front, back, example, example_translation, image_url, audio_url, interval, ease, repetitions, due_date, status, last_reviewed, version";

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating schema in {database_path}");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self { conn })
    }

    /// Insert a new card in the database.
    ///
    /// If a card with the same id exists, returns an error.
    pub fn insert_card(&mut self, card: &Card, added_at: Timestamp) -> Fallible<()> {
        let tx = self.conn.transaction()?;
        if card_exists(&tx, card.id())? {
            return fail(format!("card {} already exists.", card.id()));
        }
        insert_card(&tx, card, added_at)?;
        tx.commit()?;
        Ok(())
    }

    pub fn contains(&self, card_id: CardId) -> Fallible<bool> {
        let sql = "select count(*) from cards where card_id = ?;";
        let count: i64 = self.conn.query_row(sql, [card_id], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Load a card.
    ///
    /// If no card with the given id exists, returns an error.
    pub fn load(&self, card_id: CardId) -> Fallible<StoredCard> {
        let sql = format!("select {CARD_COLUMNS} from cards where card_id = ?;");
        let card = self
            .conn
            .query_row(&sql, [card_id], read_card)
            .optional()?;
        match card {
            Some(card) => Ok(card),
            None => fail(format!("no card with id {card_id}.")),
        }
    }

    /// All cards, in the order they were added.
    pub fn all_cards(&self) -> Fallible<Vec<StoredCard>> {
        let sql = format!("select {CARD_COLUMNS} from cards order by added_at, rowid;");
        let mut stmt = self.conn.prepare(&sql)?;
        let cards = stmt
            .query_map([], read_card)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    /// The cards of one deck, in the order they were added.
    pub fn deck_cards(&self, deck_name: &str) -> Fallible<Vec<StoredCard>> {
        let sql = format!(
            "select {CARD_COLUMNS} from cards where deck_name = ? order by added_at, rowid;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let cards = stmt
            .query_map([deck_name], read_card)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    /// Write a card's scheduling state back.
    ///
    /// Fails if the card was written by someone else since it was loaded.
    /// Returns the card under its new version.
    pub fn save(&mut self, card: &StoredCard) -> Fallible<StoredCard> {
        let tx = self.conn.transaction()?;
        let saved = update_card(&tx, card)?;
        tx.commit()?;
        Ok(saved)
    }

    /// Save a study session: the updated cards, the session, and its reviews,
    /// all or nothing.
    pub fn save_session(
        &mut self,
        started_at: Timestamp,
        ended_at: Timestamp,
        cards: &[StoredCard],
        reviews: &[ReviewRecord],
    ) -> Fallible<()> {
        let tx = self.conn.transaction()?;
        for card in cards {
            update_card(&tx, card)?;
        }
        let session_id = insert_session(&tx, started_at, ended_at)?;
        for review in reviews {
            insert_review(&tx, session_id, review)?;
        }
        tx.commit()?;
        log::debug!(
            "Saved session with {} reviews of {} cards.",
            reviews.len(),
            cards.len()
        );
        Ok(())
    }

    /// Every review of a card, oldest first.
    pub fn review_log(&self, card_id: CardId) -> Fallible<Vec<ReviewRecord>> {
        let sql = "select card_id, reviewed_at, rating, interval, ease, due_date from reviews where card_id = ? order by reviewed_at, review_id;";
        let mut stmt = self.conn.prepare(sql)?;
        let reviews = stmt
            .query_map([card_id], read_review)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reviews)
    }

    /// Every session with its reviews, oldest first.
    pub fn sessions(&self) -> Fallible<Vec<SessionRecord>> {
        let mut sessions = Vec::new();
        let mut stmt = self
            .conn
            .prepare("select session_id, started_at, ended_at from sessions order by started_at, session_id;")?;
        let rows = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let started_at: Timestamp = row.get(1)?;
                let ended_at: Timestamp = row.get(2)?;
                Ok((id, started_at, ended_at))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut stmt = self.conn.prepare("select card_id, reviewed_at, rating, interval, ease, due_date from reviews where session_id = ? order by review_id;")?;
        for (session_id, started_at, ended_at) in rows {
            let reviews = stmt
                .query_map([session_id], read_review)?
                .collect::<Result<Vec<_>, _>>()?;
            sessions.push(SessionRecord {
                started_at,
                ended_at,
                reviews,
            });
        }
        Ok(sessions)
    }
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}

fn card_exists(tx: &Transaction, card_id: CardId) -> Fallible<bool> {
    let sql = "select count(*) from cards where card_id = ?;";
    let count: i64 = tx.query_row(sql, [card_id], |row| row.get(0))?;
    Ok(count > 0)
}

fn insert_card(tx: &Transaction, card: &Card, added_at: Timestamp) -> Fallible<()> {
    let sql = "insert into cards (card_id, deck_name, front, back, example, example_translation, image_url, audio_url, added_at, interval, ease, repetitions, due_date, status, last_reviewed) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?);";
    let content = card.content();
    let schedule = &card.schedule;
    tx.execute(
        sql,
        rusqlite::params![
            card.id(),
            card.deck_name(),
            &content.front,
            &content.back,
            &content.example,
            &content.example_translation,
            &content.image_url,
            &content.audio_url,
            added_at,
            schedule.interval,
            schedule.ease,
            schedule.repetitions,
            schedule.due_date,
            schedule.status,
            schedule.last_reviewed,
        ],
    )?;
    Ok(())
}

fn update_card(tx: &Transaction, stored: &StoredCard) -> Fallible<StoredCard> {
    let sql = "update cards set interval = ?, ease = ?, repetitions = ?, due_date = ?, status = ?, last_reviewed = ?, version = version + 1 where card_id = ? and version = ?;";
    let card = &stored.card;
    let schedule = &card.schedule;
    let changed = tx.execute(
        sql,
        rusqlite::params![
            schedule.interval,
            schedule.ease,
            schedule.repetitions,
            schedule.due_date,
            schedule.status,
            schedule.last_reviewed,
            card.id(),
            stored.version,
        ],
    )?;
    if changed == 0 {
        if card_exists(tx, card.id())? {
            return fail(format!(
                "card {} was modified by another session; reload and try again.",
                card.id()
            ));
        } else {
            return fail(format!("no card with id {}.", card.id()));
        }
    }
    Ok(StoredCard {
        card: card.clone(),
        version: stored.version + 1,
    })
}

type SessionId = i64;

fn insert_session(
    tx: &Transaction,
    started_at: Timestamp,
    ended_at: Timestamp,
) -> Fallible<SessionId> {
    let sql = "insert into sessions (started_at, ended_at) values (?, ?) returning session_id;";
    let session_id: SessionId = tx.query_row(sql, (started_at, ended_at), |row| row.get(0))?;
    Ok(session_id)
}

fn insert_review(tx: &Transaction, session_id: SessionId, review: &ReviewRecord) -> Fallible<()> {
    let sql = "insert into reviews (session_id, card_id, reviewed_at, rating, interval, ease, due_date) values (?, ?, ?, ?, ?, ?, ?);";
    tx.execute(
        sql,
        rusqlite::params![
            session_id,
            review.card_id,
            review.reviewed_at,
            review.rating,
            review.interval,
            review.ease,
            review.due_date,
        ],
    )?;
    Ok(())
}

fn read_card(row: &Row) -> rusqlite::Result<StoredCard> {
    let id: CardId = row.get(0)?;
    let deck_name: String = row.get(1)?;
    let content = Vocab {
        front: row.get(2)?,
        back: row.get(3)?,
        example: row.get(4)?,
        example_translation: row.get(5)?,
        image_url: row.get(6)?,
        audio_url: row.get(7)?,
    };
    let interval: i64 = row.get(8)?;
    let repetitions: i64 = row.get(10)?;
    let status: Status = row.get(12)?;
    let schedule = Schedule {
        interval: clamp_count(interval),
        ease: row.get(9)?,
        repetitions: clamp_count(repetitions),
        due_date: row.get(11)?,
        status,
        last_reviewed: row.get(13)?,
    };
    let schedule = match schedule.normalize() {
        Some(fixed) => {
            log::warn!("Card {} had a malformed schedule; repaired on load.", id.short());
            fixed
        }
        None => schedule,
    };
    let version: i64 = row.get(14)?;
    Ok(StoredCard {
        card: Card::from_parts(id, deck_name, content, schedule),
        version,
    })
}

fn read_review(row: &Row) -> rusqlite::Result<ReviewRecord> {
    let interval: i64 = row.get(3)?;
    Ok(ReviewRecord {
        card_id: row.get(0)?,
        reviewed_at: row.get(1)?,
        rating: row.get(2)?,
        interval: clamp_count(interval),
        ease: row.get(4)?,
        due_date: row.get(5)?,
    })
}

/// Negative counts can only come from outside edits; read them as zero.
fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
