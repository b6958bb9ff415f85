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

use crate::collection::Collection;
use crate::db::ReviewRecord;
use crate::error::Fallible;
use crate::types::card::Schedule;
use crate::types::card::Vocab;
use crate::types::card_id::CardId;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

pub fn export_collection(directory: Option<String>) -> Fallible<()> {
    let coll: Collection = Collection::new(directory)?;
    let export: Export = get_export(&coll)?;
    let json: String = serde_json::to_string_pretty(&export)?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Export {
    cards: Vec<CardExport>,
    sessions: Vec<SessionExport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CardExport {
    id: CardId,
    deck_name: String,
    content: Vocab,
    schedule: Schedule,
    version: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionExport {
    started_at: Timestamp,
    ended_at: Timestamp,
    reviews: Vec<ReviewExport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewExport {
    card_id: CardId,
    reviewed_at: Timestamp,
    rating: Rating,
    interval: u32,
    ease: f64,
    due_date: Timestamp,
}

impl From<ReviewRecord> for ReviewExport {
    fn from(r: ReviewRecord) -> Self {
        Self {
            card_id: r.card_id,
            reviewed_at: r.reviewed_at,
            rating: r.rating,
            interval: r.interval,
            ease: r.ease,
            due_date: r.due_date,
        }
    }
}

fn get_export(coll: &Collection) -> Fallible<Export> {
    let cards = coll
        .db
        .all_cards()?
        .into_iter()
        .map(|stored| CardExport {
            id: stored.card.id(),
            deck_name: stored.card.deck_name().to_owned(),
            content: stored.card.content().clone(),
            schedule: stored.card.schedule,
            version: stored.version,
        })
        .collect();
    let sessions = coll
        .db
        .sessions()?
        .into_iter()
        .map(|s| SessionExport {
            started_at: s.started_at,
            ended_at: s.ended_at,
            reviews: s.reviews.into_iter().map(ReviewExport::from).collect(),
        })
        .collect();
    Ok(Export { cards, sessions })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use tempfile::tempdir;

    use super::*;
    use crate::scheduler::EasePolicy;
    use crate::session::Session;
    use crate::types::card::Card;

    #[test]
    fn test_export() -> Fallible<()> {
        let t0 = Timestamp::new(Utc.with_ymd_and_hms(2025, 7, 4, 9, 0, 0).unwrap());
        let dir = tempdir()?;
        let mut coll = Collection::new(Some(dir.path().display().to_string()))?;
        let card = Card::new("Spanish", Vocab::new("Father", "Padre"), t0);
        coll.db.insert_card(&card, t0)?;
        let mut session = Session::new(coll.db.all_cards()?, t0, 10, EasePolicy::Uncapped);
        session.rate(Rating::Good, t0)?;
        session.save(&mut coll.db, t0.plus_minutes(1))?;

        let json = serde_json::to_value(get_export(&coll)?)?;
        let exported = &json["cards"][0];
        assert_eq!(exported["id"], card.id().to_hex());
        assert_eq!(exported["deckName"], "Spanish");
        assert_eq!(exported["content"]["front"], "Father");
        assert!(exported["content"].get("example").is_none());
        assert_eq!(exported["schedule"]["status"], "review");
        assert_eq!(exported["schedule"]["repetitions"], 1);
        assert_eq!(exported["schedule"]["lastReviewed"], t0.to_rfc3339());
        assert_eq!(exported["version"], 1);
        let review = &json["sessions"][0]["reviews"][0];
        assert_eq!(review["rating"], "good");
        assert_eq!(review["interval"], 1);
        Ok(())
    }
}
