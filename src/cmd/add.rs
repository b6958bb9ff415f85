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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::card::Card;
use crate::types::card::Vocab;
use crate::types::card_id::CardId;
use crate::types::timestamp::Timestamp;

pub fn add_card(directory: Option<String>, deck: &str, vocab: Vocab) -> Fallible<CardId> {
    let mut coll = Collection::new(directory)?;
    let vocab = vocab.trimmed();
    if deck.trim().is_empty() {
        return fail("deck name must not be blank.");
    }
    if vocab.is_blank() {
        return fail("front and back must not be blank.");
    }
    let now = Timestamp::now();
    let card = Card::new(deck.trim(), vocab, now);
    coll.db.insert_card(&card, now)?;
    log::info!("Added card {} to {}", card.id().short(), card.deck_name());
    println!("Added {}.", card.id().short());
    Ok(card.id())
}
