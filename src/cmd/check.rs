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
use crate::db::StoredCard;
use crate::error::Fallible;
use crate::error::fail;

/// Report cards whose id no longer matches their content, and schedules that
/// cannot have come out of a review. Out-of-range ease and interval values
/// are repaired when cards are loaded, so they never show up here.
pub fn check_collection(directory: Option<String>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let problems = find_problems(&coll.cards(None)?);
    if problems.is_empty() {
        println!("ok");
        Ok(())
    } else {
        for problem in &problems {
            eprintln!("{problem}");
        }
        fail(format!("{} problems found.", problems.len()))
    }
}

fn find_problems(cards: &[StoredCard]) -> Vec<String> {
    let mut problems = Vec::new();
    for stored in cards {
        let card = &stored.card;
        let short = card.id().short();
        if card.content().id_in(card.deck_name()) != card.id() {
            problems.push(format!("{short}: id does not match content"));
        }
        for violation in card.schedule.violations() {
            problems.push(format!("{short}: {violation}"));
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::types::card::Card;
    use crate::types::card::Vocab;
    use crate::types::status::Status;
    use crate::types::timestamp::Timestamp;

    #[test]
    fn test_non_existent_directory() {
        assert!(check_collection(Some("./derpherp".to_string())).is_err());
    }

    #[test]
    fn test_empty_collection() -> Fallible<()> {
        let dir = tempdir()?;
        check_collection(Some(dir.path().display().to_string()))
    }

    #[test]
    fn test_find_problems() {
        let good = Card::new("Spanish", Vocab::new("Dog", "Perro"), Timestamp::now());
        let mut bad = Card::new("Spanish", Vocab::new("Cat", "Gato"), Timestamp::now());
        bad.schedule.status = Status::Review;
        let bad = Card::from_parts(
            good.id(),
            bad.deck_name().to_string(),
            bad.content().clone(),
            bad.schedule,
        );
        let cards = vec![
            StoredCard {
                card: good,
                version: 0,
            },
            StoredCard {
                card: bad,
                version: 0,
            },
        ];
        let problems = find_problems(&cards);
        assert_eq!(problems.len(), 2);
        assert!(problems[0].ends_with("id does not match content"));
        assert!(problems[1].ends_with("review card was never reviewed"));
    }
}
