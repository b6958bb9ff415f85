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

//! Parsing bulk card imports.
//!
//! An import file holds either a single card object or an array of them:
//!
//! ```json
//! [
//!   { "front": "Father", "back": "Padre", "example": "My father works as a doctor" },
//!   { "front": "Mother", "back": "Madre" }
//! ]
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::error::Fallible;
use crate::types::card::Vocab;

pub struct Parsed {
    /// Valid entries, trimmed, in file order.
    pub cards: Vec<Vocab>,
    /// One message per rejected entry.
    pub errors: Vec<String>,
}

/// Parse an import file. Malformed JSON fails the whole file; an entry that
/// is not a usable card is reported and skipped.
pub fn parse_import(content: &str) -> Fallible<Parsed> {
    let value: Value = serde_json::from_str(content)?;
    let entries = match value {
        Value::Array(entries) => entries,
        other => vec![other],
    };
    let mut cards = Vec::new();
    let mut errors = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match Vocab::deserialize(entry) {
            Ok(vocab) => {
                let vocab = vocab.trimmed();
                if vocab.is_blank() {
                    errors.push(format!(
                        "Card at index {index}: front and back must not be blank"
                    ));
                } else {
                    cards.push(vocab);
                }
            }
            Err(e) => {
                errors.push(format!("Card at index {index}: {e}"));
            }
        }
    }
    Ok(Parsed { cards, errors })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_object() -> Fallible<()> {
        let parsed = parse_import(
            r#"{
                "front": "Father",
                "back": "Padre",
                "example": "My father works as a doctor",
                "exampleTranslation": "Mi padre trabaja como médico"
            }"#,
        )?;
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.cards.len(), 1);
        let card = &parsed.cards[0];
        assert_eq!(card.front, "Father");
        assert_eq!(
            card.example_translation.as_deref(),
            Some("Mi padre trabaja como médico")
        );
        Ok(())
    }

    #[test]
    fn test_array_with_bad_entries() -> Fallible<()> {
        let parsed = parse_import(
            r#"[
                { "front": " Mother ", "back": "Madre" },
                { "front": "Brother" },
                { "front": "  ", "back": "Hermana" },
                42,
                { "front": "Son", "back": "Hijo", "audioUrl": "" }
            ]"#,
        )?;
        let fronts: Vec<&str> = parsed.cards.iter().map(|c| c.front.as_str()).collect();
        assert_eq!(fronts, vec!["Mother", "Son"]);
        assert_eq!(parsed.cards[1].audio_url, None);
        assert_eq!(parsed.errors.len(), 3);
        assert!(parsed.errors[0].starts_with("Card at index 1:"));
        assert!(parsed.errors[1].contains("blank"));
        assert!(parsed.errors[2].starts_with("Card at index 3:"));
        Ok(())
    }

    #[test]
    fn test_unknown_fields_are_ignored() -> Fallible<()> {
        let parsed = parse_import(
            r#"{ "front": "Cat", "back": "Gato", "pronunciationText": "/ˈɡa.to/" }"#,
        )?;
        assert_eq!(parsed.cards.len(), 1);
        Ok(())
    }

    #[test]
    fn test_malformed_json() {
        assert!(parse_import("[{ \"front\": ").is_err());
    }

    #[test]
    fn test_empty_array() -> Fallible<()> {
        let parsed = parse_import("[]")?;
        assert!(parsed.cards.is_empty());
        assert!(parsed.errors.is_empty());
        Ok(())
    }
}
