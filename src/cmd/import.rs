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

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::import::parse_import;
use crate::types::card::Card;
use crate::types::timestamp::Timestamp;

#[derive(Debug, Default, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

pub fn import_cards(directory: Option<String>, deck: &str, source: &Path) -> Fallible<ImportSummary> {
    let mut coll = Collection::new(directory)?;
    if deck.trim().is_empty() {
        return fail("deck name must not be blank.");
    }
    let deck = deck.trim();
    let files = find_import_files(source)?;
    let now = Timestamp::now();
    let mut summary = ImportSummary::default();
    for file in files {
        log::debug!("Importing {}", file.display());
        let parsed = parse_import(&read_to_string(&file)?)?;
        for error in &parsed.errors {
            eprintln!("{}: {error}", file.display());
        }
        summary.rejected += parsed.errors.len();
        for vocab in parsed.cards {
            let card = Card::new(deck, vocab, now);
            if coll.db.contains(card.id())? {
                summary.duplicates += 1;
            } else {
                coll.db.insert_card(&card, now)?;
                summary.imported += 1;
            }
        }
    }
    log::info!("Imported {} cards into {deck}", summary.imported);
    println!(
        "Imported {} cards ({} duplicates skipped, {} rejected).",
        summary.imported, summary.duplicates, summary.rejected
    );
    Ok(summary)
}

/// The file itself, or every `.json` file under a directory, sorted by path.
fn find_import_files(source: &Path) -> Fallible<Vec<PathBuf>> {
    if !source.exists() {
        return fail(format!("{} does not exist.", source.display()));
    }
    if source.is_file() {
        return Ok(vec![source.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_import_file() -> Fallible<()> {
        let dir = tempdir()?;
        let path = Some(dir.path().display().to_string());
        let file = dir.path().join("family.json");
        write(
            &file,
            r#"[
                { "front": "Father", "back": "Padre" },
                { "front": "Mother", "back": "Madre" },
                { "front": "Father", "back": "Padre" },
                { "front": "", "back": "Nada" }
            ]"#,
        )?;
        let summary = import_cards(path.clone(), "Spanish", &file)?;
        assert_eq!(
            summary,
            ImportSummary {
                imported: 2,
                duplicates: 1,
                rejected: 1,
            }
        );

        // Importing again adds nothing.
        let summary = import_cards(path.clone(), "Spanish", &file)?;
        assert_eq!(summary.imported, 0);
        assert_eq!(summary.duplicates, 3);

        // The same words in another deck are new cards.
        let summary = import_cards(path.clone(), "Italian", &file)?;
        assert_eq!(summary.imported, 2);

        let coll = Collection::new(path)?;
        assert_eq!(coll.cards(None)?.len(), 4);
        assert_eq!(coll.cards(Some("Spanish"))?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_import_directory() -> Fallible<()> {
        let dir = tempdir()?;
        let path = Some(dir.path().display().to_string());
        let source = dir.path().join("incoming");
        create_dir_all(source.join("nested"))?;
        write(source.join("a.json"), r#"{ "front": "Dog", "back": "Perro" }"#)?;
        write(
            source.join("nested").join("b.json"),
            r#"[{ "front": "Cat", "back": "Gato" }]"#,
        )?;
        write(source.join("notes.txt"), "not an import")?;
        let summary = import_cards(path, "Animals", &source)?;
        assert_eq!(summary.imported, 2);
        Ok(())
    }

    #[test]
    fn test_import_missing_source() -> Fallible<()> {
        let dir = tempdir()?;
        let path = Some(dir.path().display().to_string());
        let result = import_cards(path, "Spanish", &dir.path().join("nope.json"));
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_import_malformed_file() -> Fallible<()> {
        let dir = tempdir()?;
        let path = Some(dir.path().display().to_string());
        let file = dir.path().join("broken.json");
        write(&file, "{ not json")?;
        assert!(import_cards(path, "Spanish", &file).is_err());
        Ok(())
    }
}
