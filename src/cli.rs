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

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::add::add_card;
use crate::cmd::check::check_collection;
use crate::cmd::drill::drill;
use crate::cmd::export::export_collection;
use crate::cmd::import::import_cards;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_deck_stats;
use crate::error::Fallible;
use crate::types::card::Vocab;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Add a single card.
    Add {
        /// The deck to add the card to.
        deck: String,
        /// The word or phrase being learned.
        front: String,
        /// Its meaning or translation.
        back: String,
        /// An example sentence.
        #[arg(long)]
        example: Option<String>,
        /// A translation of the example sentence.
        #[arg(long)]
        example_translation: Option<String>,
        /// Path to the collection directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Import cards from a JSON file, or from every JSON file in a directory.
    Import {
        /// The deck to add the cards to.
        deck: String,
        /// The file or directory to import.
        source: PathBuf,
        /// Path to the collection directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Drill the cards that are due, then some new ones.
    Drill {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Only drill cards from this deck.
        #[arg(long)]
        deck: Option<String>,
    },
    /// Print collection statistics.
    Stats {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Only count cards from this deck.
        #[arg(long)]
        deck: Option<String>,
        /// Output format.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Export all cards and review history as JSON.
    Export {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Check that every stored card is well-formed.
    Check {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Add {
            deck,
            front,
            back,
            example,
            example_translation,
            directory,
        } => {
            let vocab = Vocab {
                example,
                example_translation,
                ..Vocab::new(front, back)
            };
            add_card(directory, &deck, vocab)?;
            Ok(())
        }
        Command::Import {
            deck,
            source,
            directory,
        } => {
            import_cards(directory, &deck, &source)?;
            Ok(())
        }
        Command::Drill { directory, deck } => drill(directory, deck),
        Command::Stats {
            directory,
            deck,
            format,
        } => print_deck_stats(directory, deck, format),
        Command::Export { directory } => export_collection(directory),
        Command::Check { directory } => check_collection(directory),
    }
}
