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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::select::DayCount;
use crate::select::upcoming_schedule;
use crate::stats::DeckStats;
use crate::stats::deck_stats;
use crate::stats::mastery_percentage;
use crate::stats::retention_rate;
use crate::types::card::Card;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_deck_stats(
    directory: Option<String>,
    deck: Option<String>,
    format: StatsFormat,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let cards: Vec<Card> = coll
        .cards(deck.as_deref())?
        .into_iter()
        .map(|s| s.card)
        .collect();
    let stats = build_stats(&cards, Timestamp::now(), coll.config.upcoming_days);
    match format {
        StatsFormat::Text => {
            print!("{}", render_text(&stats));
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    deck: DeckStats,
    retention_rate: u32,
    mastery_percentage: u32,
    upcoming: Vec<DayCount>,
}

fn build_stats(cards: &[Card], now: Timestamp, upcoming_days: u32) -> Stats {
    Stats {
        deck: deck_stats(cards, now),
        retention_rate: retention_rate(cards),
        mastery_percentage: mastery_percentage(cards),
        upcoming: upcoming_schedule(cards, now, upcoming_days),
    }
}

fn render_text(stats: &Stats) -> String {
    let d = &stats.deck;
    let mut out = String::new();
    out.push_str(&format!("Cards:      {}\n", d.total));
    out.push_str(&format!("  new:      {}\n", d.new));
    out.push_str(&format!("  learning: {}\n", d.learning));
    out.push_str(&format!("  review:   {} ({} due)\n", d.in_review, d.review));
    out.push_str(&format!("  mastered: {}\n", d.mastered));
    out.push_str(&format!("Due today:  {}\n", d.due_today));
    out.push_str(&format!("Overdue:    {}\n", d.overdue));
    out.push_str(&format!("Retention:  {}%\n", stats.retention_rate));
    out.push_str(&format!("Mastery:    {}%\n", stats.mastery_percentage));
    if !stats.upcoming.is_empty() {
        out.push_str("Upcoming:\n");
        for day in &stats.upcoming {
            out.push_str(&format!("  {}  {}\n", day.date, day.count));
        }
    }
    out
}
