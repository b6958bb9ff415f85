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

use std::io::BufRead;
use std::io::Write;
use std::io::stdin;
use std::io::stdout;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::session::Session;
use crate::session::SessionSummary;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

pub fn drill(directory: Option<String>, deck: Option<String>) -> Fallible<()> {
    let mut coll = Collection::new(directory)?;
    let cards = coll.cards(deck.as_deref())?;
    let mut session = Session::new(
        cards,
        Timestamp::now(),
        coll.config.new_cards_per_session,
        coll.config.ease_policy,
    );
    if session.is_finished() {
        println!("No cards due.");
        return Ok(());
    }
    let stdin = stdin();
    let mut input = stdin.lock();
    let mut output = stdout();
    run_drill(&mut session, &mut input, &mut output, Timestamp::now)?;
    let ended_at = Timestamp::now();
    session.save(&mut coll.db, ended_at)?;
    print!("{}", render_summary(&session.summary(ended_at)));
    if !session.is_finished() {
        println!("{} cards left in the queue.", session.remaining());
    }
    Ok(())
}

fn render_summary(summary: &SessionSummary) -> String {
    format!(
        "Studied {} cards in {} minutes.\nCorrect: {} ({}% accuracy)\n",
        summary.studied, summary.minutes, summary.correct, summary.accuracy
    )
}

/// Show cards and read ratings until the queue is empty, the learner quits,
/// or input ends.
pub fn run_drill(
    session: &mut Session,
    input: &mut impl BufRead,
    output: &mut impl Write,
    clock: impl Fn() -> Timestamp,
) -> Fallible<()> {
    while let Some(card) = session.current() {
        let card = card.clone();
        let content = card.content();
        writeln!(output)?;
        writeln!(
            output,
            "[{}] {} left",
            card.deck_name(),
            session.remaining()
        )?;
        writeln!(output, "Q: {}", content.front)?;
        writeln!(output, "[press enter to reveal, q to quit]")?;
        match read_line(input)? {
            Some(line) if line.trim() != "q" => {}
            _ => return Ok(()),
        }
        writeln!(output, "A: {}", content.back)?;
        if let Some(example) = &content.example {
            writeln!(output, "   {example}")?;
        }
        if let Some(translation) = &content.example_translation {
            writeln!(output, "   {translation}")?;
        }
        let Some(rating) = read_rating(input, output)? else {
            return Ok(());
        };
        let rated = session.rate(rating, clock())?;
        writeln!(
            output,
            "{}. Next review: {}",
            rating.description(),
            rated.due_date()
        )?;
    }
    writeln!(output, "Finished!")?;
    Ok(())
}

/// Prompt until the learner enters a valid rating. `None` means quit.
fn read_rating(input: &mut impl BufRead, output: &mut impl Write) -> Fallible<Option<Rating>> {
    loop {
        writeln!(output, "Rating: (1 = again, 2 = hard, 3 = good, 4 = easy, q = quit)")?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        if line.trim() == "q" {
            return Ok(None);
        }
        match Rating::from_key(&line) {
            Some(rating) => return Ok(Some(rating)),
            None => writeln!(output, "Invalid input. Please enter a number between 1 and 4.")?,
        }
    }
}

/// `None` at end of input.
fn read_line(input: &mut impl BufRead) -> Fallible<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        Ok(None)
    } else {
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::db::StoredCard;
    use crate::scheduler::EasePolicy;
    use crate::types::card::Card;
    use crate::types::card::Vocab;
    use crate::types::status::Status;

    fn t0() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 10, 1, 20, 0, 0).unwrap())
    }

    fn session() -> Session {
        let cards = ["Father", "Mother"]
            .iter()
            .map(|front| StoredCard {
                card: Card::new("Spanish", Vocab::new(*front, "?"), t0()),
                version: 0,
            })
            .collect();
        Session::new(cards, t0(), 10, EasePolicy::Uncapped)
    }

    fn run(session: &mut Session, keys: &str) -> Fallible<String> {
        let mut input = Cursor::new(keys.as_bytes().to_vec());
        let mut output = Vec::new();
        run_drill(session, &mut input, &mut output, t0)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_full_session() -> Fallible<()> {
        let mut session = session();
        // Father: again (requeued); Mother: good; Father: good.
        let out = run(&mut session, "\n1\n\n3\n\n3\n")?;
        assert!(session.is_finished());
        assert_eq!(session.reviews().len(), 3);
        assert!(out.contains("Q: Father"));
        assert!(out.contains("will see again in 10 minutes"));
        assert!(out.ends_with("Finished!\n"));
        Ok(())
    }

    #[test]
    fn test_invalid_rating_is_reprompted() -> Fallible<()> {
        let mut session = session();
        let out = run(&mut session, "\n7\nhello\n4\nq\n")?;
        assert_eq!(out.matches("Invalid input").count(), 2);
        assert_eq!(session.reviews().len(), 1);
        assert_eq!(session.reviews()[0].rating, Rating::Easy);
        assert_eq!(session.remaining(), 1);
        Ok(())
    }

    #[test]
    fn test_quit_and_eof() -> Fallible<()> {
        let mut session = session();
        run(&mut session, "q\n")?;
        assert!(session.reviews().is_empty());

        let mut session = session_after_one_good()?;
        assert_eq!(session.remaining(), 1);
        run(&mut session, "")?;
        assert_eq!(session.remaining(), 1);
        Ok(())
    }

    #[test]
    fn test_render_summary() -> Fallible<()> {
        let mut session = session();
        run(&mut session, "\n1\n\n3\n\n4\n")?;
        let text = render_summary(&session.summary(t0().plus_minutes(4)));
        assert_eq!(text, "Studied 3 cards in 4 minutes.\nCorrect: 2 (67% accuracy)\n");
        Ok(())
    }

    fn session_after_one_good() -> Fallible<Session> {
        let mut session = session();
        run(&mut session, "\n3\nq\n")?;
        let card = session.current().map(|c| c.status());
        assert_eq!(card, Some(Status::New));
        Ok(session)
    }
}
