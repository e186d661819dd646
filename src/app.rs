//! Terminal front end: printing cards and running interactive study sessions.

use chrono::{DateTime, Local, Utc};
use colored::*;
use flashcard_scheduler::{CardSnapshot, Grade, ReviewEvent, Scheduler, SchedulerError};
use std::io::{BufRead, Write};

/// Formats an instant in local time as YYYY-MM-DD HH:MM
pub fn format_instant(instant: Option<DateTime<Utc>>) -> String {
    match instant {
        Some(instant) => {
            let local: DateTime<Local> = instant.into();
            local.format("%Y-%m-%d %H:%M").to_string()
        }
        None => "never".to_string(),
    }
}

pub fn print_snapshot(out: &mut impl Write, snapshot: &CardSnapshot) -> std::io::Result<()> {
    writeln!(
        out,
        "{}  reps={} interval={:.2}d ease={:.3} last={} next={}",
        snapshot.card_name.bold(),
        snapshot.reps,
        snapshot.interval,
        snapshot.ease_factor,
        format_instant(snapshot.last_studied_at),
        format_instant(snapshot.next_due_at)
    )
}

pub fn print_event(out: &mut impl Write, event: &ReviewEvent) -> std::io::Result<()> {
    let kind = if event.is_registration() {
        "registered".cyan()
    } else {
        "reviewed".green()
    };
    writeln!(
        out,
        "#{:<6} {:<10} at={} next={} reps={} interval={:.2}d ease={:.3}",
        event.seq,
        kind,
        format_instant(event.last_studied_at),
        format_instant(event.next_due_at),
        event.reps,
        event.interval,
        event.ease_factor
    )
}

enum Answer {
    Grade(Grade),
    Quit,
}

/// Reads lines until the reviewer enters a grade or quits. `None` on end of input.
fn read_answer(input: &mut impl BufRead, out: &mut impl Write) -> eyre::Result<Option<Answer>> {
    loop {
        let choices: Vec<String> = Grade::ALL
            .iter()
            .map(|g| format!("{}={}", g.value(), g.label()))
            .collect();
        write!(out, "Grade [{}, q=quit]: ", choices.join(", "))?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(Some(Answer::Quit));
        }
        match line.parse::<u8>().map_err(|_| line.to_string()) {
            Ok(value) => match Grade::try_from(value) {
                Ok(grade) => return Ok(Some(Answer::Grade(grade))),
                Err(SchedulerError::InvalidArgument(msg)) => writeln!(out, "{}", msg.red())?,
                Err(e) => return Err(e.into()),
            },
            Err(text) => writeln!(out, "{}", format!("'{}' is not a grade", text).red())?,
        }
    }
}

/// Runs one study session over the cards due now.
///
/// Returns the number of cards reviewed. The session ends when every card has
/// been graded, the reviewer quits or input runs out.
pub fn run_study(
    scheduler: &Scheduler,
    user_id: &str,
    collection_id: &str,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> eyre::Result<usize> {
    let mut session = scheduler.start_session(user_id, collection_id)?;

    if session.is_complete() {
        writeln!(out, "{}", "You have no more pending flashcards for now.".yellow())?;
        return Ok(0);
    }

    let mut reviewed = 0;
    while let Some(card) = session.current().cloned() {
        writeln!(out)?;
        writeln!(out, "{}", session.progress_message().dimmed())?;
        writeln!(out, "{}", card.card_name.bold().cyan())?;
        writeln!(out, "{}", card.card_text)?;

        match read_answer(input, out)? {
            Some(Answer::Grade(grade)) => {
                let updated = scheduler.submit(&mut session, grade)?;
                reviewed += 1;
                writeln!(
                    out,
                    "{} {} (next review {})",
                    "Recorded".green(),
                    grade,
                    format_instant(updated.next_due_at)
                )?;
            }
            Some(Answer::Quit) | None => break,
        }
    }

    writeln!(out)?;
    if session.is_complete() {
        writeln!(out, "{}", session.progress_message().green())?;
    } else {
        writeln!(
            out,
            "Stopped with {} card(s) left in this session",
            session.remaining_count()
        )?;
    }
    Ok(reviewed)
}
