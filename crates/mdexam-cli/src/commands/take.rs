//! The `mdexam take` command: an interactive attempt on the terminal.
//!
//! Stdin lines and the exam timer feed one channel, so a timeout and a typed
//! command are handled strictly one after the other by the same runner.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use mdexam_core::engine::{AttemptOutcome, AttemptRunner, SaveStatus};
use mdexam_core::import::resolve_images;
use mdexam_core::model::{format_duration, AnswerMode, ExamRecord};
use mdexam_core::report::AttemptReview;
use mdexam_core::session::{Action, Session, Termination};
use mdexam_core::shuffle::ShuffleOptions;
use mdexam_core::timer::ExamTimer;

use super::Context;

/// Something the attempt loop has to react to.
#[derive(Debug)]
enum Input {
    Line(String),
    Timeout,
    Closed,
}

/// A parsed stdin line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Actions(Vec<Action>),
    Quit,
    Help,
    Nothing,
    Invalid(String),
}

/// Parse one line of learner input.
///
/// Choice numbers are 1-based and may be separated by spaces or commas.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => return Command::Nothing,
        "n" | "next" => return Command::Actions(vec![Action::Next]),
        "p" | "prev" | "previous" => return Command::Actions(vec![Action::Previous]),
        "c" | "clear" => return Command::Actions(vec![Action::Clear]),
        "s" | "submit" => return Command::Actions(vec![Action::Submit]),
        "q" | "quit" => return Command::Quit,
        "h" | "?" | "help" => return Command::Help,
        _ => {}
    }

    if let Some(target) = line.strip_prefix("g ").or_else(|| line.strip_prefix("G ")) {
        return match target.trim().parse::<usize>() {
            Ok(n) if n >= 1 => Command::Actions(vec![Action::JumpTo(n - 1)]),
            _ => Command::Invalid(format!("'{}' is not a question number", target.trim())),
        };
    }

    let mut actions = Vec::new();
    for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        match token.parse::<usize>() {
            Ok(n) if n >= 1 => actions.push(Action::Toggle(n - 1)),
            _ => return Command::Invalid(format!("unknown command '{line}'")),
        }
    }
    Command::Actions(actions)
}

const HELP: &str = "Commands: <numbers> toggle choices (e.g. `1 3`), n next, p previous, \
g <n> go to question, c clear, s submit (last question), q quit";

pub async fn execute(ctx: &Context, exam: &str, no_shuffle: bool, missed_only: bool) -> Result<()> {
    let record = ctx.find_exam(exam).await?;
    let parsed = record.exam();

    let options = if no_shuffle {
        ShuffleOptions::none()
    } else {
        ctx.config.shuffle_options()
    };
    let mut runner = AttemptRunner::start(
        &parsed,
        Some(record.id),
        options,
        &mut rand::thread_rng(),
        Arc::clone(&ctx.store),
    )?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_stdin_reader(tx.clone());

    let limit = match parsed.time_limit_duration() {
        Ok(limit) => limit,
        Err(e) => {
            eprintln!("Warning: {e}; taking the exam without a time limit.");
            None
        }
    };
    let timer = limit.and_then(|limit| {
        let tx = tx.clone();
        let timer = ExamTimer::start(limit, move || {
            let _ = tx.send(Input::Timeout);
        });
        if timer.is_none() {
            eprintln!(
                "Warning: time limit {} is too long; taking the exam without a time limit.",
                format_duration(limit)
            );
        }
        timer
    });
    let limit = timer.as_ref().and(limit);
    drop(tx);

    println!(
        "{} ({} questions{})",
        runner.session().exam().title,
        runner.session().question_count(),
        limit
            .map(|l| format!(", time limit {}", format_duration(l)))
            .unwrap_or_default()
    );
    println!("{HELP}\n");
    render(runner.session(), &record, timer.as_ref());

    let outcome = loop {
        let Some(input) = rx.recv().await else {
            break None;
        };
        let actions = match input {
            Input::Timeout => vec![Action::Timeout],
            Input::Closed => break None,
            Input::Line(line) => match parse_command(&line) {
                Command::Actions(actions) => actions,
                Command::Quit => break None,
                Command::Help => {
                    println!("{HELP}");
                    continue;
                }
                Command::Nothing => Vec::new(),
                Command::Invalid(message) => {
                    println!("{message}. {HELP}");
                    continue;
                }
            },
        };

        let mut finished = None;
        for action in actions {
            if let Some(outcome) = runner.dispatch(action).await? {
                finished = Some(outcome);
                break;
            }
        }
        if finished.is_some() {
            break finished;
        }
        render(runner.session(), &record, timer.as_ref());
    };
    drop(timer);

    match outcome {
        Some(outcome) => {
            report_outcome(&outcome, &record, missed_only || ctx.config.missed_only_review);
        }
        None => println!("Attempt abandoned, nothing saved."),
    }
    Ok(())
}

/// Stdin is read on its own thread. A pending read must not delay exit.
fn spawn_stdin_reader(tx: mpsc::UnboundedSender<Input>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Input::Line(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to read stdin: {e}");
                    break;
                }
            }
        }
        let _ = tx.send(Input::Closed);
    });
}

fn render(session: &Session, record: &ExamRecord, timer: Option<&ExamTimer>) {
    let (Some(index), Some(question)) = (session.current_index(), session.current_question())
    else {
        return;
    };

    let remaining = timer
        .map(|t| format!("  [{} left]", format_duration(t.remaining())))
        .unwrap_or_default();
    println!(
        "Question {}/{}{remaining}",
        index + 1,
        session.question_count()
    );
    println!("{}", resolve_images(&question.prompt, &record.images));
    let hint = match question.answer_mode() {
        AnswerMode::Single => "choose one",
        AnswerMode::Multiple => "choose all that apply",
    };
    println!("({hint})");

    for (i, choice) in question.choices.iter().enumerate() {
        let mark = if session.selection().get(i).copied().unwrap_or(false) {
            "x"
        } else {
            " "
        };
        println!("  {}. [{mark}] {}", i + 1, choice.text);
    }

    if session.is_last() {
        println!("Last question: `s` to submit.");
    }
    println!();
}

fn report_outcome(outcome: &AttemptOutcome, record: &ExamRecord, missed_only: bool) {
    if outcome.termination == Termination::TimedOut {
        println!("Time is up.");
    }
    println!(
        "Result: {}% ({}/{})",
        outcome.summary.percent, outcome.summary.score, outcome.summary.total
    );

    match &outcome.saved {
        SaveStatus::Saved { record: attempt, .. } => {
            println!("Saved as attempt {}.\n", attempt.attempt_number);
            let review = AttemptReview::from_record(attempt);
            println!(
                "{}",
                resolve_images(&review.to_markdown(missed_only), &record.images)
            );
        }
        SaveStatus::NotSaved { reason } => {
            eprintln!("Warning: attempt not saved: {reason}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation() {
        assert_eq!(parse_command("n"), Command::Actions(vec![Action::Next]));
        assert_eq!(parse_command(" P "), Command::Actions(vec![Action::Previous]));
        assert_eq!(parse_command("s"), Command::Actions(vec![Action::Submit]));
        assert_eq!(parse_command("c"), Command::Actions(vec![Action::Clear]));
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(parse_command(""), Command::Nothing);
    }

    #[test]
    fn parses_choice_numbers() {
        assert_eq!(
            parse_command("1 3,4"),
            Command::Actions(vec![
                Action::Toggle(0),
                Action::Toggle(2),
                Action::Toggle(3)
            ])
        );
        assert!(matches!(parse_command("0"), Command::Invalid(_)));
        assert!(matches!(parse_command("1 x"), Command::Invalid(_)));
    }

    #[test]
    fn parses_jump() {
        assert_eq!(parse_command("g 3"), Command::Actions(vec![Action::JumpTo(2)]));
        assert!(matches!(parse_command("g 0"), Command::Invalid(_)));
        assert!(matches!(parse_command("g x"), Command::Invalid(_)));
    }
}
