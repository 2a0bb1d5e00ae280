//! Single-pass scanner over the referee's line-oriented event log.
//!
//! The referee writes `asctime -- LEVEL: message` lines to its output. The
//! scanner recognizes a fixed vocabulary of messages and turns them into
//! [`LogEvent`]s; every other line is inert. Patterns are tried in order and
//! the first match wins.

use std::sync::LazyLock;

use anyhow::{bail, Context};
use regex::Regex;
use tracing::trace;

static GAME_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-- INFO: Starting Game (\d+)").expect("valid pattern"));
static GAME_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-- INFO: End of Game (\d+)").expect("valid pattern"));
static CREDIT_EXPIRED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-- DEBUG: Time credit expired").expect("valid pattern"));
static SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-- INFO: Score: (-?\d+)").expect("valid pattern"));
static STEP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-- INFO: Step (\d+): received action .+? in (\d+\.\d+)s").expect("valid pattern")
});
static WINNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-- INFO: Winner: (player 1|player 2|draw game)").expect("valid pattern"));

/// Outcome of one game, as announced by the referee's winner line.
///
/// Sides are named from the first player's point of view (the agent whose
/// decision time is tracked).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    /// The first player won.
    FirstPlayer,
    /// The second player won.
    SecondPlayer,
    /// Neither side won.
    Draw,
}

/// Finalized result of one game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameRecord {
    /// Ordinal number of the game, assigned by the referee.
    pub index: u32,
    /// Signed final score.
    pub score: i64,
    /// Number of steps the game lasted.
    pub steps: u32,
    /// Decision time accumulated by the first player, in seconds.
    pub time: f64,
}

/// Per-game accumulator, reset on every game-start line and finalized on the
/// matching game-end line.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct GameAccumulator {
    score: Option<i64>,
    steps: Option<u32>,
    time: f64,
}

impl GameAccumulator {
    fn record_score(&mut self, score: i64) {
        self.score = Some(score);
    }

    fn record_step(&mut self, step: u32, seconds: f64) {
        self.steps = Some(step);
        // odd step indices belong to the first player; the two players
        // alternate turns starting at step 1
        if step % 2 == 1 {
            self.time += seconds;
        }
    }

    /// A game that ends without a score line is a protocol violation.
    fn finalize(self, index: u32) -> anyhow::Result<GameRecord> {
        let Some(score) = self.score else {
            bail!("game {index} ended without a score line");
        };
        Ok(GameRecord {
            index,
            score,
            steps: self.steps.unwrap_or(0),
            time: self.time,
        })
    }
}

/// Structured event extracted from one log line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogEvent {
    /// The referee started a new game.
    GameStarted {
        /// Ordinal number of the game.
        index: u32,
    },
    /// A game ended; carries its finalized record.
    GameCompleted(GameRecord),
    /// A player ran out of time credit. Informational only.
    CreditExpired,
    /// The referee announced the game's winner.
    WinnerReported(Winner),
}

/// Stateful scanner consuming the referee log one line at a time.
#[derive(Debug, Default)]
pub struct LogScanner {
    current: GameAccumulator,
}

impl LogScanner {
    /// Create a scanner with an empty accumulator.
    pub fn new() -> LogScanner {
        LogScanner::default()
    }

    /// Scan one line. Returns the extracted event, `Ok(None)` for lines
    /// outside the recognized vocabulary, or an error on the fatal
    /// missing-score condition.
    pub fn scan(&mut self, line: &str) -> anyhow::Result<Option<LogEvent>> {
        if let Some(caps) = GAME_START.captures(line) {
            let index = parse_capture(&caps[1])?;
            self.current = GameAccumulator::default();
            trace!(game = index, "game started");
            return Ok(Some(LogEvent::GameStarted { index }));
        }
        if let Some(caps) = GAME_END.captures(line) {
            let index = parse_capture(&caps[1])?;
            let record = self.current.finalize(index)?;
            self.current = GameAccumulator::default();
            trace!(game = index, "game completed");
            return Ok(Some(LogEvent::GameCompleted(record)));
        }
        if CREDIT_EXPIRED.is_match(line) {
            return Ok(Some(LogEvent::CreditExpired));
        }
        if let Some(caps) = SCORE.captures(line) {
            self.current.record_score(parse_capture(&caps[1])?);
            return Ok(None);
        }
        if let Some(caps) = STEP.captures(line) {
            let step = parse_capture(&caps[1])?;
            let seconds = parse_capture(&caps[2])?;
            self.current.record_step(step, seconds);
            return Ok(None);
        }
        if let Some(caps) = WINNER.captures(line) {
            let winner = match &caps[1] {
                "player 1" => Winner::FirstPlayer,
                "player 2" => Winner::SecondPlayer,
                _ => Winner::Draw,
            };
            return Ok(Some(LogEvent::WinnerReported(winner)));
        }
        Ok(None)
    }
}

fn parse_capture<T: std::str::FromStr>(text: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    text.parse()
        .with_context(|| format!("malformed log field '{text}'"))
}

#[cfg(test)]
mod scanner_tests {
    use super::*;

    fn line(message: &str) -> String {
        format!("2024-03-02 14:05:00,123 -- {message}")
    }

    #[test]
    fn minimal_game_yields_one_completion() {
        let mut scanner = LogScanner::new();
        assert_eq!(
            scanner.scan(&line("INFO: Starting Game 1")).unwrap(),
            Some(LogEvent::GameStarted { index: 1 })
        );
        assert_eq!(scanner.scan(&line("INFO: Score: 5")).unwrap(), None);
        let event = scanner.scan(&line("INFO: End of Game 1")).unwrap();
        let Some(LogEvent::GameCompleted(record)) = event else {
            panic!("expected a completion, got {event:?}");
        };
        assert_eq!(record.index, 1);
        assert_eq!(record.score, 5);
        assert_eq!(record.steps, 0);
        assert_eq!(record.time, 0.0);
    }

    #[test]
    fn game_end_without_score_is_fatal() {
        let mut scanner = LogScanner::new();
        scanner.scan(&line("INFO: Starting Game 1")).unwrap();
        let err = scanner.scan(&line("INFO: End of Game 1")).unwrap_err();
        assert!(err.to_string().contains("without a score line"));
    }

    #[test]
    fn odd_steps_are_credited_to_the_first_player() {
        let mut scanner = LogScanner::new();
        scanner.scan(&line("INFO: Starting Game 1")).unwrap();
        scanner
            .scan(&line("INFO: Step 3: received action (1, 2) in 1.250000s"))
            .unwrap();
        scanner
            .scan(&line("INFO: Step 4: received action (0, 0) in 9.000000s"))
            .unwrap();
        scanner.scan(&line("INFO: Score: -2")).unwrap();
        let event = scanner.scan(&line("INFO: End of Game 1")).unwrap();
        let Some(LogEvent::GameCompleted(record)) = event else {
            panic!("expected a completion, got {event:?}");
        };
        assert_eq!(record.steps, 4);
        assert_eq!(record.time, 1.25);
        assert_eq!(record.score, -2);
    }

    #[test]
    fn time_accumulates_across_odd_steps() {
        let mut scanner = LogScanner::new();
        scanner.scan(&line("INFO: Starting Game 2")).unwrap();
        scanner
            .scan(&line("INFO: Step 1: received action a in 0.500000s"))
            .unwrap();
        scanner
            .scan(&line("INFO: Step 2: received action b in 4.000000s"))
            .unwrap();
        scanner
            .scan(&line("INFO: Step 3: received action c in 0.250000s"))
            .unwrap();
        scanner.scan(&line("INFO: Score: 0")).unwrap();
        let event = scanner.scan(&line("INFO: End of Game 2")).unwrap();
        let Some(LogEvent::GameCompleted(record)) = event else {
            panic!("expected a completion, got {event:?}");
        };
        assert_eq!(record.time, 0.75);
    }

    #[test]
    fn accumulator_resets_between_games() {
        let mut scanner = LogScanner::new();
        scanner.scan(&line("INFO: Starting Game 1")).unwrap();
        scanner.scan(&line("INFO: Score: 9")).unwrap();
        scanner.scan(&line("INFO: End of Game 1")).unwrap();
        scanner.scan(&line("INFO: Starting Game 2")).unwrap();
        // game 2 has no score of its own, the previous one must not leak
        let err = scanner.scan(&line("INFO: End of Game 2")).unwrap_err();
        assert!(err.to_string().contains("game 2"));
    }

    #[test]
    fn credit_expiry_and_winner_are_surfaced() {
        let mut scanner = LogScanner::new();
        assert_eq!(
            scanner.scan(&line("DEBUG: Time credit expired")).unwrap(),
            Some(LogEvent::CreditExpired)
        );
        assert_eq!(
            scanner.scan(&line("INFO: Winner: player 1")).unwrap(),
            Some(LogEvent::WinnerReported(Winner::FirstPlayer))
        );
        assert_eq!(
            scanner.scan(&line("INFO: Winner: draw game")).unwrap(),
            Some(LogEvent::WinnerReported(Winner::Draw))
        );
    }

    #[test]
    fn unrecognized_lines_are_inert() {
        let mut scanner = LogScanner::new();
        scanner.scan(&line("INFO: Starting Game 1")).unwrap();
        scanner.scan(&line("INFO: Score: 1")).unwrap();
        let before = scanner.current;
        assert_eq!(scanner.scan("garbage that matches nothing").unwrap(), None);
        assert_eq!(
            scanner
                .scan(&line("DEBUG: Time left for player 0: 12.5"))
                .unwrap(),
            None
        );
        assert_eq!(scanner.current, before);
    }
}
