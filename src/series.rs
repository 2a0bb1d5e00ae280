//! Drives the log scanner across one full series of games.
//!
//! The aggregator feeds every referee line to a [`LogScanner`], keeps the
//! three per-game samples aligned by game order, retains the raw transcript
//! for diagnostic replay, and prints a running progress line as each game
//! completes.

use std::fmt::Display;
use std::io::Write;

use anyhow::bail;
use tracing::debug;

use crate::log_scanner::{LogEvent, LogScanner, Winner};
use crate::stats::SampleSummary;

/// The three per-game samples of one run, index-aligned by game order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SeriesSamples {
    /// Final score of each game.
    pub scores: Vec<f64>,
    /// Step count of each game.
    pub steps: Vec<f64>,
    /// First-player decision time of each game, in seconds.
    pub times: Vec<f64>,
}

/// Win/draw/loss tally from the first player's point of view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeriesTally {
    /// Games won by the first player.
    pub num_win: u32,
    /// Drawn games.
    pub num_draw: u32,
    /// Games lost by the first player.
    pub num_lose: u32,
}

impl SeriesTally {
    fn record(&mut self, winner: Winner) {
        match winner {
            Winner::FirstPlayer => self.num_win += 1,
            Winner::Draw => self.num_draw += 1,
            Winner::SecondPlayer => self.num_lose += 1,
        }
    }
}

impl Display for SeriesTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "win: {}, draw: {}, lose: {}",
            self.num_win, self.num_draw, self.num_lose
        )
    }
}

/// Accumulates one full referee run, line by line.
#[derive(Debug, Default)]
pub struct SeriesAggregator {
    scanner: LogScanner,
    samples: SeriesSamples,
    tally: SeriesTally,
    transcript: Vec<String>,
    echo_lines: bool,
}

impl SeriesAggregator {
    /// Create an empty aggregator. With `echo_lines`, every raw line is also
    /// echoed to stderr.
    pub fn new(echo_lines: bool) -> SeriesAggregator {
        SeriesAggregator {
            echo_lines,
            ..SeriesAggregator::default()
        }
    }

    /// Feed one referee line. Updates the samples and prints progress;
    /// returns the fatal protocol violation, if any.
    pub fn observe(&mut self, line: &str) -> anyhow::Result<()> {
        self.transcript.push(line.to_string());
        if self.echo_lines {
            eprintln!("{line}");
        }
        match self.scanner.scan(line)? {
            Some(LogEvent::GameStarted { index }) => {
                print!("Game {index:2}: ");
                flush_stdout();
            }
            Some(LogEvent::GameCompleted(record)) => {
                self.samples.scores.push(record.score as f64);
                self.samples.steps.push(f64::from(record.steps));
                self.samples.times.push(record.time);
                debug!(
                    game = record.index,
                    score = record.score,
                    steps = record.steps,
                    time = record.time,
                );
                println!("{:2} {:2} {:.3}s", record.score, record.steps, record.time);
            }
            Some(LogEvent::CreditExpired) => {
                print!("EXPIRED ");
                flush_stdout();
            }
            Some(LogEvent::WinnerReported(winner)) => {
                self.tally.record(winner);
            }
            None => {}
        }
        Ok(())
    }

    /// Feed a whole sequence of lines, stopping at the first fatal line.
    pub fn consume<I>(&mut self, lines: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        for line in lines {
            self.observe(&line)?;
        }
        Ok(())
    }

    /// Samples collected so far.
    pub fn samples(&self) -> &SeriesSamples {
        &self.samples
    }

    /// Every line read so far, in order.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Give up the transcript for diagnostic replay.
    pub fn into_transcript(self) -> Vec<String> {
        self.transcript
    }

    /// Summarize the completed run.
    ///
    /// # Errors
    /// Fails if no game completed, since no statistic is defined then.
    pub fn finish(&self) -> anyhow::Result<SeriesReport> {
        if self.samples.scores.is_empty() {
            bail!("referee produced no completed game");
        }
        Ok(SeriesReport {
            games: self.samples.scores.len(),
            tally: self.tally,
            score: SampleSummary::describe(&self.samples.scores),
            steps: SampleSummary::describe(&self.samples.steps),
            time: SampleSummary::describe(&self.samples.times),
        })
    }
}

/// Statistical summary of one full series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesReport {
    /// Number of completed games.
    pub games: usize,
    /// Win/draw/loss tally of the first player.
    pub tally: SeriesTally,
    /// Summary of the score sample.
    pub score: SampleSummary,
    /// Summary of the step-count sample.
    pub steps: SampleSummary,
    /// Summary of the decision-time sample.
    pub time: SampleSummary,
}

impl Display for SeriesReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "Games:   {} ({})", self.games, self.tally)?;
        for (label, summary) in [
            ("Score", &self.score),
            ("Steps", &self.steps),
            ("Time", &self.time),
        ] {
            writeln!(f)?;
            writeln!(f, "{label}:")?;
            writeln!(f, "{summary}")?;
        }
        Ok(())
    }
}

fn flush_stdout() {
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod series_tests {
    use super::*;

    fn game_lines(index: u32, score: i64, steps: u32) -> Vec<String> {
        let mut lines = vec![format!("-- INFO: Starting Game {index}")];
        for step in 1..=steps {
            lines.push(format!(
                "-- INFO: Step {step}: received action (0, 0) in 0.250000s"
            ));
        }
        lines.push(format!("-- INFO: Score: {score}"));
        lines.push(format!("-- INFO: End of Game {index}"));
        lines
    }

    #[test]
    fn samples_stay_aligned_over_a_full_series() {
        let mut aggregator = SeriesAggregator::new(false);
        for i in 1..=4 {
            aggregator.consume(game_lines(i, i as i64, 2 * i)).unwrap();
        }
        let samples = aggregator.samples();
        assert_eq!(samples.scores.len(), 4);
        assert_eq!(samples.steps.len(), 4);
        assert_eq!(samples.times.len(), 4);
        assert_eq!(samples.scores, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(samples.steps, vec![2.0, 4.0, 6.0, 8.0]);
        // one odd step per two steps, 0.25s each
        assert_eq!(samples.times, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn missing_score_aborts_and_keeps_transcript() {
        let mut aggregator = SeriesAggregator::new(false);
        let lines = vec![
            "-- INFO: Starting Game 1".to_string(),
            "-- INFO: End of Game 1".to_string(),
        ];
        let err = aggregator.consume(lines).unwrap_err();
        assert!(err.to_string().contains("without a score line"));
        assert_eq!(aggregator.samples().scores.len(), 0);
        assert_eq!(aggregator.transcript().len(), 2);
        assert!(aggregator.finish().is_err());
    }

    #[test]
    fn transcript_keeps_unrecognized_lines() {
        let mut aggregator = SeriesAggregator::new(false);
        aggregator.observe("noise before the run").unwrap();
        aggregator.consume(game_lines(1, 7, 1)).unwrap();
        assert_eq!(aggregator.transcript().len(), 5);
        assert_eq!(aggregator.transcript()[0], "noise before the run");
    }

    #[test]
    fn report_summarizes_all_three_samples() {
        let mut aggregator = SeriesAggregator::new(false);
        for (i, score) in [6, 8, 10].iter().enumerate() {
            aggregator
                .consume(game_lines(i as u32 + 1, *score, 2))
                .unwrap();
        }
        let report = aggregator.finish().unwrap();
        assert_eq!(report.games, 3);
        assert_eq!(report.score.mean, 8.0);
        assert_eq!(report.score.median, 8.0);
        assert_eq!(report.score.spread(), 4.0);
        assert_eq!(report.steps.median, 2.0);
        assert_eq!(report.time.median, 0.25);
    }

    #[test]
    fn winner_lines_feed_the_tally() {
        let mut aggregator = SeriesAggregator::new(false);
        aggregator.consume(game_lines(1, 1, 1)).unwrap();
        aggregator.observe("-- INFO: Winner: player 1").unwrap();
        aggregator.consume(game_lines(2, -1, 1)).unwrap();
        aggregator.observe("-- INFO: Winner: player 2").unwrap();
        aggregator.consume(game_lines(3, 0, 1)).unwrap();
        aggregator.observe("-- INFO: Winner: draw game").unwrap();
        let report = aggregator.finish().unwrap();
        assert_eq!(report.tally.num_win, 1);
        assert_eq!(report.tally.num_draw, 1);
        assert_eq!(report.tally.num_lose, 1);
        assert_eq!(report.tally.to_string(), "win: 1, draw: 1, lose: 1");
    }
}
