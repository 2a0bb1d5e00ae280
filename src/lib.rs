//! # Match Bench
//!
//! A single-shot measurement harness for benchmarking two game-playing
//! agents over a refereed series of matches.
//!
//! It provides:
//! - Worker process supervision with guaranteed teardown ([`agent`])
//! - Referee invocation and combined output streaming ([`referee`])
//! - A single-pass scanner over the referee's event log ([`log_scanner`])
//! - Per-series aggregation and robust statistics ([`series`], [`stats`])
//!
//! The two agents run as separate OS processes communicating with the
//! referee over HTTP; this tool neither inspects nor mediates that traffic.
//! The referee's combined stdout/stderr is the only contract it depends on:
//! a line-oriented event log announcing game starts, steps, scores, and
//! game ends. The harness consumes that stream one line at a time,
//! accumulates score, step count, and first-player decision time per game,
//! and reports the mean, median, and median absolute deviation of each
//! sample over the series.
//!
//! # Usage Example
//!
//! ```no_run
//! use match_bench::prelude::*;
//!
//! fn main() {
//!     let config = Configuration::from_env()
//!         .with_games(20)
//!         .with_time_limit(30)
//!         .with_player("python3 my_player.py");
//!
//!     match match_bench::harness::run(&config) {
//!         RunOutcome::Complete(report) => print!("{report}"),
//!         RunOutcome::Aborted { error, transcript } => {
//!             println!("{error:#}");
//!             for line in &transcript {
//!                 println!("{line}");
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! # Failure model
//!
//! A game that ends without a score line is a protocol violation; the run
//! aborts and the full raw transcript is surfaced instead of statistics.
//! Unrecognized lines are not errors, they are kept in the transcript only.
//! Worker teardown happens on every exit path, including Ctrl-C (see
//! [`agent::install_interrupt_handler`]).
#![warn(missing_docs)]

pub mod agent;
pub use anyhow;
pub mod configuration;
pub mod harness;
pub mod log_scanner;
mod logger;
pub mod referee;
pub mod series;
pub mod stats;

/// Commonly used types for quick access.
///
/// ```rust
/// use match_bench::prelude::*;
/// ```
pub mod prelude {
    pub use crate::configuration::Configuration;
    pub use crate::harness::{run, RunOutcome};
    pub use crate::referee::BoardChoice;
    pub use crate::series::{SeriesAggregator, SeriesReport};
    pub use crate::stats::SampleSummary;
}
