//! Orchestrates one full benchmark run.
//!
//! Control flow: start the two workers, wait the settle delay, start the
//! referee, feed its combined output to the aggregator one line at a time,
//! then summarize. Whatever happens in between, both workers are terminated
//! before control returns; the referee is never signaled, its stream
//! closing is the end-of-run signal.

use anyhow::Context;
use time::{format_description, OffsetDateTime};
use tracing::{debug, info, instrument};

use crate::agent::AgentProcess;
use crate::configuration::Configuration;
use crate::logger::init_logger;
use crate::referee::RefereeCommand;
use crate::series::{SeriesAggregator, SeriesReport};

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The series completed; statistics were computed.
    Complete(SeriesReport),
    /// The run aborted. Carries the error and the full raw transcript for
    /// diagnostic replay.
    Aborted {
        /// What went wrong.
        error: anyhow::Error,
        /// Every referee line read before the failure, in order.
        transcript: Vec<String>,
    },
}

/// Execute one benchmark run as described by `config`.
#[instrument(skip_all)]
pub fn run(config: &Configuration) -> RunOutcome {
    let mut aggregator = SeriesAggregator::new(config.verbose);
    let outcome = execute(config, &mut aggregator).and_then(|()| aggregator.finish());
    match outcome {
        Ok(report) => RunOutcome::Complete(report),
        Err(error) => RunOutcome::Aborted {
            error,
            transcript: aggregator.into_transcript(),
        },
    }
}

fn execute(config: &Configuration, aggregator: &mut SeriesAggregator) -> anyhow::Result<()> {
    if config.log {
        init_logger()?;
    }
    info!(?config);

    let mut player = AgentProcess::launch(&config.player, config.player_port)
        .context("could not start the player")?;
    let mut opponent = AgentProcess::launch(&config.opponent, config.opponent_port)
        .context("could not start the opponent")?;

    // no readiness handshake: give the workers time to bind their ports
    std::thread::sleep(config.settle_delay);

    print_header();
    let result = drive_referee(config, aggregator);

    // every exit path goes through here; Drop is only the panic backstop
    player.terminate();
    opponent.terminate();
    result
}

fn drive_referee(config: &Configuration, aggregator: &mut SeriesAggregator) -> anyhow::Result<()> {
    let command = RefereeCommand::from_configuration(config);
    let stream = command.spawn()?;
    for line in stream.lines() {
        aggregator.observe(&line)?;
    }
    let status = stream.wait()?;
    debug!(?status, "referee exited");
    Ok(())
}

fn print_header() {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let format = format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")
        .expect("valid format description");
    println!();
    if let Ok(stamp) = now.format(&format) {
        println!("{stamp}");
    }
    println!("Game i: score steps time");
}
