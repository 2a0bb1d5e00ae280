use std::process::ExitCode;

use clap::Parser;
use match_bench::agent::install_interrupt_handler;
use match_bench::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "match-bench",
    version,
    about = "Benchmark two game-playing agents over a refereed series"
)]
struct Cli {
    /// Number of games to play
    #[arg(default_value_t = 10)]
    games: u32,

    /// Let the referee generate a random layout instead of the fixed board
    #[arg(short = 'r', long)]
    random_board: bool,

    /// Use a named preset board instead of the fixed board
    #[arg(long, conflicts_with = "random_board")]
    preset: Option<String>,

    /// Per-decision time credit, in seconds, passed through to the referee
    #[arg(short = 't', long = "time-limit")]
    time_limit: Option<u32>,

    /// Echo every referee line to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Write a trace log file for this run
    #[arg(long)]
    log: bool,

    /// Override the two agent invocations (player, then opponent)
    #[arg(num_args = 0..=2)]
    agents: Vec<String>,
}

impl Cli {
    fn into_configuration(self) -> Configuration {
        let mut config = Configuration::from_env().with_games(self.games);
        if self.random_board {
            config = config.with_board(BoardChoice::Random);
        } else if let Some(name) = self.preset {
            config = config.with_board(BoardChoice::Preset(name));
        }
        if let Some(seconds) = self.time_limit {
            config = config.with_time_limit(seconds);
        }
        if self.verbose {
            config = config.with_verbose(true);
        }
        if self.log {
            config = config.with_log(true);
        }
        let mut agents = self.agents.into_iter();
        if let Some(player) = agents.next() {
            config = config.with_player(player);
        }
        if let Some(opponent) = agents.next() {
            config = config.with_opponent(opponent);
        }
        config
    }
}

fn main() -> ExitCode {
    let config = Cli::parse().into_configuration();

    if let Err(e) = install_interrupt_handler() {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    match match_bench::harness::run(&config) {
        RunOutcome::Complete(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        RunOutcome::Aborted { error, transcript } => {
            println!("{error:#}");
            println!();
            for line in &transcript {
                println!("{line}");
            }
            ExitCode::FAILURE
        }
    }
}
