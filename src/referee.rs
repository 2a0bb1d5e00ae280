//! Referee invocation and its combined output stream.
//!
//! The referee is a black box whose line-oriented output is the only
//! contract this tool depends on. Its stdout and stderr are both piped and
//! merged into a single channel, one line at a time, in arrival order; the
//! stream ending is the end-of-run signal.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use anyhow::Context;
use tracing::{debug, trace};

use crate::configuration::Configuration;

/// Board file used when no layout option is given.
pub const DEFAULT_BOARD: &str = "b1.dmp";

/// Board selection forwarded to the referee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BoardChoice {
    /// The fixed benchmark board file.
    #[default]
    Fixed,
    /// A named preset board.
    Preset(String),
    /// Let the referee generate a random layout.
    Random,
}

/// Fully assembled referee invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefereeCommand {
    program: String,
    games: u32,
    board: BoardChoice,
    time_limit: Option<u32>,
    player_url: String,
    opponent_url: String,
}

impl RefereeCommand {
    /// Assemble the invocation described by `config`.
    pub fn from_configuration(config: &Configuration) -> RefereeCommand {
        RefereeCommand {
            program: config.referee.clone(),
            games: config.games,
            board: config.board.clone(),
            time_limit: config.time_limit,
            player_url: endpoint(config.player_port),
            opponent_url: endpoint(config.opponent_port),
        }
    }

    /// The argument vector appended to the referee program.
    ///
    /// Verbosity is always requested; the scanner needs the debug-level
    /// lines. The two worker endpoints come last, player first.
    pub fn arg_vector(&self) -> Vec<String> {
        let mut args = vec!["-v".to_string()];
        match &self.board {
            BoardChoice::Random => {}
            BoardChoice::Preset(name) => {
                args.push("--board".to_string());
                args.push(name.clone());
            }
            BoardChoice::Fixed => {
                args.push("--board".to_string());
                args.push(DEFAULT_BOARD.to_string());
            }
        }
        args.push("-n".to_string());
        args.push(self.games.to_string());
        if let Some(seconds) = self.time_limit {
            args.push("-t".to_string());
            args.push(seconds.to_string());
        }
        args.push("--headless".to_string());
        args.push(self.player_url.clone());
        args.push(self.opponent_url.clone());
        args
    }

    /// Spawn the referee with both output pipes captured.
    pub fn spawn(&self) -> anyhow::Result<RefereeStream> {
        let mut parts = self.program.split_whitespace();
        let program = parts.next().context("empty referee command")?;
        let mut child = Command::new(program)
            .args(parts)
            .args(self.arg_vector())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("command '{}' not found", self.program))?;
        debug!(referee = %self.program, pid = child.id(), "referee started");

        let stdout = child.stdout.take().expect("stdout was piped");
        let stderr = child.stderr.take().expect("stderr was piped");
        let (tx, rx) = mpsc::channel();
        let readers = vec![forward_lines(stdout, tx.clone()), forward_lines(stderr, tx)];
        Ok(RefereeStream { child, rx, readers })
    }
}

fn endpoint(port: u16) -> String {
    format!("http://localhost:{port}")
}

fn forward_lines<R: Read + Send + 'static>(pipe: R, tx: Sender<String>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for line in BufReader::new(pipe).lines() {
            let Ok(line) = line else { break };
            trace!(%line);
            if tx.send(line).is_err() {
                break;
            }
        }
    })
}

/// A running referee and its merged stdout/stderr line stream.
pub struct RefereeStream {
    child: Child,
    rx: Receiver<String>,
    readers: Vec<JoinHandle<()>>,
}

impl RefereeStream {
    /// Blocking iterator over the combined lines. Ends once the referee has
    /// closed both pipes.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.rx.iter()
    }

    /// Reap the referee after the stream has been drained.
    pub fn wait(mut self) -> anyhow::Result<ExitStatus> {
        for reader in self.readers.drain(..) {
            let _ = reader.join();
        }
        self.child.wait().context("could not reap the referee")
    }
}
