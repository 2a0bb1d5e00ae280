//! Config for one benchmark run.
//!
//! Configuration can be created programmatically using
//! [`Configuration::new()`] or by reading environment variables using
//! [`Configuration::from_env()`]; the binary layers its command-line flags
//! on top with the `with_*` builders.
//!
//! # Environment Variables
//!
//! All values are optional and case-insensitive. Set the value to `"true"`
//! to enable a flag.
//!
//! - `BENCH_VERBOSE` — Echo every referee line to stderr (default: `false`)
//! - `BENCH_LOG` — Enable logging to a file (default: `false`)

use std::time::Duration;

use crate::referee::BoardChoice;

/// Configuration for one benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub(crate) games: u32,
    pub(crate) board: BoardChoice,
    pub(crate) time_limit: Option<u32>,
    pub(crate) player: String,
    pub(crate) opponent: String,
    pub(crate) player_port: u16,
    pub(crate) opponent_port: u16,
    pub(crate) referee: String,
    pub(crate) settle_delay: Duration,
    pub(crate) verbose: bool,
    pub(crate) log: bool,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - 10 games are played on the fixed benchmark board, untimed.
    /// - The stock player and opponent scripts are launched on ports 8123
    ///   and 7123.
    /// - The referee is `python3 game.py`.
    /// - Workers get 100ms to bind their ports before the referee starts.
    /// - Line echo and file logging are disabled.
    pub fn new() -> Self {
        Self {
            games: 10,
            board: BoardChoice::Fixed,
            time_limit: None,
            player: "python3 super_player.py".to_string(),
            opponent: "python3 fast_player.py".to_string(),
            player_port: 8123,
            opponent_port: 7123,
            referee: "python3 game.py".to_string(),
            settle_delay: Duration::from_millis(100),
            verbose: false,
            log: false,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Recognizes `BENCH_VERBOSE` and `BENCH_LOG`; any other value
    /// (including unset) results in the default for each field.
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match std::env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        Self {
            verbose: get_env_flag("BENCH_VERBOSE", false),
            log: get_env_flag("BENCH_LOG", false),
            ..Self::new()
        }
    }

    /// Set the number of games in the series.
    pub fn with_games(mut self, value: u32) -> Self {
        self.games = value;
        self
    }

    /// Select the board forwarded to the referee.
    pub fn with_board(mut self, value: BoardChoice) -> Self {
        self.board = value;
        self
    }

    /// Set the per-decision time credit, in seconds, passed through to the
    /// referee.
    pub fn with_time_limit(mut self, seconds: u32) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Override the player invocation (the agent whose decision time is
    /// tracked).
    pub fn with_player(mut self, command: impl Into<String>) -> Self {
        self.player = command.into();
        self
    }

    /// Override the opponent invocation.
    pub fn with_opponent(mut self, command: impl Into<String>) -> Self {
        self.opponent = command.into();
        self
    }

    /// Override the referee invocation.
    pub fn with_referee(mut self, command: impl Into<String>) -> Self {
        self.referee = command.into();
        self
    }

    /// Set how long workers get to bind their ports before the referee
    /// starts. There is no readiness handshake.
    pub fn with_settle_delay(mut self, value: Duration) -> Self {
        self.settle_delay = value;
        self
    }

    /// Enable or disable echoing every referee line to stderr.
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}
