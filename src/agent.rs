//! Worker process lifetime management.
//!
//! Each competing agent runs as an independent OS process, communicating
//! with the referee over HTTP; this tool never inspects that traffic. The
//! only guarantee enforced here is scoped acquisition: a worker's lifetime
//! is bounded by the handle's, on every exit path.

use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{debug, warn};

/// Pids of workers that are currently alive, for the interrupt handler.
static LIVE_WORKERS: Mutex<Vec<u32>> = Mutex::new(Vec::new());

/// Handle on one running agent process.
///
/// The worker is sent a termination signal when the handle is dropped, so a
/// worker can never outlive the run that started it.
#[derive(Debug)]
pub struct AgentProcess {
    name: String,
    child: Child,
    terminated: bool,
}

impl AgentProcess {
    const CLEANUP_TIMEOUT: Duration = Duration::from_secs(1);

    /// Launch an agent listening on `port`.
    ///
    /// `command` is a full program invocation split on whitespace (for
    /// example `python3 super_player.py`); the port is appended as
    /// `-p <port>`.
    pub fn launch(command: &str, port: u16) -> anyhow::Result<AgentProcess> {
        let mut parts = command.split_whitespace();
        let program = parts.next().context("empty agent command")?;
        let mut args: Vec<String> = parts.map(str::to_string).collect();
        args.push("-p".to_string());
        args.push(port.to_string());
        Self::spawn(program, &args)
    }

    /// Spawn `program` with the given arguments, detached from our stdio.
    pub fn spawn(program: &str, args: &[String]) -> anyhow::Result<AgentProcess> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("command '{program}' not found"))?;
        debug!(worker = program, pid = child.id(), "worker started");
        LIVE_WORKERS.lock().expect("poisoned").push(child.id());
        Ok(AgentProcess {
            name: program.to_string(),
            child,
            terminated: false,
        })
    }

    /// Pid of the worker.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Whether [`terminate`](Self::terminate) already ran.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Send the worker a termination signal and reap it. Idempotent; called
    /// automatically on drop.
    pub fn terminate(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        let pid = self.child.id();
        LIVE_WORKERS.lock().expect("poisoned").retain(|p| *p != pid);
        debug!(worker = %self.name, pid, "terminating worker");

        if let Err(e) = send_sigterm(pid) {
            // already gone, or no signal support: fall back to a hard kill
            debug!("could not signal '{}': {e:#}", self.name);
            let _ = self.child.kill();
        }
        let deadline = Instant::now() + Self::CLEANUP_TIMEOUT;
        while Instant::now() < deadline {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    debug!(worker = %self.name, ?status, "worker exited");
                    return;
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(10)),
                Err(_) => break,
            }
        }
        warn!("worker '{}' ignored the termination signal", self.name);
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for AgentProcess {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Install a Ctrl-C handler that terminates every live worker before
/// exiting. Call once, from the binary entry point.
pub fn install_interrupt_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        for pid in LIVE_WORKERS.lock().expect("poisoned").drain(..) {
            let _ = send_sigterm(pid);
        }
        // 128 + SIGINT
        std::process::exit(130);
    })
    .context("could not install the interrupt handler")
}

#[cfg(unix)]
fn send_sigterm(pid: u32) -> anyhow::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
        .with_context(|| format!("SIGTERM to pid {pid} failed"))
}

#[cfg(not(unix))]
fn send_sigterm(_pid: u32) -> anyhow::Result<()> {
    anyhow::bail!("termination signals are not supported on this platform")
}
