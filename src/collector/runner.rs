//! Process execution for the powermetrics command.
//!
//! [`CommandRunner`] is the seam between collection and the operating system:
//! the collector only ever sees the bytes a runner returns.

use crate::utils::config::RUNNER_POLL_INTERVAL;
use crate::utils::error::CollectError;
use log::{debug, warn};
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Runs an external program and returns its standard output
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String], timeout: Duration)
        -> Result<Vec<u8>, CollectError>;
}

/// Runs commands on the local system with a timeout
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    /// Pipes are drained on helper threads while this thread polls the child.
    /// A child still running at the deadline is killed and reaped.
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<Vec<u8>, CollectError> {
        debug!("Running {} {}", program, args.join(" "));

        let spawn_error = |source: std::io::Error| CollectError::Spawn {
            program: program.to_string(),
            source,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        // None when the deadline is too far out to represent
        let deadline = Instant::now().checked_add(timeout);

        let status = loop {
            if let Some(status) = child.try_wait().map_err(spawn_error)? {
                break status;
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                warn!("{} still running after {:?}, killing it", program, timeout);
                if let Err(e) = child.kill() {
                    debug!("Failed to kill {}: {}", program, e);
                }
                let _ = child.wait();
                return Err(CollectError::Timeout {
                    program: program.to_string(),
                    timeout,
                });
            }

            thread::sleep(RUNNER_POLL_INTERVAL);
        };

        let stdout = join_reader(stdout).map_err(spawn_error)?;
        let stderr = join_reader(stderr).map_err(spawn_error)?;

        if !status.success() {
            return Err(CollectError::CommandFailed {
                program: program.to_string(),
                status: status.code(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        debug!("{} wrote {} bytes", program, stdout.len());
        Ok(stdout)
    }
}

/// Read a child pipe to the end on its own thread
fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_reader(reader: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> std::io::Result<Vec<u8>> {
    match reader {
        Some(handle) => handle
            .join()
            .map_err(|_| std::io::Error::other("pipe reader thread panicked"))?,
        None => Ok(Vec::new()),
    }
}
