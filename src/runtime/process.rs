//! Running an installed binary.

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use std::process::{Command, Stdio};

use super::RealRuntime;

/// Exit status and captured output of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

// A freshly written executable can briefly be held open for writing by a
// concurrently forked process, which makes exec fail with ETXTBSY.
#[cfg(unix)]
const EXEC_BUSY_ATTEMPTS: usize = 5;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_impl(&self, program: &Path, args: &[String]) -> Result<CommandOutput> {
        let output = spawn_with_busy_retry(program, args)
            .with_context(|| format!("Failed to execute {:?}", program))?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!("{:?} {:?} exited with {:?}", program, args, result.code);
        Ok(result)
    }
}

fn output_of(program: &Path, args: &[String]) -> std::io::Result<std::process::Output> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
}

#[cfg(unix)]
fn spawn_with_busy_retry(program: &Path, args: &[String]) -> std::io::Result<std::process::Output> {
    let mut attempt = 1;
    loop {
        match output_of(program, args) {
            Err(e)
                if e.raw_os_error() == Some(nix::errno::Errno::ETXTBSY as i32)
                    && attempt < EXEC_BUSY_ATTEMPTS =>
            {
                debug!("{:?} is busy, retrying exec ({}/{})", program, attempt, EXEC_BUSY_ATTEMPTS);
                std::thread::sleep(std::time::Duration::from_millis(50 * attempt as u64));
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(not(unix))]
fn spawn_with_busy_retry(program: &Path, args: &[String]) -> std::io::Result<std::process::Output> {
    output_of(program, args)
}
