use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::HarnessConfig;
use crate::score::read_score;
use crate::{Score, Seed};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Seed {seed} timed out after {timeout:?}")]
    Timeout { seed: Seed, timeout: Duration },

    #[error("Seed {seed} failed with {}", describe_exit(.code))]
    ExitStatus { seed: Seed, code: Option<i32> },

    #[error("I/O error while running seed {seed}: {source}")]
    Io {
        seed: Seed,
        #[source]
        source: std::io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Paths of the captured output of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFiles {
    pub stdout: PathBuf,
    pub stderr: PathBuf,
}

impl RunFiles {
    pub fn new(output_dir: &Path, seed: Seed) -> Self {
        Self {
            stdout: output_dir.join(format!("{seed}.out")),
            stderr: output_dir.join(format!("{seed}.err")),
        }
    }
}

/// Runs the tester wrapping `solver` on the cached input of `seed` and returns the score
/// found in its stderr.
///
/// The tester's stdout and stderr go to `<seed>.out` and `<seed>.err` in `output_dir`,
/// replacing earlier runs. Both files are kept on failure. The input must have been
/// cached before.
pub async fn run_solver(
    config: &HarnessConfig,
    solver: &Path,
    seed: Seed,
    output_dir: &Path,
) -> Result<Score, RunnerError> {
    let io_err = |source| RunnerError::Io { seed, source };

    let input = tokio::fs::read(config.input_path(seed))
        .await
        .map_err(io_err)?;
    let files = RunFiles::new(output_dir, seed);
    let stdout = File::create(&files.stdout).map_err(io_err)?;
    let stderr = File::create(&files.stderr).map_err(io_err)?;

    debug!("Run {solver:?} on seed {seed}");
    let mut child = Command::new(&config.tester)
        .arg(solver)
        .stdin(Stdio::piped())
        .stdout(stdout)
        .stderr(stderr)
        .kill_on_drop(true)
        .spawn()
        .map_err(io_err)?;

    let stdin = child.stdin.take();
    let feed = async move {
        let Some(mut stdin) = stdin else {
            return Ok(());
        };
        // the tester may legitimately exit without consuming all of its input
        match stdin.write_all(&input).await {
            Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
            _ => Ok(()),
        }
    };

    let finished = tokio::time::timeout(config.timeout, async {
        let (fed, status) = tokio::join!(feed, child.wait());
        fed.and(status)
    })
    .await;

    let status = match finished {
        Ok(status) => status.map_err(io_err)?,
        Err(_) => {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill tester for seed {seed}: {e}");
            }
            return Err(RunnerError::Timeout {
                seed,
                timeout: config.timeout,
            });
        }
    };

    if !status.success() {
        return Err(RunnerError::ExitStatus {
            seed,
            code: status.code(),
        });
    }

    read_score(&files.stderr).map_err(io_err)
}
