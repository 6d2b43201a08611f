use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::HarnessConfig;
use crate::io::input_cache::{GenerationError, ensure_input};
use crate::io::overview::OverviewError;
use crate::pool::run_ordered;
use crate::runner::{RunnerError, run_solver};
use crate::{Score, Seed};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Unknown solver {name:?}; available: [{}]", .available.join(", "))]
    UnknownSolver { name: String, available: Vec<String> },

    #[error("Solver binary {path:?} does not exist or is not a file")]
    MissingSolver { path: PathBuf },

    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Overview(#[from] OverviewError),
}

/// Per-seed scores of one batch, in the order the seeds were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub scores: Vec<(Seed, Score)>,
}

impl BatchReport {
    pub fn total(&self) -> Score {
        self.scores.iter().map(|&(_, score)| score).sum()
    }
}

impl Display for BatchReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (seed, score) in &self.scores {
            writeln!(f, "{seed}: {score}")?;
        }
        if !self.scores.is_empty() {
            writeln!(f, "Total score: {}", self.total())?;
        }
        Ok(())
    }
}

/// Build outputs whose name starts with this prefix are solvers; everything else in the
/// build directory (`Makefile`, `CMakeCache.txt`, ...) is not.
pub const SOLVER_PREFIX: &str = "v";

/// Names of all solver binaries in the configured solver directory, sorted.
pub fn available_solvers(config: &HarnessConfig) -> Result<Vec<String>, HarnessError> {
    let dir = &config.solver_dir;
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let io_err = |source| HarnessError::Io {
        path: dir.clone(),
        source,
    };

    let mut solvers = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str());
        if let Some(name) = name.filter(|n| n.starts_with(SOLVER_PREFIX)) {
            solvers.push(name.to_string());
        }
    }

    solvers.sort_unstable();
    Ok(solvers)
}

/// Maps a solver name to its binary.
pub fn resolve_solver(config: &HarnessConfig, name: &str) -> Result<PathBuf, HarnessError> {
    let available = available_solvers(config)?;
    if !available.iter().any(|s| s == name) {
        return Err(HarnessError::UnknownSolver {
            name: name.to_string(),
            available,
        });
    }
    Ok(config.solver_path(name))
}

/// Generates all missing inputs, then runs `solver` on every seed.
///
/// Both phases use a pool of `config.pool_size` workers and the second phase only starts
/// after the first one completed. The first failing seed aborts the batch.
pub async fn run_batch(
    config: Arc<HarnessConfig>,
    solver: &Path,
    seeds: &[Seed],
    output_dir: &Path,
) -> Result<BatchReport, HarnessError> {
    if !solver.is_file() {
        return Err(HarnessError::MissingSolver {
            path: solver.to_path_buf(),
        });
    }
    std::fs::create_dir_all(output_dir).map_err(|source| HarnessError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    info!("Generate inputs for {} seeds", seeds.len());
    run_ordered(config.pool_size, seeds.to_vec(), {
        let config = Arc::clone(&config);
        move |seed| {
            let config = Arc::clone(&config);
            async move { ensure_input(&config, seed).await }
        }
    })
    .await?;

    info!("Run {solver:?} on {} seeds", seeds.len());
    let solver: Arc<Path> = Arc::from(solver);
    let output_dir: Arc<Path> = Arc::from(output_dir);
    let scores = run_ordered(config.pool_size, seeds.to_vec(), {
        let config = Arc::clone(&config);
        move |seed| {
            let config = Arc::clone(&config);
            let solver = Arc::clone(&solver);
            let output_dir = Arc::clone(&output_dir);
            async move { run_solver(&config, &solver, seed, &output_dir).await }
        }
    })
    .await?;

    Ok(BatchReport {
        scores: seeds.iter().copied().zip(scores).collect(),
    })
}

/// Runs the solver called `name` on `seeds`, storing its output below the solver's
/// output directory.
pub async fn run(
    config: Arc<HarnessConfig>,
    name: &str,
    seeds: &[Seed],
) -> Result<BatchReport, HarnessError> {
    let solver = resolve_solver(&config, name)?;
    let output_dir = config.output_dir(name);
    run_batch(config, &solver, seeds, &output_dir).await
}
