use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Seed;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Number of cores left to the rest of the system when sizing the worker pool.
const RESERVED_CORES: usize = 2;

/// Everything the harness needs to locate executables and persisted state.
///
/// Built once at startup and handed to every component; nothing in the crate reads
/// paths or limits from anywhere else.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub generator: PathBuf,
    pub tester: PathBuf,
    pub solver_dir: PathBuf,
    pub results_dir: PathBuf,
    /// HTML template for the overview; the built-in one is used if `None`.
    pub overview_template: Option<PathBuf>,
    pub timeout: Duration,
    pub pool_size: usize,
    /// Higher scores are better; only affects how the overview ranks solvers.
    pub maximizing: bool,
    /// Visualizer URL with `$SEED$` and `$SOLVER$` tokens, linked from every overview cell.
    pub visualizer_link: Option<String>,
}

impl HarnessConfig {
    /// Default layout of a contest project rooted at `root`.
    pub fn from_project_root(root: &Path) -> Self {
        Self {
            generator: root.join("scripts").join("gen"),
            tester: root.join("scripts").join("tester"),
            solver_dir: root.join("cmake-build-release"),
            results_dir: root.join("results"),
            overview_template: None,
            timeout: DEFAULT_TIMEOUT,
            pool_size: default_pool_size(),
            maximizing: false,
            visualizer_link: None,
        }
    }

    pub fn input_dir(&self) -> PathBuf {
        self.results_dir.join("in")
    }

    pub fn input_path(&self, seed: Seed) -> PathBuf {
        self.input_dir().join(format!("{seed}.txt"))
    }

    /// Root of all captured run output; one subdirectory per solver.
    pub fn output_root(&self) -> PathBuf {
        self.results_dir.join("out")
    }

    pub fn output_dir(&self, solver: &str) -> PathBuf {
        self.output_root().join(solver)
    }

    pub fn overview_path(&self) -> PathBuf {
        self.results_dir.join("overview.html")
    }

    pub fn solver_path(&self, solver: &str) -> PathBuf {
        self.solver_dir.join(solver)
    }
}

pub fn default_pool_size() -> usize {
    pool_size_for(std::thread::available_parallelism().map_or(1, |n| n.get()))
}

fn pool_size_for(cores: usize) -> usize {
    cores.saturating_sub(RESERVED_CORES).max(1)
}
