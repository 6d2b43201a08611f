use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::HarnessConfig;
use crate::{DEFAULT_SEEDS, Seed};

#[derive(Debug, Parser)]
#[command(version, about = "Local benchmark harness for heuristic contest solvers")]
pub struct Arguments {
    /// Contest project containing scripts/, cmake-build-release/ and results/
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Wall-clock limit per run in seconds
    #[arg(long, global = true, value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Number of parallel workers [default: available cores - 2]
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// HTML template for the overview
    #[arg(long, global = true)]
    pub template: Option<PathBuf>,

    /// Higher scores are better (the overview highlights the maximum)
    #[arg(long, global = true)]
    pub maximize: bool,

    /// Visualizer URL linked from the overview; `$SEED$` and `$SOLVER$` are substituted
    #[arg(long, global = true)]
    pub visualizer_link: Option<String>,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a solver on a set of seeds and rebuild the overview
    Run {
        /// Name of the solver binary
        solver: String,

        /// Seed to run; may be repeated [default: 0 to 99]
        #[arg(short, long = "seed")]
        seeds: Vec<Seed>,
    },

    /// List the available solvers
    List,

    /// Rebuild the overview from the results on disk
    Overview,

    /// Print digests of the cached inputs
    #[cfg(feature = "with_digest")]
    Digest {
        #[arg(short, long = "seed")]
        seeds: Vec<Seed>,
    },
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let secs: f64 = value.parse().map_err(|e| format!("{e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{e}"))
}

/// Explicit seeds, or the default range if there are none.
pub fn seeds_or_default(seeds: &[Seed]) -> Vec<Seed> {
    if seeds.is_empty() {
        DEFAULT_SEEDS.collect()
    } else {
        seeds.to_vec()
    }
}

impl Arguments {
    pub fn config(&self) -> HarnessConfig {
        let mut config = HarnessConfig::from_project_root(&self.root);
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(jobs) = self.jobs {
            config.pool_size = jobs.max(1);
        }
        config.overview_template = self.template.clone();
        config.maximizing = self.maximize;
        config.visualizer_link = self.visualizer_link.clone();
        config
    }

    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(if self.verbose {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            })
            .without_time()
            .init();
    }
}
