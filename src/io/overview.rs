use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::Score;
use crate::config::HarnessConfig;
use crate::score::read_score;

/// Token in the template that is replaced by the JSON encoded [`Overview`].
pub const PLACEHOLDER: &str = "$OVERVIEW_DATA$";

/// Replaced by `true` if higher scores are better, `false` otherwise.
pub const MAXIMIZING_PLACEHOLDER: &str = "$MAXIMIZING$";

/// Replaced by the JSON string of the visualizer link template, or `null`. The template
/// itself contains [`SEED_TOKEN`] and [`SOLVER_TOKEN`], filled in per cell by the page.
pub const VISUALIZER_LINK_PLACEHOLDER: &str = "$VISUALIZER_LINK$";

pub const SEED_TOKEN: &str = "$SEED$";
pub const SOLVER_TOKEN: &str = "$SOLVER$";

/// Extension of the captured stderr files the scores are read from.
pub const ERR_EXTENSION: &str = "err";

const BUILTIN_TEMPLATE: &str = include_str!("overview.html");

/// Solver name -> seed -> score.
pub type Overview = BTreeMap<String, BTreeMap<String, Score>>;

#[derive(Debug, Error)]
pub enum OverviewError {
    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template {path:?} does not contain {}", PLACEHOLDER)]
    MissingPlaceholder { path: PathBuf },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> OverviewError + '_ {
    move |source| OverviewError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Collects the scores of every solver and seed found below `output_root`.
///
/// The first level holds one directory per solver, the second level the captured
/// `<seed>.err` files. Anything else is skipped. A missing `output_root` yields an
/// empty overview.
pub fn collect_scores(output_root: &Path) -> Result<Overview, OverviewError> {
    let mut overview = Overview::new();
    if !output_root.is_dir() {
        debug!("No results below {output_root:?} yet");
        return Ok(overview);
    }

    for solver_entry in fs::read_dir(output_root).map_err(io_error(output_root))? {
        let solver_dir = solver_entry.map_err(io_error(output_root))?.path();
        if !solver_dir.is_dir() {
            continue;
        }
        let Some(solver) = solver_dir.file_name().and_then(|n| n.to_str()) else {
            warn!("Skip solver directory with non UTF-8 name {solver_dir:?}");
            continue;
        };

        let scores = overview.entry(solver.to_string()).or_default();

        for run_entry in fs::read_dir(&solver_dir).map_err(io_error(&solver_dir))? {
            let path = run_entry.map_err(io_error(&solver_dir))?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != ERR_EXTENSION) {
                continue;
            }
            let Some(seed) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let score = read_score(&path).map_err(io_error(&path))?;
            scores.insert(seed.to_string(), score);
        }
    }

    Ok(overview)
}

/// Fills the placeholders of `template` with the JSON encoded overview, the score
/// direction and the visualizer link.
pub fn render(
    template: &str,
    overview: &Overview,
    maximizing: bool,
    visualizer_link: Option<&str>,
) -> Result<String, OverviewError> {
    let link = serde_json::to_string(&visualizer_link)?;
    let data = serde_json::to_string(overview)?;
    Ok(template
        .replace(MAXIMIZING_PLACEHOLDER, &maximizing.to_string())
        .replace(VISUALIZER_LINK_PLACEHOLDER, &link)
        .replace(PLACEHOLDER, &data))
}

/// Rebuilds the overview file from all results on disk and returns its path.
pub fn update_overview(config: &HarnessConfig) -> Result<PathBuf, OverviewError> {
    let overview = collect_scores(&config.output_root())?;

    let template = match &config.overview_template {
        Some(path) => {
            let template = fs::read_to_string(path).map_err(io_error(path))?;
            if !template.contains(PLACEHOLDER) {
                return Err(OverviewError::MissingPlaceholder { path: path.clone() });
            }
            template
        }
        None => BUILTIN_TEMPLATE.to_string(),
    };

    let html = render(
        &template,
        &overview,
        config.maximizing,
        config.visualizer_link.as_deref(),
    )?;

    let target = config.overview_path();
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    fs::write(&target, html).map_err(io_error(&target))?;

    info!("Wrote overview of {} solvers to {target:?}", overview.len());
    Ok(target)
}
