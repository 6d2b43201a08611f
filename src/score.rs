use std::fs;
use std::io;
use std::path::Path;

use tracing::warn;

use crate::Score;

pub const SCORE_PREFIX: &str = "Total Cost = ";

/// Extracts the score from the first line starting with [`SCORE_PREFIX`].
///
/// A missing score line is a valid outcome and yields 0. So does a score line whose
/// value is not a non-negative integer; that case is logged.
pub fn parse_score(stderr: &str) -> Score {
    let Some(value) = stderr
        .lines()
        .find_map(|line| line.strip_prefix(SCORE_PREFIX))
    else {
        return 0;
    };

    match value.trim().parse() {
        Ok(score) => score,
        Err(e) => {
            warn!("Malformed score line {SCORE_PREFIX:?}{value:?}: {e}");
            0
        }
    }
}

/// Reads a captured stderr file and parses its score. Invalid UTF-8 is replaced, not rejected.
pub fn read_score(path: &Path) -> io::Result<Score> {
    let bytes = fs::read(path)?;
    Ok(parse_score(&String::from_utf8_lossy(&bytes)))
}
