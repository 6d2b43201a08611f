use std::io::Write;
use std::path::Path;
use std::process::Stdio;

use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::Seed;
use crate::config::HarnessConfig;

/// Location of the generated input inside the generator's working directory.
pub const GENERATED_INPUT: &str = "in/0000.txt";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generator failed for seed {seed}:\n{output}")]
    Generation { seed: Seed, output: String },

    #[error("I/O error while generating input for seed {seed}: {source}")]
    Io {
        seed: Seed,
        #[source]
        source: std::io::Error,
    },
}

/// Makes sure the input for `seed` exists in the cache, invoking the generator if it does not.
///
/// The generator runs in a fresh temporary directory and receives a temporary file holding
/// the seed; both are removed on every exit path. A failed generation leaves the cache
/// untouched, so the next call retries.
pub async fn ensure_input(config: &HarnessConfig, seed: Seed) -> Result<(), GenerationError> {
    let target = config.input_path(seed);
    if target.exists() {
        debug!("Input for seed {seed} is cached at {target:?}");
        return Ok(());
    }

    let io_err = |source| GenerationError::Io { seed, source };

    let mut seed_file = NamedTempFile::new().map_err(io_err)?;
    writeln!(seed_file, "{seed}").map_err(io_err)?;
    seed_file.flush().map_err(io_err)?;
    let work_dir = tempfile::tempdir().map_err(io_err)?;

    debug!("Generate input for seed {seed}");
    let output = Command::new(&config.generator)
        .arg(seed_file.path())
        .current_dir(work_dir.path())
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(io_err)?;

    if !output.status.success() {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(GenerationError::Generation {
            seed,
            output: combined,
        });
    }

    let content = std::fs::read(work_dir.path().join(GENERATED_INPUT)).map_err(io_err)?;
    persist_atomically(&target, &content).map_err(io_err)
}

/// Writes to a sibling temporary file and renames it over `target`, so concurrent readers
/// never observe a partial input.
fn persist_atomically(target: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = target
        .parent()
        .ok_or_else(|| std::io::Error::other(format!("{target:?} has no parent directory")))?;
    std::fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(content)?;
    file.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::tests::{Project, VERBATIM_GENERATOR};

    #[tokio::test]
    async fn generates_seed_file_content() {
        let project = Project::new(VERBATIM_GENERATOR, "");
        ensure_input(&project.config, 42).await.unwrap();

        let content = std::fs::read_to_string(project.config.input_path(42)).unwrap();
        assert_eq!(content, "42\n");
    }

    #[tokio::test]
    async fn second_call_is_cache_hit() {
        // counts invocations next to the project so a second generation would show up
        let project = Project::new(
            r#"counter="$(dirname "$0")/invocations"
echo x >> "$counter"
mkdir -p in
cp "$1" in/0000.txt
"#,
            "",
        );

        ensure_input(&project.config, 5).await.unwrap();
        let first = std::fs::read(project.config.input_path(5)).unwrap();
        ensure_input(&project.config, 5).await.unwrap();
        let second = std::fs::read(project.config.input_path(5)).unwrap();

        assert_eq!(first, second);
        let invocations =
            std::fs::read_to_string(project.root.path().join("scripts").join("invocations"))
                .unwrap();
        assert_eq!(invocations.lines().count(), 1);
    }

    #[tokio::test]
    async fn existing_file_is_never_regenerated() {
        let project = Project::new("exit 3\n", "");
        let path = project.config.input_path(9);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "handmade").unwrap();

        ensure_input(&project.config, 9).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "handmade");
    }

    #[tokio::test]
    async fn failed_generation_is_not_cached() {
        let project = Project::new("echo broken generator\nexit 1\n", "");

        let err = ensure_input(&project.config, 13).await.unwrap_err();
        match &err {
            GenerationError::Generation { seed, output } => {
                assert_eq!(*seed, 13);
                assert!(output.contains("broken generator"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().contains("13"));
        assert!(!project.config.input_path(13).exists());
    }

    #[tokio::test]
    async fn missing_artifact_is_an_error() {
        let project = Project::new("exit 0\n", "");
        let err = ensure_input(&project.config, 1).await.unwrap_err();
        assert!(matches!(err, GenerationError::Io { seed: 1, .. }));
        assert!(!project.config.input_path(1).exists());
    }

    #[tokio::test]
    async fn generation_is_deterministic_across_projects() {
        let a = Project::new(VERBATIM_GENERATOR, "");
        let b = Project::new(VERBATIM_GENERATOR, "");

        ensure_input(&a.config, 77).await.unwrap();
        ensure_input(&b.config, 77).await.unwrap();

        assert_eq!(
            std::fs::read(a.config.input_path(77)).unwrap(),
            std::fs::read(b.config.input_path(77)).unwrap()
        );
    }

    #[tokio::test]
    async fn generator_runs_in_empty_scratch_directory() {
        // refuses to run if anything but its own output is around
        let project = Project::new(
            r#"[ -z "$(ls -A)" ] || exit 1
mkdir -p in
cp "$1" in/0000.txt
"#,
            "",
        );
        ensure_input(&project.config, 2).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(project.config.input_path(2)).unwrap(),
            "2\n"
        );
    }
}
