pub mod input_cache;
pub mod overview;

#[cfg(test)]
pub(crate) mod tests {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::Duration;

    use tempfile::TempDir;

    use crate::config::HarnessConfig;

    pub(crate) const SOLVER: &str = "v01";

    /// Copies the seed file verbatim to where the harness expects the generated input.
    pub(crate) const VERBATIM_GENERATOR: &str = "mkdir -p in\ncp \"$1\" in/0000.txt\n";

    /// Reports a cost of `seed * 100` for an input consisting of the seed.
    pub(crate) const SEED_TIMES_100_TESTER: &str =
        "read seed\necho \"solver output $seed\"\necho \"Total Cost = $((seed * 100))\" >&2\n";

    /// Scratch contest project with shell scripts standing in for generator and tester.
    pub(crate) struct Project {
        pub(crate) root: TempDir,
        pub(crate) config: HarnessConfig,
    }

    impl Project {
        pub(crate) fn new(generator: &str, tester: &str) -> Self {
            let root = tempfile::tempdir().unwrap();
            let mut config = HarnessConfig::from_project_root(root.path());
            config.timeout = Duration::from_secs(5);
            config.pool_size = 4;

            write_script(&config.generator, generator);
            write_script(&config.tester, tester);
            write_script(&config.solver_path(SOLVER), "exit 0\n");

            Self { root, config }
        }
    }

    pub(crate) fn write_script(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("#!/bin/sh\n{body}")).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
