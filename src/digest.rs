use std::fmt::{Display, Formatter};

use digest::Digest;
use sha2::Sha256;

use crate::Seed;
use crate::config::HarnessConfig;

type Algo = Sha256;

/// Hex encoded SHA-256 of a cached input. Two projects generated the same input for a
/// seed iff their digests agree.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct InputDigest(String);

impl InputDigest {
    pub fn of(content: &[u8]) -> Self {
        let digest = Algo::digest(content);
        Self(format!("{digest:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for InputDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digest of the cached input for `seed`; fails if it has not been generated yet.
pub fn input_digest(config: &HarnessConfig, seed: Seed) -> std::io::Result<InputDigest> {
    Ok(InputDigest::of(&std::fs::read(config.input_path(seed))?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            InputDigest::of(b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            InputDigest::of(b"abc").to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_of_cached_input() {
        let root = tempfile::tempdir().unwrap();
        let config = HarnessConfig::from_project_root(root.path());
        assert!(input_digest(&config, 3).is_err());

        std::fs::create_dir_all(config.input_dir()).unwrap();
        std::fs::write(config.input_path(3), "3\n").unwrap();
        std::fs::write(config.input_path(4), "4\n").unwrap();

        let a = input_digest(&config, 3).unwrap();
        assert_eq!(a, InputDigest::of(b"3\n"));
        assert_ne!(a, input_digest(&config, 4).unwrap());
    }
}
