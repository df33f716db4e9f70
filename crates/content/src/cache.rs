//! Content-addressed text cache
//!
//! Providers that lean on expensive upstream calls (LLM annotation, page
//! refinement) cache their results between runs. The contract is a plain
//! key/value store; the file implementation hashes the identifier so
//! arbitrarily long prompts make valid file names.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Key/value contract for caching provider computations.
pub trait TextCache {
    /// Fetch the cached value for `key`, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    fn put(&self, key: &str, value: &str) -> std::io::Result<()>;
}

/// File-backed cache keyed by the SHA-256 of the identifier.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        self.dir.join(format!("{:x}.txt", hasher.finalize()))
    }
}

impl TextCache for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.entry_path(key)).ok()
    }

    fn put(&self, key: &str, value: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.entry_path(key);
        if path.exists() {
            tracing::warn!(path = %path.display(), "overwriting existing cache entry");
        }
        fs::write(path, value)
    }
}
