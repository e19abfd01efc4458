//! On-disk cache of resolver replies
//!
//! One file per foreign binary, named `<binary-file-name>.resolved`, holding
//! the raw message exactly as the resolver printed it. A present entry that
//! decodes is a hit; anything else is a miss and the resolver runs again.

use crate::model::Assembly;
use crate::{MetadataError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix appended to the binary's file name.
pub const CACHE_SUFFIX: &str = "resolved";

/// Metadata cache rooted at a directory
#[derive(Debug, Clone)]
pub struct MetadataCache {
    cache_dir: PathBuf,
}

impl MetadataCache {
    pub fn new(cache_dir: &Path) -> Result<Self> {
        fs::create_dir_all(cache_dir).map_err(|e| MetadataError::io(cache_dir, e))?;

        Ok(Self {
            cache_dir: cache_dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache file path for a binary
    pub fn entry_path(&self, binary: &Path) -> PathBuf {
        let file_name = binary
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| binary.to_string_lossy().replace(['/', '\\'], "_"));

        self.cache_dir.join(format!("{}.{}", file_name, CACHE_SUFFIX))
    }

    /// Load a cached assembly. Absent or undecodable entries are misses.
    pub fn load(&self, binary: &Path) -> Option<Assembly> {
        let path = self.entry_path(binary);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!(path = %path.display(), "metadata cache miss");
                return None;
            }
        };

        match serde_json::from_str::<Assembly>(&raw) {
            Ok(assembly) => {
                debug!(path = %path.display(), "metadata cache hit");
                Some(assembly)
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring undecodable metadata cache entry"
                );
                None
            }
        }
    }

    /// Store the raw resolver reply for a binary
    pub fn store(&self, binary: &Path, raw: &str) -> Result<PathBuf> {
        let path = self.entry_path(binary);
        fs::write(&path, raw).map_err(|e| MetadataError::io(&path, e))?;
        debug!(path = %path.display(), bytes = raw.len(), "stored metadata cache entry");
        Ok(path)
    }

    /// Remove the entry for a binary, if present
    pub fn clear(&self, binary: &Path) -> Result<()> {
        let path = self.entry_path(binary);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| MetadataError::io(&path, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entry_naming() {
        let temp_dir = TempDir::new().unwrap();
        let cache = MetadataCache::new(temp_dir.path()).unwrap();

        let path = cache.entry_path(Path::new("/refs/netstandard.dll"));
        assert_eq!(path, temp_dir.path().join("netstandard.dll.resolved"));
    }

    #[test]
    fn test_store_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let cache = MetadataCache::new(temp_dir.path()).unwrap();
        let binary = Path::new("Geometry.dll");

        assert!(cache.load(binary).is_none());

        cache.store(binary, r#"{"name":"Geometry","types":[]}"#).unwrap();
        let loaded = cache.load(binary).unwrap();
        assert_eq!(loaded.name, "Geometry");

        cache.clear(binary).unwrap();
        assert!(cache.load(binary).is_none());
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let temp_dir = TempDir::new().unwrap();
        let cache = MetadataCache::new(temp_dir.path()).unwrap();
        let binary = Path::new("Broken.dll");

        cache.store(binary, "not json at all").unwrap();
        assert!(cache.load(binary).is_none());
    }
}
