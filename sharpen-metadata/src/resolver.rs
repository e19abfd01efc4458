//! Out-of-process metadata resolution
//!
//! The resolver is an external executable that inspects one foreign binary
//! and prints a single JSON message describing its public surface. It is
//! invoked synchronously, once per distinct binary, with the whole binary
//! search path joined by `;` followed by the target binary.
//!
//! There is no timeout: a hung resolver hangs the compilation.

use crate::cache::MetadataCache;
use crate::model::Assembly;
use crate::{MetadataError, Result};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Separator used when passing the binary search path to the resolver
pub const SEARCH_PATH_SEPARATOR: &str = ";";

/// Something that can produce the raw resolver reply for a binary
pub trait ResolverBackend {
    /// Return the resolver's entire standard output for `target`.
    fn invoke(&self, search_path: &str, target: &Path) -> Result<String>;
}

/// Runs the resolver executable as a child process
#[derive(Debug, Clone)]
pub struct SubprocessResolver {
    executable: PathBuf,
}

impl SubprocessResolver {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl ResolverBackend for SubprocessResolver {
    fn invoke(&self, search_path: &str, target: &Path) -> Result<String> {
        debug!(
            resolver = %self.executable.display(),
            target = %target.display(),
            "invoking metadata resolver"
        );

        let output = Command::new(&self.executable)
            .arg(search_path)
            .arg(target)
            .output()
            .map_err(|e| MetadataError::Spawn {
                executable: self.executable.clone(),
                error: e,
            })?;

        if !output.status.success() {
            return Err(MetadataError::ResolverFailed {
                binary: target.to_path_buf(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Session-scoped resolver: disk cache plus an in-memory memo so every
/// distinct binary is resolved at most once.
pub struct MetadataResolver<B: ResolverBackend> {
    backend: B,
    binary_paths: Vec<PathBuf>,
    cache: Option<MetadataCache>,
    resolved: IndexMap<PathBuf, Assembly>,
}

impl<B: ResolverBackend> MetadataResolver<B> {
    pub fn new(backend: B, binary_paths: Vec<PathBuf>) -> Self {
        Self {
            backend,
            binary_paths,
            cache: None,
            resolved: IndexMap::new(),
        }
    }

    pub fn with_cache(mut self, cache: MetadataCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn binary_paths(&self) -> &[PathBuf] {
        &self.binary_paths
    }

    /// All binary paths joined with [`SEARCH_PATH_SEPARATOR`].
    pub fn search_path(&self) -> String {
        join_search_path(&self.binary_paths)
    }

    /// Resolve one binary, consulting the memo and the disk cache first.
    pub fn resolve(&mut self, target: &Path) -> Result<Assembly> {
        if let Some(assembly) = self.resolved.get(target) {
            return Ok(assembly.clone());
        }

        if let Some(assembly) = self.cache.as_ref().and_then(|cache| cache.load(target)) {
            self.resolved.insert(target.to_path_buf(), assembly.clone());
            return Ok(assembly);
        }

        let raw = self.backend.invoke(&self.search_path(), target)?;
        let assembly = decode(target, &raw)?;

        if let Some(cache) = &self.cache {
            cache.store(target, &raw)?;
        }

        info!(
            binary = %target.display(),
            assembly = %assembly.name,
            types = assembly.types.len(),
            "resolved foreign metadata"
        );
        self.resolved.insert(target.to_path_buf(), assembly.clone());
        Ok(assembly)
    }

    /// Resolve every binary on the search path, keyed by assembly name.
    pub fn resolve_all(&mut self) -> Result<IndexMap<String, Assembly>> {
        let mut assemblies = IndexMap::new();
        for binary in self.binary_paths.clone() {
            let assembly = self.resolve(&binary)?;
            assemblies.insert(assembly.name.clone(), assembly);
        }
        Ok(assemblies)
    }
}

/// Decode a raw resolver reply, keeping the raw text on failure.
pub fn decode(binary: &Path, raw: &str) -> Result<Assembly> {
    serde_json::from_str(raw).map_err(|e| MetadataError::Decode {
        binary: binary.to_path_buf(),
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

pub fn join_search_path(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.to_string_lossy())
        .collect::<Vec<_>>()
        .join(SEARCH_PATH_SEPARATOR)
}

/// One-shot resolution of `target` with the resolver executable.
pub fn resolve(
    resolver_executable: &Path,
    all_binary_paths: &[PathBuf],
    target: &Path,
    cache_dir: &Path,
    use_cache: bool,
) -> Result<Assembly> {
    let mut resolver = MetadataResolver::new(
        SubprocessResolver::new(resolver_executable),
        all_binary_paths.to_vec(),
    );
    if use_cache {
        resolver = resolver.with_cache(MetadataCache::new(cache_dir)?);
    }
    resolver.resolve(target)
}
