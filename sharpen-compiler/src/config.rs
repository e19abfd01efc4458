//! Compiler configuration and settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default directory for cached resolver replies, relative to the destination
pub const DEFAULT_CACHE_DIR: &str = ".sharpen-cache";

/// Main compiler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Name of the compiled module
    pub module_name: String,
    /// Pre-resolved program files (JSON) handed over by the frontend
    pub inputs: Vec<PathBuf>,
    /// Output directory
    pub destination: PathBuf,
    /// Foreign binaries whose metadata is synthesized into symbols
    pub binary_paths: Vec<PathBuf>,
    /// Target-runtime reference-assembly home
    pub runtime_home: Option<PathBuf>,
    /// Metadata resolver executable
    pub resolver: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub use_cache: bool,
    pub no_stdlib: bool,
    pub no_runtime_support: bool,
    pub mode: CompilationMode,
    pub emit_dumps: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            module_name: "main".to_string(),
            inputs: Vec::new(),
            destination: PathBuf::from("out"),
            binary_paths: Vec::new(),
            runtime_home: None,
            resolver: None,
            cache_dir: None,
            use_cache: true,
            no_stdlib: false,
            no_runtime_support: false,
            mode: CompilationMode::Program,
            emit_dumps: false,
        }
    }
}

/// What is being compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilationMode {
    /// Ordinary program against foreign metadata
    #[default]
    Program,
    /// The standard library itself, against the hand-built built-ins
    Stdlib,
}

impl CompilerConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e,
        })
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize { error: e })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                error: e,
            })?;
        }

        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e,
        })
    }

    /// Cache directory, defaulting to one under the destination.
    pub fn effective_cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| self.destination.join(DEFAULT_CACHE_DIR))
    }

    /// Foreign metadata is synthesized only for ordinary programs with runtime support.
    pub fn uses_metadata(&self) -> bool {
        self.mode == CompilationMode::Program && !self.no_runtime_support
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.module_name.trim().is_empty() {
            return Err(ConfigError::invalid("module_name", "Module name must not be empty"));
        }

        if self.destination.as_os_str().is_empty() {
            return Err(ConfigError::invalid("destination", "Destination directory is required"));
        }

        if self.mode == CompilationMode::Stdlib && self.no_stdlib {
            return Err(ConfigError::invalid(
                "no_stdlib",
                "Cannot compile the standard library with no_stdlib set",
            ));
        }

        if self.uses_metadata() && !self.binary_paths.is_empty() && self.resolver.is_none() {
            return Err(ConfigError::invalid(
                "resolver",
                "A metadata resolver is required to load foreign binaries",
            ));
        }

        if let Some(home) = &self.runtime_home {
            if !home.is_dir() {
                return Err(ConfigError::invalid(
                    "runtime_home",
                    &format!("Runtime reference home {:?} is not a directory", home),
                ));
            }
        }

        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(&mut self, other: CompilerConfig) {
        let defaults = CompilerConfig::default();
        if other.module_name != defaults.module_name {
            self.module_name = other.module_name;
        }
        if other.destination != defaults.destination {
            self.destination = other.destination;
        }
        if other.runtime_home.is_some() {
            self.runtime_home = other.runtime_home;
        }
        if other.resolver.is_some() {
            self.resolver = other.resolver;
        }
        if other.cache_dir.is_some() {
            self.cache_dir = other.cache_dir;
        }
        if !other.use_cache {
            self.use_cache = false;
        }
        if other.no_stdlib {
            self.no_stdlib = true;
        }
        if other.no_runtime_support {
            self.no_runtime_support = true;
        }
        if other.mode != CompilationMode::default() {
            self.mode = other.mode;
        }
        if other.emit_dumps {
            self.emit_dumps = true;
        }

        for input in other.inputs {
            if !self.inputs.contains(&input) {
                self.inputs.push(input);
            }
        }
        for path in other.binary_paths {
            if !self.binary_paths.contains(&path) {
                self.binary_paths.push(path);
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error for {path:?}: {error}")]
    Io { path: PathBuf, error: std::io::Error },

    #[error("Parse error for {path:?}: {error}")]
    Parse { path: PathBuf, error: toml::de::Error },

    #[error("Serialization error: {error}")]
    Serialize { error: toml::ser::Error },

    #[error("Invalid configuration for {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: &str, message: &str) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CompilerConfig::default();
        assert_eq!(config.mode, CompilationMode::Program);
        assert!(config.use_cache);
        assert!(!config.emit_dumps);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CompilerConfig::default();
        config.binary_paths.push(PathBuf::from("Shapes.dll"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "resolver"
        ));

        config.resolver = Some(PathBuf::from("resolver"));
        assert!(config.validate().is_ok());

        config.no_runtime_support = true;
        config.resolver = None;
        assert!(config.validate().is_ok());

        config.mode = CompilationMode::Stdlib;
        config.no_stdlib = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_runtime_home_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = CompilerConfig::default();
        config.runtime_home = Some(temp_dir.path().join("missing"));
        assert!(config.validate().is_err());

        config.runtime_home = Some(temp_dir.path().to_path_buf());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("sharpen.toml");

        let mut config = CompilerConfig::default();
        config.emit_dumps = true;
        config.mode = CompilationMode::Stdlib;
        config.binary_paths.push(PathBuf::from("lib/Shapes.dll"));

        config.to_file(&config_path).unwrap();
        let loaded = CompilerConfig::from_file(&config_path).unwrap();

        assert_eq!(loaded, config);
        let text = std::fs::read_to_string(&config_path).unwrap();
        assert!(text.contains("mode = \"stdlib\""));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sharpen.toml");
        std::fs::write(&config_path, "emit_dumps = true\n").unwrap();

        let loaded = CompilerConfig::from_file(&config_path).unwrap();
        assert!(loaded.emit_dumps);
        assert_eq!(loaded.module_name, "main");
    }

    #[test]
    fn test_config_merge() {
        let mut base = CompilerConfig::default();
        base.binary_paths.push(PathBuf::from("a.dll"));

        let mut overrides = CompilerConfig::default();
        overrides.use_cache = false;
        overrides.destination = PathBuf::from("build");
        overrides.binary_paths = vec![PathBuf::from("a.dll"), PathBuf::from("b.dll")];

        base.merge(overrides);

        assert!(!base.use_cache);
        assert_eq!(base.destination, PathBuf::from("build"));
        assert_eq!(base.binary_paths.len(), 2);
        assert_eq!(base.effective_cache_dir(), PathBuf::from("build").join(DEFAULT_CACHE_DIR));
    }
}
