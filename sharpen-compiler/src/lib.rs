//! Sharpen compiler
//!
//! Backend half of the cross-platform compiler: takes a resolved program and
//! foreign runtime metadata, lowers the program and renders target-language
//! source text.

pub mod codegen;
pub mod config;
pub mod frontend;
pub mod lowering;
pub mod pipeline;
pub mod session;
pub mod type_mapper;

pub use codegen::{Code, CodeGenerator, TextRenderer, UnsupportedShape, XmlRenderer};
pub use config::{CompilationMode, CompilerConfig, ConfigError};
pub use frontend::{Frontend, JsonFrontend, ResolvedProgram};
pub use lowering::{LoweringContext, LoweringPipeline};
pub use pipeline::{CompilationPipeline, PipelineResult, PipelineStage};
pub use session::CompilationSession;
pub use type_mapper::TypeMapper;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, CompilerError>;

/// Compile with the given configuration, writing output under its destination.
pub fn compile(config: CompilerConfig) -> Result<CompilationResult> {
    let mut pipeline = CompilationPipeline::new(config);
    pipeline.compile()
}

/// Compilation result
#[derive(Debug)]
pub struct CompilationResult {
    /// Written files in emission order, with their content
    pub files: Vec<(PathBuf, String)>,
    pub diagnostics: Vec<CompilerDiagnostic>,
    pub metadata: CompilationMetadata,
}

impl CompilationResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    pub fn file(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(path, _)| path.file_name().is_some_and(|f| f == name))
            .map(|(_, content)| content.as_str())
    }
}

/// Compilation metadata
#[derive(Debug, Default)]
pub struct CompilationMetadata {
    pub symbols_time: Duration,
    pub frontend_time: Duration,
    pub lowering_time: Duration,
    pub codegen_time: Duration,
    pub total_time: Duration,
    pub synthesized_classes: usize,
    pub skipped_types: usize,
    pub lowering_passes: Vec<String>,
    pub generated_files: usize,
    pub total_output_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

/// Source of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSource {
    Configuration,
    Metadata,
    Synthesis,
    Frontend,
    Lowering,
    CodeGenerator,
    Writer,
}

/// Compiler diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerDiagnostic {
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub source: DiagnosticSource,
}

impl fmt::Display for CompilerDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
        };
        write!(f, "{}[{:?}]: {}", severity, self.source, self.message)
    }
}

/// Diagnostics sink shared by every phase of a compilation
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<CompilerDiagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(
        &mut self,
        severity: DiagnosticSeverity,
        source: DiagnosticSource,
        message: impl Into<String>,
    ) {
        self.entries.push(CompilerDiagnostic {
            severity,
            message: message.into(),
            source,
        });
    }

    pub fn error(&mut self, source: DiagnosticSource, message: impl Into<String>) {
        self.report(DiagnosticSeverity::Error, source, message);
    }

    pub fn warning(&mut self, source: DiagnosticSource, message: impl Into<String>) {
        self.report(DiagnosticSeverity::Warning, source, message);
    }

    pub fn info(&mut self, source: DiagnosticSource, message: impl Into<String>) {
        self.report(DiagnosticSeverity::Info, source, message);
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompilerDiagnostic> {
        self.entries.iter()
    }

    /// Entries reported since `mark`, a previous `len()`.
    pub fn since(&self, mark: usize) -> Vec<CompilerDiagnostic> {
        self.entries.get(mark..).map(<[_]>::to_vec).unwrap_or_default()
    }

    pub fn into_vec(self) -> Vec<CompilerDiagnostic> {
        self.entries
    }
}

/// Compiler errors
#[derive(Debug, thiserror::Error)]
pub enum CompilerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] sharpen_metadata::MetadataError),

    #[error("Symbol error: {0}")]
    Symbols(#[from] sharpen_symbols::SymbolError),

    #[error("Cannot read program {path:?}: {message}")]
    Program { path: PathBuf, message: String },

    #[error("Frontend reported {errors} error(s)")]
    Frontend { errors: usize },

    #[error("Code generation failed: {message}")]
    CodeGen { message: String },

    #[error("I/O error for {path:?}: {error}")]
    Io { path: PathBuf, error: std::io::Error },

    #[error("Generic error: {0}")]
    Generic(String),
}

impl CompilerError {
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        CompilerError::Io {
            path: path.into(),
            error,
        }
    }
}

impl From<String> for CompilerError {
    fn from(s: String) -> Self {
        CompilerError::Generic(s)
    }
}

impl From<&str> for CompilerError {
    fn from(s: &str) -> Self {
        CompilerError::Generic(s.to_string())
    }
}

/// Compiler builder for fluent configuration
pub struct CompilerBuilder {
    config: CompilerConfig,
}

impl CompilerBuilder {
    pub fn new() -> Self {
        Self {
            config: CompilerConfig::default(),
        }
    }

    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.inputs.push(path.into());
        self
    }

    pub fn destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.destination = path.into();
        self
    }

    pub fn binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.binary_paths.push(path.into());
        self
    }

    pub fn resolver(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.resolver = Some(path.into());
        self
    }

    pub fn mode(mut self, mode: CompilationMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn emit_dumps(mut self, enabled: bool) -> Self {
        self.config.emit_dumps = enabled;
        self
    }

    pub fn build(self) -> CompilationPipeline {
        CompilationPipeline::new(self.config)
    }
}

impl Default for CompilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiler_builder() {
        let pipeline = CompilerBuilder::new()
            .input("main.json")
            .destination("build")
            .mode(CompilationMode::Stdlib)
            .emit_dumps(true)
            .build();

        let config = pipeline.config();
        assert_eq!(config.inputs, vec![PathBuf::from("main.json")]);
        assert_eq!(config.destination, PathBuf::from("build"));
        assert_eq!(config.mode, CompilationMode::Stdlib);
        assert!(config.emit_dumps);
    }

    #[test]
    fn test_diagnostics_sink() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.info(DiagnosticSource::Synthesis, "skipped 1 type");
        let mark = diagnostics.len();
        assert!(!diagnostics.has_errors());

        diagnostics.error(DiagnosticSource::Frontend, "unresolved class Shapes/Circle");
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.error_count(), 1);
        let recent = diagnostics.since(mark);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].to_string(), "error[Frontend]: unresolved class Shapes/Circle");
        assert!(diagnostics.since(10).is_empty());
    }
}
