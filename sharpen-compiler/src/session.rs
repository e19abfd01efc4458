//! Compilation session
//!
//! Owns everything one compilation shares between its phases: the
//! configuration, the symbols the program is compiled against, the
//! diagnostics sink and the type mapper. Phases borrow it; nothing is
//! global.

use crate::config::{CompilationMode, CompilerConfig};
use crate::type_mapper::TypeMapper;
use crate::{DiagnosticSource, Diagnostics, Result};
use sharpen_ir::IrModule;
use sharpen_metadata::{MetadataCache, MetadataResolver, ResolverBackend, SubprocessResolver};
use sharpen_symbols::{
    synthesize, ActualizationReport, BuiltinsProvider, LayeredSymbols, SymbolGraph, SynthesisReport,
};
use tracing::{debug, info, warn};

pub struct CompilationSession {
    config: CompilerConfig,
    foreign: SymbolGraph,
    builtins: Option<BuiltinsProvider>,
    synthesis: Option<SynthesisReport>,
    diagnostics: Diagnostics,
    mapper: TypeMapper,
}

impl CompilationSession {
    /// Validates `config`; configuration problems are fatal.
    pub fn new(config: CompilerConfig) -> Result<Self> {
        config.validate()?;
        Ok(CompilationSession {
            config,
            foreign: SymbolGraph::new(),
            builtins: None,
            synthesis: None,
            diagnostics: Diagnostics::new(),
            mapper: TypeMapper::new(),
        })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn mapper(&self) -> TypeMapper {
        self.mapper
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn synthesis_report(&self) -> Option<&SynthesisReport> {
        self.synthesis.as_ref()
    }

    /// Symbols the program is compiled against. Ordinary programs see the
    /// foreign graph first, then the built-ins; the standard library sees
    /// only the built-ins.
    pub fn symbols(&self) -> LayeredSymbols<'_> {
        layers(&self.config, &self.foreign, self.builtins.as_ref())
    }

    /// Split borrow of the symbols and the diagnostics sink.
    pub fn symbols_and_diagnostics(&mut self) -> (LayeredSymbols<'_>, &mut Diagnostics) {
        let symbols = layers(&self.config, &self.foreign, self.builtins.as_ref());
        (symbols, &mut self.diagnostics)
    }

    /// Build the symbol source for the configured mode, resolving foreign
    /// binaries through the configured resolver executable.
    pub fn load_symbols(&mut self) -> Result<()> {
        match self.config.resolver.clone() {
            Some(resolver) if self.config.uses_metadata() => {
                self.load_symbols_with(SubprocessResolver::new(resolver))
            }
            _ => self.load_symbols_with(NoResolver),
        }
    }

    /// Like [`load_symbols`](Self::load_symbols) with an explicit resolver backend.
    pub fn load_symbols_with<B: ResolverBackend>(&mut self, backend: B) -> Result<()> {
        if self.config.mode == CompilationMode::Stdlib || !self.config.no_stdlib {
            self.builtins = Some(BuiltinsProvider::new()?);
        }
        if self.config.mode == CompilationMode::Stdlib {
            info!("Compiling the standard library against built-ins");
            return Ok(());
        }
        if !self.config.uses_metadata() || self.config.binary_paths.is_empty() {
            debug!("No foreign metadata to load");
            return Ok(());
        }

        let mut resolver = MetadataResolver::new(backend, self.config.binary_paths.clone());
        if self.config.use_cache {
            resolver = resolver.with_cache(MetadataCache::new(&self.config.effective_cache_dir())?);
        }
        let assemblies = match resolver.resolve_all() {
            Ok(assemblies) => assemblies,
            Err(error) => {
                self.diagnostics.error(DiagnosticSource::Metadata, error.to_string());
                return Err(error.into());
            }
        };

        let (graph, report) = synthesize(&assemblies);
        for skipped in report.anomalies() {
            warn!("Skipped {} from {}: {}", skipped.type_name, skipped.assembly, skipped.reason);
            self.diagnostics.warning(
                DiagnosticSource::Synthesis,
                format!(
                    "skipped {} from {}: {}",
                    skipped.type_name, skipped.assembly, skipped.reason
                ),
            );
        }
        info!(
            "Synthesized {} classes and {} functions from {} assemblies",
            report.classes,
            report.functions,
            assemblies.len()
        );
        self.foreign = graph;
        self.synthesis = Some(report);
        Ok(())
    }

    /// Replace the foreign symbol graph, e.g. one synthesized elsewhere.
    pub fn set_foreign_symbols(&mut self, graph: SymbolGraph, report: SynthesisReport) {
        self.foreign = graph;
        self.synthesis = Some(report);
    }

    /// Unify placeholder classes of `module` with the built-ins they stand for.
    pub fn actualize(&mut self, module: &mut IrModule) -> Result<ActualizationReport> {
        if self.config.no_stdlib {
            return Ok(ActualizationReport::default());
        }
        let builtins = match self.builtins.take() {
            Some(builtins) => builtins,
            None => BuiltinsProvider::new()?,
        };
        let report = builtins.actualize(module);
        for placeholder in &report.unknown {
            self.diagnostics.warning(
                DiagnosticSource::Frontend,
                format!("no built-in declaration for placeholder {}", placeholder),
            );
        }
        self.builtins = Some(builtins);
        Ok(report)
    }
}

fn layers<'a>(
    config: &CompilerConfig,
    foreign: &'a SymbolGraph,
    builtins: Option<&'a BuiltinsProvider>,
) -> LayeredSymbols<'a> {
    let mut symbols = LayeredSymbols::new();
    if config.mode == CompilationMode::Program {
        symbols.push(foreign);
    }
    if let Some(builtins) = builtins {
        symbols.push(builtins);
    }
    symbols
}

/// Backend used when no resolver is configured; never invoked because no
/// binaries are resolved without one.
struct NoResolver;

impl ResolverBackend for NoResolver {
    fn invoke(
        &self,
        _search_path: &str,
        target: &std::path::Path,
    ) -> sharpen_metadata::Result<String> {
        Err(sharpen_metadata::MetadataError::ResolverFailed {
            binary: target.to_path_buf(),
            status: None,
            stderr: "no metadata resolver configured".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompilerError;
    use sharpen_ir::ClassId;
    use sharpen_metadata::{Assembly, TypeInfo};
    use sharpen_symbols::SymbolProvider;
    use std::cell::Cell;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    struct FakeResolver<'a> {
        reply: String,
        calls: &'a Cell<usize>,
    }

    impl ResolverBackend for FakeResolver<'_> {
        fn invoke(&self, _search_path: &str, _target: &Path) -> sharpen_metadata::Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.reply.clone())
        }
    }

    fn shapes_reply() -> String {
        let mut assembly = Assembly::new("Shapes");
        assembly.types.push(TypeInfo::new("Shapes", "Rectangle"));
        serde_json::to_string(&assembly).unwrap()
    }

    fn program_config(dir: &TempDir) -> CompilerConfig {
        CompilerConfig {
            destination: dir.path().join("out"),
            binary_paths: vec![PathBuf::from("Shapes.dll")],
            resolver: Some(PathBuf::from("resolver")),
            ..CompilerConfig::default()
        }
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let config = CompilerConfig {
            module_name: String::new(),
            ..CompilerConfig::default()
        };
        assert!(matches!(CompilationSession::new(config), Err(CompilerError::Config(_))));
    }

    #[test]
    fn test_loads_foreign_symbols_and_caches() {
        let dir = TempDir::new().unwrap();
        let calls = Cell::new(0);

        for _ in 0..2 {
            let mut session = CompilationSession::new(program_config(&dir)).unwrap();
            let backend = FakeResolver {
                reply: shapes_reply(),
                calls: &calls,
            };
            session.load_symbols_with(backend).unwrap();
            assert!(session.symbols().contains_class(&ClassId::new("Shapes", "Rectangle")));
            assert!(session.synthesis_report().is_some());
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_metadata_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let calls = Cell::new(0);
        let mut session = CompilationSession::new(program_config(&dir)).unwrap();
        let backend = FakeResolver {
            reply: "not an assembly".to_string(),
            calls: &calls,
        };
        assert!(matches!(session.load_symbols_with(backend), Err(CompilerError::Metadata(_))));
        assert!(session.diagnostics().has_errors());
    }

    #[test]
    fn test_program_symbols_include_builtins() {
        let dir = TempDir::new().unwrap();
        let calls = Cell::new(0);
        let mut session = CompilationSession::new(program_config(&dir)).unwrap();
        let backend = FakeResolver {
            reply: shapes_reply(),
            calls: &calls,
        };
        session.load_symbols_with(backend).unwrap();
        assert_eq!(session.symbols().len(), 2);
        assert!(session.symbols().contains_class(&sharpen_ir::well_known::string()));

        let config = CompilerConfig {
            no_stdlib: true,
            ..program_config(&dir)
        };
        let mut session = CompilationSession::new(config).unwrap();
        let backend = FakeResolver {
            reply: shapes_reply(),
            calls: &calls,
        };
        session.load_symbols_with(backend).unwrap();
        assert_eq!(session.symbols().len(), 1);
        assert!(!session.symbols().contains_class(&sharpen_ir::well_known::string()));
    }

    #[test]
    fn test_stdlib_mode_uses_builtins() {
        let config = CompilerConfig {
            mode: CompilationMode::Stdlib,
            ..CompilerConfig::default()
        };
        let mut session = CompilationSession::new(config).unwrap();
        session.load_symbols().unwrap();
        assert!(session.symbols().contains_class(&sharpen_ir::well_known::int()));
    }
}
