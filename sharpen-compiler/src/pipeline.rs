//! Compilation pipeline for orchestrating the compilation process

use crate::codegen::{CodeGenerator, TextRenderer, XmlRenderer, SOURCE_EXTENSION};
use crate::frontend::{Frontend, JsonFrontend, ResolvedProgram};
use crate::lowering::{LoweringContext, LoweringPipeline, LoweringReport};
use crate::session::CompilationSession;
use crate::{
    config::CompilerConfig, CompilationMetadata, CompilationResult, CompilerDiagnostic,
    CompilerError, DiagnosticSource, Diagnostics, Result,
};
use sharpen_ir::dump::dump_file;
use sharpen_ir::IrModule;
use sharpen_symbols::ActualizationReport;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Compilation pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Configure,
    LoadSymbols,
    Frontend,
    Actualize,
    Lower,
    CodeGen,
    Write,
}

/// Pipeline stage result
#[derive(Debug)]
pub struct PipelineResult<T> {
    pub stage: PipelineStage,
    pub result: T,
    pub duration: Duration,
    pub diagnostics: Vec<CompilerDiagnostic>,
}

/// Compilation pipeline
pub struct CompilationPipeline {
    config: CompilerConfig,
    frontend: Option<Box<dyn Frontend>>,
}

impl CompilationPipeline {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            frontend: None,
        }
    }

    /// Use `frontend` instead of loading the configured JSON inputs.
    pub fn with_frontend(mut self, frontend: impl Frontend + 'static) -> Self {
        self.frontend = Some(Box::new(frontend));
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Run the full compilation pipeline
    pub fn compile(&mut self) -> Result<CompilationResult> {
        let total_start = Instant::now();

        // Stage 1: Configure
        let mut session = self.run_configure_stage()?.result;

        // Stage 2: Load symbols
        let symbols_result = self.run_load_symbols_stage(&mut session)?;
        let symbols_time = symbols_result.duration;

        // Stage 3: Frontend
        let frontend_result = self.run_frontend_stage(&mut session)?;
        let frontend_time = frontend_result.duration;
        let mut module = frontend_result.result.module;
        report_output_collisions(&module, session.diagnostics_mut());

        let mut metadata = CompilationMetadata {
            symbols_time,
            frontend_time,
            ..CompilationMetadata::default()
        };
        if let Some(report) = session.synthesis_report() {
            metadata.synthesized_classes = report.classes;
            metadata.skipped_types = report.skipped.len();
        }

        if session.diagnostics().has_errors() {
            warn!(
                "Skipping code generation: {} error(s) reported",
                session.diagnostics().error_count()
            );
            metadata.total_time = total_start.elapsed();
            return Ok(CompilationResult {
                files: Vec::new(),
                diagnostics: session.take_diagnostics().into_vec(),
                metadata,
            });
        }

        // Stage 4: Actualize
        self.run_actualize_stage(&mut session, &mut module)?;

        let pre_lowering = if self.config.emit_dumps {
            module
                .files
                .iter()
                .map(|file| (file.stem().to_string(), dump_file(file)))
                .collect()
        } else {
            HashMap::new()
        };

        // Stage 5: Lower
        let mut lowering = LoweringPipeline::standard();
        let lower_result = self.run_lower_stage(&session, &mut lowering, &mut module);
        metadata.lowering_time = lower_result.duration;
        metadata.lowering_passes = lowering.pass_names().into_iter().map(String::from).collect();

        // Stage 6: Code generation
        let codegen_result = self.run_codegen_stage(&mut session, &module, &pre_lowering);
        metadata.codegen_time = codegen_result.duration;

        // Stage 7: Write files
        let write_result = self.run_write_stage(&mut session, codegen_result.result);
        let files = write_result.result;

        metadata.total_time = total_start.elapsed();
        metadata.generated_files = files.len();
        metadata.total_output_size = files.iter().map(|(_, content)| content.len()).sum();

        info!(
            "Compiled module {} into {} files in {:?}",
            module.name, metadata.generated_files, metadata.total_time
        );

        Ok(CompilationResult {
            files,
            diagnostics: session.take_diagnostics().into_vec(),
            metadata,
        })
    }

    /// Run configuration stage
    fn run_configure_stage(&self) -> Result<PipelineResult<CompilationSession>> {
        let start = Instant::now();
        let session = CompilationSession::new(self.config.clone())?;

        Ok(PipelineResult {
            stage: PipelineStage::Configure,
            result: session,
            duration: start.elapsed(),
            diagnostics: Vec::new(),
        })
    }

    /// Run symbol loading stage
    fn run_load_symbols_stage(
        &self,
        session: &mut CompilationSession,
    ) -> Result<PipelineResult<()>> {
        let start = Instant::now();
        let mark = session.diagnostics().len();

        session.load_symbols()?;

        Ok(PipelineResult {
            stage: PipelineStage::LoadSymbols,
            result: (),
            duration: start.elapsed(),
            diagnostics: session.diagnostics().since(mark),
        })
    }

    /// Run frontend stage
    fn run_frontend_stage(
        &mut self,
        session: &mut CompilationSession,
    ) -> Result<PipelineResult<ResolvedProgram>> {
        let start = Instant::now();
        let mark = session.diagnostics().len();

        let config = &self.config;
        let frontend = self.frontend.get_or_insert_with(|| -> Box<dyn Frontend> {
            Box::new(JsonFrontend::new(config.module_name.clone(), config.inputs.clone()))
        });
        debug!("Running {} frontend", frontend.name());
        let (symbols, diagnostics) = session.symbols_and_diagnostics();
        let program = frontend.analyze(&symbols, diagnostics)?;

        Ok(PipelineResult {
            stage: PipelineStage::Frontend,
            result: program,
            duration: start.elapsed(),
            diagnostics: session.diagnostics().since(mark),
        })
    }

    /// Run actualization stage
    fn run_actualize_stage(
        &self,
        session: &mut CompilationSession,
        module: &mut IrModule,
    ) -> Result<PipelineResult<ActualizationReport>> {
        let start = Instant::now();
        let mark = session.diagnostics().len();

        let report = session.actualize(module)?;
        if !report.actualized.is_empty() {
            info!(
                "Actualized {} placeholder classes ({} references)",
                report.actualized.len(),
                report.rewritten_references
            );
        }

        Ok(PipelineResult {
            stage: PipelineStage::Actualize,
            result: report,
            duration: start.elapsed(),
            diagnostics: session.diagnostics().since(mark),
        })
    }

    /// Run lowering stage
    fn run_lower_stage(
        &self,
        session: &CompilationSession,
        lowering: &mut LoweringPipeline,
        module: &mut IrModule,
    ) -> PipelineResult<LoweringReport> {
        let start = Instant::now();

        let symbols = session.symbols();
        let mut context = LoweringContext::new(&symbols, module);
        let report = lowering.run(module, &mut context);

        PipelineResult {
            stage: PipelineStage::Lower,
            result: report,
            duration: start.elapsed(),
            diagnostics: Vec::new(),
        }
    }

    /// Run code generation stage; yields output paths relative to the destination.
    fn run_codegen_stage(
        &self,
        session: &mut CompilationSession,
        module: &IrModule,
        pre_lowering: &HashMap<String, String>,
    ) -> PipelineResult<Vec<(PathBuf, String)>> {
        let start = Instant::now();
        let mark = session.diagnostics().len();

        let symbols = session.symbols();
        let generator = CodeGenerator::new(&symbols, session.mapper(), module);
        let text = TextRenderer::new();
        let xml = XmlRenderer::new();
        let mut files = Vec::new();

        for (file, generated) in module.files.iter().zip(generator.generate_module(module)) {
            let stem = generated.stem;
            files.push((
                PathBuf::from(format!("{}.{}", stem, SOURCE_EXTENSION)),
                text.render(&generated.code),
            ));
            if self.config.emit_dumps {
                if let Some(dump) = pre_lowering.get(&stem) {
                    files.push((PathBuf::from(format!("{}.pre.ir.txt", stem)), dump.clone()));
                }
                files.push((PathBuf::from(format!("{}.post.ir.txt", stem)), dump_file(file)));
                files.push((
                    PathBuf::from(format!("{}.tree.xml", stem)),
                    xml.render(&generated.code),
                ));
            }
        }

        let unsupported = generator.unsupported_count();
        if unsupported > 0 {
            session.diagnostics_mut().warning(
                DiagnosticSource::CodeGenerator,
                format!("{} unsupported IR shape(s) rendered as markers", unsupported),
            );
        }

        PipelineResult {
            stage: PipelineStage::CodeGen,
            result: files,
            duration: start.elapsed(),
            diagnostics: session.diagnostics().since(mark),
        }
    }

    /// Run file writing stage
    fn run_write_stage(
        &self,
        session: &mut CompilationSession,
        files: Vec<(PathBuf, String)>,
    ) -> PipelineResult<Vec<(PathBuf, String)>> {
        let start = Instant::now();
        let mark = session.diagnostics().len();
        let output_dir = &self.config.destination;
        let mut written_files = Vec::new();

        if let Err(e) = std::fs::create_dir_all(output_dir) {
            session.diagnostics_mut().error(
                DiagnosticSource::Writer,
                format!("Failed to create directory {}: {}", output_dir.display(), e),
            );
        } else {
            for (relative_path, content) in files {
                let full_path = output_dir.join(&relative_path);
                match write_file(&full_path, &content) {
                    Ok(()) => written_files.push((full_path, content)),
                    Err(e) => session
                        .diagnostics_mut()
                        .error(DiagnosticSource::Writer, e.to_string()),
                }
            }
        }

        PipelineResult {
            stage: PipelineStage::Write,
            result: written_files,
            duration: start.elapsed(),
            diagnostics: session.diagnostics().since(mark),
        }
    }
}

/// Every output is named after its file stem, so two inputs with the same
/// stem would overwrite each other and share one facade class.
fn report_output_collisions(module: &IrModule, diagnostics: &mut Diagnostics) {
    let mut owners: HashMap<&str, &str> = HashMap::new();
    for file in &module.files {
        if let Some(first) = owners.insert(file.stem(), &file.name) {
            diagnostics.error(
                DiagnosticSource::Writer,
                format!(
                    "{} and {} both compile to {}.{}",
                    first,
                    file.name,
                    file.stem(),
                    SOURCE_EXTENSION
                ),
            );
        }
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| CompilerError::io(path, e))?;
    debug!("Wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiagnosticSeverity;
    use sharpen_ir::{
        CallableId, ClassId, ClassKind, IrClass, IrDeclaration, IrExpression, IrFile, IrFunction,
        IrStatement, SourceType,
    };
    use sharpen_symbols::SymbolProvider;
    use tempfile::TempDir;

    struct FixedFrontend(IrModule);

    impl Frontend for FixedFrontend {
        fn name(&self) -> &str {
            "fixed"
        }

        fn analyze(
            &mut self,
            _symbols: &dyn SymbolProvider,
            _diagnostics: &mut Diagnostics,
        ) -> Result<ResolvedProgram> {
            Ok(ResolvedProgram::new(self.0.clone()))
        }
    }

    fn greeter_module() -> IrModule {
        let mut file = IrFile::new("greeter.kt", "app");
        let greeter = IrClass::new(ClassId::new("app", "Greeter"), ClassKind::Class);
        file.declarations.push(IrDeclaration::Class(greeter));
        let mut module = IrModule::new("main");
        module.files.push(file);
        module
    }

    fn config(dir: &TempDir) -> CompilerConfig {
        CompilerConfig {
            destination: dir.path().join("out"),
            ..CompilerConfig::default()
        }
    }

    #[test]
    fn test_compiles_and_writes_source() {
        let dir = TempDir::new().unwrap();
        let mut pipeline =
            CompilationPipeline::new(config(&dir)).with_frontend(FixedFrontend(greeter_module()));
        let result = pipeline.compile().unwrap();

        assert!(!result.has_errors());
        let source = result.file("greeter.cs").unwrap();
        assert!(source.contains("namespace app"));
        assert!(source.contains("class Greeter"));
        assert!(dir.path().join("out").join("greeter.cs").exists());
        assert_eq!(result.metadata.generated_files, 1);
        assert_eq!(
            result.metadata.lowering_passes,
            LoweringPipeline::standard()
                .pass_names()
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_emits_dumps() {
        let dir = TempDir::new().unwrap();
        let config = CompilerConfig {
            emit_dumps: true,
            ..config(&dir)
        };
        let mut pipeline =
            CompilationPipeline::new(config).with_frontend(FixedFrontend(greeter_module()));
        let result = pipeline.compile().unwrap();

        assert!(result.file("greeter.pre.ir.txt").is_some());
        assert!(result.file("greeter.post.ir.txt").is_some());
        assert!(result.file("greeter.tree.xml").unwrap().contains("<Block"));
        assert_eq!(result.metadata.generated_files, 4);
    }

    #[test]
    fn test_frontend_errors_skip_codegen() {
        let dir = TempDir::new().unwrap();
        let mut module = greeter_module();
        let main = IrFunction::new(CallableId::top_level("app", "main"), SourceType::unit())
            .with_body(vec![IrStatement::Expression(IrExpression::ConstructorCall {
                class: ClassId::new("Shapes", "Circle"),
                type_arguments: Vec::new(),
                arguments: Vec::new(),
            })]);
        module.files[0].declarations.push(IrDeclaration::Function(main));
        let input = dir.path().join("main.json");
        std::fs::write(&input, serde_json::to_string(&module).unwrap()).unwrap();

        let config = CompilerConfig {
            inputs: vec![input],
            ..config(&dir)
        };
        let result = CompilationPipeline::new(config).compile().unwrap();

        assert!(result.has_errors());
        assert!(result.files.is_empty());
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error
                && d.source == DiagnosticSource::Frontend));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_same_stem_inputs_are_rejected() {
        let dir = TempDir::new().unwrap();
        let mut module = IrModule::new("main");
        for (name, package, class) in [("a/util.kt", "a", "First"), ("b/util.kt", "b", "Second")] {
            let mut file = IrFile::new(name, package);
            let class = IrClass::new(ClassId::new(package, class), ClassKind::Class);
            file.declarations.push(IrDeclaration::Class(class));
            module.files.push(file);
        }

        let mut pipeline =
            CompilationPipeline::new(config(&dir)).with_frontend(FixedFrontend(module));
        let result = pipeline.compile().unwrap();

        assert!(result.has_errors());
        assert!(result.files.is_empty());
        let collision = result
            .diagnostics
            .iter()
            .find(|d| d.source == DiagnosticSource::Writer)
            .unwrap();
        assert_eq!(collision.severity, DiagnosticSeverity::Error);
        assert!(collision.message.contains("a/util.kt and b/util.kt"));
        assert!(collision.message.contains("util.cs"));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_invalid_config_aborts() {
        let config = CompilerConfig {
            module_name: " ".to_string(),
            ..CompilerConfig::default()
        };
        let result = CompilationPipeline::new(config).compile();
        assert!(matches!(result, Err(CompilerError::Config(_))));
    }
}
