//! Frontend boundary
//!
//! Parsing and type checking belong to an external frontend. The backend
//! only needs a resolved program; the frontend in turn consults the
//! session's symbols for anything not declared in the program.

use crate::lowering::intrinsics::INTRINSICS_PACKAGE;
use crate::{CompilerError, DiagnosticSource, Diagnostics, Result};
use sharpen_ir::visitor::MutVisitor;
use sharpen_ir::{ClassId, IrModule};
use sharpen_symbols::SymbolProvider;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Standard library packages are resolved by the frontend itself.
const STDLIB_PACKAGE: &str = "kotlin";

/// Output of the frontend: one fully resolved module
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProgram {
    pub module: IrModule,
    /// Where each file of the module was read from
    pub sources: Vec<PathBuf>,
}

impl ResolvedProgram {
    pub fn new(module: IrModule) -> Self {
        ResolvedProgram {
            module,
            sources: Vec::new(),
        }
    }
}

pub trait Frontend {
    fn name(&self) -> &str;

    /// Produce the resolved program, reporting resolution problems to
    /// `diagnostics`. An `Err` means the program could not be read at all.
    fn analyze(
        &mut self,
        symbols: &dyn SymbolProvider,
        diagnostics: &mut Diagnostics,
    ) -> Result<ResolvedProgram>;
}

/// Loads modules pre-resolved to IR JSON, one file per input
#[derive(Debug, Clone)]
pub struct JsonFrontend {
    module_name: String,
    inputs: Vec<PathBuf>,
}

impl JsonFrontend {
    pub fn new(module_name: impl Into<String>, inputs: Vec<PathBuf>) -> Self {
        JsonFrontend {
            module_name: module_name.into(),
            inputs,
        }
    }

    fn load(&self) -> Result<ResolvedProgram> {
        let mut module = IrModule::new(self.module_name.clone());
        let mut sources = Vec::new();
        for input in &self.inputs {
            let text = fs::read_to_string(input).map_err(|e| CompilerError::io(input, e))?;
            let part: IrModule = serde_json::from_str(&text).map_err(|e| CompilerError::Program {
                path: input.clone(),
                message: e.to_string(),
            })?;
            debug!("Loaded {} files from {}", part.files.len(), input.display());
            sources.extend(std::iter::repeat(input.clone()).take(part.files.len()));
            module.files.extend(part.files);
        }
        Ok(ResolvedProgram { module, sources })
    }
}

impl Frontend for JsonFrontend {
    fn name(&self) -> &str {
        "json"
    }

    fn analyze(
        &mut self,
        symbols: &dyn SymbolProvider,
        diagnostics: &mut Diagnostics,
    ) -> Result<ResolvedProgram> {
        let mut program = self.load()?;
        let unresolved = unresolved_references(&mut program.module, symbols);
        for (file, class) in &unresolved {
            diagnostics.error(
                DiagnosticSource::Frontend,
                format!("{}: unresolved reference to class {}", file, class),
            );
        }
        info!(
            "Frontend loaded {} files ({} unresolved references)",
            program.module.files.len(),
            unresolved.len()
        );
        Ok(program)
    }
}

/// Class references that are neither declared in `module` nor known to
/// `symbols`, paired with the file that makes them.
pub fn unresolved_references(
    module: &mut IrModule,
    symbols: &dyn SymbolProvider,
) -> Vec<(String, ClassId)> {
    let declared: HashSet<ClassId> = module.declared_class_ids().into_iter().collect();
    let mut unresolved = Vec::new();
    for file in &mut module.files {
        let mut collector = ReferenceCollector::default();
        collector.visit_file(file);
        for class in collector.referenced {
            if !declared.contains(&class)
                && !is_external_root(&class)
                && !symbols.contains_class(&class)
            {
                unresolved.push((file.name.clone(), class));
            }
        }
    }
    unresolved
}

fn is_external_root(class: &ClassId) -> bool {
    let package = class.package.as_str();
    package == INTRINSICS_PACKAGE
        || package == STDLIB_PACKAGE
        || package.starts_with(&format!("{}.", STDLIB_PACKAGE))
}

#[derive(Default)]
struct ReferenceCollector {
    referenced: BTreeSet<ClassId>,
}

impl MutVisitor for ReferenceCollector {
    fn visit_class_id(&mut self, id: &mut ClassId) {
        self.referenced.insert(id.clone());
    }
}
