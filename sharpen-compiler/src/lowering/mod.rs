//! Lowering pipeline
//!
//! An ordered set of in-place IR rewrites run before code generation.
//! Module passes run once over the whole module, then file passes run once
//! per file. Each pass returns how many rewrites it applied.

pub mod constant_folding;
pub mod default_constructor;
pub mod entry_point;
pub mod expect;
pub mod external;
pub mod file_facade;
pub mod intrinsics;

pub use constant_folding::ConstantFolding;
pub use default_constructor::DefaultConstructorSynthesis;
pub use entry_point::EntryPointSynthesis;
pub use expect::ExpectDeclarationStripping;
pub use external::ExternalDeclarationRelocation;
pub use file_facade::FileFacadeMerge;
pub use intrinsics::IntrinsicRewrite;

use crate::type_mapper::TypeMapper;
use sharpen_ir::visitor::{walk_call, MutVisitor};
use sharpen_ir::{CallableId, ClassId, IrCall, IrExpression, IrFile, IrModule};
use sharpen_symbols::SymbolProvider;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// State shared by every pass. The set of declared classes is refreshed
/// after each module pass, so classes synthesized by earlier passes count.
pub struct LoweringContext<'a> {
    pub symbols: &'a dyn SymbolProvider,
    pub mapper: TypeMapper,
    declared: HashSet<ClassId>,
}

impl<'a> LoweringContext<'a> {
    pub fn new(symbols: &'a dyn SymbolProvider, module: &IrModule) -> Self {
        LoweringContext {
            symbols,
            mapper: TypeMapper::new(),
            declared: module.declared_class_ids().into_iter().collect(),
        }
    }

    pub fn refresh(&mut self, module: &IrModule) {
        self.declared = module.declared_class_ids().into_iter().collect();
    }

    /// Declared by the module being lowered.
    pub fn is_declared(&self, id: &ClassId) -> bool {
        self.declared.contains(id)
    }

    /// Declared by the module or known to the symbol provider.
    pub fn is_known(&self, id: &ClassId) -> bool {
        self.is_declared(id) || self.symbols.contains_class(id)
    }
}

pub trait ModuleLoweringPass {
    fn name(&self) -> &'static str;

    fn lower(&mut self, module: &mut IrModule, context: &LoweringContext<'_>) -> usize;
}

pub trait FileLoweringPass {
    fn name(&self) -> &'static str;

    fn lower(&mut self, file: &mut IrFile, context: &LoweringContext<'_>) -> usize;
}

/// Rewrite counts per pass, in execution order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoweringReport {
    pub applied: Vec<(&'static str, usize)>,
}

impl LoweringReport {
    pub fn count(&self, pass: &str) -> usize {
        self.applied
            .iter()
            .filter(|(name, _)| *name == pass)
            .map(|(_, count)| count)
            .sum()
    }

    pub fn total(&self) -> usize {
        self.applied.iter().map(|(_, count)| count).sum()
    }
}

pub struct LoweringPipeline {
    module_passes: Vec<Box<dyn ModuleLoweringPass>>,
    file_passes: Vec<Box<dyn FileLoweringPass>>,
}

impl LoweringPipeline {
    pub fn empty() -> Self {
        LoweringPipeline {
            module_passes: Vec::new(),
            file_passes: Vec::new(),
        }
    }

    /// The fixed pass order used for every compilation.
    pub fn standard() -> Self {
        LoweringPipeline::empty()
            .with_module_pass(ExternalDeclarationRelocation)
            .with_module_pass(ExpectDeclarationStripping)
            .with_module_pass(ConstantFolding)
            .with_module_pass(FileFacadeMerge)
            .with_file_pass(EntryPointSynthesis)
            .with_file_pass(IntrinsicRewrite)
            .with_file_pass(DefaultConstructorSynthesis)
    }

    pub fn with_module_pass(mut self, pass: impl ModuleLoweringPass + 'static) -> Self {
        self.module_passes.push(Box::new(pass));
        self
    }

    pub fn with_file_pass(mut self, pass: impl FileLoweringPass + 'static) -> Self {
        self.file_passes.push(Box::new(pass));
        self
    }

    /// Pass names in execution order, module passes first.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.module_passes
            .iter()
            .map(|pass| pass.name())
            .chain(self.file_passes.iter().map(|pass| pass.name()))
            .collect()
    }

    pub fn run(
        &mut self,
        module: &mut IrModule,
        context: &mut LoweringContext<'_>,
    ) -> LoweringReport {
        let mut report = LoweringReport::default();

        for pass in &mut self.module_passes {
            let count = pass.lower(module, context);
            if count > 0 {
                context.refresh(module);
            }
            debug!("{}: {} rewrites", pass.name(), count);
            report.applied.push((pass.name(), count));
        }

        for pass in &mut self.file_passes {
            let mut count = 0;
            for file in &mut module.files {
                count += pass.lower(file, context);
            }
            debug!("{}: {} rewrites", pass.name(), count);
            report.applied.push((pass.name(), count));
        }

        info!(
            "Lowered module {} with {} passes, {} rewrites",
            module.name,
            report.applied.len(),
            report.total()
        );
        report
    }
}

impl Default for LoweringPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

/// Points call sites of moved callables at their new ids.
pub(crate) struct CallRetargeter<'a> {
    pub moved: &'a HashMap<CallableId, CallableId>,
    pub rewrites: usize,
}

impl MutVisitor for CallRetargeter<'_> {
    fn visit_call(&mut self, call: &mut IrCall) {
        if let Some(target) = self.moved.get(&call.callee) {
            call.callee = target.clone();
            // Holders are static classes
            if matches!(call.dispatch_receiver.as_deref(), Some(IrExpression::GetObject { .. })) {
                call.dispatch_receiver = None;
            }
            self.rewrites += 1;
        }
        walk_call(self, call);
    }
}

/// `main` → `Main`
pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
