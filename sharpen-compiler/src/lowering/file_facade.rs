//! File facades
//!
//! The target language has no free functions: every file's top-level
//! functions and properties move into one static `<Stem>Kt` class declared
//! in the same file. Call sites across the module follow.

use super::external::move_into;
use super::{capitalize, CallRetargeter, LoweringContext, ModuleLoweringPass};
use sharpen_ir::{
    ClassId, ClassKind, IrClass, IrDeclaration, IrFile, IrModule, IrOrigin, MutVisitor,
};
use std::collections::HashMap;
use tracing::debug;

pub const FACADE_SUFFIX: &str = "Kt";

pub struct FileFacadeMerge;

/// `src/main.kt` in package `app` → `app/MainKt`
pub fn facade_id(file: &IrFile) -> ClassId {
    ClassId::new(
        file.package.as_str(),
        &format!("{}{}", capitalize(file.stem()), FACADE_SUFFIX),
    )
}

fn is_top_level_callable(declaration: &IrDeclaration) -> bool {
    matches!(declaration, IrDeclaration::Function(_) | IrDeclaration::Property(_))
}

impl ModuleLoweringPass for FileFacadeMerge {
    fn name(&self) -> &'static str {
        "file-facade-merge"
    }

    fn lower(&mut self, module: &mut IrModule, _context: &LoweringContext<'_>) -> usize {
        let mut moved = HashMap::new();
        let mut facades = 0;

        for file in &mut module.files {
            if !file.declarations.iter().any(is_top_level_callable) {
                continue;
            }
            let id = facade_id(file);
            let mut facade = IrClass::new(id.clone(), ClassKind::Object);
            facade.origin = IrOrigin::FileFacade;

            let mut kept = Vec::with_capacity(file.declarations.len());
            for declaration in std::mem::take(&mut file.declarations) {
                if is_top_level_callable(&declaration) {
                    facade.declarations.push(move_into(declaration, &id, &mut moved));
                } else {
                    kept.push(declaration);
                }
            }
            debug!(
                "File {} merged into facade {} ({} declarations)",
                file.name,
                id,
                facade.declarations.len()
            );
            kept.push(IrDeclaration::Class(facade));
            file.declarations = kept;
            facades += 1;
        }

        if !moved.is_empty() {
            let mut retargeter = CallRetargeter {
                moved: &moved,
                rewrites: 0,
            };
            retargeter.visit_module(module);
            debug!("Re-pointed {} call sites at file facades", retargeter.rewrites);
        }
        facades
    }
}
