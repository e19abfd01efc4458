//! Removal of placeholder (`expect`) declarations

use super::{LoweringContext, ModuleLoweringPass};
use sharpen_ir::{IrDeclaration, IrModule};
use tracing::debug;

pub struct ExpectDeclarationStripping;

impl ModuleLoweringPass for ExpectDeclarationStripping {
    fn name(&self) -> &'static str {
        "expect-declaration-stripping"
    }

    fn lower(&mut self, module: &mut IrModule, _context: &LoweringContext<'_>) -> usize {
        let mut removed = 0;
        for file in &mut module.files {
            removed += strip(&mut file.declarations);
        }
        removed
    }
}

fn strip(declarations: &mut Vec<IrDeclaration>) -> usize {
    let before = declarations.len();
    declarations.retain(|declaration| {
        let expect = declaration.is_expect();
        if expect {
            debug!("Stripping expect declaration {}", declaration.name());
        }
        !expect
    });
    let mut removed = before - declarations.len();
    for declaration in declarations.iter_mut() {
        if let IrDeclaration::Class(class) = declaration {
            removed += strip(&mut class.declarations);
        }
    }
    removed
}
