//! Relocation of declarations whose container lives in another module
//!
//! A top-level function or property whose id names an owning class the
//! module does not declare is moved into a synthesized `<Container>Facade`
//! static class, placed in a new file of the container's package. Call
//! sites are re-pointed at the facade.

use super::{CallRetargeter, LoweringContext, ModuleLoweringPass};
use indexmap::IndexMap;
use sharpen_ir::{
    CallableId, ClassId, ClassKind, IrClass, IrDeclaration, IrFile, IrModule, IrOrigin,
    MutVisitor,
};
use std::collections::HashMap;
use tracing::{debug, warn};

pub const FACADE_SUFFIX: &str = "Facade";

pub struct ExternalDeclarationRelocation;

/// Facade class id for an external container: `pkg/OuterInnerFacade`.
pub fn facade_id(container: &ClassId) -> ClassId {
    ClassId::new(
        container.package.as_str(),
        &format!("{}{}", container.names.concat(), FACADE_SUFFIX),
    )
}

fn external_container<'d>(
    declaration: &'d IrDeclaration,
    context: &LoweringContext<'_>,
) -> Option<&'d ClassId> {
    let id = match declaration {
        IrDeclaration::Function(function) => &function.id,
        IrDeclaration::Property(property) => &property.id,
        _ => return None,
    };
    id.class.as_ref().filter(|class| !context.is_declared(class))
}

impl ModuleLoweringPass for ExternalDeclarationRelocation {
    fn name(&self) -> &'static str {
        "external-declaration-relocation"
    }

    fn lower(&mut self, module: &mut IrModule, context: &LoweringContext<'_>) -> usize {
        let mut facades: IndexMap<ClassId, IrClass> = IndexMap::new();
        let mut moved: HashMap<CallableId, CallableId> = HashMap::new();

        for file in &mut module.files {
            let mut kept = Vec::with_capacity(file.declarations.len());
            for declaration in std::mem::take(&mut file.declarations) {
                let Some(container) = external_container(&declaration, context).cloned() else {
                    kept.push(declaration);
                    continue;
                };
                if !context.symbols.contains_class(&container) {
                    warn!("Container {} of {} is unknown", container, declaration.name());
                }
                let facade = facades.entry(container.clone()).or_insert_with(|| {
                    let mut class = IrClass::new(facade_id(&container), ClassKind::Object);
                    class.origin = IrOrigin::ExternalFacade;
                    class
                });
                let declaration = move_into(declaration, &facade.id, &mut moved);
                facade.declarations.push(declaration);
            }
            file.declarations = kept;
        }

        if facades.is_empty() {
            return 0;
        }

        let count = moved.len();
        for (container, facade) in facades {
            debug!(
                "Relocated {} declarations of {} into {}",
                facade.declarations.len(),
                container,
                facade.id
            );
            let mut file = IrFile::new(format!("{}.kt", facade.name()), container.package.as_str());
            file.declarations.push(IrDeclaration::Class(facade));
            module.files.push(file);
        }

        let mut retargeter = CallRetargeter {
            moved: &moved,
            rewrites: 0,
        };
        retargeter.visit_module(module);
        debug!("Re-pointed {} call sites at external facades", retargeter.rewrites);
        count
    }
}

/// Move a function or property into a static holder, recording the id change.
pub(crate) fn move_into(
    declaration: IrDeclaration,
    holder: &ClassId,
    moved: &mut HashMap<CallableId, CallableId>,
) -> IrDeclaration {
    match declaration {
        IrDeclaration::Function(mut function) => {
            let id = function.id.moved_to(Some(holder.clone()));
            moved.insert(std::mem::replace(&mut function.id, id), function.id.clone());
            function.is_static = true;
            IrDeclaration::Function(function)
        }
        IrDeclaration::Property(mut property) => {
            let id = property.id.moved_to(Some(holder.clone()));
            moved.insert(std::mem::replace(&mut property.id, id), property.id.clone());
            property.is_static = true;
            IrDeclaration::Property(property)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpen_ir::{IrCall, IrExpression, IrFunction, IrStatement, SourceType};
    use sharpen_symbols::SymbolGraph;

    fn module() -> IrModule {
        let foreign = ClassId::new("Shapes", "Rectangle").companion();
        let helper = IrFunction::new(foreign.member("unit"), SourceType::double())
            .with_body(vec![IrStatement::Return(Some(IrExpression::double(1.0)))]);
        let call = IrCall::new(foreign.member("unit"), SourceType::double())
            .with_dispatch_receiver(IrExpression::GetObject { class: foreign.clone() });
        let main = IrFunction::new(CallableId::top_level("app", "main"), SourceType::unit())
            .with_body(vec![IrStatement::Expression(IrExpression::Call(call))]);

        let mut file = IrFile::new("main.kt", "app");
        file.declarations.push(IrDeclaration::Function(helper));
        file.declarations.push(IrDeclaration::Function(main));
        let mut module = IrModule::new("main");
        module.files.push(file);
        module
    }

    #[test]
    fn test_relocates_into_container_package() {
        let graph = SymbolGraph::new();
        let mut module = module();
        let context = LoweringContext::new(&graph, &module);
        let count = ExternalDeclarationRelocation.lower(&mut module, &context);

        assert_eq!(count, 1);
        assert_eq!(module.files.len(), 2);
        assert_eq!(module.files[0].declarations.len(), 1);

        let facade_file = &module.files[1];
        assert_eq!(facade_file.package.as_str(), "Shapes");
        let facade = facade_file.classes().next().unwrap();
        assert_eq!(facade.id, ClassId::new("Shapes", "RectangleCompanionFacade"));
        assert!(facade.is_static_holder());
        let moved = facade.functions().next().unwrap();
        assert!(moved.is_static);
        assert_eq!(moved.id.class.as_ref(), Some(&facade.id));
    }

    #[test]
    fn test_call_sites_follow_relocation() {
        let graph = SymbolGraph::new();
        let mut module = module();
        let context = LoweringContext::new(&graph, &module);
        ExternalDeclarationRelocation.lower(&mut module, &context);

        let main = module.files[0].declarations[0].as_function().unwrap();
        let statements = &main.body.as_ref().unwrap().statements;
        let IrStatement::Expression(IrExpression::Call(call)) = &statements[0] else {
            panic!("expected a call");
        };
        assert_eq!(call.callee.to_string(), "Shapes/RectangleCompanionFacade#unit");
        assert!(call.dispatch_receiver.is_none());
    }

    #[test]
    fn test_declared_containers_stay() {
        let graph = SymbolGraph::new();
        let owner = ClassId::new("app", "Local");
        let mut file = IrFile::new("main.kt", "app");
        file.declarations.push(IrDeclaration::Class(IrClass::new(owner.clone(), ClassKind::Class)));
        let ext = IrFunction::new(owner.member("ext"), SourceType::unit());
        file.declarations.push(IrDeclaration::Function(ext));
        let mut module = IrModule::new("main");
        module.files.push(file);

        let context = LoweringContext::new(&graph, &module);
        assert_eq!(ExternalDeclarationRelocation.lower(&mut module, &context), 0);
        assert_eq!(module.files.len(), 1);
    }
}
