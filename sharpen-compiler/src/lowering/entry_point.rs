//! Entry point wrapper
//!
//! A file whose facade declares `main()` or `main(args: Array<String>)` gets
//! a `Main(args)` wrapper next to it, the signature the target runtime
//! starts programs with.

use super::{FileLoweringPass, LoweringContext};
use sharpen_ir::{
    IrCall, IrDeclaration, IrExpression, IrFile, IrFunction, IrOrigin, IrStatement,
    IrValueParameter, SourceType,
};
use tracing::debug;

pub const SOURCE_ENTRY_POINT: &str = "main";
pub const TARGET_ENTRY_POINT: &str = "Main";
const ARGS: &str = "args";

pub struct EntryPointSynthesis;

/// Conventional `main` with no parameters or a single `Array<String>` one.
pub fn is_entry_point(function: &IrFunction) -> bool {
    function.name() == SOURCE_ENTRY_POINT
        && function.is_static
        && function.type_parameters.is_empty()
        && function.extension_receiver.is_none()
        && match function.value_parameters.as_slice() {
            [] => true,
            [parameter] => parameter.ty.is_string_array() && !parameter.is_vararg,
            _ => false,
        }
}

impl FileLoweringPass for EntryPointSynthesis {
    fn name(&self) -> &'static str {
        "entry-point-synthesis"
    }

    fn lower(&mut self, file: &mut IrFile, _context: &LoweringContext<'_>) -> usize {
        for declaration in &mut file.declarations {
            let facade = declaration.as_class_mut().filter(|c| c.origin == IrOrigin::FileFacade);
            let Some(facade) = facade else {
                continue;
            };
            if facade.functions().any(|f| f.origin == IrOrigin::EntryPoint) {
                return 0;
            }
            let Some(main) = facade.functions().find(|f| is_entry_point(f)) else {
                continue;
            };

            let args_type = SourceType::array_of(SourceType::string());
            let mut call = IrCall::new(main.id.clone(), main.return_type.clone());
            if !main.value_parameters.is_empty() {
                call = call.with_arguments(vec![IrExpression::get(ARGS, args_type.clone())]);
            }
            let body = vec![IrStatement::Expression(IrExpression::Call(call))];
            let id = facade.id.member(TARGET_ENTRY_POINT);
            let mut wrapper = IrFunction::new(id, SourceType::unit()).with_body(body);
            wrapper.value_parameters.push(IrValueParameter::new(ARGS, args_type));
            wrapper.is_static = true;
            wrapper.origin = IrOrigin::EntryPoint;

            debug!("Synthesized entry point {} for {}", wrapper.id, file.name);
            facade.declarations.push(IrDeclaration::Function(wrapper));
            return 1;
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpen_ir::{CallableId, ClassId, ClassKind, IrClass, IrModule};
    use sharpen_symbols::SymbolGraph;

    fn facade_file(main: IrFunction) -> IrFile {
        let mut facade = IrClass::new(ClassId::new("", "MainKt"), ClassKind::Object);
        facade.origin = IrOrigin::FileFacade;
        facade.declarations.push(IrDeclaration::Function(main));
        let mut file = IrFile::new("main.kt", "");
        file.declarations.push(IrDeclaration::Class(facade));
        file
    }

    fn main_function(parameters: Vec<IrValueParameter>) -> IrFunction {
        let id = ClassId::new("", "MainKt").member("main");
        let mut main = IrFunction::new(id, SourceType::unit()).with_body(Vec::new());
        main.is_static = true;
        main.value_parameters = parameters;
        main
    }

    fn lower(file: &mut IrFile) -> usize {
        let graph = SymbolGraph::new();
        let module = IrModule::new("main");
        let context = LoweringContext::new(&graph, &module);
        EntryPointSynthesis.lower(file, &context)
    }

    #[test]
    fn test_wraps_parameterless_main() {
        let mut file = facade_file(main_function(Vec::new()));
        assert_eq!(lower(&mut file), 1);

        let facade = file.classes().next().unwrap();
        let wrapper = facade.functions().find(|f| f.origin == IrOrigin::EntryPoint).unwrap();
        assert_eq!(wrapper.name(), "Main");
        assert!(wrapper.is_static);
        assert!(wrapper.value_parameters[0].ty.is_string_array());
        let statements = &wrapper.body.as_ref().unwrap().statements;
        let IrStatement::Expression(IrExpression::Call(call)) = &statements[0] else {
            panic!("expected a call");
        };
        assert_eq!(call.callee.name, "main");
        assert!(call.arguments.is_empty());

        // Exactly one wrapper even if the pass runs again
        assert_eq!(lower(&mut file), 0);
    }

    #[test]
    fn test_forwards_args() {
        let parameter = IrValueParameter::new("args", SourceType::array_of(SourceType::string()));
        let mut file = facade_file(main_function(vec![parameter]));
        assert_eq!(lower(&mut file), 1);
        let wrapper = file.classes().next().unwrap().functions().last().unwrap();
        let statements = &wrapper.body.as_ref().unwrap().statements;
        let IrStatement::Expression(IrExpression::Call(call)) = &statements[0] else {
            panic!("expected a call");
        };
        assert_eq!(call.arguments.len(), 1);
    }

    #[test]
    fn test_other_main_shapes_are_ignored() {
        let parameter = IrValueParameter::new("count", SourceType::int());
        let mut file = facade_file(main_function(vec![parameter]));
        assert_eq!(lower(&mut file), 0);

        let mut instance_main = main_function(Vec::new());
        instance_main.id = CallableId::member(ClassId::new("", "App"), "main");
        instance_main.is_static = false;
        let mut file = facade_file(instance_main);
        assert_eq!(lower(&mut file), 0);
    }
}
