//! IR visitor
//!
//! Mutable traversal of the lowered IR. Lowering passes and the builtins
//! actualizer rewrite the tree in place through this trait.
//!
//! Default implementations call `walk_*` functions that traverse children.
//! Override `visit_*` methods to add custom behavior at specific nodes; call
//! the matching `walk_*` function to keep descending.
//!
//! # Example
//!
//! ```text
//! struct RetargetCalls {
//!     from: CallableId,
//!     to: CallableId,
//! }
//!
//! impl MutVisitor for RetargetCalls {
//!     fn visit_call(&mut self, call: &mut IrCall) {
//!         if call.callee == self.from {
//!             call.callee = self.to.clone();
//!         }
//!         walk_call(self, call);
//!     }
//! }
//! ```

use crate::ids::{CallableId, ClassId};
use crate::ir::{
    IrAnnotation, IrBody, IrCall, IrClass, IrConstructor, IrDeclaration, IrExpression, IrField,
    IrFile, IrFunction, IrModule, IrProperty, IrStatement, IrValueParameter,
};
use crate::types::SourceType;

pub trait MutVisitor {
    fn visit_module(&mut self, module: &mut IrModule) {
        walk_module(self, module);
    }

    fn visit_file(&mut self, file: &mut IrFile) {
        walk_file(self, file);
    }

    fn visit_declaration(&mut self, declaration: &mut IrDeclaration) {
        walk_declaration(self, declaration);
    }

    fn visit_class(&mut self, class: &mut IrClass) {
        walk_class(self, class);
    }

    fn visit_function(&mut self, function: &mut IrFunction) {
        walk_function(self, function);
    }

    fn visit_constructor(&mut self, constructor: &mut IrConstructor) {
        walk_constructor(self, constructor);
    }

    fn visit_property(&mut self, property: &mut IrProperty) {
        walk_property(self, property);
    }

    fn visit_field(&mut self, field: &mut IrField) {
        walk_field(self, field);
    }

    fn visit_value_parameter(&mut self, parameter: &mut IrValueParameter) {
        walk_value_parameter(self, parameter);
    }

    fn visit_annotation(&mut self, annotation: &mut IrAnnotation) {
        self.visit_class_id(&mut annotation.class);
    }

    fn visit_body(&mut self, body: &mut IrBody) {
        walk_statements(self, &mut body.statements);
    }

    fn visit_statement(&mut self, statement: &mut IrStatement) {
        walk_statement(self, statement);
    }

    fn visit_expression(&mut self, expression: &mut IrExpression) {
        walk_expression(self, expression);
    }

    fn visit_call(&mut self, call: &mut IrCall) {
        walk_call(self, call);
    }

    fn visit_type(&mut self, ty: &mut SourceType) {
        walk_type(self, ty);
    }

    /// Every class reference, declaration ids included.
    fn visit_class_id(&mut self, _id: &mut ClassId) {}

    fn visit_callable_id(&mut self, id: &mut CallableId) {
        walk_callable_id(self, id);
    }
}

pub fn walk_module<V: MutVisitor + ?Sized>(visitor: &mut V, module: &mut IrModule) {
    for file in &mut module.files {
        visitor.visit_file(file);
    }
}

pub fn walk_file<V: MutVisitor + ?Sized>(visitor: &mut V, file: &mut IrFile) {
    for declaration in &mut file.declarations {
        visitor.visit_declaration(declaration);
    }
}

pub fn walk_declaration<V: MutVisitor + ?Sized>(visitor: &mut V, declaration: &mut IrDeclaration) {
    match declaration {
        IrDeclaration::Class(class) => visitor.visit_class(class),
        IrDeclaration::Function(function) => visitor.visit_function(function),
        IrDeclaration::Constructor(constructor) => visitor.visit_constructor(constructor),
        IrDeclaration::Property(property) => visitor.visit_property(property),
        IrDeclaration::Field(field) => visitor.visit_field(field),
    }
}

pub fn walk_class<V: MutVisitor + ?Sized>(visitor: &mut V, class: &mut IrClass) {
    visitor.visit_class_id(&mut class.id);
    for parameter in &mut class.type_parameters {
        for bound in &mut parameter.bounds {
            visitor.visit_type(bound);
        }
    }
    for supertype in &mut class.supertypes {
        visitor.visit_type(supertype);
    }
    for annotation in &mut class.annotations {
        visitor.visit_annotation(annotation);
    }
    for declaration in &mut class.declarations {
        visitor.visit_declaration(declaration);
    }
}

pub fn walk_function<V: MutVisitor + ?Sized>(visitor: &mut V, function: &mut IrFunction) {
    visitor.visit_callable_id(&mut function.id);
    for parameter in &mut function.type_parameters {
        for bound in &mut parameter.bounds {
            visitor.visit_type(bound);
        }
    }
    if let Some(receiver) = &mut function.extension_receiver {
        visitor.visit_value_parameter(receiver);
    }
    for parameter in &mut function.value_parameters {
        visitor.visit_value_parameter(parameter);
    }
    visitor.visit_type(&mut function.return_type);
    for annotation in &mut function.annotations {
        visitor.visit_annotation(annotation);
    }
    if let Some(body) = &mut function.body {
        visitor.visit_body(body);
    }
}

pub fn walk_constructor<V: MutVisitor + ?Sized>(visitor: &mut V, constructor: &mut IrConstructor) {
    visitor.visit_class_id(&mut constructor.class);
    for parameter in &mut constructor.value_parameters {
        visitor.visit_value_parameter(parameter);
    }
    if let Some(delegation) = &mut constructor.delegation {
        for argument in delegation.arguments.iter_mut().flatten() {
            visitor.visit_expression(argument);
        }
    }
    if let Some(body) = &mut constructor.body {
        visitor.visit_body(body);
    }
}

pub fn walk_property<V: MutVisitor + ?Sized>(visitor: &mut V, property: &mut IrProperty) {
    visitor.visit_callable_id(&mut property.id);
    visitor.visit_type(&mut property.ty);
    if let Some(getter) = &mut property.getter {
        visitor.visit_body(getter);
    }
    if let Some(setter) = &mut property.setter {
        visitor.visit_body(setter);
    }
    if let Some(initializer) = &mut property.initializer {
        visitor.visit_expression(initializer);
    }
}

pub fn walk_field<V: MutVisitor + ?Sized>(visitor: &mut V, field: &mut IrField) {
    visitor.visit_type(&mut field.ty);
    if let Some(initializer) = &mut field.initializer {
        visitor.visit_expression(initializer);
    }
}

pub fn walk_value_parameter<V: MutVisitor + ?Sized>(
    visitor: &mut V,
    parameter: &mut IrValueParameter,
) {
    visitor.visit_type(&mut parameter.ty);
    if let Some(default_value) = &mut parameter.default_value {
        visitor.visit_expression(default_value);
    }
}

pub fn walk_statements<V: MutVisitor + ?Sized>(visitor: &mut V, statements: &mut [IrStatement]) {
    for statement in statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement<V: MutVisitor + ?Sized>(visitor: &mut V, statement: &mut IrStatement) {
    match statement {
        IrStatement::Expression(expression) | IrStatement::Throw(expression) => {
            visitor.visit_expression(expression)
        }
        IrStatement::Variable {
            ty, initializer, ..
        } => {
            visitor.visit_type(ty);
            if let Some(initializer) = initializer {
                visitor.visit_expression(initializer);
            }
        }
        IrStatement::SetValue { value, .. } => visitor.visit_expression(value),
        IrStatement::SetField {
            receiver, value, ..
        } => {
            if let Some(receiver) = receiver {
                visitor.visit_expression(receiver);
            }
            visitor.visit_expression(value);
        }
        IrStatement::Return(value) => {
            if let Some(value) = value {
                visitor.visit_expression(value);
            }
        }
        IrStatement::If {
            condition,
            then_branch,
            else_branch,
        } => {
            visitor.visit_expression(condition);
            walk_statements(visitor, then_branch);
            walk_statements(visitor, else_branch);
        }
        IrStatement::While { condition, body } => {
            visitor.visit_expression(condition);
            walk_statements(visitor, body);
        }
    }
}

pub fn walk_expression<V: MutVisitor + ?Sized>(visitor: &mut V, expression: &mut IrExpression) {
    match expression {
        IrExpression::Const(_) | IrExpression::Unsupported { .. } => {}
        IrExpression::GetValue { ty, .. } | IrExpression::This { ty } => visitor.visit_type(ty),
        IrExpression::GetField { receiver, ty, .. } => {
            if let Some(receiver) = receiver {
                visitor.visit_expression(receiver);
            }
            visitor.visit_type(ty);
        }
        IrExpression::GetObject { class } => visitor.visit_class_id(class),
        IrExpression::Call(call) => visitor.visit_call(call),
        IrExpression::ConstructorCall {
            class,
            type_arguments,
            arguments,
        } => {
            visitor.visit_class_id(class);
            for ty in type_arguments {
                visitor.visit_type(ty);
            }
            for argument in arguments.iter_mut().flatten() {
                visitor.visit_expression(argument);
            }
        }
        IrExpression::StringConcatenation(parts) => {
            for part in parts {
                visitor.visit_expression(part);
            }
        }
        IrExpression::TypeOperator { operand, ty, .. } => {
            visitor.visit_expression(operand);
            visitor.visit_type(ty);
        }
        IrExpression::When { branches, ty } => {
            for branch in branches {
                visitor.visit_expression(&mut branch.condition);
                visitor.visit_expression(&mut branch.result);
            }
            visitor.visit_type(ty);
        }
        IrExpression::Block { statements, ty } => {
            walk_statements(visitor, statements);
            visitor.visit_type(ty);
        }
    }
}

pub fn walk_call<V: MutVisitor + ?Sized>(visitor: &mut V, call: &mut IrCall) {
    visitor.visit_callable_id(&mut call.callee);
    if let Some(receiver) = &mut call.dispatch_receiver {
        visitor.visit_expression(receiver);
    }
    if let Some(receiver) = &mut call.extension_receiver {
        visitor.visit_expression(receiver);
    }
    for argument in call.arguments.iter_mut().flatten() {
        visitor.visit_expression(argument);
    }
    for ty in &mut call.type_arguments {
        visitor.visit_type(ty);
    }
    visitor.visit_type(&mut call.ty);
}

pub fn walk_type<V: MutVisitor + ?Sized>(visitor: &mut V, ty: &mut SourceType) {
    ty.map_class_ids(&mut |id| visitor.visit_class_id(id));
}

/// Visits the owning class and keeps the package in sync with it.
pub fn walk_callable_id<V: MutVisitor + ?Sized>(visitor: &mut V, id: &mut CallableId) {
    if let Some(class) = &mut id.class {
        visitor.visit_class_id(class);
        id.package = class.package.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::ClassKind;
    use crate::ir::IrConst;
    use crate::types::well_known;

    struct CountConstants(usize);

    impl MutVisitor for CountConstants {
        fn visit_expression(&mut self, expression: &mut IrExpression) {
            if let IrExpression::Const(_) = expression {
                self.0 += 1;
            }
            walk_expression(self, expression);
        }
    }

    struct RenamePackage;

    impl MutVisitor for RenamePackage {
        fn visit_class_id(&mut self, id: &mut ClassId) {
            if id.package.as_str() == "stub" {
                id.package = "kotlin".into();
            }
        }
    }

    fn sample_module() -> IrModule {
        let class_id = ClassId::new("app", "Box");
        let mut class = IrClass::new(class_id.clone(), ClassKind::Class);
        let stub_int = SourceType::class(ClassId::new("stub", "Int"));
        let mut function = IrFunction::new(class_id.member("size"), stub_int.clone());
        let call = IrCall::new(ClassId::new("stub", "Int").member("plus"), stub_int)
            .with_dispatch_receiver(IrExpression::int(1))
            .with_arguments(vec![IrExpression::int(2)]);
        function = function.with_body(vec![IrStatement::Return(Some(IrExpression::Call(call)))]);
        class.declarations.push(IrDeclaration::Function(function));

        let mut file = IrFile::new("box.kt", "app");
        file.declarations.push(IrDeclaration::Class(class));
        let mut module = IrModule::new("main");
        module.files.push(file);
        module
    }

    #[test]
    fn test_walk_reaches_nested_expressions() {
        let mut module = sample_module();
        let mut counter = CountConstants(0);
        counter.visit_module(&mut module);
        assert_eq!(counter.0, 2);
    }

    #[test]
    fn test_class_id_rewrite_updates_callables_and_types() {
        let mut module = sample_module();
        RenamePackage.visit_module(&mut module);

        let class = module.files[0].classes().next().unwrap();
        let function = class.functions().next().unwrap();
        assert_eq!(function.return_type, SourceType::class(well_known::int()));
        let Some(IrStatement::Return(Some(IrExpression::Call(call)))) =
            function.body.as_ref().and_then(|b| b.statements.first())
        else {
            panic!("expected a return of a call");
        };
        assert_eq!(call.callee.to_string(), "kotlin/Int#plus");
        assert_eq!(call.callee.package.as_str(), "kotlin");
        assert_eq!(call.arguments[0], Some(IrExpression::Const(IrConst::Int(2))));
    }
}
