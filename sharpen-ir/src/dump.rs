//! Indented text dump of the IR, written before and after lowering.

use crate::ir::{
    IrBody, IrCall, IrClass, IrConstructor, IrDeclaration, IrExpression, IrField, IrFile,
    IrFunction, IrModule, IrOrigin, IrProperty, IrStatement, IrValueParameter,
};
use std::fmt::Write;

const INDENT: &str = "  ";

pub fn dump_module(module: &IrModule) -> String {
    let mut dumper = Dumper::default();
    dumper.line(format_args!("MODULE name:{}", module.name));
    dumper.depth += 1;
    for file in &module.files {
        dumper.file(file);
    }
    dumper.out
}

pub fn dump_file(file: &IrFile) -> String {
    let mut dumper = Dumper::default();
    dumper.file(file);
    dumper.out
}

#[derive(Default)]
struct Dumper {
    out: String,
    depth: usize,
}

impl Dumper {
    fn line(&mut self, text: std::fmt::Arguments<'_>) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        let _ = self.out.write_fmt(text);
        self.out.push('\n');
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn file(&mut self, file: &IrFile) {
        self.line(format_args!("FILE name:{} package:{}", file.name, file.package));
        self.nested(|d| {
            for declaration in &file.declarations {
                d.declaration(declaration);
            }
        });
    }

    fn declaration(&mut self, declaration: &IrDeclaration) {
        match declaration {
            IrDeclaration::Class(class) => self.class(class),
            IrDeclaration::Function(function) => self.function(function),
            IrDeclaration::Constructor(constructor) => self.constructor(constructor),
            IrDeclaration::Property(property) => self.property(property),
            IrDeclaration::Field(field) => self.field(field),
        }
    }

    fn class(&mut self, class: &IrClass) {
        self.line(format_args!(
            "CLASS {:?} id:{} modality:{:?} visibility:{:?}{}",
            class.kind,
            class.id,
            class.modality,
            class.visibility,
            origin_suffix(class.origin)
        ));
        self.nested(|d| {
            for supertype in &class.supertypes {
                d.line(format_args!("SUPER {}", supertype));
            }
            for annotation in &class.annotations {
                d.line(format_args!("ANNOTATION {}", annotation.class));
            }
            for entry in &class.enum_entries {
                d.line(format_args!("ENUM_ENTRY {}", entry));
            }
            for declaration in &class.declarations {
                d.declaration(declaration);
            }
        });
    }

    fn function(&mut self, function: &IrFunction) {
        self.line(format_args!(
            "FUN {} returnType:{}{}{}",
            function.id,
            function.return_type,
            if function.is_static { " static" } else { "" },
            origin_suffix(function.origin)
        ));
        self.nested(|d| {
            if let Some(receiver) = &function.extension_receiver {
                d.line(format_args!("RECEIVER {}", receiver.ty));
            }
            for parameter in &function.value_parameters {
                d.parameter(parameter);
            }
            if let Some(body) = &function.body {
                d.body(body);
            }
        });
    }

    fn constructor(&mut self, constructor: &IrConstructor) {
        self.line(format_args!(
            "CONSTRUCTOR {}{}{}",
            constructor.class,
            if constructor.is_primary { " primary" } else { "" },
            origin_suffix(constructor.origin)
        ));
        self.nested(|d| {
            for parameter in &constructor.value_parameters {
                d.parameter(parameter);
            }
            if let Some(delegation) = &constructor.delegation {
                d.line(format_args!("DELEGATE {:?}", delegation.kind));
                d.nested(|d| d.arguments(&delegation.arguments));
            }
            if let Some(body) = &constructor.body {
                d.body(body);
            }
        });
    }

    fn property(&mut self, property: &IrProperty) {
        self.line(format_args!(
            "PROPERTY {} type:{}{}{}",
            property.id,
            property.ty,
            if property.is_var { " var" } else { " val" },
            origin_suffix(property.origin)
        ));
        self.nested(|d| {
            if let Some(initializer) = &property.initializer {
                d.expression(initializer);
            }
            if let Some(getter) = &property.getter {
                d.line(format_args!("GETTER"));
                d.nested(|d| d.body(getter));
            }
            if let Some(setter) = &property.setter {
                d.line(format_args!("SETTER"));
                d.nested(|d| d.body(setter));
            }
        });
    }

    fn field(&mut self, field: &IrField) {
        self.line(format_args!(
            "FIELD {} type:{}{}",
            field.name,
            field.ty,
            if field.is_static { " static" } else { "" }
        ));
        if let Some(initializer) = &field.initializer {
            self.nested(|d| d.expression(initializer));
        }
    }

    fn parameter(&mut self, parameter: &IrValueParameter) {
        self.line(format_args!(
            "VALUE_PARAMETER {}:{}{}",
            parameter.name,
            parameter.ty,
            if parameter.is_vararg { " vararg" } else { "" }
        ));
        if let Some(default_value) = &parameter.default_value {
            self.nested(|d| {
                d.line(format_args!("DEFAULT"));
                d.nested(|d| d.expression(default_value));
            });
        }
    }

    fn body(&mut self, body: &IrBody) {
        self.line(format_args!("BODY"));
        self.nested(|d| d.statements(&body.statements));
    }

    fn statements(&mut self, statements: &[IrStatement]) {
        for statement in statements {
            self.statement(statement);
        }
    }

    fn statement(&mut self, statement: &IrStatement) {
        match statement {
            IrStatement::Expression(expression) => self.expression(expression),
            IrStatement::Variable {
                name,
                ty,
                initializer,
                is_var,
            } => {
                self.line(format_args!(
                    "VAR {} {}:{}",
                    if *is_var { "var" } else { "val" },
                    name,
                    ty
                ));
                if let Some(initializer) = initializer {
                    self.nested(|d| d.expression(initializer));
                }
            }
            IrStatement::SetValue { name, value } => {
                self.line(format_args!("SET_VALUE {}", name));
                self.nested(|d| d.expression(value));
            }
            IrStatement::SetField {
                receiver,
                field,
                value,
            } => {
                self.line(format_args!("SET_FIELD {}", field));
                self.nested(|d| {
                    if let Some(receiver) = receiver {
                        d.expression(receiver);
                    }
                    d.expression(value);
                });
            }
            IrStatement::Return(value) => {
                self.line(format_args!("RETURN"));
                if let Some(value) = value {
                    self.nested(|d| d.expression(value));
                }
            }
            IrStatement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.line(format_args!("IF"));
                self.nested(|d| {
                    d.expression(condition);
                    d.line(format_args!("THEN"));
                    d.nested(|d| d.statements(then_branch));
                    if !else_branch.is_empty() {
                        d.line(format_args!("ELSE"));
                        d.nested(|d| d.statements(else_branch));
                    }
                });
            }
            IrStatement::While { condition, body } => {
                self.line(format_args!("WHILE"));
                self.nested(|d| {
                    d.expression(condition);
                    d.nested(|d| d.statements(body));
                });
            }
            IrStatement::Throw(value) => {
                self.line(format_args!("THROW"));
                self.nested(|d| d.expression(value));
            }
        }
    }

    fn arguments(&mut self, arguments: &[Option<IrExpression>]) {
        for argument in arguments {
            match argument {
                Some(argument) => self.expression(argument),
                None => self.line(format_args!("<default>")),
            }
        }
    }

    fn call(&mut self, call: &IrCall) {
        self.line(format_args!("CALL {} type:{}", call.callee, call.ty));
        self.nested(|d| {
            if let Some(receiver) = &call.dispatch_receiver {
                d.line(format_args!("$this:"));
                d.nested(|d| d.expression(receiver));
            }
            if let Some(receiver) = &call.extension_receiver {
                d.line(format_args!("$receiver:"));
                d.nested(|d| d.expression(receiver));
            }
            d.arguments(&call.arguments);
        });
    }

    fn expression(&mut self, expression: &IrExpression) {
        let kind = expression.kind_name();
        match expression {
            IrExpression::Const(value) => {
                self.line(format_args!("{} {:?} type:{}", kind, value, value.ty()))
            }
            IrExpression::GetValue { name, ty } => {
                self.line(format_args!("{} {} type:{}", kind, name, ty))
            }
            IrExpression::This { ty } => self.line(format_args!("{} type:{}", kind, ty)),
            IrExpression::GetField {
                receiver,
                field,
                ty,
            } => {
                self.line(format_args!("{} {} type:{}", kind, field, ty));
                if let Some(receiver) = receiver {
                    self.nested(|d| d.expression(receiver));
                }
            }
            IrExpression::GetObject { class } => self.line(format_args!("{} {}", kind, class)),
            IrExpression::Call(call) => self.call(call),
            IrExpression::ConstructorCall {
                class, arguments, ..
            } => {
                self.line(format_args!("{} {}", kind, class));
                self.nested(|d| d.arguments(arguments));
            }
            IrExpression::StringConcatenation(parts) => {
                self.line(format_args!("{}", kind));
                self.nested(|d| {
                    for part in parts {
                        d.expression(part);
                    }
                });
            }
            IrExpression::TypeOperator {
                operator,
                operand,
                ty,
            } => {
                self.line(format_args!("{} {:?} {}", kind, operator, ty));
                self.nested(|d| d.expression(operand));
            }
            IrExpression::When { branches, ty } => {
                self.line(format_args!("{} type:{}", kind, ty));
                self.nested(|d| {
                    for branch in branches {
                        d.line(format_args!("BRANCH"));
                        d.nested(|d| {
                            d.expression(&branch.condition);
                            d.expression(&branch.result);
                        });
                    }
                });
            }
            IrExpression::Block { statements, ty } => {
                self.line(format_args!("{} type:{}", kind, ty));
                self.nested(|d| d.statements(statements));
            }
            IrExpression::Unsupported { kind } => {
                self.line(format_args!("UNSUPPORTED {}", kind))
            }
        }
    }
}

fn origin_suffix(origin: IrOrigin) -> String {
    match origin {
        IrOrigin::Defined => String::new(),
        other => format!(" origin:{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CallableId;
    use crate::types::SourceType;

    #[test]
    fn test_dump_nests_by_depth() {
        let mut file = IrFile::new("main.kt", "app");
        let call = IrCall::new(CallableId::top_level("kotlin.io", "println"), SourceType::unit())
            .with_arguments(vec![IrExpression::string("hi")]);
        let main = IrFunction::new(CallableId::top_level("app", "main"), SourceType::unit())
            .with_body(vec![IrStatement::Expression(IrExpression::Call(call))]);
        file.declarations.push(IrDeclaration::Function(main));

        let dump = dump_file(&file);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "FILE name:main.kt package:app");
        assert_eq!(lines[1], "  FUN app#main returnType:kotlin.Unit");
        assert_eq!(lines[2], "    BODY");
        assert_eq!(lines[3], "      CALL kotlin.io#println type:kotlin.Unit");
        assert!(lines[4].trim_start().starts_with("CONST String(\"hi\")"));
    }

    #[test]
    fn test_dump_marks_synthetic_origins() {
        let mut module = IrModule::new("main");
        let mut file = IrFile::new("main.kt", "");
        let mut function =
            IrFunction::new(CallableId::top_level("", "Main"), SourceType::unit());
        function.origin = IrOrigin::EntryPoint;
        file.declarations.push(IrDeclaration::Function(function));
        module.files.push(file);
        assert!(dump_module(&module).contains("origin:EntryPoint"));
    }
}
