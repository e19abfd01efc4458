//! Statements and expressions → output tree
//!
//! Every expression renders to `Result<Code, UnsupportedShape>`. Compound
//! nodes render their children through [`CodeGenerator::nested`], so an
//! unsupported child degrades to a marker in place and its parent still
//! renders.

use super::code::{Code, InterpolationPart, UnsupportedShape};
use super::generator::{CodeGenerator, Dispatch, Scope};
use super::render::escape_char;
use crate::lowering::intrinsics::intrinsics_class;
use once_cell::sync::Lazy;
use sharpen_ir::{
    well_known, CallableId, ClassId, IrBranch, IrCall, IrConst, IrExpression, IrStatement,
    TypeOperator,
};
use std::collections::HashMap;

/// Built-in top-level functions with a direct platform counterpart
static PLATFORM_FUNCTIONS: Lazy<HashMap<CallableId, &'static str>> = Lazy::new(|| {
    [
        (CallableId::top_level("kotlin.io", "println"), "System.Console.WriteLine"),
        (CallableId::top_level("kotlin.io", "print"), "System.Console.Write"),
    ]
    .into_iter()
    .collect()
});

fn binary_operator(name: &str) -> Option<&'static str> {
    Some(match name {
        "plus" => "+",
        "minus" => "-",
        "times" => "*",
        "div" => "/",
        "rem" => "%",
        "equals" => "==",
        "less" => "<",
        "lessOrEqual" => "<=",
        "greater" => ">",
        "greaterOrEqual" => ">=",
        "and" => "&",
        "or" => "|",
        "xor" => "^",
        "shl" => "<<",
        "shr" => ">>",
        _ => return None,
    })
}

fn unary_operator(name: &str) -> Option<&'static str> {
    Some(match name {
        "not" => "!",
        "unaryMinus" => "-",
        "unaryPlus" => "+",
        _ => return None,
    })
}

fn conversion(name: &str) -> Option<&'static str> {
    Some(match name {
        "toByte" => "sbyte",
        "toShort" => "short",
        "toInt" => "int",
        "toLong" => "long",
        "toFloat" => "float",
        "toDouble" => "double",
        "toChar" => "char",
        _ => return None,
    })
}

fn concat(items: Vec<Code>) -> Code {
    Code::inline(items, "")
}

fn accessor<'n>(name: &'n str, prefix: &str) -> Option<&'n str> {
    name.strip_prefix(prefix)?.strip_suffix('>')
}

/// Target literal for a constant, with type suffixes where needed.
pub fn literal(value: &IrConst) -> String {
    match value {
        IrConst::Null => "null".to_string(),
        IrConst::Boolean(b) => b.to_string(),
        IrConst::Char('\'') => "'\\''".to_string(),
        IrConst::Char(c) => format!("'{}'", escape_char(*c)),
        IrConst::Byte(n) => format!("(sbyte){}", n),
        IrConst::Short(n) => format!("(short){}", n),
        IrConst::Int(n) => n.to_string(),
        IrConst::Long(n) => format!("{}L", n),
        IrConst::Float(n) if n.is_nan() => "float.NaN".to_string(),
        IrConst::Float(n) if n.is_infinite() => {
            if *n > 0.0 { "float.PositiveInfinity" } else { "float.NegativeInfinity" }.to_string()
        }
        IrConst::Float(n) => format!("{:?}f", n),
        IrConst::Double(n) if n.is_nan() => "double.NaN".to_string(),
        IrConst::Double(n) if n.is_infinite() => {
            if *n > 0.0 { "double.PositiveInfinity" } else { "double.NegativeInfinity" }.to_string()
        }
        IrConst::Double(n) => format!("{:?}", n),
        IrConst::UInt(n) => format!("{}u", n),
        IrConst::ULong(n) => format!("{}UL", n),
        IrConst::String(s) => format!("\"{}\"", s.chars().map(escape_char).collect::<String>()),
    }
}

impl<'a> CodeGenerator<'a> {
    pub(crate) fn statements(&self, statements: &[IrStatement], scope: Scope<'_>) -> Vec<Code> {
        statements.iter().map(|statement| self.statement(statement, scope)).collect()
    }

    fn statement(&self, statement: &IrStatement, scope: Scope<'_>) -> Code {
        match statement {
            IrStatement::Expression(IrExpression::Block { statements, .. }) => {
                Code::lines(self.statements(statements, scope))
            }
            IrStatement::Expression(IrExpression::When { branches, .. }) => {
                self.when_statement(branches, scope)
            }
            IrStatement::Expression(expression) => Code::statement(self.nested(expression, scope)),
            IrStatement::Variable {
                name, ty, initializer, ..
            } => {
                let declaration = Code::text(format!("{} {}", self.mapper.map_nullable(ty), name));
                match initializer {
                    Some(value) => {
                        let value = self.nested(value, scope);
                        Code::statement(concat(vec![declaration, Code::text(" = "), value]))
                    }
                    None => Code::statement(declaration),
                }
            }
            IrStatement::SetValue { name, value } => {
                let target = Code::text(format!("{} = ", name));
                Code::statement(concat(vec![target, self.nested(value, scope)]))
            }
            IrStatement::SetField { receiver, field, value } => {
                let target = match receiver {
                    Some(receiver) => {
                        let member = Code::text(format!(".{}", field));
                        concat(vec![self.nested(receiver, scope), member])
                    }
                    None => Code::text(self.implicit_field(field, scope)),
                };
                Code::statement(concat(vec![target, Code::text(" = "), self.nested(value, scope)]))
            }
            IrStatement::Return(None) => Code::text("return;"),
            IrStatement::Return(Some(IrExpression::GetObject { class }))
                if class == &well_known::unit() =>
            {
                Code::text("return;")
            }
            IrStatement::Return(Some(value)) => {
                Code::statement(concat(vec![Code::text("return "), self.nested(value, scope)]))
            }
            IrStatement::If {
                condition,
                then_branch,
                else_branch,
            } => Code::If {
                condition: Box::new(self.nested(condition, scope)),
                then_branch: Box::new(Code::lines(self.statements(then_branch, scope))),
                else_branch: match else_branch.as_slice() {
                    [] => None,
                    [nested @ IrStatement::If { .. }] => {
                        Some(Box::new(self.statement(nested, scope)))
                    }
                    statements => {
                        Some(Box::new(Code::lines(self.statements(statements, scope))))
                    }
                },
            },
            IrStatement::While { condition, body } => Code::block(
                concat(vec![Code::text("while ("), self.nested(condition, scope), Code::text(")")]),
                self.statements(body, scope),
            ),
            IrStatement::Throw(value) => {
                Code::statement(concat(vec![Code::text("throw "), self.nested(value, scope)]))
            }
        }
    }

    /// A `when` used for its effect becomes an `if`/`else if` chain.
    fn when_statement(&self, branches: &[IrBranch], scope: Scope<'_>) -> Code {
        let mut chain: Option<Code> = None;
        for branch in branches.iter().rev() {
            let result = Code::statement(self.nested(&branch.result, scope));
            chain = Some(match &branch.condition {
                IrExpression::Const(IrConst::Boolean(true)) => result,
                condition => Code::If {
                    condition: Box::new(self.nested(condition, scope)),
                    then_branch: Box::new(result),
                    else_branch: chain.map(Box::new),
                },
            });
        }
        chain.unwrap_or(Code::None)
    }

    /// Render a child expression, degrading to a marker when unsupported.
    pub(crate) fn nested(&self, expression: &IrExpression, scope: Scope<'_>) -> Code {
        self.expression(expression, scope).unwrap_or_else(|shape| self.mark(shape))
    }

    pub(crate) fn expression(
        &self,
        expression: &IrExpression,
        scope: Scope<'_>,
    ) -> Result<Code, UnsupportedShape> {
        match expression {
            IrExpression::Const(value) => Ok(Code::text(literal(value))),
            IrExpression::GetValue { name, .. } => Ok(Code::text(name.clone())),
            IrExpression::This { .. } => Ok(Code::text("this")),
            IrExpression::GetField {
                receiver: Some(receiver),
                field,
                ..
            } => Ok(concat(vec![self.nested(receiver, scope), Code::text(format!(".{}", field))])),
            IrExpression::GetField {
                receiver: None, field, ..
            } => Ok(Code::text(self.implicit_field(field, scope))),
            IrExpression::GetObject { class } => Ok(Code::text(self.static_qualifier(class))),
            IrExpression::Call(call) => Ok(self.call(call, scope)),
            IrExpression::ConstructorCall {
                class,
                type_arguments,
                arguments,
            } => {
                let ty = sharpen_ir::SourceType::generic(class.clone(), type_arguments.clone());
                Ok(concat(vec![
                    Code::text(format!("new {}", self.mapper.map_type(&ty))),
                    self.arguments(arguments, scope),
                ]))
            }
            IrExpression::StringConcatenation(parts) => Ok(Code::Interpolation(
                parts
                    .iter()
                    .map(|part| match part {
                        IrExpression::Const(value) => {
                            InterpolationPart::Text(value.template_text())
                        }
                        other => InterpolationPart::Code(self.nested(other, scope)),
                    })
                    .collect(),
            )),
            IrExpression::TypeOperator { operator, operand, ty } => {
                let operand = self.nested(operand, scope);
                Ok(match operator {
                    TypeOperator::Is => concat(vec![
                        Code::text("("),
                        operand,
                        Code::text(format!(" is {})", self.mapper.map_type(ty))),
                    ]),
                    TypeOperator::NotIs => concat(vec![
                        Code::text("!("),
                        operand,
                        Code::text(format!(" is {})", self.mapper.map_type(ty))),
                    ]),
                    TypeOperator::Cast => concat(vec![
                        Code::text(format!("(({})", self.mapper.map_nullable(ty))),
                        operand,
                        Code::text(")"),
                    ]),
                    TypeOperator::SafeCast => concat(vec![
                        Code::text("("),
                        operand,
                        Code::text(format!(
                            " as {})",
                            self.mapper.map_nullable(&ty.clone().nullable())
                        )),
                    ]),
                })
            }
            IrExpression::When { branches, .. } => self.when_expression(branches, scope),
            IrExpression::Block { .. } => Err(UnsupportedShape::new(expression.kind_name())),
            IrExpression::Unsupported { kind } => Err(UnsupportedShape::new(kind.clone())),
        }
    }

    /// Nested conditional expressions, last branch innermost.
    fn when_expression(
        &self,
        branches: &[IrBranch],
        scope: Scope<'_>,
    ) -> Result<Code, UnsupportedShape> {
        let mut chain: Option<Code> = None;
        for branch in branches.iter().rev() {
            let result = self.nested(&branch.result, scope);
            chain = Some(match &branch.condition {
                IrExpression::Const(IrConst::Boolean(true)) => result,
                condition => Code::If {
                    condition: Box::new(self.nested(condition, scope)),
                    then_branch: Box::new(result),
                    else_branch: chain.map(Box::new),
                },
            });
        }
        chain.ok_or_else(|| UnsupportedShape::new("EMPTY_WHEN"))
    }

    fn implicit_field(&self, field: &str, scope: Scope<'_>) -> String {
        if scope.is_static {
            field.to_string()
        } else {
            format!("this.{}", field)
        }
    }

    /// `(a, b)`; trailing defaulted arguments are left to the callee.
    pub(crate) fn arguments(&self, arguments: &[Option<IrExpression>], scope: Scope<'_>) -> Code {
        let end = arguments.iter().rposition(Option::is_some).map_or(0, |index| index + 1);
        let items = arguments[..end]
            .iter()
            .map(|argument| match argument {
                Some(argument) => self.nested(argument, scope),
                None => self.mark(UnsupportedShape::new("DEFAULT_ARGUMENT")),
            })
            .collect();
        concat(vec![Code::text("("), Code::inline(items, ", "), Code::text(")")])
    }

    fn call(&self, call: &IrCall, scope: Scope<'_>) -> Code {
        if let Some(operator) = self.operator(call, scope) {
            return operator;
        }
        let name = call.callee.name.as_str();
        let qualifier = self.qualifier(call, scope);
        let member = |member: String| match &qualifier {
            Some(qualifier) => concat(vec![qualifier.clone(), Code::text(format!(".{}", member))]),
            None => Code::text(member),
        };

        if let Some(property) = accessor(name, "<get-") {
            return member(property.to_string());
        }
        if let Some(property) = accessor(name, "<set-") {
            let value = match call.arguments.first() {
                Some(Some(value)) => self.nested(value, scope),
                _ => self.mark(UnsupportedShape::new("SETTER_WITHOUT_VALUE")),
            };
            return concat(vec![member(property.to_string()), Code::text(" = "), value]);
        }

        let mut arguments = Vec::with_capacity(call.arguments.len() + 1);
        if let Some(receiver) = &call.extension_receiver {
            arguments.push(Some(receiver.as_ref().clone()));
        }
        arguments.extend(call.arguments.iter().cloned());
        let arguments = self.arguments(&arguments, scope);

        if let Some(target) = PLATFORM_FUNCTIONS.get(&call.callee) {
            return concat(vec![Code::text(*target), arguments]);
        }

        let mut callee = name.to_string();
        if !call.type_arguments.is_empty() {
            let types: Vec<String> =
                call.type_arguments.iter().map(|ty| self.mapper.map_type(ty)).collect();
            callee = format!("{}<{}>", callee, types.join(", "));
        }
        concat(vec![member(callee), arguments])
    }

    /// What goes before the `.` of a call: the receiver, a static holder,
    /// or nothing for calls within the same class and implicit `this`.
    fn qualifier(&self, call: &IrCall, scope: Scope<'_>) -> Option<Code> {
        if let Some(receiver) = &call.dispatch_receiver {
            if let IrExpression::GetObject { class } = receiver.as_ref() {
                if scope.class == Some(class) {
                    return None;
                }
            }
            return Some(self.nested(receiver, scope));
        }
        match &call.callee.class {
            Some(owner) if scope.class == Some(owner) => None,
            Some(owner) => match self.dispatch(owner) {
                Dispatch::Companion | Dispatch::Static | Dispatch::Singleton => {
                    Some(Code::text(self.static_qualifier(owner)))
                }
                Dispatch::Instance if self.is_static_member(owner, &call.callee) => {
                    Some(Code::text(self.class_name(owner)))
                }
                Dispatch::Instance => None,
            },
            None => self.top_level_qualifier(&call.callee),
        }
    }

    fn is_static_member(&self, owner: &ClassId, callee: &CallableId) -> bool {
        owner == &intrinsics_class()
            || self.symbols.functions_by_id(callee).iter().any(|f| f.is_static)
    }

    fn top_level_qualifier(&self, callee: &CallableId) -> Option<Code> {
        let holder = self
            .symbols
            .top_level_callables(&callee.package, &callee.name)
            .into_iter()
            .find_map(|callable| callable.static_holder().cloned());
        match holder {
            Some(holder) => Some(Code::text(self.class_name(&holder))),
            None if callee.package.is_root() => None,
            None => Some(Code::text(callee.package.as_str())),
        }
    }

    /// Operator members of built-in types render as target operators.
    fn operator(&self, call: &IrCall, scope: Scope<'_>) -> Option<Code> {
        let owner = call.callee.class.as_ref()?;
        if owner.package.as_str() != "kotlin" || call.extension_receiver.is_some() {
            return None;
        }
        let receiver = call.dispatch_receiver.as_deref()?;
        let name = call.callee.name.as_str();
        match call.arguments.as_slice() {
            [] => {
                let (prefix, suffix) = if let Some(operator) = unary_operator(name) {
                    (format!("{}(", operator), ")")
                } else if let Some(target) = conversion(name) {
                    (format!("(({})", target), ")")
                } else {
                    match name {
                        "toString" => (String::new(), ".ToString()"),
                        "inc" => ("(".to_string(), " + 1)"),
                        "dec" => ("(".to_string(), " - 1)"),
                        _ => return None,
                    }
                };
                let receiver = self.nested(receiver, scope);
                Some(concat(vec![Code::text(prefix), receiver, Code::text(suffix)]))
            }
            [Some(argument)] => {
                let (open, infix) = if name == "compareTo" {
                    ("", ".CompareTo(".to_string())
                } else {
                    ("(", format!(" {} ", binary_operator(name)?))
                };
                Some(concat(vec![
                    Code::text(open),
                    self.nested(receiver, scope),
                    Code::text(infix),
                    self.nested(argument, scope),
                    Code::text(")"),
                ]))
            }
            _ => None,
        }
    }
}
