//! Compile-time constant folding
//!
//! Folds built-in operator calls whose receiver and arguments are all
//! constants, and string concatenations whose parts are all constants.
//! Integer arithmetic wraps. Division and remainder by zero are left for
//! the runtime.

use super::{LoweringContext, ModuleLoweringPass};
use sharpen_ir::visitor::{walk_expression, MutVisitor};
use sharpen_ir::{IrCall, IrConst, IrExpression, IrModule};
use std::cmp::Ordering;

const BUILTINS_PACKAGE: &str = "kotlin";

pub struct ConstantFolding;

impl ModuleLoweringPass for ConstantFolding {
    fn name(&self) -> &'static str {
        "constant-folding"
    }

    fn lower(&mut self, module: &mut IrModule, _context: &LoweringContext<'_>) -> usize {
        let mut folder = Folder { folded: 0 };
        folder.visit_module(module);
        folder.folded
    }
}

struct Folder {
    folded: usize,
}

impl MutVisitor for Folder {
    fn visit_expression(&mut self, expression: &mut IrExpression) {
        walk_expression(self, expression);
        if let Some(value) = fold(expression) {
            *expression = IrExpression::Const(value);
            self.folded += 1;
        }
    }
}

/// Constant value of `expression` if its operands are already constants.
pub fn fold(expression: &IrExpression) -> Option<IrConst> {
    match expression {
        IrExpression::Call(call) => fold_call(call),
        IrExpression::StringConcatenation(parts) => {
            let mut text = String::new();
            for part in parts {
                text.push_str(&part.as_const()?.template_text());
            }
            Some(IrConst::String(text))
        }
        _ => None,
    }
}

fn fold_call(call: &IrCall) -> Option<IrConst> {
    let owner = call.callee.class.as_ref()?;
    if owner.package.as_str() != BUILTINS_PACKAGE || call.extension_receiver.is_some() {
        return None;
    }
    let receiver = call.dispatch_receiver.as_deref()?.as_const()?;
    let arguments = call
        .arguments
        .iter()
        .map(|argument| argument.as_ref().and_then(IrExpression::as_const))
        .collect::<Option<Vec<_>>>()?;
    let name = call.callee.name.as_str();

    let value = match (receiver, arguments.as_slice()) {
        (IrConst::Boolean(value), []) if name == "not" => IrConst::Boolean(!value),
        (IrConst::Boolean(a), [IrConst::Boolean(b)]) => match name {
            "and" => IrConst::Boolean(*a && *b),
            "or" => IrConst::Boolean(*a || *b),
            "xor" => IrConst::Boolean(a != b),
            "equals" => IrConst::Boolean(a == b),
            _ => return None,
        },
        (IrConst::String(a), [IrConst::String(b)]) if name == "equals" => IrConst::Boolean(a == b),
        (IrConst::String(a), [other]) if name == "plus" => {
            IrConst::String(format!("{}{}", a, other.template_text()))
        }
        (value, []) => unary(name, Number::of(value)?)?,
        (left, [right]) => binary(name, Number::of(left)?, Number::of(right)?)?,
        _ => return None,
    };

    // Never change the type of the expression
    let folded_type = value.ty();
    (folded_type.class_id() == call.ty.class_id()).then_some(value)
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i32),
    Long(i64),
    Double(f64),
}

impl Number {
    fn of(value: &IrConst) -> Option<Number> {
        match value {
            IrConst::Byte(n) => Some(Number::Int(i32::from(*n))),
            IrConst::Short(n) => Some(Number::Int(i32::from(*n))),
            IrConst::Int(n) => Some(Number::Int(*n)),
            IrConst::Long(n) => Some(Number::Long(*n)),
            IrConst::Double(n) => Some(Number::Double(*n)),
            _ => None,
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            Number::Int(n) => i64::from(n),
            Number::Long(n) => n,
            Number::Double(n) => n as i64,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => f64::from(n),
            Number::Long(n) => n as f64,
            Number::Double(n) => n,
        }
    }
}

fn unary(name: &str, operand: Number) -> Option<IrConst> {
    let value = match (name, operand) {
        ("unaryPlus", _) => constant(operand),
        ("unaryMinus", Number::Int(n)) => IrConst::Int(n.wrapping_neg()),
        ("unaryMinus", Number::Long(n)) => IrConst::Long(n.wrapping_neg()),
        ("unaryMinus", Number::Double(n)) => IrConst::Double(-n),
        ("toInt", Number::Int(n)) => IrConst::Int(n),
        ("toInt", Number::Long(n)) => IrConst::Int(n as i32),
        ("toInt", Number::Double(n)) => IrConst::Int(n as i32),
        ("toLong", _) => IrConst::Long(operand.as_i64()),
        ("toDouble", _) => IrConst::Double(operand.as_f64()),
        _ => return None,
    };
    Some(value)
}

fn constant(number: Number) -> IrConst {
    match number {
        Number::Int(n) => IrConst::Int(n),
        Number::Long(n) => IrConst::Long(n),
        Number::Double(n) => IrConst::Double(n),
    }
}

fn ordering(ordering: Ordering) -> IrConst {
    IrConst::Int(match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    })
}

fn binary(name: &str, left: Number, right: Number) -> Option<IrConst> {
    match (left, right) {
        (Number::Double(_), _) | (_, Number::Double(_)) => {
            let (a, b) = (left.as_f64(), right.as_f64());
            let value = match name {
                "plus" => IrConst::Double(a + b),
                "minus" => IrConst::Double(a - b),
                "times" => IrConst::Double(a * b),
                "div" | "rem" if b == 0.0 => return None,
                "div" => IrConst::Double(a / b),
                "rem" => IrConst::Double(a % b),
                "compareTo" => ordering(a.partial_cmp(&b)?),
                "equals" => IrConst::Boolean(a == b),
                _ => return None,
            };
            Some(value)
        }
        (Number::Long(_), _) | (_, Number::Long(_)) => {
            let (a, b) = (left.as_i64(), right.as_i64());
            let value = match name {
                "plus" => IrConst::Long(a.wrapping_add(b)),
                "minus" => IrConst::Long(a.wrapping_sub(b)),
                "times" => IrConst::Long(a.wrapping_mul(b)),
                "div" | "rem" if b == 0 => return None,
                "div" => IrConst::Long(a.wrapping_div(b)),
                "rem" => IrConst::Long(a.wrapping_rem(b)),
                "compareTo" => ordering(a.cmp(&b)),
                "equals" => IrConst::Boolean(a == b),
                _ => return None,
            };
            Some(value)
        }
        (Number::Int(a), Number::Int(b)) => {
            let value = match name {
                "plus" => IrConst::Int(a.wrapping_add(b)),
                "minus" => IrConst::Int(a.wrapping_sub(b)),
                "times" => IrConst::Int(a.wrapping_mul(b)),
                "div" | "rem" if b == 0 => return None,
                "div" => IrConst::Int(a.wrapping_div(b)),
                "rem" => IrConst::Int(a.wrapping_rem(b)),
                "compareTo" => ordering(a.cmp(&b)),
                "equals" => IrConst::Boolean(a == b),
                _ => return None,
            };
            Some(value)
        }
    }
}
