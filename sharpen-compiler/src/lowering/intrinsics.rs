//! Platform intrinsic rewrites
//!
//! Calls to built-ins with a platform replacement in
//! `sharpen.internal.Intrinsics` are rewritten to static calls of that
//! replacement, receiver first. A call is rewritten only when every operand
//! is present and coercible to the intrinsic's parameter type; otherwise it
//! is left exactly as it was.

use super::{FileLoweringPass, LoweringContext};
use once_cell::sync::Lazy;
use sharpen_ir::visitor::{walk_expression, MutVisitor};
use sharpen_ir::{well_known, CallableId, ClassId, IrCall, IrExpression, IrFile, SourceType};
use std::collections::HashMap;
use tracing::debug;

pub const INTRINSICS_PACKAGE: &str = "sharpen.internal";
pub const INTRINSICS_CLASS: &str = "Intrinsics";

pub fn intrinsics_class() -> ClassId {
    ClassId::new(INTRINSICS_PACKAGE, INTRINSICS_CLASS)
}

/// A platform replacement for a built-in callable
#[derive(Debug, Clone, PartialEq)]
pub struct Intrinsic {
    pub name: &'static str,
    /// Receiver first
    pub parameters: Vec<SourceType>,
}

impl Intrinsic {
    pub fn callee(&self) -> CallableId {
        intrinsics_class().member(self.name)
    }
}

static INTRINSICS: Lazy<HashMap<CallableId, Intrinsic>> = Lazy::new(|| {
    let uint = || SourceType::class(well_known::uint());
    let ulong = || SourceType::class(well_known::ulong());
    let entries = [
        (well_known::uint(), "compareTo", "UIntCompare", vec![uint(), uint()]),
        (well_known::uint(), "div", "UIntDivide", vec![uint(), uint()]),
        (well_known::uint(), "rem", "UIntRemainder", vec![uint(), uint()]),
        (well_known::uint(), "toString", "UIntToString", vec![uint()]),
        (well_known::uint(), "toInt", "UIntToInt", vec![uint()]),
        (well_known::ulong(), "compareTo", "ULongCompare", vec![ulong(), ulong()]),
        (well_known::ulong(), "div", "ULongDivide", vec![ulong(), ulong()]),
        (well_known::ulong(), "rem", "ULongRemainder", vec![ulong(), ulong()]),
        (well_known::ulong(), "toString", "ULongToString", vec![ulong()]),
        (well_known::ulong(), "toLong", "ULongToLong", vec![ulong()]),
        (well_known::int(), "toUInt", "IntToUInt", vec![SourceType::int()]),
        (well_known::long(), "toULong", "LongToULong", vec![SourceType::long()]),
    ];
    entries
        .into_iter()
        .map(|(owner, member, name, parameters)| {
            (owner.member(member), Intrinsic { name, parameters })
        })
        .collect()
});

pub fn intrinsic_for(callee: &CallableId) -> Option<&'static Intrinsic> {
    INTRINSICS.get(callee)
}

/// Same class, and never a possibly-null value into a value type.
pub fn is_coercible(from: &SourceType, to: &SourceType) -> bool {
    if from.is_nothing() && !from.is_nullable() {
        return true;
    }
    from.class_id().is_some()
        && from.class_id() == to.class_id()
        && (!from.is_nullable() || to.is_nullable())
}

/// The rewritten call, or `None` when any operand does not fit.
pub fn rewrite(call: &IrCall, intrinsic: &Intrinsic) -> Option<IrCall> {
    if call.extension_receiver.is_some() || !call.type_arguments.is_empty() {
        return None;
    }
    let operands = call.operands();
    if operands.len() != intrinsic.parameters.len() {
        return None;
    }
    let mut arguments = Vec::with_capacity(operands.len());
    for (operand, parameter) in operands.into_iter().zip(&intrinsic.parameters) {
        let operand = operand?;
        if !is_coercible(&operand.ty(), parameter) {
            return None;
        }
        arguments.push(operand.clone());
    }
    Some(IrCall::new(intrinsic.callee(), call.ty.clone()).with_arguments(arguments))
}

pub struct IntrinsicRewrite;

impl FileLoweringPass for IntrinsicRewrite {
    fn name(&self) -> &'static str {
        "intrinsic-rewrite"
    }

    fn lower(&mut self, file: &mut IrFile, _context: &LoweringContext<'_>) -> usize {
        let mut rewriter = Rewriter { rewrites: 0 };
        rewriter.visit_file(file);
        rewriter.rewrites
    }
}

struct Rewriter {
    rewrites: usize,
}

impl MutVisitor for Rewriter {
    fn visit_expression(&mut self, expression: &mut IrExpression) {
        walk_expression(self, expression);
        let IrExpression::Call(call) = expression else {
            return;
        };
        let Some(intrinsic) = intrinsic_for(&call.callee) else {
            return;
        };
        match rewrite(call, intrinsic) {
            Some(rewritten) => {
                *call = rewritten;
                self.rewrites += 1;
            }
            None => debug!("Keeping {}: operands not coercible to {}", call.callee, intrinsic.name),
        }
    }
}
