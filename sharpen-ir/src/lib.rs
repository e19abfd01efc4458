//! Sharpen IR
//!
//! Identifiers, the resolved source type model and the lowered IR tree the
//! frontend hands to the backend.

pub mod decl;
pub mod dump;
pub mod ids;
pub mod ir;
pub mod types;
pub mod visitor;

pub use decl::{ClassKind, Modality, Variance, Visibility};
pub use ids::{CallableId, ClassId, FqName, IdParseError, DEFAULT_COMPANION};
pub use ir::{
    DelegationKind, IrAnnotation, IrBody, IrBranch, IrCall, IrClass, IrConst, IrConstructor,
    IrDeclaration, IrDelegatingCall, IrExpression, IrField, IrFile, IrFunction, IrModule,
    IrOrigin, IrProperty, IrStatement, IrTypeParameter, IrValueParameter, TypeOperator,
    INIT_NAME,
};
pub use types::{well_known, SourceType, TypeArgument};
pub use visitor::MutVisitor;
