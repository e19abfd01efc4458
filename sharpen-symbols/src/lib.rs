//! Sharpen symbols
//!
//! The symbol graph the frontend consults as an additional symbol source:
//! classes and callables synthesized from foreign metadata, and the
//! hand-built built-ins used when compiling the standard library.

pub mod builtins;
pub mod foreign;
pub mod graph;
pub mod synthesizer;

pub use builtins::{actualize_annotation, ActualizationReport, BuiltinsProvider};
pub use foreign::ForeignTypes;
pub use graph::{
    CallableSymbol, ClassHandle, ClassSymbol, ConstructorHandle, ConstructorSymbol,
    FunctionHandle, FunctionSymbol, LayeredSymbols, MemberSymbol, ParameterSymbol,
    PropertyHandle, PropertySymbol, SymbolGraph, SymbolOrigin, SymbolProvider,
    TypeParameterSymbol,
};
pub use synthesizer::{synthesize, SkipReason, SkippedType, SymbolSynthesizer, SynthesisReport};

use sharpen_ir::ClassId;

pub type Result<T> = std::result::Result<T, SymbolError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("class {0} is already defined")]
    DuplicateClass(ClassId),

    #[error("cannot add {member}: owner class {owner} is not defined")]
    UnknownOwner { owner: ClassId, member: String },
}
