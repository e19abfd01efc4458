//! Code generation
//!
//! The lowered IR is turned into an output tree ([`Code`]) which is then
//! rendered either as target source text or as a debug tag dump.

pub mod code;
mod expressions;
pub mod generator;
pub mod render;

pub use code::{Code, InterpolationPart, Join, UnsupportedShape};
pub use generator::{CodeGenerator, GeneratedFile};
pub use render::{TextRenderer, XmlRenderer};

/// Extension of generated source files
pub const SOURCE_EXTENSION: &str = "cs";
