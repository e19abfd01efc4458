//! Sharpen metadata
//!
//! Records describing a foreign managed runtime's assemblies, the
//! out-of-process resolver that produces them, and the on-disk cache of
//! resolver replies.

pub mod cache;
pub mod model;
pub mod resolver;

pub use cache::MetadataCache;
pub use model::{
    Assembly, AttributeInfo, ConstructorInfo, EventInfo, FieldInfo, MemberVisibility, MethodInfo,
    ParameterInfo, PropertyInfo, TypeFlags, TypeInfo, TypeParameterInfo, TypeRef, TypeRefKind,
};
pub use resolver::{resolve, MetadataResolver, ResolverBackend, SubprocessResolver};

use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata resolution errors. All of them are fatal for the binary involved.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("failed to start metadata resolver {executable:?}: {error}")]
    Spawn {
        executable: PathBuf,
        error: std::io::Error,
    },

    #[error("metadata resolver failed for {binary:?} (exit code {status:?}): {stderr}")]
    ResolverFailed {
        binary: PathBuf,
        status: Option<i32>,
        stderr: String,
    },

    #[error("cannot decode resolver output for {binary:?}: {message}\n--- resolver output ---\n{raw}")]
    Decode {
        binary: PathBuf,
        message: String,
        raw: String,
    },

    #[error("I/O error for {path:?}: {error}")]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
}

impl MetadataError {
    pub fn io(path: &Path, error: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            error,
        }
    }
}
