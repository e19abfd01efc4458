//! Declaration attributes shared by the symbol graph and the IR

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
    /// Singleton object, including companions and static holders
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Modality {
    #[default]
    Final,
    Open,
    Abstract,
    Sealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
    Local,
}

impl Visibility {
    /// Visible from outside the declaring class.
    pub fn is_accessible(self) -> bool {
        !matches!(self, Visibility::Private | Visibility::Local)
    }
}

/// Declaration-site variance of a type parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Variance {
    #[default]
    Invariant,
    Out,
    In,
}
