//! Qualified identifiers
//!
//! Declarations are addressed by value: a package (`FqName`), a class path
//! inside that package (`ClassId`) and a callable name (`CallableId`).
//! Cross references anywhere in the compiler are these identifiers, never
//! owning pointers.
//!
//! String forms: `pkg.sub/Outer.Inner` for classes, `pkg.sub/Outer#member`
//! for members and `pkg.sub#function` for top-level callables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simple name of the class that carries an instance class's static members.
pub const DEFAULT_COMPANION: &str = "Companion";

/// Dot-separated package name. The root package is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FqName(String);

impl FqName {
    pub fn new(name: impl Into<String>) -> Self {
        FqName(name.into())
    }

    pub fn root() -> Self {
        FqName(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|s| !s.is_empty())
    }

    pub fn child(&self, segment: &str) -> FqName {
        if self.is_root() {
            FqName(segment.to_string())
        } else {
            FqName(format!("{}.{}", self.0, segment))
        }
    }

    pub fn parent(&self) -> Option<FqName> {
        if self.is_root() {
            return None;
        }
        Some(match self.0.rsplit_once('.') {
            Some((parent, _)) => FqName(parent.to_string()),
            None => FqName::root(),
        })
    }

    /// This package and all of its parents, innermost first, root excluded.
    pub fn ancestors(&self) -> Vec<FqName> {
        let mut result = Vec::new();
        let mut current = Some(self.clone());
        while let Some(name) = current {
            if name.is_root() {
                break;
            }
            current = name.parent();
            result.push(name);
        }
        result
    }

    /// `pkg.name`, or just `name` in the root package.
    pub fn qualify(&self, name: &str) -> String {
        if self.is_root() {
            name.to_string()
        } else {
            format!("{}.{}", self.0, name)
        }
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FqName {
    fn from(s: &str) -> Self {
        FqName::new(s)
    }
}

/// A class addressed by package and relative class path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ClassId {
    pub package: FqName,
    /// Outermost first; never empty
    pub names: Vec<String>,
}

impl ClassId {
    pub fn new(package: &str, name: &str) -> Self {
        ClassId {
            package: FqName::new(package),
            names: vec![name.to_string()],
        }
    }

    /// Parse a dot-separated `package.Class` name: the last segment is the class.
    pub fn top_level(fq_name: &str) -> Self {
        match fq_name.rsplit_once('.') {
            Some((package, name)) => ClassId::new(package, name),
            None => ClassId::new("", fq_name),
        }
    }

    pub fn nested(&self, name: &str) -> Self {
        let mut names = self.names.clone();
        names.push(name.to_string());
        ClassId {
            package: self.package.clone(),
            names,
        }
    }

    pub fn companion(&self) -> Self {
        self.nested(DEFAULT_COMPANION)
    }

    pub fn is_companion(&self) -> bool {
        self.names.len() > 1 && self.short_name() == DEFAULT_COMPANION
    }

    pub fn is_nested(&self) -> bool {
        self.names.len() > 1
    }

    pub fn short_name(&self) -> &str {
        self.names.last().map(String::as_str).unwrap_or("")
    }

    pub fn outer(&self) -> Option<ClassId> {
        if !self.is_nested() {
            return None;
        }
        Some(ClassId {
            package: self.package.clone(),
            names: self.names[..self.names.len() - 1].to_vec(),
        })
    }

    /// `Outer.Inner`
    pub fn relative_name(&self) -> String {
        self.names.join(".")
    }

    /// `pkg.Outer.Inner`
    pub fn qualified_name(&self) -> String {
        self.package.qualify(&self.relative_name())
    }

    pub fn member(&self, name: &str) -> CallableId {
        CallableId::member(self.clone(), name)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.relative_name())
    }
}

impl From<ClassId> for String {
    fn from(id: ClassId) -> String {
        id.to_string()
    }
}

impl TryFrom<String> for ClassId {
    type Error = IdParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::str::FromStr for ClassId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (package, relative) = s
            .rsplit_once('/')
            .ok_or_else(|| IdParseError::new(s, "missing '/' between package and class"))?;
        let names: Vec<String> = relative.split('.').map(str::to_string).collect();
        if names.iter().any(String::is_empty) {
            return Err(IdParseError::new(s, "empty class name segment"));
        }
        Ok(ClassId {
            package: FqName::new(package),
            names,
        })
    }
}

/// A function, property or constructor owner addressed by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CallableId {
    pub package: FqName,
    pub class: Option<ClassId>,
    pub name: String,
}

impl CallableId {
    pub fn top_level(package: &str, name: &str) -> Self {
        CallableId {
            package: FqName::new(package),
            class: None,
            name: name.to_string(),
        }
    }

    pub fn member(class: ClassId, name: &str) -> Self {
        CallableId {
            package: class.package.clone(),
            class: Some(class),
            name: name.to_string(),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.class.is_none()
    }

    /// Same name, different container
    pub fn moved_to(&self, class: Option<ClassId>) -> Self {
        CallableId {
            package: class
                .as_ref()
                .map(|c| c.package.clone())
                .unwrap_or_else(|| self.package.clone()),
            class,
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{}#{}", class, self.name),
            None => write!(f, "{}#{}", self.package, self.name),
        }
    }
}

impl From<CallableId> for String {
    fn from(id: CallableId) -> String {
        id.to_string()
    }
}

impl TryFrom<String> for CallableId {
    type Error = IdParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::str::FromStr for CallableId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (container, name) = s
            .rsplit_once('#')
            .ok_or_else(|| IdParseError::new(s, "missing '#' before callable name"))?;
        if name.is_empty() {
            return Err(IdParseError::new(s, "empty callable name"));
        }
        if container.contains('/') {
            let class: ClassId = container.parse()?;
            Ok(CallableId::member(class, name))
        } else {
            Ok(CallableId::top_level(container, name))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier {input:?}: {reason}")]
pub struct IdParseError {
    pub input: String,
    pub reason: &'static str,
}

impl IdParseError {
    fn new(input: &str, reason: &'static str) -> Self {
        IdParseError {
            input: input.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_ancestors() {
        let name = FqName::new("kotlin.collections");
        let ancestors: Vec<_> = name.ancestors().iter().map(|n| n.to_string()).collect();
        assert_eq!(ancestors, vec!["kotlin.collections", "kotlin"]);
        assert!(FqName::root().ancestors().is_empty());
        assert_eq!(FqName::root().child("kotlin").as_str(), "kotlin");
    }

    #[test]
    fn test_class_id_string_form() {
        let id = ClassId::new("Shapes", "Rectangle").nested("Builder");
        assert_eq!(id.to_string(), "Shapes/Rectangle.Builder");
        assert_eq!(id.qualified_name(), "Shapes.Rectangle.Builder");

        let parsed: ClassId = "Shapes/Rectangle.Builder".parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.outer(), Some(ClassId::new("Shapes", "Rectangle")));

        let root: ClassId = "/Main".parse().unwrap();
        assert!(root.package.is_root());
        assert_eq!(root.qualified_name(), "Main");
    }

    #[test]
    fn test_companion() {
        let id = ClassId::new("Shapes", "Rectangle");
        assert!(!id.is_companion());
        assert!(id.companion().is_companion());
        assert_eq!(id.companion().outer(), Some(id));
        assert!(!ClassId::new("x", DEFAULT_COMPANION).is_companion());
    }

    #[test]
    fn test_callable_id_string_form() {
        let member: CallableId = "kotlin/UInt#compareTo".parse().unwrap();
        assert_eq!(member.class, Some(ClassId::new("kotlin", "UInt")));
        assert_eq!(member.name, "compareTo");

        let top: CallableId = "kotlin.io#println".parse().unwrap();
        assert!(top.is_top_level());
        assert_eq!(top.package.as_str(), "kotlin.io");
        assert_eq!(top.to_string(), "kotlin.io#println");

        assert!("no-separator".parse::<CallableId>().is_err());
    }

    #[test]
    fn test_ids_serialize_as_strings() {
        let id = ClassId::top_level("kotlin.collections.List");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"kotlin.collections/List\"");
        let back: ClassId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
