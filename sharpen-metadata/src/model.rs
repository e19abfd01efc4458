//! Foreign runtime metadata model
//!
//! Plain records describing a foreign assembly's public surface exactly as the
//! out-of-process resolver reports it. The records are nominal and
//! reflection-style: type references are names, resolved lazily against the
//! loaded assemblies by the symbol synthesizer.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Namespace and name of the marker type that stands for "no value".
pub const VOID_NAMESPACE: &str = "System";
pub const VOID_NAME: &str = "Void";

/// One foreign binary's exported surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assembly {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeInfo>,
}

impl Assembly {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    /// Find a type by namespace and (arity-suffixed) name.
    pub fn find_type(&self, namespace: &str, name: &str) -> Option<&TypeInfo> {
        self.types
            .iter()
            .find(|ty| ty.namespace == namespace && ty.name == name)
    }

    /// Types that are not nested inside another type.
    pub fn top_level_types(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.iter().filter(|ty| !ty.flags.contains(TypeFlags::IS_NESTED))
    }
}

/// A type definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeInfo {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub declaring_type: Option<String>,
    #[serde(default)]
    pub base_type: Option<TypeRef>,
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub attributes: Vec<AttributeInfo>,
    #[serde(default)]
    pub constructors: Vec<ConstructorInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub properties: Vec<PropertyInfo>,
    #[serde(default)]
    pub events: Vec<EventInfo>,
    #[serde(default)]
    pub nested_types: Vec<TypeInfo>,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterInfo>,
    #[serde(default)]
    pub flags: TypeFlags,
}

impl TypeInfo {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            declaring_type: None,
            base_type: None,
            interfaces: Vec::new(),
            attributes: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
            nested_types: Vec::new(),
            type_parameters: Vec::new(),
            flags: TypeFlags::IS_PUBLIC,
        }
    }

    /// `Namespace.Name`, or just the name in the global namespace.
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn is_public(&self) -> bool {
        if self.flags.contains(TypeFlags::IS_NESTED) {
            self.flags.contains(TypeFlags::IS_NESTED_PUBLIC)
        } else {
            self.flags.contains(TypeFlags::IS_PUBLIC)
        }
    }

    pub fn is_void(&self) -> bool {
        self.namespace == VOID_NAMESPACE && self.name == VOID_NAME
    }

    pub fn has_attribute(&self, type_name: &str) -> bool {
        has_attribute(&self.attributes, type_name)
    }

    /// Name without the generic arity suffix (``List`1`` becomes `List`).
    pub fn simple_name(&self) -> &str {
        strip_arity(&self.name)
    }

    /// Arity encoded in the name, if any.
    pub fn declared_arity(&self) -> Option<usize> {
        let (_, arity) = self.name.rsplit_once('`')?;
        arity.parse().ok()
    }
}

/// Strip a generic arity suffix from a metadata name.
pub fn strip_arity(name: &str) -> &str {
    match name.rsplit_once('`') {
        Some((base, arity)) if arity.chars().all(|c| c.is_ascii_digit()) => base,
        _ => name,
    }
}

fn has_attribute(attributes: &[AttributeInfo], type_name: &str) -> bool {
    attributes.iter().any(|attr| attr.type_name == type_name)
}

bitflags! {
    /// Type-level reflection flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(from = "RawTypeFlags", into = "RawTypeFlags")]
    pub struct TypeFlags: u32 {
        const IS_ABSTRACT = 1 << 0;
        const IS_SEALED = 1 << 1;
        const IS_INTERFACE = 1 << 2;
        const IS_ENUM = 1 << 3;
        const IS_VALUE_TYPE = 1 << 4;
        const IS_GENERIC_TYPE = 1 << 5;
        const IS_NESTED = 1 << 6;
        const IS_PUBLIC = 1 << 7;
        const IS_NESTED_PUBLIC = 1 << 8;
        const IS_NESTED_PRIVATE = 1 << 9;
        const IS_NESTED_FAMILY = 1 << 10;
        const IS_NESTED_ASSEMBLY = 1 << 11;
    }
}

/// Wire form of [`TypeFlags`]: one boolean per flag, all optional.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawTypeFlags {
    is_abstract: bool,
    is_sealed: bool,
    is_interface: bool,
    is_enum: bool,
    is_value_type: bool,
    is_generic_type: bool,
    is_nested: bool,
    is_public: bool,
    is_nested_public: bool,
    is_nested_private: bool,
    is_nested_family: bool,
    is_nested_assembly: bool,
}

impl From<RawTypeFlags> for TypeFlags {
    fn from(raw: RawTypeFlags) -> Self {
        let mut flags = TypeFlags::empty();
        flags.set(TypeFlags::IS_ABSTRACT, raw.is_abstract);
        flags.set(TypeFlags::IS_SEALED, raw.is_sealed);
        flags.set(TypeFlags::IS_INTERFACE, raw.is_interface);
        flags.set(TypeFlags::IS_ENUM, raw.is_enum);
        flags.set(TypeFlags::IS_VALUE_TYPE, raw.is_value_type);
        flags.set(TypeFlags::IS_GENERIC_TYPE, raw.is_generic_type);
        flags.set(TypeFlags::IS_NESTED, raw.is_nested);
        flags.set(TypeFlags::IS_PUBLIC, raw.is_public);
        flags.set(TypeFlags::IS_NESTED_PUBLIC, raw.is_nested_public);
        flags.set(TypeFlags::IS_NESTED_PRIVATE, raw.is_nested_private);
        flags.set(TypeFlags::IS_NESTED_FAMILY, raw.is_nested_family);
        flags.set(TypeFlags::IS_NESTED_ASSEMBLY, raw.is_nested_assembly);
        flags
    }
}

impl From<TypeFlags> for RawTypeFlags {
    fn from(flags: TypeFlags) -> Self {
        RawTypeFlags {
            is_abstract: flags.contains(TypeFlags::IS_ABSTRACT),
            is_sealed: flags.contains(TypeFlags::IS_SEALED),
            is_interface: flags.contains(TypeFlags::IS_INTERFACE),
            is_enum: flags.contains(TypeFlags::IS_ENUM),
            is_value_type: flags.contains(TypeFlags::IS_VALUE_TYPE),
            is_generic_type: flags.contains(TypeFlags::IS_GENERIC_TYPE),
            is_nested: flags.contains(TypeFlags::IS_NESTED),
            is_public: flags.contains(TypeFlags::IS_PUBLIC),
            is_nested_public: flags.contains(TypeFlags::IS_NESTED_PUBLIC),
            is_nested_private: flags.contains(TypeFlags::IS_NESTED_PRIVATE),
            is_nested_family: flags.contains(TypeFlags::IS_NESTED_FAMILY),
            is_nested_assembly: flags.contains(TypeFlags::IS_NESTED_ASSEMBLY),
        }
    }
}

/// Member accessibility as reported by reflection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberVisibility {
    #[default]
    Public,
    Family,
    FamilyOrAssembly,
    FamilyAndAssembly,
    Assembly,
    Private,
}

impl MemberVisibility {
    /// Visible to code outside the defining assembly.
    pub fn is_accessible(self) -> bool {
        matches!(
            self,
            MemberVisibility::Public | MemberVisibility::Family | MemberVisibility::FamilyOrAssembly
        )
    }
}

/// A method definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub name: String,
    pub return_type: TypeRef,
    #[serde(default)]
    pub attributes: Vec<AttributeInfo>,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterInfo>,
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub visibility: MemberVisibility,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_abstract: bool,
}

impl MethodInfo {
    pub fn has_attribute(&self, type_name: &str) -> bool {
        has_attribute(&self.attributes, type_name)
    }
}

/// A constructor: a method without a name or return type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorInfo {
    #[serde(default)]
    pub attributes: Vec<AttributeInfo>,
    #[serde(default)]
    pub parameters: Vec<ParameterInfo>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub visibility: MemberVisibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub attributes: Vec<AttributeInfo>,
    #[serde(default)]
    pub has_default_value: bool,
    #[serde(default)]
    pub is_variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub name: String,
    pub field_type: TypeRef,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_init_only: bool,
    #[serde(default)]
    pub is_literal: bool,
    #[serde(default)]
    pub visibility: MemberVisibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    pub name: String,
    pub property_type: TypeRef,
    #[serde(default)]
    pub can_read: bool,
    #[serde(default)]
    pub can_write: bool,
    #[serde(default)]
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    pub name: String,
    pub handler_type: TypeRef,
    #[serde(default)]
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeInfo {
    pub type_name: String,
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl AttributeInfo {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            arguments: Vec::new(),
        }
    }
}

/// How a [`TypeRef`] should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeRefKind {
    #[default]
    Class,
    Interface,
    ValueType,
    /// Element type is `type_parameters[0]`
    Array,
    GenericParameter,
    ByRef,
    Pointer,
}

/// A reference to a type, resolved lazily by namespace + name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    #[serde(default)]
    pub namespace: Option<String>,
    pub name: String,
    #[serde(default)]
    pub kind: TypeRefKind,
    #[serde(default)]
    pub type_parameter: Option<TypeParameterInfo>,
    #[serde(default)]
    pub type_parameters: Vec<TypeRef>,
}

impl TypeRef {
    pub fn named(namespace: &str, name: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
            kind: TypeRefKind::Class,
            type_parameter: None,
            type_parameters: Vec::new(),
        }
    }

    pub fn void() -> Self {
        Self::named(VOID_NAMESPACE, VOID_NAME)
    }

    pub fn array_of(element: TypeRef) -> Self {
        Self {
            namespace: element.namespace.clone(),
            name: format!("{}[]", element.name),
            kind: TypeRefKind::Array,
            type_parameter: None,
            type_parameters: vec![element],
        }
    }

    pub fn generic_parameter(parameter: TypeParameterInfo) -> Self {
        Self {
            namespace: None,
            name: parameter.name.clone(),
            kind: TypeRefKind::GenericParameter,
            type_parameter: Some(parameter),
            type_parameters: Vec::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<TypeRef>) -> Self {
        self.type_parameters = arguments;
        self
    }

    pub fn is_void(&self) -> bool {
        self.namespace.as_deref() == Some(VOID_NAMESPACE) && self.name == VOID_NAME
    }

    /// `Namespace.Name` as written in the reference.
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{}.{}", ns, self.name),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeParameterInfo {
    pub name: String,
    #[serde(default)]
    pub is_covariant: bool,
    #[serde(default)]
    pub is_contravariant: bool,
    #[serde(default)]
    pub owned_by_type: bool,
    #[serde(default)]
    pub owned_by_method: bool,
}

impl TypeParameterInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_covariant: false,
            is_contravariant: false,
            owned_by_type: true,
            owned_by_method: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_resolver_message() {
        let message = r#"{
            "name": "Geometry",
            "types": [{
                "name": "Rectangle",
                "namespace": "Shapes",
                "flags": { "isPublic": true, "isSealed": true },
                "constructors": [{
                    "parameters": [
                        { "name": "height", "type": { "namespace": "System", "name": "Double", "kind": "valueType" } }
                    ]
                }],
                "methods": [{
                    "name": "Scale",
                    "returnType": { "namespace": "System", "name": "Void" },
                    "isStatic": true
                }]
            }]
        }"#;

        let assembly: Assembly = serde_json::from_str(message).unwrap();
        let ty = assembly.find_type("Shapes", "Rectangle").unwrap();

        assert!(ty.is_public());
        assert!(ty.flags.contains(TypeFlags::IS_SEALED));
        assert!(!ty.flags.contains(TypeFlags::IS_ABSTRACT));
        assert_eq!(ty.constructors[0].parameters[0].ty.kind, TypeRefKind::ValueType);
        assert!(ty.methods[0].return_type.is_void());
        assert_eq!(ty.methods[0].visibility, MemberVisibility::Public);
    }

    #[test]
    fn test_flags_survive_serialization() {
        let mut ty = TypeInfo::new("A", "B");
        ty.flags |= TypeFlags::IS_ABSTRACT | TypeFlags::IS_INTERFACE;

        let text = serde_json::to_string(&ty).unwrap();
        assert!(text.contains("\"isInterface\":true"));

        let back: TypeInfo = serde_json::from_str(&text).unwrap();
        assert_eq!(back.flags, ty.flags);
    }

    #[test]
    fn test_nested_visibility() {
        let mut ty = TypeInfo::new("A", "Inner");
        ty.flags = TypeFlags::IS_NESTED | TypeFlags::IS_PUBLIC;
        assert!(!ty.is_public());

        ty.flags |= TypeFlags::IS_NESTED_PUBLIC;
        assert!(ty.is_public());
    }

    #[test]
    fn test_arity_suffix() {
        let ty = TypeInfo::new("System.Collections.Generic", "Dictionary`2");
        assert_eq!(ty.simple_name(), "Dictionary");
        assert_eq!(ty.declared_arity(), Some(2));
        assert_eq!(strip_arity("Plain"), "Plain");
        assert_eq!(TypeInfo::new("", "Plain").full_name(), "Plain");
    }
}
