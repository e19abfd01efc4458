//! Foreign type references → source types
//!
//! Primitive runtime types map through a fixed table, arrays become
//! `kotlin.Array<T>` or a primitive array class, and references to types of
//! the loaded assemblies become their synthesized class ids. Anything else
//! degrades to the top type `kotlin.Any?`.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use sharpen_ir::{well_known, ClassId, SourceType};
use sharpen_metadata::model::strip_arity;
use sharpen_metadata::{Assembly, TypeInfo, TypeRef, TypeRefKind};
use std::collections::HashMap;

/// Separator between outer and nested type names in metadata references
pub const NESTED_SEPARATOR: char = '+';

/// `System.X` → source class (`None` for the top type)
static PRIMITIVES: Lazy<HashMap<&'static str, Option<ClassId>>> = Lazy::new(|| {
    HashMap::from([
        ("System.Int32", Some(well_known::int())),
        ("System.Int64", Some(well_known::long())),
        ("System.Int16", Some(well_known::short())),
        ("System.SByte", Some(well_known::byte())),
        ("System.Byte", Some(well_known::ubyte())),
        ("System.UInt16", Some(well_known::ushort())),
        ("System.UInt32", Some(well_known::uint())),
        ("System.UInt64", Some(well_known::ulong())),
        ("System.Single", Some(well_known::float())),
        ("System.Double", Some(well_known::double())),
        ("System.Boolean", Some(well_known::boolean())),
        ("System.Char", Some(well_known::char())),
        ("System.String", Some(well_known::string())),
        ("System.Void", Some(well_known::unit())),
        ("System.Exception", Some(well_known::throwable())),
        ("System.Object", None),
    ])
});

/// Element class → dedicated primitive array class
static PRIMITIVE_ARRAYS: Lazy<HashMap<ClassId, ClassId>> = Lazy::new(|| {
    HashMap::from([
        (well_known::boolean(), well_known::boolean_array()),
        (well_known::char(), well_known::char_array()),
        (well_known::byte(), well_known::byte_array()),
        (well_known::short(), well_known::short_array()),
        (well_known::int(), well_known::int_array()),
        (well_known::long(), well_known::long_array()),
        (well_known::float(), well_known::float_array()),
        (well_known::double(), well_known::double_array()),
    ])
});

/// Full names of runtime base classes that are implied and never listed as supertypes.
pub const IMPLICIT_BASES: &[&str] = &["System.Object", "System.ValueType", "System.Enum"];

/// Class id a metadata type is synthesized under.
pub fn class_id_of(ty: &TypeInfo) -> ClassId {
    let mut names: Vec<String> = ty
        .declaring_type
        .as_deref()
        .map(|outer| {
            outer
                .split(NESTED_SEPARATOR)
                .map(|segment| strip_arity(segment).to_string())
                .collect()
        })
        .unwrap_or_default();
    names.push(ty.simple_name().to_string());
    ClassId {
        package: ty.namespace.as_str().into(),
        names,
    }
}

/// Class id named by a reference, `Outer+Inner` nesting included.
pub fn class_id_of_ref(reference: &TypeRef) -> ClassId {
    let names = reference
        .name
        .split(NESTED_SEPARATOR)
        .map(|segment| strip_arity(segment).to_string())
        .collect();
    ClassId {
        package: reference.namespace.as_deref().unwrap_or("").into(),
        names,
    }
}

/// Reference resolution against a fixed set of known foreign classes
#[derive(Debug, Default)]
pub struct ForeignTypes {
    known: IndexMap<ClassId, String>,
}

impl ForeignTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every type of the given assemblies that passes `accept`.
    pub fn from_assemblies<'a>(
        assemblies: impl IntoIterator<Item = &'a Assembly>,
        mut accept: impl FnMut(&TypeInfo) -> bool,
    ) -> Self {
        let mut types = ForeignTypes::new();
        for assembly in assemblies {
            for ty in &assembly.types {
                types.collect(ty, &assembly.name, &mut accept);
            }
        }
        types
    }

    fn collect(
        &mut self,
        ty: &TypeInfo,
        assembly: &str,
        accept: &mut impl FnMut(&TypeInfo) -> bool,
    ) {
        if !accept(ty) {
            return;
        }
        self.known
            .entry(class_id_of(ty))
            .or_insert_with(|| assembly.to_string());
        for nested in &ty.nested_types {
            self.collect(nested, assembly, accept);
        }
    }

    pub fn insert(&mut self, id: ClassId, assembly: &str) {
        self.known.insert(id, assembly.to_string());
    }

    pub fn contains(&self, id: &ClassId) -> bool {
        self.known.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Resolve a reference. Never fails: unknown shapes become `kotlin.Any?`.
    pub fn resolve(&self, reference: &TypeRef) -> SourceType {
        match reference.kind {
            TypeRefKind::GenericParameter => {
                let name = reference
                    .type_parameter
                    .as_ref()
                    .map(|p| p.name.as_str())
                    .unwrap_or(&reference.name);
                SourceType::type_parameter(name)
            }
            TypeRefKind::ByRef | TypeRefKind::Pointer => match reference.type_parameters.first() {
                Some(element) => self.resolve(element),
                None => SourceType::top(),
            },
            TypeRefKind::Array => self.resolve_array(reference),
            TypeRefKind::Class | TypeRefKind::Interface | TypeRefKind::ValueType => {
                self.resolve_named(reference)
            }
        }
    }

    fn resolve_array(&self, reference: &TypeRef) -> SourceType {
        let Some(element) = reference.type_parameters.first() else {
            return SourceType::array_of(SourceType::top());
        };
        let element = self.resolve(element);
        if let Some(primitive) = element
            .class_id()
            .filter(|_| !element.is_nullable())
            .and_then(|id| PRIMITIVE_ARRAYS.get(id))
        {
            return SourceType::class(primitive.clone());
        }
        SourceType::array_of(element)
    }

    fn resolve_named(&self, reference: &TypeRef) -> SourceType {
        if let Some(primitive) = PRIMITIVES.get(reference.full_name().as_str()) {
            return match primitive {
                Some(id) => SourceType::class(id.clone()),
                None => SourceType::top(),
            };
        }
        let id = class_id_of_ref(reference);
        if !self.contains(&id) {
            tracing::debug!("unresolved foreign type {}, using kotlin.Any?", reference.full_name());
            return SourceType::top();
        }
        let arguments = reference
            .type_parameters
            .iter()
            .map(|argument| self.resolve(argument))
            .collect();
        SourceType::generic(id, arguments)
    }
}

/// Runtime base classes that are never emitted as supertypes.
pub fn is_implicit_base(reference: &TypeRef) -> bool {
    IMPLICIT_BASES.contains(&reference.full_name().as_str())
}
