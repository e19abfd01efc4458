//! Source-language type model
//!
//! Types are fully resolved by the frontend: every class type carries its
//! `ClassId`, type arguments and nullability. The top type is `kotlin.Any?`
//! and the bottom type is `kotlin.Nothing`.

use crate::decl::Variance;
use crate::ids::ClassId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known class identifiers of the source language
pub mod well_known {
    use crate::ids::ClassId;

    macro_rules! well_known_classes {
        ($($fn_name:ident => $package:literal, $name:literal;)*) => {
            $(
                pub fn $fn_name() -> ClassId {
                    ClassId::new($package, $name)
                }
            )*
        };
    }

    well_known_classes! {
        any => "kotlin", "Any";
        nothing => "kotlin", "Nothing";
        unit => "kotlin", "Unit";
        number => "kotlin", "Number";
        boolean => "kotlin", "Boolean";
        char => "kotlin", "Char";
        byte => "kotlin", "Byte";
        short => "kotlin", "Short";
        int => "kotlin", "Int";
        long => "kotlin", "Long";
        float => "kotlin", "Float";
        double => "kotlin", "Double";
        ubyte => "kotlin", "UByte";
        ushort => "kotlin", "UShort";
        uint => "kotlin", "UInt";
        ulong => "kotlin", "ULong";
        string => "kotlin", "String";
        char_sequence => "kotlin", "CharSequence";
        comparable => "kotlin", "Comparable";
        enum_class => "kotlin", "Enum";
        throwable => "kotlin", "Throwable";
        annotation => "kotlin", "Annotation";
        array => "kotlin", "Array";
        boolean_array => "kotlin", "BooleanArray";
        char_array => "kotlin", "CharArray";
        byte_array => "kotlin", "ByteArray";
        short_array => "kotlin", "ShortArray";
        int_array => "kotlin", "IntArray";
        long_array => "kotlin", "LongArray";
        float_array => "kotlin", "FloatArray";
        double_array => "kotlin", "DoubleArray";
        iterable => "kotlin.collections", "Iterable";
        mutable_iterable => "kotlin.collections", "MutableIterable";
        collection => "kotlin.collections", "Collection";
        mutable_collection => "kotlin.collections", "MutableCollection";
        list => "kotlin.collections", "List";
        mutable_list => "kotlin.collections", "MutableList";
        set => "kotlin.collections", "Set";
        mutable_set => "kotlin.collections", "MutableSet";
        map => "kotlin.collections", "Map";
        mutable_map => "kotlin.collections", "MutableMap";
        iterator => "kotlin.collections", "Iterator";
        mutable_iterator => "kotlin.collections", "MutableIterator";
    }

    pub fn map_entry() -> ClassId {
        map().nested("Entry")
    }
}

/// A resolved source type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    Class {
        id: ClassId,
        #[serde(default)]
        arguments: Vec<TypeArgument>,
        #[serde(default)]
        nullable: bool,
    },
    TypeParameter {
        name: String,
        #[serde(default)]
        nullable: bool,
    },
}

/// A type argument with use-site variance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeArgument {
    Star,
    Invariant(SourceType),
    Out(SourceType),
    In(SourceType),
}

impl TypeArgument {
    pub fn ty(&self) -> Option<&SourceType> {
        match self {
            TypeArgument::Star => None,
            TypeArgument::Invariant(ty) | TypeArgument::Out(ty) | TypeArgument::In(ty) => Some(ty),
        }
    }

    pub fn ty_mut(&mut self) -> Option<&mut SourceType> {
        match self {
            TypeArgument::Star => None,
            TypeArgument::Invariant(ty) | TypeArgument::Out(ty) | TypeArgument::In(ty) => Some(ty),
        }
    }

    pub fn with_variance(variance: Variance, ty: SourceType) -> Self {
        match variance {
            Variance::Invariant => TypeArgument::Invariant(ty),
            Variance::Out => TypeArgument::Out(ty),
            Variance::In => TypeArgument::In(ty),
        }
    }
}

impl SourceType {
    pub fn class(id: ClassId) -> Self {
        SourceType::Class {
            id,
            arguments: Vec::new(),
            nullable: false,
        }
    }

    pub fn generic(id: ClassId, arguments: Vec<SourceType>) -> Self {
        SourceType::Class {
            id,
            arguments: arguments.into_iter().map(TypeArgument::Invariant).collect(),
            nullable: false,
        }
    }

    pub fn type_parameter(name: &str) -> Self {
        SourceType::TypeParameter {
            name: name.to_string(),
            nullable: false,
        }
    }

    /// `kotlin.Any?`
    pub fn top() -> Self {
        SourceType::class(well_known::any()).nullable()
    }

    /// `kotlin.Nothing`
    pub fn bottom() -> Self {
        SourceType::class(well_known::nothing())
    }

    pub fn any() -> Self {
        SourceType::class(well_known::any())
    }

    pub fn unit() -> Self {
        SourceType::class(well_known::unit())
    }

    pub fn boolean() -> Self {
        SourceType::class(well_known::boolean())
    }

    pub fn int() -> Self {
        SourceType::class(well_known::int())
    }

    pub fn long() -> Self {
        SourceType::class(well_known::long())
    }

    pub fn double() -> Self {
        SourceType::class(well_known::double())
    }

    pub fn string() -> Self {
        SourceType::class(well_known::string())
    }

    pub fn array_of(element: SourceType) -> Self {
        SourceType::generic(well_known::array(), vec![element])
    }

    pub fn nullable(self) -> Self {
        self.with_nullability(true)
    }

    pub fn non_null(self) -> Self {
        self.with_nullability(false)
    }

    pub fn with_nullability(self, value: bool) -> Self {
        match self {
            SourceType::Class { id, arguments, .. } => SourceType::Class {
                id,
                arguments,
                nullable: value,
            },
            SourceType::TypeParameter { name, .. } => SourceType::TypeParameter {
                name,
                nullable: value,
            },
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            SourceType::Class { nullable, .. } | SourceType::TypeParameter { nullable, .. } => {
                *nullable
            }
        }
    }

    pub fn class_id(&self) -> Option<&ClassId> {
        match self {
            SourceType::Class { id, .. } => Some(id),
            SourceType::TypeParameter { .. } => None,
        }
    }

    pub fn is_class(&self, class: &ClassId) -> bool {
        self.class_id() == Some(class)
    }

    pub fn arguments(&self) -> &[TypeArgument] {
        match self {
            SourceType::Class { arguments, .. } => arguments,
            SourceType::TypeParameter { .. } => &[],
        }
    }

    /// Type of the `index`-th argument; star projections yield `None`.
    pub fn argument_type(&self, index: usize) -> Option<&SourceType> {
        self.arguments().get(index).and_then(TypeArgument::ty)
    }

    pub fn is_unit(&self) -> bool {
        self.is_class(&well_known::unit()) && !self.is_nullable()
    }

    pub fn is_nothing(&self) -> bool {
        self.is_class(&well_known::nothing())
    }

    pub fn is_string(&self) -> bool {
        self.is_class(&well_known::string())
    }

    /// `Array<String>`, the conventional entry point parameter type
    pub fn is_string_array(&self) -> bool {
        self.is_class(&well_known::array())
            && self.argument_type(0).is_some_and(SourceType::is_string)
    }

    /// Rewrite every class id inside this type.
    pub fn map_class_ids(&mut self, f: &mut impl FnMut(&mut ClassId)) {
        if let SourceType::Class { id, arguments, .. } = self {
            f(id);
            for argument in arguments {
                if let Some(ty) = argument.ty_mut() {
                    ty.map_class_ids(f);
                }
            }
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Class {
                id,
                arguments,
                nullable,
            } => {
                write!(f, "{}", id.qualified_name())?;
                if !arguments.is_empty() {
                    write!(f, "<")?;
                    for (i, argument) in arguments.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        match argument {
                            TypeArgument::Star => write!(f, "*")?,
                            TypeArgument::Invariant(ty) => write!(f, "{}", ty)?,
                            TypeArgument::Out(ty) => write!(f, "out {}", ty)?,
                            TypeArgument::In(ty) => write!(f, "in {}", ty)?,
                        }
                    }
                    write!(f, ">")?;
                }
                if *nullable {
                    write!(f, "?")?;
                }
                Ok(())
            }
            SourceType::TypeParameter { name, nullable } => {
                write!(f, "{}{}", name, if *nullable { "?" } else { "" })
            }
        }
    }
}
