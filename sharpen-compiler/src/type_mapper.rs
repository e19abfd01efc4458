//! Source types → target type expressions
//!
//! A fixed table keyed by the qualified source class name covers the top
//! type, primitives, primitive arrays, throwables and the collection family.
//! Everything else is passed through as its qualified name, so mapping never
//! fails.

use once_cell::sync::Lazy;
use sharpen_ir::{well_known, IrValueParameter, SourceType, TypeArgument};
use std::collections::HashMap;

pub const OBJECT: &str = "object";
pub const VOID: &str = "void";

static TYPE_TABLE: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let entries = [
        (well_known::any(), OBJECT),
        (well_known::nothing(), OBJECT),
        (well_known::unit(), VOID),
        (well_known::int(), "int"),
        (well_known::long(), "long"),
        (well_known::short(), "short"),
        (well_known::byte(), "sbyte"),
        (well_known::ubyte(), "byte"),
        (well_known::ushort(), "ushort"),
        (well_known::uint(), "uint"),
        (well_known::ulong(), "ulong"),
        (well_known::float(), "float"),
        (well_known::double(), "double"),
        (well_known::boolean(), "bool"),
        (well_known::char(), "char"),
        (well_known::string(), "string"),
        (well_known::char_sequence(), "string"),
        (well_known::number(), "System.IConvertible"),
        (well_known::boolean_array(), "bool[]"),
        (well_known::char_array(), "char[]"),
        (well_known::byte_array(), "sbyte[]"),
        (well_known::short_array(), "short[]"),
        (well_known::int_array(), "int[]"),
        (well_known::long_array(), "long[]"),
        (well_known::float_array(), "float[]"),
        (well_known::double_array(), "double[]"),
        (well_known::throwable(), "System.Exception"),
        (well_known::annotation(), "System.Attribute"),
        (well_known::enum_class(), "System.Enum"),
        (well_known::comparable(), "System.IComparable"),
        (well_known::iterable(), "System.Collections.Generic.IEnumerable"),
        (well_known::mutable_iterable(), "System.Collections.Generic.IEnumerable"),
        (well_known::collection(), "System.Collections.Generic.IReadOnlyCollection"),
        (well_known::mutable_collection(), "System.Collections.Generic.ICollection"),
        (well_known::list(), "System.Collections.Generic.IReadOnlyList"),
        (well_known::mutable_list(), "System.Collections.Generic.IList"),
        (well_known::set(), "System.Collections.Generic.IReadOnlySet"),
        (well_known::mutable_set(), "System.Collections.Generic.ISet"),
        (well_known::map(), "System.Collections.Generic.IReadOnlyDictionary"),
        (well_known::mutable_map(), "System.Collections.Generic.IDictionary"),
        (well_known::map_entry(), "System.Collections.Generic.KeyValuePair"),
        (well_known::iterator(), "System.Collections.Generic.IEnumerator"),
        (well_known::mutable_iterator(), "System.Collections.Generic.IEnumerator"),
    ];
    entries
        .into_iter()
        .map(|(id, target)| (id.qualified_name(), target))
        .collect()
});

/// Target names of the fixed table, keyed by qualified source name.
pub fn table() -> impl Iterator<Item = (&'static str, &'static str)> {
    TYPE_TABLE.iter().map(|(source, target)| (source.as_str(), *target))
}

/// Session-scoped mapper from source types to target type expressions
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeMapper;

impl TypeMapper {
    pub fn new() -> Self {
        TypeMapper
    }

    pub fn map_type(&self, ty: &SourceType) -> String {
        match ty {
            SourceType::TypeParameter { name, .. } => name.clone(),
            SourceType::Class { id, arguments, .. } => {
                if id == &well_known::array() {
                    let element = arguments
                        .first()
                        .map(|argument| self.map_argument(argument))
                        .unwrap_or_else(|| OBJECT.to_string());
                    return format!("{}[]", element);
                }
                let qualified = id.qualified_name();
                let base = match TYPE_TABLE.get(&qualified) {
                    Some(target) => (*target).to_string(),
                    None => qualified,
                };
                if arguments.is_empty() || base == OBJECT {
                    return base;
                }
                let arguments: Vec<String> =
                    arguments.iter().map(|argument| self.map_argument(argument)).collect();
                format!("{}<{}>", base, arguments.join(", "))
            }
        }
    }

    /// `void` for `Unit` and `Nothing`, otherwise [`map_type`](Self::map_type).
    pub fn map_return_type(&self, ty: &SourceType) -> String {
        if ty.is_unit() || ty.is_nothing() {
            VOID.to_string()
        } else {
            self.map_type(ty)
        }
    }

    /// Parameter type with its modifiers: `params T[]` for varargs and a `?`
    /// suffix for nullable types.
    pub fn map_parameter(&self, parameter: &IrValueParameter) -> String {
        if parameter.is_vararg {
            return format!("params {}[]", self.map_type(&parameter.ty));
        }
        self.map_nullable(&parameter.ty)
    }

    pub fn map_nullable(&self, ty: &SourceType) -> String {
        let mapped = self.map_type(ty);
        if ty.is_nullable() && mapped != OBJECT && !mapped.ends_with('?') {
            format!("{}?", mapped)
        } else {
            mapped
        }
    }

    fn map_argument(&self, argument: &TypeArgument) -> String {
        match argument.ty() {
            Some(ty) => self.map_nullable(ty),
            None => OBJECT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpen_ir::ClassId;

    #[test]
    fn test_table_entries() {
        let mapper = TypeMapper::new();
        assert_eq!(mapper.map_type(&SourceType::int()), "int");
        assert_eq!(mapper.map_type(&SourceType::top()), "object");
        assert_eq!(mapper.map_type(&SourceType::class(well_known::ubyte())), "byte");
        assert_eq!(mapper.map_type(&SourceType::class(well_known::int_array())), "int[]");
        let throwable = SourceType::class(well_known::throwable());
        assert_eq!(mapper.map_type(&throwable), "System.Exception");
        for (source, target) in table() {
            let id = ClassId::top_level(source);
            if id.names.len() == 1 {
                assert_eq!(mapper.map_type(&SourceType::class(id)), target);
            }
        }
    }

    #[test]
    fn test_generic_collections() {
        let mapper = TypeMapper::new();
        let map = SourceType::generic(
            well_known::mutable_map(),
            vec![
                SourceType::string(),
                SourceType::generic(well_known::list(), vec![SourceType::int()]),
            ],
        );
        assert_eq!(
            mapper.map_type(&map),
            "System.Collections.Generic.IDictionary<string, \
             System.Collections.Generic.IReadOnlyList<int>>"
        );
        let entry = SourceType::generic(
            well_known::map_entry(),
            vec![SourceType::string(), SourceType::int()],
        );
        assert_eq!(
            mapper.map_type(&entry),
            "System.Collections.Generic.KeyValuePair<string, int>"
        );
    }

    #[test]
    fn test_arrays_and_star_projection() {
        let mapper = TypeMapper::new();
        assert_eq!(mapper.map_type(&SourceType::array_of(SourceType::string())), "string[]");
        let nested = SourceType::array_of(SourceType::array_of(SourceType::double()));
        assert_eq!(mapper.map_type(&nested), "double[][]");
        let star = SourceType::Class {
            id: well_known::list(),
            arguments: vec![TypeArgument::Star],
            nullable: false,
        };
        assert_eq!(mapper.map_type(&star), "System.Collections.Generic.IReadOnlyList<object>");
    }

    #[test]
    fn test_pass_through_is_deterministic() {
        let mapper = TypeMapper::new();
        let ty = SourceType::class(ClassId::new("Shapes", "Rectangle").nested("Builder"));
        let first = mapper.map_type(&ty);
        assert_eq!(first, "Shapes.Rectangle.Builder");
        assert_eq!(mapper.map_type(&ty), first);
        assert_eq!(mapper.map_type(&SourceType::class(ClassId::new("", "Main"))), "Main");
    }

    #[test]
    fn test_return_and_parameter_modifiers() {
        let mapper = TypeMapper::new();
        assert_eq!(mapper.map_return_type(&SourceType::unit()), "void");
        assert_eq!(mapper.map_return_type(&SourceType::bottom()), "void");
        assert_eq!(mapper.map_return_type(&SourceType::double()), "double");

        let mut vararg = IrValueParameter::new("values", SourceType::int());
        vararg.is_vararg = true;
        assert_eq!(mapper.map_parameter(&vararg), "params int[]");
        let nullable = IrValueParameter::new("name", SourceType::string().nullable());
        assert_eq!(mapper.map_parameter(&nullable), "string?");
        let any = IrValueParameter::new("value", SourceType::top());
        assert_eq!(mapper.map_parameter(&any), "object");
    }
}
