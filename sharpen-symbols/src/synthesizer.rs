//! Symbol synthesis from foreign metadata
//!
//! Every public metadata type becomes one class symbol. Attribute markers
//! decide the shape: singleton objects keep all their members, static-only
//! holders export their methods as top-level callables of the namespace,
//! and ordinary classes move static members into a nested companion.
//!
//! A type whose shape does not fit is skipped and reported; it never stops
//! synthesis of its siblings.

use crate::foreign::{class_id_of, is_implicit_base, ForeignTypes};
use crate::graph::{
    ClassSymbol, ConstructorSymbol, FunctionSymbol, ParameterSymbol, PropertySymbol, SymbolGraph,
    SymbolOrigin, TypeParameterSymbol,
};
use crate::SymbolError;
use indexmap::IndexMap;
use sharpen_ir::{CallableId, ClassId, ClassKind, Modality, SourceType, Variance, Visibility};
use sharpen_metadata::{
    Assembly, MemberVisibility, MethodInfo, ParameterInfo, TypeFlags, TypeInfo, TypeParameterInfo,
};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

pub const SINGLETON_OBJECT_ATTRIBUTE: &str = "Sharpen.Runtime.SingletonObjectAttribute";
pub const FILE_FACADE_ATTRIBUTE: &str = "Sharpen.Runtime.FileFacadeAttribute";
pub const DOES_NOT_RETURN_ATTRIBUTE: &str =
    "System.Diagnostics.CodeAnalysis.DoesNotReturnAttribute";
pub const EXTENSION_ATTRIBUTE: &str = "System.Runtime.CompilerServices.ExtensionAttribute";

/// Backing field of enum values in metadata
const ENUM_VALUE_FIELD: &str = "value__";

/// How a metadata type is represented in the symbol graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
    Object,
    StaticHolder,
    Class,
}

impl TypeShape {
    pub fn of(ty: &TypeInfo) -> Self {
        if ty.has_attribute(SINGLETON_OBJECT_ATTRIBUTE) {
            TypeShape::Object
        } else if ty.has_attribute(FILE_FACADE_ATTRIBUTE) || is_static_class(ty) {
            TypeShape::StaticHolder
        } else {
            TypeShape::Class
        }
    }
}

/// `abstract sealed` is how static classes appear in metadata.
fn is_static_class(ty: &TypeInfo) -> bool {
    ty.flags.contains(TypeFlags::IS_ABSTRACT | TypeFlags::IS_SEALED)
        && !ty.flags.contains(TypeFlags::IS_INTERFACE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotPublic,
    VoidMarker,
    ArityMismatch { declared: usize, actual: usize },
    Duplicate { first_assembly: String },
    Malformed(String),
}

impl SkipReason {
    /// Non-public types and the void marker are skipped routinely.
    pub fn is_anomaly(&self) -> bool {
        !matches!(self, SkipReason::NotPublic | SkipReason::VoidMarker)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotPublic => write!(f, "not public"),
            SkipReason::VoidMarker => write!(f, "void marker type"),
            SkipReason::ArityMismatch { declared, actual } => write!(
                f,
                "name declares {} type parameters but {} are listed",
                declared, actual
            ),
            SkipReason::Duplicate { first_assembly } => {
                write!(f, "already defined by assembly {}", first_assembly)
            }
            SkipReason::Malformed(message) => write!(f, "{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedType {
    pub assembly: String,
    pub type_name: String,
    pub reason: SkipReason,
}

/// Outcome of synthesis besides the graph itself
#[derive(Debug, Default, Clone)]
pub struct SynthesisReport {
    pub classes: usize,
    pub functions: usize,
    pub skipped: Vec<SkippedType>,
}

impl SynthesisReport {
    pub fn anomalies(&self) -> impl Iterator<Item = &SkippedType> {
        self.skipped.iter().filter(|s| s.reason.is_anomaly())
    }

    pub fn has_anomalies(&self) -> bool {
        self.anomalies().next().is_some()
    }
}

/// Synthesize a symbol graph from resolved assemblies.
pub fn synthesize(assemblies: &IndexMap<String, Assembly>) -> (SymbolGraph, SynthesisReport) {
    let mut synthesizer = SymbolSynthesizer::new(assemblies.values());
    for assembly in assemblies.values() {
        synthesizer.add_assembly(assembly);
    }
    synthesizer.finish()
}

pub struct SymbolSynthesizer {
    foreign: ForeignTypes,
    graph: SymbolGraph,
    report: SynthesisReport,
    /// Class id → assembly that first defined it
    defined_by: IndexMap<ClassId, String>,
}

impl SymbolSynthesizer {
    /// Prepare reference resolution over every assembly that will be synthesized.
    pub fn new<'a>(assemblies: impl IntoIterator<Item = &'a Assembly>) -> Self {
        let foreign = ForeignTypes::from_assemblies(assemblies, |ty| check_type(ty).is_ok());
        SymbolSynthesizer {
            foreign,
            graph: SymbolGraph::new(),
            report: SynthesisReport::default(),
            defined_by: IndexMap::new(),
        }
    }

    pub fn add_assembly(&mut self, assembly: &Assembly) {
        info!(
            "Synthesizing symbols for assembly {} ({} types)",
            assembly.name,
            assembly.types.len()
        );
        let mut visited = HashSet::new();
        for ty in assembly.top_level_types() {
            self.add_type_tree(assembly, ty, &mut visited);
        }
        // Nested types listed only at the top level of the assembly
        for ty in assembly.types.iter().filter(|ty| ty.flags.contains(TypeFlags::IS_NESTED)) {
            self.add_type_tree(assembly, ty, &mut visited);
        }
    }

    pub fn finish(self) -> (SymbolGraph, SynthesisReport) {
        let mut report = self.report;
        report.classes = self.graph.class_count();
        report.functions = self.graph.function_count();
        info!(
            "Synthesized {} classes and {} functions, {} types skipped with anomalies",
            report.classes,
            report.functions,
            report.anomalies().count()
        );
        (self.graph, report)
    }

    fn add_type_tree(
        &mut self,
        assembly: &Assembly,
        ty: &TypeInfo,
        visited: &mut HashSet<ClassId>,
    ) {
        let id = class_id_of(ty);
        if !visited.insert(id.clone()) {
            return;
        }
        if let Err(reason) = self.add_type(assembly, ty, &id) {
            self.skip(assembly, ty, reason);
            return;
        }
        for nested in &ty.nested_types {
            self.add_type_tree(assembly, nested, visited);
        }
    }

    fn skip(&mut self, assembly: &Assembly, ty: &TypeInfo, reason: SkipReason) {
        if reason.is_anomaly() {
            warn!("Skipping type {} from {}: {}", ty.full_name(), assembly.name, reason);
        } else {
            debug!("Skipping type {} from {}: {}", ty.full_name(), assembly.name, reason);
        }
        self.report.skipped.push(SkippedType {
            assembly: assembly.name.clone(),
            type_name: ty.full_name(),
            reason,
        });
    }

    fn add_type(
        &mut self,
        assembly: &Assembly,
        ty: &TypeInfo,
        id: &ClassId,
    ) -> Result<(), SkipReason> {
        check_type(ty)?;
        if let Some(first_assembly) = self.defined_by.get(id) {
            return Err(SkipReason::Duplicate {
                first_assembly: first_assembly.clone(),
            });
        }

        let origin = SymbolOrigin::Metadata {
            assembly: assembly.name.clone(),
        };
        let shape = TypeShape::of(ty);
        let mut class = ClassSymbol::new(id.clone(), class_kind(ty, shape), origin.clone());
        class.modality = modality(ty, shape);
        class.type_parameters = ty.type_parameters.iter().map(type_parameter).collect();
        class.supertypes = ty
            .base_type
            .iter()
            .filter(|base| !is_implicit_base(base))
            .chain(ty.interfaces.iter())
            .map(|reference| self.foreign.resolve(reference))
            .filter(|supertype| supertype != &SourceType::top())
            .collect();
        if ty.flags.contains(TypeFlags::IS_ENUM) {
            class.enum_entries = ty
                .fields
                .iter()
                .filter(|field| field.is_static && field.is_literal)
                .map(|field| field.name.clone())
                .collect();
        }
        class.is_static_holder = shape == TypeShape::StaticHolder;

        self.graph.add_class(class).map_err(malformed)?;
        self.defined_by.insert(id.clone(), assembly.name.clone());

        let members = match shape {
            TypeShape::Object => self.add_object_members(ty, id),
            TypeShape::StaticHolder => self.add_holder_members(ty, id),
            TypeShape::Class => self.add_class_members(ty, id, &origin),
        };
        members.map_err(malformed)
    }

    fn add_object_members(&mut self, ty: &TypeInfo, id: &ClassId) -> crate::Result<()> {
        for method in visible_methods(ty) {
            let function = self.function(method, id.member(&method.name), None);
            self.graph.add_function(function)?;
        }
        self.add_fields_and_properties(ty, id, |_| true)
    }

    fn add_holder_members(&mut self, ty: &TypeInfo, id: &ClassId) -> crate::Result<()> {
        let package = ty.namespace.clone();
        for method in visible_methods(ty).filter(|m| m.is_static) {
            let callable = CallableId::top_level(&package, &method.name);
            let function = self.function(method, callable, Some(id));
            self.graph.add_function(function)?;
        }
        for field in ty.fields.iter().filter(|f| f.is_static && f.visibility.is_accessible()) {
            let mut property = PropertySymbol::new(
                CallableId::top_level(&package, &field.name),
                self.foreign.resolve(&field.field_type),
            );
            property.is_var = !field.is_init_only && !field.is_literal;
            property.is_const = field.is_literal;
            property.is_static = true;
            property.static_holder = Some(id.clone());
            self.graph.add_property(property)?;
        }
        for info in ty.properties.iter().filter(|p| p.is_static && p.can_read) {
            let mut property = PropertySymbol::new(
                CallableId::top_level(&package, &info.name),
                self.foreign.resolve(&info.property_type),
            );
            property.is_var = info.can_write;
            property.is_static = true;
            property.static_holder = Some(id.clone());
            self.graph.add_property(property)?;
        }
        Ok(())
    }

    fn add_class_members(
        &mut self,
        ty: &TypeInfo,
        id: &ClassId,
        origin: &SymbolOrigin,
    ) -> crate::Result<()> {
        let has_static_members = visible_methods(ty).any(|m| m.is_static)
            || ty
                .fields
                .iter()
                .any(|f| f.is_static && !f.is_literal && f.visibility.is_accessible())
            || ty.properties.iter().any(|p| p.is_static);
        let is_enum = ty.flags.contains(TypeFlags::IS_ENUM);
        let companion = if has_static_members && !is_enum {
            let companion_id = id.companion();
            let mut companion =
                ClassSymbol::new(companion_id.clone(), ClassKind::Object, origin.clone());
            companion.is_companion = true;
            self.graph.add_class(companion)?;
            self.graph.set_companion(id, companion_id.clone())?;
            Some(companion_id)
        } else {
            None
        };

        if !ty.flags.contains(TypeFlags::IS_INTERFACE) {
            for constructor in ty
                .constructors
                .iter()
                .filter(|c| !c.is_static && c.visibility.is_accessible())
            {
                let parameters = self.parameters(&constructor.parameters);
                self.graph.add_constructor(ConstructorSymbol {
                    class: id.clone(),
                    parameters,
                    visibility: visibility(constructor.visibility),
                })?;
            }
        }

        for method in visible_methods(ty) {
            let owner = match (&companion, method.is_static) {
                (Some(companion), true) => companion,
                (None, true) if is_enum => id,
                (None, true) => continue,
                (_, false) => id,
            };
            let mut function = self.function(method, owner.member(&method.name), None);
            function.is_static = method.is_static && companion.is_none();
            self.graph.add_function(function)?;
        }

        self.add_fields_and_properties(ty, id, |is_static| !is_static)?;
        if let Some(companion) = &companion {
            self.add_fields_and_properties(ty, companion, |is_static| is_static)?;
        }
        Ok(())
    }

    /// Fields and properties become property symbols owned by `owner`.
    fn add_fields_and_properties(
        &mut self,
        ty: &TypeInfo,
        owner: &ClassId,
        mut wanted: impl FnMut(bool) -> bool,
    ) -> crate::Result<()> {
        let is_enum = ty.flags.contains(TypeFlags::IS_ENUM);
        for field in &ty.fields {
            if !field.visibility.is_accessible() || !wanted(field.is_static) {
                continue;
            }
            if is_enum && (field.is_literal || field.name == ENUM_VALUE_FIELD) {
                continue;
            }
            let field_type = self.foreign.resolve(&field.field_type);
            let mut property = PropertySymbol::new(owner.member(&field.name), field_type);
            property.is_var = !field.is_init_only && !field.is_literal;
            property.is_const = field.is_literal;
            property.is_static = field.is_static;
            self.graph.add_property(property)?;
        }
        for info in &ty.properties {
            if !info.can_read || !wanted(info.is_static) {
                continue;
            }
            let property_type = self.foreign.resolve(&info.property_type);
            let mut property = PropertySymbol::new(owner.member(&info.name), property_type);
            property.is_var = info.can_write;
            property.is_static = info.is_static;
            self.graph.add_property(property)?;
        }
        for event in &ty.events {
            debug!("Skipping event {}.{}", ty.full_name(), event.name);
        }
        Ok(())
    }

    fn function(
        &self,
        method: &MethodInfo,
        id: CallableId,
        holder: Option<&ClassId>,
    ) -> FunctionSymbol {
        let return_type = if method.has_attribute(DOES_NOT_RETURN_ATTRIBUTE) {
            SourceType::bottom()
        } else {
            self.foreign.resolve(&method.return_type)
        };

        let mut function = FunctionSymbol::new(id, return_type);
        function.type_parameters = method.type_parameters.iter().map(type_parameter).collect();
        function.is_static = method.is_static;
        function.visibility = visibility(method.visibility);
        function.modality = if method.is_abstract {
            Modality::Abstract
        } else if method.is_virtual && !method.is_final {
            Modality::Open
        } else {
            Modality::Final
        };
        function.static_holder = holder.cloned();

        let mut parameters = method.parameters.as_slice();
        if method.has_attribute(EXTENSION_ATTRIBUTE) {
            if let Some((receiver, rest)) = parameters.split_first() {
                function.extension_receiver = Some(self.foreign.resolve(&receiver.ty));
                parameters = rest;
            }
        }
        function.parameters = self.parameters(parameters);
        function
    }

    fn parameters(&self, parameters: &[ParameterInfo]) -> Vec<ParameterSymbol> {
        parameters
            .iter()
            .enumerate()
            .map(|(index, parameter)| {
                let name = parameter
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("p{}", index));
                let mut ty = self.foreign.resolve(&parameter.ty);
                if parameter.is_variadic {
                    ty = ty.argument_type(0).cloned().unwrap_or_else(SourceType::top);
                }
                ParameterSymbol {
                    name,
                    ty,
                    has_default: parameter.has_default_value,
                    is_vararg: parameter.is_variadic,
                }
            })
            .collect()
    }
}

/// Accessible methods that are not property or event accessors.
fn visible_methods(ty: &TypeInfo) -> impl Iterator<Item = &MethodInfo> {
    let accessors: HashSet<String> = ty
        .properties
        .iter()
        .flat_map(|p| [format!("get_{}", p.name), format!("set_{}", p.name)])
        .chain(
            ty.events
                .iter()
                .flat_map(|e| [format!("add_{}", e.name), format!("remove_{}", e.name)]),
        )
        .collect();
    ty.methods
        .iter()
        .filter(move |m| m.visibility.is_accessible() && !accessors.contains(&m.name))
}

/// Structural checks applied before a type is synthesized or referenced.
pub fn check_type(ty: &TypeInfo) -> Result<(), SkipReason> {
    if ty.is_void() {
        return Err(SkipReason::VoidMarker);
    }
    if !ty.is_public() {
        return Err(SkipReason::NotPublic);
    }
    if ty.name.is_empty() {
        return Err(SkipReason::Malformed("empty type name".to_string()));
    }
    if let Some(declared) = ty.declared_arity() {
        if declared != ty.type_parameters.len() {
            return Err(SkipReason::ArityMismatch {
                declared,
                actual: ty.type_parameters.len(),
            });
        }
    }
    Ok(())
}

fn malformed(error: SymbolError) -> SkipReason {
    SkipReason::Malformed(error.to_string())
}

fn class_kind(ty: &TypeInfo, shape: TypeShape) -> ClassKind {
    match shape {
        TypeShape::Object | TypeShape::StaticHolder => ClassKind::Object,
        TypeShape::Class if ty.flags.contains(TypeFlags::IS_INTERFACE) => ClassKind::Interface,
        TypeShape::Class if ty.flags.contains(TypeFlags::IS_ENUM) => ClassKind::Enum,
        TypeShape::Class => ClassKind::Class,
    }
}

fn modality(ty: &TypeInfo, shape: TypeShape) -> Modality {
    if shape != TypeShape::Class {
        return Modality::Final;
    }
    if ty.flags.contains(TypeFlags::IS_INTERFACE) || ty.flags.contains(TypeFlags::IS_ABSTRACT) {
        Modality::Abstract
    } else if ty.flags.contains(TypeFlags::IS_SEALED)
        || ty.flags.contains(TypeFlags::IS_VALUE_TYPE)
        || ty.flags.contains(TypeFlags::IS_ENUM)
    {
        Modality::Final
    } else {
        Modality::Open
    }
}

fn type_parameter(info: &TypeParameterInfo) -> TypeParameterSymbol {
    let variance = if info.is_covariant {
        Variance::Out
    } else if info.is_contravariant {
        Variance::In
    } else {
        Variance::Invariant
    };
    TypeParameterSymbol::new(&info.name, variance)
}

fn visibility(visibility: MemberVisibility) -> Visibility {
    match visibility {
        MemberVisibility::Public => Visibility::Public,
        MemberVisibility::Family | MemberVisibility::FamilyOrAssembly => Visibility::Protected,
        MemberVisibility::FamilyAndAssembly | MemberVisibility::Assembly => Visibility::Internal,
        MemberVisibility::Private => Visibility::Private,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemberSymbol, SymbolProvider};
    use sharpen_ir::FqName;
    use sharpen_metadata::{
        AttributeInfo, ConstructorInfo, EventInfo, FieldInfo, PropertyInfo, TypeRef,
    };

    fn double() -> TypeRef {
        TypeRef::named("System", "Double")
    }

    fn method(name: &str, is_static: bool) -> MethodInfo {
        MethodInfo {
            name: name.to_string(),
            return_type: double(),
            attributes: Vec::new(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            is_static,
            visibility: MemberVisibility::Public,
            is_virtual: false,
            is_final: false,
            is_abstract: false,
        }
    }

    fn parameter(name: &str, ty: TypeRef) -> ParameterInfo {
        ParameterInfo {
            name: Some(name.to_string()),
            ty,
            attributes: Vec::new(),
            has_default_value: false,
            is_variadic: false,
        }
    }

    fn rectangle() -> TypeInfo {
        let mut ty = TypeInfo::new("Shapes", "Rectangle");
        ty.constructors.push(ConstructorInfo {
            attributes: Vec::new(),
            parameters: vec![parameter("height", double()), parameter("length", double())],
            is_static: false,
            visibility: MemberVisibility::Public,
        });
        for name in ["height", "length"] {
            ty.fields.push(FieldInfo {
                name: name.to_string(),
                field_type: double(),
                is_static: false,
                is_init_only: true,
                is_literal: false,
                visibility: MemberVisibility::Public,
            });
        }
        ty.properties.push(PropertyInfo {
            name: "perimeter".to_string(),
            property_type: double(),
            can_read: true,
            can_write: false,
            is_static: false,
        });
        ty.methods.push(method("get_perimeter", false));
        ty.methods.push(method("Area", false));
        ty.methods.push(method("Unit", true));
        ty
    }

    fn assemblies(types: Vec<TypeInfo>) -> IndexMap<String, Assembly> {
        let mut assembly = Assembly::new("Shapes");
        assembly.types = types;
        IndexMap::from([("Shapes".to_string(), assembly)])
    }

    #[test]
    fn test_companion_split() {
        let (graph, report) = synthesize(&assemblies(vec![rectangle()]));
        assert!(!report.has_anomalies());

        let id = ClassId::new("Shapes", "Rectangle");
        let class = graph.class_by_id(&id).unwrap();
        assert_eq!(class.companion, Some(id.companion()));
        assert!(graph.class_by_id(&id.companion()).unwrap().is_companion);

        let instance_functions: Vec<_> = graph
            .members_of(&id)
            .into_iter()
            .filter_map(|m| match m {
                MemberSymbol::Function(f) => Some(f.name().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(instance_functions, vec!["Area"]);

        let companion_functions: Vec<_> = graph
            .members_of(&id.companion())
            .into_iter()
            .filter_map(|m| match m {
                MemberSymbol::Function(f) => Some(f.name().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(companion_functions, vec!["Unit"]);
    }

    #[test]
    fn test_properties_and_constructors() {
        let (graph, _) = synthesize(&assemblies(vec![rectangle()]));
        let id = ClassId::new("Shapes", "Rectangle");
        let members = graph.members_of(&id);
        let properties: Vec<_> = members
            .iter()
            .filter_map(|m| match m {
                MemberSymbol::Property(p) => Some(p.id.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(properties, vec!["height", "length", "perimeter"]);
        let constructor = members
            .iter()
            .find_map(|m| match m {
                MemberSymbol::Constructor(c) => Some(*c),
                _ => None,
            })
            .unwrap();
        assert_eq!(constructor.parameters.len(), 2);
        assert_eq!(constructor.parameters[0].ty, SourceType::double());
    }

    #[test]
    fn test_static_holder_exports_top_level_functions() {
        let mut ty = TypeInfo::new("Shapes", "Geometry");
        ty.attributes.push(AttributeInfo::new(FILE_FACADE_ATTRIBUTE));
        let mut fail = method("fail", true);
        fail.attributes.push(AttributeInfo::new(DOES_NOT_RETURN_ATTRIBUTE));
        ty.methods.push(fail);
        let mut scale = method("scale", true);
        scale.attributes.push(AttributeInfo::new(EXTENSION_ATTRIBUTE));
        scale.parameters = vec![
            parameter("self", TypeRef::named("Shapes", "Geometry")),
            parameter("factor", double()),
        ];
        ty.methods.push(scale);

        let (graph, _) = synthesize(&assemblies(vec![ty]));
        let package = FqName::new("Shapes");
        let fail = graph.top_level_callables(&package, "fail");
        let crate::graph::CallableSymbol::Function(fail) = fail[0] else {
            panic!("expected a function");
        };
        assert!(fail.return_type.is_nothing());
        assert_eq!(fail.static_holder, Some(ClassId::new("Shapes", "Geometry")));

        let scale = graph.functions_by_id(&CallableId::top_level("Shapes", "scale"));
        assert!(scale[0].extension_receiver.is_some());
        assert_eq!(scale[0].parameters.len(), 1);
        assert_eq!(scale[0].parameters[0].name, "factor");
    }

    #[test]
    fn test_singleton_object_keeps_members() {
        let mut ty = TypeInfo::new("Shapes", "Registry");
        ty.attributes.push(AttributeInfo::new(SINGLETON_OBJECT_ATTRIBUTE));
        ty.methods.push(method("count", true));
        let (graph, _) = synthesize(&assemblies(vec![ty]));
        let id = ClassId::new("Shapes", "Registry");
        assert!(graph.class_by_id(&id).unwrap().is_object());
        assert!(graph.class_by_id(&id.companion()).is_none());
        assert_eq!(graph.members_of(&id).len(), 1);
    }

    #[test]
    fn test_malformed_type_does_not_stop_siblings() {
        let mut broken = TypeInfo::new("Shapes", "Bag`2");
        broken.type_parameters.push(TypeParameterInfo::new("T"));
        let mut hidden = TypeInfo::new("Shapes", "Hidden");
        hidden.flags = TypeFlags::empty();
        let void = TypeInfo::new("System", "Void");

        let (graph, report) = synthesize(&assemblies(vec![broken, hidden, void, rectangle()]));
        assert!(graph.contains_class(&ClassId::new("Shapes", "Rectangle")));
        assert!(!graph.contains_class(&ClassId::new("Shapes", "Bag")));
        let anomalies: Vec<_> = report.anomalies().collect();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(
            anomalies[0].reason,
            SkipReason::ArityMismatch {
                declared: 2,
                actual: 1
            }
        );
        assert_eq!(report.skipped.len(), 3);
    }

    #[test]
    fn test_duplicate_across_assemblies_is_reported() {
        let mut first = Assembly::new("A");
        first.types.push(TypeInfo::new("Shapes", "Point"));
        let mut second = Assembly::new("B");
        second.types.push(TypeInfo::new("Shapes", "Point"));
        let map = IndexMap::from([("A".to_string(), first), ("B".to_string(), second)]);

        let (graph, report) = synthesize(&map);
        assert_eq!(graph.class_count(), 1);
        assert_eq!(
            report.anomalies().next().unwrap().reason,
            SkipReason::Duplicate {
                first_assembly: "A".to_string()
            }
        );
    }

    #[test]
    fn test_events_and_accessors_are_not_functions() {
        let mut ty = rectangle();
        ty.events.push(EventInfo {
            name: "Changed".to_string(),
            handler_type: TypeRef::named("System", "EventHandler"),
            is_static: false,
        });
        ty.methods.push(method("add_Changed", false));
        let (graph, _) = synthesize(&assemblies(vec![ty]));
        let names: Vec<_> = graph.functions().map(|f| f.name().to_string()).collect();
        assert!(!names.iter().any(|n| n.starts_with("get_") || n.starts_with("add_")));
    }
}
