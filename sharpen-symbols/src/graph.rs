//! Symbol graph
//!
//! Declarations live in per-kind arenas addressed by handles. Containment
//! (class → members) is recorded as handle lists; every other reference is a
//! `ClassId` / `CallableId` resolved through the class index. The graph is
//! populated once by a synthesizer and read-only afterwards.

use crate::{Result, SymbolError};
use indexmap::IndexMap;
use sharpen_ir::{
    CallableId, ClassId, ClassKind, FqName, Modality, SourceType, Variance, Visibility,
};

macro_rules! handle {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }

            fn from_len(len: usize) -> Self {
                $name(len as u32)
            }
        }
    };
}

handle!(ClassHandle);
handle!(FunctionHandle);
handle!(ConstructorHandle);
handle!(PropertyHandle);

/// Where a symbol was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolOrigin {
    Metadata { assembly: String },
    Builtin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameterSymbol {
    pub name: String,
    pub variance: Variance,
    pub bounds: Vec<SourceType>,
}

impl TypeParameterSymbol {
    pub fn new(name: &str, variance: Variance) -> Self {
        TypeParameterSymbol {
            name: name.to_string(),
            variance,
            bounds: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSymbol {
    pub name: String,
    /// Element type for varargs
    pub ty: SourceType,
    pub has_default: bool,
    pub is_vararg: bool,
}

impl ParameterSymbol {
    pub fn new(name: &str, ty: SourceType) -> Self {
        ParameterSymbol {
            name: name.to_string(),
            ty,
            has_default: false,
            is_vararg: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassSymbol {
    pub id: ClassId,
    pub kind: ClassKind,
    pub modality: Modality,
    pub visibility: Visibility,
    pub type_parameters: Vec<TypeParameterSymbol>,
    pub supertypes: Vec<SourceType>,
    pub enum_entries: Vec<String>,
    pub is_companion: bool,
    /// Free-function namespace; its functions are registered as top-level callables
    pub is_static_holder: bool,
    pub companion: Option<ClassId>,
    pub origin: SymbolOrigin,
    members: Vec<MemberHandle>,
}

impl ClassSymbol {
    pub fn new(id: ClassId, kind: ClassKind, origin: SymbolOrigin) -> Self {
        ClassSymbol {
            id,
            kind,
            modality: Modality::Final,
            visibility: Visibility::Public,
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            enum_entries: Vec::new(),
            is_companion: false,
            is_static_holder: false,
            companion: None,
            origin,
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.id.short_name()
    }

    pub fn is_object(&self) -> bool {
        self.kind == ClassKind::Object
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSymbol {
    pub id: CallableId,
    pub type_parameters: Vec<TypeParameterSymbol>,
    pub extension_receiver: Option<SourceType>,
    pub parameters: Vec<ParameterSymbol>,
    pub return_type: SourceType,
    pub is_static: bool,
    pub is_operator: bool,
    pub modality: Modality,
    pub visibility: Visibility,
    /// Class that carries this top-level function on the target platform
    pub static_holder: Option<ClassId>,
}

impl FunctionSymbol {
    pub fn new(id: CallableId, return_type: SourceType) -> Self {
        FunctionSymbol {
            id,
            type_parameters: Vec::new(),
            extension_receiver: None,
            parameters: Vec::new(),
            return_type,
            is_static: false,
            is_operator: false,
            modality: Modality::Final,
            visibility: Visibility::Public,
            static_holder: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorSymbol {
    pub class: ClassId,
    pub parameters: Vec<ParameterSymbol>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySymbol {
    pub id: CallableId,
    pub ty: SourceType,
    pub is_var: bool,
    pub is_const: bool,
    pub is_static: bool,
    pub static_holder: Option<ClassId>,
}

impl PropertySymbol {
    pub fn new(id: CallableId, ty: SourceType) -> Self {
        PropertySymbol {
            id,
            ty,
            is_var: false,
            is_const: false,
            is_static: false,
            static_holder: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberHandle {
    Class(ClassHandle),
    Function(FunctionHandle),
    Constructor(ConstructorHandle),
    Property(PropertyHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallableHandle {
    Function(FunctionHandle),
    Property(PropertyHandle),
}

/// A top-level callable visible in a package
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallableSymbol<'a> {
    Function(&'a FunctionSymbol),
    Property(&'a PropertySymbol),
}

impl<'a> CallableSymbol<'a> {
    pub fn id(&self) -> &'a CallableId {
        match self {
            CallableSymbol::Function(function) => &function.id,
            CallableSymbol::Property(property) => &property.id,
        }
    }

    pub fn static_holder(&self) -> Option<&'a ClassId> {
        match self {
            CallableSymbol::Function(function) => function.static_holder.as_ref(),
            CallableSymbol::Property(property) => property.static_holder.as_ref(),
        }
    }
}

/// A declaration nested in a class
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemberSymbol<'a> {
    Class(&'a ClassSymbol),
    Function(&'a FunctionSymbol),
    Constructor(&'a ConstructorSymbol),
    Property(&'a PropertySymbol),
}

#[derive(Debug, Default)]
struct PackageIndex {
    classes: Vec<ClassHandle>,
    callables: IndexMap<String, Vec<CallableHandle>>,
}

/// Arena of synthesized declarations with per-package indices
#[derive(Debug, Default)]
pub struct SymbolGraph {
    classes: Vec<ClassSymbol>,
    functions: Vec<FunctionSymbol>,
    constructors: Vec<ConstructorSymbol>,
    properties: Vec<PropertySymbol>,
    class_index: IndexMap<ClassId, ClassHandle>,
    packages: IndexMap<FqName, PackageIndex>,
}

impl SymbolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassSymbol> {
        self.classes.iter()
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionSymbol> {
        self.functions.iter()
    }

    pub fn packages(&self) -> impl Iterator<Item = &FqName> {
        self.packages.keys()
    }

    pub fn class(&self, handle: ClassHandle) -> &ClassSymbol {
        &self.classes[handle.index()]
    }

    pub fn function(&self, handle: FunctionHandle) -> &FunctionSymbol {
        &self.functions[handle.index()]
    }

    pub fn constructor(&self, handle: ConstructorHandle) -> &ConstructorSymbol {
        &self.constructors[handle.index()]
    }

    pub fn property(&self, handle: PropertyHandle) -> &PropertySymbol {
        &self.properties[handle.index()]
    }

    pub fn class_handle(&self, id: &ClassId) -> Option<ClassHandle> {
        self.class_index.get(id).copied()
    }

    /// Register a class. Nested classes are attached to their outer class if
    /// it is already present.
    pub fn add_class(&mut self, class: ClassSymbol) -> Result<ClassHandle> {
        if self.class_index.contains_key(&class.id) {
            return Err(SymbolError::DuplicateClass(class.id));
        }
        let handle = ClassHandle::from_len(self.classes.len());
        self.register_package(&class.id.package);
        match class.id.outer().and_then(|outer| self.class_handle(&outer)) {
            Some(outer) => self.classes[outer.index()]
                .members
                .push(MemberHandle::Class(handle)),
            None => self.package_mut(&class.id.package).classes.push(handle),
        }
        self.class_index.insert(class.id.clone(), handle);
        self.classes.push(class);
        Ok(handle)
    }

    /// Record `companion` as the companion of `owner`.
    pub fn set_companion(&mut self, owner: &ClassId, companion: ClassId) -> Result<()> {
        let handle = self.require_class(owner, &companion.to_string())?;
        self.classes[handle.index()].companion = Some(companion);
        Ok(())
    }

    /// Register a function: a member when its id names a class, a top-level
    /// callable of its package otherwise. Top-level functions with a static
    /// holder are also listed among the holder's members.
    pub fn add_function(&mut self, function: FunctionSymbol) -> Result<FunctionHandle> {
        let handle = FunctionHandle::from_len(self.functions.len());
        match (&function.id.class, &function.static_holder) {
            (Some(owner), _) => {
                let owner = self.require_class(owner, &function.id.to_string())?;
                self.classes[owner.index()]
                    .members
                    .push(MemberHandle::Function(handle));
            }
            (None, holder) => {
                if let Some(holder) = holder {
                    let holder = self.require_class(holder, &function.id.to_string())?;
                    self.classes[holder.index()]
                        .members
                        .push(MemberHandle::Function(handle));
                }
                self.register_package(&function.id.package);
                self.package_mut(&function.id.package)
                    .callables
                    .entry(function.id.name.clone())
                    .or_default()
                    .push(CallableHandle::Function(handle));
            }
        }
        self.functions.push(function);
        Ok(handle)
    }

    pub fn add_constructor(&mut self, constructor: ConstructorSymbol) -> Result<ConstructorHandle> {
        let handle = ConstructorHandle::from_len(self.constructors.len());
        let owner = self.require_class(&constructor.class, "<init>")?;
        self.classes[owner.index()]
            .members
            .push(MemberHandle::Constructor(handle));
        self.constructors.push(constructor);
        Ok(handle)
    }

    pub fn add_property(&mut self, property: PropertySymbol) -> Result<PropertyHandle> {
        let handle = PropertyHandle::from_len(self.properties.len());
        match &property.id.class {
            Some(owner) => {
                let owner = self.require_class(owner, &property.id.to_string())?;
                self.classes[owner.index()]
                    .members
                    .push(MemberHandle::Property(handle));
            }
            None => {
                if let Some(holder) = &property.static_holder {
                    let holder = self.require_class(holder, &property.id.to_string())?;
                    self.classes[holder.index()]
                        .members
                        .push(MemberHandle::Property(handle));
                }
                self.register_package(&property.id.package);
                self.package_mut(&property.id.package)
                    .callables
                    .entry(property.id.name.clone())
                    .or_default()
                    .push(CallableHandle::Property(handle));
            }
        }
        self.properties.push(property);
        Ok(handle)
    }

    /// All function overloads registered under `id`.
    pub fn functions_by_id(&self, id: &CallableId) -> Vec<&FunctionSymbol> {
        match &id.class {
            Some(class) => self
                .members(class)
                .into_iter()
                .filter_map(|member| match member {
                    MemberSymbol::Function(function) if function.id.name == id.name => {
                        Some(function)
                    }
                    _ => None,
                })
                .collect(),
            None => self
                .callables(&id.package, &id.name)
                .into_iter()
                .filter_map(|callable| match callable {
                    CallableSymbol::Function(function) => Some(function),
                    CallableSymbol::Property(_) => None,
                })
                .collect(),
        }
    }

    fn members(&self, class: &ClassId) -> Vec<MemberSymbol<'_>> {
        let Some(handle) = self.class_handle(class) else {
            return Vec::new();
        };
        self.class(handle)
            .members
            .iter()
            .map(|member| match *member {
                MemberHandle::Class(h) => MemberSymbol::Class(self.class(h)),
                MemberHandle::Function(h) => MemberSymbol::Function(self.function(h)),
                MemberHandle::Constructor(h) => MemberSymbol::Constructor(self.constructor(h)),
                MemberHandle::Property(h) => MemberSymbol::Property(self.property(h)),
            })
            .collect()
    }

    fn callables(&self, package: &FqName, name: &str) -> Vec<CallableSymbol<'_>> {
        self.packages
            .get(package)
            .and_then(|index| index.callables.get(name))
            .map(|handles| handles.iter().map(|h| self.callable(*h)).collect())
            .unwrap_or_default()
    }

    fn callable(&self, handle: CallableHandle) -> CallableSymbol<'_> {
        match handle {
            CallableHandle::Function(h) => CallableSymbol::Function(self.function(h)),
            CallableHandle::Property(h) => CallableSymbol::Property(self.property(h)),
        }
    }

    fn require_class(&self, id: &ClassId, member: &str) -> Result<ClassHandle> {
        self.class_handle(id).ok_or_else(|| SymbolError::UnknownOwner {
            owner: id.clone(),
            member: member.to_string(),
        })
    }

    /// The package and its ancestors all become known packages.
    fn register_package(&mut self, package: &FqName) {
        for name in package.ancestors() {
            self.packages.entry(name).or_default();
        }
    }

    fn package_mut(&mut self, package: &FqName) -> &mut PackageIndex {
        self.packages.entry(package.clone()).or_default()
    }
}

/// Name-resolution queries the frontend asks of an additional symbol source
pub trait SymbolProvider {
    /// True for a package that declares something, and for all of its parents.
    fn has_package(&self, package: &FqName) -> bool;

    fn class_by_id(&self, id: &ClassId) -> Option<&ClassSymbol>;

    fn contains_class(&self, id: &ClassId) -> bool {
        self.class_by_id(id).is_some()
    }

    fn top_level_callables(&self, package: &FqName, name: &str) -> Vec<CallableSymbol<'_>>;

    /// Top-level classes of a package, in declaration order.
    fn classes_in_package(&self, package: &FqName) -> Vec<&ClassSymbol>;

    fn callables_in_package(&self, package: &FqName) -> Vec<CallableSymbol<'_>>;

    fn members_of(&self, class: &ClassId) -> Vec<MemberSymbol<'_>>;

    fn functions_by_id(&self, id: &CallableId) -> Vec<&FunctionSymbol>;
}

impl SymbolProvider for SymbolGraph {
    fn has_package(&self, package: &FqName) -> bool {
        package.is_root() || self.packages.contains_key(package)
    }

    fn class_by_id(&self, id: &ClassId) -> Option<&ClassSymbol> {
        self.class_handle(id).map(|handle| self.class(handle))
    }

    fn top_level_callables(&self, package: &FqName, name: &str) -> Vec<CallableSymbol<'_>> {
        self.callables(package, name)
    }

    fn classes_in_package(&self, package: &FqName) -> Vec<&ClassSymbol> {
        self.packages
            .get(package)
            .map(|index| index.classes.iter().map(|h| self.class(*h)).collect())
            .unwrap_or_default()
    }

    fn callables_in_package(&self, package: &FqName) -> Vec<CallableSymbol<'_>> {
        self.packages
            .get(package)
            .map(|index| {
                index
                    .callables
                    .values()
                    .flatten()
                    .map(|h| self.callable(*h))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn members_of(&self, class: &ClassId) -> Vec<MemberSymbol<'_>> {
        self.members(class)
    }

    fn functions_by_id(&self, id: &CallableId) -> Vec<&FunctionSymbol> {
        SymbolGraph::functions_by_id(self, id)
    }
}

/// Several providers consulted in order; the first one that knows a class wins
#[derive(Default)]
pub struct LayeredSymbols<'a> {
    layers: Vec<&'a dyn SymbolProvider>,
}

impl<'a> LayeredSymbols<'a> {
    pub fn new() -> Self {
        LayeredSymbols { layers: Vec::new() }
    }

    pub fn with_layer(mut self, layer: &'a dyn SymbolProvider) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn push(&mut self, layer: &'a dyn SymbolProvider) {
        self.layers.push(layer);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl SymbolProvider for LayeredSymbols<'_> {
    fn has_package(&self, package: &FqName) -> bool {
        self.layers.iter().any(|layer| layer.has_package(package))
    }

    fn class_by_id(&self, id: &ClassId) -> Option<&ClassSymbol> {
        self.layers.iter().find_map(|layer| layer.class_by_id(id))
    }

    fn top_level_callables(&self, package: &FqName, name: &str) -> Vec<CallableSymbol<'_>> {
        self.layers
            .iter()
            .flat_map(|layer| layer.top_level_callables(package, name))
            .collect()
    }

    fn classes_in_package(&self, package: &FqName) -> Vec<&ClassSymbol> {
        self.layers
            .iter()
            .flat_map(|layer| layer.classes_in_package(package))
            .collect()
    }

    fn callables_in_package(&self, package: &FqName) -> Vec<CallableSymbol<'_>> {
        self.layers
            .iter()
            .flat_map(|layer| layer.callables_in_package(package))
            .collect()
    }

    fn members_of(&self, class: &ClassId) -> Vec<MemberSymbol<'_>> {
        self.layers
            .iter()
            .find(|layer| layer.contains_class(class))
            .map(|layer| layer.members_of(class))
            .unwrap_or_default()
    }

    fn functions_by_id(&self, id: &CallableId) -> Vec<&FunctionSymbol> {
        self.layers
            .iter()
            .flat_map(|layer| layer.functions_by_id(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> SymbolOrigin {
        SymbolOrigin::Metadata {
            assembly: "Shapes".to_string(),
        }
    }

    #[test]
    fn test_duplicate_class_rejected() {
        let mut graph = SymbolGraph::new();
        let id = ClassId::new("Shapes", "Rectangle");
        graph
            .add_class(ClassSymbol::new(id.clone(), ClassKind::Class, metadata()))
            .unwrap();
        let err = graph
            .add_class(ClassSymbol::new(id.clone(), ClassKind::Class, metadata()))
            .unwrap_err();
        assert!(matches!(err, SymbolError::DuplicateClass(dup) if dup == id));
        assert_eq!(graph.class_count(), 1);
    }

    #[test]
    fn test_packages_include_ancestors() {
        let mut graph = SymbolGraph::new();
        graph
            .add_class(ClassSymbol::new(
                ClassId::new("System.Collections.Generic", "List"),
                ClassKind::Class,
                metadata(),
            ))
            .unwrap();
        assert!(graph.has_package(&FqName::new("System")));
        assert!(graph.has_package(&FqName::new("System.Collections")));
        assert!(!graph.has_package(&FqName::new("Shapes")));
    }

    #[test]
    fn test_nested_classes_are_members_not_package_classes() {
        let mut graph = SymbolGraph::new();
        let outer = ClassId::new("Shapes", "Rectangle");
        graph
            .add_class(ClassSymbol::new(outer.clone(), ClassKind::Class, metadata()))
            .unwrap();
        graph
            .add_class(ClassSymbol::new(outer.companion(), ClassKind::Object, metadata()))
            .unwrap();

        let package = graph.classes_in_package(&FqName::new("Shapes"));
        assert_eq!(package.len(), 1);
        let members = graph.members_of(&outer);
        assert!(matches!(members[0], MemberSymbol::Class(c) if c.id == outer.companion()));
    }

    #[test]
    fn test_static_holder_functions_are_top_level() {
        let mut graph = SymbolGraph::new();
        let holder = ClassId::new("Shapes", "Geometry");
        let mut class = ClassSymbol::new(holder.clone(), ClassKind::Object, metadata());
        class.is_static_holder = true;
        graph.add_class(class).unwrap();

        let mut function = FunctionSymbol::new(
            CallableId::top_level("Shapes", "area"),
            SourceType::double(),
        );
        function.static_holder = Some(holder.clone());
        graph.add_function(function).unwrap();

        let callables = graph.top_level_callables(&FqName::new("Shapes"), "area");
        assert_eq!(callables.len(), 1);
        assert_eq!(callables[0].static_holder(), Some(&holder));
        assert_eq!(graph.members_of(&holder).len(), 1);
        assert_eq!(
            graph
                .functions_by_id(&CallableId::top_level("Shapes", "area"))
                .len(),
            1
        );
    }

    #[test]
    fn test_member_of_unknown_class_is_an_error() {
        let mut graph = SymbolGraph::new();
        let function = FunctionSymbol::new(
            ClassId::new("x", "Missing").member("f"),
            SourceType::unit(),
        );
        assert!(matches!(
            graph.add_function(function),
            Err(SymbolError::UnknownOwner { .. })
        ));
    }

    #[test]
    fn test_layered_lookup_order() {
        let mut first = SymbolGraph::new();
        let mut second = SymbolGraph::new();
        let id = ClassId::new("kotlin", "Int");
        first
            .add_class(ClassSymbol::new(id.clone(), ClassKind::Class, SymbolOrigin::Builtin))
            .unwrap();
        second
            .add_class(ClassSymbol::new(id.clone(), ClassKind::Interface, metadata()))
            .unwrap();
        second
            .add_class(ClassSymbol::new(
                ClassId::new("Shapes", "Rectangle"),
                ClassKind::Class,
                metadata(),
            ))
            .unwrap();

        let layered = LayeredSymbols::new().with_layer(&first).with_layer(&second);
        assert_eq!(layered.class_by_id(&id).unwrap().kind, ClassKind::Class);
        assert!(layered.contains_class(&ClassId::new("Shapes", "Rectangle")));
        assert!(layered.has_package(&FqName::new("Shapes")));
    }
}
