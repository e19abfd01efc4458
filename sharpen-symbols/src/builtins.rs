//! Built-in declarations
//!
//! The foundational classes needed to compile the standard library against
//! itself are constructed directly in a symbol graph, no metadata involved.
//! The same provider can actualize placeholder classes of a module: a class
//! annotated with `sharpen.internal.ActualizeByBuiltin` is dropped and every
//! reference to it is rewritten to the matching built-in.

use crate::graph::{
    CallableSymbol, ClassSymbol, ConstructorSymbol, FunctionSymbol, MemberSymbol, ParameterSymbol,
    PropertySymbol, SymbolGraph, SymbolOrigin, SymbolProvider, TypeParameterSymbol,
};
use crate::Result;
use sharpen_ir::visitor::MutVisitor;
use sharpen_ir::{
    well_known, CallableId, ClassId, ClassKind, FqName, IrConst, IrDeclaration, IrModule,
    Modality, SourceType, TypeArgument, Variance,
};
use tracing::{debug, info, warn};

/// Package of compiler-internal declarations
pub const INTERNAL_PACKAGE: &str = "sharpen.internal";

/// Package built-ins are looked up in when the annotation names none
pub const BUILTINS_PACKAGE: &str = "kotlin";

pub fn actualize_annotation() -> ClassId {
    ClassId::new(INTERNAL_PACKAGE, "ActualizeByBuiltin")
}

const NUMBER_TYPES: &[&str] = &["Byte", "Short", "Int", "Long", "Float", "Double"];
const UNSIGNED_TYPES: &[&str] = &["UByte", "UShort", "UInt", "ULong"];
const ARITHMETIC_OPERATORS: &[&str] = &["plus", "minus", "times", "div", "rem"];
const PRIMITIVE_ARRAYS: &[(&str, &str)] = &[
    ("BooleanArray", "Boolean"),
    ("CharArray", "Char"),
    ("ByteArray", "Byte"),
    ("ShortArray", "Short"),
    ("IntArray", "Int"),
    ("LongArray", "Long"),
    ("FloatArray", "Float"),
    ("DoubleArray", "Double"),
];

/// Hand-built symbol graph of the `kotlin` built-in declarations
#[derive(Debug)]
pub struct BuiltinsProvider {
    graph: SymbolGraph,
}

impl BuiltinsProvider {
    pub fn new() -> Result<Self> {
        let mut builder = Builder::default();
        builder.core()?;
        builder.numbers()?;
        builder.text()?;
        builder.arrays()?;
        builder.collections()?;
        builder.io()?;
        info!(
            "Built {} built-in classes and {} functions",
            builder.graph.class_count(),
            builder.graph.function_count()
        );
        Ok(BuiltinsProvider {
            graph: builder.graph,
        })
    }

    pub fn graph(&self) -> &SymbolGraph {
        &self.graph
    }

    pub fn into_graph(self) -> SymbolGraph {
        self.graph
    }

    /// Replace placeholder classes of `module` by the built-ins they stand for.
    pub fn actualize(&self, module: &mut IrModule) -> ActualizationReport {
        let mut report = ActualizationReport::default();
        let annotation = actualize_annotation();

        for file in &module.files {
            for class in file.classes() {
                let Some(found) = class.annotations.iter().find(|a| a.class == annotation) else {
                    continue;
                };
                let target = match found.arguments.first() {
                    Some(IrConst::String(name)) => ClassId::top_level(name),
                    _ => ClassId::new(BUILTINS_PACKAGE, class.name()),
                };
                if self.graph.contains_class(&target) {
                    debug!("Actualizing {} as built-in {}", class.id, target);
                    report.actualized.push((class.id.clone(), target));
                } else {
                    warn!("No built-in {} for placeholder {}", target, class.id);
                    report.unknown.push(class.id.clone());
                }
            }
        }
        if report.actualized.is_empty() {
            return report;
        }

        for file in &mut module.files {
            file.declarations.retain(|declaration| match declaration {
                IrDeclaration::Class(class) => {
                    !report.actualized.iter().any(|(placeholder, _)| placeholder == &class.id)
                }
                _ => true,
            });
        }
        let mut rewriter = ReferenceRewriter {
            mapping: &report.actualized,
            rewrites: 0,
        };
        rewriter.visit_module(module);
        report.rewritten_references = rewriter.rewrites;
        info!(
            "Actualized {} placeholder classes, {} references rewritten",
            report.actualized.len(),
            report.rewritten_references
        );
        report
    }
}

impl SymbolProvider for BuiltinsProvider {
    fn has_package(&self, package: &FqName) -> bool {
        self.graph.has_package(package)
    }

    fn class_by_id(&self, id: &ClassId) -> Option<&ClassSymbol> {
        self.graph.class_by_id(id)
    }

    fn top_level_callables(&self, package: &FqName, name: &str) -> Vec<CallableSymbol<'_>> {
        self.graph.top_level_callables(package, name)
    }

    fn classes_in_package(&self, package: &FqName) -> Vec<&ClassSymbol> {
        self.graph.classes_in_package(package)
    }

    fn callables_in_package(&self, package: &FqName) -> Vec<CallableSymbol<'_>> {
        self.graph.callables_in_package(package)
    }

    fn members_of(&self, class: &ClassId) -> Vec<MemberSymbol<'_>> {
        self.graph.members_of(class)
    }

    fn functions_by_id(&self, id: &CallableId) -> Vec<&FunctionSymbol> {
        self.graph.functions_by_id(id)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActualizationReport {
    /// Placeholder → built-in
    pub actualized: Vec<(ClassId, ClassId)>,
    /// Placeholders whose built-in does not exist; left untouched
    pub unknown: Vec<ClassId>,
    pub rewritten_references: usize,
}

/// Rewrites placeholder ids, and ids nested under them, to built-in ids.
struct ReferenceRewriter<'a> {
    mapping: &'a [(ClassId, ClassId)],
    rewrites: usize,
}

impl MutVisitor for ReferenceRewriter<'_> {
    fn visit_class_id(&mut self, id: &mut ClassId) {
        for (placeholder, target) in self.mapping {
            if id.package == placeholder.package && id.names.starts_with(&placeholder.names) {
                let mut names = target.names.clone();
                names.extend_from_slice(&id.names[placeholder.names.len()..]);
                *id = ClassId {
                    package: target.package.clone(),
                    names,
                };
                self.rewrites += 1;
                return;
            }
        }
    }
}

fn ty(id: ClassId) -> SourceType {
    SourceType::class(id)
}

fn param(name: &str) -> SourceType {
    SourceType::type_parameter(name)
}

fn kotlin(name: &str) -> ClassId {
    ClassId::new(BUILTINS_PACKAGE, name)
}

#[derive(Default)]
struct Builder {
    graph: SymbolGraph,
}

impl Builder {
    fn class(
        &mut self,
        id: ClassId,
        kind: ClassKind,
        modality: Modality,
        type_parameters: &[(&str, Variance)],
        supertypes: Vec<SourceType>,
    ) -> Result<ClassId> {
        let mut class = ClassSymbol::new(id.clone(), kind, SymbolOrigin::Builtin);
        class.modality = modality;
        class.type_parameters = type_parameters
            .iter()
            .map(|(name, variance)| TypeParameterSymbol::new(name, *variance))
            .collect();
        class.supertypes = supertypes;
        self.graph.add_class(class)?;
        Ok(id)
    }

    fn final_class(&mut self, name: &str, supertypes: Vec<SourceType>) -> Result<ClassId> {
        self.class(kotlin(name), ClassKind::Class, Modality::Final, &[], supertypes)
    }

    fn interface(
        &mut self,
        id: ClassId,
        type_parameters: &[(&str, Variance)],
        supertypes: Vec<SourceType>,
    ) -> Result<ClassId> {
        self.class(id, ClassKind::Interface, Modality::Abstract, type_parameters, supertypes)
    }

    fn function(
        &mut self,
        owner: &ClassId,
        name: &str,
        parameters: &[(&str, SourceType)],
        return_type: SourceType,
    ) -> Result<()> {
        let mut function = FunctionSymbol::new(owner.member(name), return_type);
        function.parameters = parameters
            .iter()
            .map(|(name, ty)| ParameterSymbol::new(name, ty.clone()))
            .collect();
        self.graph.add_function(function)?;
        Ok(())
    }

    fn operator(
        &mut self,
        owner: &ClassId,
        name: &str,
        parameters: &[(&str, SourceType)],
        return_type: SourceType,
    ) -> Result<()> {
        let mut function = FunctionSymbol::new(owner.member(name), return_type);
        function.is_operator = true;
        function.parameters = parameters
            .iter()
            .map(|(name, ty)| ParameterSymbol::new(name, ty.clone()))
            .collect();
        self.graph.add_function(function)?;
        Ok(())
    }

    fn property(
        &mut self,
        owner: &ClassId,
        name: &str,
        ty: SourceType,
        is_var: bool,
    ) -> Result<()> {
        let mut property = PropertySymbol::new(owner.member(name), ty);
        property.is_var = is_var;
        self.graph.add_property(property)?;
        Ok(())
    }

    fn core(&mut self) -> Result<()> {
        let any = self.class(well_known::any(), ClassKind::Class, Modality::Open, &[], vec![])?;
        self.function(&any, "equals", &[("other", SourceType::top())], SourceType::boolean())?;
        self.function(&any, "hashCode", &[], SourceType::int())?;
        self.function(&any, "toString", &[], SourceType::string())?;

        self.final_class("Nothing", vec![])?;
        let any_type = vec![SourceType::any()];
        self.class(well_known::unit(), ClassKind::Object, Modality::Final, &[], any_type)?;
        let annotation = well_known::annotation();
        self.class(annotation, ClassKind::Interface, Modality::Abstract, &[], vec![])?;

        let comparable = self.interface(well_known::comparable(), &[("T", Variance::In)], vec![])?;
        self.operator(&comparable, "compareTo", &[("other", param("T"))], SourceType::int())?;

        let enum_class = self.class(
            well_known::enum_class(),
            ClassKind::Class,
            Modality::Abstract,
            &[("E", Variance::Invariant)],
            vec![SourceType::Class {
                id: well_known::comparable(),
                arguments: vec![TypeArgument::Invariant(param("E"))],
                nullable: false,
            }],
        )?;
        self.property(&enum_class, "name", SourceType::string(), false)?;
        self.property(&enum_class, "ordinal", SourceType::int(), false)?;

        let throwable =
            self.class(well_known::throwable(), ClassKind::Class, Modality::Open, &[], vec![])?;
        self.property(&throwable, "message", SourceType::string().nullable(), false)?;
        self.property(&throwable, "cause", ty(throwable.clone()).nullable(), false)?;
        let message = ParameterSymbol::new("message", SourceType::string().nullable());
        for parameters in [vec![], vec![message]] {
            self.graph.add_constructor(ConstructorSymbol {
                class: throwable.clone(),
                parameters,
                visibility: Default::default(),
            })?;
        }

        let comparable_boolean =
            SourceType::generic(well_known::comparable(), vec![SourceType::boolean()]);
        let boolean = self.final_class("Boolean", vec![comparable_boolean])?;
        self.operator(&boolean, "not", &[], SourceType::boolean())?;
        for name in ["and", "or", "xor"] {
            let other = [("other", SourceType::boolean())];
            self.function(&boolean, name, &other, SourceType::boolean())?;
        }
        Ok(())
    }

    fn numbers(&mut self) -> Result<()> {
        let number = self.class(
            well_known::number(),
            ClassKind::Class,
            Modality::Abstract,
            &[],
            vec![SourceType::any()],
        )?;
        for target in NUMBER_TYPES {
            self.function(&number, &format!("to{}", target), &[], ty(kotlin(target)))?;
        }

        for name in NUMBER_TYPES {
            let self_type = ty(kotlin(name));
            let class = self.final_class(
                name,
                vec![
                    ty(well_known::number()),
                    SourceType::generic(well_known::comparable(), vec![self_type.clone()]),
                ],
            )?;
            // Mixed-width arithmetic widens to the larger operand
            for operand in NUMBER_TYPES {
                let result = wider(name, operand);
                let other = [("other", ty(kotlin(operand)))];
                for operator in ARITHMETIC_OPERATORS {
                    self.operator(&class, operator, &other, ty(kotlin(result)))?;
                }
                self.operator(&class, "compareTo", &other, SourceType::int())?;
            }
            self.operator(&class, "unaryMinus", &[], self_type.clone())?;
            self.operator(&class, "inc", &[], self_type.clone())?;
            self.operator(&class, "dec", &[], self_type.clone())?;
        }

        let int = well_known::int();
        let long = well_known::long();
        self.function(&int, "toUInt", &[], ty(well_known::uint()))?;
        self.function(&long, "toULong", &[], ty(well_known::ulong()))?;

        for name in UNSIGNED_TYPES {
            let self_type = ty(kotlin(name));
            let class = self.final_class(
                name,
                vec![SourceType::generic(well_known::comparable(), vec![self_type.clone()])],
            )?;
            let other = [("other", self_type.clone())];
            for operator in ARITHMETIC_OPERATORS {
                self.operator(&class, operator, &other, self_type.clone())?;
            }
            self.operator(&class, "compareTo", &[("other", self_type.clone())], SourceType::int())?;
            self.function(&class, "toString", &[], SourceType::string())?;
            self.function(&class, "toInt", &[], SourceType::int())?;
            self.function(&class, "toLong", &[], SourceType::long())?;
        }
        Ok(())
    }

    fn text(&mut self) -> Result<()> {
        let char_sequence = self.interface(well_known::char_sequence(), &[], vec![])?;
        self.property(&char_sequence, "length", SourceType::int(), false)?;
        let index = [("index", SourceType::int())];
        self.operator(&char_sequence, "get", &index, ty(well_known::char()))?;

        let comparable_char =
            SourceType::generic(well_known::comparable(), vec![ty(well_known::char())]);
        let char = self.final_class("Char", vec![comparable_char])?;
        let other = [("other", ty(well_known::char()))];
        self.operator(&char, "compareTo", &other, SourceType::int())?;
        self.function(&char, "toInt", &[], SourceType::int())?;

        let string = self.final_class(
            "String",
            vec![
                ty(well_known::char_sequence()),
                SourceType::generic(well_known::comparable(), vec![SourceType::string()]),
            ],
        )?;
        self.operator(&string, "plus", &[("other", SourceType::top())], SourceType::string())?;
        self.operator(&string, "compareTo", &[("other", SourceType::string())], SourceType::int())?;
        self.operator(&string, "get", &[("index", SourceType::int())], ty(well_known::char()))?;
        self.property(&string, "length", SourceType::int(), false)?;
        Ok(())
    }

    fn arrays(&mut self) -> Result<()> {
        let array = self.class(
            well_known::array(),
            ClassKind::Class,
            Modality::Final,
            &[("T", Variance::Invariant)],
            vec![],
        )?;
        self.property(&array, "size", SourceType::int(), false)?;
        self.operator(&array, "get", &[("index", SourceType::int())], param("T"))?;
        let index_value = [("index", SourceType::int()), ("value", param("T"))];
        self.operator(&array, "set", &index_value, SourceType::unit())?;
        self.operator(
            &array,
            "iterator",
            &[],
            SourceType::generic(well_known::iterator(), vec![param("T")]),
        )?;

        for (name, element) in PRIMITIVE_ARRAYS {
            let class = self.final_class(name, vec![])?;
            let element = ty(kotlin(element));
            self.property(&class, "size", SourceType::int(), false)?;
            self.operator(&class, "get", &[("index", SourceType::int())], element.clone())?;
            let index_value = [("index", SourceType::int()), ("value", element)];
            self.operator(&class, "set", &index_value, SourceType::unit())?;
        }
        Ok(())
    }

    fn collections(&mut self) -> Result<()> {
        let iterator = self.interface(well_known::iterator(), &[("T", Variance::Out)], vec![])?;
        self.operator(&iterator, "next", &[], param("T"))?;
        self.operator(&iterator, "hasNext", &[], SourceType::boolean())?;

        let mutable_iterator = self.interface(
            well_known::mutable_iterator(),
            &[("T", Variance::Out)],
            vec![SourceType::generic(well_known::iterator(), vec![param("T")])],
        )?;
        self.function(&mutable_iterator, "remove", &[], SourceType::unit())?;

        let iterable = self.interface(well_known::iterable(), &[("T", Variance::Out)], vec![])?;
        let iterator = SourceType::generic(well_known::iterator(), vec![param("T")]);
        self.operator(&iterable, "iterator", &[], iterator)?;

        let mutable_iterable = self.interface(
            well_known::mutable_iterable(),
            &[("T", Variance::Out)],
            vec![SourceType::generic(well_known::iterable(), vec![param("T")])],
        )?;
        self.operator(
            &mutable_iterable,
            "iterator",
            &[],
            SourceType::generic(well_known::mutable_iterator(), vec![param("T")]),
        )?;

        let collection = self.interface(
            well_known::collection(),
            &[("E", Variance::Out)],
            vec![SourceType::generic(well_known::iterable(), vec![param("E")])],
        )?;
        self.property(&collection, "size", SourceType::int(), false)?;
        self.function(&collection, "isEmpty", &[], SourceType::boolean())?;
        self.operator(&collection, "contains", &[("element", param("E"))], SourceType::boolean())?;

        let mutable_collection = self.interface(
            well_known::mutable_collection(),
            &[("E", Variance::Invariant)],
            vec![
                SourceType::generic(well_known::collection(), vec![param("E")]),
                SourceType::generic(well_known::mutable_iterable(), vec![param("E")]),
            ],
        )?;
        let element = [("element", param("E"))];
        self.function(&mutable_collection, "add", &element, SourceType::boolean())?;
        self.function(&mutable_collection, "remove", &element, SourceType::boolean())?;
        self.function(&mutable_collection, "clear", &[], SourceType::unit())?;

        let list = self.interface(
            well_known::list(),
            &[("E", Variance::Out)],
            vec![SourceType::generic(well_known::collection(), vec![param("E")])],
        )?;
        self.operator(&list, "get", &[("index", SourceType::int())], param("E"))?;
        self.function(&list, "indexOf", &[("element", param("E"))], SourceType::int())?;

        let mutable_list = self.interface(
            well_known::mutable_list(),
            &[("E", Variance::Invariant)],
            vec![
                SourceType::generic(well_known::list(), vec![param("E")]),
                SourceType::generic(well_known::mutable_collection(), vec![param("E")]),
            ],
        )?;
        let index_element = [("index", SourceType::int()), ("element", param("E"))];
        self.operator(&mutable_list, "set", &index_element, param("E"))?;
        self.function(&mutable_list, "removeAt", &[("index", SourceType::int())], param("E"))?;

        self.interface(
            well_known::set(),
            &[("E", Variance::Out)],
            vec![SourceType::generic(well_known::collection(), vec![param("E")])],
        )?;
        self.interface(
            well_known::mutable_set(),
            &[("E", Variance::Invariant)],
            vec![
                SourceType::generic(well_known::set(), vec![param("E")]),
                SourceType::generic(well_known::mutable_collection(), vec![param("E")]),
            ],
        )?;

        let map_parameters = [("K", Variance::Invariant), ("V", Variance::Out)];
        let map = self.interface(well_known::map(), &map_parameters, vec![])?;
        self.property(&map, "size", SourceType::int(), false)?;
        self.operator(&map, "get", &[("key", param("K"))], param("V").nullable())?;
        self.function(&map, "containsKey", &[("key", param("K"))], SourceType::boolean())?;
        let keys = SourceType::generic(well_known::set(), vec![param("K")]);
        self.property(&map, "keys", keys, false)?;
        let values = SourceType::generic(well_known::collection(), vec![param("V")]);
        self.property(&map, "values", values, false)?;

        let entry_parameters = [("K", Variance::Out), ("V", Variance::Out)];
        let entry = self.interface(well_known::map_entry(), &entry_parameters, vec![])?;
        self.property(&entry, "key", param("K"), false)?;
        self.property(&entry, "value", param("V"), false)?;

        let mutable_map = self.interface(
            well_known::mutable_map(),
            &[("K", Variance::Invariant), ("V", Variance::Invariant)],
            vec![SourceType::generic(well_known::map(), vec![param("K"), param("V")])],
        )?;
        let key_value = [("key", param("K")), ("value", param("V"))];
        self.function(&mutable_map, "put", &key_value, param("V").nullable())?;
        self.function(&mutable_map, "remove", &[("key", param("K"))], param("V").nullable())?;
        Ok(())
    }

    /// `kotlin.io` console functions
    fn io(&mut self) -> Result<()> {
        for name in ["println", "print"] {
            let mut function =
                FunctionSymbol::new(CallableId::top_level("kotlin.io", name), SourceType::unit());
            function.parameters = vec![ParameterSymbol::new("message", SourceType::top())];
            self.graph.add_function(function)?;
        }
        Ok(())
    }
}

/// Result type of mixed-width arithmetic
fn wider<'a>(left: &'a str, right: &'a str) -> &'a str {
    let rank = |name: &str| NUMBER_TYPES.iter().position(|n| *n == name).unwrap_or(0);
    // Byte and Short arithmetic happens in Int
    let int_rank = 2;
    let rank = rank(left).max(rank(right)).max(int_rank);
    NUMBER_TYPES[rank]
}
