//! Declarations → output tree

use super::code::{Code, UnsupportedShape};
use crate::type_mapper::{TypeMapper, OBJECT, VOID};
use sharpen_ir::{
    ClassId, ClassKind, DelegationKind, IrClass, IrConstructor, IrDeclaration, IrField, IrFile,
    IrFunction, IrModule, IrOrigin, IrProperty, IrStatement, IrTypeParameter, IrValueParameter,
    Modality, SourceType, Variance, Visibility, INIT_NAME,
};
use sharpen_symbols::SymbolProvider;
use std::cell::Cell;
use std::collections::HashMap;
use tracing::debug;

/// Name of the eagerly initialized singleton field on objects
pub const INSTANCE_FIELD: &str = "INSTANCE";

/// What a class id refers to, as far as call dispatch is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dispatch {
    /// Members live as statics on the outer class
    Companion,
    /// Static class: facades, foreign holders and foreign objects
    Static,
    /// Object declared in this module, reached through its instance field
    Singleton,
    Instance,
}

/// Rendering context of a member body
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'s> {
    pub class: Option<&'s ClassId>,
    pub is_static: bool,
}

/// One rendered source file
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub stem: String,
    pub code: Code,
}

pub struct CodeGenerator<'a> {
    pub(crate) symbols: &'a dyn SymbolProvider,
    pub(crate) mapper: TypeMapper,
    declared: HashMap<ClassId, Dispatch>,
    unsupported: Cell<usize>,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(symbols: &'a dyn SymbolProvider, mapper: TypeMapper, module: &IrModule) -> Self {
        let mut declared = HashMap::new();
        for file in &module.files {
            for class in file.classes() {
                collect_dispatch(class, &mut declared);
            }
        }
        CodeGenerator {
            symbols,
            mapper,
            declared,
            unsupported: Cell::new(0),
        }
    }

    /// Number of unsupported-shape markers emitted so far.
    pub fn unsupported_count(&self) -> usize {
        self.unsupported.get()
    }

    pub fn generate_module(&self, module: &IrModule) -> Vec<GeneratedFile> {
        module
            .files
            .iter()
            .map(|file| GeneratedFile {
                stem: file.stem().to_string(),
                code: self.generate_file(file),
            })
            .collect()
    }

    /// Namespace declaration (unless the package is the root) wrapping one
    /// rendering per top-level class.
    pub fn generate_file(&self, file: &IrFile) -> Code {
        let items = file
            .declarations
            .iter()
            .map(|declaration| match declaration {
                IrDeclaration::Class(class) => self.class(class, false),
                other => {
                    let shape = format!("TOP_LEVEL_{}", declaration_kind(other));
                    self.mark(UnsupportedShape::new(shape))
                }
            })
            .collect();
        let body = Code::paragraphs(items);
        if file.package.is_root() {
            body
        } else {
            Code::block(Code::text(format!("namespace {}", file.package)), vec![body])
        }
    }

    pub(crate) fn mark(&self, shape: UnsupportedShape) -> Code {
        debug!("Emitting marker for {}", shape);
        self.unsupported.set(self.unsupported.get() + 1);
        shape.marker()
    }

    pub(crate) fn dispatch(&self, class: &ClassId) -> Dispatch {
        if let Some(dispatch) = self.declared.get(class) {
            return *dispatch;
        }
        match self.symbols.class_by_id(class) {
            Some(symbol) if symbol.is_companion => Dispatch::Companion,
            Some(symbol) if symbol.is_static_holder || symbol.is_object() => Dispatch::Static,
            _ if class.is_companion() => Dispatch::Companion,
            _ => Dispatch::Instance,
        }
    }

    /// Target name of a class used in type position.
    pub(crate) fn class_name(&self, class: &ClassId) -> String {
        self.mapper.map_type(&SourceType::class(class.clone()))
    }

    /// Expression naming the holder of `class`'s static members.
    pub(crate) fn static_qualifier(&self, class: &ClassId) -> String {
        match self.dispatch(class) {
            Dispatch::Companion => match class.outer() {
                Some(outer) => self.class_name(&outer),
                None => self.class_name(class),
            },
            Dispatch::Singleton => format!("{}.{}", self.class_name(class), INSTANCE_FIELD),
            Dispatch::Static | Dispatch::Instance => self.class_name(class),
        }
    }

    fn class(&self, class: &IrClass, nested: bool) -> Code {
        let mut members = Vec::new();
        if class.kind == ClassKind::Object && !class.is_static_holder() {
            members.push(Code::text(format!(
                "public static readonly {name} {field} = new {name}();",
                name = class.name(),
                field = INSTANCE_FIELD
            )));
        }
        if class.kind == ClassKind::Enum {
            if !class.enum_entries.is_empty() {
                members.push(Code::text(class.enum_entries.join(", ")));
            }
            for _ in class.declarations.iter().filter(|d| is_emitted(d) && !is_enum_plumbing(d)) {
                members.push(self.mark(UnsupportedShape::new("ENUM_MEMBER")));
            }
        } else {
            members.extend(self.members(class, false));
        }
        Code::block(self.class_header(class, nested), vec![Code::paragraphs(members)])
    }

    fn class_header(&self, class: &IrClass, nested: bool) -> Code {
        let kind: &[&str] = match class.kind {
            _ if class.is_static_holder() => &["static", "class"],
            ClassKind::Interface => &["interface"],
            ClassKind::Enum => &["enum"],
            ClassKind::Object | ClassKind::Annotation => &["sealed", "class"],
            ClassKind::Class => match class.modality {
                Modality::Final => &["sealed", "class"],
                Modality::Abstract | Modality::Sealed => &["abstract", "class"],
                Modality::Open => &["class"],
            },
        };

        let mut supertypes: Vec<String> = Vec::new();
        if class.kind == ClassKind::Annotation {
            supertypes.push("System.Attribute".to_string());
        }
        if class.kind != ClassKind::Enum {
            for supertype in &class.supertypes {
                let mapped = self.mapper.map_type(supertype);
                if mapped != OBJECT && !supertypes.contains(&mapped) {
                    supertypes.push(mapped);
                }
            }
        }

        let mut declaration = format!(
            "{}{}",
            class.name(),
            self.type_parameters(&class.type_parameters, class.kind == ClassKind::Interface)
        );
        if !supertypes.is_empty() {
            declaration.push_str(" : ");
            declaration.push_str(&supertypes.join(", "));
        }
        declaration.push_str(&self.constraints(&class.type_parameters));

        let mut words = vec![class_visibility(class.visibility, nested)];
        words.extend(kind.iter().copied());
        words.push(declaration.as_str());
        Code::words(words)
    }

    /// Non-synthetic members; companion members are hoisted as statics.
    fn members(&self, class: &IrClass, in_companion: bool) -> Vec<Code> {
        let mut members = Vec::new();
        for declaration in class.declarations.iter().filter(|d| is_emitted(d)) {
            match declaration {
                IrDeclaration::Class(nested) if nested.is_companion => {
                    members.extend(self.members(nested, true));
                }
                IrDeclaration::Class(nested) => members.push(self.class(nested, true)),
                IrDeclaration::Function(function) if function.name() == INIT_NAME => {
                    let body = function.body.as_ref().map(|b| b.statements.as_slice());
                    members.push(self.constructor_like(
                        class,
                        &function.value_parameters,
                        function.visibility,
                        None,
                        body,
                    ));
                }
                IrDeclaration::Function(function) => {
                    members.push(self.function(function, class, in_companion))
                }
                IrDeclaration::Constructor(_) if in_companion => {}
                IrDeclaration::Constructor(constructor) => {
                    members.push(self.constructor(constructor, class))
                }
                IrDeclaration::Property(property) => {
                    members.push(self.property(property, class, in_companion))
                }
                IrDeclaration::Field(field) => members.push(self.field(field, class, in_companion)),
            }
        }
        members
    }

    fn function(&self, function: &IrFunction, owner: &IrClass, in_companion: bool) -> Code {
        let is_static = function.id.is_top_level()
            || in_companion
            || owner.is_static_holder()
            || function.is_static;
        let in_interface = owner.kind == ClassKind::Interface;
        let return_type = self.mapper.map_return_type(&function.return_type);

        let mut parameters = Vec::new();
        if let Some(receiver) = &function.extension_receiver {
            let this = if is_static && owner.is_static_holder() { "this " } else { "" };
            let receiver_type = self.mapper.map_nullable(&receiver.ty);
            parameters.push(format!("{}{} {}", this, receiver_type, receiver.name));
        }
        parameters.extend(function.value_parameters.iter().map(|p| self.parameter(p)));

        let mut words: Vec<&str> = Vec::new();
        if !in_interface {
            words.push(member_visibility(function.visibility));
        }
        if is_static {
            words.push("static");
        } else if !in_interface {
            words.push(member_modality(function.modality));
        }
        let signature = format!(
            "{} {}{}({}){}",
            return_type,
            function.name(),
            self.type_parameters(&function.type_parameters, false),
            parameters.join(", "),
            self.constraints(&function.type_parameters)
        );
        words.push(&signature);
        let header = Code::words(words);

        let scope = Scope {
            class: Some(&owner.id),
            is_static,
        };
        match &function.body {
            Some(body) => Code::block(header, self.statements(&body.statements, scope)),
            None if in_interface || function.modality == Modality::Abstract => {
                Code::statement(header)
            }
            None => Code::block(header, default_body(&return_type, &function.return_type)),
        }
    }

    fn constructor(&self, constructor: &IrConstructor, owner: &IrClass) -> Code {
        let body = constructor.body.as_ref().map(|b| b.statements.as_slice());
        let delegation = constructor.delegation.as_ref().map(|delegation| {
            let keyword = match delegation.kind {
                DelegationKind::This => "this",
                DelegationKind::Super => "base",
            };
            let scope = Scope {
                class: Some(&owner.id),
                is_static: true,
            };
            (keyword, self.arguments(&delegation.arguments, scope))
        });
        self.constructor_like(
            owner,
            &constructor.value_parameters,
            constructor.visibility,
            delegation,
            body,
        )
    }

    fn constructor_like(
        &self,
        owner: &IrClass,
        parameters: &[IrValueParameter],
        visibility: Visibility,
        delegation: Option<(&str, Code)>,
        body: Option<&[IrStatement]>,
    ) -> Code {
        let parameters: Vec<String> = parameters.iter().map(|p| self.parameter(p)).collect();
        let mut header = vec![Code::text(format!(
            "{} {}({})",
            member_visibility(visibility),
            owner.name(),
            parameters.join(", ")
        ))];
        if let Some((keyword, arguments)) = delegation {
            header.push(Code::text(format!(" : {}", keyword)));
            header.push(arguments);
        }
        let scope = Scope {
            class: Some(&owner.id),
            is_static: false,
        };
        let body = body.map(|statements| self.statements(statements, scope)).unwrap_or_default();
        Code::block(Code::inline(header, ""), body)
    }

    fn property(&self, property: &IrProperty, owner: &IrClass, in_companion: bool) -> Code {
        let is_static = property.id.is_top_level()
            || in_companion
            || owner.is_static_holder()
            || property.is_static;
        let in_interface = owner.kind == ClassKind::Interface;
        let ty = self.mapper.map_nullable(&property.ty);
        let scope = Scope {
            class: Some(&owner.id),
            is_static,
        };

        if property.is_const {
            let value = match &property.initializer {
                Some(initializer) => self.nested(initializer, scope),
                None => Code::text(default_value(&ty, &property.ty)),
            };
            return Code::inline(
                vec![
                    Code::text(format!(
                        "{} const {} {} = ",
                        member_visibility(property.visibility),
                        ty,
                        property.id.name
                    )),
                    value,
                    Code::text(";"),
                ],
                "",
            );
        }

        let mut words: Vec<&str> = Vec::new();
        if !in_interface {
            words.push(member_visibility(property.visibility));
        }
        if is_static {
            words.push("static");
        } else if !in_interface {
            words.push(member_modality(property.modality));
        }
        words.push(&ty);
        words.push(&property.id.name);
        let header = Code::words(words);

        match &property.getter {
            None => {
                let mut accessors = vec![Code::text("get;")];
                match &property.setter {
                    Some(setter) => {
                        let body = self.statements(&setter.statements, scope);
                        accessors.push(Code::block(Code::text("set"), body))
                    }
                    None if property.is_var => accessors.push(Code::text("set;")),
                    None => {}
                }
                let mut line = vec![Code::block(header, accessors)];
                if let Some(initializer) = &property.initializer {
                    line.push(Code::text(" = "));
                    line.push(self.nested(initializer, scope));
                    line.push(Code::text(";"));
                }
                Code::inline(line, "")
            }
            Some(getter) => {
                let get =
                    Code::block(Code::text("get"), self.statements(&getter.statements, scope));
                let single_return =
                    matches!(getter.statements.as_slice(), [IrStatement::Return(Some(_))]);
                match &property.setter {
                    None if single_return => Code::inline(vec![Code::block(header, vec![get])], ""),
                    None => Code::block(header, vec![get]),
                    Some(setter) => {
                        let set = self.statements(&setter.statements, scope);
                        Code::block(header, vec![get, Code::block(Code::text("set"), set)])
                    }
                }
            }
        }
    }

    fn field(&self, field: &IrField, owner: &IrClass, in_companion: bool) -> Code {
        let is_static = in_companion || owner.is_static_holder() || field.is_static;
        let ty = self.mapper.map_nullable(&field.ty);
        let mut words = vec![member_visibility(field.visibility)];
        if is_static {
            words.push("static");
        }
        if field.is_final {
            words.push("readonly");
        }
        words.push(&ty);
        words.push(&field.name);

        let mut line = vec![Code::words(words)];
        if let Some(initializer) = &field.initializer {
            let scope = Scope {
                class: Some(&owner.id),
                is_static,
            };
            line.push(Code::text(" = "));
            line.push(self.nested(initializer, scope));
        }
        line.push(Code::text(";"));
        Code::inline(line, "")
    }

    fn parameter(&self, parameter: &IrValueParameter) -> String {
        format!("{} {}", self.mapper.map_parameter(parameter), parameter.name)
    }

    /// `<out T, U>`; variance is kept only where the target allows it.
    fn type_parameters(&self, parameters: &[IrTypeParameter], with_variance: bool) -> String {
        if parameters.is_empty() {
            return String::new();
        }
        let parameters: Vec<String> = parameters
            .iter()
            .map(|parameter| match parameter.variance {
                Variance::Out if with_variance => format!("out {}", parameter.name),
                Variance::In if with_variance => format!("in {}", parameter.name),
                _ => parameter.name.clone(),
            })
            .collect();
        format!("<{}>", parameters.join(", "))
    }

    /// ` where T : Bound` clauses
    fn constraints(&self, parameters: &[IrTypeParameter]) -> String {
        let mut clauses = String::new();
        for parameter in parameters {
            let bounds: Vec<String> = parameter
                .bounds
                .iter()
                .map(|bound| self.mapper.map_type(bound))
                .filter(|bound| bound != OBJECT)
                .collect();
            if !bounds.is_empty() {
                clauses.push_str(&format!(" where {} : {}", parameter.name, bounds.join(", ")));
            }
        }
        clauses
    }
}

fn collect_dispatch(class: &IrClass, declared: &mut HashMap<ClassId, Dispatch>) {
    let dispatch = if class.is_companion {
        Dispatch::Companion
    } else if class.is_static_holder() {
        Dispatch::Static
    } else if class.kind == ClassKind::Object {
        Dispatch::Singleton
    } else {
        Dispatch::Instance
    };
    declared.insert(class.id.clone(), dispatch);
    for nested in class.declarations.iter().filter_map(IrDeclaration::as_class) {
        collect_dispatch(nested, declared);
    }
}

fn is_emitted(declaration: &IrDeclaration) -> bool {
    declaration.origin() != IrOrigin::FakeOverride
}

/// Constructors and synthetic accessors every enum carries
fn is_enum_plumbing(declaration: &IrDeclaration) -> bool {
    match declaration {
        IrDeclaration::Constructor(_) => true,
        IrDeclaration::Function(function) => {
            matches!(function.name(), "values" | "valueOf" | "entries")
        }
        IrDeclaration::Property(property) => property.id.name == "entries",
        _ => false,
    }
}

fn declaration_kind(declaration: &IrDeclaration) -> &'static str {
    match declaration {
        IrDeclaration::Class(_) => "CLASS",
        IrDeclaration::Function(_) => "FUNCTION",
        IrDeclaration::Constructor(_) => "CONSTRUCTOR",
        IrDeclaration::Property(_) => "PROPERTY",
        IrDeclaration::Field(_) => "FIELD",
    }
}

fn class_visibility(visibility: Visibility, nested: bool) -> &'static str {
    match visibility {
        Visibility::Private | Visibility::Local if !nested => "internal",
        other => member_visibility(other),
    }
}

fn member_visibility(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "public",
        Visibility::Protected => "protected",
        Visibility::Internal => "internal",
        Visibility::Private | Visibility::Local => "private",
    }
}

fn member_modality(modality: Modality) -> &'static str {
    match modality {
        Modality::Abstract => "abstract",
        Modality::Open => "virtual",
        Modality::Final | Modality::Sealed => "",
    }
}

/// Value returned by a synthesized body, chosen by the mapped type.
pub fn default_value(mapped: &str, source: &SourceType) -> String {
    match mapped {
        "string" => "\"\"".to_string(),
        "bool" => "false".to_string(),
        "char" => "'\\0'".to_string(),
        "sbyte" | "byte" | "short" | "ushort" | "int" | "uint" | "long" | "ulong" | "float"
        | "double" => "0".to_string(),
        array if array.ends_with("[]") => match array.find('[') {
            Some(index) => format!("new {}[0]{}", &array[..index], &array[index + 2..]),
            None => "null".to_string(),
        },
        _ if matches!(source, SourceType::TypeParameter { nullable: false, .. }) => {
            "default".to_string()
        }
        _ => "null".to_string(),
    }
}

fn default_body(mapped: &str, source: &SourceType) -> Vec<Code> {
    if mapped == VOID {
        return Vec::new();
    }
    vec![Code::statement(Code::text(format!("return {}", default_value(mapped, source))))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::TextRenderer;
    use sharpen_ir::{CallableId, IrCall, IrExpression};
    use sharpen_symbols::SymbolGraph;

    fn render(module: &IrModule) -> String {
        let graph = SymbolGraph::new();
        let generator = CodeGenerator::new(&graph, TypeMapper::new(), module);
        let renderer = TextRenderer::new();
        module
            .files
            .iter()
            .map(|file| renderer.render(&generator.generate_file(file)))
            .collect()
    }

    fn module_with(package: &str, classes: Vec<IrClass>) -> IrModule {
        let mut file = IrFile::new("shapes.kt", package);
        file.declarations = classes.into_iter().map(IrDeclaration::Class).collect();
        let mut module = IrModule::new("main");
        module.files.push(file);
        module
    }

    fn rectangle() -> IrClass {
        let id = ClassId::new("Shapes", "Rectangle");
        let mut class = IrClass::new(id.clone(), ClassKind::Class);
        for name in ["height", "length"] {
            let property = IrProperty::new(id.member(name), SourceType::double());
            class.declarations.push(IrDeclaration::Property(property));
        }
        let plus = sharpen_ir::well_known::double().member("plus");
        let sum = IrCall::new(plus, SourceType::double())
            .with_dispatch_receiver(IrExpression::GetField {
                receiver: None,
                field: "height".to_string(),
                ty: SourceType::double(),
            })
            .with_arguments(vec![IrExpression::GetField {
                receiver: None,
                field: "length".to_string(),
                ty: SourceType::double(),
            }]);
        let mut perimeter = IrProperty::new(id.member("perimeter"), SourceType::double());
        perimeter.getter = Some(sharpen_ir::IrBody {
            statements: vec![IrStatement::Return(Some(IrExpression::Call(sum)))],
        });
        class.declarations.push(IrDeclaration::Property(perimeter));
        class
    }

    #[test]
    fn test_class_in_namespace() {
        let text = render(&module_with("Shapes", vec![rectangle()]));
        assert!(text.starts_with("namespace Shapes\n{\n    public sealed class Rectangle\n"));
        assert!(text.contains("public double height { get; }"));
        assert!(
            text.contains("public double perimeter { get { return (this.height + this.length); } }")
        );
    }

    #[test]
    fn test_root_package_has_no_namespace() {
        let empty = IrClass::new(ClassId::new("", "Empty"), ClassKind::Class);
        let text = render(&module_with("", vec![empty]));
        assert_eq!(text, "public sealed class Empty\n{\n}\n");
    }

    #[test]
    fn test_class_kinds_and_modality() {
        let mut open = IrClass::new(ClassId::new("", "Base"), ClassKind::Class);
        open.modality = Modality::Open;
        let mut shape = IrClass::new(ClassId::new("", "Shape"), ClassKind::Interface);
        shape.type_parameters.push(IrTypeParameter {
            name: "T".to_string(),
            variance: Variance::Out,
            bounds: Vec::new(),
        });
        let mut color = IrClass::new(ClassId::new("", "Color"), ClassKind::Enum);
        color.enum_entries = vec!["RED".to_string(), "GREEN".to_string()];
        let mut marker = IrClass::new(ClassId::new("", "Marker"), ClassKind::Annotation);
        marker.visibility = Visibility::Private;

        let text = render(&module_with("", vec![open, shape, color, marker]));
        assert!(text.contains("public class Base\n"));
        assert!(text.contains("public interface Shape<out T>\n"));
        assert!(text.contains("public enum Color\n{\n    RED, GREEN\n}"));
        assert!(text.contains("internal sealed class Marker : System.Attribute\n"));
    }

    #[test]
    fn test_object_gets_instance_field() {
        let id = ClassId::new("", "Registry");
        let mut registry = IrClass::new(id.clone(), ClassKind::Object);
        let mut count = IrFunction::new(id.member("count"), SourceType::int());
        count.is_external = true;
        registry.declarations.push(IrDeclaration::Function(count));

        let text = render(&module_with("", vec![registry]));
        assert!(text.contains("public static readonly Registry INSTANCE = new Registry();"));
        assert!(text.contains("public int count()\n    {\n        return 0;\n    }"));
    }

    #[test]
    fn test_companion_members_are_static_on_outer() {
        let outer_id = ClassId::new("", "Rectangle");
        let mut outer = IrClass::new(outer_id.clone(), ClassKind::Class);
        let mut companion = IrClass::new(outer_id.companion(), ClassKind::Object);
        companion.is_companion = true;
        let square_id = outer_id.companion().member("square");
        let square = IrFunction::new(square_id, SourceType::class(outer_id.clone()))
            .with_body(vec![IrStatement::Return(Some(IrExpression::ConstructorCall {
                class: outer_id.clone(),
                type_arguments: Vec::new(),
                arguments: Vec::new(),
            }))]);
        companion.declarations.push(IrDeclaration::Function(square));
        outer.declarations.push(IrDeclaration::Class(companion));

        let text = render(&module_with("", vec![outer]));
        assert!(text.contains("public static Rectangle square()"));
        assert!(text.contains("return new Rectangle();"));
        assert!(!text.contains("class Companion"));
        assert!(!text.contains("INSTANCE"));
    }

    #[test]
    fn test_fake_overrides_are_skipped() {
        let id = ClassId::new("", "Square");
        let mut class = IrClass::new(id.clone(), ClassKind::Class);
        let mut inherited = IrFunction::new(id.member("hashCode"), SourceType::int());
        inherited.origin = IrOrigin::FakeOverride;
        class.declarations.push(IrDeclaration::Function(inherited));
        assert!(!render(&module_with("", vec![class])).contains("hashCode"));
    }

    #[test]
    fn test_abstract_and_interface_members_have_no_body() {
        let id = ClassId::new("", "Shape");
        let mut shape = IrClass::new(id.clone(), ClassKind::Interface);
        let area = IrFunction::new(id.member("area"), SourceType::double());
        shape.declarations.push(IrDeclaration::Function(area));
        let text = render(&module_with("", vec![shape]));
        assert!(text.contains("    double area();\n"));
    }

    #[test]
    fn test_constructor_delegation() {
        let id = ClassId::new("", "Rectangle");
        let mut class = IrClass::new(id.clone(), ClassKind::Class);
        let mut constructor = IrConstructor::new(id.clone(), Vec::new());
        constructor.delegation = Some(sharpen_ir::IrDelegatingCall {
            kind: DelegationKind::This,
            arguments: vec![Some(IrExpression::double(1.0)), Some(IrExpression::double(2.0))],
        });
        class.declarations.push(IrDeclaration::Constructor(constructor));
        let text = render(&module_with("", vec![class]));
        assert!(text.contains("public Rectangle() : this(1.0, 2.0)\n    {\n    }"));
    }

    #[test]
    fn test_top_level_declarations_are_marked() {
        let mut file = IrFile::new("main.kt", "");
        file.declarations.push(IrDeclaration::Function(IrFunction::new(
            CallableId::top_level("", "main"),
            SourceType::unit(),
        )));
        let mut module = IrModule::new("main");
        module.files.push(file);
        assert_eq!(render(&module), "/* UNSUPPORTED: TOP_LEVEL_FUNCTION */\n");
    }

    #[test]
    fn test_default_values() {
        let int = SourceType::int();
        assert_eq!(default_value("string", &SourceType::string()), "\"\"");
        assert_eq!(default_value("bool", &SourceType::boolean()), "false");
        assert_eq!(default_value("int", &int), "0");
        assert_eq!(default_value("int[]", &int), "new int[0]");
        assert_eq!(default_value("int[][]", &int), "new int[0][]");
        assert_eq!(default_value("T", &SourceType::type_parameter("T")), "default");
        assert_eq!(default_value("Shapes.Rectangle", &int), "null");
    }
}
