//! Lowered intermediate representation
//!
//! The frontend hands over one `IrModule` per compiled module. Ownership is
//! a strict tree (module → files → declarations → bodies → expressions);
//! anything that refers to another declaration does so through a `ClassId`
//! or `CallableId`.

use crate::decl::{ClassKind, Modality, Variance, Visibility};
use crate::ids::{CallableId, ClassId, FqName};
use crate::types::{well_known, SourceType};
use serde::{Deserialize, Serialize};

/// A compiled module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrModule {
    pub name: String,
    #[serde(default)]
    pub files: Vec<IrFile>,
}

impl IrModule {
    pub fn new(name: impl Into<String>) -> Self {
        IrModule {
            name: name.into(),
            files: Vec::new(),
        }
    }

    /// Ids of every class declared anywhere in this module, nested ones included.
    pub fn declared_class_ids(&self) -> Vec<ClassId> {
        let mut ids = Vec::new();
        for file in &self.files {
            for declaration in &file.declarations {
                collect_class_ids(declaration, &mut ids);
            }
        }
        ids
    }

    pub fn find_class(&self, id: &ClassId) -> Option<&IrClass> {
        self.files
            .iter()
            .flat_map(|file| file.declarations.iter())
            .find_map(|declaration| find_class_in(declaration, id))
    }
}

fn collect_class_ids(declaration: &IrDeclaration, ids: &mut Vec<ClassId>) {
    if let IrDeclaration::Class(class) = declaration {
        ids.push(class.id.clone());
        for member in &class.declarations {
            collect_class_ids(member, ids);
        }
    }
}

fn find_class_in<'a>(declaration: &'a IrDeclaration, id: &ClassId) -> Option<&'a IrClass> {
    match declaration {
        IrDeclaration::Class(class) if &class.id == id => Some(class),
        IrDeclaration::Class(class) => class
            .declarations
            .iter()
            .find_map(|member| find_class_in(member, id)),
        _ => None,
    }
}

/// A source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrFile {
    /// File name as written, e.g. `main.kt`
    pub name: String,
    #[serde(default)]
    pub package: FqName,
    #[serde(default)]
    pub declarations: Vec<IrDeclaration>,
}

impl IrFile {
    pub fn new(name: impl Into<String>, package: &str) -> Self {
        IrFile {
            name: name.into(),
            package: FqName::new(package),
            declarations: Vec::new(),
        }
    }

    /// File name without directories and extension.
    pub fn stem(&self) -> &str {
        let base = self.name.rsplit(['/', '\\']).next().unwrap_or(&self.name);
        match base.split_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => base,
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &IrClass> {
        self.declarations.iter().filter_map(IrDeclaration::as_class)
    }
}

/// Where a declaration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IrOrigin {
    #[default]
    Defined,
    /// Inherited member copied into a subclass; never emitted
    FakeOverride,
    /// Holder class for a file's top-level declarations
    FileFacade,
    /// Holder class for declarations whose container lives in another module
    ExternalFacade,
    EntryPoint,
    DefaultConstructor,
}

impl IrOrigin {
    pub fn is_facade(self) -> bool {
        matches!(self, IrOrigin::FileFacade | IrOrigin::ExternalFacade)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrDeclaration {
    Class(IrClass),
    Function(IrFunction),
    Constructor(IrConstructor),
    Property(IrProperty),
    Field(IrField),
}

impl IrDeclaration {
    pub fn name(&self) -> &str {
        match self {
            IrDeclaration::Class(class) => class.id.short_name(),
            IrDeclaration::Function(function) => &function.id.name,
            IrDeclaration::Constructor(_) => INIT_NAME,
            IrDeclaration::Property(property) => &property.id.name,
            IrDeclaration::Field(field) => &field.name,
        }
    }

    pub fn origin(&self) -> IrOrigin {
        match self {
            IrDeclaration::Class(class) => class.origin,
            IrDeclaration::Function(function) => function.origin,
            IrDeclaration::Constructor(constructor) => constructor.origin,
            IrDeclaration::Property(property) => property.origin,
            IrDeclaration::Field(field) => field.origin,
        }
    }

    pub fn is_expect(&self) -> bool {
        match self {
            IrDeclaration::Class(class) => class.is_expect,
            IrDeclaration::Function(function) => function.is_expect,
            IrDeclaration::Property(property) => property.is_expect,
            IrDeclaration::Constructor(_) | IrDeclaration::Field(_) => false,
        }
    }

    pub fn as_class(&self) -> Option<&IrClass> {
        match self {
            IrDeclaration::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut IrClass> {
        match self {
            IrDeclaration::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&IrFunction> {
        match self {
            IrDeclaration::Function(function) => Some(function),
            _ => None,
        }
    }
}

/// Reserved name of constructors
pub const INIT_NAME: &str = "<init>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrAnnotation {
    pub class: ClassId,
    #[serde(default)]
    pub arguments: Vec<IrConst>,
}

impl IrAnnotation {
    pub fn new(class: ClassId) -> Self {
        IrAnnotation {
            class,
            arguments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrTypeParameter {
    pub name: String,
    #[serde(default)]
    pub variance: Variance,
    #[serde(default)]
    pub bounds: Vec<SourceType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrClass {
    pub id: ClassId,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub modality: Modality,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_local: bool,
    /// Value (inline) class
    #[serde(default)]
    pub is_value: bool,
    #[serde(default)]
    pub is_expect: bool,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub is_companion: bool,
    #[serde(default)]
    pub type_parameters: Vec<IrTypeParameter>,
    #[serde(default)]
    pub supertypes: Vec<SourceType>,
    #[serde(default)]
    pub annotations: Vec<IrAnnotation>,
    #[serde(default)]
    pub enum_entries: Vec<String>,
    #[serde(default)]
    pub declarations: Vec<IrDeclaration>,
    #[serde(default)]
    pub origin: IrOrigin,
}

impl IrClass {
    pub fn new(id: ClassId, kind: ClassKind) -> Self {
        IrClass {
            id,
            kind,
            modality: Modality::Final,
            visibility: Visibility::Public,
            is_local: false,
            is_value: false,
            is_expect: false,
            is_external: false,
            is_companion: false,
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            annotations: Vec::new(),
            enum_entries: Vec::new(),
            declarations: Vec::new(),
            origin: IrOrigin::Defined,
        }
    }

    pub fn name(&self) -> &str {
        self.id.short_name()
    }

    pub fn has_annotation(&self, class: &ClassId) -> bool {
        self.annotations.iter().any(|a| &a.class == class)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &IrConstructor> {
        self.declarations.iter().filter_map(|d| match d {
            IrDeclaration::Constructor(constructor) => Some(constructor),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &IrFunction> {
        self.declarations.iter().filter_map(IrDeclaration::as_function)
    }

    pub fn companion(&self) -> Option<&IrClass> {
        self.declarations
            .iter()
            .filter_map(IrDeclaration::as_class)
            .find(|class| class.is_companion)
    }

    /// Emitted as a static class: facades and their members are all static.
    pub fn is_static_holder(&self) -> bool {
        self.origin.is_facade()
    }

    pub fn this_type(&self) -> SourceType {
        SourceType::generic(
            self.id.clone(),
            self.type_parameters
                .iter()
                .map(|p| SourceType::type_parameter(&p.name))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrValueParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SourceType,
    #[serde(default)]
    pub default_value: Option<IrExpression>,
    /// `ty` is the element type when set
    #[serde(default)]
    pub is_vararg: bool,
}

impl IrValueParameter {
    pub fn new(name: &str, ty: SourceType) -> Self {
        IrValueParameter {
            name: name.to_string(),
            ty,
            default_value: None,
            is_vararg: false,
        }
    }

    pub fn with_default(mut self, value: IrExpression) -> Self {
        self.default_value = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrFunction {
    pub id: CallableId,
    #[serde(default)]
    pub type_parameters: Vec<IrTypeParameter>,
    #[serde(default)]
    pub extension_receiver: Option<IrValueParameter>,
    #[serde(default)]
    pub value_parameters: Vec<IrValueParameter>,
    pub return_type: SourceType,
    #[serde(default)]
    pub body: Option<IrBody>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modality: Modality,
    #[serde(default)]
    pub is_expect: bool,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub is_operator: bool,
    #[serde(default)]
    pub annotations: Vec<IrAnnotation>,
    #[serde(default)]
    pub origin: IrOrigin,
}

impl IrFunction {
    pub fn new(id: CallableId, return_type: SourceType) -> Self {
        IrFunction {
            id,
            type_parameters: Vec::new(),
            extension_receiver: None,
            value_parameters: Vec::new(),
            return_type,
            body: None,
            is_static: false,
            visibility: Visibility::Public,
            modality: Modality::Final,
            is_expect: false,
            is_external: false,
            is_operator: false,
            annotations: Vec::new(),
            origin: IrOrigin::Defined,
        }
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn with_body(mut self, statements: Vec<IrStatement>) -> Self {
        self.body = Some(IrBody { statements });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelegationKind {
    This,
    Super,
}

/// `: this(...)` / `: base(...)` call at the start of a constructor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrDelegatingCall {
    pub kind: DelegationKind,
    #[serde(default)]
    pub arguments: Vec<Option<IrExpression>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrConstructor {
    pub class: ClassId,
    #[serde(default)]
    pub value_parameters: Vec<IrValueParameter>,
    #[serde(default)]
    pub delegation: Option<IrDelegatingCall>,
    #[serde(default)]
    pub body: Option<IrBody>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub origin: IrOrigin,
}

impl IrConstructor {
    pub fn new(class: ClassId, value_parameters: Vec<IrValueParameter>) -> Self {
        IrConstructor {
            class,
            value_parameters,
            delegation: None,
            body: None,
            is_primary: false,
            visibility: Visibility::Public,
            origin: IrOrigin::Defined,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrProperty {
    pub id: CallableId,
    #[serde(rename = "type")]
    pub ty: SourceType,
    #[serde(default)]
    pub is_var: bool,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_static: bool,
    /// Computed getter; `None` means a stored (auto) property
    #[serde(default)]
    pub getter: Option<IrBody>,
    #[serde(default)]
    pub setter: Option<IrBody>,
    #[serde(default)]
    pub initializer: Option<IrExpression>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modality: Modality,
    #[serde(default)]
    pub is_expect: bool,
    #[serde(default)]
    pub origin: IrOrigin,
}

impl IrProperty {
    pub fn new(id: CallableId, ty: SourceType) -> Self {
        IrProperty {
            id,
            ty,
            is_var: false,
            is_const: false,
            is_static: false,
            getter: None,
            setter: None,
            initializer: None,
            visibility: Visibility::Public,
            modality: Modality::Final,
            is_expect: false,
            origin: IrOrigin::Defined,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SourceType,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub initializer: Option<IrExpression>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub origin: IrOrigin,
}

impl IrField {
    pub fn new(name: &str, ty: SourceType) -> Self {
        IrField {
            name: name.to_string(),
            ty,
            is_static: false,
            is_final: true,
            initializer: None,
            visibility: Visibility::Public,
            origin: IrOrigin::Defined,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IrBody {
    #[serde(default)]
    pub statements: Vec<IrStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrStatement {
    Expression(IrExpression),
    Variable {
        name: String,
        #[serde(rename = "type")]
        ty: SourceType,
        #[serde(default)]
        initializer: Option<IrExpression>,
        #[serde(default)]
        is_var: bool,
    },
    SetValue {
        name: String,
        value: IrExpression,
    },
    /// Receiver `None` means the implicit `this`
    SetField {
        #[serde(default)]
        receiver: Option<IrExpression>,
        field: String,
        value: IrExpression,
    },
    Return(Option<IrExpression>),
    If {
        condition: IrExpression,
        #[serde(default)]
        then_branch: Vec<IrStatement>,
        #[serde(default)]
        else_branch: Vec<IrStatement>,
    },
    While {
        condition: IrExpression,
        #[serde(default)]
        body: Vec<IrStatement>,
    },
    Throw(IrExpression),
}

/// Constant values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrConst {
    Null,
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    UInt(u32),
    ULong(u64),
    String(String),
}

impl IrConst {
    pub fn ty(&self) -> SourceType {
        match self {
            IrConst::Null => SourceType::class(well_known::nothing()).nullable(),
            IrConst::Boolean(_) => SourceType::boolean(),
            IrConst::Char(_) => SourceType::class(well_known::char()),
            IrConst::Byte(_) => SourceType::class(well_known::byte()),
            IrConst::Short(_) => SourceType::class(well_known::short()),
            IrConst::Int(_) => SourceType::int(),
            IrConst::Long(_) => SourceType::long(),
            IrConst::Float(_) => SourceType::class(well_known::float()),
            IrConst::Double(_) => SourceType::double(),
            IrConst::UInt(_) => SourceType::class(well_known::uint()),
            IrConst::ULong(_) => SourceType::class(well_known::ulong()),
            IrConst::String(_) => SourceType::string(),
        }
    }

    /// Text used when the constant is spliced into a string template.
    pub fn template_text(&self) -> String {
        match self {
            IrConst::Null => "null".to_string(),
            IrConst::Boolean(b) => b.to_string(),
            IrConst::Char(c) => c.to_string(),
            IrConst::Byte(n) => n.to_string(),
            IrConst::Short(n) => n.to_string(),
            IrConst::Int(n) => n.to_string(),
            IrConst::Long(n) => n.to_string(),
            IrConst::Float(n) => floating_text(&format!("{:e}", n)),
            IrConst::Double(n) => floating_text(&format!("{:e}", n)),
            IrConst::UInt(n) => n.to_string(),
            IrConst::ULong(n) => n.to_string(),
            IrConst::String(s) => s.clone(),
        }
    }
}

/// Renders the shortest round-trip digits of a float the way the JVM prints
/// it: plain decimal with at least one fraction digit for magnitudes in
/// `[1e-3, 1e7)`, `d.dddE<exp>` otherwise.
fn floating_text(scientific: &str) -> String {
    let (sign, unsigned) = match scientific.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", scientific),
    };
    let Some((mantissa, exponent)) = unsigned.split_once('e') else {
        return match unsigned {
            "inf" => format!("{}Infinity", sign),
            _ => "NaN".to_string(),
        };
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    if digits.bytes().all(|b| b == b'0') {
        return format!("{}0.0", sign);
    }

    let text = if (-3..7).contains(&exponent) {
        if exponent < 0 {
            format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
        } else {
            let point = exponent as usize + 1;
            let padded = format!("{:0<width$}", digits, width = point);
            let (whole, fraction) = padded.split_at(point);
            format!("{}.{}", whole, if fraction.is_empty() { "0" } else { fraction })
        }
    } else {
        let (first, rest) = digits.split_at(1);
        format!("{}.{}E{}", first, if rest.is_empty() { "0" } else { rest }, exponent)
    };
    format!("{}{}", sign, text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeOperator {
    Is,
    NotIs,
    Cast,
    SafeCast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrCall {
    pub callee: CallableId,
    #[serde(default)]
    pub dispatch_receiver: Option<Box<IrExpression>>,
    #[serde(default)]
    pub extension_receiver: Option<Box<IrExpression>>,
    /// `None` entries use the parameter's default value
    #[serde(default)]
    pub arguments: Vec<Option<IrExpression>>,
    #[serde(default)]
    pub type_arguments: Vec<SourceType>,
    #[serde(rename = "type")]
    pub ty: SourceType,
}

impl IrCall {
    pub fn new(callee: CallableId, ty: SourceType) -> Self {
        IrCall {
            callee,
            dispatch_receiver: None,
            extension_receiver: None,
            arguments: Vec::new(),
            type_arguments: Vec::new(),
            ty,
        }
    }

    pub fn with_dispatch_receiver(mut self, receiver: IrExpression) -> Self {
        self.dispatch_receiver = Some(Box::new(receiver));
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<IrExpression>) -> Self {
        self.arguments = arguments.into_iter().map(Some).collect();
        self
    }

    /// Receivers followed by arguments, in evaluation order.
    pub fn operands(&self) -> Vec<Option<&IrExpression>> {
        let mut operands = Vec::new();
        if let Some(receiver) = &self.dispatch_receiver {
            operands.push(Some(receiver.as_ref()));
        }
        if let Some(receiver) = &self.extension_receiver {
            operands.push(Some(receiver.as_ref()));
        }
        operands.extend(self.arguments.iter().map(Option::as_ref));
        operands
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrBranch {
    pub condition: IrExpression,
    pub result: IrExpression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrExpression {
    Const(IrConst),
    GetValue {
        name: String,
        #[serde(rename = "type")]
        ty: SourceType,
    },
    This {
        #[serde(rename = "type")]
        ty: SourceType,
    },
    /// Receiver `None` means the implicit `this`
    GetField {
        #[serde(default)]
        receiver: Option<Box<IrExpression>>,
        field: String,
        #[serde(rename = "type")]
        ty: SourceType,
    },
    GetObject {
        class: ClassId,
    },
    Call(IrCall),
    ConstructorCall {
        class: ClassId,
        #[serde(default)]
        type_arguments: Vec<SourceType>,
        #[serde(default)]
        arguments: Vec<Option<IrExpression>>,
    },
    StringConcatenation(Vec<IrExpression>),
    TypeOperator {
        operator: TypeOperator,
        operand: Box<IrExpression>,
        #[serde(rename = "type")]
        ty: SourceType,
    },
    /// Branches are tried in order; an `else` branch has a `true` condition
    When {
        branches: Vec<IrBranch>,
        #[serde(rename = "type")]
        ty: SourceType,
    },
    Block {
        statements: Vec<IrStatement>,
        #[serde(rename = "type")]
        ty: SourceType,
    },
    /// A node the frontend produced that has no lowered counterpart
    Unsupported {
        kind: String,
    },
}

impl IrExpression {
    pub fn int(value: i32) -> Self {
        IrExpression::Const(IrConst::Int(value))
    }

    pub fn double(value: f64) -> Self {
        IrExpression::Const(IrConst::Double(value))
    }

    pub fn string(value: &str) -> Self {
        IrExpression::Const(IrConst::String(value.to_string()))
    }

    pub fn boolean(value: bool) -> Self {
        IrExpression::Const(IrConst::Boolean(value))
    }

    pub fn get(name: &str, ty: SourceType) -> Self {
        IrExpression::GetValue {
            name: name.to_string(),
            ty,
        }
    }

    pub fn call(call: IrCall) -> Self {
        IrExpression::Call(call)
    }

    pub fn as_const(&self) -> Option<&IrConst> {
        match self {
            IrExpression::Const(value) => Some(value),
            _ => None,
        }
    }

    /// Node kind name, used in dumps and unsupported-node markers.
    pub fn kind_name(&self) -> &str {
        match self {
            IrExpression::Const(_) => "CONST",
            IrExpression::GetValue { .. } => "GET_VALUE",
            IrExpression::This { .. } => "THIS",
            IrExpression::GetField { .. } => "GET_FIELD",
            IrExpression::GetObject { .. } => "GET_OBJECT",
            IrExpression::Call(_) => "CALL",
            IrExpression::ConstructorCall { .. } => "CONSTRUCTOR_CALL",
            IrExpression::StringConcatenation(_) => "STRING_CONCATENATION",
            IrExpression::TypeOperator { .. } => "TYPE_OP",
            IrExpression::When { .. } => "WHEN",
            IrExpression::Block { .. } => "BLOCK",
            IrExpression::Unsupported { kind } => kind,
        }
    }

    pub fn ty(&self) -> SourceType {
        match self {
            IrExpression::Const(value) => value.ty(),
            IrExpression::GetValue { ty, .. }
            | IrExpression::This { ty }
            | IrExpression::GetField { ty, .. }
            | IrExpression::When { ty, .. }
            | IrExpression::Block { ty, .. } => ty.clone(),
            IrExpression::GetObject { class } => SourceType::class(class.clone()),
            IrExpression::Call(call) => call.ty.clone(),
            IrExpression::ConstructorCall {
                class,
                type_arguments,
                ..
            } => SourceType::generic(class.clone(), type_arguments.clone()),
            IrExpression::StringConcatenation(_) => SourceType::string(),
            IrExpression::TypeOperator { operator, ty, .. } => match operator {
                TypeOperator::Is | TypeOperator::NotIs => SourceType::boolean(),
                TypeOperator::Cast => ty.clone(),
                TypeOperator::SafeCast => ty.clone().nullable(),
            },
            IrExpression::Unsupported { .. } => SourceType::top(),
        }
    }
}
