//! Compiles a small resolved program from JSON through every stage.

use sharpen_compiler::{compile, CompilerConfig, DiagnosticSeverity};
use sharpen_ir::{
    well_known, CallableId, ClassId, ClassKind, IrBody, IrCall, IrClass, IrConstructor,
    IrDeclaration, IrExpression, IrFile, IrFunction, IrModule, IrProperty, IrStatement,
    IrValueParameter, SourceType,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn field(name: &str) -> IrExpression {
    IrExpression::GetField {
        receiver: None,
        field: name.to_string(),
        ty: SourceType::double(),
    }
}

fn rectangle() -> IrClass {
    let id = ClassId::new("app", "Rectangle");
    let mut class = IrClass::new(id.clone(), ClassKind::Class);

    let mut constructor = IrConstructor::new(
        id.clone(),
        vec![
            IrValueParameter::new("height", SourceType::double()),
            IrValueParameter::new("length", SourceType::double()),
        ],
    );
    constructor.is_primary = true;
    constructor.body = Some(IrBody {
        statements: ["height", "length"]
            .into_iter()
            .map(|name| IrStatement::SetField {
                receiver: None,
                field: name.to_string(),
                value: IrExpression::get(name, SourceType::double()),
            })
            .collect(),
    });
    class.declarations.push(IrDeclaration::Constructor(constructor));

    for name in ["height", "length"] {
        class
            .declarations
            .push(IrDeclaration::Property(IrProperty::new(id.member(name), SourceType::double())));
    }

    let sum = IrCall::new(well_known::double().member("plus"), SourceType::double())
        .with_dispatch_receiver(field("height"))
        .with_arguments(vec![field("length")]);
    let doubled = IrCall::new(well_known::double().member("times"), SourceType::double())
        .with_dispatch_receiver(IrExpression::double(2.0))
        .with_arguments(vec![IrExpression::call(sum)]);
    let mut perimeter = IrProperty::new(id.member("perimeter"), SourceType::double());
    perimeter.getter = Some(IrBody {
        statements: vec![IrStatement::Return(Some(IrExpression::call(doubled)))],
    });
    class.declarations.push(IrDeclaration::Property(perimeter));
    class
}

fn main_function() -> IrFunction {
    let rectangle = ClassId::new("app", "Rectangle");
    let rectangle_type = SourceType::class(rectangle.clone());
    let perimeter = IrCall::new(rectangle.member("<get-perimeter>"), SourceType::double())
        .with_dispatch_receiver(IrExpression::get("rectangle", rectangle_type.clone()));
    let println = IrCall::new(CallableId::top_level("kotlin.io", "println"), SourceType::unit())
        .with_arguments(vec![IrExpression::call(perimeter)]);

    IrFunction::new(CallableId::top_level("app", "main"), SourceType::unit()).with_body(vec![
        IrStatement::Variable {
            name: "rectangle".to_string(),
            ty: rectangle_type,
            initializer: Some(IrExpression::ConstructorCall {
                class: rectangle,
                type_arguments: Vec::new(),
                arguments: vec![Some(IrExpression::double(5.0)), Some(IrExpression::double(2.0))],
            }),
            is_var: false,
        },
        IrStatement::Expression(IrExpression::call(println)),
    ])
}

fn write_program(dir: &TempDir) -> PathBuf {
    let mut file = IrFile::new("main.kt", "app");
    file.declarations.push(IrDeclaration::Class(rectangle()));
    file.declarations.push(IrDeclaration::Function(main_function()));
    let mut module = IrModule::new("main");
    module.files.push(file);

    let path = dir.path().join("main.json");
    fs::write(&path, serde_json::to_string_pretty(&module).unwrap()).unwrap();
    path
}

#[test]
fn test_rectangle_program() {
    let dir = TempDir::new().unwrap();
    let config = CompilerConfig {
        inputs: vec![write_program(&dir)],
        destination: dir.path().join("out"),
        ..CompilerConfig::default()
    };

    let result = compile(config).unwrap();
    assert!(!result.has_errors(), "{:?}", result.diagnostics);

    let source = result.file("main.cs").unwrap();
    assert_eq!(source, fs::read_to_string(dir.path().join("out").join("main.cs")).unwrap());
    assert!(source.starts_with("namespace app\n"));
    assert!(source.contains("class Rectangle"));
    assert!(source.contains("public double height { get; }"));
    assert!(source.contains("double perimeter { get"));
    assert!(source.contains("(2.0 * (this.height + this.length))"));
    assert!(source.contains("new app.Rectangle(5.0, 2.0)"));
    assert!(source.contains("System.Console.WriteLine(rectangle.perimeter);"));
    assert!(source.contains("public static void Main(string[] args)"));
    assert!(source.contains("main();"));
    assert_eq!(source.matches("void Main(").count(), 1);
    assert!(!source.contains("UNSUPPORTED"));
}

#[test]
fn test_rectangle_program_with_dumps() {
    let dir = TempDir::new().unwrap();
    let config = CompilerConfig {
        inputs: vec![write_program(&dir)],
        destination: dir.path().join("out"),
        emit_dumps: true,
        ..CompilerConfig::default()
    };

    let result = compile(config).unwrap();
    assert!(!result.has_errors());

    let pre = result.file("main.pre.ir.txt").unwrap();
    let post = result.file("main.post.ir.txt").unwrap();
    assert!(!pre.contains("MainKt"));
    assert!(post.contains("MainKt"));
    assert!(result.file("main.tree.xml").unwrap().starts_with("<Block>"));
    for name in ["main.cs", "main.pre.ir.txt", "main.post.ir.txt", "main.tree.xml"] {
        assert!(dir.path().join("out").join(name).exists(), "{} not written", name);
    }
}

#[test]
fn test_unresolved_program_produces_no_output() {
    let dir = TempDir::new().unwrap();
    let mut module = IrModule::new("main");
    let mut file = IrFile::new("main.kt", "app");
    let main = IrFunction::new(CallableId::top_level("app", "main"), SourceType::unit())
        .with_body(vec![IrStatement::Expression(IrExpression::ConstructorCall {
            class: ClassId::new("Shapes", "Circle"),
            type_arguments: Vec::new(),
            arguments: Vec::new(),
        })]);
    file.declarations.push(IrDeclaration::Function(main));
    module.files.push(file);
    let input = dir.path().join("main.json");
    fs::write(&input, serde_json::to_string(&module).unwrap()).unwrap();

    let config = CompilerConfig {
        inputs: vec![input],
        destination: dir.path().join("out"),
        ..CompilerConfig::default()
    };
    let result = compile(config).unwrap();

    assert!(result.has_errors());
    assert!(result.files.is_empty());
    let errors: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Shapes/Circle"));
}
