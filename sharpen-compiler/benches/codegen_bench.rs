use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sharpen_compiler::lowering::{LoweringContext, LoweringPipeline};
use sharpen_compiler::{CodeGenerator, TextRenderer, TypeMapper, XmlRenderer};
use sharpen_ir::{
    well_known, CallableId, ClassId, ClassKind, IrBody, IrCall, IrClass, IrDeclaration,
    IrExpression, IrFile, IrFunction, IrModule, IrProperty, IrStatement, SourceType,
};
use sharpen_symbols::SymbolGraph;

fn shapes_module(classes: usize) -> IrModule {
    let mut file = IrFile::new("shapes.kt", "Shapes");
    for index in 0..classes {
        let id = ClassId::new("Shapes", &format!("Shape{}", index));
        let mut class = IrClass::new(id.clone(), ClassKind::Class);
        for name in ["width", "height"] {
            let property = IrProperty::new(id.member(name), SourceType::double());
            class.declarations.push(IrDeclaration::Property(property));
        }
        let area = IrCall::new(well_known::double().member("times"), SourceType::double())
            .with_dispatch_receiver(IrExpression::GetField {
                receiver: None,
                field: "width".to_string(),
                ty: SourceType::double(),
            })
            .with_arguments(vec![IrExpression::GetField {
                receiver: None,
                field: "height".to_string(),
                ty: SourceType::double(),
            }]);
        let mut property = IrProperty::new(id.member("area"), SourceType::double());
        property.getter = Some(IrBody {
            statements: vec![IrStatement::Return(Some(IrExpression::call(area)))],
        });
        class.declarations.push(IrDeclaration::Property(property));
        file.declarations.push(IrDeclaration::Class(class));
    }

    let greeting = IrExpression::StringConcatenation(vec![
        IrExpression::string("shapes: "),
        IrExpression::int(classes as i32),
    ]);
    let println = IrCall::new(CallableId::top_level("kotlin.io", "println"), SourceType::unit())
        .with_arguments(vec![greeting]);
    file.declarations.push(IrDeclaration::Function(
        IrFunction::new(CallableId::top_level("Shapes", "main"), SourceType::unit())
            .with_body(vec![IrStatement::Expression(IrExpression::call(println))]),
    ));

    let mut module = IrModule::new("bench");
    module.files.push(file);
    module
}

fn lowered(classes: usize, symbols: &SymbolGraph) -> IrModule {
    let mut module = shapes_module(classes);
    let mut context = LoweringContext::new(symbols, &module);
    LoweringPipeline::standard().run(&mut module, &mut context);
    module
}

fn benchmark_lowering(c: &mut Criterion) {
    let symbols = SymbolGraph::new();
    let module = shapes_module(50);

    c.bench_function("lower_50_classes", |b| {
        b.iter(|| {
            let mut module = module.clone();
            let mut context = LoweringContext::new(&symbols, &module);
            LoweringPipeline::standard().run(black_box(&mut module), &mut context)
        })
    });
}

fn benchmark_codegen(c: &mut Criterion) {
    let symbols = SymbolGraph::new();
    let module = lowered(50, &symbols);

    c.bench_function("generate_50_classes", |b| {
        b.iter(|| {
            let generator = CodeGenerator::new(&symbols, TypeMapper::new(), &module);
            generator.generate_module(black_box(&module))
        })
    });
}

fn benchmark_render(c: &mut Criterion) {
    let symbols = SymbolGraph::new();
    let module = lowered(50, &symbols);
    let generator = CodeGenerator::new(&symbols, TypeMapper::new(), &module);
    let files = generator.generate_module(&module);

    c.bench_function("render_text", |b| {
        let renderer = TextRenderer::new();
        b.iter(|| {
            for file in &files {
                black_box(renderer.render(&file.code));
            }
        })
    });

    c.bench_function("render_xml", |b| {
        let renderer = XmlRenderer::new();
        b.iter(|| {
            for file in &files {
                black_box(renderer.render(&file.code));
            }
        })
    });
}

criterion_group!(benches, benchmark_lowering, benchmark_codegen, benchmark_render);
criterion_main!(benches);
