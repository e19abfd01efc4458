//! Zero-argument constructor synthesis
//!
//! A concrete class whose only accessible constructor takes parameters that
//! all have default values gets a parameterless constructor delegating to it
//! with those defaults. Defaults that read another parameter cannot be
//! evaluated outside the constructor, so such classes are left alone.

use super::{FileLoweringPass, LoweringContext};
use sharpen_ir::visitor::{walk_expression, MutVisitor};
use sharpen_ir::{
    ClassKind, DelegationKind, IrClass, IrConstructor, IrDeclaration, IrDelegatingCall,
    IrExpression, IrFile, IrOrigin, IrValueParameter, Modality,
};
use std::collections::HashSet;
use tracing::debug;

pub struct DefaultConstructorSynthesis;

fn is_candidate(class: &IrClass) -> bool {
    class.kind == ClassKind::Class
        && !matches!(class.modality, Modality::Abstract | Modality::Sealed)
        && !class.is_local
        && !class.is_value
        && !class.is_expect
        && !class.is_static_holder()
}

struct ParameterReads<'a> {
    names: &'a HashSet<&'a str>,
    found: bool,
}

impl MutVisitor for ParameterReads<'_> {
    fn visit_expression(&mut self, expression: &mut IrExpression) {
        if let IrExpression::GetValue { name, .. } = expression {
            self.found |= self.names.contains(name.as_str());
        }
        walk_expression(self, expression);
    }
}

fn reads_parameters(parameters: &[IrValueParameter]) -> bool {
    let names: HashSet<&str> = parameters.iter().map(|p| p.name.as_str()).collect();
    let mut reads = ParameterReads {
        names: &names,
        found: false,
    };
    for default in parameters.iter().filter_map(|p| p.default_value.as_ref()) {
        reads.visit_expression(&mut default.clone());
    }
    reads.found
}

/// The parameterless constructor to add to `class`, if it needs one.
pub fn default_constructor(class: &IrClass) -> Option<IrConstructor> {
    if !is_candidate(class) || class.constructors().any(|c| c.value_parameters.is_empty()) {
        return None;
    }
    let mut accessible = class.constructors().filter(|c| c.visibility.is_accessible());
    let target = accessible.next()?;
    if accessible.next().is_some() {
        return None;
    }
    let arguments = target
        .value_parameters
        .iter()
        .map(|parameter| parameter.default_value.clone().map(Some))
        .collect::<Option<Vec<_>>>()?;
    if reads_parameters(&target.value_parameters) {
        debug!("Defaults of {} read other parameters", class.id);
        return None;
    }

    let mut constructor = IrConstructor::new(class.id.clone(), Vec::new());
    constructor.delegation = Some(IrDelegatingCall {
        kind: DelegationKind::This,
        arguments,
    });
    constructor.visibility = target.visibility;
    constructor.origin = IrOrigin::DefaultConstructor;
    Some(constructor)
}

fn synthesize(class: &mut IrClass) -> usize {
    let mut added = 0;
    for declaration in &mut class.declarations {
        if let IrDeclaration::Class(nested) = declaration {
            added += synthesize(nested);
        }
    }
    if let Some(constructor) = default_constructor(class) {
        debug!("Synthesized default constructor for {}", class.id);
        class.declarations.push(IrDeclaration::Constructor(constructor));
        added += 1;
    }
    added
}

impl FileLoweringPass for DefaultConstructorSynthesis {
    fn name(&self) -> &'static str {
        "default-constructor-synthesis"
    }

    fn lower(&mut self, file: &mut IrFile, _context: &LoweringContext<'_>) -> usize {
        file.declarations
            .iter_mut()
            .filter_map(IrDeclaration::as_class_mut)
            .map(synthesize)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpen_ir::{well_known, ClassId, IrCall, IrModule, SourceType, Visibility};
    use sharpen_symbols::SymbolGraph;

    fn rectangle(parameters: Vec<IrValueParameter>) -> IrClass {
        let id = ClassId::new("Shapes", "Rectangle");
        let mut class = IrClass::new(id.clone(), ClassKind::Class);
        let mut primary = IrConstructor::new(id, parameters);
        primary.is_primary = true;
        class.declarations.push(IrDeclaration::Constructor(primary));
        class
    }

    fn defaulted() -> Vec<IrValueParameter> {
        vec![
            IrValueParameter::new("height", SourceType::double())
                .with_default(IrExpression::double(1.0)),
            IrValueParameter::new("length", SourceType::double())
                .with_default(IrExpression::double(2.0)),
        ]
    }

    fn lower(class: IrClass) -> IrClass {
        let mut file = IrFile::new("shapes.kt", "Shapes");
        file.declarations.push(IrDeclaration::Class(class));
        let graph = SymbolGraph::new();
        let module = IrModule::new("main");
        let context = LoweringContext::new(&graph, &module);
        DefaultConstructorSynthesis.lower(&mut file, &context);
        match file.declarations.remove(0) {
            IrDeclaration::Class(class) => class,
            other => panic!("unexpected declaration {:?}", other),
        }
    }

    #[test]
    fn test_adds_exactly_one_delegating_constructor() {
        let class = lower(rectangle(defaulted()));
        let constructors: Vec<_> = class.constructors().collect();
        assert_eq!(constructors.len(), 2);

        let synthesized = constructors[1];
        assert!(synthesized.value_parameters.is_empty());
        assert_eq!(synthesized.origin, IrOrigin::DefaultConstructor);
        let delegation = synthesized.delegation.as_ref().unwrap();
        assert_eq!(delegation.kind, DelegationKind::This);
        assert_eq!(
            delegation.arguments,
            vec![Some(IrExpression::double(1.0)), Some(IrExpression::double(2.0))]
        );
    }

    #[test]
    fn test_existing_zero_argument_constructor_is_kept_alone() {
        let mut class = rectangle(defaulted());
        class
            .declarations
            .push(IrDeclaration::Constructor(IrConstructor::new(class.id.clone(), Vec::new())));
        let class = lower(class);
        assert_eq!(class.constructors().filter(|c| c.value_parameters.is_empty()).count(), 1);
    }

    #[test]
    fn test_missing_default_is_skipped() {
        let mut parameters = defaulted();
        parameters.push(IrValueParameter::new("depth", SourceType::double()));
        let class = lower(rectangle(parameters));
        assert_eq!(class.constructors().count(), 1);
    }

    #[test]
    fn test_default_reading_another_parameter_is_skipped() {
        let mut parameters = defaulted();
        parameters[1].default_value = Some(IrExpression::get("height", SourceType::double()));
        assert!(default_constructor(&rectangle(parameters)).is_none());

        let doubled = IrCall::new(well_known::double().member("times"), SourceType::double())
            .with_dispatch_receiver(IrExpression::get("height", SourceType::double()))
            .with_arguments(vec![IrExpression::double(2.0)]);
        let mut parameters = defaulted();
        parameters[1].default_value = Some(IrExpression::call(doubled));
        let class = lower(rectangle(parameters));
        assert_eq!(class.constructors().count(), 1);

        let mut parameters = defaulted();
        parameters[1].default_value = Some(IrExpression::get("scale", SourceType::double()));
        assert!(default_constructor(&rectangle(parameters)).is_some());
    }

    #[test]
    fn test_ineligible_classes() {
        let mut sealed = rectangle(defaulted());
        sealed.modality = Modality::Sealed;
        assert!(default_constructor(&sealed).is_none());

        let mut value = rectangle(defaulted());
        value.is_value = true;
        assert!(default_constructor(&value).is_none());

        let mut two = rectangle(defaulted());
        two.declarations
            .push(IrDeclaration::Constructor(IrConstructor::new(two.id.clone(), defaulted())));
        assert!(default_constructor(&two).is_none());

        let mut private_second = rectangle(defaulted());
        let mut hidden = IrConstructor::new(private_second.id.clone(), defaulted());
        hidden.visibility = Visibility::Private;
        private_second.declarations.push(IrDeclaration::Constructor(hidden));
        assert!(default_constructor(&private_second).is_some());
    }

    #[test]
    fn test_nested_classes_are_visited() {
        let mut outer = IrClass::new(ClassId::new("Shapes", "Outer"), ClassKind::Class);
        let mut inner = rectangle(defaulted());
        inner.id = outer.id.nested("Rectangle");
        outer.declarations.push(IrDeclaration::Class(inner));
        let outer = lower(outer);
        let inner = outer.declarations[0].as_class().unwrap();
        assert_eq!(inner.constructors().count(), 2);
    }
}
