#![allow(non_snake_case)]

use super::*;
use crate::test_support::*;
use isobridge_core::{AnnotationValue, ConstructorDecl, MethodDecl, Modifier, TypeKind};

const M2N: BoundaryKind = BoundaryKind::ManagedToNative;
const P2P: BoundaryKind = BoundaryKind::ProcessToProcess;

fn resolve_in(round: &[TypeDecl], kind: BoundaryKind) -> (Option<FactoryDefinition>, Vec<String>) {
    let types = cache(round.to_vec());
    let mut findings = Findings::default();
    let definition = resolve(&types, find(round, "CalculatorFactory"), kind, &mut findings);
    let messages = findings.errors.into_iter().map(|(_, _, m)| m).collect();
    (definition, messages)
}

fn with_attribute(round: &mut [TypeDecl], key: &str, value: AnnotationValue) {
    let marker = &mut round[2].annotations[0];
    marker.values.insert(key.to_string(), value);
}

fn process_service(simple: &str, factory: &str) -> TypeDecl {
    let mut decl = TypeDecl::new(q(simple), TypeKind::Class);
    decl.annotations.push(service_marker(P2P, factory));
    decl
}

#[test]
fn resolve___calculator_factory___resolves() {
    let round = calculator_round(&[M2N]);

    let (factory, messages) = resolve_in(&round, M2N);

    assert!(messages.is_empty(), "{messages:?}");
    let factory = factory.unwrap();
    assert_eq!(factory.initial_service, ty("com.acme.CalculatorBridge"));
    assert!(factory.implementation.is_none());
    assert!(factory.services.is_empty());
}

#[test]
fn resolve___implementation_with_default_constructor___uses_constructor() {
    let mut round = calculator_round(&[M2N]);
    with_attribute(&mut round, "implementation", AnnotationValue::Str(q("CalculatorImpl")));

    let (factory, messages) = resolve_in(&round, M2N);

    assert!(messages.is_empty(), "{messages:?}");
    assert_eq!(
        factory.unwrap().implementation,
        Some(Implementation {
            ty: ty("com.acme.CalculatorImpl"),
            access: ImplementationAccess::Constructor,
        })
    );
}

#[test]
fn resolve___implementation_with_private_constructor___uses_static_accessor() {
    let mut round = calculator_round(&[M2N]);
    with_attribute(&mut round, "implementation", AnnotationValue::Str(q("CalculatorImpl")));
    let implementation = &mut round[3];
    implementation.constructors = vec![ConstructorDecl {
        modifiers: vec![Modifier::Private],
        params: Vec::new(),
    }];
    let mut instance = MethodDecl::new("instance");
    instance.modifiers = vec![Modifier::Static];
    instance.return_type = ty("com.acme.CalculatorImpl");
    implementation.methods.push(instance);

    let (factory, _) = resolve_in(&round, M2N);

    assert_eq!(
        factory.unwrap().implementation.unwrap().access,
        ImplementationAccess::StaticAccessor("instance".into())
    );
}

#[test]
fn resolve___static_accessor_returning_other_type___is_skipped() {
    let mut round = calculator_round(&[M2N]);
    with_attribute(&mut round, "implementation", AnnotationValue::Str(q("CalculatorImpl")));
    let implementation = &mut round[3];
    implementation.constructors = vec![ConstructorDecl {
        modifiers: vec![Modifier::Private],
        params: Vec::new(),
    }];
    let mut count = MethodDecl::new("count");
    count.modifiers = vec![Modifier::Static];
    count.return_type = TypeRef::INT;
    implementation.methods.push(count);
    let mut instance = MethodDecl::new("instance");
    instance.modifiers = vec![Modifier::Static];
    instance.return_type = ty("com.acme.CalculatorImpl");
    implementation.methods.push(instance);

    let (factory, messages) = resolve_in(&round, M2N);

    assert!(messages.is_empty(), "{messages:?}");
    assert_eq!(
        factory.unwrap().implementation.unwrap().access,
        ImplementationAccess::StaticAccessor("instance".into())
    );
}

#[test]
fn resolve___only_accessor_returns_unrelated_type___is_rejected() {
    let mut round = calculator_round(&[M2N]);
    with_attribute(&mut round, "implementation", AnnotationValue::Str(q("CalculatorImpl")));
    let implementation = &mut round[3];
    implementation.constructors = vec![ConstructorDecl {
        modifiers: vec![Modifier::Private],
        params: Vec::new(),
    }];
    let mut count = MethodDecl::new("count");
    count.modifiers = vec![Modifier::Static];
    count.return_type = TypeRef::INT;
    implementation.methods.push(count);

    let (_, messages) = resolve_in(&round, M2N);

    assert_eq!(
        messages,
        vec![
            "The implementation `CalculatorImpl` must have a non-private no-argument constructor or a non-private static no-argument method returning an instance."
        ]
    );
}

#[test]
fn resolve___implementation_not_assignable___is_rejected() {
    let mut round = calculator_round(&[M2N]);
    with_attribute(&mut round, "implementation", AnnotationValue::Str(q("Point")));

    let (_, messages) = resolve_in(&round, M2N);

    assert_eq!(
        messages,
        vec![
            "The class specified in `@GenerateManagedToNativeFactory.implementation` for `CalculatorFactory` registration must be assignable to `Calculator`."
        ]
    );
}

#[test]
fn resolve___initial_service_without_marker___is_rejected() {
    let mut round = calculator_round(&[M2N]);
    round[1].annotations.clear();

    let (_, messages) = resolve_in(&round, M2N);

    assert_eq!(
        messages,
        vec![
            "Missing required annotation: Initial service `CalculatorBridge` must be annotated with `@GenerateManagedToNativeBridge`.\n\
             To resolve this, add `@GenerateManagedToNativeBridge` to `CalculatorBridge`."
        ]
    );
}

#[test]
fn resolve___partner_service_marker___serves_as_initial_service() {
    let mut round = calculator_round(&[M2N]);
    round[1] = calculator_bridge(&[BoundaryKind::NativeToNative]);

    let (_, messages) = resolve_in(&round, M2N);

    assert!(messages.is_empty(), "{messages:?}");
}

#[test]
fn resolve___missing_marshallers___reported() {
    let mut round = calculator_round(&[M2N]);
    round[2].annotations[0].values.remove("marshallers");

    let (factory, messages) = resolve_in(&round, M2N);

    assert!(factory.is_none());
    assert_eq!(
        messages,
        vec!["Missing required attribute `marshallers` of `@GenerateManagedToNativeFactory`."]
    );
}

#[test]
fn resolve___process_services___initial_service_prepended() {
    let mut round = calculator_round(&[P2P]);
    round.push(process_service("Storage", "CalculatorFactory"));
    with_attribute(
        &mut round,
        "services",
        AnnotationValue::List(vec![AnnotationValue::Str(q("Storage"))]),
    );

    let (factory, messages) = resolve_in(&round, P2P);

    assert!(messages.is_empty(), "{messages:?}");
    assert_eq!(
        factory.unwrap().services,
        vec![ty("com.acme.CalculatorBridge"), ty("com.acme.Storage")]
    );
}

#[test]
fn resolve___process_services_duplicate_or_foreign___are_rejected() {
    let mut round = calculator_round(&[P2P]);
    round.push(process_service("Storage", "OtherFactory"));
    with_attribute(
        &mut round,
        "services",
        AnnotationValue::List(vec![
            AnnotationValue::Str(q("CalculatorBridge")),
            AnnotationValue::Str(q("CalculatorBridge")),
            AnnotationValue::Str(q("Storage")),
        ]),
    );

    let (_, messages) = resolve_in(&round, P2P);

    assert_eq!(
        messages,
        vec![
            "Duplicate service `CalculatorBridge` in `services`.",
            "The service `Storage` must name `CalculatorFactory` as its factory.",
        ]
    );
}

#[test]
fn resolve___services_on_native_factory___are_rejected() {
    let mut round = calculator_round(&[M2N]);
    with_attribute(
        &mut round,
        "services",
        AnnotationValue::List(vec![AnnotationValue::Str(q("CalculatorBridge"))]),
    );

    let (_, messages) = resolve_in(&round, M2N);

    assert_eq!(
        messages,
        vec!["The `services` attribute is supported only by `@GenerateProcessToProcessFactory`."]
    );
}
