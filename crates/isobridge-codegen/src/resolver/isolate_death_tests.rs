#![allow(non_snake_case)]

use super::*;
use crate::test_support::*;
use isobridge_core::{AnnotationDecl, AnnotationValue, Modifier, ParamDecl, TypeDecl, TypeKind};

fn handler_method(receiver: &str, throws: &[&str]) -> MethodDecl {
    let mut method = MethodDecl::new(HANDLER_METHOD);
    method.modifiers = vec![Modifier::Static];
    method.params = vec![
        ParamDecl::new("receiver", ty(receiver)),
        ParamDecl::new("exception", rt::ty(rt::ISOLATE_DEATH_EXCEPTION)),
    ];
    method.throws = throws.iter().map(|t| ty(t)).collect();
    method
}

fn annotated_bridge() -> TypeDecl {
    let mut bridge = TypeDecl::new(q("Bridge"), TypeKind::Class);
    bridge.annotations.push(
        AnnotationDecl::new(rt::ISOLATE_DEATH_HANDLER)
            .with_value("value", AnnotationValue::Str(q("DeathHandler"))),
    );
    bridge
}

fn resolve_with(handler_methods: Vec<MethodDecl>, extra: Vec<TypeDecl>) -> (Option<IsolateDeathHandler>, Findings) {
    let mut handler = TypeDecl::new(q("DeathHandler"), TypeKind::Class);
    handler.methods = handler_methods;
    let mut decls = vec![annotated_bridge(), handler];
    decls.extend(extra);
    let types = cache(decls);
    let bridge = types.get(&q("Bridge")).unwrap();
    let mut findings = Findings::default();
    let resolved = resolve(&types, &bridge.name, bridge, &bridge.element_id(), &mut findings);
    (resolved, findings)
}

#[test]
fn resolve___object_receiver___keeps_only_checked_exceptions() {
    let mut unchecked = TypeDecl::new("java.lang.IllegalStateException", TypeKind::Class);
    unchecked.superclass = Some(ty("java.lang.RuntimeException"));
    let method = handler_method(
        "java.lang.Object",
        &["java.io.IOException", "java.lang.IllegalStateException"],
    );

    let (resolved, findings) = resolve_with(vec![method], vec![unchecked]);

    assert!(findings.errors.is_empty(), "{:?}", findings.errors);
    assert_eq!(
        resolved,
        Some(IsolateDeathHandler {
            ty: ty("com.acme.DeathHandler"),
            checked_exceptions: vec![ty("java.io.IOException")],
        })
    );
}

#[test]
fn resolve___instance_method___is_rejected() {
    let mut method = handler_method("java.lang.Object", &[]);
    method.modifiers.clear();

    let (resolved, findings) = resolve_with(vec![method], Vec::new());

    assert!(resolved.is_none());
    assert!(findings.errors[0].2.starts_with(
        "The class specified in the `@IsolateDeathHandler` annotation must declare an accessible static void method named `handleIsolateDeath`."
    ));
    assert!(findings.errors[0].2.ends_with(
        "static void handleIsolateDeath(Object receiver, IsolateDeathException exception)"
    ));
}

#[test]
fn resolve___receiver_of_unrelated_type___is_rejected() {
    let (resolved, findings) = resolve_with(vec![handler_method("com.acme.Other", &[])], Vec::new());

    assert!(resolved.is_none());
    assert_eq!(findings.errors.len(), 1);
}

#[test]
fn resolve___without_annotation___is_none() {
    let types = cache(vec![TypeDecl::new(q("Plain"), TypeKind::Class)]);
    let plain = types.get(&q("Plain")).unwrap();
    let mut findings = Findings::default();

    assert!(resolve(&types, &plain.name, plain, &plain.element_id(), &mut findings).is_none());
    assert!(findings.errors.is_empty());
}
