#![allow(non_snake_case)]

use super::*;
use crate::model::MarshallerKind;
use crate::test_support::*;
use isobridge_core::{AnnotationValue, TypeDecl, TypeKind};

fn element() -> ElementId {
    ElementId::of_type(&q("CalculatorBridge"))
}

fn nullable() -> AnnotationDecl {
    AnnotationDecl::new("com.acme.Nullable")
}

fn by_reference(target: &str) -> AnnotationDecl {
    AnnotationDecl::new(rt::BY_REFERENCE).with_value("value", AnnotationValue::Str(q(target)))
}

#[test]
fn MarshallerLookup___primitives_and_strings___are_values() {
    let types = TypeCache::new();
    let mut lookup = MarshallerLookup::new(&types, BoundaryKind::ManagedToNative);
    let mut findings = Findings::default();

    for ty in [TypeRef::INT, string(), ty("int[]"), TypeRef::VOID] {
        let marshaller = lookup.lookup(&element(), &ty, &[], &mut findings);
        assert_eq!(marshaller.kind, MarshallerKind::Value, "{ty}");
    }
    assert!(findings.errors.is_empty(), "{:?}", findings.errors);
}

#[test]
fn MarshallerLookup___same_type_and_annotations___share_field() {
    let types = TypeCache::new();
    let mut lookup = MarshallerLookup::new(&types, BoundaryKind::ManagedToNative);
    let mut findings = Findings::default();
    let point = ty("com.acme.Point");

    let first = lookup.lookup(&element(), &point, &[], &mut findings);
    let second = lookup.lookup(&element(), &point, &[], &mut findings);
    let annotated = lookup.lookup(&element(), &point, &[nullable()], &mut findings);

    assert_eq!(first.field_name(), "pointMarshaller");
    assert_eq!(second.field_name(), "pointMarshaller");
    assert_eq!(annotated.field_name(), "pointWithNullableMarshaller");
    assert_eq!(
        lookup.into_marshaller_annotations().into_iter().collect::<Vec<_>>(),
        vec!["com.acme.Nullable".to_string()]
    );
}

#[test]
fn MarshallerLookup___colliding_field_names___get_numeric_suffix() {
    let types = TypeCache::new();
    let mut lookup = MarshallerLookup::new(&types, BoundaryKind::ManagedToNative);
    let mut findings = Findings::default();

    let ours = lookup.lookup(&element(), &ty("com.acme.Point"), &[], &mut findings);
    let theirs = lookup.lookup(&element(), &ty("org.geo.Point"), &[], &mut findings);

    assert_eq!(ours.field_name(), "pointMarshaller");
    assert_eq!(theirs.field_name(), "pointMarshaller1");
}

#[test]
fn MarshallerLookup___known_annotation_without_meta_marker___does_not_select() {
    let types = cache(vec![TypeDecl::new("com.acme.Nullable", TypeKind::Annotation)]);
    let mut lookup = MarshallerLookup::new(&types, BoundaryKind::ManagedToNative);
    let mut findings = Findings::default();

    let marshaller = lookup.lookup(&element(), &ty("com.acme.Point"), &[nullable()], &mut findings);

    assert_eq!(marshaller.field_name(), "pointMarshaller");
    assert!(marshaller.annotations.is_empty());
}

#[test]
fn MarshallerLookup___by_reference_to_reverse_service___crosses_back() {
    let mut handler = TypeDecl::new(q("Handler"), TypeKind::Class);
    handler.annotations.push(service_marker(BoundaryKind::NativeToManaged, "HandlerFactory"));
    let types = cache(vec![handler]);
    let mut lookup = MarshallerLookup::new(&types, BoundaryKind::ManagedToNative);
    let mut findings = Findings::default();

    let marshaller = lookup.lookup(
        &element(),
        &ty("com.acme.Listener[]"),
        &[by_reference("Handler")],
        &mut findings,
    );

    assert!(findings.errors.is_empty(), "{:?}", findings.errors);
    assert_eq!(marshaller.kind, MarshallerKind::Reference);
    assert!(!marshaller.same_direction);
    assert_eq!(marshaller.for_type, ty("com.acme.Listener"));
    assert_eq!(marshaller.reference_type, Some(ty("com.acme.Handler")));
}

#[test]
fn MarshallerLookup___by_reference_to_plain_class___is_rejected() {
    let types = cache(vec![TypeDecl::new(q("Handler"), TypeKind::Class)]);
    let mut lookup = MarshallerLookup::new(&types, BoundaryKind::ProcessToProcess);
    let mut findings = Findings::default();

    lookup.lookup(&element(), &ty("com.acme.Handler"), &[by_reference("Handler")], &mut findings);

    assert_eq!(
        findings.errors[0].2,
        "The `Handler` must be a bridged class annotated by `@GenerateProcessToProcessBridge`."
    );
}

#[test]
fn MarshallerLookup___raw_reference_between_processes___is_rejected() {
    let types = TypeCache::new();
    let mut lookup = MarshallerLookup::new(&types, BoundaryKind::ProcessToProcess);
    let mut findings = Findings::default();

    let marshaller = lookup.lookup(
        &element(),
        &ty("java.lang.Object"),
        &[AnnotationDecl::new(rt::RAW_REFERENCE)],
        &mut findings,
    );

    assert_eq!(marshaller.kind, MarshallerKind::RawReference);
    assert_eq!(findings.errors.len(), 1);
}

#[test]
fn MarshallerLookup___peer_reference_to_foreign_object_in_process___is_rejected() {
    let types = TypeCache::new();
    let mut lookup = MarshallerLookup::new(&types, BoundaryKind::ProcessToProcess);
    let mut findings = Findings::default();

    let marshaller = lookup.lookup(
        &element(),
        &rt::ty(rt::FOREIGN_OBJECT),
        &[AnnotationDecl::new(rt::BY_PEER_REFERENCE)],
        &mut findings,
    );

    assert!(!marshaller.same_direction);
    assert_eq!(
        findings.errors[0].2,
        "A parameter annotated by `ByPeerReference` must have `ProcessPeer` type."
    );
}

#[test]
fn MarshallerLookup___peer_reference_of_own_peer_type___is_same_direction() {
    let types = TypeCache::new();
    let mut lookup = MarshallerLookup::new(&types, BoundaryKind::NativeToNative);
    let mut findings = Findings::default();

    let marshaller = lookup.lookup(
        &element(),
        &rt::ty(rt::NATIVE_PEER),
        &[AnnotationDecl::new(rt::BY_PEER_REFERENCE)],
        &mut findings,
    );

    assert!(marshaller.same_direction);
    assert!(findings.errors.is_empty(), "{:?}", findings.errors);
}

#[test]
fn marshaller_field_name___generic_and_array_types___spell_out_structure() {
    assert_eq!(
        marshaller_field_name(&ty("java.util.List<java.lang.String>"), &[]),
        "listOfStringMarshaller"
    );
    assert_eq!(
        marshaller_field_name(&ty("com.acme.Point[]"), &[nullable()]),
        "pointArrayWithNullableMarshaller"
    );
    assert_eq!(
        marshaller_field_name(&ty("java.util.Map<java.lang.String, ?>"), &[]),
        "mapOfStringObjectMarshaller"
    );
}

#[test]
fn MarshallerLookup___in_and_out_on_custom_value___carry_ranges() {
    let types = TypeCache::new();
    let mut lookup = MarshallerLookup::new(&types, BoundaryKind::ProcessToProcess);
    let mut findings = Findings::default();
    let annotations = [AnnotationDecl::new(rt::IN), AnnotationDecl::new(rt::OUT)];

    let marshaller = lookup.lookup(&element(), &ty("com.acme.Point"), &annotations, &mut findings);

    assert!(findings.errors.is_empty(), "{:?}", findings.errors);
    assert!(marshaller.is_custom());
    assert!(marshaller.is_in() && marshaller.is_out());
    assert_eq!(marshaller.direction_in, Some(DirectionData::default()));
    assert!(
        marshaller.annotations.is_empty(),
        "direction markers must not select a marshaller variant"
    );
}

#[test]
fn MarshallerLookup___out_on_string___is_rejected() {
    let types = TypeCache::new();
    let mut lookup = MarshallerLookup::new(&types, BoundaryKind::ManagedToNative);
    let mut findings = Findings::default();

    let marshaller = lookup.lookup(&element(), &string(), &[AnnotationDecl::new(rt::OUT)], &mut findings);

    assert!(!marshaller.has_direction());
    assert_eq!(
        findings.errors[0].2,
        "The `In` and `Out` annotations are supported only for primitive arrays and values with a custom marshaller."
    );
    assert_eq!(findings.errors[0].1.as_deref(), Some(rt::OUT));
}

#[test]
fn MarshallerLookup___always_by_remote_reference___wraps_listed_type_and_arrays() {
    let mut handle_bridge = TypeDecl::new(q("HandleBridge"), TypeKind::Class);
    handle_bridge
        .annotations
        .push(service_marker(BoundaryKind::NativeToNative, "CalculatorFactory"));
    let types = cache(vec![handle_bridge]);
    let remote = BTreeMap::from([(q("Handle"), ty("com.acme.HandleBridge"))]);
    let mut lookup = MarshallerLookup::new(&types, BoundaryKind::NativeToNative)
        .with_always_by_reference(&BTreeMap::new(), &remote);
    let mut findings = Findings::default();

    let single = lookup.lookup(&element(), &ty("com.acme.Handle"), &[], &mut findings);
    let array = lookup.lookup(&element(), &ty("com.acme.Handle[]"), &[], &mut findings);
    let other = lookup.lookup(&element(), &ty("com.acme.Point"), &[], &mut findings);

    assert!(findings.errors.is_empty(), "{:?}", findings.errors);
    for marshaller in [&single, &array] {
        assert_eq!(marshaller.kind, MarshallerKind::Reference);
        assert!(marshaller.same_direction);
        assert_eq!(marshaller.reference_type, Some(ty("com.acme.HandleBridge")));
        assert_eq!(marshaller.for_type, ty("com.acme.Handle"));
    }
    assert!(other.is_custom());
}

#[test]
fn MarshallerLookup___always_by_local_reference_to_unbridged_class___is_rejected() {
    let types = TypeCache::new();
    let local = BTreeMap::from([(q("Handle"), ty("com.acme.HandleBridge"))]);
    let mut lookup = MarshallerLookup::new(&types, BoundaryKind::ManagedToNative)
        .with_always_by_reference(&local, &BTreeMap::new());
    let mut findings = Findings::default();

    let marshaller = lookup.lookup(&element(), &ty("com.acme.Handle"), &[], &mut findings);

    assert!(!marshaller.same_direction);
    assert_eq!(
        findings.errors[0].2,
        "The `HandleBridge` must be a bridged class annotated by `@GenerateNativeToManagedBridge`."
    );
    assert_eq!(findings.errors[0].1.as_deref(), Some(rt::ALWAYS_BY_LOCAL_REFERENCE));
}
