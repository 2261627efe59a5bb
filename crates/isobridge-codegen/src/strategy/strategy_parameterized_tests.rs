#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

fn reference(same_direction: bool) -> MarshallerData {
    let target = TypeRef::declared("com.acme.Handle");
    MarshallerData::reference(target.clone(), target, same_direction)
}

fn custom() -> MarshallerData {
    MarshallerData::custom(TypeRef::declared("com.acme.Point"), "pointMarshaller", Vec::new())
}

fn ty(text: &str) -> TypeRef {
    text.parse().unwrap()
}

#[test_case(MarshallerData::value(TypeRef::INT), "int", "int" ; "primitive value")]
#[test_case(MarshallerData::value(ty("int[]")), "int[]", "int[]" ; "primitive array value")]
#[test_case(reference(true), "com.acme.Handle", "long" ; "same direction reference")]
#[test_case(reference(true), "com.acme.Handle[]", "long[]" ; "same direction reference array")]
#[test_case(reference(false), "com.acme.Handle", "com.acme.Handle" ; "reverse reference")]
#[test_case(MarshallerData::peer_reference(ty("org.isobridge.runtime.NativePeer"), true), "org.isobridge.runtime.NativePeer", "long" ; "same direction peer")]
#[test_case(MarshallerData::peer_reference(ty("com.acme.OtherPeer"), false), "com.acme.OtherPeer", "org.isobridge.runtime.ForeignObject" ; "foreign peer")]
#[test_case(MarshallerData::raw_reference(), "java.lang.Object", "java.lang.Object" ; "raw reference")]
#[test_case(custom(), "com.acme.Point", "byte[]" ; "custom")]
fn MarshallingStrategy___entry_type___managed_to_native(m: MarshallerData, logical: &str, expected: &str) {
    let strategy = MarshallingStrategy::new(BoundaryKind::ManagedToNative);

    assert_eq!(strategy.entry_type(&m, &ty(logical)), ty(expected));
}

#[test_case(MarshallerData::value(TypeRef::INT), "int", "int" ; "primitive value")]
#[test_case(MarshallerData::value(ty("int[]")), "int[]", "org.isobridge.runtime.jni.JIntArray" ; "primitive array value")]
#[test_case(MarshallerData::value(ty("java.lang.Class<?>")), "java.lang.Class<?>", "org.isobridge.runtime.jni.JClass" ; "class value")]
#[test_case(reference(true), "com.acme.Handle[]", "org.isobridge.runtime.jni.JLongArray" ; "same direction reference array")]
#[test_case(reference(false), "com.acme.Handle", "org.isobridge.runtime.jni.JObject" ; "reverse reference")]
#[test_case(MarshallerData::raw_reference(), "java.lang.Object", "org.isobridge.runtime.jni.JObject" ; "raw reference")]
#[test_case(custom(), "com.acme.Point", "org.isobridge.runtime.jni.JByteArray" ; "custom")]
fn MarshallingStrategy___end_type___managed_to_native_substitutes_jni(
    m: MarshallerData,
    logical: &str,
    expected: &str,
) {
    let strategy = MarshallingStrategy::new(BoundaryKind::ManagedToNative);

    assert_eq!(strategy.end_type(&m, &ty(logical)), ty(expected));
}

#[test_case(reference(false), "com.acme.Handle", "long" ; "reverse reference travels as handle")]
#[test_case(reference(false), "com.acme.Handle[]", "org.isobridge.runtime.jni.JLongArray" ; "reverse reference array travels as handles")]
#[test_case(MarshallerData::value(ty("java.lang.String")), "java.lang.String", "org.isobridge.runtime.jni.JString" ; "string value")]
fn MarshallingStrategy___entry_type___native_to_managed(m: MarshallerData, logical: &str, expected: &str) {
    let strategy = MarshallingStrategy::new(BoundaryKind::NativeToManaged);

    assert_eq!(strategy.entry_type(&m, &ty(logical)), ty(expected));
}

#[test_case(BoundaryKind::ManagedToNative, MarshallerData::value(ty("java.lang.String")), "java.lang.String", true ; "managed to native batches strings")]
#[test_case(BoundaryKind::ManagedToNative, MarshallerData::value(ty("int[]")), "int[]", false ; "managed to native keeps arrays inline")]
#[test_case(BoundaryKind::NativeToManaged, MarshallerData::value(ty("java.lang.String")), "java.lang.String", false ; "native to managed keeps strings inline")]
#[test_case(BoundaryKind::NativeToManaged, custom(), "com.acme.Point", true ; "custom is always batched")]
#[test_case(BoundaryKind::NativeToNative, MarshallerData::value(ty("int[]")), "int[]", true ; "native to native batches arrays")]
#[test_case(BoundaryKind::NativeToNative, reference(true), "com.acme.Handle", false ; "native to native keeps handles inline")]
#[test_case(BoundaryKind::NativeToNative, reference(true), "com.acme.Handle[]", true ; "native to native batches handle arrays")]
#[test_case(BoundaryKind::ProcessToProcess, MarshallerData::value(TypeRef::INT), "int", true ; "process batches everything")]
fn MarshallingStrategy___is_batched___per_kind(
    kind: BoundaryKind,
    m: MarshallerData,
    logical: &str,
    expected: bool,
) {
    let strategy = MarshallingStrategy::new(kind);

    assert_eq!(strategy.is_batched(&m, &ty(logical)), expected);
}

#[test_case(BoundaryKind::ManagedToNative ; "managed to native")]
#[test_case(BoundaryKind::NativeToManaged ; "native to managed")]
#[test_case(BoundaryKind::NativeToNative ; "native to native")]
#[test_case(BoundaryKind::ProcessToProcess ; "process to process")]
fn MarshallingStrategy___end_type___is_platform_form_of_crossing_type(kind: BoundaryKind) {
    let strategy = MarshallingStrategy::new(kind);
    let cases = [
        (MarshallerData::value(TypeRef::INT), ty("int")),
        (MarshallerData::value(ty("java.lang.String")), ty("java.lang.String")),
        (reference(true), ty("com.acme.Handle")),
        (custom(), ty("com.acme.Point")),
    ];

    for (m, logical) in cases {
        let entry = if kind.has_entry_point() {
            strategy.entry_type(&m, &logical)
        } else {
            strategy.crossing_type(&m, &logical)
        };
        let end = strategy.end_type(&m, &logical);
        let unify = |t: TypeRef| {
            if rt::is_jni_type(&t) {
                t
            } else {
                rt::jni_type(&t).unwrap_or(t)
            }
        };
        assert_eq!(unify(entry), unify(end), "{kind} {logical}");
    }
}
