#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test_case("boolean", Primitive::Boolean)]
#[test_case("byte", Primitive::Byte)]
#[test_case("char", Primitive::Char)]
#[test_case("short", Primitive::Short)]
#[test_case("int", Primitive::Int)]
#[test_case("long", Primitive::Long)]
#[test_case("float", Primitive::Float)]
#[test_case("double", Primitive::Double)]
fn TypeRef___parse_primitive___returns_primitive(input: &str, expected: Primitive) {
    let ty: TypeRef = input.parse().unwrap();

    assert_eq!(ty, TypeRef::Primitive(expected));
    assert_eq!(ty.to_string(), input);
}

#[test_case("void")]
#[test_case("java.lang.String")]
#[test_case("int[]")]
#[test_case("java.util.List<java.lang.String>")]
#[test_case("java.util.Map<java.lang.String, java.util.List<com.acme.Point[]>>")]
#[test_case("org.isobridge.runtime.BinaryOutput.ByteArrayBinaryOutput")]
fn TypeRef___display___reproduces_canonical_input(input: &str) {
    let ty: TypeRef = input.parse().unwrap();

    assert_eq!(ty.to_string(), input);
}

#[test_case("java.util.List < java.lang.String >", "java.util.List<java.lang.String>")]
#[test_case("java.util.Map<java.lang.String,int>", "java.util.Map<java.lang.String, int>")]
#[test_case(" int [ ] ", "int[]")]
fn TypeRef___parse_with_whitespace___normalizes(input: &str, expected: &str) {
    let ty: TypeRef = input.parse().unwrap();

    assert_eq!(ty.to_string(), expected);
}

#[test_case("")]
#[test_case("int<java.lang.String>")]
#[test_case("java.util.List<>")]
#[test_case("int[")]
#[test_case(".com.acme.Point")]
fn TypeRef___parse_malformed___returns_error(input: &str) {
    assert!(input.parse::<TypeRef>().is_err());
}

#[test_case("com.acme.Point", "com.acme", "Point")]
#[test_case("java.lang.String", "java.lang", "String")]
#[test_case("com.acme.Outer.Inner", "com.acme", "Inner")]
#[test_case("Point", "", "Point")]
fn names___split___package_and_simple_name(qualified: &str, package: &str, simple: &str) {
    assert_eq!(names::package_of(qualified), package);
    assert_eq!(names::simple_name_of(qualified), simple);
}
