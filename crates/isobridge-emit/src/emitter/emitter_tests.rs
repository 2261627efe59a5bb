#![allow(non_snake_case)]

use super::*;
use isobridge_core::{Round, TypeKind};

fn cache(types: Vec<TypeDecl>) -> TypeCache {
    TypeCache::from_round(&Round { types })
}

fn interface(name: &str, interfaces: &[&str]) -> TypeDecl {
    let mut decl = TypeDecl::new(name, TypeKind::Interface);
    decl.interfaces = interfaces.iter().map(|i| TypeRef::declared(*i)).collect();
    decl
}

fn ty(text: &str) -> TypeRef {
    text.parse().unwrap()
}

#[test]
fn SourceEmitter___java_lang_and_same_package___need_no_import() {
    let types = TypeCache::new();
    let mut emitter = SourceEmitter::new(&types, "com.acme");

    assert_eq!(emitter.render_type(&ty("java.lang.String")), "String");
    assert_eq!(emitter.render_type(&ty("com.acme.Calculator")), "Calculator");
    assert!(emitter.imports().is_empty());
}

#[test]
fn SourceEmitter___foreign_type___is_imported_once() {
    let types = TypeCache::new();
    let mut emitter = SourceEmitter::new(&types, "com.acme");

    emitter.render_type(&ty("org.isobridge.runtime.NativePeer"));
    emitter.render_type(&ty("org.isobridge.runtime.NativePeer[]"));

    assert_eq!(emitter.imports(), vec!["org.isobridge.runtime.NativePeer"]);
}

#[test]
fn SourceEmitter___second_type_with_same_simple_name___is_qualified() {
    let types = TypeCache::new();
    let mut emitter = SourceEmitter::new(&types, "com.acme");

    let first = emitter.render_type(&ty("java.util.List<java.lang.String>"));
    let second = emitter.render_type(&ty("java.awt.List"));

    assert_eq!(first, "List<String>");
    assert_eq!(second, "java.awt.List");
    assert_eq!(emitter.imports(), vec!["java.util.List"]);
}

#[test]
fn SourceEmitter___java_lang_shadowed_by_same_package_type___is_qualified() {
    let types = cache(vec![TypeDecl::new("com.acme.String", TypeKind::Class)]);
    let mut emitter = SourceEmitter::new(&types, "com.acme");

    assert_eq!(emitter.render_type(&ty("java.lang.String")), "java.lang.String");
    assert_eq!(emitter.render_type(&ty("com.acme.String")), "String");
}

#[test]
fn SourceEmitter___reserved_name___forces_qualification_of_other_type() {
    let types = TypeCache::new();
    let mut emitter = SourceEmitter::new(&types, "com.acme");
    assert!(emitter.reserve("CalculatorGen", "com.acme.CalculatorGen"));

    assert_eq!(
        emitter.render_type(&ty("org.other.CalculatorGen")),
        "org.other.CalculatorGen"
    );
    assert!(!emitter.reserve("CalculatorGen", "org.other.CalculatorGen"));
}

#[test]
fn SourceEmitter___inherited_member_type___written_by_simple_name() {
    let types = cache(vec![
        interface("com.acme.Service", &["com.acme.Base"]),
        interface("com.acme.Base", &[]),
        TypeDecl::new("com.acme.Base.Point", TypeKind::Class),
    ]);
    let mut emitter = SourceEmitter::new(&types, "com.acme");
    emitter.class_start("final", "Impl", None, &[ty("com.acme.Service")]);

    assert_eq!(emitter.render_type(&ty("com.acme.Base.Point")), "Point");
}

#[test]
fn SourceEmitter___type_hidden_by_inherited_member___is_qualified() {
    let types = cache(vec![
        interface("com.acme.Service", &[]),
        TypeDecl::new("com.acme.Service.Point", TypeKind::Class),
    ]);
    let mut emitter = SourceEmitter::new(&types, "com.acme");
    emitter.class_start("", "Impl", None, &[ty("com.acme.Service")]);

    assert_eq!(
        emitter.render_type(&ty("org.geo.Point")),
        "org.geo.Point"
    );
    emitter.class_end();
    assert_eq!(emitter.render_type(&ty("org.geo.Point")), "Point");
}

#[test]
fn SourceEmitter___member_type___reached_through_enclosing_type() {
    let types = TypeCache::new();
    let mut emitter = SourceEmitter::new(&types, "com.acme");

    let rendered =
        emitter.render_type(&ty("org.isobridge.runtime.BinaryOutput.CCharPointerBinaryOutput"));

    assert_eq!(rendered, "BinaryOutput.CCharPointerBinaryOutput");
    assert_eq!(emitter.imports(), vec!["org.isobridge.runtime.BinaryOutput"]);
}

#[test]
fn SourceEmitter___class_and_method___render_with_indentation() {
    let types = TypeCache::new();
    let mut emitter = SourceEmitter::new(&types, "com.acme");
    let params = [
        Parameter::new(TypeRef::INT, "a"),
        Parameter::new(ty("java.lang.String"), "b"),
    ];

    emitter.class_start("final", "CalculatorGen", None, &[]);
    emitter.method_start("static", Some(&TypeRef::INT), "add", &params, &[]);
    emitter.line("return a;");
    emitter.method_end();
    emitter.class_end();

    assert_eq!(
        emitter.build(),
        "package com.acme;\n\n\
         final class CalculatorGen {\n\
         \x20   static int add(int a, String b) {\n\
         \x20       return a;\n\
         \x20   }\n\
         }\n"
    );
}

#[test]
fn SourceEmitter___build___places_header_and_sorted_imports() {
    let types = TypeCache::new();
    let mut emitter =
        SourceEmitter::new(&types, "com.acme").with_header(Some("Generated by isobridge"));
    emitter.write_type(&ty("org.z.Zeta"));
    emitter.write_type(&ty("org.a.Alpha"));

    let text = emitter.build();

    assert!(text.starts_with(
        "// Generated by isobridge\n\npackage com.acme;\n\nimport org.a.Alpha;\nimport org.z.Zeta;\n\n"
    ));
}

#[test]
fn SourceEmitter___annotation___value_attribute_is_positional() {
    let types = TypeCache::new();
    let mut emitter = SourceEmitter::new(&types, "com.acme");

    emitter.annotation(&ty("java.lang.Override"), &[]);
    emitter.annotation(
        &ty("org.isobridge.runtime.EntryPoint"),
        &[("value", "\"x\"".to_string())],
    );
    emitter.annotation(
        &ty("org.isobridge.runtime.EntryPoint"),
        &[
            ("name", "\"x\"".to_string()),
            ("include", "Flag.class".to_string()),
        ],
    );

    assert_eq!(
        emitter.build(),
        "package com.acme;\n\nimport org.isobridge.runtime.EntryPoint;\n\n\
         @Override\n@EntryPoint(\"x\")\n@EntryPoint(name = \"x\", include = Flag.class)\n"
    );
}

#[test]
fn SourceEmitter___expression_builders___use_rendered_names() {
    let types = TypeCache::new();
    let mut emitter = SourceEmitter::new(&types, "com.acme");
    let handles = ty("org.isobridge.runtime.ReferenceHandles");

    assert_eq!(
        emitter.class_literal(&ty("java.util.List<java.lang.String>")),
        "List.class"
    );
    assert_eq!(
        emitter.invoke_static_expr(&handles, "create", &["result".to_string()]),
        "ReferenceHandles.create(result)"
    );
    assert_eq!(
        emitter.new_instance_expr(&ty("com.acme.Impl"), &[]),
        "new Impl()"
    );
    assert_eq!(
        emitter.invoke("peer", "getIsolate", &[]),
        "peer.getIsolate()"
    );
}

#[test]
fn SourceEmitter___string_literal___escapes_quotes_and_control_characters() {
    let types = TypeCache::new();
    let emitter = SourceEmitter::new(&types, "");

    assert_eq!(
        emitter.string_literal("say \"hi\"\n\\"),
        "\"say \\\"hi\\\"\\n\\\\\""
    );
}

#[test]
fn SourceEmitter___native_declaration___ends_with_semicolon() {
    let types = TypeCache::new();
    let mut emitter = SourceEmitter::new(&types, "");

    emitter.method_declaration(
        "private static native",
        &TypeRef::INT,
        "add0",
        &[Parameter::new(TypeRef::LONG, "isolate")],
    );

    assert_eq!(emitter.build(), "private static native int add0(long isolate);\n");
}

#[test]
fn SourceEmitter___member_break___separates_members_but_not_after_brace() {
    let types = TypeCache::new();
    let mut emitter = SourceEmitter::new(&types, "");

    emitter.class_start("final", "Gen", None, &[]);
    emitter.member_break();
    emitter.field("private static final", &TypeRef::INT, "ID", Some("1"));
    emitter.member_break();
    emitter.member_break();
    emitter.method_start("private", None, "Gen", &[], &[]);
    emitter.method_end();
    emitter.class_end();

    assert_eq!(
        emitter.build(),
        "final class Gen {\n\
         \x20   private static final int ID = 1;\n\
         \n\
         \x20   private Gen() {\n\
         \x20   }\n\
         }\n"
    );
}
