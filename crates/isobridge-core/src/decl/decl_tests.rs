#![allow(non_snake_case)]

use super::*;

const ROUND_JSON: &str = r#"{
    "types": [
        {
            "name": "com.acme.CalculatorGen",
            "kind": "class",
            "modifiers": ["abstract"],
            "superclass": "com.acme.Calculator",
            "interfaces": ["org.isobridge.runtime.ForeignObject"],
            "annotations": [
                {
                    "type": "org.isobridge.runtime.GenerateManagedToNativeBridge",
                    "values": {
                        "factory": "com.acme.CalculatorFactory",
                        "marshallers": "com.acme.CalculatorConfig"
                    }
                }
            ],
            "constructors": [{ "params": [] }]
        },
        {
            "name": "com.acme.Calculator",
            "kind": "interface",
            "methods": [
                {
                    "name": "compute",
                    "params": [
                        { "name": "label", "type": "java.lang.String" },
                        { "name": "point", "type": "com.acme.Point" }
                    ],
                    "returns": "int"
                }
            ]
        }
    ]
}"#;

#[test]
fn Round___from_json___parses_types_and_defaults() {
    let round = Round::from_json(ROUND_JSON.as_bytes()).unwrap();

    assert_eq!(round.types.len(), 2);
    let service = round.get("com.acme.Calculator").unwrap();
    assert!(service.is_interface());
    assert!(service.superclass.is_none());
    assert_eq!(service.methods[0].return_type, TypeRef::INT);
}

#[test]
fn Round___from_json_missing_name___returns_invalid_round() {
    let result = Round::from_json(br#"{"types": [{"kind": "class"}]}"#);

    assert!(matches!(result, Err(crate::CoreError::InvalidRound(_))));
}

#[test]
fn Round___from_json_bad_type_string___returns_invalid_round() {
    let result = Round::from_json(br#"{"types": [{"name": "a.B", "superclass": "a.<C"}]}"#);

    assert!(result.is_err());
}

#[test]
fn AnnotationDecl___str_value___reads_type_attribute() {
    let round = Round::from_json(ROUND_JSON.as_bytes()).unwrap();
    let decl = round.get("com.acme.CalculatorGen").unwrap();

    let marker = decl
        .annotation("org.isobridge.runtime.GenerateManagedToNativeBridge")
        .unwrap();

    assert_eq!(marker.str_value("factory"), Some("com.acme.CalculatorFactory"));
    assert_eq!(marker.str_value("missing"), None);
    assert_eq!(marker.simple_name(), "GenerateManagedToNativeBridge");
}

#[test]
fn AnnotationDecl___str_list___accepts_single_string() {
    let annotation = AnnotationDecl::new("org.isobridge.runtime.ExpectError")
        .with_value("value", AnnotationValue::Str("boom".into()));

    assert_eq!(annotation.str_list("value"), vec!["boom"]);
}

#[test]
fn AnnotationValue___untagged___distinguishes_variants() {
    let values: Vec<AnnotationValue> =
        serde_json::from_str(r#"[true, 3, "x", ["a", "b"]]"#).unwrap();

    assert_eq!(values[0], AnnotationValue::Bool(true));
    assert_eq!(values[1], AnnotationValue::Int(3));
    assert_eq!(values[2].as_str(), Some("x"));
    assert_eq!(values[3].str_items(), vec!["a", "b"]);
}

#[test]
fn MethodDecl___is_abstract_in_interface___excludes_default_and_static() {
    let mut plain = MethodDecl::new("run");
    let mut default_method = MethodDecl::new("describe");
    default_method.modifiers.push(Modifier::Default);
    let mut static_method = MethodDecl::new("create");
    static_method.modifiers.push(Modifier::Static);

    assert!(plain.is_abstract_in(TypeKind::Interface));
    assert!(!default_method.is_abstract_in(TypeKind::Interface));
    assert!(!static_method.is_abstract_in(TypeKind::Interface));
    assert!(!plain.is_abstract_in(TypeKind::Class));
    plain.modifiers.push(Modifier::Abstract);
    assert!(plain.is_abstract_in(TypeKind::Class));
}

#[test]
fn MethodDecl___signature___lists_parameter_types() {
    let mut method = MethodDecl::new("compute");
    method.params.push(ParamDecl::new("label", TypeRef::declared("java.lang.String")));
    method.params.push(ParamDecl::new("values", TypeRef::array(TypeRef::INT)));

    assert_eq!(method.signature(), "compute(java.lang.String, int[])");
}

#[test]
fn ElementId___owner___strips_method_part() {
    let method = MethodDecl::new("close");

    let id = ElementId::of_method("com.acme.Calculator", &method);

    assert_eq!(id.as_str(), "com.acme.Calculator#close()");
    assert_eq!(id.owner(), ElementId::of_type("com.acme.Calculator"));
}

#[test]
fn TypeDecl___supertypes___superclass_first() {
    let round = Round::from_json(ROUND_JSON.as_bytes()).unwrap();
    let decl = round.get("com.acme.CalculatorGen").unwrap();

    let supertypes: Vec<String> = decl.supertypes().map(|t| t.to_string()).collect();

    assert_eq!(
        supertypes,
        vec!["com.acme.Calculator", "org.isobridge.runtime.ForeignObject"]
    );
    assert_eq!(decl.package(), "com.acme");
    assert!(decl.is_top_level());
}
