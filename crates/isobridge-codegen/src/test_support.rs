//! Declarations shared by unit tests

use crate::boundary::BoundaryKind;
use crate::generator::{element_generators, generate_unit, plan_element};
use crate::model::Definition;
use crate::resolver::{resolve_factory, resolve_service};
use crate::runtime_types as rt;
use isobridge_core::{
    AnnotationDecl, AnnotationValue, CompilationContext, ConstructorDecl, Diagnostic, MethodDecl,
    Modifier, ParamDecl, Round, TypeCache, TypeDecl, TypeKind, TypeRef,
};

pub(crate) const PACKAGE: &str = "com.acme";

pub(crate) fn q(simple: &str) -> String {
    format!("{PACKAGE}.{simple}")
}

pub(crate) fn ty(text: &str) -> TypeRef {
    text.parse().unwrap()
}

pub(crate) fn string() -> TypeRef {
    ty("java.lang.String")
}

pub(crate) fn abstract_method(name: &str, params: &[(&str, TypeRef)], returns: TypeRef) -> MethodDecl {
    let mut method = MethodDecl::new(name);
    method.modifiers = vec![Modifier::Public, Modifier::Abstract];
    method.params = params
        .iter()
        .map(|(name, ty)| ParamDecl::new(*name, ty.clone()))
        .collect();
    method.return_type = returns;
    method
}

pub(crate) fn interface_method(name: &str, params: &[(&str, TypeRef)], returns: TypeRef) -> MethodDecl {
    let mut method = abstract_method(name, params, returns);
    method.modifiers.clear();
    method
}

/// `int read(@Out(arrayOffsetParameter = "offset", arrayLengthParameter = "length", trimToResult = true) byte[] buffer, int offset, int length)`
pub(crate) fn ranged_read() -> MethodDecl {
    let mut read = interface_method(
        "read",
        &[("buffer", ty("byte[]")), ("offset", TypeRef::INT), ("length", TypeRef::INT)],
        TypeRef::INT,
    );
    read.params[0].annotations.push(
        AnnotationDecl::new(rt::OUT)
            .with_value("arrayOffsetParameter", AnnotationValue::Str("offset".into()))
            .with_value("arrayLengthParameter", AnnotationValue::Str("length".into()))
            .with_value("trimToResult", AnnotationValue::Bool(true)),
    );
    read
}

pub(crate) fn service_marker(kind: BoundaryKind, factory: &str) -> AnnotationDecl {
    AnnotationDecl::new(kind.configuration().service_marker.clone())
        .with_value("factory", AnnotationValue::Str(q(factory)))
}

pub(crate) fn factory_marker(kind: BoundaryKind, initial: &str) -> AnnotationDecl {
    AnnotationDecl::new(kind.configuration().factory_marker())
        .with_value("marshallers", AnnotationValue::Str(q("Marshallers")))
        .with_value("initialService", AnnotationValue::Str(q(initial)))
}

/// `Marshallers` with `static MarshallerConfig getInstance()`
pub(crate) fn marshaller_config() -> TypeDecl {
    let mut decl = TypeDecl::new(q("Marshallers"), TypeKind::Class);
    let mut get_instance = MethodDecl::new("getInstance");
    get_instance.modifiers = vec![Modifier::Public, Modifier::Static];
    get_instance.return_type = rt::ty(rt::MARSHALLER_CONFIG);
    decl.methods.push(get_instance);
    decl
}

/// `interface Calculator { int add(int, int); String describe(String); Point move(Point, int) }`
pub(crate) fn calculator() -> TypeDecl {
    let mut decl = TypeDecl::new(q("Calculator"), TypeKind::Interface);
    decl.methods = vec![
        interface_method("add", &[("a", TypeRef::INT), ("b", TypeRef::INT)], TypeRef::INT),
        interface_method("describe", &[("name", string())], string()),
        interface_method(
            "move",
            &[("point", ty("com.acme.Point")), ("delta", TypeRef::INT)],
            ty("com.acme.Point"),
        ),
    ];
    decl
}

/// `abstract class CalculatorBridge implements Calculator, ForeignObject`
pub(crate) fn calculator_bridge(kinds: &[BoundaryKind]) -> TypeDecl {
    let mut decl = TypeDecl::new(q("CalculatorBridge"), TypeKind::Class);
    decl.modifiers = vec![Modifier::Abstract];
    decl.interfaces = vec![ty("com.acme.Calculator"), rt::ty(rt::FOREIGN_OBJECT)];
    decl.annotations = kinds
        .iter()
        .map(|kind| service_marker(*kind, "CalculatorFactory"))
        .collect();
    decl
}

pub(crate) fn calculator_factory(kinds: &[BoundaryKind]) -> TypeDecl {
    let mut decl = TypeDecl::new(q("CalculatorFactory"), TypeKind::Class);
    decl.annotations = kinds
        .iter()
        .map(|kind| factory_marker(*kind, "CalculatorBridge"))
        .collect();
    decl
}

pub(crate) fn calculator_impl() -> TypeDecl {
    let mut decl = TypeDecl::new(q("CalculatorImpl"), TypeKind::Class);
    decl.interfaces = vec![ty("com.acme.Calculator")];
    decl.constructors = vec![ConstructorDecl::default()];
    decl
}

/// Calculator service, factory and support types for `kinds`
pub(crate) fn calculator_round(kinds: &[BoundaryKind]) -> Vec<TypeDecl> {
    vec![
        calculator(),
        calculator_bridge(kinds),
        calculator_factory(kinds),
        calculator_impl(),
        marshaller_config(),
        TypeDecl::new(q("Point"), TypeKind::Class),
    ]
}

pub(crate) fn cache(types: Vec<TypeDecl>) -> TypeCache {
    TypeCache::from_round(&Round { types })
}

/// Context collecting diagnostics in memory
pub(crate) fn context(types: Vec<TypeDecl>) -> CompilationContext {
    CompilationContext::with_sink(cache(types), Box::new(Vec::<Diagnostic>::new()))
}

pub(crate) fn messages(ctx: &CompilationContext) -> Vec<String> {
    ctx.diagnostics().iter().map(|d| d.message.clone()).collect()
}

pub(crate) fn find<'a>(types: &'a [TypeDecl], simple: &str) -> &'a TypeDecl {
    let name = q(simple);
    types.iter().find(|t| t.name == name).unwrap()
}

/// Every definition `decl` resolves to, in kind order
pub(crate) fn definitions(ctx: &mut CompilationContext, decl: &TypeDecl) -> Vec<Definition> {
    BoundaryKind::ALL
        .into_iter()
        .filter_map(|kind| {
            resolve_service(ctx, decl, kind)
                .map(Definition::Service)
                .or_else(|| resolve_factory(ctx, decl, kind).map(Definition::Factory))
        })
        .collect()
}

/// Generated source of the element `simple` in a round of `types`
pub(crate) fn render(types: Vec<TypeDecl>, simple: &str) -> String {
    let mut ctx = context(types.clone());
    let definitions = definitions(&mut ctx, find(&types, simple));
    assert!(messages(&ctx).is_empty(), "{:?}", messages(&ctx));
    let definitions: Vec<&Definition> = definitions.iter().collect();
    let plans = plan_element(&definitions).unwrap();
    let generators = element_generators(&definitions, plans);
    generate_unit(ctx.types(), None, &generators).unwrap().content
}

/// Asserts `text` contains every line of `snippet` consecutively, ignoring
/// indentation and blank lines
pub(crate) fn assert_contains_lines(text: &str, snippet: &str) {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let expected: Vec<&str> = snippet.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let found = lines
        .windows(expected.len())
        .any(|window| window == expected.as_slice());
    assert!(found, "missing:\n{snippet}\nin:\n{text}");
}

/// Sets `include` on the `kind` marker of `decl`
pub(crate) fn with_include(decl: &mut TypeDecl, kind: BoundaryKind, include: &str) {
    let marker = kind.configuration().service_marker.clone();
    let factory_marker = kind.configuration().factory_marker();
    for annotation in &mut decl.annotations {
        if annotation.annotation_type == marker || annotation.annotation_type == factory_marker {
            annotation
                .values
                .insert("include".to_string(), AnnotationValue::Str(include.to_string()));
        }
    }
}

fn accessor(name: &str, marker: &str, returns: TypeRef) -> MethodDecl {
    let mut method = MethodDecl::new(name);
    method.modifiers = vec![Modifier::Static];
    method.params = vec![ParamDecl::new("receiver", ty("java.lang.Object"))];
    method.return_type = returns;
    method.annotations.push(AnnotationDecl::new(marker));
    method
}

/// Calculator bridge with a custom dispatch instead of `ForeignObject`; the
/// service is reduced to `int add(Object receiver, int a)`
pub(crate) fn custom_dispatch_round(kind: BoundaryKind) -> Vec<TypeDecl> {
    let mut round = calculator_round(&[kind]);
    let bridge = &mut round[1];
    bridge.interfaces = vec![ty("com.acme.Calculator")];
    bridge.methods = vec![
        accessor("dispatch", rt::CUSTOM_DISPATCH_ACCESSOR, ty("com.acme.Calculator")),
        accessor("receiver", rt::CUSTOM_RECEIVER_ACCESSOR, ty("java.lang.Object")),
    ];
    let calculator = &mut round[0];
    calculator.methods = vec![interface_method(
        "add",
        &[("receiver", ty("java.lang.Object")), ("a", TypeRef::INT)],
        TypeRef::INT,
    )];
    round
}

/// Process calculator whose factory also hosts a `Storage` service bridging
/// `interface Store { long size(); }`
pub(crate) fn storage_round() -> Vec<TypeDecl> {
    let p2p = BoundaryKind::ProcessToProcess;
    let mut round = calculator_round(&[p2p]);
    let mut store = TypeDecl::new(q("Store"), TypeKind::Interface);
    store.methods = vec![interface_method("size", &[], TypeRef::LONG)];
    let mut storage = TypeDecl::new(q("Storage"), TypeKind::Class);
    storage.modifiers = vec![Modifier::Abstract];
    storage.interfaces = vec![ty("com.acme.Store"), rt::ty(rt::FOREIGN_OBJECT)];
    storage.annotations.push(service_marker(p2p, "CalculatorFactory"));
    round.push(store);
    round.push(storage);
    round[2].annotations[0].values.insert(
        "services".to_string(),
        AnnotationValue::List(vec![AnnotationValue::Str(q("Storage"))]),
    );
    round
}
