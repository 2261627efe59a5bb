//! Message ids and dispatch tables of process channels
//!
//! A message id carries the service id in its upper 16 bits and the method id
//! in the lower 16 bits. Service id 0 is the factory itself, whose method ids
//! are lifecycle operations.

use super::factory::initializer_locals;
use super::marshal::Codec;
use super::GenerationPlan;
use crate::model::{FactoryDefinition, MethodData, ServiceDefinition, gen_qualified_name};
use crate::runtime_types as rt;
use isobridge_core::{TypeRef, names};
use isobridge_emit::names::to_upper_snake;
use isobridge_emit::{Parameter, SourceEmitter};

pub(super) const SERVICE_SCOPE: &str = "SERVICE_SCOPE";
pub(super) const INITIALIZE_ISOLATE_ID: &str = "INITIALIZE_ISOLATE_ID";
pub(super) const RELEASE_HANDLE_ID: &str = "RELEASE_HANDLE_ID";
const SERVICE_IDS: &str = "SERVICE_IDS";
const DISPATCH_HANDLERS: &str = "DISPATCH_HANDLERS";

/// `ADD_ID` for a method named `add`
pub(super) fn message_id_name(codec: &Codec, method: &MethodData) -> String {
    format!("{}_ID", to_upper_snake(&codec.strategy().end_name(method)))
}

fn dispatch_params() -> Vec<Parameter> {
    vec![
        Parameter::new(TypeRef::INT, "messageId"),
        Parameter::new(rt::ty(rt::PROCESS_ISOLATE), "processIsolate"),
        Parameter::new(rt::ty(rt::BINARY_INPUT), "binaryInput"),
    ]
}

fn unknown_message(e: &mut SourceEmitter<'_>) {
    let error = TypeRef::declared(names::qualify(names::JAVA_LANG, "IllegalArgumentException"));
    let error = e.render_type(&error);
    e.line(&format!(
        "throw new {error}({} + messageId);",
        e.string_literal("Unknown message id ")
    ));
}

/// Service scope and one id per method
pub(super) fn service_fields(e: &mut SourceEmitter<'_>, service: &ServiceDefinition) {
    let factory_gen = TypeRef::declared(gen_qualified_name(service.factory.qualified_name().unwrap_or_default()));
    let class = e.class_literal(&service.annotated.as_type());
    let lookup = e.invoke_static_expr(&factory_gen, "lookupServiceId", &[class]);
    e.field(
        "private static final",
        &TypeRef::INT,
        SERVICE_SCOPE,
        Some(&format!("{lookup} << 16")),
    );
    let codec = Codec::new(service.kind);
    for (id, method) in service.methods.iter().enumerate() {
        e.field(
            "private static final",
            &TypeRef::INT,
            &message_id_name(&codec, method),
            Some(&id.to_string()),
        );
    }
}

/// `static BinaryOutput dispatch(int messageId, ...)` routing to the end point
pub(super) fn service_dispatch(e: &mut SourceEmitter<'_>, service: &ServiceDefinition, plan: &GenerationPlan) {
    let throwable = TypeRef::declared(names::THROWABLE);
    e.member_break();
    e.method_start(
        "static",
        Some(&rt::ty(rt::BINARY_OUTPUT)),
        "dispatch",
        &dispatch_params(),
        std::slice::from_ref(&throwable),
    );
    if service.methods.is_empty() {
        let error = TypeRef::declared(names::qualify(names::JAVA_LANG, "UnsupportedOperationException"));
        let error = e.render_type(&error);
        e.line(&format!("throw new {error}({});", e.string_literal("No exported methods.")));
        e.method_end();
        return;
    }
    let codec = Codec::new(service.kind);
    e.line("switch (messageId & 0xffff) {");
    e.indent();
    for method in &service.methods {
        let end_name = codec.strategy().end_name(method);
        e.line(&format!("case {}:", message_id_name(&codec, method)));
        e.indent();
        e.line(&format!(
            "return {}.{end_name}(processIsolate, binaryInput);",
            plan.end_point
        ));
        e.dedent();
    }
    e.line("default:");
    e.indent();
    unknown_message(e);
    e.dedent();
    e.dedent();
    e.line("}");
    e.method_end();
}

/// Lifecycle ids, the service id table and the handler table
pub(super) fn factory_fields(e: &mut SourceEmitter<'_>, factory: &FactoryDefinition) {
    let int = TypeRef::INT;
    e.field("private static final", &int, INITIALIZE_ISOLATE_ID, Some("0"));
    e.field("private static final", &int, RELEASE_HANDLE_ID, Some("1"));

    let map = TypeRef::declared("java.util.Map");
    let entries: Vec<String> = factory
        .services
        .iter()
        .enumerate()
        .map(|(index, service)| {
            let class = e.class_literal(service);
            e.invoke_static_expr(&map, "entry", &[class, (index + 1).to_string()])
        })
        .collect();
    let table = e.invoke_static_expr(&map, "ofEntries", &entries);
    let map_type = TypeRef::generic(
        "java.util.Map",
        vec![
            TypeRef::generic(names::CLASS, vec![TypeRef::Wildcard]),
            TypeRef::declared(names::qualify(names::JAVA_LANG, "Integer")),
        ],
    );
    e.field("private static final", &map_type, SERVICE_IDS, Some(&table));

    let factory_gen = TypeRef::declared(gen_qualified_name(&factory.annotated.name));
    let factory_gen = e.render_type(&factory_gen);
    let mut handlers = vec![format!("{factory_gen}::dispatchFactory")];
    for service in &factory.services {
        let service_gen = TypeRef::declared(gen_qualified_name(service.qualified_name().unwrap_or_default()));
        handlers.push(format!("{}::dispatch", e.render_type(&service_gen)));
    }
    e.field(
        "private static final",
        &TypeRef::array(rt::ty(rt::DISPATCH_HANDLER)),
        DISPATCH_HANDLERS,
        Some(&format!("{{{}}}", handlers.join(", "))),
    );
}

/// `lookupServiceId`, the channel `dispatch` and the lifecycle handler
pub(super) fn factory_api(e: &mut SourceEmitter<'_>, factory: &FactoryDefinition) {
    let class_type = TypeRef::generic(names::CLASS, vec![TypeRef::Wildcard]);
    e.member_break();
    e.method_start(
        "static",
        Some(&TypeRef::INT),
        "lookupServiceId",
        &[Parameter::new(class_type, "serviceClass")],
        &[],
    );
    let integer = e.render_type(&TypeRef::declared(names::qualify(names::JAVA_LANG, "Integer")));
    e.line(&format!("{integer} id = {SERVICE_IDS}.get(serviceClass);"));
    e.line("if (id == null) {");
    e.indent();
    let error = TypeRef::declared(names::qualify(names::JAVA_LANG, "IllegalArgumentException"));
    let error = e.render_type(&error);
    e.line(&format!(
        "throw new {error}({} + serviceClass.getName());",
        e.string_literal("Unknown service ")
    ));
    e.dedent();
    e.line("}");
    e.line("return id;");
    e.method_end();

    let throwable = TypeRef::declared(names::THROWABLE);
    e.member_break();
    e.method_start(
        "static",
        Some(&rt::ty(rt::BINARY_OUTPUT)),
        "dispatch",
        &dispatch_params(),
        std::slice::from_ref(&throwable),
    );
    e.line("int serviceId = messageId >>> 16;");
    e.line(&format!("if (serviceId >= {DISPATCH_HANDLERS}.length) {{"));
    e.indent();
    unknown_message(e);
    e.dedent();
    e.line("}");
    e.line(&format!(
        "return {DISPATCH_HANDLERS}[serviceId].dispatch(messageId, processIsolate, binaryInput);"
    ));
    e.method_end();

    e.member_break();
    e.method_start(
        "private static",
        Some(&rt::ty(rt::BINARY_OUTPUT)),
        "dispatchFactory",
        &dispatch_params(),
        &[],
    );
    e.line("switch (messageId & 0xffff) {");
    e.indent();
    e.line(&format!("case {INITIALIZE_ISOLATE_ID}: {{"));
    e.indent();
    let handle = initializer_locals(e, factory);
    let output = rt::ty(rt::BINARY_OUTPUT);
    let claim = e.invoke_static_expr(&output, "claimBuffer", &["binaryInput".to_string()]);
    let output = e.render_type(&output);
    e.line(&format!("{output} marshalledResultOutput = {claim};"));
    e.line(&format!("marshalledResultOutput.writeLong({handle});"));
    e.line("return marshalledResultOutput;");
    e.dedent();
    e.line("}");
    e.line(&format!("case {RELEASE_HANDLE_ID}:"));
    e.indent();
    let remove = e.invoke_static_expr(
        &rt::ty(rt::REFERENCE_HANDLES),
        "remove",
        &["binaryInput.readLong()".to_string()],
    );
    e.line(&format!("{remove};"));
    e.line("return null;");
    e.dedent();
    e.line("default:");
    e.indent();
    unknown_message(e);
    e.dedent();
    e.dedent();
    e.line("}");
    e.method_end();
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod process_tests;
