//! Factories spawning an isolate and handing out its initial service

use super::end_point::{close_guard, direct_entry_point, jni_entry_point, open_guard};
use super::process::INITIALIZE_ISOLATE_ID;
use super::{GenerationPlan, binary_name, marshaller_fields, method_descriptor};
use crate::boundary::BoundaryKind;
use crate::model::{FactoryDefinition, ImplementationAccess, gen_qualified_name, gen_simple_name};
use crate::runtime_types as rt;
use isobridge_core::TypeRef;
use isobridge_emit::{Parameter, SourceEmitter};

const INITIALIZE_ISOLATE: &str = "initializeIsolate";
const INITIALIZE_ISOLATE_ENTRY: &str = "initializeIsolate0";

/// Expression producing the implementation instance
pub(super) fn instantiate(e: &mut SourceEmitter<'_>, factory: &FactoryDefinition) -> String {
    match &factory.implementation {
        Some(implementation) => match &implementation.access {
            ImplementationAccess::Constructor => e.new_instance_expr(&implementation.ty, &[]),
            ImplementationAccess::StaticAccessor(name) => {
                e.invoke_static_expr(&implementation.ty, name, &[])
            }
        },
        None => {
            let class = e.class_literal(&factory.service_type);
            let loader = TypeRef::declared("java.util.ServiceLoader");
            let load = e.invoke_static_expr(&loader, "load", &[class]);
            format!("{load}.findFirst().orElseThrow()")
        }
    }
}

/// Declares the new service and returns the expression of its handle
pub(super) fn initializer_locals(e: &mut SourceEmitter<'_>, factory: &FactoryDefinition) -> String {
    let service_type = e.render_type(&factory.service_type);
    let instance = instantiate(e, factory);
    e.line(&format!("{service_type} service = {instance};"));
    e.invoke_static_expr(&rt::ty(rt::REFERENCE_HANDLES), "create", &["service".to_string()])
}

fn initial_service_gen(factory: &FactoryDefinition) -> TypeRef {
    TypeRef::declared(gen_qualified_name(
        factory.initial_service.qualified_name().unwrap_or_default(),
    ))
}

/// `NativeIsolate.spawn(config)` with the isolate handler when one is set
fn spawn_expr(e: &mut SourceEmitter<'_>, factory: &FactoryDefinition, isolate: &str, extra: Option<String>) -> String {
    let mut args = vec!["config".to_string()];
    args.extend(extra);
    if let Some(handler) = &factory.isolate_handler {
        args.push(e.new_instance_expr(handler, &[]));
    }
    e.invoke_static_expr(&rt::ty(isolate), "spawn", &args)
}

/// `static Initial create(config)` spawning the isolate
pub(super) fn create(e: &mut SourceEmitter<'_>, factory: &FactoryDefinition, plan: &GenerationPlan, branch: bool) {
    let config = factory.kind.configuration();
    e.member_break();
    e.method_start(
        "static",
        Some(&factory.initial_service),
        &plan.factory_method,
        &config.factory_params,
        &[],
    );
    let initial_gen = initial_service_gen(factory);
    match factory.kind {
        BoundaryKind::NativeToManaged => {
            e.line(&format!(
                "long handle = {}.{INITIALIZE_ISOLATE_ENTRY}(jniEnv);",
                plan.start_point
            ));
            let peer = e.invoke_static_expr(
                &config.peer_type,
                "create",
                &["jniEnv".to_string(), "handle".to_string()],
            );
            let created = e.invoke_static_expr(&initial_gen, "create", &[peer]);
            e.line(&format!("return {created};"));
        }
        BoundaryKind::ProcessToProcess => {
            let factory_gen = e.render_type(&TypeRef::declared(gen_qualified_name(&factory.annotated.name)));
            let spawn = spawn_expr(e, factory, rt::PROCESS_ISOLATE, Some(format!("{factory_gen}::dispatch")));
            enter(e, rt::PROCESS_ISOLATE, rt::PROCESS_ISOLATE_THREAD, &spawn);
            let output = rt::ty(rt::BYTE_ARRAY_BINARY_OUTPUT);
            let create = e.invoke_static_expr(&output, "create", &["4".to_string()]);
            let output = e.render_type(&output);
            e.line(&format!("{output} marshalledParametersOutput = {create};"));
            e.line(&format!("marshalledParametersOutput.writeInt({INITIALIZE_ISOLATE_ID});"));
            let input = e.render_type(&rt::ty(rt::BINARY_INPUT));
            e.line(&format!(
                "{input} marshalledResultInput = isolateThread.sendAndReceive(marshalledParametersOutput);"
            ));
            e.line("long handle = marshalledResultInput.readLong();");
            wrap_and_leave(e, factory, &initial_gen);
        }
        BoundaryKind::ManagedToNative | BoundaryKind::NativeToNative => {
            let spawn = spawn_expr(e, factory, rt::NATIVE_ISOLATE, None);
            enter(e, rt::NATIVE_ISOLATE, rt::NATIVE_ISOLATE_THREAD, &spawn);
            let direct = format!(
                "{}.{INITIALIZE_ISOLATE}(isolateThread.getIsolateThread())",
                plan.end_point
            );
            let through_jni = format!(
                "{}.{INITIALIZE_ISOLATE_ENTRY}(isolateThread.getIsolateThreadId())",
                plan.start_point
            );
            if factory.kind == BoundaryKind::NativeToNative {
                e.line(&format!("long handle = {direct};"));
            } else if branch {
                let in_image = e.invoke_static_expr(&rt::ty(rt::IMAGE_INFO), "inImageCode", &[]);
                e.line("long handle;");
                e.line(&format!("if ({in_image}) {{"));
                e.indent();
                e.line(&format!("handle = {direct};"));
                e.dedent();
                e.line("} else {");
                e.indent();
                e.line(&format!("handle = {through_jni};"));
                e.dedent();
                e.line("}");
            } else {
                e.line(&format!("long handle = {through_jni};"));
            }
            wrap_and_leave(e, factory, &initial_gen);
        }
    }
    e.method_end();
}

fn enter(e: &mut SourceEmitter<'_>, isolate_type: &str, thread_type: &str, spawn: &str) {
    let isolate = e.render_type(&rt::ty(isolate_type));
    let thread = e.render_type(&rt::ty(thread_type));
    e.line(&format!("{isolate} isolate = {spawn};"));
    e.line(&format!("{thread} isolateThread = isolate.enter();"));
    e.line("try {");
    e.indent();
}

fn wrap_and_leave(e: &mut SourceEmitter<'_>, factory: &FactoryDefinition, initial_gen: &TypeRef) {
    let peer_type = &factory.kind.configuration().peer_type;
    let peer = e.invoke_static_expr(peer_type, "create", &["isolate".to_string(), "handle".to_string()]);
    let created = e.invoke_static_expr(initial_gen, "create", &[peer]);
    e.line(&format!("return {created};"));
    e.dedent();
    e.line("} finally {");
    e.indent();
    e.line("isolateThread.leave();");
    e.dedent();
    e.line("}");
}

/// Nested classes running the initializer on the isolate side
pub(super) fn emit_impl(e: &mut SourceEmitter<'_>, factory: &FactoryDefinition, plan: &GenerationPlan, branch: bool) {
    let gen_qualified = gen_qualified_name(&factory.annotated.name);
    match factory.kind {
        BoundaryKind::ProcessToProcess => {}
        BoundaryKind::ManagedToNative => {
            e.member_break();
            e.class_start("private static final", &plan.start_point, None, &[]);
            e.method_declaration(
                "private static native",
                &TypeRef::LONG,
                INITIALIZE_ISOLATE_ENTRY,
                &[Parameter::new(TypeRef::LONG, "isolate")],
            );
            e.class_end();
            end_class(e, factory, plan, |e| {
                jni_entry_point(e, &gen_qualified, &plan.start_point, INITIALIZE_ISOLATE_ENTRY, factory.include.as_ref());
                initializer(e, factory, BoundaryKind::ManagedToNative);
                if branch {
                    e.member_break();
                    direct_entry_point(e, factory.include.as_ref());
                    initializer(e, factory, BoundaryKind::NativeToNative);
                }
            });
        }
        BoundaryKind::NativeToNative => end_class(e, factory, plan, |e| {
            direct_entry_point(e, factory.include.as_ref());
            initializer(e, factory, BoundaryKind::NativeToNative);
        }),
        BoundaryKind::NativeToManaged => {
            let params = [Parameter::new(rt::ty(rt::JNI_ENV), "jniEnv")];
            let class = binary_name(&format!("{gen_qualified}.{}", plan.end_point)).replace('.', "/");
            let descriptor = method_descriptor(&[], &TypeRef::LONG);
            e.member_break();
            e.class_start("private static final", &plan.start_point, None, &[]);
            e.method_start("private static", Some(&TypeRef::LONG), INITIALIZE_ISOLATE_ENTRY, &params, &[]);
            let calls = e.invoke_static_expr(&rt::ty(rt::JNI_CALLS), "getDefault", &[]);
            let args = [
                "jniEnv".to_string(),
                e.string_literal(&class),
                e.string_literal(INITIALIZE_ISOLATE),
                e.string_literal(&descriptor),
            ];
            e.line(&format!("return {calls}.callStaticLong({});", args.join(", ")));
            e.method_end();
            e.class_end();
            end_class(e, factory, plan, |e| {
                e.annotation(&rt::ty(rt::JNI_ENTRY_POINT), &[]);
                initializer(e, factory, BoundaryKind::NativeToManaged);
            });
        }
    }
}

fn end_class(
    e: &mut SourceEmitter<'_>,
    factory: &FactoryDefinition,
    plan: &GenerationPlan,
    members: impl FnOnce(&mut SourceEmitter<'_>),
) {
    e.member_break();
    e.class_start("private static final", &plan.end_point, None, &[]);
    marshaller_fields(e, &factory.marshaller_config, &[&factory.throwable_marshaller]);
    e.member_break();
    members(e);
    e.class_end();
}

/// `static long initializeIsolate(...)` for the calling convention of `kind`
fn initializer(e: &mut SourceEmitter<'_>, factory: &FactoryDefinition, kind: BoundaryKind) {
    let params = match kind {
        BoundaryKind::ManagedToNative => vec![
            Parameter::new(rt::ty(rt::JNI_ENV), "jniEnv"),
            Parameter::new(rt::ty(rt::JCLASS), "jniClass"),
            Parameter::new(TypeRef::LONG, "isolate"),
        ],
        BoundaryKind::NativeToNative => vec![Parameter::new(rt::ty(rt::ISOLATE_THREAD), "isolate")],
        _ => Vec::new(),
    };
    e.method_start("static", Some(&TypeRef::LONG), INITIALIZE_ISOLATE, &params, &[]);
    let scope_name = format!("{}::{INITIALIZE_ISOLATE}", gen_simple_name(&factory.annotated));
    open_guard(e, kind, &scope_name);
    let handle = initializer_locals(e, factory);
    e.line(&format!("return {handle};"));
    close_guard(e, kind, factory.throwable_marshaller.field_name(), &TypeRef::LONG);
    e.method_end();
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod factory_tests;
