//! End points: static methods decoding a call and invoking the implementation

use super::marshal::{Codec, Role, Side, SizeTerm, default_value, size_expression};
use super::{GenerationPlan, binary_name, direction, marshaller_fields, service_marshallers};
use crate::boundary::BoundaryKind;
use crate::model::{MethodData, ServiceDefinition, gen_qualified_name, gen_simple_name};
use crate::runtime_types as rt;
use crate::strategy::{Signature, parameter_name};
use isobridge_core::{TypeRef, names};
use isobridge_emit::SourceEmitter;
use isobridge_emit::names::mangle_jni;

const INPUT: &str = "marshalledParametersInput";
const OUTPUT: &str = "marshalledResultOutput";

/// The nested end-point class; `branch` contributes its direct-call end
/// methods when both kinds share this class
pub(super) fn emit(
    e: &mut SourceEmitter<'_>,
    service: &ServiceDefinition,
    plan: &GenerationPlan,
    branch: Option<&ServiceDefinition>,
) {
    e.member_break();
    e.class_start("private static final", &plan.end_point, None, &[]);
    marshaller_fields(e, &service.marshaller_config, &service_marshallers(service));
    for method in &service.methods {
        end_method(e, service, plan, method);
    }
    if let Some(partner) = branch {
        for method in &partner.methods {
            end_method(e, partner, plan, method);
        }
    }
    e.class_end();
}

/// `@EntryPoint(name = "Java_...")` naming the native method of `start_point`
pub(super) fn jni_entry_point(
    e: &mut SourceEmitter<'_>,
    gen_qualified: &str,
    start_point: &str,
    entry_name: &str,
    include: Option<&TypeRef>,
) {
    let start = binary_name(&format!("{gen_qualified}.{start_point}"));
    let symbol = format!("Java_{}_{}", mangle_jni(&start), mangle_jni(entry_name));
    let mut attributes = vec![("name", e.string_literal(&symbol))];
    if let Some(include) = include {
        attributes.push(("include", e.class_literal(include)));
    }
    e.annotation(&rt::ty(rt::ENTRY_POINT), &attributes);
    e.annotation(
        &rt::ty(rt::SUPPRESS_WARNINGS),
        &[("value", "{\"try\", \"unused\"}".to_string())],
    );
}

/// `@EntryPoint` of a method called directly from another isolate
pub(super) fn direct_entry_point(e: &mut SourceEmitter<'_>, include: Option<&TypeRef>) {
    let attributes: Vec<(&str, String)> = include
        .map(|include| vec![("include", e.class_literal(include))])
        .unwrap_or_default();
    e.annotation(&rt::ty(rt::ENTRY_POINT), &attributes);
    e.annotation(&rt::ty(rt::SUPPRESS_WARNINGS), &[("value", "\"unused\"".to_string())]);
}

/// Opens the guarded region of an end method
pub(super) fn open_guard(e: &mut SourceEmitter<'_>, kind: BoundaryKind, scope_name: &str) {
    if kind == BoundaryKind::ManagedToNative {
        let scope = e.render_type(&rt::ty(rt::JNI_METHOD_SCOPE));
        let name = e.string_literal(scope_name);
        let open = e.invoke_static_expr(
            &rt::ty(rt::FOREIGN_EXCEPTION),
            "openJNIMethodScope",
            &[name, "jniEnv".to_string()],
        );
        e.line(&format!("try ({scope} scope = {open}) {{"));
    } else {
        e.line("try {");
    }
    e.indent();
}

/// Closes [`open_guard`], handing any throwable to the calling side
pub(super) fn close_guard(e: &mut SourceEmitter<'_>, kind: BoundaryKind, marshaller: &str, return_type: &TypeRef) {
    let throwable = e.render_type(&TypeRef::declared(names::THROWABLE));
    let foreign = rt::ty(rt::FOREIGN_EXCEPTION);
    let wrapped = e.invoke_static_expr(&foreign, "forThrowable", &["throwable".to_string(), marshaller.to_string()]);
    e.dedent();
    e.line(&format!("}} catch ({throwable} throwable) {{"));
    e.indent();
    if kind == BoundaryKind::ManagedToNative {
        e.line(&format!("{wrapped}.throwUsingJNI(jniEnv);"));
        if let Some(default) = default_value(return_type) {
            e.line(&format!("return {default};"));
        }
    } else {
        e.line(&format!("throw {wrapped};"));
    }
    e.dedent();
    e.line("}");
}

fn end_method(e: &mut SourceEmitter<'_>, service: &ServiceDefinition, plan: &GenerationPlan, method: &MethodData) {
    let codec = Codec::new(service.kind);
    let signature = method.end_signature(codec.strategy());
    let gen_qualified = gen_qualified_name(&service.annotated.name);
    e.member_break();
    match service.kind {
        BoundaryKind::ManagedToNative => {
            let entry_name = codec.strategy().entry_name(method);
            jni_entry_point(e, &gen_qualified, &plan.start_point, &entry_name, service.include.as_ref());
        }
        BoundaryKind::NativeToNative => direct_entry_point(e, service.include.as_ref()),
        BoundaryKind::NativeToManaged => {
            e.annotation(&rt::ty(rt::JNI_ENTRY_POINT), &[]);
        }
        BoundaryKind::ProcessToProcess => {}
    }
    e.method_start(
        "static",
        Some(&signature.return_type),
        &signature.name,
        &signature.params,
        &[],
    );
    let scope_name = format!("{}::{}", gen_simple_name(&service.annotated), method.name());
    open_guard(e, service.kind, &scope_name);
    body(e, &codec, service, method, signature);
    close_guard(
        e,
        service.kind,
        service.throwable_marshaller.field_name(),
        &signature.return_type,
    );
    e.method_end();
}

/// Declares the receiver and returns the expression methods are invoked on
fn receiver(e: &mut SourceEmitter<'_>, service: &ServiceDefinition) -> String {
    let handles = rt::ty(rt::REFERENCE_HANDLES);
    match &service.custom_dispatch {
        None => {
            let ty = e.render_type(&service.service_type);
            let class = e.class_literal(&service.service_type);
            let resolve = e.invoke_static_expr(&handles, "resolve", &["handle".to_string(), class]);
            e.line(&format!("{ty} receiverObject = {resolve};"));
            "receiverObject".to_string()
        }
        Some(dispatch) => {
            let object = TypeRef::declared(names::OBJECT);
            let object_name = e.render_type(&object);
            let class = e.class_literal(&object);
            let resolve = e.invoke_static_expr(&handles, "resolve", &["handle".to_string(), class]);
            e.line(&format!("{object_name} receiverObject = {resolve};"));
            let ty = e.render_type(&service.service_type);
            let dispatch_object = e.invoke_static_expr(
                &service.annotated.as_type(),
                &dispatch.dispatch_accessor.name,
                &["receiverObject".to_string()],
            );
            e.line(&format!("{ty} dispatchObject = {dispatch_object};"));
            "dispatchObject".to_string()
        }
    }
}

fn body(
    e: &mut SourceEmitter<'_>,
    codec: &Codec,
    service: &ServiceDefinition,
    method: &MethodData,
    signature: &Signature,
) {
    let process = service.kind == BoundaryKind::ProcessToProcess;
    let input = if process { "payload" } else { INPUT };
    if process {
        e.line(&format!("long handle = {input}.readLong();"));
    }
    let target = receiver(e, service);
    if !process && signature.payload {
        let bytes = if codec.uses_jni(Side::End) {
            codec.jni_to_managed(e, "payload")
        } else {
            "payload".to_string()
        };
        let binary_input = rt::ty(rt::BINARY_INPUT);
        let create = e.invoke_static_expr(&binary_input, "create", &[bytes]);
        let binary_input = e.render_type(&binary_input);
        e.line(&format!("{binary_input} {INPUT} = {create};"));
    }

    let mut args = Vec::new();
    if let Some(dispatch) = &service.custom_dispatch {
        args.push(e.invoke_static_expr(
            &service.annotated.as_type(),
            &dispatch.receiver_accessor.name,
            &["receiverObject".to_string()],
        ));
    }
    let offsets = direction::end_offset_parameters(method);
    for (param, m) in method.marshalled_params() {
        let name = parameter_name(&param.name);
        let ty = &param.ty;
        if m.has_direction() {
            direction::end_read(e, method, m, ty, &name, input);
            args.push(name);
        } else if codec.strategy().is_batched(m, ty) {
            let raw = codec.read_batched(m, ty, input);
            if m.is_custom() || codec.is_identity(m, ty, Side::End, Role::Parameter, false) {
                let declared = e.render_type(ty);
                e.line(&format!("{declared} {name} = {raw};"));
            } else {
                codec.decode_into_local(e, m, ty, &raw, Side::End, Role::Parameter, false, &name);
            }
            args.push(name);
        } else if codec.is_identity(m, ty, Side::End, Role::Parameter, true) {
            args.push(name);
        } else if let Some(expr) = codec.decode(e, m, ty, &name, Side::End, Role::Parameter, true) {
            args.push(expr);
        } else {
            let local = format!("{name}Value");
            codec.decode_into_local(e, m, ty, &name, Side::End, Role::Parameter, true, &local);
            args.push(local);
        }
        if offsets.contains(&param.name.as_str())
            && let Some(last) = args.last_mut()
        {
            *last = "0".to_string();
        }
    }
    let call = format!("{target}.{}({})", method.name(), args.join(", "));

    let ty = method.return_type();
    if method.has_out_params() {
        return_with_out_params(e, codec, method, &call, input);
        return;
    }
    if ty.is_void() {
        e.line(&format!("{call};"));
        if process {
            e.line("return null;");
        }
        return;
    }
    let declared = e.render_type(ty);
    e.line(&format!("{declared} result = {call};"));
    let m = &method.return_marshaller;
    if process {
        let output = rt::ty(rt::BINARY_OUTPUT);
        let claim = e.invoke_static_expr(&output, "claimBuffer", &[input.to_string()]);
        let output = e.render_type(&output);
        e.line(&format!("{output} {OUTPUT} = {claim};"));
        codec.write_batched(e, m, ty, "result", OUTPUT, Role::Result);
        e.line(&format!("return {OUTPUT};"));
    } else if m.is_custom() {
        let size = size_expression(vec![SizeTerm::Fixed(0), codec.size_term(e, m, ty, "result")]);
        let output = rt::ty(rt::BYTE_ARRAY_BINARY_OUTPUT);
        let create = e.invoke_static_expr(&output, "create", &[size]);
        let output = e.render_type(&output);
        e.line(&format!("{output} {OUTPUT} = {create};"));
        codec.write_batched(e, m, ty, "result", OUTPUT, Role::Result);
        let bytes = format!("{OUTPUT}.getArray()");
        let bytes = if codec.uses_jni(Side::End) {
            codec.jni_to_native(e, &bytes)
        } else {
            bytes
        };
        e.line(&format!("return {bytes};"));
    } else {
        let encoded = codec.encode_inline(e, m, ty, "result", Side::End, Role::Result);
        e.line(&format!("return {encoded};"));
    }
}

/// Calls the implementation and returns the result followed by the updated
/// `Out` values
fn return_with_out_params(e: &mut SourceEmitter<'_>, codec: &Codec, method: &MethodData, call: &str, input: &str) {
    let ty = method.return_type();
    let m = &method.return_marshaller;
    if ty.is_void() {
        e.line(&format!("{call};"));
    } else {
        let declared = e.render_type(ty);
        e.line(&format!("{declared} result = {call};"));
    }
    let process = codec.strategy().kind() == BoundaryKind::ProcessToProcess;
    if process {
        let output = rt::ty(rt::BINARY_OUTPUT);
        let claim = e.invoke_static_expr(&output, "claimBuffer", &[input.to_string()]);
        let output = e.render_type(&output);
        e.line(&format!("{output} {OUTPUT} = {claim};"));
    } else {
        let mut terms = vec![SizeTerm::Fixed(0)];
        if !ty.is_void() {
            terms.push(codec.size_term(e, m, ty, "result"));
        }
        for (param, out) in direction::out_params(method) {
            terms.push(direction::end_update_size(method, out, &param.ty, &parameter_name(&param.name)));
        }
        let output = rt::ty(rt::BYTE_ARRAY_BINARY_OUTPUT);
        let create = e.invoke_static_expr(&output, "create", &[size_expression(terms)]);
        let output = e.render_type(&output);
        e.line(&format!("{output} {OUTPUT} = {create};"));
    }
    if !ty.is_void() {
        codec.write_batched(e, m, ty, "result", OUTPUT, Role::Result);
    }
    for (param, out) in direction::out_params(method) {
        direction::end_write_update(e, method, out, &param.ty, &parameter_name(&param.name), OUTPUT);
    }
    if process {
        e.line(&format!("return {OUTPUT};"));
        return;
    }
    let bytes = format!("{OUTPUT}.getArray()");
    let bytes = if codec.uses_jni(Side::End) {
        codec.jni_to_native(e, &bytes)
    } else {
        bytes
    };
    e.line(&format!("return {bytes};"));
}

#[cfg(test)]
#[path = "end_point_tests.rs"]
mod end_point_tests;
