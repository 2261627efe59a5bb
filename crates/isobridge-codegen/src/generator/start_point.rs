//! Start points: subclasses of the annotated type performing the crossing

use super::marshal::{Codec, Role, Side, SizeTerm, size_expression};
use super::{
    GenerationPlan, binary_name, direction, marshaller_fields, method_descriptor, process,
    service_marshallers,
};
use crate::boundary::BoundaryKind;
use crate::model::{CacheData, MethodData, ServiceDefinition, gen_qualified_name};
use crate::resolver::is_ignored;
use crate::runtime_types as rt;
use crate::strategy::parameter_name;
use isobridge_core::{AnnotationDecl, AnnotationValue, Modifier, TypeRef, names};
use isobridge_emit::{Parameter, SourceEmitter};

const OUTPUT: &str = "marshalledParametersOutput";

/// Constructor parameters of the annotated type followed by the peer
pub(super) fn factory_params(service: &ServiceDefinition) -> Vec<Parameter> {
    let mut params: Vec<Parameter> = service
        .constructor_params
        .iter()
        .map(|p| Parameter::new(p.ty.clone(), parameter_name(&p.name)))
        .collect();
    if !service.has_custom_dispatch() {
        params.extend(service.kind.configuration().peer_constructor_params.iter().cloned());
    }
    params
}

fn argument_list(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `static Annotated create(..., Peer peer)`
pub(super) fn factory_method(e: &mut SourceEmitter<'_>, service: &ServiceDefinition, plan: &GenerationPlan) {
    let params = factory_params(service);
    e.member_break();
    e.method_start(
        "static",
        Some(&service.annotated.as_type()),
        &plan.factory_method,
        &params,
        &[],
    );
    e.line(&format!("return new {}({});", plan.start_point, argument_list(&params)));
    e.method_end();
}

/// The nested start-point class
pub(super) fn emit(
    e: &mut SourceEmitter<'_>,
    service: &ServiceDefinition,
    plan: &GenerationPlan,
    branch: Option<&ServiceDefinition>,
) {
    let annotated = service.annotated.as_type();
    e.member_break();
    if service.annotated.is_interface() {
        e.class_start("private static final", &plan.start_point, None, std::slice::from_ref(&annotated));
    } else {
        e.class_start("private static final", &plan.start_point, Some(&annotated), &[]);
    }
    marshaller_fields(e, &service.marshaller_config, &service_marshallers(service));
    peer_members(e, service, plan);
    cache_fields(e, service);

    for (index, method) in service.methods.iter().enumerate() {
        let branch = branch.and_then(|partner| partner.methods.get(index));
        e.member_break();
        override_head(e, service, method);
        let Some(cache) = &method.cache else {
            crossing_body(e, service, method, plan, branch);
            e.method_end();
            continue;
        };
        cached_body(e, service, method, cache);
        e.method_end();
        e.member_break();
        let decl = &method.method;
        e.method_start(
            "private",
            Some(&decl.return_type),
            &uncached_name(method),
            &override_params(method),
            &decl.throws,
        );
        crossing_body(e, service, method, plan, branch);
        e.method_end();
    }

    match service.kind {
        BoundaryKind::ManagedToNative => {
            let codec = Codec::new(service.kind);
            for method in &service.methods {
                let signature = method.entry_signature(codec.strategy());
                e.member_break();
                e.method_declaration(
                    "private static native",
                    &signature.return_type,
                    &signature.name,
                    &signature.params,
                );
            }
        }
        BoundaryKind::NativeToManaged => {
            for method in &service.methods {
                jni_call_helper(e, service, plan, method);
            }
        }
        _ => {}
    }
    e.class_end();
}

/// Receiver lookup of a custom dispatch followed by the crossing itself
fn crossing_body(
    e: &mut SourceEmitter<'_>,
    service: &ServiceDefinition,
    method: &MethodData,
    plan: &GenerationPlan,
    branch: Option<&MethodData>,
) {
    if let Some(dispatch) = &service.custom_dispatch {
        let receiver = receiver_name(method);
        let peer_type = e.render_type(&service.peer_type);
        let peer = e.invoke_static_expr(
            &service.annotated.as_type(),
            &dispatch.receiver_accessor.name,
            &[receiver],
        );
        e.line(&format!("{peer_type} peer = ({peer_type}) {peer};"));
    }
    match service.kind {
        BoundaryKind::ManagedToNative => to_native_body(e, service, method, plan, branch),
        BoundaryKind::NativeToNative => native_to_native_body(e, service, method, plan),
        BoundaryKind::NativeToManaged => native_to_managed_body(e, service, method),
        BoundaryKind::ProcessToProcess => process_body(e, service, method),
    }
}

fn receiver_name(method: &MethodData) -> String {
    method
        .receiver_param()
        .map(|p| parameter_name(&p.name))
        .unwrap_or_default()
}

fn uncached_name(method: &MethodData) -> String {
    format!("{}Uncached", method.name())
}

/// One field per idempotent method; a custom dispatch caches per receiver
fn cache_fields(e: &mut SourceEmitter<'_>, service: &ServiceDefinition) {
    let caches: Vec<&CacheData> = service.methods.iter().filter_map(|m| m.cache.as_ref()).collect();
    if caches.is_empty() {
        return;
    }
    e.member_break();
    for cache in caches {
        if service.has_custom_dispatch() {
            let map = TypeRef::generic(
                "java.util.Map",
                vec![TypeRef::declared(names::OBJECT), cache.ty.clone()],
            );
            let weak = format!("new {}<>()", e.render_type(&TypeRef::declared("java.util.WeakHashMap")));
            let init = e.invoke_static_expr(&TypeRef::declared("java.util.Collections"), "synchronizedMap", &[weak]);
            e.field("private final", &map, &cache.field_name, Some(&init));
        } else {
            e.field("private volatile", &cache.ty, &cache.field_name, None);
        }
    }
}

/// Returns the cached result, crossing only on a miss
fn cached_body(e: &mut SourceEmitter<'_>, service: &ServiceDefinition, method: &MethodData, cache: &CacheData) {
    let field = &cache.field_name;
    let local = format!("{field}Result");
    let boxed = e.render_type(&cache.ty);
    let args: Vec<String> = override_params(method).into_iter().map(|p| p.name).collect();
    let call = format!("{}({})", uncached_name(method), args.join(", "));
    let (read, store) = if service.has_custom_dispatch() {
        let receiver = receiver_name(method);
        (
            format!("{field}.get({receiver})"),
            format!("{field}.put({receiver}, {local});"),
        )
    } else {
        (field.clone(), format!("{field} = {local};"))
    };
    e.line(&format!("{boxed} {local} = {read};"));
    e.line(&format!("if ({local} == null) {{"));
    e.indent();
    e.line(&format!("{local} = {call};"));
    e.line(&store);
    e.dedent();
    e.line("}");
    e.line(&format!("return {local};"));
}

fn peer_members(e: &mut SourceEmitter<'_>, service: &ServiceDefinition, plan: &GenerationPlan) {
    let mut constructor_params: Vec<Parameter> = service
        .constructor_params
        .iter()
        .map(|p| Parameter::new(p.ty.clone(), parameter_name(&p.name)))
        .collect();
    let super_args = argument_list(&constructor_params);
    let with_peer = !service.has_custom_dispatch();
    let peer_type = &service.peer_type;
    if with_peer {
        e.member_break();
        let modifiers = if service.mutable { "private" } else { "private final" };
        e.field(modifiers, peer_type, "peer", None);
        constructor_params.push(Parameter::new(peer_type.clone(), "peer"));
    }

    e.member_break();
    e.method_start("", None, &plan.start_point, &constructor_params, &[]);
    if !super_args.is_empty() {
        e.line(&format!("super({super_args});"));
    }
    if with_peer {
        e.line("this.peer = peer;");
    }
    e.method_end();

    if !with_peer {
        return;
    }
    let override_type = rt::ty(rt::OVERRIDE);
    e.member_break();
    e.annotation(&override_type, &[]);
    e.method_start("public", Some(peer_type), "getPeer", &[], &[]);
    e.line("return peer;");
    e.method_end();
    if service.mutable {
        let peer = rt::ty(rt::PEER);
        e.member_break();
        e.annotation(&override_type, &[]);
        e.method_start("public", Some(&TypeRef::Void), "setPeer", &[Parameter::new(peer, "peer")], &[]);
        let cast = e.render_type(peer_type);
        e.line(&format!("this.peer = ({cast}) peer;"));
        e.method_end();
    }
}

fn annotation_value(e: &SourceEmitter<'_>, value: &AnnotationValue) -> String {
    match value {
        AnnotationValue::Bool(value) => value.to_string(),
        AnnotationValue::Int(value) => value.to_string(),
        AnnotationValue::Str(value) => e.string_literal(value),
        AnnotationValue::List(items) => {
            let items: Vec<String> = items.iter().map(|item| annotation_value(e, item)).collect();
            format!("{{{}}}", items.join(", "))
        }
    }
}

fn copied_annotation(e: &mut SourceEmitter<'_>, annotation: &AnnotationDecl) {
    let attributes: Vec<(&str, String)> = annotation
        .values
        .iter()
        .map(|(key, value)| (key.as_str(), annotation_value(e, value)))
        .collect();
    e.annotation(&TypeRef::declared(annotation.annotation_type.clone()), &attributes);
}

/// Copied annotations, `@Override` and the method head
fn override_head(e: &mut SourceEmitter<'_>, service: &ServiceDefinition, method: &MethodData) {
    let decl = &method.method;
    for annotation in &decl.annotations {
        let name = &annotation.annotation_type;
        if is_ignored(annotation)
            || service.ignore_annotations.contains(name)
            || service.marshaller_annotations.contains(name)
        {
            continue;
        }
        copied_annotation(e, annotation);
    }
    e.annotation(&rt::ty(rt::OVERRIDE), &[]);
    let modifiers = if decl.has_modifier(Modifier::Public) {
        "public"
    } else if decl.has_modifier(Modifier::Protected) {
        "protected"
    } else {
        ""
    };
    let params = override_params(method);
    e.method_start(modifiers, Some(&decl.return_type), &decl.name, &params, &decl.throws);
}

fn override_params(method: &MethodData) -> Vec<Parameter> {
    method
        .method
        .params
        .iter()
        .map(|p| Parameter::new(p.ty.clone(), parameter_name(&p.name)))
        .collect()
}

/// Payload size expression of the batched parameters plus `extra` bytes
fn payload_size(e: &mut SourceEmitter<'_>, codec: &Codec, method: &MethodData, extra: usize) -> String {
    let mut terms = vec![SizeTerm::Fixed(extra)];
    for (param, m) in method.marshalled_params() {
        let name = parameter_name(&param.name);
        if m.has_direction() {
            terms.push(direction::start_size(m, &param.ty, &name));
        } else if codec.strategy().is_batched(m, &param.ty) {
            terms.push(codec.size_term(e, m, &param.ty, &name));
        }
    }
    size_expression(terms)
}

fn write_params(e: &mut SourceEmitter<'_>, codec: &Codec, method: &MethodData) {
    for (param, m) in method.marshalled_params() {
        let name = parameter_name(&param.name);
        if m.has_direction() {
            direction::start_write(e, m, &param.ty, &name, OUTPUT);
        } else if codec.strategy().is_batched(m, &param.ty) {
            codec.write_batched(e, m, &param.ty, &name, OUTPUT, Role::Parameter);
        }
    }
}

fn inline_args(e: &mut SourceEmitter<'_>, codec: &Codec, method: &MethodData) -> Vec<String> {
    method
        .marshalled_params()
        .filter(|(param, m)| !codec.strategy().is_batched(m, &param.ty))
        .map(|(param, m)| {
            codec.encode_inline(e, m, &param.ty, &parameter_name(&param.name), Side::Start, Role::Parameter)
        })
        .collect()
}

/// `ByteArrayBinaryOutput marshalledParametersOutput = ...` and the writes
fn byte_array_payload(e: &mut SourceEmitter<'_>, codec: &Codec, method: &MethodData, extra: usize) {
    let size = payload_size(e, codec, method, extra);
    let output = rt::ty(rt::BYTE_ARRAY_BINARY_OUTPUT);
    let create = e.invoke_static_expr(&output, "create", &[size]);
    let output = e.render_type(&output);
    e.line(&format!("{output} {OUTPUT} = {create};"));
}

/// `BinaryInput marshalledResultInput` over the bytes in `endResult`
fn result_input(e: &mut SourceEmitter<'_>, codec: &Codec) {
    let bytes = if codec.uses_jni(Side::Start) {
        codec.jni_to_managed(e, "endResult")
    } else {
        "endResult".to_string()
    };
    let input = rt::ty(rt::BINARY_INPUT);
    let create = e.invoke_static_expr(&input, "create", &[bytes]);
    let input = e.render_type(&input);
    e.line(&format!("{input} marshalledResultInput = {create};"));
}

/// Reads the result, copies the updated `Out` values back and returns
fn finish_out_params(e: &mut SourceEmitter<'_>, codec: &Codec, method: &MethodData, input: &str) {
    let ty = method.return_type();
    let m = &method.return_marshaller;
    if !ty.is_void() {
        let raw = codec.read_batched(m, ty, input);
        if m.is_custom() || codec.is_identity(m, ty, Side::Start, Role::Result, false) {
            let declared = e.render_type(ty);
            e.line(&format!("{declared} result = {raw};"));
        } else {
            codec.decode_into_local(e, m, ty, &raw, Side::Start, Role::Result, false, "result");
        }
    }
    for (param, m) in direction::out_params(method) {
        direction::start_copy_back(e, m, &param.ty, &parameter_name(&param.name), input);
    }
    if !ty.is_void() {
        e.line("return result;");
    }
}

/// Statement performing `call` and returning its decoded result
fn emit_call(e: &mut SourceEmitter<'_>, codec: &Codec, method: &MethodData, call: &str, raw_type: &TypeRef) {
    let ty = method.return_type();
    let m = &method.return_marshaller;
    if method.has_out_params() {
        let raw = e.render_type(raw_type);
        e.line(&format!("{raw} endResult = {call};"));
        result_input(e, codec);
        finish_out_params(e, codec, method, "marshalledResultInput");
        return;
    }
    if ty.is_void() {
        e.line(&format!("{call};"));
        return;
    }
    if !m.is_custom() && codec.is_identity(m, ty, Side::Start, Role::Result, true) {
        e.line(&format!("return {call};"));
        return;
    }
    let raw = e.render_type(raw_type);
    e.line(&format!("{raw} endResult = {call};"));
    if m.is_custom() {
        result_input(e, codec);
        e.line(&format!("return {};", codec.read_batched(m, ty, "marshalledResultInput")));
    } else {
        return_decoded(e, codec, method, "endResult", true);
    }
}

fn return_decoded(e: &mut SourceEmitter<'_>, codec: &Codec, method: &MethodData, raw: &str, inline: bool) {
    let (m, ty) = (&method.return_marshaller, method.return_type());
    match codec.decode(e, m, ty, raw, Side::Start, Role::Result, inline) {
        Some(expr) => {
            e.line(&format!("return {expr};"));
        }
        None => {
            codec.decode_into_local(e, m, ty, raw, Side::Start, Role::Result, inline, "result");
            e.line("return result;");
        }
    }
}

/// `isolate.enter()` followed by an open `try {`
fn enter_isolate(e: &mut SourceEmitter<'_>, isolate_type: &str, thread_type: &str) {
    let isolate = e.render_type(&rt::ty(isolate_type));
    let thread = e.render_type(&rt::ty(thread_type));
    e.line(&format!("{isolate} isolate = peer.getIsolate();"));
    e.line(&format!("{thread} isolateThread = isolate.enter();"));
    e.line("try {");
    e.indent();
}

/// Closes [`enter_isolate`], rethrowing foreign exceptions
fn leave_isolate(e: &mut SourceEmitter<'_>, service: &ServiceDefinition) {
    leave_isolate_handling_death(e, service, None);
}

/// [`leave_isolate`] first handing a dying isolate to the method's handler
fn leave_isolate_handling_death(e: &mut SourceEmitter<'_>, service: &ServiceDefinition, method: Option<&MethodData>) {
    let foreign = e.render_type(&rt::ty(rt::FOREIGN_EXCEPTION));
    e.dedent();
    let handled = method.and_then(|m| m.isolate_death_handler.as_ref().map(|handler| (m, handler)));
    if let Some((method, handler)) = handled {
        let death = e.render_type(&rt::ty(rt::ISOLATE_DEATH_EXCEPTION));
        let receiver = if service.has_custom_dispatch() {
            receiver_name(method)
        } else {
            "this".to_string()
        };
        let handle = e.invoke_static_expr(
            handler,
            "handleIsolateDeath",
            &[receiver, "isolateDeathException".to_string()],
        );
        e.line(&format!("}} catch ({death} isolateDeathException) {{"));
        e.indent();
        e.line(&format!("{handle};"));
        e.line("throw new AssertionError(\"Should not reach here.\");");
        e.dedent();
    }
    e.line(&format!("}} catch ({foreign} foreignException) {{"));
    e.indent();
    e.line(&format!(
        "throw foreignException.throwOriginalException(isolate, {});",
        service.throwable_marshaller.field_name()
    ));
    e.dedent();
    e.line("} finally {");
    e.indent();
    e.line("isolateThread.leave();");
    e.dedent();
    e.line("}");
}

fn to_native_body(
    e: &mut SourceEmitter<'_>,
    service: &ServiceDefinition,
    method: &MethodData,
    plan: &GenerationPlan,
    branch: Option<&MethodData>,
) {
    enter_isolate(e, rt::NATIVE_ISOLATE, rt::NATIVE_ISOLATE_THREAD);
    match branch {
        Some(direct) => {
            let in_image = e.invoke_static_expr(&rt::ty(rt::IMAGE_INFO), "inImageCode", &[]);
            e.line(&format!("if ({in_image}) {{"));
            e.indent();
            direct_call(e, direct, plan);
            e.dedent();
            e.line("} else {");
            e.indent();
            native_method_call(e, method);
            e.dedent();
            e.line("}");
        }
        None => native_method_call(e, method),
    }
    leave_isolate(e, service);
}

/// Call through the native method declared by the start point
fn native_method_call(e: &mut SourceEmitter<'_>, method: &MethodData) {
    let codec = Codec::new(BoundaryKind::ManagedToNative);
    let signature = method.entry_signature(codec.strategy());
    let mut args = vec![
        "isolateThread.getIsolateThreadId()".to_string(),
        "peer.getHandle()".to_string(),
    ];
    args.extend(inline_args(e, &codec, method));
    if signature.payload {
        byte_array_payload(e, &codec, method, 0);
        write_params(e, &codec, method);
        args.push(format!("{OUTPUT}.getArray()"));
    }
    let call = format!("{}({})", signature.name, args.join(", "));
    emit_call(e, &codec, method, &call, &signature.return_type);
}

/// Call of the end point in the same image, passing the payload by address
fn direct_call(e: &mut SourceEmitter<'_>, method: &MethodData, plan: &GenerationPlan) {
    let codec = Codec::new(BoundaryKind::NativeToNative);
    let signature = method.end_signature(codec.strategy());
    let mut args = vec![
        "isolateThread.getIsolateThread()".to_string(),
        "peer.getHandle()".to_string(),
    ];
    args.extend(inline_args(e, &codec, method));
    if !signature.payload {
        let call = format!("{}.{}({})", plan.end_point, signature.name, args.join(", "));
        emit_call(e, &codec, method, &call, &signature.return_type);
        return;
    }
    let size = payload_size(e, &codec, method, 0);
    let output = rt::ty(rt::CCHAR_POINTER_BINARY_OUTPUT);
    let create = e.invoke_static_expr(&output, "create", &[size]);
    let output = e.render_type(&output);
    e.line(&format!("try ({output} {OUTPUT} = {create}) {{"));
    e.indent();
    write_params(e, &codec, method);
    args.push(format!("{OUTPUT}.getAddress()"));
    let call = format!("{}.{}({})", plan.end_point, signature.name, args.join(", "));
    emit_call(e, &codec, method, &call, &signature.return_type);
    e.dedent();
    e.line("}");
}

fn native_to_native_body(
    e: &mut SourceEmitter<'_>,
    service: &ServiceDefinition,
    method: &MethodData,
    plan: &GenerationPlan,
) {
    enter_isolate(e, rt::NATIVE_ISOLATE, rt::NATIVE_ISOLATE_THREAD);
    direct_call(e, method, plan);
    leave_isolate(e, service);
}

fn native_to_managed_body(e: &mut SourceEmitter<'_>, service: &ServiceDefinition, method: &MethodData) {
    let codec = Codec::new(BoundaryKind::NativeToManaged);
    let signature = method.entry_signature(codec.strategy());
    let env = rt::ty(rt::JNI_ENV);
    let scope_env = e.invoke_static_expr(&rt::ty(rt::JNI_METHOD_SCOPE), "env", &[]);
    let env = e.render_type(&env);
    e.line(&format!("{env} jniEnv = {scope_env};"));
    e.line("try {");
    e.indent();
    let mut args = vec!["jniEnv".to_string(), "peer.getHandle()".to_string()];
    args.extend(inline_args(e, &codec, method));
    if signature.payload {
        byte_array_payload(e, &codec, method, 0);
        write_params(e, &codec, method);
        let bytes = codec.jni_to_native(e, &format!("{OUTPUT}.getArray()"));
        args.push(bytes);
    }
    let call = format!("{}({})", signature.name, args.join(", "));
    emit_call(e, &codec, method, &call, &signature.return_type);
    let foreign = e.render_type(&rt::ty(rt::FOREIGN_EXCEPTION));
    e.dedent();
    e.line(&format!("}} catch ({foreign} foreignException) {{"));
    e.indent();
    e.line(&format!(
        "throw foreignException.throwOriginalException({});",
        service.throwable_marshaller.field_name()
    ));
    e.dedent();
    e.line("}");
}

/// `private static R add0(JNIEnv jniEnv, long handle, ...)` calling the
/// managed end point through JNI
fn jni_call_helper(e: &mut SourceEmitter<'_>, service: &ServiceDefinition, plan: &GenerationPlan, method: &MethodData) {
    let codec = Codec::new(BoundaryKind::NativeToManaged);
    let entry = method.entry_signature(codec.strategy());
    let end = method.end_signature(codec.strategy());
    let class = binary_name(&format!(
        "{}.{}",
        gen_qualified_name(&service.annotated.name),
        plan.end_point
    ))
    .replace('.', "/");
    let descriptor = method_descriptor(&end.params, &end.return_type);
    let variant = match &entry.return_type {
        TypeRef::Void => "Void".to_string(),
        TypeRef::Primitive(primitive) => primitive.capitalized().to_string(),
        _ => "JObject".to_string(),
    };
    let mut args = vec![
        "jniEnv".to_string(),
        e.string_literal(&class),
        e.string_literal(&end.name),
        e.string_literal(&descriptor),
    ];
    args.extend(entry.params.iter().skip(1).map(|p| p.name.clone()));

    e.member_break();
    e.method_start("private static", Some(&entry.return_type), &entry.name, &entry.params, &[]);
    let calls = e.invoke_static_expr(&rt::ty(rt::JNI_CALLS), "getDefault", &[]);
    let call = format!("{calls}.callStatic{variant}({})", args.join(", "));
    match &entry.return_type {
        TypeRef::Void => {
            e.line(&format!("{call};"));
        }
        ty if variant == "JObject" && !ty.is_named(rt::JOBJECT) => {
            let cast = e.render_type(ty);
            e.line(&format!("return ({cast}) {call};"));
        }
        _ => {
            e.line(&format!("return {call};"));
        }
    }
    e.method_end();
}

fn process_body(e: &mut SourceEmitter<'_>, service: &ServiceDefinition, method: &MethodData) {
    let codec = Codec::new(BoundaryKind::ProcessToProcess);
    enter_isolate(e, rt::PROCESS_ISOLATE, rt::PROCESS_ISOLATE_THREAD);
    byte_array_payload(e, &codec, method, 4 + 8);
    e.line(&format!(
        "{OUTPUT}.writeInt({} | {});",
        process::SERVICE_SCOPE,
        process::message_id_name(&codec, method)
    ));
    e.line(&format!("{OUTPUT}.writeLong(peer.getHandle());"));
    write_params(e, &codec, method);
    let send = format!("isolateThread.sendAndReceive({OUTPUT})");
    let ty = method.return_type();
    if method.has_out_params() {
        let input = e.render_type(&rt::ty(rt::BINARY_INPUT));
        e.line(&format!("{input} marshalledResultInput = {send};"));
        finish_out_params(e, &codec, method, "marshalledResultInput");
    } else if ty.is_void() {
        e.line(&format!("{send};"));
    } else {
        let input = e.render_type(&rt::ty(rt::BINARY_INPUT));
        e.line(&format!("{input} marshalledResultInput = {send};"));
        let m = &method.return_marshaller;
        let raw = codec.read_batched(m, ty, "marshalledResultInput");
        if m.is_custom() || codec.is_identity(m, ty, Side::Start, Role::Result, false) {
            e.line(&format!("return {raw};"));
        } else {
            return_decoded(e, &codec, method, &raw, false);
        }
    }
    leave_isolate_handling_death(e, service, Some(method));
}

#[cfg(test)]
#[path = "start_point_tests.rs"]
mod start_point_tests;
