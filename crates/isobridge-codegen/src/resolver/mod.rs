//! Validation of annotated declarations into bridge definitions
//!
//! Resolution never fails hard. Every problem found is reported as a
//! diagnostic at the offending element, and the element is excluded from
//! generation once anything was reported against it.

mod factory;
mod isolate_death;
mod marshaller;
mod methods;
mod service;

use crate::boundary::BoundaryKind;
use crate::model::{FactoryDefinition, ServiceDefinition};
use crate::runtime_types as rt;
use isobridge_core::{
    Annotated, AnnotationDecl, CompilationContext, ElementId, TypeCache, TypeDecl, TypeKind,
    TypeRef, names,
};

pub(crate) use marshaller::MarshallerLookup;

/// Errors found while resolving, reported together once resolution is done
#[derive(Debug, Default)]
pub(crate) struct Findings {
    errors: Vec<(ElementId, Option<String>, String)>,
}

impl Findings {
    pub(crate) fn error(
        &mut self,
        element: &ElementId,
        marker: Option<&str>,
        message: impl Into<String>,
    ) {
        self.errors
            .push((element.clone(), marker.map(str::to_string), message.into()));
    }

    fn report(self, ctx: &mut CompilationContext) {
        for (element, marker, message) in self.errors {
            ctx.emit_error(&element, marker.as_deref(), message);
        }
    }
}

/// Resolve the service marker of `kind` on `decl`
pub fn resolve_service(
    ctx: &mut CompilationContext,
    decl: &TypeDecl,
    kind: BoundaryKind,
) -> Option<ServiceDefinition> {
    let mut findings = Findings::default();
    let definition = service::resolve(ctx.types(), decl, kind, &mut findings);
    findings.report(ctx);
    if ctx.has_errors(&decl.element_id()) {
        tracing::debug!(element = %decl.name, %kind, "service definition rejected");
        return None;
    }
    definition
}

/// Resolve the factory marker of `kind` on `decl`
pub fn resolve_factory(
    ctx: &mut CompilationContext,
    decl: &TypeDecl,
    kind: BoundaryKind,
) -> Option<FactoryDefinition> {
    let mut findings = Findings::default();
    let definition = factory::resolve(ctx.types(), decl, kind, &mut findings);
    findings.report(ctx);
    if ctx.has_errors(&decl.element_id()) {
        tracing::debug!(element = %decl.name, %kind, "factory definition rejected");
        return None;
    }
    definition
}

/// Register the messages `ExpectError` markers on `decl` and its methods predict
pub fn register_expected_errors(ctx: &mut CompilationContext, decl: &TypeDecl) {
    if let Some(expect) = decl.annotation(rt::EXPECT_ERROR) {
        let patterns: Vec<String> = expect.str_list("value").into_iter().map(str::to_string).collect();
        ctx.expect_errors(decl.element_id(), patterns);
    }
    for method in &decl.methods {
        if let Some(expect) = method.annotation(rt::EXPECT_ERROR) {
            let patterns: Vec<String> =
                expect.str_list("value").into_iter().map(str::to_string).collect();
            ctx.expect_errors(ElementId::of_method(&decl.name, method), patterns);
        }
    }
}

/// Annotations that steer generation and are never copied or used for
/// marshaller lookup
pub const IGNORED_ANNOTATIONS: &[&str] = &[
    rt::OVERRIDE,
    rt::SUPPRESS_WARNINGS,
    rt::BY_REFERENCE,
    rt::BY_PEER_REFERENCE,
    rt::RAW_REFERENCE,
    rt::CUSTOM_DISPATCH_ACCESSOR,
    rt::CUSTOM_RECEIVER_ACCESSOR,
    rt::MUTABLE_PEER,
    rt::EXPECT_ERROR,
    rt::IDEMPOTENT,
    rt::IN,
    rt::OUT,
    rt::ISOLATE_DEATH_HANDLER,
    rt::ALWAYS_BY_LOCAL_REFERENCE,
    rt::ALWAYS_BY_REMOTE_REFERENCE,
];

pub(crate) fn is_ignored(annotation: &AnnotationDecl) -> bool {
    IGNORED_ANNOTATIONS.contains(&annotation.annotation_type.as_str())
}

/// A type-valued annotation attribute
pub(crate) fn type_attribute(annotation: &AnnotationDecl, key: &str) -> Option<TypeRef> {
    annotation.str_value(key).and_then(|value| value.parse().ok())
}

/// A list of type-valued annotation attributes
pub(crate) fn type_list_attribute(annotation: &AnnotationDecl, key: &str) -> Vec<TypeRef> {
    annotation
        .str_list(key)
        .into_iter()
        .filter_map(|value| value.parse().ok())
        .collect()
}

/// Only top-level classes may carry bridge markers
pub(crate) fn check_annotated_type(decl: &TypeDecl, marker: &str, findings: &mut Findings) {
    let element = decl.element_id();
    if decl.kind != TypeKind::Class {
        findings.error(
            &element,
            Some(marker),
            "The annotation is supported only on type declarations.",
        );
    }
    if !decl.is_top_level() {
        findings.error(
            &element,
            Some(marker),
            format!(
                "Annotation is supported only on top-level types.\nTo fix this make the `{}` a top-level class.",
                decl.simple_name()
            ),
        );
    }
}

/// The marshaller configuration must expose `static MarshallerConfig getInstance()`
pub(crate) fn check_marshaller_config(
    types: &TypeCache,
    element: &ElementId,
    marker: &str,
    config: &TypeRef,
    findings: &mut Findings,
) {
    let Some(name) = config.qualified_name() else {
        findings.error(element, Some(marker), format!("Invalid marshaller configuration `{config}`."));
        return;
    };
    let has_accessor = types.get(name).is_some_and(|decl| {
        decl.methods_named("getInstance").any(|method| {
            method.is_static()
                && !method.is_private()
                && method.params.is_empty()
                && (method.return_type.is_named(rt::MARSHALLER_CONFIG)
                    || method.return_type.is_named(name))
        })
    });
    if !has_accessor {
        findings.error(
            element,
            Some(marker),
            format!(
                "Marshaller config must have a non-private static `getInstance()` method returning `MarshallerConfig`.\n\
                 The `getInstance` method is used by the generated code to look up marshallers.\n\
                 To fix this add `static MarshallerConfig getInstance() {{ return INSTANCE;}}` into `{}`.",
                names::simple_name_of(name)
            ),
        );
    }
}

/// The logical service type: a non-`Object` superclass or the single interface
pub(crate) fn service_type_of(decl: &TypeDecl) -> Result<TypeRef, String> {
    let interfaces: Vec<&TypeRef> = decl
        .interfaces
        .iter()
        .filter(|i| !i.is_named(rt::FOREIGN_OBJECT))
        .collect();
    let superclass = decl
        .superclass
        .as_ref()
        .filter(|s| !s.is_named(names::OBJECT));
    let fix = match (superclass, interfaces.as_slice()) {
        (Some(superclass), []) => return Ok(superclass.clone()),
        (None, [single]) => return Ok((*single).clone()),
        (Some(superclass), more) => format!(
            "To fix this introduce a new bridged base class extending `{}` and implementing {} and extend it.",
            superclass.simple_name().unwrap_or_default(),
            quoted_simple_names(more)
        ),
        (None, []) => "To fix this implement the bridged interface or extend the bridged class.".to_string(),
        (None, more) => format!(
            "To fix this introduce a new bridged interface extending {} and implement it.",
            quoted_simple_names(more)
        ),
    };
    Err(format!(
        "The annotated type must have a non `Object` superclass or implement a single interface.\n{fix}"
    ))
}

fn quoted_simple_names(types: &[&TypeRef]) -> String {
    types
        .iter()
        .filter_map(|t| t.simple_name())
        .map(|s| format!("`{s}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
