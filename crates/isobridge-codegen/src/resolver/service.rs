//! Resolution of service markers

use super::methods::ClassDirectives;
use super::{
    Findings, IGNORED_ANNOTATIONS, MarshallerLookup, check_annotated_type,
    check_marshaller_config, isolate_death, methods, service_type_of, type_attribute,
};
use crate::boundary::BoundaryKind;
use crate::model::{CustomDispatch, MarshallerData, ServiceDefinition};
use crate::runtime_types as rt;
use isobridge_core::{
    Annotated, AnnotationDecl, ElementId, MethodDecl, ParamDecl, TypeCache, TypeDecl, TypeRef,
    names,
};
use std::collections::BTreeMap;

pub(crate) fn resolve(
    types: &TypeCache,
    decl: &TypeDecl,
    kind: BoundaryKind,
    findings: &mut Findings,
) -> Option<ServiceDefinition> {
    let configuration = kind.configuration();
    let marker_type = configuration.service_marker.as_str();
    let marker = decl.annotation(marker_type)?;
    let element = decl.element_id();

    check_annotated_type(decl, marker_type, findings);
    let factory = resolve_factory_reference(types, decl, kind, marker, findings);
    let marshaller_config = factory
        .as_ref()
        .and_then(|(_, registration)| type_attribute(registration, "marshallers"));
    match (&factory, &marshaller_config) {
        (Some(_), Some(config)) => {
            check_marshaller_config(types, &element, marker_type, config, findings)
        }
        (Some((factory, _)), None) => findings.error(
            &element,
            Some(marker_type),
            format!(
                "Missing required attribute `marshallers` on factory `{}`.",
                factory.simple_name().unwrap_or_default()
            ),
        ),
        (None, _) => {}
    }

    let service_type = match service_type_of(decl) {
        Ok(service_type) => Some(service_type),
        Err(message) => {
            findings.error(&element, Some(marker_type), message);
            None
        }
    };

    let custom_dispatch = resolve_custom_dispatch(decl, service_type.as_ref(), findings);
    let implements_foreign_object = decl.interfaces.iter().any(|i| i.is_named(rt::FOREIGN_OBJECT));
    let foreign_object = names::simple_name_of(rt::FOREIGN_OBJECT);
    if custom_dispatch.is_none() && !implements_foreign_object {
        findings.error(
            &element,
            Some(marker_type),
            format!(
                "The annotated type must implement `{foreign_object}`, or have a custom dispatch.\n\
                 To fix this add `implements {foreign_object}` to `{}` or declare custom dispatch and receiver accessors.",
                decl.simple_name()
            ),
        );
    }
    if custom_dispatch.is_some() && implements_foreign_object {
        findings.error(
            &element,
            Some(marker_type),
            format!(
                "A class with a custom dispatch must not implement `{foreign_object}`.\n\
                 To fix this remove `{foreign_object}` from the implemented interfaces."
            ),
        );
    }

    let mutable = decl.has_annotation(rt::MUTABLE_PEER);
    if mutable && custom_dispatch.is_some() {
        findings.error(
            &element,
            Some(rt::MUTABLE_PEER),
            format!(
                "Classes with custom dispatch cannot have mutable peers. To fix this, remove the `@{}` annotation from the class.",
                names::simple_name_of(rt::MUTABLE_PEER)
            ),
        );
    }

    let constructor_params = single_constructor(decl, &element, marker_type, findings);

    let always_by_local_reference = always_by_reference(decl, rt::ALWAYS_BY_LOCAL_REFERENCE);
    let always_by_remote_reference = always_by_reference(decl, rt::ALWAYS_BY_REMOTE_REFERENCE);
    for duplicated in always_by_local_reference
        .keys()
        .filter(|name| always_by_remote_reference.contains_key(*name))
    {
        let local = names::simple_name_of(rt::ALWAYS_BY_LOCAL_REFERENCE);
        let remote = names::simple_name_of(rt::ALWAYS_BY_REMOTE_REFERENCE);
        let simple = names::simple_name_of(duplicated);
        findings.error(
            &element,
            Some(marker_type),
            format!(
                "Invalid combination of @`{local}` and @`{remote}` annotations for type `{simple}`. \
                 The type can be configured either as `{local}` or `{remote}`.\n\
                 To resolve this, remove either `@{local}({simple})` or `@{remote}({simple})`."
            ),
        );
    }

    let directives = ClassDirectives {
        idempotent: decl.has_annotation(rt::IDEMPOTENT),
        isolate_death_handler: isolate_death::resolve(types, &decl.name, decl, &element, findings),
    };
    let mut lookup = MarshallerLookup::new(types, kind)
        .with_always_by_reference(&always_by_local_reference, &always_by_remote_reference);
    let methods = methods::collect(
        types,
        decl,
        custom_dispatch.as_ref(),
        &directives,
        &mut lookup,
        findings,
    );

    let (factory, _) = factory?;
    Some(ServiceDefinition {
        kind,
        annotated: decl.clone(),
        service_type: service_type?,
        peer_type: configuration.peer_type.clone(),
        factory,
        mutable,
        methods,
        constructor_params,
        custom_dispatch,
        marshaller_config: marshaller_config?,
        throwable_marshaller: MarshallerData::throwable(),
        include: type_attribute(marker, "include"),
        ignore_annotations: IGNORED_ANNOTATIONS.iter().map(|a| a.to_string()).collect(),
        marshaller_annotations: lookup.into_marshaller_annotations(),
        isolate_death_handler: directives.isolate_death_handler.map(|handler| handler.ty),
        always_by_local_reference,
        always_by_remote_reference,
    })
}

/// `type` to `startPointClass` of every `annotation_type` on `decl`
fn always_by_reference(decl: &TypeDecl, annotation_type: &str) -> BTreeMap<String, TypeRef> {
    decl.annotations
        .iter()
        .filter(|a| a.annotation_type == annotation_type)
        .filter_map(|a| {
            let ty = type_attribute(a, "type")?;
            let target = type_attribute(a, "startPointClass")?;
            Some((ty.qualified_name()?.to_string(), target))
        })
        .collect()
}

/// The owning factory and the factory marker it carries
fn resolve_factory_reference<'t>(
    types: &'t TypeCache,
    decl: &TypeDecl,
    kind: BoundaryKind,
    marker: &AnnotationDecl,
    findings: &mut Findings,
) -> Option<(TypeRef, &'t AnnotationDecl)> {
    let element = decl.element_id();
    let marker_type = marker.annotation_type.as_str();
    let Some(factory) = type_attribute(marker, "factory") else {
        findings.error(
            &element,
            Some(marker_type),
            format!("Missing required attribute `factory` of `@{}`.", marker.simple_name()),
        );
        return None;
    };
    let factory_name = factory.qualified_name().unwrap_or_default();
    let factory_package = names::package_of(factory_name);
    if factory_package != decl.package() {
        findings.error(
            &element,
            Some(marker_type),
            format!(
                "Mismatched package definitions: service `{}` and factory `{}` must reside in the same package.\n\
                 To resolve this issue, move `{}` to the package `{}`.",
                decl.simple_name(),
                names::simple_name_of(factory_name),
                names::simple_name_of(factory_name),
                decl.package()
            ),
        );
    }
    let configuration = kind.configuration();
    let registration = types.get(factory_name).and_then(|factory_decl| {
        factory_decl
            .annotations
            .iter()
            .find(|a| configuration.accepts_factory_marker(&a.annotation_type))
    });
    if registration.is_none() {
        let required = names::simple_name_of(configuration.factory_marker());
        let factory_simple = names::simple_name_of(factory_name);
        findings.error(
            &element,
            Some(marker_type),
            format!(
                "Missing required annotation: Factory `{factory_simple}` must be annotated with `@{required}`.\n\
                 To resolve this, add `@{required}` to `{factory_simple}`."
            ),
        );
    }
    registration.map(|registration| (factory, registration))
}

fn single_constructor(
    decl: &TypeDecl,
    element: &ElementId,
    marker_type: &str,
    findings: &mut Findings,
) -> Vec<ParamDecl> {
    match decl.constructors.as_slice() {
        [] => Vec::new(),
        [only] => only.params.clone(),
        [first, ..] => {
            findings.error(
                element,
                Some(marker_type),
                "The annotated type must have a single constructor.\n\
                 Fix the ambiguity by removing constructor overloads.",
            );
            first.params.clone()
        }
    }
}

fn single_accessor<'d>(
    decl: &'d TypeDecl,
    marker: &str,
    findings: &mut Findings,
) -> Option<&'d MethodDecl> {
    let mut annotated = decl.methods.iter().filter(|m| m.has_annotation(marker));
    let first = annotated.next()?;
    for extra in annotated {
        findings.error(
            &ElementId::of_method(&decl.name, extra),
            Some(marker),
            format!(
                "Only a single method can be annotated by the `{}`.",
                names::simple_name_of(marker)
            ),
        );
    }
    Some(first)
}

fn resolve_custom_dispatch(
    decl: &TypeDecl,
    service_type: Option<&TypeRef>,
    findings: &mut Findings,
) -> Option<CustomDispatch> {
    let dispatch = single_accessor(decl, rt::CUSTOM_DISPATCH_ACCESSOR, findings);
    let receiver = single_accessor(decl, rt::CUSTOM_RECEIVER_ACCESSOR, findings);
    let element = decl.element_id();
    let accessor_shape =
        |m: &MethodDecl| m.is_static() && !m.is_private() && m.params.len() == 1;

    if let Some(dispatch) = dispatch {
        let returns_service = service_type
            .is_none_or(|service| dispatch.return_type.erasure() == service.erasure());
        if !accessor_shape(dispatch) || !returns_service {
            findings.error(
                &ElementId::of_method(&decl.name, dispatch),
                Some(rt::CUSTOM_DISPATCH_ACCESSOR),
                format!(
                    "A method annotated by `CustomDispatchAccessor` must be a non-private static method with a single parameter and `{}` return type.",
                    service_type.and_then(TypeRef::simple_name).unwrap_or("Object")
                ),
            );
        }
    }
    if let Some(receiver) = receiver
        && (!accessor_shape(receiver) || receiver.return_type.is_void())
    {
        findings.error(
            &ElementId::of_method(&decl.name, receiver),
            Some(rt::CUSTOM_RECEIVER_ACCESSOR),
            "A method annotated by `CustomReceiverAccessor` must be a non-private non-void static method with a single parameter.",
        );
    }

    match (dispatch, receiver) {
        (None, None) => None,
        (Some(_), None) => {
            findings.error(
                &element,
                Some(rt::CUSTOM_DISPATCH_ACCESSOR),
                "Classes with a custom dispatch accessor must also provide a custom receiver accessor.",
            );
            None
        }
        (None, Some(_)) => {
            findings.error(
                &element,
                Some(rt::CUSTOM_RECEIVER_ACCESSOR),
                "Class with a custom receiver accessor must also provide a custom dispatch accessor.",
            );
            None
        }
        (Some(dispatch), Some(receiver)) => {
            let dispatch_param = dispatch.params.first().map(|p| p.ty.erasure());
            let receiver_param = receiver.params.first().map(|p| p.ty.erasure());
            if dispatch_param != receiver_param {
                findings.error(
                    &ElementId::of_method(&decl.name, receiver),
                    Some(rt::CUSTOM_RECEIVER_ACCESSOR),
                    "The custom receiver accessor must have the same parameter type as the custom dispatch accessor.",
                );
            }
            Some(CustomDispatch {
                dispatch_accessor: dispatch.clone(),
                receiver_accessor: receiver.clone(),
                receiver_type: dispatch
                    .params
                    .first()
                    .map(|p| p.ty.clone())
                    .unwrap_or_else(|| TypeRef::declared(names::OBJECT)),
            })
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
