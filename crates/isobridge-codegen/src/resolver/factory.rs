//! Resolution of factory markers

use super::{
    Findings, check_annotated_type, check_marshaller_config, service_type_of, type_attribute,
    type_list_attribute,
};
use crate::boundary::BoundaryKind;
use crate::model::{FactoryDefinition, Implementation, ImplementationAccess, MarshallerData};
use isobridge_core::{Annotated, ElementId, TypeCache, TypeDecl, TypeRef, names};
use std::collections::BTreeSet;

pub(crate) fn resolve(
    types: &TypeCache,
    decl: &TypeDecl,
    kind: BoundaryKind,
    findings: &mut Findings,
) -> Option<FactoryDefinition> {
    let configuration = kind.configuration();
    let marker_type = configuration.factory_marker();
    let marker = decl.annotation(marker_type)?;
    let element = decl.element_id();

    check_annotated_type(decl, marker_type, findings);

    let marshaller_config = type_attribute(marker, "marshallers");
    match &marshaller_config {
        Some(config) => check_marshaller_config(types, &element, marker_type, config, findings),
        None => findings.error(
            &element,
            Some(marker_type),
            format!("Missing required attribute `marshallers` of `@{}`.", marker.simple_name()),
        ),
    }

    let initial_service = type_attribute(marker, "initialService");
    let initial_decl = match &initial_service {
        Some(initial) => check_initial_service(types, decl, kind, initial, findings),
        None => {
            findings.error(
                &element,
                Some(marker_type),
                format!(
                    "Missing required attribute `initialService` of `@{}`.",
                    marker.simple_name()
                ),
            );
            None
        }
    };

    let implementation = type_attribute(marker, "implementation")
        .and_then(|ty| resolve_implementation(types, decl, marker_type, ty, initial_decl, findings));

    let listed = type_list_attribute(marker, "services");
    let services = match (&initial_service, kind) {
        (Some(initial), BoundaryKind::ProcessToProcess) => {
            check_services(types, decl, kind, &listed, findings);
            let mut services = listed;
            if !services.contains(initial) {
                services.insert(0, initial.clone());
            }
            services
        }
        (_, BoundaryKind::ProcessToProcess) => listed,
        _ => {
            if !listed.is_empty() {
                findings.error(
                    &element,
                    Some(marker_type),
                    format!(
                        "The `services` attribute is supported only by `@{}`.",
                        names::simple_name_of(
                            BoundaryKind::ProcessToProcess.configuration().factory_marker()
                        )
                    ),
                );
            }
            Vec::new()
        }
    };

    let initial_service = initial_service?;
    let service_type = initial_decl
        .and_then(|initial| service_type_of(initial).ok())
        .unwrap_or_else(|| initial_service.clone());
    Some(FactoryDefinition {
        kind,
        annotated: decl.clone(),
        initial_service,
        service_type,
        implementation,
        marshaller_config: marshaller_config?,
        throwable_marshaller: MarshallerData::throwable(),
        include: type_attribute(marker, "include"),
        isolate_handler: type_attribute(marker, "isolateHandler"),
        services,
    })
}

/// The initial service lives next to the factory and is a service of a
/// kind this factory can serve
fn check_initial_service<'t>(
    types: &'t TypeCache,
    decl: &TypeDecl,
    kind: BoundaryKind,
    initial: &TypeRef,
    findings: &mut Findings,
) -> Option<&'t TypeDecl> {
    let element = decl.element_id();
    let marker_type = kind.configuration().factory_marker();
    let name = initial.qualified_name().unwrap_or_default();
    if names::package_of(name) != decl.package() {
        findings.error(
            &element,
            Some(marker_type),
            format!(
                "Mismatched package definitions: factory `{}` and initial service `{}` must reside in the same package.\n\
                 To resolve this issue, move `{}` to the package `{}`.",
                decl.simple_name(),
                names::simple_name_of(name),
                names::simple_name_of(name),
                decl.package()
            ),
        );
    }
    let initial_decl = types.get(name);
    let is_companion = initial_decl.is_some_and(|service| {
        BoundaryKind::ALL.iter().any(|candidate| {
            let candidate = candidate.configuration();
            candidate.accepts_factory_marker(marker_type)
                && service.has_annotation(&candidate.service_marker)
        })
    });
    if !is_companion {
        let required = names::simple_name_of(&kind.configuration().service_marker);
        findings.error(
            &element,
            Some(marker_type),
            format!(
                "Missing required annotation: Initial service `{}` must be annotated with `@{required}`.\n\
                 To resolve this, add `@{required}` to `{}`.",
                names::simple_name_of(name),
                names::simple_name_of(name)
            ),
        );
    }
    initial_decl
}

fn resolve_implementation(
    types: &TypeCache,
    decl: &TypeDecl,
    marker_type: &str,
    implementation: TypeRef,
    initial: Option<&TypeDecl>,
    findings: &mut Findings,
) -> Option<Implementation> {
    let element = decl.element_id();
    let name = implementation.qualified_name().unwrap_or_default().to_string();
    let Some(implementation_decl) = types.get(&name) else {
        tracing::debug!(implementation = %name, "implementation outside the round, assuming a constructor");
        return Some(Implementation {
            ty: implementation,
            access: ImplementationAccess::Constructor,
        });
    };

    let service_name = initial
        .and_then(|initial| service_type_of(initial).ok())
        .and_then(|service_type| service_type.qualified_name().map(str::to_string));
    if let Some(service_name) = service_name.as_deref()
        && !types.is_subtype(&name, service_name)
    {
        findings.error(
            &element,
            Some(marker_type),
            format!(
                "The class specified in `@{}.implementation` for `{}` registration must be assignable to `{}`.",
                names::simple_name_of(marker_type),
                decl.simple_name(),
                names::simple_name_of(service_name)
            ),
        );
    }

    let has_constructor = implementation_decl.constructors.is_empty()
        || implementation_decl
            .constructors
            .iter()
            .any(|c| c.params.is_empty() && !c.is_private());
    if has_constructor {
        return Some(Implementation {
            ty: implementation,
            access: ImplementationAccess::Constructor,
        });
    }
    let returns_instance = |ty: &TypeRef| match ty.qualified_name() {
        Some(returned) => {
            types.is_subtype(returned, &name)
                || service_name
                    .as_deref()
                    .is_some_and(|service| types.is_subtype(returned, service))
        }
        None => false,
    };
    let accessor = implementation_decl.methods.iter().find(|m| {
        m.is_static() && !m.is_private() && m.params.is_empty() && returns_instance(&m.return_type)
    });
    match accessor {
        Some(accessor) => Some(Implementation {
            ty: implementation,
            access: ImplementationAccess::StaticAccessor(accessor.name.clone()),
        }),
        None => {
            findings.error(
                &element,
                Some(marker_type),
                format!(
                    "The implementation `{}` must have a non-private no-argument constructor or a non-private static no-argument method returning an instance.",
                    names::simple_name_of(&name)
                ),
            );
            None
        }
    }
}

/// Every multiplexed service carries the process marker and names this factory
fn check_services(
    types: &TypeCache,
    decl: &TypeDecl,
    kind: BoundaryKind,
    services: &[TypeRef],
    findings: &mut Findings,
) {
    let element: ElementId = decl.element_id();
    let configuration = kind.configuration();
    let marker_type = configuration.factory_marker();
    let service_marker = &configuration.service_marker;
    let mut seen = BTreeSet::new();
    for service in services {
        let name = service.qualified_name().unwrap_or_default();
        if !seen.insert(name) {
            findings.error(
                &element,
                Some(marker_type),
                format!("Duplicate service `{}` in `services`.", names::simple_name_of(name)),
            );
            continue;
        }
        let owner = types
            .get(name)
            .and_then(|service_decl| service_decl.annotation(service_marker))
            .map(|marker| type_attribute(marker, "factory"));
        match owner {
            None => findings.error(
                &element,
                Some(marker_type),
                format!(
                    "The service `{}` must be annotated with `@{}`.",
                    names::simple_name_of(name),
                    names::simple_name_of(service_marker)
                ),
            ),
            Some(factory) if factory.as_ref().and_then(TypeRef::qualified_name) != Some(decl.name.as_str()) => {
                findings.error(
                    &element,
                    Some(marker_type),
                    format!(
                        "The service `{}` must name `{}` as its factory.",
                        names::simple_name_of(name),
                        decl.simple_name()
                    ),
                )
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod factory_tests;
