//! Isolate death handlers named by `IsolateDeathHandler`

use super::{Findings, type_attribute};
use crate::runtime_types as rt;
use isobridge_core::{Annotated, ElementId, MethodDecl, TypeCache, TypeRef, names};

const HANDLER_METHOD: &str = "handleIsolateDeath";
const RUNTIME_EXCEPTION: &str = "java.lang.RuntimeException";
const ERROR: &str = "java.lang.Error";

/// A resolved handler class and the checked exceptions its method throws
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IsolateDeathHandler {
    pub(crate) ty: TypeRef,
    pub(crate) checked_exceptions: Vec<TypeRef>,
}

/// The handler `annotated` names, if it carries `IsolateDeathHandler`
///
/// The handler class must declare
/// `static void handleIsolateDeath(<receiver>, IsolateDeathException)`
/// whose receiver parameter accepts instances of `owner`.
pub(crate) fn resolve(
    types: &TypeCache,
    owner: &str,
    annotated: &impl Annotated,
    element: &ElementId,
    findings: &mut Findings,
) -> Option<IsolateDeathHandler> {
    let annotation = annotated.annotation(rt::ISOLATE_DEATH_HANDLER)?;
    let Some(handler) = type_attribute(annotation, "value") else {
        findings.error(
            element,
            Some(rt::ISOLATE_DEATH_HANDLER),
            "Missing required attribute `value` of `@IsolateDeathHandler`.",
        );
        return None;
    };
    let handler_name = handler.qualified_name().unwrap_or_default();
    let found = types
        .get(handler_name)
        .and_then(|decl| decl.methods_named(HANDLER_METHOD).find(|m| is_handler_method(types, owner, m)));
    let Some(method) = found else {
        findings.error(
            element,
            Some(rt::ISOLATE_DEATH_HANDLER),
            format!(
                "The class specified in the `@IsolateDeathHandler` annotation must declare an accessible static void method named `{HANDLER_METHOD}`. \
                 This method must accept two parameters: the receiver object and an `IsolateDeathException`. \
                 It must throw either a Java unchecked exception or an exception declared by the annotated method.\n\
                 To resolve this, add the following method to {}:\n  \
                 static void {HANDLER_METHOD}(Object receiver, IsolateDeathException exception)",
                names::simple_name_of(handler_name)
            ),
        );
        return None;
    };
    let checked_exceptions = method
        .throws
        .iter()
        .filter(|thrown| is_checked(types, thrown))
        .map(TypeRef::erasure)
        .collect();
    Some(IsolateDeathHandler {
        ty: handler,
        checked_exceptions,
    })
}

fn is_handler_method(types: &TypeCache, owner: &str, method: &MethodDecl) -> bool {
    let [receiver, exception] = method.params.as_slice() else {
        return false;
    };
    let accepts_owner = receiver
        .ty
        .qualified_name()
        .is_some_and(|name| name == names::OBJECT || types.is_subtype(owner, name));
    method.is_static()
        && !method.is_private()
        && method.return_type.is_void()
        && accepts_owner
        && exception.ty.is_named(rt::ISOLATE_DEATH_EXCEPTION)
}

/// Exceptions not extending `RuntimeException` or `Error`
fn is_checked(types: &TypeCache, exception: &TypeRef) -> bool {
    exception.qualified_name().is_some_and(|name| {
        !types.is_subtype(name, RUNTIME_EXCEPTION) && !types.is_subtype(name, ERROR)
    })
}

/// Report each checked exception of `handler` that `method` does not declare
pub(crate) fn check_throws(
    types: &TypeCache,
    handler: &IsolateDeathHandler,
    inherited_from: Option<&str>,
    method: &MethodDecl,
    element: &ElementId,
    findings: &mut Findings,
) {
    for checked in &handler.checked_exceptions {
        let name = checked.qualified_name().unwrap_or_default();
        let declared = method
            .throws
            .iter()
            .filter_map(TypeRef::qualified_name)
            .any(|thrown| types.is_subtype(name, thrown));
        if declared {
            continue;
        }
        let exception = names::simple_name_of(name);
        let fix = inherited_from
            .map(|owner| {
                format!(
                    " If only some `{}` operations throw `{exception}`, consider moving the `@IsolateDeathHandler` annotation to those specific methods.",
                    names::simple_name_of(owner)
                )
            })
            .unwrap_or_default();
        findings.error(
            element,
            None,
            format!(
                "The handler specified by the `@IsolateDeathHandler` annotation throws a Java checked exception `{exception}`, \
                 but the method `{}` does not declare `{exception}` in its throws clause.\n\
                 To fix this, change `{}` to throw a Java unchecked exception or checked exception thrown by `{}` method.{fix}",
                method.signature(),
                handler.ty.simple_name().unwrap_or_default(),
                method.signature()
            ),
        );
    }
}

#[cfg(test)]
#[path = "isolate_death_tests.rs"]
mod isolate_death_tests;
