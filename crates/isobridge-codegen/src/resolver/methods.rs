//! Collection of the methods a start point overrides

use super::isolate_death::{self, IsolateDeathHandler};
use super::{Findings, MarshallerLookup};
use crate::generator::boxed;
use crate::model::{CacheData, CustomDispatch, DirectionData, MarshallerData, MarshallerKind, MethodData};
use crate::runtime_types as rt;
use isobridge_core::{
    Annotated, ElementId, MethodDecl, Modifier, ParamDecl, TypeCache, TypeDecl, TypeRef, names,
};
use std::collections::{BTreeMap, BTreeSet};

/// Class-level directives every collected method inherits
#[derive(Debug, Default)]
pub(crate) struct ClassDirectives {
    /// `Idempotent` on the class caches every method that can be cached
    pub(crate) idempotent: bool,
    pub(crate) isolate_death_handler: Option<IsolateDeathHandler>,
}

/// A method visible in the annotated type together with its declaring type
struct Candidate<'t> {
    method: &'t MethodDecl,
    owner: &'t TypeDecl,
}

/// `decl` followed by its known supertypes, superclasses before interfaces
fn hierarchy<'t>(types: &'t TypeCache, decl: &'t TypeDecl) -> Vec<&'t TypeDecl> {
    let mut order = vec![decl];
    let mut visited = BTreeSet::from([decl.name.as_str()]);
    let mut next = 0;
    while next < order.len() {
        let current = order[next];
        next += 1;
        for supertype in current.supertypes() {
            let Some(name) = supertype.qualified_name() else {
                continue;
            };
            if let Some(found) = types.get(name)
                && visited.insert(found.name.as_str())
            {
                order.push(found);
            }
        }
    }
    order
}

fn is_overridable(method: &MethodDecl, owner: &TypeDecl, package: &str) -> bool {
    if method.is_static()
        || method.is_private()
        || method.is_final()
        || method.has_modifier(Modifier::Native)
    {
        return false;
    }
    if owner.name == names::OBJECT || owner.name == rt::FOREIGN_OBJECT {
        return false;
    }
    owner.is_interface()
        || method.has_modifier(Modifier::Public)
        || method.has_modifier(Modifier::Protected)
        || owner.package() == package
}

/// The method with the modifiers it has as a member; interface methods are public
fn as_member(method: &MethodDecl, owner: &TypeDecl) -> MethodDecl {
    let mut member = method.clone();
    if owner.is_interface() && !member.has_modifier(Modifier::Public) {
        member.modifiers.retain(|m| *m != Modifier::Abstract);
        member.modifiers.insert(0, Modifier::Public);
    }
    member
}

/// Every overridable method of `annotated`'s hierarchy, most derived first
fn candidates<'t>(types: &'t TypeCache, annotated: &'t TypeDecl) -> Vec<Candidate<'t>> {
    let mut seen = BTreeSet::new();
    let mut found = Vec::new();
    for owner in hierarchy(types, annotated) {
        for method in &owner.methods {
            // A final or static declaration still hides its supertypes' versions
            if !seen.insert((method.name.clone(), method.erased_params())) {
                continue;
            }
            if is_overridable(method, owner, annotated.package()) {
                found.push(Candidate { method, owner });
            }
        }
    }
    found
}

/// Overload ids for names shared by several generated methods
fn overload_ids(methods: &[Candidate<'_>]) -> Vec<u32> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for candidate in methods {
        *counts.entry(candidate.method.name.as_str()).or_default() += 1;
    }
    let mut next: BTreeMap<&str, u32> = BTreeMap::new();
    methods
        .iter()
        .map(|candidate| {
            let name = candidate.method.name.as_str();
            if counts[name] > 1 {
                let id = next.entry(name).or_default();
                *id += 1;
                *id
            } else {
                0
            }
        })
        .collect()
}

/// Methods of `annotated` with their marshalling decisions
///
/// Methods are ordered by name; methods sharing a name keep hierarchy order.
pub(crate) fn collect(
    types: &TypeCache,
    annotated: &TypeDecl,
    custom_dispatch: Option<&CustomDispatch>,
    directives: &ClassDirectives,
    lookup: &mut MarshallerLookup<'_>,
    findings: &mut Findings,
) -> Vec<MethodData> {
    let mut candidates = candidates(types, annotated);
    candidates.sort_by(|a, b| a.method.name.cmp(&b.method.name));
    let ids = overload_ids(&candidates);
    let mut cache_fields = BTreeSet::new();

    candidates
        .iter()
        .zip(ids)
        .map(|(candidate, overload_id)| {
            let method = candidate.method;
            let element = ElementId::of_method(&annotated.name, method);
            if candidate.owner.name == annotated.name && !method.is_abstract_in(annotated.kind) {
                findings.error(
                    &element,
                    None,
                    format!(
                        "Should be `final` to prevent override in the generated class or `abstract` to be generated.\n\
                         To fix this add a `final` modifier or remove implementation in the `{}`.",
                        annotated.simple_name()
                    ),
                );
            }
            let has_receiver = custom_dispatch.is_some();
            if let Some(dispatch) = custom_dispatch {
                check_receiver(method, &dispatch.receiver_type, &element, findings);
            }
            let params = method
                .params
                .iter()
                .enumerate()
                .map(|(index, param)| {
                    if has_receiver && index == 0 {
                        MarshallerData::value(param.ty.clone())
                    } else {
                        lookup.lookup(&element, &param.ty, &param.annotations, findings)
                    }
                })
                .collect::<Vec<_>>();
            let return_marshaller =
                lookup.lookup(&element, &method.return_type, &method.annotations, findings);
            for (param, marshaller) in method.params.iter().zip(&params) {
                check_directions(method, param, marshaller, &element, findings);
            }
            let has_custom_out = params.iter().any(|m| m.is_custom() && m.is_out());
            if has_custom_out
                && matches!(
                    return_marshaller.kind,
                    MarshallerKind::Reference | MarshallerKind::PeerReference
                )
            {
                findings.error(
                    &element,
                    None,
                    "A method with a reference return type cannot have a marshalled Out parameter.\n\
                     To fix this, split the method into two methods, one having the reference return type, the other with marshalled Out parameter(s).",
                );
            }
            let cache = cache_data(method, &params, directives, &mut cache_fields, &element, findings);
            let handler = isolate_death::resolve(types, &annotated.name, method, &element, findings);
            let inherited = handler.is_none();
            if let Some(handler) = handler.as_ref().or(directives.isolate_death_handler.as_ref()) {
                let inherited_from = inherited.then_some(annotated.name.as_str());
                isolate_death::check_throws(types, handler, inherited_from, method, &element, findings);
            }
            let mut data = MethodData::new(
                as_member(method, candidate.owner),
                candidate.owner.name.clone(),
                params,
                return_marshaller,
                overload_id,
                has_receiver,
            );
            data.cache = cache;
            data.isolate_death_handler = handler
                .or_else(|| directives.isolate_death_handler.clone())
                .map(|handler| handler.ty);
            data
        })
        .collect()
}

/// Cache field of an idempotent method
///
/// Fields are named `<method>Cache`; later overloads get a numeric suffix
/// starting at 2.
fn cache_data(
    method: &MethodDecl,
    params: &[MarshallerData],
    directives: &ClassDirectives,
    used: &mut BTreeSet<String>,
    element: &ElementId,
    findings: &mut Findings,
) -> Option<CacheData> {
    let annotated = method.has_annotation(rt::IDEMPOTENT);
    let no_return = method.return_type.is_void();
    let has_out = params.iter().any(MarshallerData::is_out);
    let idempotent = names::simple_name_of(rt::IDEMPOTENT);
    if annotated && no_return {
        findings.error(
            element,
            Some(rt::IDEMPOTENT),
            format!(
                "A method with a cached return value must have a non-void return type.\n\
                 To fix this remove the `{idempotent}` annotation or change the return type."
            ),
        );
        return None;
    }
    if annotated && has_out {
        findings.error(
            element,
            Some(rt::IDEMPOTENT),
            format!(
                "A method with a cached return value cannot have an `Out` parameter.\n\
                 To fix this, remove the `{idempotent}` annotation."
            ),
        );
        return None;
    }
    if !annotated && !(directives.idempotent && !no_return && !has_out) {
        return None;
    }
    let base = format!("{}Cache", method.name);
    let mut field_name = base.clone();
    let mut index = 2;
    while used.contains(&field_name) {
        field_name = format!("{base}{index}");
        index += 1;
    }
    used.insert(field_name.clone());
    Some(CacheData {
        field_name,
        ty: boxed(&method.return_type),
    })
}

/// Range attributes of `In` and `Out` must name `int` parameters, and
/// `trimToResult` needs an `int` result
fn check_directions(
    method: &MethodDecl,
    param: &ParamDecl,
    marshaller: &MarshallerData,
    element: &ElementId,
    findings: &mut Findings,
) {
    let directions = [
        (rt::IN, marshaller.direction_in.as_ref()),
        (rt::OUT, marshaller.direction_out.as_ref()),
    ];
    for (marker, direction) in directions {
        let Some(DirectionData {
            offset_parameter,
            length_parameter,
            trim_to_result,
        }) = direction
        else {
            continue;
        };
        let simple = names::simple_name_of(marker);
        let ranged = offset_parameter.is_some() || length_parameter.is_some() || *trim_to_result;
        if ranged && !param.ty.is_primitive_array() {
            findings.error(
                element,
                Some(marker),
                format!(
                    "The array range attributes of `{simple}` are supported only for primitive array parameters."
                ),
            );
            continue;
        }
        let ranges = [
            ("arrayOffsetParameter", offset_parameter),
            ("arrayLengthParameter", length_parameter),
        ];
        for (attribute, name) in ranges {
            let Some(name) = name else {
                continue;
            };
            let is_int_param = method
                .params
                .iter()
                .any(|p| &p.name == name && p.ty == TypeRef::INT);
            if !is_int_param {
                findings.error(
                    element,
                    Some(marker),
                    format!(
                        "The `{simple}.{attribute}` must name an `int` parameter of the method, but `{name}` is not one."
                    ),
                );
            }
        }
        if *trim_to_result && method.return_type != TypeRef::INT {
            findings.error(
                element,
                Some(marker),
                format!("The `{simple}.trimToResult` requires the method to return `int`."),
            );
        }
    }
}

fn check_receiver(
    method: &MethodDecl,
    receiver_type: &TypeRef,
    element: &ElementId,
    findings: &mut Findings,
) {
    let matches = method
        .params
        .first()
        .is_some_and(|first| first.ty.erasure() == receiver_type.erasure());
    if !matches {
        findings.error(
            element,
            None,
            "In a class with a custom dispatch, the first method parameter must be the receiver.\n\
             For a class with a custom dispatch, the first parameter of every generated method has to have the \
             custom dispatch accessor's parameter type.",
        );
    }
}

#[cfg(test)]
#[path = "methods_tests.rs"]
mod methods_tests;
