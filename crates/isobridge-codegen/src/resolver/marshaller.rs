//! Per-value marshaller selection and marshaller field naming

use super::{Findings, is_ignored, type_attribute};
use crate::boundary::BoundaryKind;
use crate::model::{DirectionData, MarshallerData, MarshallerKind};
use crate::runtime_types as rt;
use isobridge_core::{
    Annotated, AnnotationDecl, AnnotationValue, ElementId, TypeCache, TypeRef, names,
};
use isobridge_emit::names::decapitalize;
use std::collections::{BTreeMap, BTreeSet};

/// Chooses marshallers for the values of one definition
///
/// Custom marshallers for the same (type, annotations) pair share a field.
/// Different pairs that would produce the same field name get a numeric
/// suffix.
pub(crate) struct MarshallerLookup<'t> {
    types: &'t TypeCache,
    kind: BoundaryKind,
    fields: BTreeMap<String, String>,
    taken: BTreeSet<String>,
    marshaller_annotations: BTreeSet<String>,
    /// Element type name to the bridged class and whether the reference
    /// lives on the called side
    always_by_reference: BTreeMap<String, (TypeRef, bool)>,
}

impl<'t> MarshallerLookup<'t> {
    pub(crate) fn new(types: &'t TypeCache, kind: BoundaryKind) -> Self {
        let mut taken = BTreeSet::new();
        taken.insert(MarshallerData::throwable().field_name().to_string());
        Self {
            types,
            kind,
            fields: BTreeMap::new(),
            taken,
            marshaller_annotations: BTreeSet::new(),
            always_by_reference: BTreeMap::new(),
        }
    }

    /// Pass values of the listed types by reference without `ByReference`
    pub(crate) fn with_always_by_reference(
        mut self,
        local: &BTreeMap<String, TypeRef>,
        remote: &BTreeMap<String, TypeRef>,
    ) -> Self {
        let local = local.iter().map(|(name, target)| (name.clone(), (target.clone(), false)));
        let remote = remote.iter().map(|(name, target)| (name.clone(), (target.clone(), true)));
        self.always_by_reference.extend(local.chain(remote));
        self
    }

    /// Annotation types that took part in a custom marshaller lookup
    pub(crate) fn into_marshaller_annotations(self) -> BTreeSet<String> {
        self.marshaller_annotations
    }

    /// Whether `annotation` selects a custom marshaller variant
    ///
    /// Annotation types known to the round must carry `MarshallerAnnotation`;
    /// unknown ones are taken at their word.
    pub(crate) fn is_marshaller_annotation(&self, annotation: &AnnotationDecl) -> bool {
        !is_ignored(annotation)
            && self.types.get(&annotation.annotation_type).is_none_or(|decl| {
                decl.has_annotation(rt::MARSHALLER_ANNOTATION)
            })
    }

    /// Marshaller for a value of type `ty` carrying `annotations`
    pub(crate) fn lookup(
        &mut self,
        element: &ElementId,
        ty: &TypeRef,
        annotations: &[AnnotationDecl],
        findings: &mut Findings,
    ) -> MarshallerData {
        let marshaller = self.select(element, ty, annotations, findings);
        let find = |marker: &str| annotations.iter().find(|a| a.annotation_type == marker);
        let direction_in = find(rt::IN).map(direction_data);
        let direction_out = find(rt::OUT).map(direction_data);
        if direction_in.is_none() && direction_out.is_none() {
            return marshaller;
        }
        let directed = marshaller.kind == MarshallerKind::Custom
            || (marshaller.kind == MarshallerKind::Value && ty.is_primitive_array());
        if !directed {
            findings.error(
                element,
                Some(if direction_out.is_some() { rt::OUT } else { rt::IN }),
                "The `In` and `Out` annotations are supported only for primitive arrays and values with a custom marshaller.",
            );
            return marshaller;
        }
        marshaller.with_directions(direction_in, direction_out)
    }

    fn select(
        &mut self,
        element: &ElementId,
        ty: &TypeRef,
        annotations: &[AnnotationDecl],
        findings: &mut Findings,
    ) -> MarshallerData {
        let find = |marker: &str| annotations.iter().find(|a| a.annotation_type == marker);
        if find(rt::RAW_REFERENCE).is_some() {
            return self.raw_reference(element, ty, findings);
        }
        if let Some(by_reference) = find(rt::BY_REFERENCE) {
            return self.reference(element, ty, by_reference, findings);
        }
        if find(rt::BY_PEER_REFERENCE).is_some() {
            return self.peer_reference(element, ty, findings);
        }
        let listed = ty
            .element_type()
            .qualified_name()
            .and_then(|name| self.always_by_reference.get(name));
        if let Some((target, same_direction)) = listed {
            return self.always_reference(element, ty, target, *same_direction, findings);
        }
        if ty.is_void() || ty.is_primitive() || ty.is_primitive_array() || ty.is_named(names::STRING) {
            return MarshallerData::value(ty.clone());
        }
        let selecting: Vec<AnnotationDecl> = annotations
            .iter()
            .filter(|a| self.is_marshaller_annotation(a))
            .cloned()
            .collect();
        self.marshaller_annotations
            .extend(selecting.iter().map(|a| a.annotation_type.clone()));
        let name = self.field_name(ty, &selecting);
        MarshallerData::custom(ty.clone(), name, selecting)
    }

    fn raw_reference(
        &self,
        element: &ElementId,
        ty: &TypeRef,
        findings: &mut Findings,
    ) -> MarshallerData {
        if !matches!(
            self.kind,
            BoundaryKind::ManagedToNative | BoundaryKind::NativeToManaged
        ) {
            findings.error(
                element,
                Some(rt::RAW_REFERENCE),
                format!(
                    "`{}` is supported only between the managed heap and a native isolate.",
                    names::simple_name_of(rt::RAW_REFERENCE)
                ),
            );
        }
        if !ty.is_named(names::OBJECT) {
            findings.error(
                element,
                Some(rt::RAW_REFERENCE),
                format!(
                    "A parameter annotated by `{}` must have `Object` type.",
                    names::simple_name_of(rt::RAW_REFERENCE)
                ),
            );
        }
        MarshallerData::raw_reference()
    }

    fn reference(
        &self,
        element: &ElementId,
        ty: &TypeRef,
        by_reference: &AnnotationDecl,
        findings: &mut Findings,
    ) -> MarshallerData {
        let for_type = ty.element_type().clone();
        let Some(target) = type_attribute(by_reference, "value") else {
            findings.error(
                element,
                Some(rt::BY_REFERENCE),
                "Missing required attribute `value` of `@ByReference`.",
            );
            return MarshallerData::reference(for_type.clone(), for_type, true);
        };
        let own = &self.kind.configuration().service_marker;
        let reverse = &self.kind.reverse().configuration().service_marker;
        let target_name = target.qualified_name().unwrap_or_default();
        let same_direction = if self.types.has_annotation(target_name, own) {
            true
        } else if self.types.has_annotation(target_name, reverse) {
            false
        } else {
            let mut markers = vec![format!("`@{}`", names::simple_name_of(own))];
            if reverse != own {
                markers.push(format!("`@{}`", names::simple_name_of(reverse)));
            }
            findings.error(
                element,
                Some(rt::BY_REFERENCE),
                format!(
                    "The `{}` must be a bridged class annotated by {}.",
                    names::simple_name_of(target_name),
                    markers.join(" or ")
                ),
            );
            true
        };
        if !(for_type.is_declared() && !ty.component().is_some_and(TypeRef::is_array)) {
            findings.error(
                element,
                Some(rt::BY_REFERENCE),
                "A parameter annotated by `ByReference` must be a declared type or an array of it.",
            );
        }
        MarshallerData::reference(for_type, target, same_direction)
    }

    /// A reference selected by an `AlwaysBy*Reference` class annotation
    fn always_reference(
        &self,
        element: &ElementId,
        ty: &TypeRef,
        target: &TypeRef,
        same_direction: bool,
        findings: &mut Findings,
    ) -> MarshallerData {
        let (marker, directive) = if same_direction {
            (&self.kind.configuration().service_marker, rt::ALWAYS_BY_REMOTE_REFERENCE)
        } else {
            (&self.kind.reverse().configuration().service_marker, rt::ALWAYS_BY_LOCAL_REFERENCE)
        };
        let target_name = target.qualified_name().unwrap_or_default();
        if !self.types.has_annotation(target_name, marker) {
            findings.error(
                element,
                Some(directive),
                format!(
                    "The `{}` must be a bridged class annotated by `@{}`.",
                    names::simple_name_of(target_name),
                    names::simple_name_of(marker)
                ),
            );
        }
        MarshallerData::reference(ty.element_type().clone(), target.clone(), same_direction)
    }

    fn peer_reference(
        &self,
        element: &ElementId,
        ty: &TypeRef,
        findings: &mut Findings,
    ) -> MarshallerData {
        let peer = self.kind.configuration();
        let same_direction = ty.is_named(rt::PEER)
            || ty
                .qualified_name()
                .is_some_and(|name| name == peer.peer_type.qualified_name().unwrap_or_default());
        let crosses_heap = matches!(
            self.kind,
            BoundaryKind::ManagedToNative | BoundaryKind::NativeToManaged
        );
        if !same_direction && !crosses_heap {
            findings.error(
                element,
                Some(rt::BY_PEER_REFERENCE),
                format!(
                    "A parameter annotated by `ByPeerReference` must have `{}` type.",
                    peer.peer_simple_name()
                ),
            );
        }
        MarshallerData::peer_reference(ty.clone(), same_direction)
    }

    fn field_name(&mut self, ty: &TypeRef, annotations: &[AnnotationDecl]) -> String {
        let key = format!(
            "{ty}|{}",
            annotations
                .iter()
                .map(|a| a.annotation_type.as_str())
                .collect::<Vec<_>>()
                .join(",")
        );
        if let Some(existing) = self.fields.get(&key) {
            return existing.clone();
        }
        let base = marshaller_field_name(ty, annotations);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while !self.taken.insert(candidate.clone()) {
            candidate = format!("{base}{suffix}");
            suffix += 1;
        }
        self.fields.insert(key, candidate.clone());
        candidate
    }
}

fn direction_data(annotation: &AnnotationDecl) -> DirectionData {
    let parameter = |key: &str| {
        annotation
            .str_value(key)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    };
    DirectionData {
        offset_parameter: parameter("arrayOffsetParameter"),
        length_parameter: parameter("arrayLengthParameter"),
        trim_to_result: annotation
            .value("trimToResult")
            .and_then(AnnotationValue::as_bool)
            .unwrap_or(false),
    }
}

/// `pointMarshaller`, `listOfStringMarshaller`, `pointArrayWithNullableMarshaller`
pub(crate) fn marshaller_field_name(ty: &TypeRef, annotations: &[AnnotationDecl]) -> String {
    let mut name = type_name_part(ty);
    if !annotations.is_empty() {
        name.push_str("With");
        for annotation in annotations {
            name.push_str(annotation.simple_name());
        }
    }
    name.push_str("Marshaller");
    decapitalize(&name)
}

fn type_name_part(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Void => "Void".to_string(),
        TypeRef::Primitive(primitive) => primitive.capitalized().to_string(),
        TypeRef::Wildcard => "Object".to_string(),
        TypeRef::Array(component) => format!("{}Array", type_name_part(component)),
        TypeRef::Declared { name, args } => {
            let mut part = names::simple_name_of(name).to_string();
            if !args.is_empty() {
                part.push_str("Of");
                for arg in args {
                    part.push_str(&type_name_part(arg));
                }
            }
            part
        }
    }
}

#[cfg(test)]
#[path = "marshaller_tests.rs"]
mod marshaller_tests;
