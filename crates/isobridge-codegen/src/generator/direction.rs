//! Payload handling of `In` and `Out` parameters
//!
//! A directed primitive array travels as its transfer length followed by the
//! transferred elements when it is an `In` value. The end point receives a
//! fresh array holding exactly the transferred range, so the implementation
//! sees offset `0`. Updated `Out` values follow the result in the bytes the
//! end point returns, and the start point copies them back into the
//! caller's value.

use super::marshal::{SizeTerm, primitive_size};
use crate::model::{MarshallerData, MethodData};
use crate::strategy::parameter_name;
use isobridge_core::{ParamDecl, Primitive, TypeRef};
use isobridge_emit::SourceEmitter;

fn primitive_component(ty: &TypeRef) -> Option<Primitive> {
    match ty.component() {
        Some(TypeRef::Primitive(primitive)) => Some(*primitive),
        _ => None,
    }
}

/// Offset and length expressions of the range a start point transfers
fn start_range(m: &MarshallerData, name: &str) -> (String, String) {
    let direction = m.direction();
    let offset = direction
        .and_then(|d| d.offset_parameter.as_deref())
        .map(parameter_name);
    let length = direction
        .and_then(|d| d.length_parameter.as_deref())
        .map(parameter_name);
    match (offset, length) {
        (offset, Some(length)) => (offset.unwrap_or_else(|| "0".to_string()), length),
        (Some(offset), None) => {
            let length = format!("{name}.length - {offset}");
            (offset, length)
        }
        (None, None) => ("0".to_string(), format!("{name}.length")),
    }
}

/// Number of elements copied back, `result` when trimmed to the result
fn copy_back_length(m: &MarshallerData, transferred: String) -> String {
    if m.direction_out.as_ref().is_some_and(|d| d.trim_to_result) {
        "result".to_string()
    } else {
        transferred
    }
}

/// End-point local holding the transferred length of `name`
fn length_local(method: &MethodData, name: &str) -> String {
    let mut local = format!("{name}Length");
    while method
        .method
        .params
        .iter()
        .any(|p| parameter_name(&p.name) == local)
    {
        local.push('0');
    }
    local
}

/// Payload space a start point needs for a directed value
pub(super) fn start_size(m: &MarshallerData, ty: &TypeRef, name: &str) -> SizeTerm {
    match primitive_component(ty) {
        Some(primitive) if m.is_in() => {
            let (_, length) = start_range(m, name);
            SizeTerm::Computed(format!("4 + ({length}) * {}", primitive_size(primitive)))
        }
        Some(_) => SizeTerm::Fixed(4),
        None => SizeTerm::Computed(format!("{}.inferSize({name})", m.field_name())),
    }
}

/// Start-point statements writing a directed value to `output`
pub(super) fn start_write(e: &mut SourceEmitter<'_>, m: &MarshallerData, ty: &TypeRef, name: &str, output: &str) {
    match primitive_component(ty) {
        Some(primitive) => {
            let (offset, length) = start_range(m, name);
            e.line(&format!("{output}.writeInt({length});"));
            if m.is_in() {
                e.line(&format!(
                    "{output}.write{}Array({name}, {offset}, {length});",
                    primitive.capitalized()
                ));
            }
        }
        None => {
            e.line(&format!("{}.write({output}, {name});", m.field_name()));
        }
    }
}

/// Start-point statement copying an `Out` value back from `input`
pub(super) fn start_copy_back(e: &mut SourceEmitter<'_>, m: &MarshallerData, ty: &TypeRef, name: &str, input: &str) {
    match primitive_component(ty) {
        Some(primitive) => {
            let (offset, length) = start_range(m, name);
            let length = copy_back_length(m, length);
            e.line(&format!(
                "{input}.read{}Array({name}, {offset}, {length});",
                primitive.capitalized()
            ));
        }
        None => {
            e.line(&format!("{}.readUpdate({input}, {name});", m.field_name()));
        }
    }
}

/// End-point statements declaring `name` from the payload
pub(super) fn end_read(
    e: &mut SourceEmitter<'_>,
    method: &MethodData,
    m: &MarshallerData,
    ty: &TypeRef,
    name: &str,
    input: &str,
) {
    let declared = e.render_type(ty);
    match primitive_component(ty) {
        Some(primitive) => {
            let length = length_local(method, name);
            e.line(&format!("int {length} = {input}.readInt();"));
            e.line(&format!("{declared} {name} = new {}[{length}];", primitive.keyword()));
            if m.is_in() {
                e.line(&format!(
                    "{input}.read{}Array({name}, 0, {length});",
                    primitive.capitalized()
                ));
            }
        }
        None => {
            e.line(&format!("{declared} {name} = {}.read({input});", m.field_name()));
        }
    }
}

/// Space the end point needs to return an updated `Out` value
pub(super) fn end_update_size(method: &MethodData, m: &MarshallerData, ty: &TypeRef, name: &str) -> SizeTerm {
    match primitive_component(ty) {
        Some(primitive) => {
            let length = copy_back_length(m, length_local(method, name));
            SizeTerm::Computed(format!("{length} * {}", primitive_size(primitive)))
        }
        None => SizeTerm::Computed(format!("{}.inferUpdateSize({name})", m.field_name())),
    }
}

/// End-point statement writing an updated `Out` value to `output`
pub(super) fn end_write_update(
    e: &mut SourceEmitter<'_>,
    method: &MethodData,
    m: &MarshallerData,
    ty: &TypeRef,
    name: &str,
    output: &str,
) {
    match primitive_component(ty) {
        Some(primitive) => {
            let length = copy_back_length(m, length_local(method, name));
            e.line(&format!(
                "{output}.write{}Array({name}, 0, {length});",
                primitive.capitalized()
            ));
        }
        None => {
            e.line(&format!("{}.writeUpdate({output}, {name});", m.field_name()));
        }
    }
}

/// `Out` parameters of `method` in declaration order
pub(super) fn out_params(method: &MethodData) -> impl Iterator<Item = (&ParamDecl, &MarshallerData)> {
    method.marshalled_params().filter(|(_, m)| m.is_out())
}

/// Offset parameters the end point replaces by `0`
pub(super) fn end_offset_parameters(method: &MethodData) -> Vec<&str> {
    method
        .marshalled_params()
        .filter(|(param, m)| m.has_direction() && param.ty.is_primitive_array())
        .filter_map(|(_, m)| m.direction().and_then(|d| d.offset_parameter.as_deref()))
        .collect()
}

#[cfg(test)]
#[path = "direction_tests.rs"]
mod direction_tests;
