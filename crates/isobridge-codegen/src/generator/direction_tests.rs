#![allow(non_snake_case)]

use super::*;
use crate::model::DirectionData;
use crate::test_support::*;
use isobridge_core::TypeCache;

fn bytes() -> TypeRef {
    ty("byte[]")
}

fn ranged(trim_to_result: bool) -> DirectionData {
    DirectionData {
        offset_parameter: Some("offset".to_string()),
        length_parameter: Some("length".to_string()),
        trim_to_result,
    }
}

fn read_method(params: &[(&str, TypeRef)], buffer: MarshallerData) -> MethodData {
    let decl = interface_method("read", params, TypeRef::INT);
    let mut marshallers = vec![buffer];
    marshallers.extend(params.iter().skip(1).map(|(_, t)| MarshallerData::value(t.clone())));
    MethodData::new(decl, q("Stream"), marshallers, MarshallerData::value(TypeRef::INT), 0, false)
}

fn emitted(types: &TypeCache, emit: impl FnOnce(&mut SourceEmitter<'_>)) -> String {
    let mut e = SourceEmitter::new(types, PACKAGE);
    emit(&mut e);
    e.build()
}

#[test]
fn start_size___out_only_array___reserves_length_only() {
    let m = MarshallerData::value(bytes()).with_directions(None, Some(DirectionData::default()));

    assert_eq!(start_size(&m, &bytes(), "buffer"), SizeTerm::Fixed(4));
}

#[test]
fn start_size___ranged_in_array___scales_length_by_element_size() {
    let m = MarshallerData::value(ty("long[]")).with_directions(Some(ranged(false)), None);

    assert_eq!(
        start_size(&m, &ty("long[]"), "values"),
        SizeTerm::Computed("4 + (length) * 8".to_string())
    );
}

#[test]
fn start_write___in_array_with_offset_only___sends_remaining_elements() {
    let types = cache(Vec::new());
    let direction = DirectionData {
        offset_parameter: Some("from".to_string()),
        ..DirectionData::default()
    };
    let m = MarshallerData::value(bytes()).with_directions(Some(direction), None);

    let text = emitted(&types, |e| start_write(e, &m, &bytes(), "data", "out"));

    assert_contains_lines(
        &text,
        "out.writeInt(data.length - from);
         out.writeByteArray(data, from, data.length - from);",
    );
}

#[test]
fn start_copy_back___trimmed_out_range___reads_result_elements() {
    let types = cache(Vec::new());
    let m = MarshallerData::value(bytes()).with_directions(None, Some(ranged(true)));

    let text = emitted(&types, |e| start_copy_back(e, &m, &bytes(), "buffer", "in"));

    assert_contains_lines(&text, "in.readByteArray(buffer, offset, result);");
}

#[test]
fn start_copy_back___custom_value___updates_in_place() {
    let types = cache(Vec::new());
    let m = MarshallerData::custom(ty("com.acme.Point"), "pointMarshaller", Vec::new())
        .with_directions(None, Some(DirectionData::default()));

    let text = emitted(&types, |e| start_copy_back(e, &m, &ty("com.acme.Point"), "point", "in"));

    assert_contains_lines(&text, "pointMarshaller.readUpdate(in, point);");
}

#[test]
fn end_read___length_local_clashing_with_parameter___gets_suffix() {
    let types = cache(Vec::new());
    let m = MarshallerData::value(bytes()).with_directions(Some(DirectionData::default()), None);
    let method = read_method(&[("data", bytes()), ("dataLength", TypeRef::INT)], m.clone());

    let text = emitted(&types, |e| end_read(e, &method, &m, &bytes(), "data", "input"));

    assert_contains_lines(
        &text,
        "int dataLength0 = input.readInt();
         byte[] data = new byte[dataLength0];
         input.readByteArray(data, 0, dataLength0);",
    );
}

#[test]
fn end_read___out_only_array___allocated_but_not_filled() {
    let types = cache(Vec::new());
    let m = MarshallerData::value(bytes()).with_directions(None, Some(DirectionData::default()));
    let method = read_method(&[("data", bytes())], m.clone());

    let text = emitted(&types, |e| end_read(e, &method, &m, &bytes(), "data", "input"));

    assert!(text.contains("byte[] data = new byte[dataLength];"));
    assert!(!text.contains("readByteArray"));
}

#[test]
fn end_write_update___trimmed_range___writes_result_elements() {
    let types = cache(Vec::new());
    let m = MarshallerData::value(bytes()).with_directions(None, Some(ranged(true)));
    let method = read_method(
        &[("buffer", bytes()), ("offset", TypeRef::INT), ("length", TypeRef::INT)],
        m.clone(),
    );

    let text = emitted(&types, |e| end_write_update(e, &method, &m, &bytes(), "buffer", "output"));

    assert_contains_lines(&text, "output.writeByteArray(buffer, 0, result);");
    assert_eq!(
        end_update_size(&method, &m, &bytes(), "buffer"),
        SizeTerm::Computed("result * 1".to_string())
    );
    assert_eq!(end_offset_parameters(&method), vec!["offset"]);
    assert_eq!(out_params(&method).count(), 1);
}
