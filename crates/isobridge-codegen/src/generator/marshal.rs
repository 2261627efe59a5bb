//! Expressions moving single values across a boundary
//!
//! A value is produced by a sender and consumed by a receiver. Parameters are
//! sent by the start point, results by the end point. Values that are not
//! batched travel as arguments of the crossing call; batched values are
//! written to and read from the binary payload.

use crate::boundary::BoundaryKind;
use crate::model::{MarshallerData, MarshallerKind, gen_qualified_name};
use crate::runtime_types as rt;
use crate::strategy::MarshallingStrategy;
use isobridge_core::{Primitive, TypeRef};
use isobridge_emit::SourceEmitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Start,
    End,
}

/// Role of a value in a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Parameter,
    Result,
}

/// Encoded size contribution of one batched value
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SizeTerm {
    Fixed(usize),
    Computed(String),
}

/// `12 + BinaryOutput.bufferSize(name)`
pub(crate) fn size_expression(terms: Vec<SizeTerm>) -> String {
    let mut fixed = 0;
    let mut computed = Vec::new();
    for term in terms {
        match term {
            SizeTerm::Fixed(size) => fixed += size,
            SizeTerm::Computed(expr) => computed.push(expr),
        }
    }
    if fixed > 0 || computed.is_empty() {
        computed.insert(0, fixed.to_string());
    }
    computed.join(" + ")
}

pub(super) fn primitive_size(primitive: Primitive) -> usize {
    match primitive {
        Primitive::Boolean | Primitive::Byte => 1,
        Primitive::Char | Primitive::Short => 2,
        Primitive::Int | Primitive::Float => 4,
        Primitive::Long | Primitive::Double => 8,
    }
}

/// Value conversions for one boundary kind
#[derive(Debug, Clone, Copy)]
pub(crate) struct Codec {
    kind: BoundaryKind,
    strategy: MarshallingStrategy,
}

impl Codec {
    pub(crate) fn new(kind: BoundaryKind) -> Self {
        Self {
            kind,
            strategy: MarshallingStrategy::new(kind),
        }
    }

    pub(crate) fn strategy(&self) -> &MarshallingStrategy {
        &self.strategy
    }

    /// Whether code running at `side` holds JNI-native representations
    pub(crate) fn uses_jni(&self, side: Side) -> bool {
        match side {
            Side::Start => self.kind.jni_entry(),
            Side::End => self.kind.jni_end(),
        }
    }

    fn travels_as_handle(&self, m: &MarshallerData) -> bool {
        m.same_direction || self.kind != BoundaryKind::ManagedToNative
    }

    /// Whether the sender holds the referenced object itself
    fn exports(m: &MarshallerData, role: Role) -> bool {
        (role == Role::Parameter) != m.same_direction
    }

    fn jni_env(&self) -> &'static str {
        "jniEnv"
    }

    /// Isolate a peer created at `side` belongs to
    fn isolate_expr(&self, e: &mut SourceEmitter<'_>, side: Side) -> String {
        match (side, self.kind) {
            (Side::Start, _) | (Side::End, BoundaryKind::ProcessToProcess) => "isolate".to_string(),
            (Side::End, _) => e.invoke_static_expr(&rt::ty(rt::NATIVE_ISOLATE), "current", &[]),
        }
    }

    /// `XGen.create(Peer.create(isolate, value))` for the bridge a reference is wrapped into
    fn wrap_reference(
        &self,
        e: &mut SourceEmitter<'_>,
        m: &MarshallerData,
        side: Side,
        value: &str,
    ) -> String {
        let direction = if m.same_direction {
            self.kind
        } else {
            self.kind.reverse()
        };
        let peer_type = &direction.configuration().peer_type;
        let owner = if peer_type.is_named(rt::MANAGED_PEER) {
            self.jni_env().to_string()
        } else {
            self.isolate_expr(e, side)
        };
        let peer = e.invoke_static_expr(peer_type, "create", &[owner, value.to_string()]);
        self.wrap_reference_peer(e, m, &peer)
    }

    pub(crate) fn jni_to_native(&self, e: &mut SourceEmitter<'_>, expr: &str) -> String {
        e.invoke_static_expr(&rt::ty(rt::JNI_UTIL), "toJNI", &[self.jni_env().into(), expr.into()])
    }

    pub(crate) fn jni_to_managed(&self, e: &mut SourceEmitter<'_>, expr: &str) -> String {
        e.invoke_static_expr(&rt::ty(rt::JNI_UTIL), "toJava", &[self.jni_env().into(), expr.into()])
    }

    /// Crossing value a sender produces for `expr`, before any JNI substitution
    fn send_value(
        &self,
        e: &mut SourceEmitter<'_>,
        m: &MarshallerData,
        ty: &TypeRef,
        expr: &str,
        role: Role,
    ) -> String {
        match m.kind {
            MarshallerKind::Reference if self.travels_as_handle(m) => {
                let handles = rt::ty(rt::REFERENCE_HANDLES);
                let foreign = rt::ty(rt::FOREIGN_OBJECT);
                match (Self::exports(m, role), ty.is_array()) {
                    (true, false) => e.invoke_static_expr(&handles, "create", &[expr.into()]),
                    (true, true) => e.invoke_static_expr(&handles, "createAll", &[expr.into()]),
                    (false, false) => {
                        let foreign = e.render_type(&foreign);
                        format!("(({foreign}) {expr}).getPeer().getHandle()")
                    }
                    (false, true) => e.invoke_static_expr(&foreign, "handlesOf", &[expr.into()]),
                }
            }
            MarshallerKind::Reference if !Self::exports(m, role) => {
                let managed = rt::ty(rt::MANAGED_PEER);
                if ty.is_array() {
                    e.invoke_static_expr(&managed, "jobjectsOf", &[self.jni_env().into(), expr.into()])
                } else {
                    e.invoke_static_expr(&managed, "jobjectOf", &[expr.into()])
                }
            }
            MarshallerKind::PeerReference if m.same_direction => format!("{expr}.getHandle()"),
            _ => expr.to_string(),
        }
    }

    /// Argument a sender at `side` passes for an unbatched value
    pub(crate) fn encode_inline(
        &self,
        e: &mut SourceEmitter<'_>,
        m: &MarshallerData,
        ty: &TypeRef,
        expr: &str,
        side: Side,
        role: Role,
    ) -> String {
        let value = self.send_value(e, m, ty, expr, role);
        let crossing = self.strategy.crossing_type(m, ty);
        let converts = match m.kind {
            MarshallerKind::Value => true,
            MarshallerKind::Reference => self.travels_as_handle(m),
            MarshallerKind::PeerReference => !m.same_direction,
            _ => false,
        };
        if converts && self.uses_jni(side) && rt::jni_type(&crossing).is_some() {
            self.jni_to_native(e, &value)
        } else {
            value
        }
    }

    /// Whether a received value is used as it arrives
    pub(crate) fn is_identity(&self, m: &MarshallerData, ty: &TypeRef, side: Side, role: Role, inline: bool) -> bool {
        let jni = inline && self.uses_jni(side);
        match m.kind {
            MarshallerKind::Value => !(jni && rt::jni_type(ty).is_some()),
            MarshallerKind::RawReference => true,
            MarshallerKind::Reference => !self.travels_as_handle(m) && !Self::exports(m, role),
            MarshallerKind::PeerReference | MarshallerKind::Custom => false,
        }
    }

    /// Expression for a received value, or `None` when an array of
    /// references has to be wrapped element by element
    pub(crate) fn decode(
        &self,
        e: &mut SourceEmitter<'_>,
        m: &MarshallerData,
        ty: &TypeRef,
        raw: &str,
        side: Side,
        role: Role,
        inline: bool,
    ) -> Option<String> {
        let jni = inline && self.uses_jni(side);
        match m.kind {
            MarshallerKind::Value if jni && rt::jni_type(ty).is_some() => {
                Some(self.jni_to_managed(e, raw))
            }
            MarshallerKind::Reference if self.travels_as_handle(m) => {
                let handles = if jni && ty.is_array() {
                    self.jni_to_managed(e, raw)
                } else {
                    raw.to_string()
                };
                match (Self::exports(m, role), ty.is_array()) {
                    (true, false) => Some(self.wrap_reference(e, m, side, &handles)),
                    (true, true) => None,
                    (false, array) => {
                        let class = e.class_literal(ty.element_type());
                        let method = if array { "resolveAll" } else { "resolve" };
                        Some(e.invoke_static_expr(
                            &rt::ty(rt::REFERENCE_HANDLES),
                            method,
                            &[handles, class],
                        ))
                    }
                }
            }
            MarshallerKind::Reference if Self::exports(m, role) => {
                if ty.is_array() {
                    None
                } else {
                    let peer = e.invoke_static_expr(
                        &rt::ty(rt::MANAGED_PEER),
                        "create",
                        &[self.jni_env().into(), raw.into()],
                    );
                    Some(self.wrap_reference_peer(e, m, &peer))
                }
            }
            MarshallerKind::PeerReference if m.same_direction => {
                let class = e.class_literal(ty);
                Some(e.invoke_static_expr(
                    &rt::ty(rt::REFERENCE_HANDLES),
                    "resolve",
                    &[raw.into(), class],
                ))
            }
            MarshallerKind::PeerReference if self.uses_jni(side) => Some(e.invoke_static_expr(
                &rt::ty(rt::MANAGED_PEER),
                "create",
                &[self.jni_env().into(), raw.into()],
            )),
            MarshallerKind::PeerReference => {
                let target = e.render_type(ty);
                let foreign = e.render_type(&rt::ty(rt::FOREIGN_OBJECT));
                Some(format!("({target}) (({foreign}) {raw}).getPeer()"))
            }
            _ => Some(raw.to_string()),
        }
    }

    fn wrap_reference_peer(&self, e: &mut SourceEmitter<'_>, m: &MarshallerData, peer: &str) -> String {
        let bridged = m
            .reference_type
            .as_ref()
            .and_then(TypeRef::qualified_name)
            .map(|name| TypeRef::declared(gen_qualified_name(name)))
            .unwrap_or_else(|| rt::ty(rt::FOREIGN_OBJECT));
        e.invoke_static_expr(&bridged, "create", &[peer.to_string()])
    }

    /// Declare `local` holding the received value
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn decode_into_local(
        &self,
        e: &mut SourceEmitter<'_>,
        m: &MarshallerData,
        ty: &TypeRef,
        raw: &str,
        side: Side,
        role: Role,
        inline: bool,
        local: &str,
    ) {
        let declared = e.render_type(ty);
        if let Some(expr) = self.decode(e, m, ty, raw, side, role, inline) {
            e.line(&format!("{declared} {local} = {expr};"));
            return;
        }
        let element = e.render_type(ty.element_type());
        let jni_util = rt::ty(rt::JNI_UTIL);
        let (length, item) = if self.travels_as_handle(m) {
            let handles = format!("{local}Handles");
            let received = if inline && self.uses_jni(side) {
                self.jni_to_managed(e, raw)
            } else {
                raw.to_string()
            };
            e.line(&format!("long[] {handles} = {received};"));
            let item = self.wrap_reference(e, m, side, &format!("{handles}[i]"));
            (format!("{handles}.length"), item)
        } else {
            let length = e.invoke_static_expr(
                &jni_util,
                "GetArrayLength",
                &[self.jni_env().into(), raw.into()],
            );
            let element = e.invoke_static_expr(
                &jni_util,
                "GetObjectArrayElement",
                &[self.jni_env().into(), raw.into(), "i".into()],
            );
            let peer = e.invoke_static_expr(
                &rt::ty(rt::MANAGED_PEER),
                "create",
                &[self.jni_env().into(), element],
            );
            (length, self.wrap_reference_peer(e, m, &peer))
        };
        e.line(&format!("{declared} {local} = new {element}[{length}];"));
        e.line(&format!("for (int i = 0; i < {local}.length; i++) {{"));
        e.indent();
        e.line(&format!("{local}[i] = {item};"));
        e.dedent();
        e.line("}");
    }

    /// Statement writing a batched value to `output`
    pub(crate) fn write_batched(
        &self,
        e: &mut SourceEmitter<'_>,
        m: &MarshallerData,
        ty: &TypeRef,
        expr: &str,
        output: &str,
        role: Role,
    ) {
        if m.kind == MarshallerKind::Custom {
            e.line(&format!("{}.write({output}, {expr});", m.field_name()));
            return;
        }
        let crossing = self.strategy.crossing_type(m, ty);
        let value = self.send_value(e, m, ty, expr, role);
        let method = match &crossing {
            TypeRef::Primitive(primitive) => format!("write{}", primitive.capitalized()),
            TypeRef::Array(component) => match component.as_ref() {
                TypeRef::Primitive(primitive) => format!("write{}Array", primitive.capitalized()),
                _ => "writeObject".to_string(),
            },
            _ if crossing.is_named(isobridge_core::names::STRING) => "writeUTF".to_string(),
            _ => "writeObject".to_string(),
        };
        e.line(&format!("{output}.{method}({value});"));
    }

    /// Expression reading the crossing value of a batched value from `input`
    pub(crate) fn read_batched(&self, m: &MarshallerData, ty: &TypeRef, input: &str) -> String {
        if m.kind == MarshallerKind::Custom {
            return format!("{}.read({input})", m.field_name());
        }
        let crossing = self.strategy.crossing_type(m, ty);
        match &crossing {
            TypeRef::Primitive(primitive) => format!("{input}.read{}()", primitive.capitalized()),
            TypeRef::Array(component) => match component.as_ref() {
                TypeRef::Primitive(primitive) => format!("{input}.read{}Array()", primitive.capitalized()),
                _ => format!("{input}.readObject()"),
            },
            _ if crossing.is_named(isobridge_core::names::STRING) => format!("{input}.readUTF()"),
            _ => format!("{input}.readObject()"),
        }
    }

    /// Payload space a batched value needs
    pub(crate) fn size_term(
        &self,
        e: &mut SourceEmitter<'_>,
        m: &MarshallerData,
        ty: &TypeRef,
        expr: &str,
    ) -> SizeTerm {
        if m.kind == MarshallerKind::Custom {
            return SizeTerm::Computed(format!("{}.inferSize({expr})", m.field_name()));
        }
        match self.strategy.crossing_type(m, ty) {
            TypeRef::Primitive(primitive) => SizeTerm::Fixed(primitive_size(primitive)),
            TypeRef::Array(component) => {
                let element = match component.as_ref() {
                    TypeRef::Primitive(primitive) => primitive_size(*primitive),
                    _ => 8,
                };
                SizeTerm::Computed(format!("4 + {expr}.length * {element}"))
            }
            crossing if crossing.is_named(isobridge_core::names::STRING) => SizeTerm::Computed(
                e.invoke_static_expr(&rt::ty(rt::BINARY_OUTPUT), "bufferSize", &[expr.into()]),
            ),
            _ => SizeTerm::Fixed(8),
        }
    }
}

/// Literal returned after an exception was handed to the other side
pub(crate) fn default_value(ty: &TypeRef) -> Option<&'static str> {
    match ty {
        TypeRef::Void => None,
        TypeRef::Primitive(Primitive::Boolean) => Some("false"),
        TypeRef::Primitive(Primitive::Long) => Some("0L"),
        TypeRef::Primitive(Primitive::Float) => Some("0F"),
        TypeRef::Primitive(Primitive::Double) => Some("0D"),
        TypeRef::Primitive(Primitive::Char) => Some("'\\0'"),
        TypeRef::Primitive(_) => Some("0"),
        _ => Some("null"),
    }
}

#[cfg(test)]
#[path = "marshal_tests.rs"]
mod marshal_tests;
