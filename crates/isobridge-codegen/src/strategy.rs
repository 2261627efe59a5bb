//! Per-boundary marshalling decisions and signature assembly

use crate::boundary::BoundaryKind;
use crate::model::{MarshallerData, MarshallerKind, MethodData};
use crate::runtime_types as rt;
use isobridge_core::{TypeRef, names};
use isobridge_emit::Parameter;

/// Local and parameter names generated code declares itself
pub const RESERVED_NAMES: &[&str] = &[
    "peer",
    "isolateThread",
    "marshalledParametersOutput",
    "endResult",
    "marshalledResultInput",
    "foreignException",
    "handle",
    "isolate",
    "payload",
    "jniEnv",
    "jniClass",
    "receiverObject",
    "result",
    "i",
    "marshalledParametersInput",
    "marshalledResultOutput",
    "scope",
    "throwable",
    "dispatchObject",
    "isolateDeathException",
];

/// Name a user parameter is declared under in generated code
pub fn parameter_name(name: &str) -> String {
    if RESERVED_NAMES.contains(&name) {
        format!("{name}Arg")
    } else {
        name.to_string()
    }
}

/// A generated entry- or end-point method signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub return_type: TypeRef,
    /// Synthetic prefix, inline parameters, then the payload if any
    pub params: Vec<Parameter>,
    /// Number of synthetic prefix parameters
    pub prefix_len: usize,
    pub payload: bool,
}

impl Signature {
    /// Parameters carrying user values unbatched
    pub fn inline_params(&self) -> &[Parameter] {
        let end = self.params.len() - usize::from(self.payload);
        &self.params[self.prefix_len..end]
    }

    pub fn payload_param(&self) -> Option<&Parameter> {
        if self.payload {
            self.params.last()
        } else {
            None
        }
    }
}

/// Marshalling strategy of one boundary kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarshallingStrategy {
    kind: BoundaryKind,
}

impl MarshallingStrategy {
    pub fn new(kind: BoundaryKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> BoundaryKind {
        self.kind
    }

    /// Representation of a value while it crosses, before platform substitution
    pub(crate) fn crossing_type(&self, m: &MarshallerData, ty: &TypeRef) -> TypeRef {
        let handle = || {
            if ty.is_array() {
                rt::long_array()
            } else {
                TypeRef::LONG
            }
        };
        match m.kind {
            MarshallerKind::Value => ty.clone(),
            MarshallerKind::Reference if m.same_direction => handle(),
            MarshallerKind::Reference if self.kind == BoundaryKind::NativeToManaged => handle(),
            MarshallerKind::Reference => ty.clone(),
            MarshallerKind::PeerReference if m.same_direction => TypeRef::LONG,
            MarshallerKind::PeerReference => rt::ty(rt::FOREIGN_OBJECT),
            MarshallerKind::RawReference => TypeRef::declared(names::OBJECT),
            MarshallerKind::Custom => rt::byte_array(),
        }
    }

    fn jni_substitute(ty: TypeRef) -> TypeRef {
        rt::jni_type(&ty).unwrap_or(ty)
    }

    /// Type of a value in the entry-point call
    pub fn entry_type(&self, m: &MarshallerData, ty: &TypeRef) -> TypeRef {
        let crossing = self.crossing_type(m, ty);
        if self.kind.jni_entry() {
            Self::jni_substitute(crossing)
        } else {
            crossing
        }
    }

    /// Type of a value as the end point receives it
    pub fn end_type(&self, m: &MarshallerData, ty: &TypeRef) -> TypeRef {
        let crossing = self.crossing_type(m, ty);
        if self.kind.jni_end() {
            Self::jni_substitute(crossing)
        } else {
            crossing
        }
    }

    /// Whether the value travels in the shared payload instead of inline
    ///
    /// Values with `In` or `Out` modifiers always do, so their transfer range
    /// travels with them.
    pub fn is_batched(&self, m: &MarshallerData, ty: &TypeRef) -> bool {
        if m.kind == MarshallerKind::Custom || m.has_direction() {
            return true;
        }
        match self.kind {
            BoundaryKind::ProcessToProcess => true,
            BoundaryKind::ManagedToNative => {
                m.kind == MarshallerKind::Value && ty.is_named(names::STRING)
            }
            BoundaryKind::NativeToNative => !self.crossing_type(m, ty).is_primitive(),
            BoundaryKind::NativeToManaged => false,
        }
    }

    /// Whether `method`'s signatures end with a payload parameter
    ///
    /// Process messages always carry one since the receiver handle travels
    /// inside it.
    pub fn has_payload(&self, method: &MethodData) -> bool {
        self.kind == BoundaryKind::ProcessToProcess
            || method
                .marshalled_params()
                .any(|(param, m)| self.is_batched(m, &param.ty))
    }

    /// # Panics
    ///
    /// For [`BoundaryKind::NativeToNative`], which calls its end point directly.
    pub fn entry_prefix(&self) -> Vec<Parameter> {
        match self.kind {
            BoundaryKind::ManagedToNative => vec![
                Parameter::new(TypeRef::LONG, "isolate"),
                Parameter::new(TypeRef::LONG, "handle"),
            ],
            BoundaryKind::NativeToManaged => vec![
                Parameter::new(rt::ty(rt::JNI_ENV), "jniEnv"),
                Parameter::new(TypeRef::LONG, "handle"),
            ],
            BoundaryKind::ProcessToProcess => vec![Parameter::new(
                rt::ty(rt::PROCESS_ISOLATE_THREAD),
                "isolateThread",
            )],
            BoundaryKind::NativeToNative => {
                panic!("NativeToNative calls its end point directly and has no entry point")
            }
        }
    }

    pub fn end_prefix(&self) -> Vec<Parameter> {
        match self.kind {
            BoundaryKind::ManagedToNative => vec![
                Parameter::new(rt::ty(rt::JNI_ENV), "jniEnv"),
                Parameter::new(rt::ty(rt::JCLASS), "jniClass"),
                Parameter::new(TypeRef::LONG, "isolate"),
                Parameter::new(TypeRef::LONG, "handle"),
            ],
            BoundaryKind::NativeToManaged => vec![Parameter::new(TypeRef::LONG, "handle")],
            BoundaryKind::NativeToNative => vec![
                Parameter::new(rt::ty(rt::ISOLATE_THREAD), "isolate"),
                Parameter::new(TypeRef::LONG, "handle"),
            ],
            BoundaryKind::ProcessToProcess => {
                vec![Parameter::new(rt::ty(rt::PROCESS_ISOLATE), "isolate")]
            }
        }
    }

    pub fn entry_payload_type(&self) -> TypeRef {
        if self.kind.jni_entry() {
            Self::jni_substitute(rt::byte_array())
        } else {
            rt::byte_array()
        }
    }

    pub fn end_payload_type(&self) -> TypeRef {
        match self.kind {
            BoundaryKind::ManagedToNative => Self::jni_substitute(rt::byte_array()),
            BoundaryKind::NativeToManaged => rt::byte_array(),
            BoundaryKind::NativeToNative => rt::ty(rt::CCHAR_POINTER),
            BoundaryKind::ProcessToProcess => rt::ty(rt::BINARY_INPUT),
        }
    }

    /// Methods with `Out` parameters return the result followed by the
    /// updated values as bytes
    pub fn entry_return_type(&self, method: &MethodData) -> TypeRef {
        let ty = method.return_type();
        match self.kind {
            _ if method.has_out_params() => self.entry_payload_type(),
            _ if ty.is_void() => TypeRef::Void,
            BoundaryKind::ProcessToProcess => rt::byte_array(),
            _ => self.entry_type(&method.return_marshaller, ty),
        }
    }

    pub fn end_return_type(&self, method: &MethodData) -> TypeRef {
        let ty = method.return_type();
        match self.kind {
            BoundaryKind::ProcessToProcess => rt::ty(rt::BINARY_OUTPUT),
            _ if method.has_out_params() && self.kind.jni_end() => {
                Self::jni_substitute(rt::byte_array())
            }
            _ if method.has_out_params() => rt::byte_array(),
            _ if ty.is_void() => TypeRef::Void,
            _ => self.end_type(&method.return_marshaller, ty),
        }
    }

    fn overload_suffix(method: &MethodData) -> String {
        match method.overload_id {
            0 => String::new(),
            id => id.to_string(),
        }
    }

    pub fn end_name(&self, method: &MethodData) -> String {
        format!("{}{}", method.name(), Self::overload_suffix(method))
    }

    /// # Panics
    ///
    /// For [`BoundaryKind::NativeToNative`].
    pub fn entry_name(&self, method: &MethodData) -> String {
        assert!(
            self.kind.has_entry_point(),
            "NativeToNative calls its end point directly and has no entry point"
        );
        format!("{}0", self.end_name(method))
    }

    fn assemble(
        &self,
        name: String,
        return_type: TypeRef,
        prefix: Vec<Parameter>,
        method: &MethodData,
        param_type: impl Fn(&MarshallerData, &TypeRef) -> TypeRef,
        payload_type: TypeRef,
    ) -> Signature {
        let prefix_len = prefix.len();
        let mut params = prefix;
        params.extend(
            method
                .marshalled_params()
                .filter(|(param, m)| !self.is_batched(m, &param.ty))
                .map(|(param, m)| Parameter::new(param_type(m, &param.ty), parameter_name(&param.name))),
        );
        let payload = self.has_payload(method);
        if payload {
            params.push(Parameter::new(payload_type, "payload"));
        }
        Signature {
            name,
            return_type,
            params,
            prefix_len,
            payload,
        }
    }

    /// # Panics
    ///
    /// For [`BoundaryKind::NativeToNative`].
    pub fn entry_signature(&self, method: &MethodData) -> Signature {
        let name = self.entry_name(method);
        self.assemble(
            name,
            self.entry_return_type(method),
            self.entry_prefix(),
            method,
            |m, ty| self.entry_type(m, ty),
            self.entry_payload_type(),
        )
    }

    pub fn end_signature(&self, method: &MethodData) -> Signature {
        self.assemble(
            self.end_name(method),
            self.end_return_type(method),
            self.end_prefix(),
            method,
            |m, ty| self.end_type(m, ty),
            self.end_payload_type(),
        )
    }
}


#[cfg(test)]
#[path = "strategy/strategy_parameterized_tests.rs"]
mod strategy_parameterized_tests;
