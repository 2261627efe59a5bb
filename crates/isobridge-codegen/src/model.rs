//! Direction-independent bridge definitions
//!
//! Definitions are produced once by the [`crate::resolver`] and never change
//! afterwards. Everything a generator decides about them lives in a separate
//! [`crate::GenerationPlan`].

use crate::boundary::BoundaryKind;
use crate::strategy::{MarshallingStrategy, Signature};
use isobridge_core::{AnnotationDecl, ElementId, MethodDecl, ParamDecl, TypeDecl, TypeRef, names};
use once_cell::unsync::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

/// How one value crosses a boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarshallerKind {
    /// Passed unchanged or written directly to the payload
    Value,
    /// An object reachable through a handle of the other side
    Reference,
    /// A peer handed over by its handle or as an opaque foreign object
    PeerReference,
    /// An untranslated platform reference
    RawReference,
    /// Serialized by a marshaller looked up from the marshaller configuration
    Custom,
}

/// Transfer range of an `In` or `Out` parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionData {
    /// `int` parameter holding the first array index to transfer
    pub offset_parameter: Option<String>,
    /// `int` parameter holding the number of array elements to transfer
    pub length_parameter: Option<String>,
    /// Copy back only as many elements as the method returns
    pub trim_to_result: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarshallerData {
    pub kind: MarshallerKind,
    /// The marshalled type; the component type for reference arrays
    pub for_type: TypeRef,
    /// Marshaller field name, only for [`MarshallerKind::Custom`]
    pub name: Option<String>,
    pub same_direction: bool,
    /// Annotations selecting the custom marshaller variant
    pub annotations: Vec<AnnotationDecl>,
    /// Bridged class a reference is wrapped into, only for [`MarshallerKind::Reference`]
    pub reference_type: Option<TypeRef>,
    /// Present when the caller's value is sent to the callee
    pub direction_in: Option<DirectionData>,
    /// Present when the callee's updates are copied back into the caller's value
    pub direction_out: Option<DirectionData>,
}

impl MarshallerData {
    pub fn value(ty: TypeRef) -> Self {
        Self {
            kind: MarshallerKind::Value,
            for_type: ty,
            name: None,
            same_direction: true,
            annotations: Vec::new(),
            reference_type: None,
            direction_in: None,
            direction_out: None,
        }
    }

    pub fn custom(ty: TypeRef, name: impl Into<String>, annotations: Vec<AnnotationDecl>) -> Self {
        Self {
            kind: MarshallerKind::Custom,
            for_type: ty,
            name: Some(name.into()),
            same_direction: true,
            annotations,
            reference_type: None,
            direction_in: None,
            direction_out: None,
        }
    }

    pub fn reference(for_type: TypeRef, reference_type: TypeRef, same_direction: bool) -> Self {
        Self {
            kind: MarshallerKind::Reference,
            for_type,
            name: None,
            same_direction,
            annotations: Vec::new(),
            reference_type: Some(reference_type),
            direction_in: None,
            direction_out: None,
        }
    }

    pub fn peer_reference(ty: TypeRef, same_direction: bool) -> Self {
        Self {
            kind: MarshallerKind::PeerReference,
            for_type: ty,
            name: None,
            same_direction,
            annotations: Vec::new(),
            reference_type: None,
            direction_in: None,
            direction_out: None,
        }
    }

    pub fn raw_reference() -> Self {
        Self {
            kind: MarshallerKind::RawReference,
            for_type: TypeRef::declared(names::OBJECT),
            name: None,
            same_direction: true,
            annotations: Vec::new(),
            reference_type: None,
            direction_in: None,
            direction_out: None,
        }
    }

    /// The throwable marshaller every definition carries
    pub fn throwable() -> Self {
        Self::custom(
            TypeRef::declared(names::THROWABLE),
            "throwableMarshaller",
            Vec::new(),
        )
    }

    /// The same marshaller with explicit `In` and `Out` modifiers
    pub fn with_directions(mut self, direction_in: Option<DirectionData>, direction_out: Option<DirectionData>) -> Self {
        self.direction_in = direction_in;
        self.direction_out = direction_out;
        self
    }

    pub fn is_custom(&self) -> bool {
        self.kind == MarshallerKind::Custom
    }

    pub fn is_out(&self) -> bool {
        self.direction_out.is_some()
    }

    /// Whether the caller's value is sent; values without modifiers always are
    pub fn is_in(&self) -> bool {
        self.direction_in.is_some() || self.direction_out.is_none()
    }

    pub fn has_direction(&self) -> bool {
        self.direction_in.is_some() || self.direction_out.is_some()
    }

    /// The range of the value sent, falling back to the copied-back range
    pub fn direction(&self) -> Option<&DirectionData> {
        self.direction_in.as_ref().or(self.direction_out.as_ref())
    }

    pub fn field_name(&self) -> &str {
        self.name.as_deref().unwrap_or("marshaller")
    }
}

/// Start-point field caching the result of an idempotent method
#[derive(Debug, Clone, PartialEq)]
pub struct CacheData {
    pub field_name: String,
    /// The return type, boxed when primitive
    pub ty: TypeRef,
}

/// A method a start point overrides, with its marshalling decisions
#[derive(Debug, Clone)]
pub struct MethodData {
    /// The method as a member of the annotated type
    pub method: MethodDecl,
    /// Qualified name of the type declaring the method
    pub declaring_type: String,
    /// One entry per parameter in declaration order
    pub params: Vec<MarshallerData>,
    pub return_marshaller: MarshallerData,
    /// Non-zero when several generated methods share the name
    pub overload_id: u32,
    /// Whether the first parameter is the receiver of a custom dispatch
    pub has_receiver: bool,
    /// Present for idempotent methods
    pub cache: Option<CacheData>,
    /// Class notified when the process isolate dies during the call
    pub isolate_death_handler: Option<TypeRef>,
    entry_signature: OnceCell<Signature>,
    end_signature: OnceCell<Signature>,
}

impl MethodData {
    pub fn new(
        method: MethodDecl,
        declaring_type: impl Into<String>,
        params: Vec<MarshallerData>,
        return_marshaller: MarshallerData,
        overload_id: u32,
        has_receiver: bool,
    ) -> Self {
        Self {
            method,
            declaring_type: declaring_type.into(),
            params,
            return_marshaller,
            overload_id,
            has_receiver,
            cache: None,
            isolate_death_handler: None,
            entry_signature: OnceCell::new(),
            end_signature: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.method.name
    }

    pub fn return_type(&self) -> &TypeRef {
        &self.method.return_type
    }

    /// Parameters crossing the boundary with their marshallers; a custom
    /// dispatch receiver travels as the handle instead
    pub fn marshalled_params(&self) -> impl Iterator<Item = (&ParamDecl, &MarshallerData)> {
        let skip = usize::from(self.has_receiver);
        self.method
            .params
            .iter()
            .zip(self.params.iter())
            .skip(skip)
    }

    pub fn has_out_params(&self) -> bool {
        self.marshalled_params().any(|(_, m)| m.is_out())
    }

    pub fn receiver_param(&self) -> Option<&ParamDecl> {
        if self.has_receiver {
            self.method.params.first()
        } else {
            None
        }
    }

    pub fn element_id(&self) -> ElementId {
        ElementId::of_method(&self.declaring_type, &self.method)
    }

    /// Entry-point signature, computed once per definition
    ///
    /// # Panics
    ///
    /// For a kind without entry point.
    pub fn entry_signature(&self, strategy: &MarshallingStrategy) -> &Signature {
        self.entry_signature
            .get_or_init(|| strategy.entry_signature(self))
    }

    /// End-point signature, computed once per definition
    pub fn end_signature(&self, strategy: &MarshallingStrategy) -> &Signature {
        self.end_signature.get_or_init(|| strategy.end_signature(self))
    }
}

/// Static accessors resolving the receiver of a custom dispatch class
#[derive(Debug, Clone, PartialEq)]
pub struct CustomDispatch {
    pub dispatch_accessor: MethodDecl,
    pub receiver_accessor: MethodDecl,
    /// Parameter type shared by both accessors
    pub receiver_type: TypeRef,
}

/// One service generation target for one boundary kind
#[derive(Debug, Clone)]
pub struct ServiceDefinition {
    pub kind: BoundaryKind,
    pub annotated: TypeDecl,
    /// The bridged interface or superclass
    pub service_type: TypeRef,
    pub peer_type: TypeRef,
    pub factory: TypeRef,
    pub mutable: bool,
    pub methods: Vec<MethodData>,
    /// Parameters of the annotated type's constructor, forwarded by start points
    pub constructor_params: Vec<ParamDecl>,
    pub custom_dispatch: Option<CustomDispatch>,
    pub marshaller_config: TypeRef,
    pub throwable_marshaller: MarshallerData,
    pub include: Option<TypeRef>,
    /// Annotations never copied to generated overrides
    pub ignore_annotations: BTreeSet<String>,
    /// Annotations taking part in custom marshaller lookup
    pub marshaller_annotations: BTreeSet<String>,
    /// Class-level isolate death handler, the default for every method
    pub isolate_death_handler: Option<TypeRef>,
    /// Types always passed as references living on the calling side, with
    /// the bridged class wrapping them
    pub always_by_local_reference: BTreeMap<String, TypeRef>,
    /// Types always passed as references living on the called side
    pub always_by_remote_reference: BTreeMap<String, TypeRef>,
}

impl ServiceDefinition {
    pub fn element_id(&self) -> ElementId {
        self.annotated.element_id()
    }

    pub fn package(&self) -> &str {
        self.annotated.package()
    }

    pub fn has_custom_dispatch(&self) -> bool {
        self.custom_dispatch.is_some()
    }

    /// Distinct custom marshallers of parameters and results, in first-use order
    pub fn custom_marshallers(&self) -> Vec<&MarshallerData> {
        let mut seen = BTreeSet::new();
        self.methods
            .iter()
            .flat_map(|m| {
                m.marshalled_params()
                    .map(|(_, marshaller)| marshaller)
                    .chain(std::iter::once(&m.return_marshaller))
            })
            .filter(|m| m.is_custom())
            .filter(|m| seen.insert(m.field_name().to_string()))
            .collect()
    }
}

/// How the initializer obtains the implementation instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImplementationAccess {
    /// Non-private no-argument constructor
    Constructor,
    /// Non-private static no-argument method with this name
    StaticAccessor(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Implementation {
    pub ty: TypeRef,
    pub access: ImplementationAccess,
}

/// One factory generation target for one boundary kind
#[derive(Debug, Clone)]
pub struct FactoryDefinition {
    pub kind: BoundaryKind,
    pub annotated: TypeDecl,
    pub initial_service: TypeRef,
    /// Logical service type of the initial service
    pub service_type: TypeRef,
    pub implementation: Option<Implementation>,
    pub marshaller_config: TypeRef,
    pub throwable_marshaller: MarshallerData,
    pub include: Option<TypeRef>,
    pub isolate_handler: Option<TypeRef>,
    /// Services multiplexed over one process channel, in id order
    pub services: Vec<TypeRef>,
}

impl FactoryDefinition {
    pub fn element_id(&self) -> ElementId {
        self.annotated.element_id()
    }

    pub fn package(&self) -> &str {
        self.annotated.package()
    }
}

/// A resolved definition of either flavor
#[derive(Debug, Clone)]
pub enum Definition {
    Service(ServiceDefinition),
    Factory(FactoryDefinition),
}

impl Definition {
    pub fn kind(&self) -> BoundaryKind {
        match self {
            Definition::Service(service) => service.kind,
            Definition::Factory(factory) => factory.kind,
        }
    }

    pub fn annotated(&self) -> &TypeDecl {
        match self {
            Definition::Service(service) => &service.annotated,
            Definition::Factory(factory) => &factory.annotated,
        }
    }

    pub fn marshaller_config(&self) -> &TypeRef {
        match self {
            Definition::Service(service) => &service.marshaller_config,
            Definition::Factory(factory) => &factory.marshaller_config,
        }
    }

    pub fn include(&self) -> Option<&TypeRef> {
        match self {
            Definition::Service(service) => service.include.as_ref(),
            Definition::Factory(factory) => factory.include.as_ref(),
        }
    }

    /// Whether both definitions can be served by one implementation
    pub fn is_compatible_with(&self, other: &Definition) -> bool {
        self.marshaller_config() == other.marshaller_config() && self.include() == other.include()
    }

    /// Simple name of the generated companion class
    pub fn gen_simple_name(&self) -> String {
        gen_simple_name(self.annotated())
    }
}

/// `<Simple>Gen` for an annotated type
pub fn gen_simple_name(annotated: &TypeDecl) -> String {
    format!("{}Gen", annotated.simple_name())
}

/// Qualified name of the companion class generated for `qualified`
pub fn gen_qualified_name(qualified: &str) -> String {
    format!("{qualified}Gen")
}
