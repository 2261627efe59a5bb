//! Boundary kinds and their static configuration

use crate::error::CodegenError;
use crate::runtime_types as rt;
use isobridge_core::TypeRef;
use isobridge_emit::Parameter;
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;

/// Direction of a call crossing an isolation boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoundaryKind {
    /// Managed heap calling into a native isolate through a native method
    ManagedToNative,
    /// Native isolate calling into the managed heap through JNI
    NativeToManaged,
    /// Native isolate calling the end point of another isolate directly
    NativeToNative,
    /// One process messaging another over a process channel
    ProcessToProcess,
}

impl BoundaryKind {
    pub const ALL: [BoundaryKind; 4] = [
        BoundaryKind::ManagedToNative,
        BoundaryKind::NativeToManaged,
        BoundaryKind::NativeToNative,
        BoundaryKind::ProcessToProcess,
    ];

    /// The kind a reference handed across this boundary points back through
    pub fn reverse(self) -> BoundaryKind {
        match self {
            BoundaryKind::ManagedToNative => BoundaryKind::NativeToManaged,
            BoundaryKind::NativeToManaged => BoundaryKind::ManagedToNative,
            other => other,
        }
    }

    /// Whether the crossing goes through an entry point method
    pub fn has_entry_point(self) -> bool {
        self != BoundaryKind::NativeToNative
    }

    /// Whether the end point receives JNI-native representations
    pub fn jni_end(self) -> bool {
        self == BoundaryKind::ManagedToNative
    }

    /// Whether the entry point passes JNI-native representations
    pub fn jni_entry(self) -> bool {
        self == BoundaryKind::NativeToManaged
    }

    /// Kind whose definitions on the same element may share this one's implementation
    pub fn sharing_partner(self) -> Option<BoundaryKind> {
        match self {
            BoundaryKind::NativeToNative => Some(BoundaryKind::ManagedToNative),
            BoundaryKind::ManagedToNative => Some(BoundaryKind::NativeToNative),
            _ => None,
        }
    }

    /// Class name prefix, e.g. `ManagedToNative`
    pub fn prefix(self) -> &'static str {
        match self {
            BoundaryKind::ManagedToNative => "ManagedToNative",
            BoundaryKind::NativeToManaged => "NativeToManaged",
            BoundaryKind::NativeToNative => "NativeToNative",
            BoundaryKind::ProcessToProcess => "ProcessToProcess",
        }
    }

    pub fn configuration(self) -> &'static Configuration {
        &CONFIGURATIONS[self as usize]
    }

    /// The kind whose service marker is `annotation_type`
    pub fn for_service_marker(annotation_type: &str) -> Option<BoundaryKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.configuration().service_marker == annotation_type)
    }

    /// The kind whose own factory marker is `annotation_type`
    pub fn for_factory_marker(annotation_type: &str) -> Option<BoundaryKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.configuration().factory_marker() == annotation_type)
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

impl FromStr for BoundaryKind {
    type Err = CodegenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "managedtonative" | "m2n" => Ok(BoundaryKind::ManagedToNative),
            "nativetomanaged" | "n2m" => Ok(BoundaryKind::NativeToManaged),
            "nativetonative" | "n2n" => Ok(BoundaryKind::NativeToNative),
            "processtoprocess" | "p2p" => Ok(BoundaryKind::ProcessToProcess),
            _ => Err(CodegenError::UnknownBoundary(value.to_string())),
        }
    }
}

/// Static contract of one boundary kind
#[derive(Debug, Clone)]
pub struct Configuration {
    pub kind: BoundaryKind,
    /// Marker selecting this direction on a service type
    pub service_marker: String,
    /// Factory markers a service of this kind may name as owner; the first
    /// is the kind's own
    pub factory_markers: Vec<String>,
    /// Type of the proxy reaching the other side
    pub peer_type: TypeRef,
    /// Parameters a generated start point accepts after the annotated
    /// type's own constructor parameters
    pub peer_constructor_params: Vec<Parameter>,
    /// Parameters of the generated factory `create` method
    pub factory_params: Vec<Parameter>,
    /// Whether definitions of this kind can take part in a shared factory
    pub common_factory: bool,
}

impl Configuration {
    pub fn factory_marker(&self) -> &str {
        &self.factory_markers[0]
    }

    pub fn accepts_factory_marker(&self, annotation_type: &str) -> bool {
        self.factory_markers.iter().any(|m| m == annotation_type)
    }

    pub fn peer_simple_name(&self) -> &str {
        self.peer_type.simple_name().unwrap_or("Peer")
    }
}

fn service_marker(kind: BoundaryKind) -> String {
    format!("{}.Generate{}Bridge", rt::RUNTIME_PACKAGE, kind.prefix())
}

fn factory_marker(kind: BoundaryKind) -> String {
    format!("{}.Generate{}Factory", rt::RUNTIME_PACKAGE, kind.prefix())
}

fn configuration(kind: BoundaryKind) -> Configuration {
    let (peer, factory_param) = match kind {
        BoundaryKind::ManagedToNative | BoundaryKind::NativeToNative => (
            rt::NATIVE_PEER,
            Parameter::new(rt::ty(rt::NATIVE_ISOLATE_CONFIG), "config"),
        ),
        BoundaryKind::NativeToManaged => {
            (rt::MANAGED_PEER, Parameter::new(rt::ty(rt::JNI_ENV), "jniEnv"))
        }
        BoundaryKind::ProcessToProcess => (
            rt::PROCESS_PEER,
            Parameter::new(rt::ty(rt::PROCESS_ISOLATE_CONFIG), "config"),
        ),
    };
    let mut factory_markers = vec![factory_marker(kind)];
    if let Some(partner) = kind.sharing_partner() {
        factory_markers.push(factory_marker(partner));
    }
    Configuration {
        kind,
        service_marker: service_marker(kind),
        factory_markers,
        peer_type: rt::ty(peer),
        peer_constructor_params: vec![Parameter::new(rt::ty(peer), "peer")],
        factory_params: vec![factory_param],
        common_factory: matches!(
            kind,
            BoundaryKind::NativeToNative | BoundaryKind::ProcessToProcess
        ),
    }
}

static CONFIGURATIONS: Lazy<[Configuration; 4]> = Lazy::new(|| BoundaryKind::ALL.map(configuration));
