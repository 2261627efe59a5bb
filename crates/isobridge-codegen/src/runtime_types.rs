//! Well-known types referenced by generated code
//!
//! Everything generated code calls at run time lives in the runtime package
//! or one of its two platform subpackages.

use isobridge_core::{Primitive, TypeRef};

pub const RUNTIME_PACKAGE: &str = "org.isobridge.runtime";
pub const JNI_PACKAGE: &str = "org.isobridge.runtime.jni";
pub const IMAGE_PACKAGE: &str = "org.isobridge.runtime.image";

// Markers and directives
pub const BY_REFERENCE: &str = "org.isobridge.runtime.ByReference";
pub const BY_PEER_REFERENCE: &str = "org.isobridge.runtime.ByPeerReference";
pub const RAW_REFERENCE: &str = "org.isobridge.runtime.RawReference";
pub const CUSTOM_DISPATCH_ACCESSOR: &str = "org.isobridge.runtime.CustomDispatchAccessor";
pub const CUSTOM_RECEIVER_ACCESSOR: &str = "org.isobridge.runtime.CustomReceiverAccessor";
pub const MUTABLE_PEER: &str = "org.isobridge.runtime.MutablePeer";
pub const EXPECT_ERROR: &str = "org.isobridge.runtime.ExpectError";
pub const MARSHALLER_ANNOTATION: &str = "org.isobridge.runtime.MarshallerAnnotation";
pub const IDEMPOTENT: &str = "org.isobridge.runtime.Idempotent";
pub const IN: &str = "org.isobridge.runtime.In";
pub const OUT: &str = "org.isobridge.runtime.Out";
pub const ISOLATE_DEATH_HANDLER: &str = "org.isobridge.runtime.IsolateDeathHandler";
pub const ALWAYS_BY_LOCAL_REFERENCE: &str = "org.isobridge.runtime.AlwaysByLocalReference";
pub const ALWAYS_BY_REMOTE_REFERENCE: &str = "org.isobridge.runtime.AlwaysByRemoteReference";

// Runtime support
pub const FOREIGN_OBJECT: &str = "org.isobridge.runtime.ForeignObject";
pub const FOREIGN_EXCEPTION: &str = "org.isobridge.runtime.ForeignException";
pub const PEER: &str = "org.isobridge.runtime.Peer";
pub const NATIVE_PEER: &str = "org.isobridge.runtime.NativePeer";
pub const MANAGED_PEER: &str = "org.isobridge.runtime.ManagedPeer";
pub const PROCESS_PEER: &str = "org.isobridge.runtime.ProcessPeer";
pub const NATIVE_ISOLATE: &str = "org.isobridge.runtime.NativeIsolate";
pub const NATIVE_ISOLATE_THREAD: &str = "org.isobridge.runtime.NativeIsolateThread";
pub const NATIVE_ISOLATE_CONFIG: &str = "org.isobridge.runtime.NativeIsolateConfig";
pub const PROCESS_ISOLATE: &str = "org.isobridge.runtime.ProcessIsolate";
pub const PROCESS_ISOLATE_THREAD: &str = "org.isobridge.runtime.ProcessIsolateThread";
pub const PROCESS_ISOLATE_CONFIG: &str = "org.isobridge.runtime.ProcessIsolateConfig";
pub const DISPATCH_HANDLER: &str = "org.isobridge.runtime.DispatchHandler";
pub const BINARY_MARSHALLER: &str = "org.isobridge.runtime.BinaryMarshaller";
pub const MARSHALLER_CONFIG: &str = "org.isobridge.runtime.MarshallerConfig";
pub const TYPE_LITERAL: &str = "org.isobridge.runtime.TypeLiteral";
pub const BINARY_INPUT: &str = "org.isobridge.runtime.BinaryInput";
pub const BINARY_OUTPUT: &str = "org.isobridge.runtime.BinaryOutput";
pub const BYTE_ARRAY_BINARY_OUTPUT: &str = "org.isobridge.runtime.BinaryOutput.ByteArrayBinaryOutput";
pub const CCHAR_POINTER_BINARY_OUTPUT: &str =
    "org.isobridge.runtime.BinaryOutput.CCharPointerBinaryOutput";
pub const REFERENCE_HANDLES: &str = "org.isobridge.runtime.ReferenceHandles";
pub const ISOLATE_DEATH_EXCEPTION: &str = "org.isobridge.runtime.IsolateDeathException";

// JNI side
pub const JNI_ENV: &str = "org.isobridge.runtime.jni.JNIEnv";
pub const JCLASS: &str = "org.isobridge.runtime.jni.JClass";
pub const JOBJECT: &str = "org.isobridge.runtime.jni.JObject";
pub const JSTRING: &str = "org.isobridge.runtime.jni.JString";
pub const JTHROWABLE: &str = "org.isobridge.runtime.jni.JThrowable";
pub const JOBJECT_ARRAY: &str = "org.isobridge.runtime.jni.JObjectArray";
pub const JNI_UTIL: &str = "org.isobridge.runtime.jni.JNIUtil";
pub const JNI_CALLS: &str = "org.isobridge.runtime.jni.JNICalls";
pub const JNI_METHOD_SCOPE: &str = "org.isobridge.runtime.jni.JNIMethodScope";
pub const JNI_ENTRY_POINT: &str = "org.isobridge.runtime.jni.JNIEntryPoint";

// Native image side
pub const IMAGE_INFO: &str = "org.isobridge.runtime.image.ImageInfo";
pub const ISOLATE_THREAD: &str = "org.isobridge.runtime.image.IsolateThread";
pub const CCHAR_POINTER: &str = "org.isobridge.runtime.image.CCharPointer";
pub const ENTRY_POINT: &str = "org.isobridge.runtime.image.EntryPoint";

pub const OVERRIDE: &str = "java.lang.Override";
pub const SUPPRESS_WARNINGS: &str = "java.lang.SuppressWarnings";

pub fn ty(qualified: &str) -> TypeRef {
    TypeRef::declared(qualified)
}

pub fn byte_array() -> TypeRef {
    TypeRef::array(TypeRef::BYTE)
}

pub fn long_array() -> TypeRef {
    TypeRef::array(TypeRef::LONG)
}

/// `J<Prim>Array` for a primitive component
pub fn jni_primitive_array(component: Primitive) -> TypeRef {
    TypeRef::declared(format!("{JNI_PACKAGE}.J{}Array", component.capitalized()))
}

/// The JNI-native representation of a managed type, if it has one
pub fn jni_type(managed: &TypeRef) -> Option<TypeRef> {
    match managed {
        TypeRef::Void | TypeRef::Primitive(_) | TypeRef::Wildcard => None,
        TypeRef::Array(component) => Some(match component.as_ref() {
            TypeRef::Primitive(primitive) => jni_primitive_array(*primitive),
            _ => ty(JOBJECT_ARRAY),
        }),
        TypeRef::Declared { name, .. } => Some(match name.as_str() {
            isobridge_core::names::STRING => ty(JSTRING),
            isobridge_core::names::CLASS => ty(JCLASS),
            isobridge_core::names::THROWABLE => ty(JTHROWABLE),
            _ => ty(JOBJECT),
        }),
    }
}

/// Whether `ty` is one of the JNI-native representations
pub fn is_jni_type(ty: &TypeRef) -> bool {
    ty.qualified_name()
        .is_some_and(|name| isobridge_core::names::package_of(name) == JNI_PACKAGE)
}
