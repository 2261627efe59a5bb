//! isobridge-core - Declaration model, diagnostics and configuration
//!
//! This crate provides the foundational types shared by the isobridge generator:
//! - [`TypeRef`] and the qualified-name helpers for declared types
//! - [`Round`], [`TypeDecl`] and [`MethodDecl`] describing annotated input
//! - [`TypeCache`] for memoized declared-type lookups
//! - [`CompilationContext`] carrying diagnostics across a generation round
//! - [`GeneratorConfig`] loaded from `isobridge.toml`
//! - [`SourceWriter`] for handing generated files to the host

mod config;
mod context;
mod decl;
mod diagnostics;
mod error;
mod type_cache;
mod types;
mod writer;

pub use config::{GeneratorConfig, GeneratorSection, LoggingSection};
pub use context::CompilationContext;
pub use decl::{
    Annotated, AnnotationDecl, AnnotationValue, ConstructorDecl, ElementId, MethodDecl, Modifier,
    ParamDecl, Round, TypeDecl, TypeKind,
};
pub use diagnostics::{Diagnostic, DiagnosticSink, ExpectedError, TracingSink};
pub use error::{CoreError, CoreResult};
pub use type_cache::TypeCache;
pub use types::{Primitive, TypeRef, names};
pub use writer::{FileKind, GeneratedFile, MemoryWriter, SourceWriter};

/// Log levels accepted by the configuration file and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Parse a level name, case-insensitively
    pub fn parse(value: &str) -> CoreResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            _ => Err(CoreError::UnknownLogLevel(value.to_string())),
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Annotated, CompilationContext, CoreError, CoreResult, ElementId, GeneratorConfig,
        LogLevel, MethodDecl, Round, SourceWriter, TypeCache, TypeDecl, TypeRef,
    };
}
