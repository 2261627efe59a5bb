//! # isobridge
//!
//! Generates the start-point and end-point classes through which calls cross
//! an isolation boundary: managed heap to native isolate and back, native
//! isolate to native isolate, and process to process.
//!
//! ## Generating a Round
//!
//! ```ignore
//! use isobridge::prelude::*;
//!
//! let round = Round::from_file("round.json")?;
//! let mut ctx = CompilationContext::new(TypeCache::new());
//! let mut writer = MemoryWriter::new();
//!
//! let report = Orchestrator::new().generate(&mut ctx, &round, &mut writer)?;
//! for diagnostic in ctx.diagnostics() {
//!     eprintln!("error: {diagnostic}");
//! }
//! println!("{} file(s) generated", report.written.len());
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`isobridge_core`] - Declarations, diagnostics, configuration and writers
//! - [`isobridge_emit`] - Import-aware source text emission
//! - [`isobridge_codegen`] - Definition resolution and stub generation

// Re-export core types
pub use isobridge_core::{
    CompilationContext, CoreError, CoreResult, Diagnostic, DiagnosticSink, ElementId,
    GeneratedFile, GeneratorConfig, LogLevel, MemoryWriter, Round, SourceWriter, TracingSink,
    TypeCache, TypeDecl, TypeRef,
};

// Re-export the emitter
pub use isobridge_emit::{Parameter, SourceEmitter};

// Re-export generation types
pub use isobridge_codegen::{
    BoundaryKind, CodegenError, CodegenResult, Definition, FactoryDefinition, MarshallingStrategy,
    Orchestrator, Phase, RoundReport, ServiceDefinition, Signature, registration_listing,
};

// Re-export common dependencies hosts need
pub use serde_json;
pub use tracing;

/// Prelude module for convenient imports.
///
/// Use `use isobridge::prelude::*;` to run a round end to end.
pub mod prelude {
    pub use crate::{
        BoundaryKind, CompilationContext, GeneratorConfig, MemoryWriter, Orchestrator, Round,
        RoundReport, SourceWriter, TypeCache,
    };
}
