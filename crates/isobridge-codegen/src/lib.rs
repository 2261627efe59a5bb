//! isobridge-codegen - Bridge definitions and start/end point generation
//!
//! This crate turns annotated declarations into generated bridge sources:
//! - [`BoundaryKind`] and its static [`Configuration`] table
//! - [`resolver`] validating declarations into [`ServiceDefinition`] and [`FactoryDefinition`]
//! - [`MarshallingStrategy`] deciding how every value crosses a boundary
//! - [`generator`] rendering start points, end points and factories
//! - [`Orchestrator`] running one generation round end to end

mod boundary;
mod error;
pub mod generator;
mod model;
mod orchestrator;
mod registration;
pub mod resolver;
pub mod runtime_types;
mod strategy;
#[cfg(test)]
mod test_support;

pub use boundary::{BoundaryKind, Configuration};
pub use error::{CodegenError, CodegenResult};
pub use generator::{GenerationPlan, Selector};
pub use model::{
    CustomDispatch, Definition, FactoryDefinition, Implementation, ImplementationAccess,
    MarshallerData, MarshallerKind, MethodData, ServiceDefinition,
};
pub use orchestrator::{Orchestrator, Phase, RoundReport};
pub use registration::registration_listing;
pub use strategy::{MarshallingStrategy, Signature};
