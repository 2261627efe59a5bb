//! One generation round, from discovery to written files
//!
//! Phases run in a fixed order and never backtrack:
//! ```text
//! Discover → Parse → CrossValidate → Configure → Emit → Write
//! ```
//! Problems with declarations are diagnostics on the [`CompilationContext`];
//! the affected element is dropped and the round continues with the rest.

use crate::boundary::BoundaryKind;
use crate::error::{CodegenError, CodegenResult};
use crate::generator::{GenerationPlan, element_generators, generate_unit, plan_element};
use crate::model::{Definition, ServiceDefinition};
use crate::registration::registration_listing;
use crate::resolver::{register_expected_errors, resolve_factory, resolve_service};
use isobridge_core::{
    Annotated, CompilationContext, ElementId, GeneratedFile, GeneratorConfig, Round, SourceWriter,
    TypeDecl,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Phases of a round, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Collect every type carrying a bridge or factory marker
    Discover,
    /// Resolve markers into definitions
    Parse,
    /// Checks spanning several definitions
    CrossValidate,
    /// Decide sharing between the definitions of one element
    Configure,
    /// Render compilation units
    Emit,
    /// Hand files to the writer
    Write,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Discover,
        Phase::Parse,
        Phase::CrossValidate,
        Phase::Configure,
        Phase::Emit,
        Phase::Write,
    ];

    /// The phase following this one, `None` after [`Phase::Write`]
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Discover => Some(Phase::Parse),
            Phase::Parse => Some(Phase::CrossValidate),
            Phase::CrossValidate => Some(Phase::Configure),
            Phase::Configure => Some(Phase::Emit),
            Phase::Emit => Some(Phase::Write),
            Phase::Write => None,
        }
    }

    /// Whether `check` runs this phase
    pub fn runs_in_check(&self) -> bool {
        matches!(self, Phase::Discover | Phase::Parse | Phase::CrossValidate | Phase::Configure)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Discover => write!(f, "Discover"),
            Phase::Parse => write!(f, "Parse"),
            Phase::CrossValidate => write!(f, "CrossValidate"),
            Phase::Configure => write!(f, "Configure"),
            Phase::Emit => write!(f, "Emit"),
            Phase::Write => write!(f, "Write"),
        }
    }
}

/// Outcome of one round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    /// Qualified names of the discovered elements
    pub elements: Vec<String>,
    /// Elements dropped because of an error, their own or their factory's
    pub failed: Vec<String>,
    /// Paths handed to the writer, in write order
    pub written: Vec<String>,
    /// Diagnostics reported this round
    pub errors: usize,
}

impl RoundReport {
    pub fn is_success(&self) -> bool {
        self.errors == 0 && self.failed.is_empty()
    }

    /// Elements that made it through every phase
    pub fn generated(&self) -> impl Iterator<Item = &str> {
        self.elements
            .iter()
            .filter(|name| !self.failed.contains(*name))
            .map(String::as_str)
    }
}

/// Element being carried through the round
struct Element<'r> {
    decl: &'r TypeDecl,
    definitions: Vec<Definition>,
    plans: Vec<GenerationPlan>,
}

impl Element<'_> {
    fn id(&self) -> ElementId {
        self.decl.element_id()
    }
}

/// Runs generation rounds
#[derive(Debug, Clone)]
pub struct Orchestrator {
    header: Option<String>,
    registrations: bool,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            header: None,
            registrations: true,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            header: config.generator.header.clone(),
            registrations: config.generator.registrations,
        }
    }

    /// Comment placed at the top of every generated source
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Whether provider listings for process services are written
    pub fn with_registrations(mut self, enabled: bool) -> Self {
        self.registrations = enabled;
        self
    }

    /// Run every phase and hand the generated files to `writer`
    ///
    /// Returns `Err` only when the writer fails; declaration problems end up
    /// in the context's diagnostics and the report.
    pub fn generate(
        &self,
        ctx: &mut CompilationContext,
        round: &Round,
        writer: &mut dyn SourceWriter,
    ) -> CodegenResult<RoundReport> {
        let (mut report, elements) = self.analyze(ctx, round);

        tracing::debug!(phase = %Phase::Emit, elements = elements.len(), "entering phase");
        let mut files = Vec::new();
        for element in &elements {
            let definitions: Vec<&Definition> = element.definitions.iter().collect();
            let generators = element_generators(&definitions, element.plans.clone());
            if let Some(file) = generate_unit(ctx.types(), self.header.as_deref(), &generators) {
                files.push(file);
            }
        }
        if self.registrations {
            let services: Vec<&ServiceDefinition> = elements
                .iter()
                .flat_map(|element| &element.definitions)
                .filter_map(|definition| match definition {
                    Definition::Service(service) => Some(service),
                    Definition::Factory(_) => None,
                })
                .collect();
            files.extend(registration_listing(services));
        }

        tracing::debug!(phase = %Phase::Write, files = files.len(), "entering phase");
        for file in &files {
            write_file(writer, file)?;
            report.written.push(file.path.clone());
        }
        report.errors = ctx.error_count();

        tracing::info!(
            elements = report.elements.len(),
            failed = report.failed.len(),
            written = report.written.len(),
            errors = report.errors,
            "generation round complete"
        );
        Ok(report)
    }

    /// Run the validating phases only; nothing is rendered or written
    pub fn check(&self, ctx: &mut CompilationContext, round: &Round) -> RoundReport {
        let (mut report, _) = self.analyze(ctx, round);
        report.errors = ctx.error_count();
        tracing::info!(
            elements = report.elements.len(),
            failed = report.failed.len(),
            errors = report.errors,
            "check round complete"
        );
        report
    }

    /// Discover through Configure, returning the elements left to emit
    fn analyze<'r>(
        &self,
        ctx: &mut CompilationContext,
        round: &'r Round,
    ) -> (RoundReport, Vec<Element<'r>>) {
        ctx.begin_round();
        ctx.types_mut().extend(round);
        let mut report = RoundReport::default();

        tracing::debug!(phase = %Phase::Discover, types = round.types.len(), "entering phase");
        let mut discovered: Vec<&TypeDecl> = round.types.iter().filter(|decl| is_element(decl)).collect();
        discovered.sort_by(|a, b| a.name.cmp(&b.name));
        report.elements = discovered.iter().map(|decl| decl.name.clone()).collect();

        tracing::debug!(phase = %Phase::Parse, elements = discovered.len(), "entering phase");
        for decl in &discovered {
            register_expected_errors(ctx, decl);
        }
        let mut elements: Vec<Element<'r>> = discovered
            .into_iter()
            .map(|decl| Element {
                decl,
                definitions: parse(ctx, decl),
                plans: Vec::new(),
            })
            .collect();

        tracing::debug!(phase = %Phase::CrossValidate, "entering phase");
        for element in &elements {
            check_initial_service(ctx, element);
        }
        let failed_factories: BTreeSet<ElementId> = elements
            .iter()
            .map(Element::id)
            .filter(|id| ctx.has_errors(id))
            .collect();
        for element in &mut elements {
            element.definitions.retain(|definition| match definition {
                Definition::Service(service) => {
                    let orphaned = service
                        .factory
                        .qualified_name()
                        .is_some_and(|factory| failed_factories.contains(&ElementId::of_type(factory)));
                    if orphaned {
                        tracing::debug!(
                            element = %service.annotated.name,
                            factory = %service.factory,
                            "dropping service of a failed factory"
                        );
                    }
                    !orphaned
                }
                Definition::Factory(_) => true,
            });
        }

        tracing::debug!(phase = %Phase::Configure, "entering phase");
        for element in &mut elements {
            if ctx.has_errors(&element.id()) || element.definitions.is_empty() {
                continue;
            }
            let definitions: Vec<&Definition> = element.definitions.iter().collect();
            match plan_element(&definitions) {
                Ok(plans) => element.plans = plans,
                Err(message) => ctx.emit_error(&element.id(), None, message),
            }
        }
        for element in &elements {
            ctx.verify_expectations(&element.id());
        }

        let (kept, dropped): (Vec<_>, Vec<_>) = elements.into_iter().partition(|element| {
            !ctx.has_errors(&element.id()) && !element.definitions.is_empty()
        });
        report.failed = dropped.iter().map(|element| element.decl.name.clone()).collect();
        (report, kept)
    }
}

/// Whether `decl` carries any bridge or factory marker
fn is_element(decl: &TypeDecl) -> bool {
    decl.annotations.iter().any(|annotation| {
        BoundaryKind::ALL.iter().any(|kind| {
            let configuration = kind.configuration();
            configuration.service_marker == annotation.annotation_type
                || configuration.accepts_factory_marker(&annotation.annotation_type)
        })
    })
}

/// Every definition `decl` declares, in kind order
fn parse(ctx: &mut CompilationContext, decl: &TypeDecl) -> Vec<Definition> {
    let mut definitions = Vec::new();
    for kind in BoundaryKind::ALL {
        let configuration = kind.configuration();
        let definition = if decl.has_annotation(&configuration.service_marker) {
            resolve_service(ctx, decl, kind).map(Definition::Service)
        } else if decl.has_annotation(configuration.factory_marker()) {
            resolve_factory(ctx, decl, kind).map(Definition::Factory)
        } else {
            None
        };
        definitions.extend(definition);
    }
    tracing::debug!(element = %decl.name, definitions = definitions.len(), "parsed element");
    definitions
}

/// All factory definitions of one element must start from the same service
fn check_initial_service(ctx: &mut CompilationContext, element: &Element<'_>) {
    let initial: BTreeSet<String> = element
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            Definition::Factory(factory) => Some(factory.initial_service.to_string()),
            Definition::Service(_) => None,
        })
        .collect();
    if initial.len() > 1 {
        let names: Vec<String> = initial.into_iter().map(|name| format!("`{name}`")).collect();
        ctx.emit_error(
            &element.id(),
            None,
            format!(
                "Inconsistent `initialService` values: all factory markers of `{}` must name the same service, found {}.",
                element.decl.simple_name(),
                names.join(", ")
            ),
        );
    }
}

fn write_file(writer: &mut dyn SourceWriter, file: &GeneratedFile) -> CodegenResult<()> {
    writer.write(file).map_err(|source| CodegenError::EmitFailed {
        path: file.path.clone(),
        source,
    })?;
    tracing::info!(path = %file.path, "wrote generated file");
    Ok(())
}
