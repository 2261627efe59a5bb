//! Per-generator decisions taken before any text is emitted

use crate::boundary::BoundaryKind;
use crate::model::Definition;

/// Factory method dispatching on the run-time context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Called when running inside a native image
    pub in_image: String,
    /// Called everywhere else
    pub outside: String,
}

/// How one definition is rendered next to its siblings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    pub kind: BoundaryKind,
    /// The sibling's start and end points serve this definition too
    pub shared_implementation: bool,
    pub start_point: String,
    pub end_point: String,
    pub factory_method: String,
    pub emits_factory_method: bool,
    /// Kind whose end point the start point calls directly when in image
    pub runtime_branch: Option<BoundaryKind>,
    pub selector: Option<Selector>,
}

impl GenerationPlan {
    /// Plan of a definition with no sibling to share with
    pub fn standalone(kind: BoundaryKind) -> Self {
        Self {
            kind,
            shared_implementation: false,
            start_point: format!("{}StartPoint", kind.prefix()),
            end_point: format!("{}EndPoint", kind.prefix()),
            factory_method: "create".to_string(),
            emits_factory_method: true,
            runtime_branch: None,
            selector: None,
        }
    }

    /// Plan `definition` against every other definition of the same element
    pub fn configure(definition: &Definition, siblings: &[&Definition]) -> Self {
        let kind = definition.kind();
        let mut plan = Self::standalone(kind);
        let Some(partner_kind) = kind.sharing_partner() else {
            return plan;
        };
        let Some(partner) = siblings.iter().find(|s| s.kind() == partner_kind) else {
            return plan;
        };
        let candidate = kind.configuration().common_factory;
        let compatible = definition.is_compatible_with(partner);
        match (candidate, compatible) {
            (true, true) => {
                plan.shared_implementation = true;
                plan.start_point = format!("{}StartPoint", partner_kind.prefix());
                plan.end_point = format!("{}EndPoint", partner_kind.prefix());
                plan.emits_factory_method = false;
            }
            (false, true) => plan.runtime_branch = Some(partner_kind),
            (true, false) => {
                plan.factory_method = format!("create{}", kind.prefix());
                plan.selector = Some(Selector {
                    in_image: plan.factory_method.clone(),
                    outside: format!("create{}", partner_kind.prefix()),
                });
            }
            (false, false) => plan.factory_method = format!("create{}", kind.prefix()),
        }
        tracing::debug!(
            element = %definition.annotated().name,
            kind = %kind,
            partner = %partner_kind,
            compatible,
            shared = plan.shared_implementation,
            "planned sibling definitions"
        );
        plan
    }
}

/// Plan all definitions of one element, in the given order
///
/// Sharing pairs exactly two definitions; a pairable element with more is
/// rejected with the message to report.
pub fn plan_element(definitions: &[&Definition]) -> Result<Vec<GenerationPlan>, String> {
    let pairable = definitions.iter().any(|d| {
        d.kind()
            .sharing_partner()
            .is_some_and(|partner| definitions.iter().any(|s| s.kind() == partner))
    });
    if pairable && definitions.len() > 2 {
        let kinds: Vec<String> = definitions.iter().map(|d| d.kind().to_string()).collect();
        return Err(format!(
            "Only two boundary kinds can be generated for one element when `{}` and `{}` share an implementation, found: {}.",
            BoundaryKind::ManagedToNative,
            BoundaryKind::NativeToNative,
            kinds.join(", ")
        ));
    }
    Ok(definitions
        .iter()
        .enumerate()
        .map(|(index, definition)| {
            let siblings: Vec<&Definition> = definitions
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .map(|(_, d)| *d)
                .collect();
            GenerationPlan::configure(definition, &siblings)
        })
        .collect())
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod plan_tests;
