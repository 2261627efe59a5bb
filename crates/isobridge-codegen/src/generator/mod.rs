//! Rendering of start points, end points and factories
//!
//! Every element gets one `<Simple>Gen` compilation unit. Each definition
//! found on the element contributes through a [`BridgeGenerator`], called in
//! four passes: constants, factory methods, selectors shared between two
//! kinds, and the nested start- and end-point classes.

mod direction;
mod end_point;
mod factory;
mod marshal;
mod plan;
mod process;
mod start_point;

pub use plan::{GenerationPlan, Selector, plan_element};

use crate::boundary::BoundaryKind;
use crate::model::{Definition, MarshallerData, ServiceDefinition, gen_qualified_name, gen_simple_name};
use crate::runtime_types as rt;
use isobridge_core::{GeneratedFile, Primitive, TypeCache, TypeRef, names};
use isobridge_emit::{Parameter, SourceEmitter};

/// Renders one definition into the element's compilation unit
#[derive(Debug, Clone)]
pub struct BridgeGenerator<'d> {
    definition: &'d Definition,
    plan: GenerationPlan,
    partner: Option<&'d Definition>,
}

impl<'d> BridgeGenerator<'d> {
    /// `partner` is the sibling of the sharing partner kind, if present
    pub fn new(definition: &'d Definition, plan: GenerationPlan, partner: Option<&'d Definition>) -> Self {
        Self {
            definition,
            plan,
            partner,
        }
    }

    pub fn definition(&self) -> &'d Definition {
        self.definition
    }

    pub fn plan(&self) -> &GenerationPlan {
        &self.plan
    }

    /// Sibling whose end point the start point reaches directly in image
    fn branch_partner(&self) -> Option<&'d Definition> {
        self.plan
            .runtime_branch
            .and(self.partner)
            .filter(|partner| Some(partner.kind()) == self.plan.runtime_branch)
    }

    /// Constants of the generated class
    pub fn generate_fields(&self, e: &mut SourceEmitter<'_>) {
        if self.plan.shared_implementation {
            return;
        }
        match self.definition {
            Definition::Service(service) if service.kind == BoundaryKind::ProcessToProcess => {
                process::service_fields(e, service)
            }
            Definition::Factory(factory) if factory.kind == BoundaryKind::ProcessToProcess => {
                process::factory_fields(e, factory)
            }
            _ => {}
        }
    }

    /// Static methods callers use: factory methods and process dispatchers
    pub fn generate_api(&self, e: &mut SourceEmitter<'_>) {
        match self.definition {
            Definition::Service(service) => {
                if self.plan.emits_factory_method {
                    start_point::factory_method(e, service, &self.plan);
                }
                if service.kind == BoundaryKind::ProcessToProcess {
                    process::service_dispatch(e, service, &self.plan);
                }
            }
            Definition::Factory(factory) => {
                if self.plan.emits_factory_method {
                    factory::create(e, factory, &self.plan, self.branch_partner().is_some());
                }
                if factory.kind == BoundaryKind::ProcessToProcess {
                    process::factory_api(e, factory);
                }
            }
        }
    }

    /// The selector choosing between two independently generated kinds
    pub fn generate_shared_factory(&self, e: &mut SourceEmitter<'_>) {
        let Some(selector) = &self.plan.selector else {
            return;
        };
        let (return_type, params) = match self.definition {
            Definition::Service(service) => (
                service.annotated.as_type(),
                start_point::factory_params(service),
            ),
            Definition::Factory(factory) => (
                factory.initial_service.clone(),
                factory.kind.configuration().factory_params.clone(),
            ),
        };
        let args: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
        let args = args.join(", ");
        e.member_break();
        e.method_start("static", Some(&return_type), "create", &params, &[]);
        let in_image = e.invoke_static_expr(&rt::ty(rt::IMAGE_INFO), "inImageCode", &[]);
        e.line(&format!("if ({in_image}) {{"));
        e.indent();
        e.line(&format!("return {}({args});", selector.in_image));
        e.dedent();
        e.line("} else {");
        e.indent();
        e.line(&format!("return {}({args});", selector.outside));
        e.dedent();
        e.line("}");
        e.method_end();
    }

    /// Nested start- and end-point classes
    pub fn generate_impl(&self, e: &mut SourceEmitter<'_>) {
        if self.plan.shared_implementation {
            return;
        }
        let branch = self.branch_partner();
        match self.definition {
            Definition::Service(service) => {
                let branch = branch.and_then(|partner| match partner {
                    Definition::Service(partner) => Some(partner),
                    Definition::Factory(_) => None,
                });
                start_point::emit(e, service, &self.plan, branch);
                end_point::emit(e, service, &self.plan, branch);
            }
            Definition::Factory(factory) => {
                factory::emit_impl(e, factory, &self.plan, branch.is_some());
            }
        }
    }
}

/// Generators for one element's definitions, paired with their plans
pub fn element_generators<'d>(
    definitions: &[&'d Definition],
    plans: Vec<GenerationPlan>,
) -> Vec<BridgeGenerator<'d>> {
    definitions
        .iter()
        .zip(plans)
        .map(|(definition, plan)| {
            let partner = definition
                .kind()
                .sharing_partner()
                .and_then(|partner| definitions.iter().find(|d| d.kind() == partner).copied());
            BridgeGenerator::new(definition, plan, partner)
        })
        .collect()
}

/// Render the `<Simple>Gen` unit of one element
///
/// Returns `None` when there is nothing to generate.
pub fn generate_unit(
    types: &TypeCache,
    header: Option<&str>,
    generators: &[BridgeGenerator<'_>],
) -> Option<GeneratedFile> {
    let annotated = generators.first()?.definition.annotated();
    let package = annotated.package();
    let gen_simple = gen_simple_name(annotated);
    let gen_qualified = gen_qualified_name(&annotated.name);
    let mut e = SourceEmitter::new(types, package).with_header(header);
    e.reserve(&gen_simple, &gen_qualified);
    for generator in generators.iter().filter(|g| !g.plan.shared_implementation) {
        for nested in [&generator.plan.start_point, &generator.plan.end_point] {
            e.reserve(nested, &format!("{gen_qualified}.{nested}"));
        }
    }

    e.class_start("final", &gen_simple, None, &[]);
    for generator in generators {
        generator.generate_fields(&mut e);
    }
    e.member_break();
    e.method_start("private", None, &gen_simple, &[], &[]);
    e.method_end();
    for generator in generators {
        generator.generate_api(&mut e);
    }
    for generator in generators {
        generator.generate_shared_factory(&mut e);
    }
    for generator in generators {
        generator.generate_impl(&mut e);
    }
    e.class_end();

    tracing::debug!(unit = %gen_qualified, generators = generators.len(), "rendered unit");
    Some(GeneratedFile::source(package, &gen_simple, e.build()))
}

/// Wrapper class of a primitive, the type itself otherwise
pub(crate) fn boxed(ty: &TypeRef) -> TypeRef {
    let TypeRef::Primitive(primitive) = ty else {
        return ty.clone();
    };
    let simple = match primitive {
        Primitive::Boolean => "Boolean",
        Primitive::Byte => "Byte",
        Primitive::Char => "Character",
        Primitive::Short => "Short",
        Primitive::Int => "Integer",
        Primitive::Long => "Long",
        Primitive::Float => "Float",
        Primitive::Double => "Double",
    };
    TypeRef::declared(names::qualify(names::JAVA_LANG, simple))
}

/// Marshaller fields and the static block looking them up
fn marshaller_fields(e: &mut SourceEmitter<'_>, config: &TypeRef, marshallers: &[&MarshallerData]) {
    for m in marshallers {
        let ty = TypeRef::generic(rt::BINARY_MARSHALLER, vec![boxed(&m.for_type)]);
        e.field("private static final", &ty, m.field_name(), None);
    }
    e.member_break();
    e.line("static {");
    e.indent();
    let config_type = e.render_type(&rt::ty(rt::MARSHALLER_CONFIG));
    let instance = e.invoke_static_expr(config, "getInstance", &[]);
    e.line(&format!("{config_type} marshallerConfig = {instance};"));
    for m in marshallers {
        let mut args = vec![if m.for_type.type_args().is_empty() {
            e.class_literal(&m.for_type)
        } else {
            let literal = TypeRef::generic(rt::TYPE_LITERAL, vec![m.for_type.clone()]);
            format!("new {}() {{}}", e.render_type(&literal))
        }];
        for annotation in &m.annotations {
            args.push(e.class_literal(&TypeRef::declared(annotation.annotation_type.clone())));
        }
        e.line(&format!(
            "{} = marshallerConfig.lookupMarshaller({});",
            m.field_name(),
            args.join(", ")
        ));
    }
    e.dedent();
    e.line("}");
}

/// Throwable marshaller first, then the service's custom marshallers
fn service_marshallers(service: &ServiceDefinition) -> Vec<&MarshallerData> {
    std::iter::once(&service.throwable_marshaller)
        .chain(
            service
                .custom_marshallers()
                .into_iter()
                .filter(|m| m.field_name() != service.throwable_marshaller.field_name()),
        )
        .collect()
}

/// Binary name of a qualified name, nested classes joined with `$`
///
/// Segments from the first capitalized one on are taken as classes.
pub(crate) fn binary_name(qualified: &str) -> String {
    let mut out = String::with_capacity(qualified.len());
    let mut in_class = false;
    for (index, segment) in qualified.split('.').enumerate() {
        if index > 0 {
            out.push(if in_class { '$' } else { '.' });
        }
        in_class |= segment.starts_with(|c: char| c.is_ascii_uppercase());
        out.push_str(segment);
    }
    out
}

/// JNI type descriptor, e.g. `[Ljava/lang/String;`
pub(crate) fn jni_descriptor(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Void => "V".to_string(),
        TypeRef::Primitive(primitive) => match primitive {
            Primitive::Boolean => "Z",
            Primitive::Byte => "B",
            Primitive::Char => "C",
            Primitive::Short => "S",
            Primitive::Int => "I",
            Primitive::Long => "J",
            Primitive::Float => "F",
            Primitive::Double => "D",
        }
        .to_string(),
        TypeRef::Array(component) => format!("[{}", jni_descriptor(component)),
        TypeRef::Declared { name, .. } => format!("L{};", binary_name(name).replace('.', "/")),
        TypeRef::Wildcard => format!("L{};", names::OBJECT.replace('.', "/")),
    }
}

/// `(JI[B)I` for an end-point signature
pub(crate) fn method_descriptor(params: &[Parameter], return_type: &TypeRef) -> String {
    let params: String = params.iter().map(|p| jni_descriptor(&p.ty)).collect();
    format!("({params}){}", jni_descriptor(return_type))
}
