//! Provider listings for process services
//!
//! A process factory's isolate discovers the services it hosts through
//! `META-INF/isobridge/<factory>`, one generated class name per line.

use crate::boundary::BoundaryKind;
use crate::model::{ServiceDefinition, gen_qualified_name};
use isobridge_core::GeneratedFile;
use std::collections::{BTreeMap, BTreeSet};

/// Directory holding the listings, relative to the output root
pub const REGISTRATION_DIR: &str = "META-INF/isobridge";

/// One listing per factory owning at least one process service
///
/// Services of other kinds are ignored. Listings come out ordered by factory
/// name and list their classes sorted.
pub fn registration_listing<'a>(
    services: impl IntoIterator<Item = &'a ServiceDefinition>,
) -> Vec<GeneratedFile> {
    let mut by_factory: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    for service in services {
        if service.kind != BoundaryKind::ProcessToProcess {
            continue;
        }
        let Some(factory) = service.factory.qualified_name() else {
            continue;
        };
        by_factory
            .entry(factory)
            .or_default()
            .insert(gen_qualified_name(&service.annotated.name));
    }
    by_factory
        .into_iter()
        .map(|(factory, classes)| {
            let mut content = String::new();
            for class in classes {
                content.push_str(&class);
                content.push('\n');
            }
            tracing::debug!(factory, "registration listing");
            GeneratedFile::resource(format!("{REGISTRATION_DIR}/{factory}"), content)
        })
        .collect()
}
