//! Memoized lookup of declared types by qualified name

use crate::decl::{Round, TypeDecl};
use crate::types::TypeRef;
use std::collections::{BTreeMap, BTreeSet};

/// Append-only cache of declared types
///
/// Declarations are keyed by qualified name. Declared-type identity is stable
/// within a session, so entries are never replaced and the cache can be kept
/// across rounds.
#[derive(Debug, Clone, Default)]
pub struct TypeCache {
    types: BTreeMap<String, TypeDecl>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_round(round: &Round) -> Self {
        let mut cache = Self::new();
        cache.extend(round);
        cache
    }

    /// Add the declarations of `round` that are not cached yet
    pub fn extend(&mut self, round: &Round) {
        for decl in &round.types {
            self.insert(decl.clone());
        }
    }

    /// Insert a declaration unless one with the same name is cached
    pub fn insert(&mut self, decl: TypeDecl) -> bool {
        if self.types.contains_key(&decl.name) {
            return false;
        }
        self.types.insert(decl.name.clone(), decl);
        true
    }

    pub fn get(&self, qualified: &str) -> Option<&TypeDecl> {
        self.types.get(qualified)
    }

    pub fn contains(&self, qualified: &str) -> bool {
        self.types.contains_key(qualified)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Direct supertypes of `qualified`; unknown types have none
    pub fn direct_supertypes(&self, qualified: &str) -> Vec<&TypeRef> {
        self.get(qualified)
            .map(|decl| decl.supertypes().collect())
            .unwrap_or_default()
    }

    /// Member type `simple` declared directly in `owner`
    pub fn member_type(&self, owner: &str, simple: &str) -> Option<&TypeDecl> {
        self.get(&format!("{owner}.{simple}"))
    }

    /// Member type `simple` declared in `owner` or inherited from any of its
    /// supertypes, walked through superclasses and interfaces
    pub fn find_inherited_member(&self, owner: &str, simple: &str) -> Option<&TypeDecl> {
        let mut visited = BTreeSet::new();
        self.find_inherited_member_in(owner, simple, &mut visited)
    }

    fn find_inherited_member_in<'a>(
        &'a self,
        owner: &str,
        simple: &str,
        visited: &mut BTreeSet<String>,
    ) -> Option<&'a TypeDecl> {
        if !visited.insert(owner.to_string()) {
            return None;
        }
        if let Some(member) = self.member_type(owner, simple) {
            return Some(member);
        }
        for supertype in self.direct_supertypes(owner) {
            if let Some(name) = supertype.qualified_name()
                && let Some(found) = self.find_inherited_member_in(name, simple, visited)
            {
                return Some(found);
            }
        }
        None
    }

    /// Whether `sub` is `sup` or transitively extends or implements it
    ///
    /// Supertypes that are not cached still match by name, so runtime types
    /// referenced from declarations need not be part of the round.
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        let mut visited = BTreeSet::new();
        self.is_subtype_in(sub, sup, &mut visited)
    }

    fn is_subtype_in(&self, sub: &str, sup: &str, visited: &mut BTreeSet<String>) -> bool {
        if sub == sup {
            return true;
        }
        if !visited.insert(sub.to_string()) {
            return false;
        }
        self.direct_supertypes(sub).into_iter().any(|supertype| {
            supertype
                .qualified_name()
                .is_some_and(|name| self.is_subtype_in(name, sup, visited))
        })
    }

    /// Whether the declaration of `qualified` carries `annotation_type`
    pub fn has_annotation(&self, qualified: &str, annotation_type: &str) -> bool {
        use crate::decl::Annotated;
        self.get(qualified)
            .is_some_and(|decl| decl.has_annotation(annotation_type))
    }
}
