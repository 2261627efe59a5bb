//! Declarations of annotated elements supplied by the discovery collaborator
//!
//! A [`Round`] is the unit of work: every type declaration visible to the
//! generator in one compilation round, including the annotated services and
//! factories as well as the types they refer to.

use crate::error::CoreResult;
use crate::types::{TypeRef, names};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// All declarations of one compilation round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Round {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

impl Round {
    /// Parse a round from JSON bytes
    pub fn from_json(bytes: &[u8]) -> CoreResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Read a round from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_json(&bytes)
    }

    pub fn get(&self, qualified: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|decl| decl.name == qualified)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Final,
    Default,
    Native,
}

impl Modifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Abstract => "abstract",
            Modifier::Final => "final",
            Modifier::Default => "default",
            Modifier::Native => "native",
        }
    }
}

/// Value of an annotation attribute
///
/// Type-valued attributes are written as qualified names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<AnnotationValue>),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnnotationValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// String items of a list value; a single string counts as a one-item list
    pub fn str_items(&self) -> Vec<&str> {
        match self {
            AnnotationValue::Str(value) => vec![value.as_str()],
            AnnotationValue::List(items) => items.iter().filter_map(|v| v.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

/// An annotation attached to a type, method or parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDecl {
    /// Qualified name of the annotation type
    #[serde(rename = "type")]
    pub annotation_type: String,

    #[serde(default)]
    pub values: BTreeMap<String, AnnotationValue>,
}

impl AnnotationDecl {
    pub fn new(annotation_type: impl Into<String>) -> Self {
        Self {
            annotation_type: annotation_type.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: AnnotationValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn value(&self, key: &str) -> Option<&AnnotationValue> {
        self.values.get(key)
    }

    pub fn str_value(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(AnnotationValue::as_str)
    }

    pub fn str_list(&self, key: &str) -> Vec<&str> {
        self.value(key)
            .map(AnnotationValue::str_items)
            .unwrap_or_default()
    }

    pub fn simple_name(&self) -> &str {
        names::simple_name_of(&self.annotation_type)
    }
}

/// Anything that carries annotations
pub trait Annotated {
    fn annotations(&self) -> &[AnnotationDecl];

    fn annotation(&self, annotation_type: &str) -> Option<&AnnotationDecl> {
        self.annotations()
            .iter()
            .find(|a| a.annotation_type == annotation_type)
    }

    fn has_annotation(&self, annotation_type: &str) -> bool {
        self.annotation(annotation_type).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeRef,

    #[serde(default)]
    pub annotations: Vec<AnnotationDecl>,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }
}

impl Annotated for ParamDecl {
    fn annotations(&self) -> &[AnnotationDecl] {
        &self.annotations
    }
}

fn void() -> TypeRef {
    TypeRef::Void
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,

    #[serde(default)]
    pub modifiers: Vec<Modifier>,

    #[serde(default)]
    pub params: Vec<ParamDecl>,

    #[serde(default = "void", rename = "returns")]
    pub return_type: TypeRef,

    #[serde(default)]
    pub throws: Vec<TypeRef>,

    /// Annotations on the method; marshaller markers here apply to the return value
    #[serde(default)]
    pub annotations: Vec<AnnotationDecl>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Vec::new(),
            params: Vec::new(),
            return_type: TypeRef::Void,
            throws: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_static(&self) -> bool {
        self.has_modifier(Modifier::Static)
    }

    pub fn is_private(&self) -> bool {
        self.has_modifier(Modifier::Private)
    }

    pub fn is_final(&self) -> bool {
        self.has_modifier(Modifier::Final)
    }

    /// Abstract when declared in `owner`; interface methods are abstract
    /// unless they have a body
    pub fn is_abstract_in(&self, owner: TypeKind) -> bool {
        match owner {
            TypeKind::Interface => {
                !self.is_static()
                    && !self.is_private()
                    && !self.has_modifier(Modifier::Default)
            }
            _ => self.has_modifier(Modifier::Abstract),
        }
    }

    /// Erased parameter types, used to match overrides
    pub fn erased_params(&self) -> Vec<TypeRef> {
        self.params.iter().map(|p| p.ty.erasure()).collect()
    }

    /// Human readable signature, e.g. `compute(int, java.lang.String)`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.to_string()).collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

impl Annotated for MethodDecl {
    fn annotations(&self) -> &[AnnotationDecl] {
        &self.annotations
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    #[serde(default)]
    pub modifiers: Vec<Modifier>,

    #[serde(default)]
    pub params: Vec<ParamDecl>,
}

impl ConstructorDecl {
    pub fn is_private(&self) -> bool {
        self.modifiers.contains(&Modifier::Private)
    }
}

/// One declared type of the round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Qualified name; member types use `pkg.Outer.Inner`
    pub name: String,

    #[serde(default)]
    pub kind: TypeKind,

    #[serde(default)]
    pub modifiers: Vec<Modifier>,

    #[serde(default)]
    pub superclass: Option<TypeRef>,

    #[serde(default)]
    pub interfaces: Vec<TypeRef>,

    #[serde(default)]
    pub annotations: Vec<AnnotationDecl>,

    #[serde(default)]
    pub methods: Vec<MethodDecl>,

    #[serde(default)]
    pub constructors: Vec<ConstructorDecl>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub fn package(&self) -> &str {
        names::package_of(&self.name)
    }

    pub fn simple_name(&self) -> &str {
        names::simple_name_of(&self.name)
    }

    pub fn is_top_level(&self) -> bool {
        names::enclosing_of(&self.name).is_none()
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn as_type(&self) -> TypeRef {
        TypeRef::declared(self.name.clone())
    }

    pub fn element_id(&self) -> ElementId {
        ElementId::of_type(&self.name)
    }

    /// Superclass followed by the implemented interfaces
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeRef> {
        self.superclass.iter().chain(self.interfaces.iter())
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDecl> {
        self.methods.iter().filter(move |m| m.name == name)
    }
}

impl Annotated for TypeDecl {
    fn annotations(&self) -> &[AnnotationDecl] {
        &self.annotations
    }
}

/// Identity of an element diagnostics are attached to
///
/// Types are identified by their qualified name, methods by
/// `pkg.Type#name(params)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(String);

impl ElementId {
    pub fn of_type(qualified: &str) -> Self {
        ElementId(qualified.to_string())
    }

    pub fn of_method(owner: &str, method: &MethodDecl) -> Self {
        ElementId(format!("{owner}#{}", method.signature()))
    }

    /// The type element owning this element
    pub fn owner(&self) -> ElementId {
        match self.0.split_once('#') {
            Some((owner, _)) => ElementId(owner.to_string()),
            None => self.clone(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "decl/decl_tests.rs"]
mod decl_tests;
