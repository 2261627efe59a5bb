//! Type references for primitive, declared and array types
//!
//! Type references travel through the round description as strings such as
//! `int`, `java.lang.String[]` or `java.util.List<java.lang.String>`. Package
//! boundaries follow the usual naming convention: the first capitalized
//! segment of a qualified name starts the type path, so
//! `org.acme.Outer.Inner` names the member type `Inner` of `org.acme.Outer`.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Qualified-name helpers and well-known type names
pub mod names {
    pub const OBJECT: &str = "java.lang.Object";
    pub const STRING: &str = "java.lang.String";
    pub const CLASS: &str = "java.lang.Class";
    pub const THROWABLE: &str = "java.lang.Throwable";
    pub const JAVA_LANG: &str = "java.lang";

    /// Byte offset where the type path of `qualified` starts.
    fn type_start(qualified: &str) -> usize {
        let mut offset = 0;
        for segment in qualified.split('.') {
            if segment.starts_with(|c: char| c.is_ascii_uppercase()) {
                return offset;
            }
            offset += segment.len() + 1;
        }
        qualified.rfind('.').map_or(0, |idx| idx + 1)
    }

    /// Package of a qualified type name, empty for the default package
    pub fn package_of(qualified: &str) -> &str {
        match type_start(qualified) {
            0 => "",
            start => &qualified[..start - 1],
        }
    }

    /// Last segment of a qualified name
    pub fn simple_name_of(qualified: &str) -> &str {
        match qualified.rfind('.') {
            Some(idx) => &qualified[idx + 1..],
            None => qualified,
        }
    }

    /// Qualified name of the top-level type containing `qualified`
    pub fn top_level_of(qualified: &str) -> &str {
        let start = type_start(qualified);
        match qualified[start..].find('.') {
            Some(idx) => &qualified[..start + idx],
            None => qualified,
        }
    }

    /// Qualified name of the type declaring `qualified`, if it is a member type
    pub fn enclosing_of(qualified: &str) -> Option<&str> {
        let start = type_start(qualified);
        qualified[start..]
            .rfind('.')
            .map(|idx| &qualified[..start + idx])
    }

    /// Join a package and a simple name
    pub fn qualify(package: &str, simple: &str) -> String {
        if package.is_empty() {
            simple.to_string()
        } else {
            format!("{package}.{simple}")
        }
    }
}

/// Primitive types of the generated language
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::Char,
        Primitive::Short,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// Capitalized form used in codec and JNI method names, e.g. `writeInt`
    pub fn capitalized(self) -> &'static str {
        match self {
            Primitive::Boolean => "Boolean",
            Primitive::Byte => "Byte",
            Primitive::Char => "Char",
            Primitive::Short => "Short",
            Primitive::Int => "Int",
            Primitive::Long => "Long",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Primitive::ALL.into_iter().find(|p| p.keyword() == keyword)
    }
}

/// A reference to a type as written in a signature
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    Void,
    Primitive(Primitive),
    Declared { name: String, args: Vec<TypeRef> },
    Array(Box<TypeRef>),
    Wildcard,
}

impl TypeRef {
    pub const VOID: TypeRef = TypeRef::Void;
    pub const BOOLEAN: TypeRef = TypeRef::Primitive(Primitive::Boolean);
    pub const INT: TypeRef = TypeRef::Primitive(Primitive::Int);
    pub const LONG: TypeRef = TypeRef::Primitive(Primitive::Long);
    pub const BYTE: TypeRef = TypeRef::Primitive(Primitive::Byte);

    /// A raw declared type
    pub fn declared(name: impl Into<String>) -> Self {
        TypeRef::Declared {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A parameterized declared type
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Declared {
            name: name.into(),
            args,
        }
    }

    pub fn array(component: TypeRef) -> Self {
        TypeRef::Array(Box::new(component))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array(_))
    }

    pub fn is_declared(&self) -> bool {
        matches!(self, TypeRef::Declared { .. })
    }

    /// One-dimensional array of a primitive type
    pub fn is_primitive_array(&self) -> bool {
        matches!(self, TypeRef::Array(component) if component.is_primitive())
    }

    pub fn component(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Array(component) => Some(component),
            _ => None,
        }
    }

    /// Innermost component of a (possibly multi-dimensional) array
    pub fn element_type(&self) -> &TypeRef {
        match self {
            TypeRef::Array(component) => component.element_type(),
            other => other,
        }
    }

    pub fn qualified_name(&self) -> Option<&str> {
        match self {
            TypeRef::Declared { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn simple_name(&self) -> Option<&str> {
        self.qualified_name().map(names::simple_name_of)
    }

    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Declared { args, .. } => args,
            _ => &[],
        }
    }

    /// Whether this is the declared type `qualified`, ignoring type arguments
    pub fn is_named(&self, qualified: &str) -> bool {
        self.qualified_name() == Some(qualified)
    }

    /// The type with all type arguments removed
    pub fn erasure(&self) -> TypeRef {
        match self {
            TypeRef::Declared { name, .. } => TypeRef::declared(name.clone()),
            TypeRef::Array(component) => TypeRef::array(component.erasure()),
            other => other.clone(),
        }
    }

    /// Whether the type carries no type arguments at any level
    pub fn is_raw(&self) -> bool {
        *self == self.erasure()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => write!(f, "void"),
            TypeRef::Primitive(primitive) => write!(f, "{}", primitive.keyword()),
            TypeRef::Declared { name, args } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (idx, arg) in args.iter().enumerate() {
                        if idx > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Array(component) => write!(f, "{component}[]"),
            TypeRef::Wildcard => write!(f, "?"),
        }
    }
}

impl FromStr for TypeRef {
    type Err = CoreError;

    fn from_str(input: &str) -> CoreResult<Self> {
        let mut parser = TypeParser { input, pos: 0 };
        let ty = parser.parse_type()?;
        parser.skip_whitespace();
        if parser.pos != input.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        value.parse()
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn error(&self, reason: &str) -> CoreError {
        CoreError::InvalidType {
            input: self.input.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> CoreResult<&'a str> {
        self.skip_whitespace();
        let input = self.input;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.') {
                break;
            }
            self.pos += c.len_utf8();
        }
        let ident = &input[start..self.pos];
        if ident.is_empty() {
            return Err(self.error("expected a type name"));
        }
        if ident.starts_with('.') || ident.ends_with('.') || ident.contains("..") {
            return Err(self.error("malformed qualified name"));
        }
        Ok(ident)
    }

    fn parse_type(&mut self) -> CoreResult<TypeRef> {
        if self.eat('?') {
            return Ok(TypeRef::Wildcard);
        }
        let ident = self.identifier()?;
        let mut ty = if ident == "void" {
            TypeRef::Void
        } else if let Some(primitive) = Primitive::from_keyword(ident) {
            TypeRef::Primitive(primitive)
        } else {
            TypeRef::declared(ident)
        };
        if self.eat('<') {
            let TypeRef::Declared { args, .. } = &mut ty else {
                return Err(self.error("type arguments on a non-declared type"));
            };
            loop {
                args.push(self.parse_type()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.error("expected `,` or `>`"));
            }
        }
        while self.eat('[') {
            if !self.eat(']') {
                return Err(self.error("expected `]`"));
            }
            if ty.is_void() {
                return Err(self.error("void cannot be an array component"));
            }
            ty = TypeRef::array(ty);
        }
        Ok(ty)
    }
}


#[cfg(test)]
#[path = "types/types_parameterized_tests.rs"]
mod types_parameterized_tests;
