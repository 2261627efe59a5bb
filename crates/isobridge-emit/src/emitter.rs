//! Scope-aware source text builder

use crate::parameter::Parameter;
use isobridge_core::{TypeCache, TypeDecl, TypeRef, names};
use std::collections::BTreeMap;

const INDENT: &str = "    ";

/// Occupant of a simple name within the compilation unit
#[derive(Debug, Clone)]
struct NameEntry {
    qualified: String,
    import: bool,
}

/// A class currently being emitted; its supertypes contribute inherited
/// member types
#[derive(Debug, Clone, Default)]
struct Scope {
    supertypes: Vec<String>,
}

/// Accumulates the text of one compilation unit
///
/// Simple names are claimed by the first type written under them. Later types
/// sharing a simple name are written fully qualified, as is any type hidden by
/// a member type inherited into one of the enclosing classes.
pub struct SourceEmitter<'c> {
    types: &'c TypeCache,
    package: String,
    header: Option<String>,
    body: String,
    indent: usize,
    names: BTreeMap<String, NameEntry>,
    scopes: Vec<Scope>,
}

impl<'c> SourceEmitter<'c> {
    pub fn new(types: &'c TypeCache, package: impl Into<String>) -> Self {
        Self {
            types,
            package: package.into(),
            header: None,
            body: String::new(),
            indent: 0,
            names: BTreeMap::new(),
            scopes: Vec::new(),
        }
    }

    /// Comment lines placed above the package declaration
    pub fn with_header(mut self, header: Option<&str>) -> Self {
        self.header = header.map(str::to_string);
        self
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Claim `simple` for a type declared in this compilation unit
    ///
    /// Returns `false` when the name is already taken by another type.
    pub fn reserve(&mut self, simple: &str, qualified: &str) -> bool {
        match self.names.get(simple) {
            Some(entry) => entry.qualified == qualified,
            None => {
                self.names.insert(
                    simple.to_string(),
                    NameEntry {
                        qualified: qualified.to_string(),
                        import: false,
                    },
                );
                true
            }
        }
    }

    /// Text for `ty` as it must be written at the current position
    pub fn render_type(&mut self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Void => "void".to_string(),
            TypeRef::Primitive(primitive) => primitive.keyword().to_string(),
            TypeRef::Wildcard => "?".to_string(),
            TypeRef::Array(component) => format!("{}[]", self.render_type(component)),
            TypeRef::Declared { name, args } => {
                let base = self.render_declared(name);
                if args.is_empty() {
                    return base;
                }
                let args: Vec<String> = args.iter().map(|arg| self.render_type(arg)).collect();
                format!("{base}<{}>", args.join(", "))
            }
        }
    }

    fn render_declared(&mut self, qualified: &str) -> String {
        let simple = names::simple_name_of(qualified);
        if let Some(member) = self.inherited_member(simple) {
            if member.name == qualified {
                return simple.to_string();
            }
            tracing::trace!(
                ty = qualified,
                hidden_by = member.name.as_str(),
                "qualifying type hidden by inherited member"
            );
            return qualified.to_string();
        }
        let occupant = self.names.get(simple).map(|entry| entry.qualified == qualified);
        if occupant == Some(true) {
            return simple.to_string();
        }
        if let Some(enclosing) = names::enclosing_of(qualified) {
            return format!("{}.{simple}", self.render_declared(enclosing));
        }
        if occupant.is_some() {
            return qualified.to_string();
        }
        let package = names::package_of(qualified);
        if package == names::JAVA_LANG {
            let local = names::qualify(&self.package, simple);
            if local != qualified && self.types.contains(&local) {
                return qualified.to_string();
            }
        }
        let import = !(package.is_empty() || package == self.package || package == names::JAVA_LANG);
        self.names.insert(
            simple.to_string(),
            NameEntry {
                qualified: qualified.to_string(),
                import,
            },
        );
        simple.to_string()
    }

    /// Member type named `simple` inherited by the innermost class declaring one
    fn inherited_member(&self, simple: &str) -> Option<&'c TypeDecl> {
        let types = self.types;
        self.scopes.iter().rev().find_map(|scope| {
            scope
                .supertypes
                .iter()
                .find_map(|supertype| types.find_inherited_member(supertype, simple))
        })
    }

    /// Qualified names imported so far, sorted
    pub fn imports(&self) -> Vec<String> {
        let mut imports: Vec<String> = self
            .names
            .values()
            .filter(|entry| entry.import)
            .map(|entry| entry.qualified.clone())
            .collect();
        imports.sort();
        imports
    }

    pub fn write(&mut self, text: &str) -> &mut Self {
        self.body.push_str(text);
        self
    }

    pub fn write_type(&mut self, ty: &TypeRef) -> &mut Self {
        let rendered = self.render_type(ty);
        self.write(&rendered)
    }

    /// Start a line at the current indentation
    pub fn line_start(&mut self, text: &str) -> &mut Self {
        for _ in 0..self.indent {
            self.body.push_str(INDENT);
        }
        self.write(text)
    }

    pub fn line_end(&mut self, text: &str) -> &mut Self {
        self.body.push_str(text);
        self.body.push('\n');
        self
    }

    pub fn line(&mut self, text: &str) -> &mut Self {
        self.line_start(text).line_end("")
    }

    pub fn blank(&mut self) -> &mut Self {
        self.body.push('\n');
        self
    }

    /// Blank line between class members, skipped after an opening brace
    pub fn member_break(&mut self) -> &mut Self {
        let body = &self.body;
        if !(body.is_empty() || body.ends_with("{\n") || body.ends_with("\n\n")) {
            self.body.push('\n');
        }
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.indent += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self
    }

    /// Open a class declaration and enter its scope
    pub fn class_start(
        &mut self,
        modifiers: &str,
        name: &str,
        superclass: Option<&TypeRef>,
        interfaces: &[TypeRef],
    ) -> &mut Self {
        let mut decl = String::new();
        if !modifiers.is_empty() {
            decl.push_str(modifiers);
            decl.push(' ');
        }
        decl.push_str("class ");
        decl.push_str(name);
        if let Some(superclass) = superclass {
            decl.push_str(" extends ");
            decl.push_str(&self.render_type(superclass));
        }
        if !interfaces.is_empty() {
            let rendered: Vec<String> = interfaces.iter().map(|i| self.render_type(i)).collect();
            decl.push_str(" implements ");
            decl.push_str(&rendered.join(", "));
        }
        decl.push_str(" {");
        self.line(&decl);
        self.indent();
        let supertypes = superclass
            .into_iter()
            .chain(interfaces)
            .filter_map(|ty| ty.qualified_name().map(str::to_string))
            .collect();
        self.scopes.push(Scope { supertypes });
        self
    }

    pub fn class_end(&mut self) -> &mut Self {
        self.scopes.pop();
        self.dedent();
        self.line("}")
    }

    fn method_head(
        &mut self,
        modifiers: &str,
        return_type: Option<&TypeRef>,
        name: &str,
        params: &[Parameter],
        throws: &[TypeRef],
    ) -> String {
        let mut head = String::new();
        if !modifiers.is_empty() {
            head.push_str(modifiers);
            head.push(' ');
        }
        if let Some(return_type) = return_type {
            head.push_str(&self.render_type(return_type));
            head.push(' ');
        }
        head.push_str(name);
        let params: Vec<String> = params
            .iter()
            .map(|p| format!("{} {}", self.render_type(&p.ty), p.name))
            .collect();
        head.push('(');
        head.push_str(&params.join(", "));
        head.push(')');
        if !throws.is_empty() {
            let throws: Vec<String> = throws.iter().map(|t| self.render_type(t)).collect();
            head.push_str(" throws ");
            head.push_str(&throws.join(", "));
        }
        head
    }

    /// Open a method body; constructors pass no return type
    pub fn method_start(
        &mut self,
        modifiers: &str,
        return_type: Option<&TypeRef>,
        name: &str,
        params: &[Parameter],
        throws: &[TypeRef],
    ) -> &mut Self {
        let head = self.method_head(modifiers, return_type, name, params, throws);
        self.line(&format!("{head} {{"));
        self.indent()
    }

    /// A method without body, such as a native method
    pub fn method_declaration(
        &mut self,
        modifiers: &str,
        return_type: &TypeRef,
        name: &str,
        params: &[Parameter],
    ) -> &mut Self {
        let head = self.method_head(modifiers, Some(return_type), name, params, &[]);
        self.line(&format!("{head};"))
    }

    pub fn method_end(&mut self) -> &mut Self {
        self.dedent();
        self.line("}")
    }

    /// Annotation line; a lone `value` attribute is written positionally
    pub fn annotation(&mut self, ty: &TypeRef, attributes: &[(&str, String)]) -> &mut Self {
        let name = self.render_type(ty);
        let text = match attributes {
            [] => format!("@{name}"),
            [("value", value)] => format!("@{name}({value})"),
            _ => {
                let attributes: Vec<String> = attributes
                    .iter()
                    .map(|(key, value)| format!("{key} = {value}"))
                    .collect();
                format!("@{name}({})", attributes.join(", "))
            }
        };
        self.line(&text)
    }

    pub fn field(
        &mut self,
        modifiers: &str,
        ty: &TypeRef,
        name: &str,
        initializer: Option<&str>,
    ) -> &mut Self {
        let ty = self.render_type(ty);
        let mut text = String::new();
        if !modifiers.is_empty() {
            text.push_str(modifiers);
            text.push(' ');
        }
        text.push_str(&format!("{ty} {name}"));
        if let Some(initializer) = initializer {
            text.push_str(&format!(" = {initializer}"));
        }
        text.push(';');
        self.line(&text)
    }

    /// `T.class` for the erasure of `ty`
    pub fn class_literal(&mut self, ty: &TypeRef) -> String {
        format!("{}.class", self.render_type(&ty.erasure()))
    }

    pub fn new_instance_expr(&mut self, ty: &TypeRef, args: &[String]) -> String {
        format!("new {}({})", self.render_type(ty), args.join(", "))
    }

    pub fn invoke_static_expr(&mut self, ty: &TypeRef, method: &str, args: &[String]) -> String {
        format!("{}.{method}({})", self.render_type(ty), args.join(", "))
    }

    pub fn invoke(&self, receiver: &str, method: &str, args: &[String]) -> String {
        format!("{receiver}.{method}({})", args.join(", "))
    }

    pub fn string_literal(&self, value: &str) -> String {
        let mut literal = String::with_capacity(value.len() + 2);
        literal.push('"');
        for c in value.chars() {
            match c {
                '"' => literal.push_str("\\\""),
                '\\' => literal.push_str("\\\\"),
                '\n' => literal.push_str("\\n"),
                '\r' => literal.push_str("\\r"),
                '\t' => literal.push_str("\\t"),
                other => literal.push(other),
            }
        }
        literal.push('"');
        literal
    }

    /// Header, package declaration, sorted imports and the accumulated body
    pub fn build(self) -> String {
        let mut out = String::new();
        if let Some(header) = &self.header {
            for line in header.lines() {
                out.push_str(&format!("// {line}\n"));
            }
            out.push('\n');
        }
        if !self.package.is_empty() {
            out.push_str(&format!("package {};\n\n", self.package));
        }
        let imports = self.imports();
        for import in &imports {
            out.push_str(&format!("import {import};\n"));
        }
        if !imports.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.body);
        out
    }
}

#[cfg(test)]
#[path = "emitter/emitter_tests.rs"]
mod emitter_tests;
