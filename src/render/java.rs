//! Java code generation using genco

use super::Provenance;
use crate::config::RenderOptions;
use crate::decl::{Code, FieldSpec, Fragment, MethodSpec, Stmt, TypeSpec};
use crate::error::{Error, Result};
use crate::generate::GenerationUnit;
use crate::model::{Modifier, TypeKind};
use crate::types::{ClassName, TypeName, TypeVar, Wildcard};
use chrono::Utc;
use genco::fmt;
use genco::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

const JAVA_LANG: &str = "java.lang";

/// Render a generation unit to a Java source file
pub fn render(
    unit: &GenerationUnit,
    provenance: &Provenance,
    options: &RenderOptions,
) -> Result<String> {
    let docs: BTreeMap<String, String> = unit
        .methods
        .iter()
        .map(|(goal, m)| (m.name.clone(), entry_doc(goal, &m.name)))
        .collect();
    let spec = unit.type_spec();
    let renderer = JavaRenderer {
        options,
        generated: &unit.type_name,
        scope: Scope::of(&spec, &unit.type_name),
    };
    let body = renderer.type_spec(&spec, Some(&docs));

    let fmt = fmt::Config::from_lang::<Java>()
        .with_indentation(fmt::Indentation::Space(options.indent));
    let mut out = String::new();
    if options.provenance {
        let header = provenance_header(provenance, options);
        out.push_str(&format_file(&header, &fmt, &java::Config::default())?);
    }
    let config = if unit.type_name.package.is_empty() {
        java::Config::default()
    } else {
        java::Config::default().with_package(unit.type_name.package.clone())
    };
    out.push_str(&format_file(&body, &fmt, &config)?);
    Ok(out)
}

fn format_file(tokens: &java::Tokens, fmt: &fmt::Config, config: &java::Config) -> Result<String> {
    let mut w = fmt::FmtWriter::new(String::new());
    tokens
        .format_file(&mut w.as_formatter(fmt), config)
        .map_err(|e| Error::Render(e.to_string()))?;
    Ok(w.into_inner())
}

/// Comment lines above the package declaration
fn provenance_header(provenance: &Provenance, options: &RenderOptions) -> java::Tokens {
    quote! {
        $(format!("// GENERATED FROM: {}", provenance.source))
        $(format!("// DESCRIPTOR HASH: {}", provenance.hash))
        $(if options.timestamp {
            $(format!("// GENERATED: {}", Utc::now().to_rfc3339()))
        })
        $("// DO NOT EDIT - regenerate from the descriptor")
    }
}

fn entry_doc(goal: &str, method: &str) -> String {
    if method == format!("{}Updater", goal) {
        format!("Updater for goal {{@code {}}}.", goal)
    } else {
        format!("Step builder for goal {{@code {}}}.", goal)
    }
}

fn keyword(modifier: Modifier) -> &'static str {
    match modifier {
        Modifier::Public => "public",
        Modifier::Protected => "protected",
        Modifier::Private => "private",
        Modifier::Static => "static",
        Modifier::Abstract => "abstract",
        Modifier::Final => "final",
    }
}

/// `public static ` with a trailing space, or nothing
fn modifiers(modifiers: &[Modifier]) -> java::Tokens {
    let mut tokens = java::Tokens::new();
    for m in modifiers {
        tokens.append(keyword(*m));
        tokens.space();
    }
    tokens
}

/// Simple names that code inside the generated type cannot use to reach a
/// top-level class
#[derive(Debug, Default)]
struct Scope {
    /// How often each name is declared by a type of the generated tree
    declared: BTreeMap<String, usize>,
    /// Declared type variables
    vars: BTreeSet<String>,
    /// Referenced classes written without an import
    local: BTreeSet<String>,
}

impl Scope {
    fn of(spec: &TypeSpec, generated: &ClassName) -> Self {
        let mut scope = Scope::default();
        let mut classes = Vec::new();
        scope.collect(spec, &mut classes);
        for class in classes {
            let inside = class.package == generated.package
                && class.top_level() == generated.top_level();
            let unimported = class.package.is_empty()
                || class.package == JAVA_LANG
                || class.package == generated.package;
            if !inside && unimported {
                scope.local.insert(class.top_level().to_string());
            }
        }
        scope
    }

    fn collect(&mut self, t: &TypeSpec, classes: &mut Vec<ClassName>) {
        *self.declared.entry(t.name.clone()).or_default() += 1;
        self.type_vars(&t.type_params, classes);
        for ty in &t.implements {
            referenced(ty, classes);
        }
        for f in &t.fields {
            referenced(&f.ty, classes);
            if let Some(init) = &f.init {
                code_classes(init, classes);
            }
        }
        for m in &t.methods {
            self.type_vars(&m.type_params, classes);
            referenced(&m.returns, classes);
            for p in &m.params {
                referenced(&p.ty, classes);
            }
            for ty in &m.throws {
                referenced(ty, classes);
            }
            for s in m.body.iter().flatten() {
                stmt_classes(s, classes);
            }
        }
        for nested in &t.types {
            self.collect(nested, classes);
        }
    }

    fn type_vars(&mut self, vars: &[TypeVar], classes: &mut Vec<ClassName>) {
        for v in vars {
            self.vars.insert(v.name.clone());
            for bound in &v.bounds {
                referenced(bound, classes);
            }
        }
    }

    /// Whether `name` may mean something other than a top-level class
    fn shadows(&self, name: &str) -> bool {
        self.declared.contains_key(name) || self.vars.contains(name)
    }
}

fn referenced(ty: &TypeName, classes: &mut Vec<ClassName>) {
    match ty {
        TypeName::Class { class, args } => {
            classes.push(class.clone());
            for arg in args {
                referenced(arg, classes);
            }
        }
        TypeName::Array(component) => referenced(component, classes),
        TypeName::Wildcard(Wildcard::Extends(bound) | Wildcard::Super(bound)) => {
            referenced(bound, classes)
        }
        _ => {}
    }
}

fn code_classes(code: &Code, classes: &mut Vec<ClassName>) {
    for fragment in &code.0 {
        if let Fragment::Type(ty) = fragment {
            referenced(ty, classes);
        }
    }
}

fn stmt_classes(s: &Stmt, classes: &mut Vec<ClassName>) {
    match s {
        Stmt::Expr(code) | Stmt::Return(code) => code_classes(code, classes),
        Stmt::If { cond, then } => {
            code_classes(cond, classes);
            for s in then {
                stmt_classes(s, classes);
            }
        }
        Stmt::ForEach {
            var_type,
            iterable,
            body,
            ..
        } => {
            referenced(var_type, classes);
            code_classes(iterable, classes);
            for s in body {
                stmt_classes(s, classes);
            }
        }
    }
}

struct JavaRenderer<'a> {
    options: &'a RenderOptions,
    generated: &'a ClassName,
    scope: Scope,
}

impl<'a> JavaRenderer<'a> {
    fn type_spec(&self, t: &TypeSpec, docs: Option<&BTreeMap<String, String>>) -> java::Tokens {
        let mut header = modifiers(&t.modifiers);
        header.append(match t.kind {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
        });
        header.space();
        header.append(t.name.as_str());
        header.append(self.type_params(&t.type_params));
        if !t.implements.is_empty() {
            header.space();
            header.append(match t.kind {
                TypeKind::Class => "implements",
                TypeKind::Interface => "extends",
            });
            header.space();
            header.append(self.types(&t.implements));
        }

        let mut members: Vec<java::Tokens> = Vec::new();
        if !t.fields.is_empty() {
            let mut fields = java::Tokens::new();
            for f in &t.fields {
                fields.append(self.field(f));
                fields.push();
            }
            members.push(fields);
        }
        for m in &t.methods {
            let doc = match docs {
                Some(docs) if self.options.comments => docs.get(&m.name).map(String::as_str),
                _ => None,
            };
            members.push(self.method(m, doc));
        }
        for nested in &t.types {
            members.push(self.type_spec(nested, None));
        }

        if members.is_empty() {
            return quote!($header {});
        }
        quote! {
            $header {
                $(for member in members join ($['\n']) => $member)
            }
        }
    }

    fn field(&self, f: &FieldSpec) -> java::Tokens {
        let mut tokens = modifiers(&f.modifiers);
        tokens.append(self.ty(&f.ty));
        tokens.space();
        tokens.append(f.name.as_str());
        if let Some(init) = &f.init {
            tokens.append(" = ");
            tokens.append(self.code(init));
        }
        tokens.append(";");
        tokens
    }

    fn method(&self, m: &MethodSpec, doc: Option<&str>) -> java::Tokens {
        let mut signature = modifiers(&m.modifiers);
        if !m.type_params.is_empty() {
            signature.append(self.type_params(&m.type_params));
            signature.space();
        }
        if !m.constructor {
            signature.append(self.ty(&m.returns));
            signature.space();
        }
        signature.append(m.name.as_str());
        signature.append("(");
        for (i, p) in m.params.iter().enumerate() {
            if i > 0 {
                signature.append(", ");
            }
            signature.append(self.ty(&p.ty));
            signature.space();
            signature.append(p.name.as_str());
        }
        signature.append(")");
        if !m.throws.is_empty() {
            signature.space();
            signature.append("throws");
            signature.space();
            signature.append(self.types(&m.throws));
        }

        let mut tokens = java::Tokens::new();
        if let Some(doc) = doc {
            tokens.append(format!("/** {} */", doc));
            tokens.push();
        }
        if m.is_override {
            tokens.append("@Override");
            tokens.push();
        }
        tokens.append(match &m.body {
            None => quote!($signature;),
            Some(body) if body.is_empty() => quote!($signature {}),
            Some(body) => quote! {
                $signature {
                    $(for s in body join ($['\r']) => $(self.stmt(s)))
                }
            },
        });
        tokens
    }

    fn stmt(&self, s: &Stmt) -> java::Tokens {
        match s {
            Stmt::Expr(code) => quote!($(self.code(code));),
            Stmt::Return(code) => quote!(return $(self.code(code));),
            Stmt::If { cond, then } => quote! {
                if ($(self.code(cond))) {
                    $(for s in then join ($['\r']) => $(self.stmt(s)))
                }
            },
            Stmt::ForEach {
                var_type,
                var,
                iterable,
                body,
            } => quote! {
                for ($(self.ty(var_type)) $(var.as_str()) : $(self.code(iterable))) {
                    $(for s in body join ($['\r']) => $(self.stmt(s)))
                }
            },
        }
    }

    fn code(&self, code: &Code) -> java::Tokens {
        let mut tokens = java::Tokens::new();
        for fragment in &code.0 {
            match fragment {
                Fragment::Text(text) => tokens.append(text.as_str()),
                Fragment::Type(ty) => tokens.append(self.ty(ty)),
            }
        }
        tokens
    }

    fn type_params(&self, vars: &[TypeVar]) -> java::Tokens {
        let mut tokens = java::Tokens::new();
        if vars.is_empty() {
            return tokens;
        }
        tokens.append("<");
        for (i, v) in vars.iter().enumerate() {
            if i > 0 {
                tokens.append(", ");
            }
            tokens.append(v.name.as_str());
            for (j, bound) in v.bounds.iter().enumerate() {
                tokens.append(if j == 0 { " extends " } else { " & " });
                tokens.append(self.ty(bound));
            }
        }
        tokens.append(">");
        tokens
    }

    fn types(&self, types: &[TypeName]) -> java::Tokens {
        quote!($(for t in types join (, ) => $(self.ty(t))))
    }

    fn ty(&self, ty: &TypeName) -> java::Tokens {
        match ty {
            TypeName::Primitive(p) => quote!($(p.keyword())),
            TypeName::Void => quote!(void),
            TypeName::Var(name) => quote!($(name.as_str())),
            TypeName::Array(component) => quote!($(self.ty(component))[]),
            TypeName::Wildcard(Wildcard::Unbounded) => quote!(?),
            TypeName::Wildcard(Wildcard::Extends(bound)) => quote!(? extends $(self.ty(bound))),
            TypeName::Wildcard(Wildcard::Super(bound)) => quote!(? super $(self.ty(bound))),
            TypeName::Class { class, args } if args.is_empty() => self.class(class),
            TypeName::Class { class, args } => quote!($(self.class(class))<$(self.types(args))>),
        }
    }

    /// Name a class the way code inside the generated type must spell it.
    ///
    /// Classes of other packages go through genco's imports, which also
    /// qualify the later of two imports sharing a simple name.
    fn class(&self, class: &ClassName) -> java::Tokens {
        let generated = self.generated;
        let scope = &self.scope;
        let mut tokens = java::Tokens::new();

        if class.package == generated.package && class.top_level() == generated.top_level() {
            // members are reached relative to the generated type unless a
            // deeper declaration reuses the member's name
            let first = class.names.get(1).map(String::as_str).unwrap_or(class.top_level());
            if scope.declared.get(first).copied().unwrap_or(0) > 1 || scope.vars.contains(first) {
                tokens.append(class.qualified());
            } else if class.is_nested() {
                tokens.append(class.names[1..].join("."));
            } else {
                tokens.append(class.nesting());
            }
            return tokens;
        }

        let top = class.top_level();
        if scope.shadows(top) {
            tokens.append(class.qualified());
        } else if class.package.is_empty()
            || class.package == JAVA_LANG
            || class.package == generated.package
        {
            tokens.append(class.nesting());
        } else if scope.local.contains(top) {
            // an import would hide the unimported class of the same name
            tokens.append(class.qualified());
        } else {
            tokens.append(java::import(class.package.clone(), top.to_string()));
            if class.is_nested() {
                tokens.append(format!(".{}", class.names[1..].join(".")));
            }
        }
        tokens
    }
}
