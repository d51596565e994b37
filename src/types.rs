//! Java type names
//!
//! Descriptors spell types the way Java source does (`List<String>`,
//! `Map.Entry<K, V>`, `? extends T`, `int[]`). This module parses those
//! strings into [`TypeName`] values and resolves simple names against a
//! [`TypeScope`]: type variables first, then declared types, then the
//! well-known `java.lang`, `java.util` and `java.io` names, and finally the
//! unit's own package.

use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

const JAVA_LANG: &[&str] = &[
    "AutoCloseable",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "Cloneable",
    "Comparable",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "IllegalArgumentException",
    "IllegalStateException",
    "Integer",
    "Iterable",
    "Long",
    "Math",
    "NullPointerException",
    "Number",
    "Object",
    "Runnable",
    "RuntimeException",
    "Short",
    "String",
    "StringBuilder",
    "System",
    "Thread",
    "ThreadLocal",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
];

const JAVA_UTIL: &[&str] = &[
    "ArrayDeque",
    "ArrayList",
    "Collection",
    "Collections",
    "Date",
    "Deque",
    "HashMap",
    "HashSet",
    "Iterator",
    "LinkedHashMap",
    "LinkedHashSet",
    "LinkedList",
    "List",
    "Locale",
    "Map",
    "NavigableMap",
    "NavigableSet",
    "Objects",
    "Optional",
    "PriorityQueue",
    "Queue",
    "Set",
    "SortedMap",
    "SortedSet",
    "Stack",
    "TreeMap",
    "TreeSet",
    "UUID",
    "Vector",
];

const JAVA_IO: &[&str] = &["File", "IOException", "Serializable", "UncheckedIOException"];

/// Java primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl Primitive {
    pub fn from_keyword(s: &str) -> Option<Self> {
        Some(match s {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "short" => Primitive::Short,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "char" => Primitive::Char,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Char => "char",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// The wrapper class, e.g. `int` → `Integer`
    pub fn boxed(self) -> ClassName {
        let name = match self {
            Primitive::Boolean => "Boolean",
            Primitive::Byte => "Byte",
            Primitive::Short => "Short",
            Primitive::Int => "Integer",
            Primitive::Long => "Long",
            Primitive::Char => "Character",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
        };
        ClassName::new("java.lang", [name])
    }
}

/// A possibly nested class name: package plus enclosing-to-inner names
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassName {
    pub package: String,
    pub names: Vec<String>,
}

impl ClassName {
    pub fn new<I, S>(package: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            package: package.to_string(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Innermost name
    pub fn simple_name(&self) -> &str {
        self.names.last().map(String::as_str).unwrap_or_default()
    }

    /// Outermost enclosing name
    pub fn top_level(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }

    /// Names as written inside the package, e.g. `Map.Entry`
    pub fn nesting(&self) -> String {
        self.names.join(".")
    }

    /// Fully qualified name, e.g. `java.util.Map.Entry`
    pub fn qualified(&self) -> String {
        if self.package.is_empty() {
            self.nesting()
        } else {
            format!("{}.{}", self.package, self.nesting())
        }
    }

    pub fn nested(&self, name: &str) -> ClassName {
        let mut names = self.names.clone();
        names.push(name.to_string());
        ClassName {
            package: self.package.clone(),
            names,
        }
    }

    pub fn is_nested(&self) -> bool {
        self.names.len() > 1
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.nesting())
    }
}

/// Upper or lower bound of a wildcard
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Wildcard {
    Unbounded,
    Extends(Box<TypeName>),
    Super(Box<TypeName>),
}

/// A Java type as it appears in a signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeName {
    Primitive(Primitive),
    Void,
    Class { class: ClassName, args: Vec<TypeName> },
    Var(String),
    Array(Box<TypeName>),
    Wildcard(Wildcard),
}

impl TypeName {
    pub fn class(class: ClassName) -> Self {
        TypeName::Class {
            class,
            args: Vec::new(),
        }
    }

    pub fn parameterized(class: ClassName, args: Vec<TypeName>) -> Self {
        TypeName::Class { class, args }
    }

    pub fn java_lang(name: &str) -> Self {
        Self::class(ClassName::new("java.lang", [name]))
    }

    pub fn java_util(name: &str) -> Self {
        Self::class(ClassName::new("java.util", [name]))
    }

    pub fn object() -> Self {
        Self::java_lang("Object")
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeName::Primitive(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeName::Void)
    }

    /// Primitives become their wrapper; `void` becomes `Void`
    pub fn boxed(&self) -> TypeName {
        match self {
            TypeName::Primitive(p) => TypeName::class(p.boxed()),
            TypeName::Void => TypeName::java_lang("Void"),
            other => other.clone(),
        }
    }

    /// Simple name used to derive goal and variable names
    pub fn simple_name(&self) -> String {
        match self {
            TypeName::Primitive(p) => p.keyword().to_string(),
            TypeName::Void => "void".to_string(),
            TypeName::Class { class, .. } => class.simple_name().to_string(),
            TypeName::Var(name) => name.clone(),
            TypeName::Array(component) => format!("{}Array", component.simple_name()),
            TypeName::Wildcard(Wildcard::Extends(bound)) => bound.simple_name(),
            TypeName::Wildcard(_) => "Object".to_string(),
        }
    }

    pub fn raw_class(&self) -> Option<&ClassName> {
        match self {
            TypeName::Class { class, .. } => Some(class),
            _ => None,
        }
    }

    pub fn type_args(&self) -> &[TypeName] {
        match self {
            TypeName::Class { args, .. } => args,
            _ => &[],
        }
    }

    /// Type variables mentioned anywhere in this type, in order of appearance
    pub fn type_vars(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut Vec<String>) {
        match self {
            TypeName::Var(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            TypeName::Class { args, .. } => args.iter().for_each(|a| a.collect_vars(out)),
            TypeName::Array(component) => component.collect_vars(out),
            TypeName::Wildcard(Wildcard::Extends(b)) | TypeName::Wildcard(Wildcard::Super(b)) => {
                b.collect_vars(out)
            }
            _ => {}
        }
    }

    pub fn mentions(&self, var: &str) -> bool {
        self.type_vars().iter().any(|v| v == var)
    }

    /// Replace type variables by the types they are bound to
    pub fn substitute(&self, bindings: &BTreeMap<String, TypeName>) -> TypeName {
        match self {
            TypeName::Var(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            TypeName::Class { class, args } => TypeName::Class {
                class: class.clone(),
                args: args.iter().map(|a| a.substitute(bindings)).collect(),
            },
            TypeName::Array(component) => TypeName::Array(Box::new(component.substitute(bindings))),
            TypeName::Wildcard(Wildcard::Extends(b)) => {
                TypeName::Wildcard(Wildcard::Extends(Box::new(b.substitute(bindings))))
            }
            TypeName::Wildcard(Wildcard::Super(b)) => {
                TypeName::Wildcard(Wildcard::Super(Box::new(b.substitute(bindings))))
            }
            other => other.clone(),
        }
    }

    /// Parse and resolve a Java type expression
    pub fn parse(src: &str, scope: &TypeScope) -> Result<TypeName> {
        let tokens = tokenize(src)?;
        let mut parser = Parser {
            src,
            tokens,
            pos: 0,
            scope,
        };
        let ty = parser.parse_type()?;
        if parser.pos != parser.tokens.len() {
            return Err(Error::TypeParse(format!("trailing input in `{}`", src)));
        }
        Ok(ty)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Primitive(p) => f.write_str(p.keyword()),
            TypeName::Void => f.write_str("void"),
            TypeName::Class { class, args } => {
                write!(f, "{}", class)?;
                if !args.is_empty() {
                    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                Ok(())
            }
            TypeName::Var(name) => f.write_str(name),
            TypeName::Array(component) => write!(f, "{}[]", component),
            TypeName::Wildcard(Wildcard::Unbounded) => f.write_str("?"),
            TypeName::Wildcard(Wildcard::Extends(b)) => write!(f, "? extends {}", b),
            TypeName::Wildcard(Wildcard::Super(b)) => write!(f, "? super {}", b),
        }
    }
}

/// A type variable declaration with its bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeVar {
    pub name: String,
    pub bounds: Vec<TypeName>,
}

impl TypeVar {
    pub fn unbounded(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bounds: Vec::new(),
        }
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.bounds.is_empty() {
            let bounds: Vec<String> = self.bounds.iter().map(ToString::to_string).collect();
            write!(f, " extends {}", bounds.join(" & "))?;
        }
        Ok(())
    }
}

/// Name resolution context for [`TypeName::parse`]
#[derive(Debug, Clone, Default)]
pub struct TypeScope {
    /// Package used for names nothing else claims
    pub package: String,
    /// Type variables in scope
    pub vars: BTreeSet<String>,
    /// Declared types by outermost simple name
    pub declared: BTreeMap<String, ClassName>,
}

impl TypeScope {
    pub fn new(package: &str) -> Self {
        Self {
            package: package.to_string(),
            ..Default::default()
        }
    }

    /// A copy with additional type variables in scope
    pub fn with_vars<'a>(&self, vars: impl IntoIterator<Item = &'a str>) -> TypeScope {
        let mut scope = self.clone();
        scope.vars.extend(vars.into_iter().map(str::to_string));
        scope
    }

    fn resolve(&self, segments: &[String]) -> TypeName {
        let split = segments
            .iter()
            .position(|s| s.chars().next().is_some_and(|c| c.is_uppercase()));
        let (package, names) = match split {
            Some(0) | None => (Vec::new(), segments.to_vec()),
            Some(i) => (segments[..i].to_vec(), segments[i..].to_vec()),
        };
        if !package.is_empty() {
            return TypeName::class(ClassName {
                package: package.join("."),
                names,
            });
        }
        let first = names[0].as_str();
        if names.len() == 1 && self.vars.contains(first) {
            return TypeName::Var(first.to_string());
        }
        let base = if let Some(declared) = self.declared.get(first) {
            declared.clone()
        } else if JAVA_LANG.contains(&first) {
            ClassName::new("java.lang", [first])
        } else if JAVA_UTIL.contains(&first) {
            ClassName::new("java.util", [first])
        } else if JAVA_IO.contains(&first) {
            ClassName::new("java.io", [first])
        } else {
            ClassName::new(&self.package, [first])
        };
        TypeName::class(names[1..].iter().fold(base, |c, n| c.nested(n)))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Dot,
    Comma,
    Lt,
    Gt,
    Brackets,
    Question,
}

fn tokenize(src: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '<' => {
                chars.next();
                tokens.push(Token::Lt);
            }
            '>' => {
                chars.next();
                tokens.push(Token::Gt);
            }
            '?' => {
                chars.next();
                tokens.push(Token::Question);
            }
            '[' => {
                chars.next();
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
                if chars.next() != Some(']') {
                    return Err(Error::TypeParse(format!("unclosed `[` in `{}`", src)));
                }
                tokens.push(Token::Brackets);
            }
            c if c.is_alphanumeric() || c == '_' || c == '$' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '$' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(Error::TypeParse(format!(
                    "unexpected `{}` in `{}`",
                    other, src
                )))
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    scope: &'a TypeScope,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn fail<T>(&self, what: &str) -> Result<T> {
        Err(Error::TypeParse(format!("{} in `{}`", what, self.src)))
    }

    fn ident(&mut self) -> Result<String> {
        match self.tokens.get(self.pos) {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => self.fail("expected identifier"),
        }
    }

    fn parse_type(&mut self) -> Result<TypeName> {
        if self.eat(&Token::Question) {
            let wildcard = match self.peek() {
                Some(Token::Ident(kw)) if kw == "extends" => {
                    self.pos += 1;
                    Wildcard::Extends(Box::new(self.parse_type()?))
                }
                Some(Token::Ident(kw)) if kw == "super" => {
                    self.pos += 1;
                    Wildcard::Super(Box::new(self.parse_type()?))
                }
                _ => Wildcard::Unbounded,
            };
            return Ok(TypeName::Wildcard(wildcard));
        }
        let mut ty = self.parse_base()?;
        while self.eat(&Token::Brackets) {
            ty = TypeName::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_base(&mut self) -> Result<TypeName> {
        let first = self.ident()?;
        if first == "void" {
            return Ok(TypeName::Void);
        }
        if let Some(p) = Primitive::from_keyword(&first) {
            return Ok(TypeName::Primitive(p));
        }
        let mut segments = vec![first];
        while self.eat(&Token::Dot) {
            segments.push(self.ident()?);
        }
        let resolved = self.scope.resolve(&segments);
        if !self.eat(&Token::Lt) {
            return Ok(resolved);
        }
        let TypeName::Class { class, .. } = resolved else {
            return self.fail("type variable cannot take arguments");
        };
        let mut args = vec![self.parse_type()?];
        while self.eat(&Token::Comma) {
            args.push(self.parse_type()?);
        }
        if !self.eat(&Token::Gt) {
            return self.fail("expected `>`");
        }
        Ok(TypeName::parameterized(class, args))
    }
}

/// Parse a type variable declaration such as `T extends Comparable<T>`
pub fn parse_type_var(name: &str, bounds: &[String], scope: &TypeScope) -> Result<TypeVar> {
    let bounds = bounds
        .iter()
        .map(|b| TypeName::parse(b, scope))
        .collect::<Result<Vec<_>>>()?;
    Ok(TypeVar {
        name: name.to_string(),
        bounds,
    })
}
