//! Declaration tree emitted by the module generators
//!
//! A small, language-shaped IR: types, fields, methods and statements whose
//! expressions are [`Code`] fragments. Type references stay structured so
//! the renderer can manage imports.

use crate::model::{Access, Modifier, TypeKind};
use crate::types::{TypeName, TypeVar};
use std::fmt;

/// A piece of an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text(String),
    Type(TypeName),
}

impl From<&str> for Fragment {
    fn from(s: &str) -> Self {
        Fragment::Text(s.to_string())
    }
}

impl From<String> for Fragment {
    fn from(s: String) -> Self {
        Fragment::Text(s)
    }
}

impl From<&String> for Fragment {
    fn from(s: &String) -> Self {
        Fragment::Text(s.clone())
    }
}

impl From<TypeName> for Fragment {
    fn from(t: TypeName) -> Self {
        Fragment::Type(t)
    }
}

impl From<&TypeName> for Fragment {
    fn from(t: &TypeName) -> Self {
        Fragment::Type(t.clone())
    }
}

/// An expression: text interleaved with type references
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Code(pub Vec<Fragment>);

/// Build a [`Code`] from strings and type names
///
/// ```
/// use stepgen::code;
/// use stepgen::types::TypeName;
/// let c = code!["new ", TypeName::java_util("ArrayList"), "<>()"];
/// assert_eq!(c.to_string(), "new ArrayList<>()");
/// ```
#[macro_export]
macro_rules! code {
    ($($part:expr),* $(,)?) => {
        $crate::decl::Code(vec![$($crate::decl::Fragment::from($part)),*])
    };
}

impl Code {
    /// Join codes with a separator, e.g. argument lists
    pub fn join(parts: impl IntoIterator<Item = Code>, sep: &str) -> Code {
        let mut out = Vec::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                out.push(Fragment::from(sep));
            }
            out.extend(part.0);
        }
        Code(out)
    }

    pub fn then(mut self, other: Code) -> Code {
        self.0.extend(other.0);
        self
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.0 {
            match fragment {
                Fragment::Text(s) => f.write_str(s)?,
                Fragment::Type(t) => write!(f, "{}", t)?,
            }
        }
        Ok(())
    }
}

/// A statement in a method body
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `code;`
    Expr(Code),
    /// `return code;`
    Return(Code),
    If {
        cond: Code,
        then: Vec<Stmt>,
    },
    ForEach {
        var_type: TypeName,
        var: String,
        iterable: Code,
        body: Vec<Stmt>,
    },
}

impl Stmt {
    /// `if (name == null) throw new NullPointerException("name");`
    pub fn null_guard(value: Code, name: &str) -> Stmt {
        Stmt::If {
            cond: value.then(code![" == null"]),
            then: vec![Stmt::Expr(code![
                "throw new ",
                TypeName::java_lang("NullPointerException"),
                format!("(\"{}\")", name),
            ])],
        }
    }

    /// `target = value;`
    pub fn assign(target: impl Into<String>, value: Code) -> Stmt {
        Stmt::Expr(code![format!("{} = ", target.into())].then(value))
    }
}

/// A method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub ty: TypeName,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, ty: TypeName) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: TypeName,
    pub modifiers: Vec<Modifier>,
    pub init: Option<Code>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: TypeName, modifiers: &[Modifier]) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: modifiers.to_vec(),
            init: None,
        }
    }

    pub fn with_init(mut self, init: Code) -> Self {
        self.init = Some(init);
        self
    }
}

/// A constructor or method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSpec {
    pub name: String,
    pub constructor: bool,
    pub modifiers: Vec<Modifier>,
    pub is_override: bool,
    pub type_params: Vec<TypeVar>,
    pub returns: TypeName,
    pub params: Vec<ParamSpec>,
    pub throws: Vec<TypeName>,
    /// `None` for abstract and interface methods
    pub body: Option<Vec<Stmt>>,
}

impl MethodSpec {
    pub fn method(name: impl Into<String>, returns: TypeName) -> Self {
        Self {
            name: name.into(),
            constructor: false,
            modifiers: Vec::new(),
            is_override: false,
            type_params: Vec::new(),
            returns,
            params: Vec::new(),
            throws: Vec::new(),
            body: Some(Vec::new()),
        }
    }

    pub fn constructor(class: &str) -> Self {
        Self {
            constructor: true,
            ..Self::method(class, TypeName::Void)
        }
    }

    /// Interface method without body
    pub fn abstract_method(name: impl Into<String>, returns: TypeName) -> Self {
        Self {
            body: None,
            ..Self::method(name, returns)
        }
    }

    pub fn modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = modifiers.to_vec();
        self
    }

    pub fn overriding(mut self) -> Self {
        self.is_override = true;
        self
    }

    pub fn type_params(mut self, vars: Vec<TypeVar>) -> Self {
        self.type_params = vars;
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeName) -> Self {
        self.params.push(ParamSpec::new(name, ty));
        self
    }

    pub fn throws(mut self, throws: &[TypeName]) -> Self {
        self.throws = throws.to_vec();
        self
    }

    pub fn body(mut self, body: Vec<Stmt>) -> Self {
        self.body = Some(body);
        self
    }
}

/// A class or interface
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: String,
    pub kind: TypeKind,
    pub modifiers: Vec<Modifier>,
    pub type_params: Vec<TypeVar>,
    pub implements: Vec<TypeName>,
    pub fields: Vec<FieldSpec>,
    pub methods: Vec<MethodSpec>,
    pub types: Vec<TypeSpec>,
}

impl TypeSpec {
    pub fn class(name: impl Into<String>, modifiers: &[Modifier]) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            modifiers: modifiers.to_vec(),
            type_params: Vec::new(),
            implements: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>, modifiers: &[Modifier]) -> Self {
        Self {
            kind: TypeKind::Interface,
            ..Self::class(name, modifiers)
        }
    }

    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|m| m.name == name && !m.constructor)
    }

    pub fn nested(&self, name: &str) -> Option<&TypeSpec> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Visibility modifiers for an access level
pub fn access_modifiers(access: Access) -> Vec<Modifier> {
    match access {
        Access::Public => vec![Modifier::Public],
        Access::Package => Vec::new(),
    }
}

/// `access` plus `extra`
pub fn with_access(access: Access, extra: &[Modifier]) -> Vec<Modifier> {
    let mut out = access_modifiers(access);
    out.extend_from_slice(extra);
    out
}
