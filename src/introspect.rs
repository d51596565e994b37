//! Type introspection over a unit's declared types
//!
//! [`TypeModel`] resolves every descriptor string once and then answers
//! the queries analysis needs: inherited members, collection subtyping and
//! constructor visibility. Types the unit does not declare are opaque,
//! except for the JDK collection hierarchy, which is built in.

use crate::error::{Error, Result};
use crate::model::{
    GoalAnnotation, Modifier, ParamDecl, StepAnnotation, TypeDecl, TypeKind, TypeParamDecl, Unit,
};
use crate::types::{parse_type_var, ClassName, TypeName, TypeScope, TypeVar};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// `java.util` types that implement `Collection<E>` with `E` as first argument
const JDK_COLLECTIONS: &[&str] = &[
    "ArrayDeque",
    "ArrayList",
    "Collection",
    "Deque",
    "HashSet",
    "LinkedHashSet",
    "LinkedList",
    "List",
    "NavigableSet",
    "PriorityQueue",
    "Queue",
    "Set",
    "SortedSet",
    "Stack",
    "TreeSet",
    "Vector",
];

/// A resolved field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub name: String,
    pub ty: TypeName,
    pub modifiers: Vec<Modifier>,
}

/// A resolved parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: TypeName,
    pub step: Option<StepAnnotation>,
}

/// A resolved constructor or method
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutableInfo {
    /// Method name, `<init>` for constructors
    pub name: String,
    pub owner: ClassName,
    pub modifiers: Vec<Modifier>,
    pub type_params: Vec<TypeVar>,
    /// Return type; the owner type for constructors
    pub returns: TypeName,
    pub params: Vec<ParamInfo>,
    pub throws: Vec<TypeName>,
    pub goal: Option<GoalAnnotation>,
    pub step: Option<StepAnnotation>,
    pub ignore: bool,
}

impl ExecutableInfo {
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Diagnostic path, e.g. `Cube#<init>(String, List<String>)`
    pub fn path(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.to_string()).collect();
        format!("{}#{}({})", self.owner, self.name, params.join(", "))
    }

    fn substitute(&self, bindings: &BTreeMap<String, TypeName>) -> ExecutableInfo {
        let mut out = self.clone();
        out.returns = self.returns.substitute(bindings);
        for p in &mut out.params {
            p.ty = p.ty.substitute(bindings);
        }
        out
    }
}

/// A resolved type declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub name: ClassName,
    pub kind: TypeKind,
    pub modifiers: Vec<Modifier>,
    pub type_params: Vec<TypeVar>,
    pub superclass: Option<TypeName>,
    pub interfaces: Vec<TypeName>,
    pub fields: Vec<FieldInfo>,
    pub constructors: Vec<ExecutableInfo>,
    pub methods: Vec<ExecutableInfo>,
    pub goal: Option<GoalAnnotation>,
}

impl ClassInfo {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// The type as seen from inside its own declaration, e.g. `Box<T>`
    pub fn self_type(&self) -> TypeName {
        TypeName::parameterized(
            self.name.clone(),
            self.type_params
                .iter()
                .map(|v| TypeName::Var(v.name.clone()))
                .collect(),
        )
    }

    /// Supertypes with this type's variables bound to `args`
    fn supertypes(&self, args: &[TypeName]) -> Vec<TypeName> {
        let bindings = self.bindings(args);
        self.superclass
            .iter()
            .chain(self.interfaces.iter())
            .map(|t| t.substitute(&bindings))
            .collect()
    }

    fn bindings(&self, args: &[TypeName]) -> BTreeMap<String, TypeName> {
        self.type_params
            .iter()
            .zip(args.iter())
            .map(|(v, a)| (v.name.clone(), a.clone()))
            .collect()
    }
}

/// Resolved view of a unit's type universe
#[derive(Debug, Clone, Default)]
pub struct TypeModel {
    package: String,
    classes: BTreeMap<ClassName, ClassInfo>,
}

impl TypeModel {
    /// Resolve every declared type of `unit`
    pub fn new(unit: &Unit) -> Result<Self> {
        let mut scope = TypeScope::new(&unit.package);
        for decl in &unit.types {
            let name = class_name(unit, decl);
            scope
                .declared
                .entry(name.top_level().to_string())
                .or_insert_with(|| ClassName::new(&name.package, [name.top_level()]));
        }

        let mut classes = BTreeMap::new();
        for decl in &unit.types {
            let info = resolve_class(unit, decl, &scope)?;
            if classes.insert(info.name.clone(), info).is_some() {
                return Err(Error::Descriptor(format!(
                    "type `{}` is declared twice",
                    decl.name
                )));
            }
        }
        Ok(Self {
            package: unit.package.clone(),
            classes,
        })
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn get(&self, name: &ClassName) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    /// Declared type behind a type name, if any
    pub fn class_of(&self, ty: &TypeName) -> Option<&ClassInfo> {
        ty.raw_class().and_then(|c| self.classes.get(c))
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    /// Whether a member with `modifiers`, declared in `declaring`, can be
    /// used from code generated into this model's package
    pub fn is_accessible(&self, modifiers: &[Modifier], declaring: &ClassName) -> bool {
        if modifiers.contains(&Modifier::Private) {
            return false;
        }
        modifiers.contains(&Modifier::Public) || declaring.package == self.package
    }

    /// Supertypes of `ty` in lookup order: the superclass chain first, then
    /// interfaces breadth-first. `ty` itself comes first.
    fn lineage(&self, ty: &TypeName) -> Vec<(TypeName, &ClassInfo)> {
        let mut out = Vec::new();
        let mut seen = BTreeSet::new();
        let mut pending_interfaces = VecDeque::new();

        let mut current = Some(ty.clone());
        while let Some(t) = current.take() {
            let Some(info) = self.class_of(&t) else { break };
            if !seen.insert(info.name.clone()) {
                break;
            }
            let bindings = info.bindings(t.type_args());
            if let Some(sup) = &info.superclass {
                current = Some(sup.substitute(&bindings));
            }
            pending_interfaces.extend(info.interfaces.iter().map(|i| i.substitute(&bindings)));
            out.push((t, info));
        }

        while let Some(t) = pending_interfaces.pop_front() {
            let Some(info) = self.class_of(&t) else { continue };
            if !seen.insert(info.name.clone()) {
                continue;
            }
            pending_interfaces.extend(info.supertypes(t.type_args()));
            out.push((t, info));
        }
        out
    }

    /// Non-private, non-static methods of `ty` and its supertypes.
    ///
    /// The closest declaration of a name and arity wins. Types are
    /// substituted through generic supertypes.
    pub fn methods(&self, ty: &TypeName) -> Vec<ExecutableInfo> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for (t, info) in self.lineage(ty) {
            let bindings = info.bindings(t.type_args());
            for m in &info.methods {
                if m.has(Modifier::Static) || !self.is_accessible(&m.modifiers, &info.name) {
                    continue;
                }
                if seen.insert((m.name.clone(), m.params.len())) {
                    out.push(m.substitute(&bindings));
                }
            }
        }
        out
    }

    /// Non-private, non-static fields of `ty` and its superclasses
    pub fn fields(&self, ty: &TypeName) -> Vec<FieldInfo> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for (t, info) in self.lineage(ty) {
            let bindings = info.bindings(t.type_args());
            for f in &info.fields {
                if f.modifiers.contains(&Modifier::Static)
                    || !self.is_accessible(&f.modifiers, &info.name)
                {
                    continue;
                }
                if seen.insert(f.name.clone()) {
                    out.push(FieldInfo {
                        ty: f.ty.substitute(&bindings),
                        ..f.clone()
                    });
                }
            }
        }
        out
    }

    /// Element type if `ty` is a `java.util.Collection` subtype.
    ///
    /// Raw collections have element type `Object`. `Iterable` alone is
    /// not a collection.
    pub fn collection_element(&self, ty: &TypeName) -> Option<TypeName> {
        let mut seen = BTreeSet::new();
        self.collection_element_inner(ty, &mut seen)
    }

    fn collection_element_inner(
        &self,
        ty: &TypeName,
        seen: &mut BTreeSet<ClassName>,
    ) -> Option<TypeName> {
        let class = ty.raw_class()?;
        if !seen.insert(class.clone()) {
            return None;
        }
        if class.package == "java.util" && JDK_COLLECTIONS.contains(&class.nesting().as_str()) {
            return Some(
                ty.type_args()
                    .first()
                    .cloned()
                    .unwrap_or_else(TypeName::object),
            );
        }
        let info = self.classes.get(class)?;
        info.supertypes(ty.type_args())
            .iter()
            .find_map(|sup| self.collection_element_inner(sup, seen))
    }

    /// Whether `class` can be instantiated with `new T()` from the
    /// generated package
    pub fn has_visible_default_constructor(&self, class: &ClassInfo) -> bool {
        if class.constructors.is_empty() {
            return true;
        }
        class
            .constructors
            .iter()
            .any(|c| c.params.is_empty() && self.is_accessible(&c.modifiers, &class.name))
    }
}

fn class_name(unit: &Unit, decl: &TypeDecl) -> ClassName {
    let package = decl.package.as_deref().unwrap_or(&unit.package);
    ClassName::new(package, decl.name.split('.'))
}

fn type_vars(params: &[TypeParamDecl], scope: &TypeScope) -> Result<Vec<TypeVar>> {
    params
        .iter()
        .map(|p| parse_type_var(&p.name, &p.bounds, scope))
        .collect()
}

fn params(params: &[ParamDecl], scope: &TypeScope) -> Result<Vec<ParamInfo>> {
    params
        .iter()
        .map(|p| {
            Ok(ParamInfo {
                name: p.name.clone(),
                ty: TypeName::parse(&p.typ, scope)?,
                step: p.step.clone(),
            })
        })
        .collect()
}

fn parse_all(types: &[String], scope: &TypeScope) -> Result<Vec<TypeName>> {
    types.iter().map(|t| TypeName::parse(t, scope)).collect()
}

fn resolve_class(unit: &Unit, decl: &TypeDecl, scope: &TypeScope) -> Result<ClassInfo> {
    let name = class_name(unit, decl);
    let class_scope = scope.with_vars(decl.type_params.iter().map(|p| p.name.as_str()));
    let type_params = type_vars(&decl.type_params, &class_scope)?;

    let mut info = ClassInfo {
        name: name.clone(),
        kind: decl.kind,
        modifiers: decl.modifiers.clone(),
        type_params,
        superclass: decl
            .superclass
            .as_deref()
            .map(|s| TypeName::parse(s, &class_scope))
            .transpose()?,
        interfaces: parse_all(&decl.interfaces, &class_scope)?,
        fields: Vec::new(),
        constructors: Vec::new(),
        methods: Vec::new(),
        goal: decl.goal.clone(),
    };

    for f in &decl.fields {
        info.fields.push(FieldInfo {
            name: f.name.clone(),
            ty: TypeName::parse(&f.typ, &class_scope)?,
            modifiers: f.modifiers.clone(),
        });
    }

    let self_type = info.self_type();
    for c in &decl.constructors {
        let scope = class_scope.with_vars(c.type_params.iter().map(|p| p.name.as_str()));
        info.constructors.push(ExecutableInfo {
            name: "<init>".to_string(),
            owner: name.clone(),
            modifiers: c.modifiers.clone(),
            type_params: type_vars(&c.type_params, &scope)?,
            returns: self_type.clone(),
            params: params(&c.params, &scope)?,
            throws: parse_all(&c.throws, &scope)?,
            goal: c.goal.clone(),
            step: None,
            ignore: false,
        });
    }

    for m in &decl.methods {
        let scope = if m.modifiers.contains(&Modifier::Static) {
            scope.with_vars(m.type_params.iter().map(|p| p.name.as_str()))
        } else {
            class_scope.with_vars(m.type_params.iter().map(|p| p.name.as_str()))
        };
        info.methods.push(ExecutableInfo {
            name: m.name.clone(),
            owner: name.clone(),
            modifiers: m.modifiers.clone(),
            type_params: type_vars(&m.type_params, &scope)?,
            returns: TypeName::parse(&m.returns, &scope)?,
            params: params(&m.params, &scope)?,
            throws: parse_all(&m.throws, &scope)?,
            goal: m.goal.clone(),
            step: m.step.clone(),
            ignore: m.ignore,
        });
    }

    Ok(info)
}
