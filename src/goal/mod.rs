//! Goal descriptions: the validated intermediate representation
//!
//! Analysis turns descriptor elements into [`GoalDescription`]s. They carry
//! everything generation needs and nothing from the descriptor layer:
//! resolved names, types, null policies and projections.
//!
//! [`GoalContext`] then binds a description to its step chain.

mod context;
mod empty;

pub use context::{BuildersContext, GoalContext, ParameterRef, Step};
pub use empty::EmptyOption;

use crate::model::{Access, NullPolicy};
use crate::types::{ClassName, TypeName, TypeVar};
use crate::util::upcase;

/// Builder object lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// A fresh object per entry call
    NewInstance,
    /// One thread-local object per slot, guarded by an in-use flag
    ReuseInstances,
}

/// Options shared by every goal kind
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDetails {
    /// Unique within the generation unit
    pub name: String,
    /// Type produced by the goal
    pub goal_type: TypeName,
    /// Access of the builder entry; `None` when no builder is generated
    pub builder: Option<Access>,
    /// Access of the updater entry; `None` when no updater is generated
    pub updater: Option<Access>,
    pub lifecycle: Lifecycle,
    /// Diagnostic path of the goal element
    pub element: String,
}

impl GoalDetails {
    /// Contract class holding the step interfaces, e.g. `CubeBuilder`
    pub fn contract_name(&self) -> String {
        format!("{}Builder", upcase(&self.name))
    }

    /// Builder implementation class, e.g. `CubeBuilderImpl`
    pub fn impl_name(&self) -> String {
        format!("{}BuilderImpl", upcase(&self.name))
    }

    /// Updater class, e.g. `CubeUpdater`
    pub fn updater_name(&self) -> String {
        format!("{}Updater", upcase(&self.name))
    }

    /// Builder entry method, e.g. `cubeBuilder`
    pub fn builder_method(&self) -> String {
        format!("{}Builder", self.name)
    }

    /// Updater entry method, e.g. `cubeUpdater`
    pub fn updater_method(&self) -> String {
        format!("{}Updater", self.name)
    }

    pub fn recycles(&self) -> bool {
        self.lifecycle == Lifecycle::ReuseInstances
    }
}

/// How a regular goal is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegularKind {
    Constructor,
    InstanceMethod,
    StaticMethod,
}

/// How to read a parameter back from an existing instance
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Zero-argument accessor, with its declared exceptions
    Method { name: String, throws: Vec<TypeName> },
    /// Direct field access
    Field { name: String },
    /// Not recoverable
    None,
}

impl Projection {
    pub fn is_none(&self) -> bool {
        matches!(self, Projection::None)
    }
}

/// One parameter of a regular goal
#[derive(Debug, Clone, PartialEq)]
pub struct RegularParameter {
    pub name: String,
    pub ty: TypeName,
    pub null_policy: NullPolicy,
    pub projection: Projection,
}

impl RegularParameter {
    /// Whether a null guard is emitted for this parameter
    pub fn rejects_null(&self) -> bool {
        self.null_policy == NullPolicy::Reject && !self.ty.is_primitive()
    }
}

/// A constructor, instance method or static method goal
#[derive(Debug, Clone, PartialEq)]
pub struct RegularGoal {
    pub details: GoalDetails,
    pub kind: RegularKind,
    /// Type declaring the constructor or method
    pub owner: TypeName,
    /// Invoked method; empty for constructors
    pub method: String,
    /// Type variables the goal introduces (class variables for
    /// constructors of generic classes, method variables otherwise)
    pub type_params: Vec<TypeVar>,
    /// Type variables of the receiving instance, for instance methods
    pub instance_type_params: Vec<TypeVar>,
    /// Parameters in step order
    pub parameters: Vec<RegularParameter>,
    /// Parameter names in declaration order, for the invocation
    pub declaration_order: Vec<String>,
    pub throws: Vec<TypeName>,
}

impl RegularGoal {
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty() || !self.instance_type_params.is_empty()
    }

    /// Checked exceptions of all projection methods, deduplicated
    pub fn projection_throws(&self) -> Vec<TypeName> {
        let mut out: Vec<TypeName> = Vec::new();
        for p in &self.parameters {
            if let Projection::Method { throws, .. } = &p.projection {
                for t in throws {
                    if !out.contains(t) {
                        out.push(t.clone());
                    }
                }
            }
        }
        out
    }
}

/// A bean property with both accessors
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorPair {
    /// Property name, e.g. `name` for `getName`
    pub name: String,
    pub ty: TypeName,
    pub getter: String,
    pub setter: String,
    pub null_policy: NullPolicy,
}

/// A collection property exposed only through its getter
#[derive(Debug, Clone, PartialEq)]
pub struct LoneGetter {
    pub name: String,
    /// The collection type the getter returns
    pub ty: TypeName,
    pub element: TypeName,
    pub getter: String,
    pub null_policy: NullPolicy,
    /// Loop variable used when copying elements
    pub iteration_var: String,
}

impl LoneGetter {
    /// Accepted argument type, e.g. `Iterable<? extends String>`
    pub fn iterable_type(&self) -> TypeName {
        let element = match &self.element {
            TypeName::Wildcard(_) => self.element.clone(),
            other => TypeName::Wildcard(crate::types::Wildcard::Extends(Box::new(other.boxed()))),
        };
        TypeName::parameterized(ClassName::new("java.lang", ["Iterable"]), vec![element])
    }
}

/// One bean property
#[derive(Debug, Clone, PartialEq)]
pub enum BeanParameter {
    AccessorPair(AccessorPair),
    LoneGetter(LoneGetter),
}

impl BeanParameter {
    pub fn name(&self) -> &str {
        match self {
            BeanParameter::AccessorPair(p) => &p.name,
            BeanParameter::LoneGetter(p) => &p.name,
        }
    }

    pub fn getter(&self) -> &str {
        match self {
            BeanParameter::AccessorPair(p) => &p.getter,
            BeanParameter::LoneGetter(p) => &p.getter,
        }
    }

    pub fn null_policy(&self) -> NullPolicy {
        match self {
            BeanParameter::AccessorPair(p) => p.null_policy,
            BeanParameter::LoneGetter(p) => p.null_policy,
        }
    }

    /// Type accepted by the step method
    pub fn step_type(&self) -> TypeName {
        match self {
            BeanParameter::AccessorPair(p) => p.ty.clone(),
            BeanParameter::LoneGetter(p) => p.iterable_type(),
        }
    }

    pub fn rejects_null(&self) -> bool {
        match self {
            BeanParameter::AccessorPair(p) => {
                p.null_policy == NullPolicy::Reject && !p.ty.is_primitive()
            }
            BeanParameter::LoneGetter(p) => p.null_policy == NullPolicy::Reject,
        }
    }
}

/// A bean goal: no-arg construction followed by setter calls
#[derive(Debug, Clone, PartialEq)]
pub struct BeanGoal {
    pub details: GoalDetails,
    /// Properties in step order
    pub parameters: Vec<BeanParameter>,
}

impl BeanGoal {
    pub fn bean_type(&self) -> &TypeName {
        &self.details.goal_type
    }

    /// Field holding the bean under construction, e.g. `businessAnalyst`
    pub fn bean_field(&self) -> String {
        crate::util::downcase(&self.details.goal_type.simple_name())
    }
}

/// A validated goal
#[derive(Debug, Clone, PartialEq)]
pub enum GoalDescription {
    Regular(RegularGoal),
    Bean(BeanGoal),
}

impl GoalDescription {
    pub fn details(&self) -> &GoalDetails {
        match self {
            GoalDescription::Regular(g) => &g.details,
            GoalDescription::Bean(g) => &g.details,
        }
    }

    pub fn parameter_count(&self) -> usize {
        match self {
            GoalDescription::Regular(g) => g.parameters.len(),
            GoalDescription::Bean(g) => g.parameters.len(),
        }
    }
}
