//! Module generators: one emitted unit per goal and feature
//!
//! Each generator is a pure function from a [`GoalContext`] to a
//! [`ModuleOutput`]: entry methods on the generated type, nested contract
//! and implementation types, and the cache fields recycling needs.
//!
//! - [`builder`]: step interfaces plus one mutable implementation
//! - [`updater`]: a pre-seeded copy of an existing instance
//! - [`bean_updater`]: the updater for bean goals
//! - [`generics`]: builders for goals with type parameters

pub mod bean_updater;
pub mod builder;
pub mod generics;
pub mod updater;

use crate::decl::{with_access, Code, FieldSpec, MethodSpec, Stmt, TypeSpec};
use crate::goal::{GoalContext, GoalDescription, ParameterRef, RegularGoal, RegularKind, Step};
use crate::model::{Access, Modifier};
use crate::types::{TypeName, TypeVar};
use crate::util::downcase;
use crate::code;

/// Flag marking a recycled object as taken
pub const IN_USE: &str = "_currently_in_use";

/// Field of the generated type holding the per-thread container
pub const INSTANCE: &str = "INSTANCE";

/// What one generator contributes to the generated type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleOutput {
    /// Static entry points, e.g. `cubeBuilder()`
    pub methods: Vec<MethodSpec>,
    /// Nested contract and implementation types
    pub types: Vec<TypeSpec>,
    /// Cache fields of the per-thread container
    pub fields: Vec<FieldSpec>,
}

/// The generator families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Builder,
    Updater,
    BeanUpdater,
    Generics,
}

impl Module {
    /// Generators a goal asks for, in emission order
    pub fn for_goal(goal: &GoalDescription) -> Vec<Module> {
        let details = goal.details();
        let mut out = Vec::new();
        match goal {
            GoalDescription::Regular(g) => {
                if details.builder.is_some() {
                    out.push(if g.is_generic() {
                        Module::Generics
                    } else {
                        Module::Builder
                    });
                }
                if details.updater.is_some() {
                    out.push(Module::Updater);
                }
            }
            GoalDescription::Bean(_) => {
                if details.builder.is_some() {
                    out.push(Module::Builder);
                }
                if details.updater.is_some() {
                    out.push(Module::BeanUpdater);
                }
            }
        }
        out
    }

    pub fn name(self) -> &'static str {
        match self {
            Module::Builder => "builder",
            Module::Updater => "updater",
            Module::BeanUpdater => "bean-updater",
            Module::Generics => "generics",
        }
    }

    /// Run this generator; a module that does not apply yields nothing
    pub fn generate(self, ctx: &GoalContext<'_>) -> ModuleOutput {
        let details = ctx.details();
        let output = match (self, ctx.goal) {
            (Module::Builder, _) => details
                .builder
                .map(|access| builder::generate(ctx, access)),
            (Module::Generics, GoalDescription::Regular(goal)) => details
                .builder
                .map(|access| generics::generate(ctx, goal, access)),
            (Module::Updater, GoalDescription::Regular(goal)) => details
                .updater
                .map(|access| updater::generate(ctx, goal, access)),
            (Module::BeanUpdater, GoalDescription::Bean(goal)) => details
                .updater
                .map(|access| bean_updater::generate(ctx, goal, access)),
            _ => None,
        };
        let output = output.unwrap_or_default();
        tracing::debug!(
            goal = %details.name,
            module = self.name(),
            types = output.types.len(),
            "emitted module"
        );
        output
    }
}

/// Whether generated code for this goal uses the thread-local cache.
/// Generic goals always allocate.
pub fn recycles(goal: &GoalDescription) -> bool {
    match goal {
        GoalDescription::Regular(g) => g.details.recycles() && !g.is_generic(),
        GoalDescription::Bean(g) => g.details.recycles(),
    }
}

/// Type variables as type arguments
pub fn var_args(vars: &[TypeVar]) -> Vec<TypeName> {
    vars.iter().map(|v| TypeName::Var(v.name.clone())).collect()
}

/// Name of the cache field for a nested class, e.g. `cubeBuilderImpl`
pub fn slot_name(class: &str) -> String {
    downcase(class)
}

/// `private Impl slot = new Impl();`
pub fn cache_field(class: &TypeName) -> FieldSpec {
    FieldSpec::new(
        slot_name(&class.simple_name()),
        class.clone(),
        &[Modifier::Private],
    )
    .with_init(code!["new ", class, "()"])
}

/// `private boolean _currently_in_use;`
pub fn in_use_field() -> FieldSpec {
    FieldSpec::new(
        IN_USE,
        TypeName::Primitive(crate::types::Primitive::Boolean),
        &[Modifier::Private],
    )
}

/// Take the cached object of `class` from the current thread's container,
/// or a fresh one if the cached object is already in use, and bind it to
/// `local`.
///
/// A fresh object replaces the cached one in its slot; the previous object
/// stays with the caller that holds it. `params` are the entry's parameter
/// names.
pub fn acquire(ctx: &GoalContext<'_>, class: &TypeName, local: &str, params: &[&str]) -> Vec<Stmt> {
    let generated = ctx.builders.generated_type();
    let context = context_name(local, params);
    let slot = format!("{}.{}", context, slot_name(&class.simple_name()));
    vec![
        Stmt::Expr(code![&generated, format!(" {} = {}.get()", context, INSTANCE)]),
        Stmt::If {
            cond: code![format!("{}.{}", slot, IN_USE)],
            then: vec![Stmt::assign(slot.clone(), code!["new ", class, "()"])],
        },
        Stmt::Expr(code![class, format!(" {} = {}", local, slot)]),
        Stmt::assign(format!("{}.{}", local, IN_USE), code!["true"]),
    ]
}

/// Local holding the thread's container inside an entry method
pub fn context_name(local: &str, params: &[&str]) -> String {
    let mut taken = vec![local];
    taken.extend_from_slice(params);
    crate::util::unused_name("context", &taken)
}

/// `Impl local = new Impl();`
pub fn allocate(class: &TypeName, local: &str) -> Stmt {
    let diamond = if class.type_args().is_empty() { "()" } else { "<>()" };
    let raw = class
        .raw_class()
        .map(|c| TypeName::class(c.clone()))
        .unwrap_or_else(|| class.clone());
    Stmt::Expr(code![class, format!(" {} = new ", local), raw, diamond])
}

/// Statements that null out retained references once a recycled object
/// is done, so it does not keep its last inputs alive
pub fn release<'a>(fields: impl IntoIterator<Item = (&'a str, &'a TypeName)>) -> Vec<Stmt> {
    fields
        .into_iter()
        .filter(|(_, ty)| !ty.is_primitive())
        .map(|(name, _)| Stmt::assign(format!("this.{}", name), code!["null"]))
        .collect()
}

/// Invoke a regular goal: constructor call, static call or instance call.
/// `arg` maps a parameter name to its value expression.
pub fn invocation(goal: &RegularGoal, instance: &str, arg: impl Fn(&str) -> Code) -> Code {
    let args = Code::join(goal.declaration_order.iter().map(|name| arg(name)), ", ");
    let head = match goal.kind {
        RegularKind::Constructor => code!["new ", &goal.details.goal_type, "("],
        RegularKind::StaticMethod => {
            let owner = goal
                .owner
                .raw_class()
                .map(|c| TypeName::class(c.clone()))
                .unwrap_or_else(|| goal.owner.clone());
            code![owner, format!(".{}(", goal.method)]
        }
        RegularKind::InstanceMethod => code![format!("{}.{}(", instance, goal.method)],
    };
    head.then(args).then(code![")"])
}

/// Statements ending a regular goal: invoke, and for recycled objects,
/// clear the flag first and release retained fields afterwards
pub fn finish_regular(
    goal: &RegularGoal,
    invoke: Code,
    recycle: bool,
    retained: &[(String, TypeName)],
) -> Vec<Stmt> {
    let goal_type = &goal.details.goal_type;
    let void = goal_type.is_void();
    if !recycle {
        return vec![if void {
            Stmt::Expr(invoke)
        } else {
            Stmt::Return(invoke)
        }];
    }
    let result = format!("_{}", downcase(&goal_type.boxed().simple_name()));
    let mut body = vec![Stmt::assign(format!("this.{}", IN_USE), code!["false"])];
    if void {
        body.push(Stmt::Expr(invoke));
    } else {
        body.push(Stmt::Expr(
            code![goal_type, format!(" {} = ", result)].then(invoke),
        ));
    }
    body.extend(release(retained.iter().map(|(n, t)| (n.as_str(), t))));
    if !void {
        body.push(Stmt::Return(code![result]));
    }
    body
}

/// `if (x == null) throw ...` for regular steps that reject null; bean
/// steps guard inside their property body
pub fn guard(step: &Step<'_>) -> Vec<Stmt> {
    let name = step.parameter.name();
    match step.parameter {
        ParameterRef::Regular(p) if p.rejects_null() => vec![Stmt::null_guard(code![name], name)],
        _ => Vec::new(),
    }
}

/// Parameter type list of the goal's steps
pub fn step_types(ctx: &GoalContext<'_>) -> Vec<TypeName> {
    ctx.steps.iter().map(|s| s.parameter.step_type()).collect()
}

/// Type parameters of each step interface and step method of a generic goal
pub struct StepVars<'v> {
    pub interfaces: &'v [Vec<TypeVar>],
    pub methods: &'v [Vec<TypeVar>],
}

/// The contract class: a non-instantiable holder of one single-method
/// interface per step
pub fn contract(ctx: &GoalContext<'_>, access: Access, vars: Option<&StepVars<'_>>) -> TypeSpec {
    let name = ctx.details().contract_name();
    let mut contract = TypeSpec::class(&name, &with_access(access, &[Modifier::Static, Modifier::Final]));
    contract.methods.push(
        MethodSpec::constructor(&name)
            .modifiers(&[Modifier::Private])
            .body(vec![Stmt::Expr(code![
                "throw new ",
                TypeName::java_lang("UnsupportedOperationException"),
                "(\"no instances\")"
            ])]),
    );
    for step in &ctx.steps {
        let mut interface = TypeSpec::interface(&step.interface, &crate::decl::access_modifiers(access));
        let method_vars = match vars {
            Some(v) => {
                interface.type_params = v.interfaces[step.position].clone();
                v.methods[step.position].clone()
            }
            None => Vec::new(),
        };
        let returns = step_return(ctx, step, vars);
        interface.methods.push(
            MethodSpec::abstract_method(&step.method, returns.clone())
                .type_params(method_vars)
                .param(step.parameter.name(), step.parameter.step_type())
                .throws(&step.throws),
        );
        if let Some(empty) = &step.empty {
            interface.methods.push(
                MethodSpec::abstract_method(&empty.method, returns).throws(&step.throws),
            );
        }
        contract.types.push(interface);
    }
    contract
}

/// Reference to a step interface, with its type arguments if generic
pub fn step_ref(ctx: &GoalContext<'_>, step: &Step<'_>, vars: Option<&StepVars<'_>>) -> TypeName {
    let class = ctx.contract().nested(&step.interface);
    match vars {
        Some(v) => TypeName::parameterized(class, var_args(&v.interfaces[step.position])),
        None => TypeName::class(class),
    }
}

/// What a step method returns
pub fn step_return(ctx: &GoalContext<'_>, step: &Step<'_>, vars: Option<&StepVars<'_>>) -> TypeName {
    match ctx.steps.get(step.position + 1) {
        Some(next) if !step.is_last() => step_ref(ctx, next, vars),
        _ => ctx.next_type(step),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::{BuildersContext, GoalDetails, Lifecycle, Projection, RegularParameter};
    use crate::model::NullPolicy;
    use crate::types::ClassName;

    fn cube(kind: RegularKind, recycle: bool) -> GoalDescription {
        let cube = TypeName::class(ClassName::new("cube", ["Cube"]));
        GoalDescription::Regular(RegularGoal {
            details: GoalDetails {
                name: "cube".into(),
                goal_type: cube.clone(),
                builder: Some(Access::Public),
                updater: Some(Access::Public),
                lifecycle: if recycle {
                    Lifecycle::ReuseInstances
                } else {
                    Lifecycle::NewInstance
                },
                element: "Cube#<init>(String, int)".into(),
            },
            kind,
            owner: TypeName::class(ClassName::new("cube", ["Factory"])),
            method: "make".into(),
            type_params: vec![],
            instance_type_params: vec![],
            parameters: vec![
                RegularParameter {
                    name: "width".into(),
                    ty: TypeName::java_lang("String"),
                    null_policy: NullPolicy::Allow,
                    projection: Projection::None,
                },
                RegularParameter {
                    name: "depth".into(),
                    ty: TypeName::Primitive(crate::types::Primitive::Int),
                    null_policy: NullPolicy::Allow,
                    projection: Projection::None,
                },
            ],
            declaration_order: vec!["width".into(), "depth".into()],
            throws: vec![],
        })
    }

    #[test]
    fn test_modules_for_goal() {
        let goal = cube(RegularKind::Constructor, false);
        assert_eq!(Module::for_goal(&goal), vec![Module::Builder, Module::Updater]);
    }

    #[test]
    fn test_invocation_kinds() {
        let arg = |n: &str| code![format!("this.{}", n)];
        for (kind, expected) in [
            (RegularKind::Constructor, "new Cube(this.width, this.depth)"),
            (RegularKind::StaticMethod, "Factory.make(this.width, this.depth)"),
            (RegularKind::InstanceMethod, "this._instance.make(this.width, this.depth)"),
        ] {
            let GoalDescription::Regular(goal) = cube(kind, false) else {
                unreachable!()
            };
            assert_eq!(invocation(&goal, "this._instance", arg).to_string(), expected);
        }
    }

    #[test]
    fn test_finish_releases_only_references() {
        let GoalDescription::Regular(goal) = cube(RegularKind::Constructor, true) else {
            unreachable!()
        };
        let retained = vec![
            ("width".to_string(), TypeName::java_lang("String")),
            ("depth".to_string(), TypeName::Primitive(crate::types::Primitive::Int)),
        ];
        let body = finish_regular(&goal, code!["new Cube(w, d)"], true, &retained);
        let rendered: Vec<String> = body
            .iter()
            .map(|s| match s {
                Stmt::Expr(c) => format!("{};", c),
                Stmt::Return(c) => format!("return {};", c),
                other => format!("{:?}", other),
            })
            .collect();
        assert_eq!(
            rendered,
            vec![
                "this._currently_in_use = false;",
                "Cube _cube = new Cube(w, d);",
                "this.width = null;",
                "return _cube;",
            ]
        );
    }

    #[test]
    fn test_contract_shape() {
        let goal = cube(RegularKind::Constructor, false);
        let builders = BuildersContext {
            generated: ClassName::new("cube", ["CubeBuilders"]),
            recycle: false,
        };
        let ctx = GoalContext::new(&goal, &builders);
        let contract = contract(&ctx, Access::Public, None);
        assert_eq!(contract.name, "CubeBuilder");
        assert_eq!(contract.types.len(), 2);
        let width = contract.nested("Width").unwrap();
        let method = width.method("width").unwrap();
        assert_eq!(method.returns.to_string(), "CubeBuilders.CubeBuilder.Depth");
        assert!(method.body.is_none());
        let depth = contract.nested("Depth").unwrap();
        assert_eq!(depth.method("depth").unwrap().returns.to_string(), "Cube");
    }
}
