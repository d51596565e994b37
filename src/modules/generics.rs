//! Step builders for goals with type parameters
//!
//! A generic chain cannot share one mutable implementation: each step may
//! introduce new type variables, so every step gets its own immutable
//! implementation class that links to its predecessor and holds the
//! previous argument. Which variables each step interface and method
//! declares follows from [`liveness`].

use super::{contract, guard, invocation, step_ref, step_return, step_types, var_args, ModuleOutput, StepVars};
use crate::code;
use crate::decl::{with_access, Code, FieldSpec, MethodSpec, Stmt, TypeSpec};
use crate::goal::{GoalContext, RegularGoal, RegularKind};
use crate::model::{Access, Modifier};
use crate::types::{TypeName, TypeVar};

/// Type variables declared per step
#[derive(Debug, Clone, PartialEq)]
pub struct Liveness {
    /// Variables of step interface `i`: introduced before step `i` and
    /// still needed at or after it
    pub interfaces: Vec<Vec<TypeVar>>,
    /// Variables step method `i` introduces; the last step also introduces
    /// those only the result mentions
    pub methods: Vec<Vec<TypeVar>>,
    /// Variables of implementation `i`: everything introduced before step
    /// `i`, plus the receiver's variables
    pub impls: Vec<Vec<TypeVar>>,
}

/// Compute per-step type variables.
///
/// With `f(v)` the first and `l(v)` the last step whose type mentions `v`
/// (the result counts as step `n`), and receiver variables fixed at
/// `f(v) = -1`:
///
/// - step method `i` declares `{ v | f(v) = i }`
/// - step interface `i` declares `{ v | f(v) < i <= l(v) }`
///
/// A variable whose bound mentions another variable widens that variable's
/// range to its own, until nothing changes. Variables no type mentions are
/// dropped.
pub fn liveness(
    steps: &[TypeName],
    returns: &TypeName,
    type_params: &[TypeVar],
    instance_params: &[TypeVar],
) -> Liveness {
    let n = steps.len() as isize;
    let vars: Vec<&TypeVar> = instance_params.iter().chain(type_params).collect();
    let receiver = |k: usize| k < instance_params.len();

    let mut ranges: Vec<Option<(isize, isize)>> = vars
        .iter()
        .enumerate()
        .map(|(k, v)| {
            let mut at: Vec<isize> = steps
                .iter()
                .enumerate()
                .filter(|(_, t)| t.mentions(&v.name))
                .map(|(i, _)| i as isize)
                .collect();
            if returns.mentions(&v.name) {
                at.push(n);
            }
            if receiver(k) {
                Some((-1, at.last().copied().unwrap_or(-1)))
            } else {
                Some((*at.first()?, *at.last()?))
            }
        })
        .collect();

    loop {
        let mut changed = false;
        for k in 0..vars.len() {
            let Some((first, last)) = ranges[k] else {
                continue;
            };
            for w in 0..vars.len() {
                if w == k || !vars[k].bounds.iter().any(|b| b.mentions(&vars[w].name)) {
                    continue;
                }
                let widened = match ranges[w] {
                    None => (first, last),
                    Some((f, l)) => (f.min(first), l.max(last)),
                };
                if ranges[w] != Some(widened) {
                    ranges[w] = Some(widened);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    let mut live = Liveness {
        interfaces: Vec::new(),
        methods: Vec::new(),
        impls: Vec::new(),
    };
    for i in 0..n {
        let mut interface = Vec::new();
        let mut method = Vec::new();
        let mut implementation = Vec::new();
        for (k, v) in vars.iter().enumerate() {
            if receiver(k) {
                implementation.push((*v).clone());
            }
            let Some((f, l)) = ranges[k] else {
                continue;
            };
            if f < i && i <= l {
                interface.push((*v).clone());
            }
            if !receiver(k) {
                if f == i || (i == n - 1 && f == n) {
                    method.push((*v).clone());
                }
                if f < i {
                    implementation.push((*v).clone());
                }
            }
        }
        live.interfaces.push(interface);
        live.methods.push(method);
        live.impls.push(implementation);
    }
    live
}

pub fn generate(ctx: &GoalContext<'_>, goal: &RegularGoal, access: Access) -> ModuleOutput {
    if goal.details.recycles() {
        tracing::warn!(
            goal = %goal.details.name,
            "recycling is not available for generic goals; allocating instead"
        );
    }
    let live = liveness(
        &step_types(ctx),
        &goal.details.goal_type,
        &goal.type_params,
        &goal.instance_type_params,
    );
    let vars = StepVars {
        interfaces: &live.interfaces,
        methods: &live.methods,
    };
    let instance = goal.kind == RegularKind::InstanceMethod;
    let holder_name = ctx.details().impl_name();
    let holder = ctx.builders.generated.nested(&holder_name);
    let impl_name = |i: usize| format!("{}Impl", ctx.steps[i].interface);
    let raw_impl = |i: usize| TypeName::class(holder.nested(&impl_name(i)));
    let impl_ref = |i: usize| {
        TypeName::parameterized(holder.nested(&impl_name(i)), var_args(&live.impls[i]))
    };
    // implementation `i` links to `i - 1` unless that one holds nothing
    let linked = |i: usize| i >= 2 || (i == 1 && instance);
    let n = ctx.steps.len();

    let mut holder_class = TypeSpec::class(&holder_name, &[Modifier::Static, Modifier::Final]);
    holder_class.methods.push(no_instances(&holder_name));

    for step in &ctx.steps {
        let i = step.position;
        let name = impl_name(i);
        let mut class = TypeSpec::class(&name, &[Modifier::Static, Modifier::Final]);
        class.type_params = live.impls[i].clone();
        class.implements = vec![step_ref(ctx, step, Some(&vars))];

        let mut ctor = MethodSpec::constructor(&name);
        let mut init = Vec::new();
        let mut hold = |field: &str, ty: TypeName, ctor: MethodSpec| {
            class
                .fields
                .push(FieldSpec::new(field, ty.clone(), &[Modifier::Private, Modifier::Final]));
            init.push(Stmt::assign(format!("this.{}", field), code![field]));
            ctor.param(field, ty)
        };
        if i == 0 && instance {
            ctor = hold("_instance", goal.owner.clone(), ctor);
        }
        if linked(i) {
            ctor = hold("_up", impl_ref(i - 1), ctor);
        }
        if i >= 1 {
            let previous = &ctx.steps[i - 1];
            ctor = hold(previous.parameter.name(), previous.parameter.step_type(), ctor);
        }
        if i == 0 && !instance {
            ctor = ctor.modifiers(&[Modifier::Private]);
            class.fields.push(
                FieldSpec::new("INSTANCE", raw_impl(0), &[Modifier::Static, Modifier::Final])
                    .with_init(code!["new ", raw_impl(0), "()"]),
            );
        }
        class.methods.push(ctor.body(init));

        let arg = step.parameter.name();
        let mut body = guard(step);
        if step.is_last() {
            let up = |hops: usize| format!("this{}", "._up".repeat(hops));
            let position = |param: &str| {
                ctx.steps
                    .iter()
                    .position(|s| s.parameter.name() == param)
                    .unwrap_or(i)
            };
            let receiver = format!("{}._instance", up(n - 1));
            let invoke = invocation(goal, &receiver, |param| {
                let j = position(param);
                if j == i {
                    code![param]
                } else {
                    code![format!("{}.{}", up(n - 1 - (j + 1)), param)]
                }
            });
            body.push(if goal.details.goal_type.is_void() {
                Stmt::Expr(invoke)
            } else {
                Stmt::Return(invoke)
            });
        } else {
            let mut args = Vec::new();
            if linked(i + 1) {
                args.push(code!["this"]);
            }
            args.push(code![arg]);
            let diamond = if live.impls[i + 1].is_empty() { "(" } else { "<>(" };
            body.push(Stmt::Return(
                code!["new ", raw_impl(i + 1), diamond]
                    .then(Code::join(args, ", "))
                    .then(code![")"]),
            ));
        }
        class.methods.push(
            MethodSpec::method(&step.method, step_return(ctx, step, Some(&vars)))
                .modifiers(&[Modifier::Public])
                .overriding()
                .type_params(live.methods[i].clone())
                .param(arg, step.parameter.step_type())
                .throws(&step.throws)
                .body(body),
        );
        holder_class.types.push(class);
    }

    let mut entry = MethodSpec::method(
        ctx.details().builder_method(),
        step_ref(ctx, &ctx.steps[0], Some(&vars)),
    )
    .modifiers(&with_access(access, &[Modifier::Static]))
    .type_params(goal.instance_type_params.clone());
    let start = if instance {
        let receiver = crate::util::downcase(&goal.owner.simple_name());
        entry = entry.param(&receiver, goal.owner.clone());
        let diamond = if live.impls[0].is_empty() { "(" } else { "<>(" };
        code!["new ", raw_impl(0), diamond, receiver, ")"]
    } else {
        code![raw_impl(0), ".INSTANCE"]
    };

    ModuleOutput {
        methods: vec![entry.body(vec![Stmt::Return(start)])],
        types: vec![contract(ctx, access, Some(&vars)), holder_class],
        fields: Vec::new(),
    }
}

fn no_instances(name: &str) -> MethodSpec {
    MethodSpec::constructor(name)
        .modifiers(&[Modifier::Private])
        .body(vec![Stmt::Expr(code![
            "throw new ",
            TypeName::java_lang("UnsupportedOperationException"),
            "(\"no instances\")"
        ])])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassName, TypeScope};

    fn ty(s: &str) -> TypeName {
        TypeName::parse(s, &TypeScope::new("p").with_vars(["A", "B", "C", "K", "V"])).unwrap()
    }

    fn names(vars: &[TypeVar]) -> Vec<&str> {
        vars.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn test_liveness_map_goal() {
        // <K, V> Map<K, V> entry(K key, V value)
        let live = liveness(
            &[ty("K"), ty("V")],
            &ty("Map<K, V>"),
            &[TypeVar::unbounded("K"), TypeVar::unbounded("V")],
            &[],
        );
        assert_eq!(names(&live.methods[0]), vec!["K"]);
        assert_eq!(names(&live.methods[1]), vec!["V"]);
        assert!(live.interfaces[0].is_empty());
        assert_eq!(names(&live.interfaces[1]), vec!["K"]);
        assert!(live.impls[0].is_empty());
        assert_eq!(names(&live.impls[1]), vec!["K"]);
    }

    #[test]
    fn test_dead_variables_are_erased() {
        // <A> String describe(A first, int count)
        let live = liveness(
            &[ty("A"), ty("int")],
            &ty("String"),
            &[TypeVar::unbounded("A")],
            &[],
        );
        assert_eq!(names(&live.methods[0]), vec!["A"]);
        // A is not needed by step 1 or the result
        assert!(live.interfaces[1].is_empty());
        // but the implementation still stores an A
        assert_eq!(names(&live.impls[1]), vec!["A"]);
    }

    #[test]
    fn test_result_only_variable_goes_on_last_step() {
        let live = liveness(
            &[ty("String"), ty("int")],
            &ty("List<C>"),
            &[TypeVar::unbounded("C")],
            &[],
        );
        assert!(live.methods[0].is_empty());
        assert_eq!(names(&live.methods[1]), vec!["C"]);
    }

    #[test]
    fn test_bounds_pull_variables_forward() {
        // <A, B extends List<A>> ... (B b, A a)
        let b = TypeVar {
            name: "B".into(),
            bounds: vec![ty("List<A>")],
        };
        let live = liveness(
            &[ty("B"), ty("A")],
            &ty("String"),
            &[TypeVar::unbounded("A"), b],
            &[],
        );
        assert_eq!(names(&live.methods[0]), vec!["A", "B"]);
        assert!(live.methods[1].is_empty());
        assert_eq!(names(&live.interfaces[1]), vec!["A"]);
    }

    #[test]
    fn test_receiver_variables_live_from_the_start() {
        let live = liveness(
            &[ty("A"), ty("int")],
            &ty("String"),
            &[],
            &[TypeVar::unbounded("A")],
        );
        assert!(live.methods.iter().all(|m| m.is_empty()));
        assert_eq!(names(&live.interfaces[0]), vec!["A"]);
        assert!(live.interfaces[1].is_empty());
        assert_eq!(names(&live.impls[1]), vec!["A"]);
    }

    #[test]
    fn test_generated_chain() {
        use crate::goal::{
            BuildersContext, GoalDescription, GoalDetails, Lifecycle, Projection,
            RegularParameter,
        };
        use crate::model::NullPolicy;

        let pair = |name: &str, t: &str| RegularParameter {
            name: name.into(),
            ty: ty(t),
            null_policy: NullPolicy::Allow,
            projection: Projection::None,
        };
        let goal = GoalDescription::Regular(RegularGoal {
            details: GoalDetails {
                name: "map".into(),
                goal_type: ty("Map<K, V>"),
                builder: Some(Access::Public),
                updater: None,
                lifecycle: Lifecycle::ReuseInstances,
                element: "Maps#entry(K, V)".into(),
            },
            kind: RegularKind::StaticMethod,
            owner: TypeName::class(ClassName::new("p", ["Maps"])),
            method: "entry".into(),
            type_params: vec![TypeVar::unbounded("K"), TypeVar::unbounded("V")],
            instance_type_params: vec![],
            parameters: vec![pair("key", "K"), pair("value", "V")],
            declaration_order: vec!["key".into(), "value".into()],
            throws: vec![],
        });
        let builders = BuildersContext {
            generated: ClassName::new("p", ["MapsBuilders"]),
            recycle: false,
        };
        let ctx = GoalContext::new(&goal, &builders);
        let GoalDescription::Regular(regular) = &goal else {
            unreachable!()
        };
        let out = generate(&ctx, regular, Access::Public);

        assert!(out.fields.is_empty());
        let entry = &out.methods[0];
        assert_eq!(entry.returns.to_string(), "MapsBuilders.MapBuilder.Key");
        assert_eq!(
            entry.body.as_ref().unwrap()[0],
            Stmt::Return(code![
                TypeName::class(ClassName::new("p", ["MapsBuilders", "MapBuilderImpl", "KeyImpl"])),
                ".INSTANCE"
            ])
        );

        let holder = &out.types[1];
        let key = holder.nested("KeyImpl").unwrap();
        assert!(key.type_params.is_empty());
        assert!(key.field("INSTANCE").is_some());
        let key_method = key.method("key").unwrap();
        assert_eq!(names(&key_method.type_params), vec!["K"]);
        assert_eq!(key_method.returns.to_string(), "MapsBuilders.MapBuilder.Value<K>");

        let value = holder.nested("ValueImpl").unwrap();
        assert_eq!(names(&value.type_params), vec!["K"]);
        assert!(value.field("key").is_some());
        assert!(value.field("_up").is_none());
        let body = value.method("value").unwrap().body.as_ref().unwrap();
        assert_eq!(body[0].clone(), Stmt::Return(code![
            TypeName::class(ClassName::new("p", ["Maps"])),
            ".entry(",
            "this.key",
            ", ",
            "value",
            ")"
        ]));
    }
}
