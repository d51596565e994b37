//! Step builders for plain constructor, method and bean goals
//!
//! Emits the contract, one implementation class that implements every
//! step interface, and the `<goal>Builder()` entry point. With
//! [`Lifecycle::ReuseInstances`](crate::goal::Lifecycle) the entry point
//! takes the implementation from the thread-local container instead of
//! allocating one.

use super::bean_updater::{empty_body, finish_bean, property_body};
use super::{
    acquire, allocate, cache_field, contract, finish_regular, guard, in_use_field, invocation,
    recycles, step_return, ModuleOutput,
};
use crate::code;
use crate::decl::{with_access, FieldSpec, MethodSpec, Stmt, TypeSpec};
use crate::goal::{BeanGoal, GoalContext, GoalDescription, ParameterRef, RegularGoal, RegularKind, Step};
use crate::model::{Access, Modifier};
use crate::types::TypeName;
use crate::util::{distinct_from, downcase};

pub fn generate(ctx: &GoalContext<'_>, access: Access) -> ModuleOutput {
    match ctx.goal {
        GoalDescription::Regular(goal) => regular(ctx, goal, access),
        GoalDescription::Bean(goal) => bean(ctx, goal, access),
    }
}

fn impl_class(ctx: &GoalContext<'_>) -> TypeSpec {
    let name = ctx.details().impl_name();
    let mut class = TypeSpec::class(&name, &[Modifier::Static, Modifier::Final]);
    class.implements = ctx
        .steps
        .iter()
        .map(|s| super::step_ref(ctx, s, None))
        .collect();
    class
}

fn regular(ctx: &GoalContext<'_>, goal: &RegularGoal, access: Access) -> ModuleOutput {
    let recycle = recycles(ctx.goal);
    let impl_type = ctx.impl_type();
    let instance = goal.kind == RegularKind::InstanceMethod;

    // everything but the last step's argument lives on the implementation
    let mut retained: Vec<(String, TypeName)> = Vec::new();
    if instance {
        retained.push(("_instance".to_string(), goal.owner.clone()));
    }
    for step in ctx.steps.iter().filter(|s| !s.is_last()) {
        retained.push((step.parameter.name().to_string(), step.parameter.step_type()));
    }

    let mut class = impl_class(ctx);
    class.fields = retained
        .iter()
        .map(|(name, ty)| FieldSpec::new(name, ty.clone(), &[Modifier::Private]))
        .collect();
    if recycle {
        class.fields.push(in_use_field());
    }
    class.methods.push(MethodSpec::constructor(&class.name));

    for step in &ctx.steps {
        let name = step.parameter.name();
        let mut body = guard(step);
        if step.is_last() {
            let invoke = invocation(goal, "this._instance", |arg| {
                if arg == name {
                    code![arg]
                } else {
                    code![format!("this.{}", arg)]
                }
            });
            body.extend(finish_regular(goal, invoke, recycle, &retained));
        } else {
            body.push(Stmt::assign(format!("this.{}", name), code![name]));
            body.push(Stmt::Return(code!["this"]));
        }
        class.methods.push(
            MethodSpec::method(&step.method, step_return(ctx, step, None))
                .modifiers(&[Modifier::Public])
                .overriding()
                .param(name, step.parameter.step_type())
                .throws(&step.throws)
                .body(body),
        );
    }

    let receiver = downcase(&goal.owner.simple_name());
    let local = distinct_from("builder", &receiver);
    let mut body = if recycle {
        acquire(ctx, &impl_type, &local, &[receiver.as_str()])
    } else {
        vec![allocate(&impl_type, &local)]
    };
    if instance {
        body.push(Stmt::assign(format!("{}._instance", local), code![&receiver]));
    }
    body.push(Stmt::Return(code![local]));

    let mut entry = MethodSpec::method(ctx.details().builder_method(), ctx.first_step_type())
        .modifiers(&with_access(access, &[Modifier::Static]));
    if instance {
        entry = entry.param(&receiver, goal.owner.clone());
    }

    ModuleOutput {
        methods: vec![entry.body(body)],
        types: vec![contract(ctx, access, None), class],
        fields: if recycle {
            vec![cache_field(&impl_type)]
        } else {
            Vec::new()
        },
    }
}

fn bean(ctx: &GoalContext<'_>, goal: &BeanGoal, access: Access) -> ModuleOutput {
    let recycle = recycles(ctx.goal);
    let impl_type = ctx.impl_type();
    let field = goal.bean_field();
    let target = format!("this.{}", field);

    let mut class = impl_class(ctx);
    class
        .fields
        .push(FieldSpec::new(&field, goal.bean_type().clone(), &[Modifier::Private]));
    if recycle {
        class.fields.push(in_use_field());
    }
    class.methods.push(MethodSpec::constructor(&class.name));

    let finish = |step: &Step<'_>| {
        if step.is_last() {
            finish_bean(goal, recycle)
        } else {
            vec![Stmt::Return(code!["this"])]
        }
    };

    for step in &ctx.steps {
        let ParameterRef::Bean(param) = step.parameter else {
            continue;
        };
        let returns = step_return(ctx, step, None);
        let mut body = property_body(&target, param, false);
        body.extend(finish(step));
        class.methods.push(
            MethodSpec::method(&step.method, returns.clone())
                .modifiers(&[Modifier::Public])
                .overriding()
                .param(param.name(), param.step_type())
                .body(body),
        );
        if let Some(empty) = &step.empty {
            let mut body = empty_body(&target, param, empty, false);
            body.extend(finish(step));
            class.methods.push(
                MethodSpec::method(&empty.method, returns)
                    .modifiers(&[Modifier::Public])
                    .overriding()
                    .body(body),
            );
        }
    }

    let local = "builder";
    let mut body = if recycle {
        acquire(ctx, &impl_type, local, &[])
    } else {
        vec![allocate(&impl_type, local)]
    };
    body.push(Stmt::assign(
        format!("{}.{}", local, field),
        code!["new ", goal.bean_type(), "()"],
    ));
    body.push(Stmt::Return(code![local]));

    let entry = MethodSpec::method(ctx.details().builder_method(), ctx.first_step_type())
        .modifiers(&with_access(access, &[Modifier::Static]))
        .body(body);

    ModuleOutput {
        methods: vec![entry],
        types: vec![contract(ctx, access, None), class],
        fields: if recycle {
            vec![cache_field(&impl_type)]
        } else {
            Vec::new()
        },
    }
}
