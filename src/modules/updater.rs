//! Updaters for constructor and static method goals
//!
//! `cubeUpdater(cube)` reads every parameter back through its projection
//! and returns a mutable object with one setter-style method per
//! parameter; `done()` invokes the goal again with the current values.

use super::{
    acquire, allocate, cache_field, finish_regular, in_use_field, invocation, recycles, var_args,
    ModuleOutput,
};
use crate::code;
use crate::decl::{with_access, FieldSpec, MethodSpec, Stmt, TypeSpec};
use crate::goal::{EmptyOption, GoalContext, Projection, RegularGoal};
use crate::model::{Access, Modifier};
use crate::types::TypeName;
use crate::util::{distinct_from, downcase};

pub fn generate(ctx: &GoalContext<'_>, goal: &RegularGoal, access: Access) -> ModuleOutput {
    let recycle = recycles(ctx.goal);
    let details = ctx.details();
    let name = details.updater_name();
    let updater_type = match ctx.updater_type() {
        TypeName::Class { class, .. } => {
            TypeName::parameterized(class, var_args(&goal.type_params))
        }
        other => other,
    };

    let mut class = TypeSpec::class(&name, &with_access(access, &[Modifier::Static, Modifier::Final]));
    class.type_params = goal.type_params.clone();
    let retained: Vec<(String, TypeName)> = goal
        .parameters
        .iter()
        .map(|p| (p.name.clone(), p.ty.clone()))
        .collect();
    class.fields = retained
        .iter()
        .map(|(n, t)| FieldSpec::new(n, t.clone(), &[Modifier::Private]))
        .collect();
    if recycle {
        class.fields.push(in_use_field());
    }
    class
        .methods
        .push(MethodSpec::constructor(&name).modifiers(&[Modifier::Private]));

    for p in &goal.parameters {
        let mut body = Vec::new();
        if p.rejects_null() {
            body.push(Stmt::null_guard(code![&p.name], &p.name));
        }
        body.push(Stmt::assign(format!("this.{}", p.name), code![&p.name]));
        body.push(Stmt::Return(code!["this"]));
        class.methods.push(
            MethodSpec::method(&p.name, updater_type.clone())
                .modifiers(&[Modifier::Public])
                .param(&p.name, p.ty.clone())
                .body(body),
        );
        if let Some(empty) = EmptyOption::for_type(&p.ty, &p.name) {
            class.methods.push(
                MethodSpec::method(&empty.method, updater_type.clone())
                    .modifiers(&[Modifier::Public])
                    .body(vec![
                        Stmt::assign(
                            format!("this.{}", p.name),
                            code![EmptyOption::collections(), format!(".{}()", empty.factory)],
                        ),
                        Stmt::Return(code!["this"]),
                    ]),
            );
        }
    }

    let invoke = invocation(goal, "", |arg| code![format!("this.{}", arg)]);
    class.methods.push(
        MethodSpec::method("done", goal.details.goal_type.clone())
            .modifiers(&[Modifier::Public])
            .throws(&goal.throws)
            .body(finish_regular(goal, invoke, recycle, &retained)),
    );

    let source = downcase(&goal.details.goal_type.simple_name());
    let local = distinct_from("updater", &source);
    let mut body = if recycle {
        acquire(ctx, &updater_type, &local, &[source.as_str()])
    } else {
        vec![allocate(&updater_type, &local)]
    };
    for p in &goal.parameters {
        let value = match &p.projection {
            Projection::Method { name, .. } => format!("{}.{}()", source, name),
            Projection::Field { name } => format!("{}.{}", source, name),
            // rejected during analysis when an updater is requested
            Projection::None => continue,
        };
        body.push(Stmt::assign(format!("{}.{}", local, p.name), code![value]));
    }
    body.push(Stmt::Return(code![local]));

    let entry = MethodSpec::method(details.updater_method(), updater_type.clone())
        .modifiers(&with_access(access, &[Modifier::Static]))
        .type_params(goal.type_params.clone())
        .param(&source, goal.details.goal_type.clone())
        .throws(&goal.projection_throws())
        .body(body);

    ModuleOutput {
        methods: vec![entry],
        types: vec![class],
        fields: if recycle {
            vec![cache_field(&updater_type)]
        } else {
            Vec::new()
        },
    }
}
