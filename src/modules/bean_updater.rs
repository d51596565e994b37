//! Updaters for bean goals
//!
//! The updater copies the source bean into a fresh instance through its
//! accessors, then mutates the copy through the same setters and
//! collection getters the builder uses.

use super::{
    acquire, allocate, cache_field, context_name, in_use_field, recycles, ModuleOutput, IN_USE,
};
use crate::code;
use crate::decl::{with_access, FieldSpec, MethodSpec, Stmt, TypeSpec};
use crate::goal::{BeanGoal, BeanParameter, EmptyOption, GoalContext, LoneGetter, ParameterRef};
use crate::model::{Access, Modifier};
use crate::types::{TypeName, Wildcard};
use crate::util::{distinct_from, unused_name};

pub fn generate(ctx: &GoalContext<'_>, goal: &BeanGoal, access: Access) -> ModuleOutput {
    let recycle = recycles(ctx.goal);
    let details = ctx.details();
    let updater_type = ctx.updater_type();
    let name = details.updater_name();
    let field = goal.bean_field();
    let bean = format!("this.{}", field);

    let mut class = TypeSpec::class(&name, &with_access(access, &[Modifier::Static, Modifier::Final]));
    class
        .fields
        .push(FieldSpec::new(&field, goal.bean_type().clone(), &[Modifier::Private]));
    if recycle {
        class.fields.push(in_use_field());
    }
    class
        .methods
        .push(MethodSpec::constructor(&name).modifiers(&[Modifier::Private]));

    for step in &ctx.steps {
        let ParameterRef::Bean(param) = step.parameter else {
            continue;
        };
        let mut body = property_body(&bean, param, true);
        body.push(Stmt::Return(code!["this"]));
        class.methods.push(
            MethodSpec::method(&step.method, updater_type.clone())
                .modifiers(&[Modifier::Public])
                .param(param.name(), param.step_type())
                .body(body),
        );
        if let Some(empty) = &step.empty {
            let mut body = empty_body(&bean, param, empty, true);
            body.push(Stmt::Return(code!["this"]));
            class.methods.push(
                MethodSpec::method(&empty.method, updater_type.clone())
                    .modifiers(&[Modifier::Public])
                    .body(body),
            );
        }
    }
    class.methods.push(
        MethodSpec::method("done", goal.bean_type().clone())
            .modifiers(&[Modifier::Public])
            .body(finish_bean(goal, recycle)),
    );

    let local = distinct_from("updater", &field);
    let context = context_name(&local, &[field.as_str()]);
    let target = format!("{}.{}", local, field);
    let mut body = Vec::new();
    for param in &goal.parameters {
        if let BeanParameter::LoneGetter(p) = param {
            if param.rejects_null() {
                body.push(Stmt::null_guard(
                    code![format!("{}.{}()", field, p.getter)],
                    &p.name,
                ));
            }
        }
    }
    if recycle {
        body.extend(acquire(ctx, &updater_type, &local, &[field.as_str()]));
    } else {
        body.push(allocate(&updater_type, &local));
    }
    body.push(Stmt::assign(
        target.clone(),
        code!["new ", goal.bean_type(), "()"],
    ));
    for param in &goal.parameters {
        match param {
            BeanParameter::AccessorPair(p) => body.push(Stmt::Expr(code![format!(
                "{}.{}({}.{}())",
                target, p.setter, field, p.getter
            )])),
            BeanParameter::LoneGetter(p) => {
                let source = format!("{}.{}()", field, p.getter);
                // the loop variable must not hide the entry's own locals
                let var = unused_name(
                    &p.iteration_var,
                    &[field.as_str(), local.as_str(), context.as_str()],
                );
                let copy = copy_elements(&target, p, &source, &var);
                if param.rejects_null() {
                    body.push(copy);
                } else {
                    body.push(Stmt::If {
                        cond: code![format!("{} != null", source)],
                        then: vec![copy],
                    });
                }
            }
        }
    }
    body.push(Stmt::Return(code![local]));

    let entry = MethodSpec::method(details.updater_method(), updater_type.clone())
        .modifiers(&with_access(access, &[Modifier::Static]))
        .param(&field, goal.bean_type().clone())
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

/// Statements a step applies to the bean under construction.
///
/// Accessor pairs call the setter. Lone getters add every element of the
/// argument to the getter's own collection, clearing it first when
/// `clear` is set.
pub fn property_body(bean: &str, param: &BeanParameter, clear: bool) -> Vec<Stmt> {
    let name = param.name();
    let mut body = Vec::new();
    if param.rejects_null() {
        body.push(Stmt::null_guard(code![name], name));
    }
    match param {
        BeanParameter::AccessorPair(p) => {
            body.push(Stmt::Expr(code![format!("{}.{}({})", bean, p.setter, name)]));
        }
        BeanParameter::LoneGetter(p) => {
            if clear {
                body.push(Stmt::Expr(code![format!("{}.{}().clear()", bean, p.getter)]));
            }
            let copy = copy_elements(bean, p, name, &p.iteration_var);
            if param.rejects_null() {
                body.push(copy);
            } else {
                body.push(Stmt::If {
                    cond: code![format!("{} != null", name)],
                    then: vec![copy],
                });
            }
        }
    }
    body
}

/// Statements of an `empty<Name>()` convenience method
pub fn empty_body(bean: &str, param: &BeanParameter, empty: &EmptyOption, clear: bool) -> Vec<Stmt> {
    match param {
        BeanParameter::AccessorPair(p) => vec![Stmt::Expr(code![
            format!("{}.{}(", bean, p.setter),
            EmptyOption::collections(),
            format!(".{}())", empty.factory)
        ])],
        BeanParameter::LoneGetter(p) if clear => {
            vec![Stmt::Expr(code![format!("{}.{}().clear()", bean, p.getter)])]
        }
        BeanParameter::LoneGetter(_) => Vec::new(),
    }
}

/// Hand out the finished bean; a recycled object drops its reference
pub fn finish_bean(goal: &BeanGoal, recycle: bool) -> Vec<Stmt> {
    let field = goal.bean_field();
    if !recycle {
        return vec![Stmt::Return(code![format!("this.{}", field)])];
    }
    let result = format!("_{}", field);
    vec![
        Stmt::assign(format!("this.{}", IN_USE), code!["false"]),
        Stmt::Expr(code![
            goal.bean_type(),
            format!(" {} = this.{}", result, field)
        ]),
        Stmt::assign(format!("this.{}", field), code!["null"]),
        Stmt::Return(code![result]),
    ]
}

/// `for (E e : source) { bean.getX().add(e); }`
fn copy_elements(bean: &str, p: &LoneGetter, source: &str, var: &str) -> Stmt {
    Stmt::ForEach {
        var_type: loop_type(p),
        var: var.to_string(),
        iterable: code![source],
        body: vec![Stmt::Expr(code![format!(
            "{}.{}().add({})",
            bean, p.getter, var
        )])],
    }
}

fn loop_type(p: &LoneGetter) -> TypeName {
    match &p.element {
        TypeName::Wildcard(Wildcard::Extends(bound)) => (**bound).clone(),
        TypeName::Wildcard(_) => TypeName::object(),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::{AccessorPair, BuildersContext, GoalDescription, GoalDetails, Lifecycle};
    use crate::model::NullPolicy;
    use crate::types::ClassName;

    fn analyst(recycle: bool) -> GoalDescription {
        let list = TypeName::parameterized(
            ClassName::new("java.util", ["List"]),
            vec![TypeName::java_lang("String")],
        );
        GoalDescription::Bean(BeanGoal {
            details: GoalDetails {
                name: "businessAnalyst".into(),
                goal_type: TypeName::class(ClassName::new("beans", ["BusinessAnalyst"])),
                builder: Some(Access::Public),
                updater: Some(Access::Public),
                lifecycle: if recycle {
                    Lifecycle::ReuseInstances
                } else {
                    Lifecycle::NewInstance
                },
                element: "BusinessAnalyst".into(),
            },
            parameters: vec![
                BeanParameter::AccessorPair(AccessorPair {
                    name: "name".into(),
                    ty: TypeName::java_lang("String"),
                    getter: "getName".into(),
                    setter: "setName".into(),
                    null_policy: NullPolicy::Allow,
                }),
                BeanParameter::LoneGetter(LoneGetter {
                    name: "notes".into(),
                    ty: list,
                    element: TypeName::java_lang("String"),
                    getter: "getNotes".into(),
                    null_policy: NullPolicy::Reject,
                    iteration_var: "string".into(),
                }),
            ],
        })
    }

    fn builders() -> BuildersContext {
        BuildersContext {
            generated: ClassName::new("beans", ["BusinessAnalystBuilders"]),
            recycle: false,
        }
    }

    #[test]
    fn test_updater_class() {
        let goal = analyst(false);
        let builders = builders();
        let ctx = GoalContext::new(&goal, &builders);
        let GoalDescription::Bean(bean) = &goal else {
            unreachable!()
        };
        let out = generate(&ctx, bean, Access::Public);
        assert!(out.fields.is_empty());
        let class = &out.types[0];
        assert_eq!(class.name, "BusinessAnalystUpdater");
        assert!(class.field("businessAnalyst").is_some());
        let names: Vec<&str> = class
            .methods
            .iter()
            .filter(|m| !m.constructor)
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["name", "notes", "emptyNotes", "done"]);
        assert_eq!(out.methods[0].name, "businessAnalystUpdater");
    }

    #[test]
    fn test_lone_getter_clears_before_copy() {
        let GoalDescription::Bean(bean) = analyst(false) else {
            unreachable!()
        };
        let body = property_body("this.businessAnalyst", &bean.parameters[1], true);
        assert_eq!(body.len(), 3);
        assert!(matches!(&body[0], Stmt::If { cond, .. } if cond.to_string() == "notes == null"));
        assert_eq!(
            body[1],
            Stmt::Expr(code!["this.businessAnalyst.getNotes().clear()"])
        );
        assert!(matches!(&body[2], Stmt::ForEach { var, .. } if var == "string"));
    }

    #[test]
    fn test_allowed_lone_getter_skips_null() {
        let GoalDescription::Bean(mut bean) = analyst(false) else {
            unreachable!()
        };
        if let BeanParameter::LoneGetter(p) = &mut bean.parameters[1] {
            p.null_policy = NullPolicy::Allow;
        }
        let body = property_body("this.b", &bean.parameters[1], false);
        assert_eq!(body.len(), 1);
        assert!(matches!(&body[0], Stmt::If { cond, .. } if cond.to_string() == "notes != null"));
    }

    #[test]
    fn test_recycled_done_releases_bean() {
        let GoalDescription::Bean(bean) = analyst(true) else {
            unreachable!()
        };
        let body = finish_bean(&bean, true);
        assert_eq!(body.len(), 4);
        assert_eq!(
            body[2],
            Stmt::assign("this.businessAnalyst", code!["null"])
        );
        assert_eq!(body[3], Stmt::Return(code!["_businessAnalyst"]));
    }
}
