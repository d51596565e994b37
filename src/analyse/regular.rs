//! Parameter and projection validation for constructor and method goals

use super::element::RegularElement;
use super::shuffle::shuffle;
use crate::error::{invalid, ErrorKind, Result};
use crate::goal::{Projection, RegularGoal, RegularKind, RegularParameter};
use crate::introspect::{ExecutableInfo, FieldInfo, ParamInfo, TypeModel};
use crate::util::upcase;

/// Methods that look like accessors but never project a parameter
const NOT_PROJECTIONS: &[&str] = &["getClass", "clone"];

/// Validate a regular goal and put its parameters into step order
pub fn validate(element: &RegularElement<'_>, model: &TypeModel) -> Result<RegularGoal> {
    let executable = element.executable;
    let goal_type = &element.details.goal_type;

    let candidates: Vec<ExecutableInfo> = model
        .methods(goal_type)
        .into_iter()
        .filter(|m| {
            m.params.is_empty()
                && !m.returns.is_void()
                && !NOT_PROJECTIONS.contains(&m.name.as_str())
        })
        .collect();
    let fields = model.fields(goal_type);

    let mut parameters = Vec::with_capacity(executable.params.len());
    for param in &executable.params {
        let projection = projection(param, &candidates, &fields);
        if projection.is_none() && element.details.updater.is_some() {
            return invalid(
                ErrorKind::NoProjection,
                format!("{}/{}", executable.path(), param.name),
            );
        }
        let null_policy = param
            .step
            .as_ref()
            .and_then(|s| s.null_policy)
            .unwrap_or(element.null_policy);
        parameters.push(RegularParameter {
            name: param.name.clone(),
            ty: param.ty.clone(),
            null_policy,
            projection,
        });
    }

    let positions: Vec<Option<usize>> = executable
        .params
        .iter()
        .map(|p| p.step.as_ref().and_then(|s| s.position))
        .collect();
    let parameters = shuffle(parameters, &positions, &executable.path())?;

    let (type_params, instance_type_params) = match element.kind {
        RegularKind::Constructor => {
            let mut vars = element.owner.type_params.clone();
            vars.extend(executable.type_params.iter().cloned());
            (vars, Vec::new())
        }
        RegularKind::StaticMethod => (executable.type_params.clone(), Vec::new()),
        RegularKind::InstanceMethod => (
            executable.type_params.clone(),
            element.owner.type_params.clone(),
        ),
    };

    Ok(RegularGoal {
        details: element.details.clone(),
        kind: element.kind,
        owner: element.owner.self_type(),
        method: if executable.is_constructor() {
            String::new()
        } else {
            executable.name.clone()
        },
        type_params,
        instance_type_params,
        parameters,
        declaration_order: executable.params.iter().map(|p| p.name.clone()).collect(),
        throws: executable.throws.clone(),
    })
}

/// Accessor methods `get<P>`, `is<P>`, `<p>` in that order, then a field
/// of the same name and type
fn projection(param: &ParamInfo, methods: &[ExecutableInfo], fields: &[FieldInfo]) -> Projection {
    let names = [
        format!("get{}", upcase(&param.name)),
        format!("is{}", upcase(&param.name)),
        param.name.clone(),
    ];
    for name in &names {
        if let Some(m) = methods.iter().find(|m| &m.name == name) {
            return Projection::Method {
                name: m.name.clone(),
                throws: m.throws.clone(),
            };
        }
    }
    match fields
        .iter()
        .find(|f| f.name == param.name && f.ty == param.ty)
    {
        Some(f) => Projection::Field {
            name: f.name.clone(),
        },
        None => Projection::None,
    }
}
