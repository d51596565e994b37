//! Element inspection: find goals and resolve their options

use crate::config::ResolvedOptions;
use crate::error::{invalid, Error, ErrorKind, Result};
use crate::goal::{GoalDetails, Lifecycle, RegularKind};
use crate::introspect::{ClassInfo, ExecutableInfo, TypeModel};
use crate::model::{GoalAnnotation, Modifier, NullPolicy};
use crate::types::TypeName;
use crate::util::{downcase, is_java_identifier};

/// A constructor or method goal before parameter validation
#[derive(Debug, Clone)]
pub struct RegularElement<'a> {
    pub details: GoalDetails,
    pub null_policy: NullPolicy,
    pub kind: RegularKind,
    pub executable: &'a ExecutableInfo,
    pub owner: &'a ClassInfo,
}

/// A bean goal before property validation
#[derive(Debug, Clone)]
pub struct BeanElement<'a> {
    pub details: GoalDetails,
    pub null_policy: NullPolicy,
    pub class: &'a ClassInfo,
}

/// A discovered goal
#[derive(Debug, Clone)]
pub enum GoalElement<'a> {
    Regular(RegularElement<'a>),
    Bean(BeanElement<'a>),
}

impl GoalElement<'_> {
    pub fn details(&self) -> &GoalDetails {
        match self {
            GoalElement::Regular(e) => &e.details,
            GoalElement::Bean(e) => &e.details,
        }
    }
}

/// Reject goal markers on any type other than `source`, or anywhere when
/// the unit carries no builders marker
pub fn check_goals_in_build(model: &TypeModel, source: &ClassInfo, marked: bool) -> Result<()> {
    for class in model.classes() {
        if marked && class.name == source.name {
            continue;
        }
        if class.goal.is_some() {
            return invalid(ErrorKind::GoalNotInBuild, class.name.to_string());
        }
        if let Some(e) = class
            .constructors
            .iter()
            .chain(class.methods.iter())
            .find(|e| e.goal.is_some())
        {
            return invalid(ErrorKind::GoalNotInBuild, e.path());
        }
    }
    Ok(())
}

/// Checks on the source type itself
pub fn check_source(source: &ClassInfo) -> Result<()> {
    if source.has(Modifier::Private) {
        let kind = if source.goal.is_some() {
            ErrorKind::BeanPrivateClass
        } else {
            ErrorKind::PrivateType
        };
        return invalid(kind, source.name.to_string());
    }
    if source.name.is_nested() && !source.has(Modifier::Static) {
        return invalid(ErrorKind::NestingKind, source.name.to_string());
    }
    Ok(())
}

/// All goals declared on `source`, in declaration order: the type-level
/// bean goal first, then constructors, then methods
pub fn goal_elements<'a>(
    model: &TypeModel,
    source: &'a ClassInfo,
    options: &ResolvedOptions,
) -> Result<Vec<GoalElement<'a>>> {
    let mut out = Vec::new();

    if let Some(annotation) = &source.goal {
        out.push(GoalElement::Bean(bean_element(
            model, source, annotation, options,
        )?));
    }

    for executable in source.constructors.iter().chain(source.methods.iter()) {
        if let Some(annotation) = &executable.goal {
            out.push(GoalElement::Regular(regular_element(
                source, executable, annotation, options,
            )?));
        }
    }

    for element in &out {
        tracing::debug!(
            goal = %element.details().name,
            element = %element.details().element,
            "found goal"
        );
    }
    Ok(out)
}

fn regular_element<'a>(
    owner: &'a ClassInfo,
    executable: &'a ExecutableInfo,
    annotation: &GoalAnnotation,
    options: &ResolvedOptions,
) -> Result<RegularElement<'a>> {
    let path = executable.path();
    if executable.has(Modifier::Private) {
        return invalid(ErrorKind::PrivateMethod, path);
    }

    let kind = if executable.is_constructor() {
        RegularKind::Constructor
    } else if executable.has(Modifier::Static) {
        RegularKind::StaticMethod
    } else {
        RegularKind::InstanceMethod
    };

    if kind == RegularKind::Constructor && owner.has(Modifier::Abstract) {
        return invalid(ErrorKind::AbstractConstructor, path);
    }
    if executable.params.is_empty() {
        return invalid(ErrorKind::NotEnoughParameters, path);
    }
    if annotation.updater {
        if kind == RegularKind::InstanceMethod {
            return invalid(ErrorKind::UpdaterInstanceMethod, path);
        }
        if executable.returns.is_void() {
            return invalid(ErrorKind::UpdaterVoidGoal, path);
        }
    }

    let goal_type = match kind {
        RegularKind::Constructor => owner.self_type(),
        _ => executable.returns.clone(),
    };

    Ok(RegularElement {
        details: details(annotation, goal_type, options, path)?,
        null_policy: annotation.null_policy.unwrap_or(options.null_policy),
        kind,
        executable,
        owner,
    })
}

fn bean_element<'a>(
    model: &TypeModel,
    class: &'a ClassInfo,
    annotation: &GoalAnnotation,
    options: &ResolvedOptions,
) -> Result<BeanElement<'a>> {
    let path = class.name.to_string();
    if class.has(Modifier::Abstract) {
        return invalid(ErrorKind::AbstractConstructor, path);
    }
    if !model.has_visible_default_constructor(class) {
        return invalid(ErrorKind::BeanNoDefaultConstructor, path);
    }
    if !class.type_params.is_empty() {
        return Err(Error::Descriptor(format!(
            "bean type `{}` may not declare type parameters",
            path
        )));
    }
    Ok(BeanElement {
        details: details(annotation, class.self_type(), options, path)?,
        null_policy: annotation.null_policy.unwrap_or(options.null_policy),
        class,
    })
}

/// Resolve name, access and lifecycle of a goal
fn details(
    annotation: &GoalAnnotation,
    goal_type: TypeName,
    options: &ResolvedOptions,
    element: String,
) -> Result<GoalDetails> {
    let name = match &annotation.name {
        Some(name) if !is_java_identifier(name) => {
            return invalid(ErrorKind::InvalidGoalName, element);
        }
        Some(name) => name.clone(),
        None => downcase(&goal_type.boxed().simple_name()),
    };
    let lifecycle = if annotation.recycle.unwrap_or(options.recycle) {
        Lifecycle::ReuseInstances
    } else {
        Lifecycle::NewInstance
    };
    Ok(GoalDetails {
        name,
        goal_type,
        builder: annotation
            .builder
            .then(|| annotation.builder_access.unwrap_or(options.access)),
        updater: annotation
            .updater
            .then(|| annotation.updater_access.unwrap_or(options.access)),
        lifecycle,
        element,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Access, Unit};
    use crate::types::ClassName;

    fn elements(yaml: &str) -> Result<Vec<String>> {
        let unit = Unit::from_yaml(yaml).unwrap();
        let model = TypeModel::new(&unit).unwrap();
        let source = model
            .get(&ClassName::new(&unit.package, unit.source.split('.')))
            .unwrap();
        check_source(source)?;
        let options = ResolvedOptions {
            access: Access::Package,
            ..Default::default()
        };
        Ok(goal_elements(&model, source, &options)?
            .iter()
            .map(|e| e.details().name.clone())
            .collect())
    }

    #[test]
    fn test_names_derive_from_goal_type() {
        let names = elements(
            r#"
package: p
source: Maths
types:
  - name: Maths
    constructors:
      - params: [{ name: a, type: int }]
        goal: {}
    methods:
      - name: sum
        modifiers: [static]
        returns: int
        params: [{ name: a, type: int }]
        goal: {}
      - name: label
        returns: String
        params: [{ name: a, type: int }]
        goal: { name: labelled }
"#,
        )
        .unwrap();
        assert_eq!(names, vec!["maths", "integer", "labelled"]);
    }

    #[test]
    fn test_private_goal() {
        let err = elements(
            r#"
source: A
types:
  - name: A
    constructors:
      - { modifiers: [private], params: [{ name: a, type: int }], goal: {} }
"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::PrivateMethod));
    }

    #[test]
    fn test_nested_source_must_be_static() {
        let err = elements("source: A.B\ntypes:\n  - name: A\n  - name: A.B\n").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NestingKind));
        assert!(elements("source: A.B\ntypes:\n  - name: A\n  - { name: A.B, modifiers: [static] }\n").is_ok());
    }

    #[test]
    fn test_invalid_explicit_name() {
        let err = elements(
            r#"
source: A
types:
  - name: A
    constructors:
      - { params: [{ name: a, type: int }], goal: { name: "new" } }
"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidGoalName));
    }

    #[test]
    fn test_updater_unavailable_for_instance_and_void() {
        let instance = elements(
            r#"
source: A
types:
  - name: A
    methods:
      - { name: m, returns: String, params: [{ name: a, type: int }], goal: { updater: true } }
"#,
        )
        .unwrap_err();
        assert_eq!(instance.kind(), Some(ErrorKind::UpdaterInstanceMethod));
        let void = elements(
            r#"
source: A
types:
  - name: A
    methods:
      - { name: m, modifiers: [static], params: [{ name: a, type: int }], goal: { updater: true } }
"#,
        )
        .unwrap_err();
        assert_eq!(void.kind(), Some(ErrorKind::UpdaterVoidGoal));
    }

    #[test]
    fn test_access_resolution() {
        let unit = Unit::from_yaml(
            r#"
source: A
types:
  - name: A
    constructors:
      - params: [{ name: a, type: int }]
        goal: { updater: true, updater_access: PUBLIC, recycle: true }
"#,
        )
        .unwrap();
        let model = TypeModel::new(&unit).unwrap();
        let source = model.get(&ClassName::new("", ["A"])).unwrap();
        let options = ResolvedOptions {
            access: Access::Package,
            ..Default::default()
        };
        let elements = goal_elements(&model, source, &options).unwrap();
        let details = elements[0].details();
        assert_eq!(details.builder, Some(Access::Package));
        assert_eq!(details.updater, Some(Access::Public));
        assert_eq!(details.lifecycle, Lifecycle::ReuseInstances);
    }
}
