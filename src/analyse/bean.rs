//! Property validation for bean goals

use super::element::BeanElement;
use super::shuffle::shuffle;
use crate::error::{invalid, ErrorKind, Result};
use crate::goal::{AccessorPair, BeanGoal, BeanParameter, LoneGetter};
use crate::introspect::{ExecutableInfo, TypeModel};
use crate::types::TypeName;
use crate::util::{distinct_from, downcase, property_name, upcase};

fn is_getter(m: &ExecutableInfo) -> bool {
    m.params.is_empty()
        && !m.returns.is_void()
        && m.name != "getClass"
        && property_name(&m.name).is_some()
}

fn is_setter(m: &ExecutableInfo) -> bool {
    m.params.len() == 1
        && m.returns.is_void()
        && m.name.len() > 3
        && m.name.starts_with("set")
        && m.name[3..].chars().next().is_some_and(|c| c.is_uppercase())
}

/// Classify the bean's getters into accessor pairs and lone getters
pub fn validate(element: &BeanElement<'_>, model: &TypeModel) -> Result<BeanGoal> {
    let bean_type = &element.details.goal_type;
    let methods = model.methods(bean_type);

    for setter in methods.iter().filter(|m| is_setter(m)) {
        if setter.step.is_some() {
            return invalid(ErrorKind::StepOnSetter, setter.path());
        }
        if setter.ignore {
            return invalid(ErrorKind::IgnoreOnSetter, setter.path());
        }
    }

    let mut properties: Vec<(BeanParameter, Option<usize>)> = Vec::new();
    for getter in methods.iter().filter(|m| is_getter(m)) {
        if getter.ignore && getter.step.is_some() {
            return invalid(ErrorKind::BeanIgnoreAndStep, getter.path());
        }
        if getter.ignore {
            continue;
        }
        if !getter.throws.is_empty() {
            return invalid(ErrorKind::BeanGetterException, getter.path());
        }
        let Some(name) = property_name(&getter.name) else {
            continue;
        };
        let null_policy = getter
            .step
            .as_ref()
            .and_then(|s| s.null_policy)
            .unwrap_or(element.null_policy);
        let position = getter.step.as_ref().and_then(|s| s.position);

        let setter_name = format!("set{}", upcase(&name));
        let setter = methods
            .iter()
            .find(|m| m.name == setter_name && is_setter(m));

        let parameter = match setter {
            Some(setter) => {
                if setter.params[0].ty != getter.returns {
                    return invalid(ErrorKind::BeanGetterSetterTypeMismatch, setter.path());
                }
                if !setter.throws.is_empty() {
                    return invalid(ErrorKind::BeanSetterException, setter.path());
                }
                BeanParameter::AccessorPair(AccessorPair {
                    name,
                    ty: getter.returns.clone(),
                    getter: getter.name.clone(),
                    setter: setter.name.clone(),
                    null_policy,
                })
            }
            None => {
                let Some(item) = model.collection_element(&getter.returns) else {
                    return invalid(ErrorKind::BeanCouldNotFindSetter, getter.path());
                };
                let iteration_var = distinct_from(&iteration_var(&item), &name);
                BeanParameter::LoneGetter(LoneGetter {
                    name,
                    ty: getter.returns.clone(),
                    element: item,
                    getter: getter.name.clone(),
                    null_policy,
                    iteration_var,
                })
            }
        };
        properties.push((parameter, position));
    }

    if properties.is_empty() {
        return invalid(ErrorKind::BeanNoAccessorPairs, element.details.element.clone());
    }

    properties.sort_by(|a, b| a.0.name().cmp(b.0.name()));
    let positions: Vec<Option<usize>> = properties.iter().map(|(_, p)| *p).collect();
    let parameters = shuffle(
        properties.into_iter().map(|(p, _)| p).collect(),
        &positions,
        &element.details.element,
    )?;

    Ok(BeanGoal {
        details: element.details.clone(),
        parameters,
    })
}

/// Loop variable for copying elements, e.g. `string` for `List<String>`
fn iteration_var(element: &TypeName) -> String {
    downcase(&element.boxed().simple_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyse::element::{goal_elements, GoalElement};
    use crate::config::ResolvedOptions;
    use crate::model::{NullPolicy, Unit};
    use crate::types::ClassName;
    use rstest::rstest;

    fn validate_bean(methods: &str) -> Result<BeanGoal> {
        let yaml = format!(
            "package: beans\nsource: Analyst\ntypes:\n  - name: Analyst\n    modifiers: [public]\n    goal: {{ updater: true }}\n    methods:\n{}",
            methods
        );
        let unit = Unit::from_yaml(&yaml).unwrap();
        let model = TypeModel::new(&unit).unwrap();
        let source = model.get(&ClassName::new("beans", ["Analyst"])).unwrap();
        let elements = goal_elements(&model, source, &ResolvedOptions::default())?;
        match &elements[0] {
            GoalElement::Bean(e) => validate(e, &model),
            GoalElement::Regular(_) => panic!("expected a bean goal"),
        }
    }

    const ANALYST: &str = r#"
      - { name: getName, returns: String, modifiers: [public] }
      - { name: setName, params: [{ name: name, type: String }], modifiers: [public] }
      - { name: getNotes, returns: "List<String>", modifiers: [public], step: { null_policy: REJECT } }
      - { name: isActive, returns: boolean, modifiers: [public] }
      - { name: setActive, params: [{ name: active, type: boolean }], modifiers: [public] }
"#;

    #[test]
    fn test_accessor_pairs_and_lone_getters() {
        let goal = validate_bean(ANALYST).unwrap();
        let names: Vec<&str> = goal.parameters.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["active", "name", "notes"]);
        match &goal.parameters[2] {
            BeanParameter::LoneGetter(notes) => {
                assert_eq!(notes.element.to_string(), "String");
                assert_eq!(notes.iteration_var, "string");
                assert_eq!(notes.null_policy, NullPolicy::Reject);
                assert_eq!(notes.iterable_type().to_string(), "Iterable<? extends String>");
            }
            other => panic!("expected lone getter, got {:?}", other),
        }
        assert!(matches!(&goal.parameters[1], BeanParameter::AccessorPair(p) if p.setter == "setName"));
    }

    #[test]
    fn test_explicit_positions_override_alphabetical() {
        let goal = validate_bean(
            r#"
      - { name: getB, returns: String, step: { position: 0 } }
      - { name: setB, params: [{ name: b, type: String }] }
      - { name: getA, returns: String }
      - { name: setA, params: [{ name: a, type: String }] }
"#,
        )
        .unwrap();
        let names: Vec<&str> = goal.parameters.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_iteration_var_avoids_property_name() {
        let goal = validate_bean(
            "      - { name: getString, returns: \"Set<String>\" }\n",
        )
        .unwrap();
        match &goal.parameters[0] {
            BeanParameter::LoneGetter(p) => assert_eq!(p.iteration_var, "string_"),
            other => panic!("expected lone getter, got {:?}", other),
        }
    }

    #[rstest]
    #[case::no_setter("      - { name: getName, returns: String }\n", ErrorKind::BeanCouldNotFindSetter)]
    #[case::mismatch(
        "      - { name: getName, returns: String }\n      - { name: setName, params: [{ name: n, type: int }] }\n",
        ErrorKind::BeanGetterSetterTypeMismatch
    )]
    #[case::getter_throws(
        "      - { name: getNotes, returns: \"List<String>\", throws: [IOException] }\n",
        ErrorKind::BeanGetterException
    )]
    #[case::setter_throws(
        "      - { name: getName, returns: String }\n      - { name: setName, params: [{ name: n, type: String }], throws: [IOException] }\n",
        ErrorKind::BeanSetterException
    )]
    #[case::ignore_and_step(
        "      - { name: getName, returns: String, ignore: true, step: { position: 0 } }\n",
        ErrorKind::BeanIgnoreAndStep
    )]
    #[case::step_on_setter(
        "      - { name: getName, returns: String }\n      - { name: setName, params: [{ name: n, type: String }], step: {} }\n",
        ErrorKind::StepOnSetter
    )]
    #[case::ignore_on_setter(
        "      - { name: getName, returns: String }\n      - { name: setName, params: [{ name: n, type: String }], ignore: true }\n",
        ErrorKind::IgnoreOnSetter
    )]
    #[case::nothing_left(
        "      - { name: getName, returns: String, ignore: true }\n",
        ErrorKind::BeanNoAccessorPairs
    )]
    fn test_bean_errors(#[case] methods: &str, #[case] expected: ErrorKind) {
        let err = validate_bean(methods).unwrap_err();
        assert_eq!(err.kind(), Some(expected), "{}", err);
    }

    #[test]
    fn test_private_getters_are_invisible() {
        let err = validate_bean(
            "      - { name: getName, returns: String, modifiers: [private] }\n",
        )
        .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::BeanNoAccessorPairs));
    }
}
