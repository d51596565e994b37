//! Tests for unit validation - the error catalog end to end

use rstest::rstest;
use pretty_assertions::assert_eq;
use stepgen::*;

/// A unit with one source type `A` in package `p`
fn unit(builders: &str, type_body: &str) -> Unit {
    let yaml = format!(
        "package: p\nsource: A\n{}types:\n  - name: A\n{}",
        builders, type_body
    );
    Unit::from_yaml(&yaml).unwrap()
}

const MARKED: &str = "builders: {}\n";

#[rstest]
#[case::private_goal(
    MARKED,
    "    constructors:\n      - { modifiers: [private], params: [{ name: a, type: int }], goal: {} }\n",
    ErrorKind::PrivateMethod,
    "A#<init>(int)"
)]
#[case::private_type(
    MARKED,
    "    modifiers: [private]\n    constructors:\n      - { params: [{ name: a, type: int }], goal: {} }\n",
    ErrorKind::PrivateType,
    "A"
)]
#[case::no_parameters(
    MARKED,
    "    constructors:\n      - { params: [], goal: {} }\n",
    ErrorKind::NotEnoughParameters,
    "A#<init>()"
)]
#[case::not_marked(
    "",
    "    constructors:\n      - { params: [{ name: a, type: int }], goal: {} }\n",
    ErrorKind::GoalNotInBuild,
    "A#<init>(int)"
)]
#[case::invalid_name(
    MARKED,
    "    constructors:\n      - { params: [{ name: a, type: int }], goal: { name: \"not valid\" } }\n",
    ErrorKind::InvalidGoalName,
    "A#<init>(int)"
)]
#[case::abstract_constructor(
    MARKED,
    "    modifiers: [abstract]\n    constructors:\n      - { params: [{ name: a, type: int }], goal: {} }\n",
    ErrorKind::AbstractConstructor,
    "A#<init>(int)"
)]
#[case::no_projection(
    MARKED,
    "    constructors:\n      - { params: [{ name: a, type: int }], goal: { updater: true } }\n",
    ErrorKind::NoProjection,
    "A#<init>(int)/a"
)]
#[case::updater_on_instance_method(
    MARKED,
    "    methods:\n      - { name: scale, returns: int, params: [{ name: f, type: int }], goal: { updater: true } }\n",
    ErrorKind::UpdaterInstanceMethod,
    "A#scale(int)"
)]
#[case::updater_on_void_goal(
    MARKED,
    "    methods:\n      - { name: log, modifiers: [static], params: [{ name: m, type: String }], goal: { updater: true } }\n",
    ErrorKind::UpdaterVoidGoal,
    "A#log(String)"
)]
#[case::step_out_of_range(
    MARKED,
    "    constructors:\n      - params: [{ name: a, type: int, step: { position: 3 } }]\n        goal: {}\n",
    ErrorKind::StepPosition,
    "A#<init>(int)"
)]
#[case::bean_without_default_constructor(
    MARKED,
    "    goal: {}\n    constructors:\n      - { params: [{ name: a, type: int }] }\n    methods:\n      - { name: getA, returns: int }\n      - { name: setA, params: [{ name: a, type: int }] }\n",
    ErrorKind::BeanNoDefaultConstructor,
    "A"
)]
#[case::private_bean(
    MARKED,
    "    modifiers: [private]\n    goal: {}\n",
    ErrorKind::BeanPrivateClass,
    "A"
)]
#[case::bean_getter_without_setter(
    MARKED,
    "    goal: {}\n    methods:\n      - { name: getName, returns: String }\n",
    ErrorKind::BeanCouldNotFindSetter,
    "A#getName()"
)]
#[case::bean_without_properties(
    MARKED,
    "    goal: {}\n",
    ErrorKind::BeanNoAccessorPairs,
    "A"
)]
fn test_rejected_units(
    #[case] builders: &str,
    #[case] type_body: &str,
    #[case] kind: ErrorKind,
    #[case] element: &str,
) {
    let err = Build::default().render(&unit(builders, type_body)).unwrap_err();
    assert_eq!(err.kind(), Some(kind), "{}", err);
    assert_eq!(err.to_string(), format!("{}: {}", element, kind.message()));
}

#[test]
fn test_non_static_nested_source() {
    let unit = Unit::from_yaml(
        "package: p\nsource: A.B\nbuilders: {}\ntypes:\n  - name: A\n  - name: A.B\n    constructors:\n      - { params: [{ name: a, type: int }], goal: {} }\n",
    )
    .unwrap();
    let err = Build::default().render(&unit).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NestingKind));
    assert_eq!(err.to_string(), "A.B: nested class must be static");
}

#[test]
fn test_nested_source_names_generated_type() {
    let unit = Unit::from_yaml(
        "package: p\nsource: A.B\nbuilders: {}\ntypes:\n  - name: A\n  - name: A.B\n    modifiers: [static]\n    constructors:\n      - { params: [{ name: a, type: int }], goal: {} }\n",
    )
    .unwrap();
    let file = Build::default().render(&unit).unwrap();
    assert_eq!(file.path, std::path::PathBuf::from("p/A_BBuilders.java"));
    assert!(file.contents.contains("public final class A_BBuilders {"));
}

#[test]
fn test_duplicate_generated_type_across_units() {
    let a = unit(
        MARKED,
        "    constructors:\n      - { params: [{ name: a, type: int }], goal: {} }\n",
    );
    let mut build = Build::default();
    build.render(&a).unwrap();
    let err = build.render(&a).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::DuplicateGeneratedType));
    assert_eq!(
        err.to_string(),
        "p.A: generated type name already used in this build"
    );
}

#[test]
fn test_unknown_source_is_a_descriptor_error() {
    let unit = Unit::from_yaml("package: p\nsource: Missing\nbuilders: {}\ntypes: []\n").unwrap();
    let err = Build::default().render(&unit).unwrap_err();
    assert!(matches!(err, Error::Descriptor(_)));
    assert_eq!(err.kind(), None);
}

#[test]
fn test_unparseable_type_is_reported() {
    let err = Build::default()
        .render(&unit(
            MARKED,
            "    constructors:\n      - { params: [{ name: a, type: \"List<\" }], goal: {} }\n",
        ))
        .unwrap_err();
    assert!(matches!(err, Error::TypeParse(_)), "{:?}", err);
}
