//! Output stability: the same descriptor always yields the same bytes

use std::path::PathBuf;
use pretty_assertions::assert_eq;
use stepgen::*;

fn demos() -> Vec<Unit> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos");
    ["cube.yaml", "analyst.yaml", "message.yaml", "maps.yaml"]
        .iter()
        .map(|name| Unit::from_file(&dir.join(name)).unwrap())
        .collect()
}

#[test]
fn test_repeated_builds_are_byte_identical() {
    for unit in demos() {
        let first = Build::default().render(&unit).unwrap();
        let second = Build::default().render(&unit).unwrap();
        assert_eq!(first, second, "{} differs between runs", unit.source);
    }
}

#[test]
fn test_yaml_and_json_descriptors_agree() {
    for unit in demos() {
        let json = serde_json::to_string(&unit).unwrap();
        let from_json = Unit::from_json(&json).unwrap();
        assert_eq!(unit.hash().unwrap(), from_json.hash().unwrap());
        assert_eq!(
            Build::default().render(&unit).unwrap().contents,
            Build::default().render(&from_json).unwrap().contents
        );
    }
}

#[test]
fn test_hash_tracks_descriptor_changes() {
    let units = demos();
    let mut edited = units[0].clone();
    if let Some(goal) = edited.types[0].constructors[0].goal.as_mut() {
        goal.updater = false;
    }
    assert_ne!(units[0].hash().unwrap(), edited.hash().unwrap());

    let original = Build::default().render(&units[0]).unwrap().contents;
    let changed = Build::default().render(&edited).unwrap().contents;
    assert!(original.contains(&units[0].hash().unwrap()));
    assert!(changed.contains(&edited.hash().unwrap()));
}

#[test]
fn test_timestamp_is_the_only_varying_line() {
    let config = GeneratorConfig::from_yaml("render:\n  timestamp: true\n").unwrap();
    let unit = &demos()[0];
    let stamped = Build::new(config).render(unit).unwrap().contents;
    let plain = Build::default().render(unit).unwrap().contents;
    let without_stamp: Vec<&str> = stamped
        .lines()
        .filter(|l| !l.starts_with("// GENERATED: "))
        .collect();
    assert_eq!(without_stamp, plain.lines().collect::<Vec<_>>());
}
