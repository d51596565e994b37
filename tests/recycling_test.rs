//! Recycled builders and updaters: thread-local cache, in-use flag, release

use std::path::PathBuf;
use stepgen::*;

fn message() -> Unit {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/message.yaml");
    Unit::from_file(&path).unwrap()
}

fn lines(java: &str) -> Vec<&str> {
    java.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

fn assert_block(java: &str, block: &str) {
    let haystack = lines(java);
    let needle = lines(block);
    assert!(
        haystack.windows(needle.len()).any(|w| w == needle.as_slice()),
        "block not found:\n{}\n\nin:\n{}",
        block,
        java
    );
}

#[test]
fn test_thread_local_container() {
    let java = Build::default().render(&message()).unwrap().contents;
    assert_block(
        &java,
        r#"
private static final ThreadLocal<MessagesBuilders> INSTANCE = ThreadLocal.withInitial(MessagesBuilders::new);
private MessageBuilderImpl messageBuilderImpl = new MessageBuilderImpl();
private MessageUpdater messageUpdater = new MessageUpdater();
"#,
    );
    assert_eq!(java.matches("ThreadLocal.withInitial").count(), 1);
}

#[test]
fn test_acquire_replaces_slot_when_in_use() {
    let java = Build::default().render(&message()).unwrap().contents;
    assert_block(
        &java,
        r#"
public static MessageBuilder.Sender messageBuilder() {
MessagesBuilders context = INSTANCE.get();
if (context.messageBuilderImpl._currently_in_use) {
context.messageBuilderImpl = new MessageBuilderImpl();
}
MessageBuilderImpl builder = context.messageBuilderImpl;
builder._currently_in_use = true;
return builder;
}
"#,
    );
}

#[test]
fn test_last_step_frees_and_releases() {
    let java = Build::default().render(&message()).unwrap().contents;
    assert_block(
        &java,
        r#"
@Override
public Message priority(int priority) {
this._currently_in_use = false;
Message _message = Messages.create(this.sender, this.body, priority);
this.sender = null;
this.body = null;
return _message;
}
"#,
    );
    // primitives are never nulled
    assert!(!java.contains("this.priority = null;"));
}

#[test]
fn test_recycled_updater() {
    let java = Build::default().render(&message()).unwrap().contents;
    assert_block(
        &java,
        r#"
public static MessageUpdater messageUpdater(Message message) {
MessagesBuilders context = INSTANCE.get();
if (context.messageUpdater._currently_in_use) {
context.messageUpdater = new MessageUpdater();
}
MessageUpdater updater = context.messageUpdater;
updater._currently_in_use = true;
updater.sender = message.sender();
updater.body = message.body();
updater.priority = message.priority();
return updater;
}
"#,
    );
    assert_block(
        &java,
        r#"
public Message done() {
this._currently_in_use = false;
Message _message = Messages.create(this.sender, this.body, this.priority);
this.sender = null;
this.body = null;
return _message;
}
"#,
    );
}

#[test]
fn test_reject_policy_guards_references_only() {
    let java = Build::default().render(&message()).unwrap().contents;
    assert_block(
        &java,
        r#"
public MessageBuilder.Body sender(String sender) {
if (sender == null) {
throw new NullPointerException("sender");
}
this.sender = sender;
return this;
}
"#,
    );
    assert!(!java.contains("NullPointerException(\"priority\")"));
}

#[test]
fn test_recycling_from_config_defaults() {
    let unit = Unit::from_yaml(
        r#"
package: cube
source: Cube
builders: {}
types:
  - name: Cube
    constructors:
      - { params: [{ name: width, type: int }, { name: depth, type: int }], goal: {} }
"#,
    )
    .unwrap();
    let config = GeneratorConfig::from_yaml("defaults:\n  recycle: true\n").unwrap();
    let java = Build::new(config).render(&unit).unwrap().contents;
    assert!(java.contains("ThreadLocal<CubeBuilders>"));
    assert!(java.contains("private boolean _currently_in_use;"));

    // the unit's own marker wins over the config
    let unit = Unit::from_yaml(
        r#"
package: cube
source: Cube
builders: { recycle: false }
types:
  - name: Cube
    constructors:
      - { params: [{ name: width, type: int }, { name: depth, type: int }], goal: {} }
"#,
    )
    .unwrap();
    let config = GeneratorConfig::from_yaml("defaults:\n  recycle: true\n").unwrap();
    let java = Build::new(config).render(&unit).unwrap().contents;
    assert!(!java.contains("ThreadLocal"));
}

#[test]
fn test_goal_level_opt_out() {
    let unit = Unit::from_yaml(
        r#"
package: cube
source: Cube
builders: { recycle: true }
types:
  - name: Cube
    constructors:
      - { params: [{ name: width, type: int }, { name: depth, type: int }], goal: { recycle: false } }
"#,
    )
    .unwrap();
    let java = Build::default().render(&unit).unwrap().contents;
    assert!(!java.contains("ThreadLocal"));
    assert!(java.contains("CubeBuilderImpl builder = new CubeBuilderImpl();"));
}
